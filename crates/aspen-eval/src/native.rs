//! The native-function registry.
//!
//! A table keyed by name; the driver hands its signatures to the type
//! checker and its callables to the interpreter's global scope. Insertion
//! order is preserved so the global environment is seeded the same way
//! every run.

use std::rc::Rc;
use std::time::Instant;

use aspen_par::{FunctionType, Type};
use indexmap::IndexMap;

use crate::value::{NativeFunction, Value};

/// The implementation side of a native: arity and argument kinds are
/// guaranteed by the type checker before a call ever reaches it.
pub type NativeImpl = Box<dyn for<'a> Fn(&[Value<'a>]) -> Value<'a>>;

pub struct NativeRegistry {
    functions: IndexMap<&'static str, Rc<NativeFunction>>,
}

impl NativeRegistry {
    /// The standard set: `clock`, `itoa`, `ftoa`, `atoi`, `atof`.
    pub fn standard() -> Self {
        let mut registry = Self {
            functions: IndexMap::new(),
        };

        let start = Instant::now();
        registry.define(
            "clock",
            FunctionType::new(vec![], Type::I64),
            Box::new(move |_args: &[Value<'_>]| Value::I64(start.elapsed().as_micros() as i64)),
        );

        registry.define(
            "itoa",
            FunctionType::new(vec![Type::I64], Type::String),
            Box::new(|args: &[Value<'_>]| match &args[0] {
                Value::I64(v) => Value::Str(Rc::from(v.to_string())),
                other => unreachable!("itoa: {other:?}"),
            }),
        );

        registry.define(
            "ftoa",
            FunctionType::new(vec![Type::Double], Type::String),
            Box::new(|args: &[Value<'_>]| match &args[0] {
                Value::Double(v) => Value::Str(Rc::from(v.to_string())),
                other => unreachable!("ftoa: {other:?}"),
            }),
        );

        registry.define(
            "atoi",
            FunctionType::new(vec![Type::String], Type::I64),
            Box::new(|args: &[Value<'_>]| match &args[0] {
                Value::Str(s) => Value::I64(s.trim().parse().unwrap_or(0)),
                other => unreachable!("atoi: {other:?}"),
            }),
        );

        registry.define(
            "atof",
            FunctionType::new(vec![Type::String], Type::Double),
            Box::new(|args: &[Value<'_>]| match &args[0] {
                Value::Str(s) => Value::Double(s.trim().parse().unwrap_or(0.0)),
                other => unreachable!("atof: {other:?}"),
            }),
        );

        registry
    }

    pub fn define(&mut self, name: &'static str, ty: FunctionType, imp: NativeImpl) {
        self.functions
            .insert(name, Rc::new(NativeFunction { name, ty, imp }));
    }

    /// Name and type of every native, for seeding the analyzer's globals.
    pub fn signatures(&self) -> Vec<(String, FunctionType)> {
        self.functions
            .iter()
            .map(|(&name, function)| (name.to_string(), function.ty.clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Rc<NativeFunction>)> {
        self.functions.iter().map(|(&name, function)| (name, function))
    }
}
