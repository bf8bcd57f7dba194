//! Runtime values.
//!
//! An untagged-union-by-enum of the primitive kinds plus callables.
//! Strings are shared and immutable; concatenation allocates. Integer
//! arithmetic wraps; division and remainder by zero abort.

use std::fmt;
use std::rc::Rc;

use aspen_par::{FunctionStmt, FunctionType};
use aspen_sem::Environment;

use crate::native::NativeImpl;

/// A runtime value. Cheap to clone: strings and callables are shared.
#[derive(Clone, Debug)]
pub enum Value<'ast> {
    I64(i64),
    U64(u64),
    Double(f64),
    Bool(bool),
    Str(Rc<str>),
    Native(Rc<NativeFunction>),
    Function(Rc<UserFunction<'ast>>),
    /// The result of calling a void function; never printable.
    Unit,
}

/// A host-provided callable with its declared type.
pub struct NativeFunction {
    pub name: &'static str,
    pub ty: FunctionType,
    pub imp: NativeImpl,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

/// A user function: its declaration plus the environment captured at the
/// point of declaration.
pub struct UserFunction<'ast> {
    pub declaration: &'ast FunctionStmt,
    pub closure: Environment<Value<'ast>>,
}

impl fmt::Debug for UserFunction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.identifier())
    }
}

impl PartialEq for Value<'_> {
    /// Deep equality for strings, structural for primitives, identity for
    /// callables.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Unit, Value::Unit) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value<'_> {
    /// The `print` rendering: strings without quotes, booleans as
    /// `true`/`false`, numbers in the host's default format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I64(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v}"),
            Value::Native(_) => write!(f, "<native fn>"),
            Value::Function(function) => {
                write!(f, "<fn {}>", function.declaration.name.identifier())
            }
            Value::Unit => write!(f, "void"),
        }
    }
}

impl<'ast> Value<'ast> {
    pub fn add(self, rhs: Value<'ast>) -> Value<'ast> {
        match (self, rhs) {
            (Value::I64(a), Value::I64(b)) => Value::I64(a.wrapping_add(b)),
            (Value::U64(a), Value::U64(b)) => Value::U64(a.wrapping_add(b)),
            (Value::Double(a), Value::Double(b)) => Value::Double(a + b),
            (Value::Str(a), Value::Str(b)) => {
                let mut text = String::with_capacity(a.len() + b.len());
                text.push_str(&a);
                text.push_str(&b);
                Value::Str(Rc::from(text))
            }
            (a, b) => unreachable!("Value::add: {a:?} + {b:?}"),
        }
    }

    pub fn subtract(self, rhs: Value<'ast>) -> Value<'ast> {
        match (self, rhs) {
            (Value::I64(a), Value::I64(b)) => Value::I64(a.wrapping_sub(b)),
            (Value::U64(a), Value::U64(b)) => Value::U64(a.wrapping_sub(b)),
            (Value::Double(a), Value::Double(b)) => Value::Double(a - b),
            (a, b) => unreachable!("Value::subtract: {a:?} - {b:?}"),
        }
    }

    pub fn multiply(self, rhs: Value<'ast>) -> Value<'ast> {
        match (self, rhs) {
            (Value::I64(a), Value::I64(b)) => Value::I64(a.wrapping_mul(b)),
            (Value::U64(a), Value::U64(b)) => Value::U64(a.wrapping_mul(b)),
            (Value::Double(a), Value::Double(b)) => Value::Double(a * b),
            (a, b) => unreachable!("Value::multiply: {a:?} * {b:?}"),
        }
    }

    pub fn divide(self, rhs: Value<'ast>) -> Value<'ast> {
        match (self, rhs) {
            (Value::I64(a), Value::I64(b)) => Value::I64(a.wrapping_div(b)),
            (Value::U64(a), Value::U64(b)) => Value::U64(a.wrapping_div(b)),
            (Value::Double(a), Value::Double(b)) => Value::Double(a / b),
            (a, b) => unreachable!("Value::divide: {a:?} / {b:?}"),
        }
    }

    pub fn remainder(self, rhs: Value<'ast>) -> Value<'ast> {
        match (self, rhs) {
            (Value::I64(a), Value::I64(b)) => Value::I64(a.wrapping_rem(b)),
            (Value::U64(a), Value::U64(b)) => Value::U64(a.wrapping_rem(b)),
            (a, b) => unreachable!("Value::remainder: {a:?} % {b:?}"),
        }
    }

    pub fn bit_or(self, rhs: Value<'ast>) -> Value<'ast> {
        match (self, rhs) {
            (Value::I64(a), Value::I64(b)) => Value::I64(a | b),
            (Value::U64(a), Value::U64(b)) => Value::U64(a | b),
            (a, b) => unreachable!("Value::bit_or: {a:?} | {b:?}"),
        }
    }

    pub fn bit_xor(self, rhs: Value<'ast>) -> Value<'ast> {
        match (self, rhs) {
            (Value::I64(a), Value::I64(b)) => Value::I64(a ^ b),
            (Value::U64(a), Value::U64(b)) => Value::U64(a ^ b),
            (a, b) => unreachable!("Value::bit_xor: {a:?} ^ {b:?}"),
        }
    }

    pub fn bit_and(self, rhs: Value<'ast>) -> Value<'ast> {
        match (self, rhs) {
            (Value::I64(a), Value::I64(b)) => Value::I64(a & b),
            (Value::U64(a), Value::U64(b)) => Value::U64(a & b),
            (a, b) => unreachable!("Value::bit_and: {a:?} & {b:?}"),
        }
    }

    pub fn greater(self, rhs: Value<'ast>) -> Value<'ast> {
        match (self, rhs) {
            (Value::I64(a), Value::I64(b)) => Value::Bool(a > b),
            (Value::U64(a), Value::U64(b)) => Value::Bool(a > b),
            (Value::Double(a), Value::Double(b)) => Value::Bool(a > b),
            (a, b) => unreachable!("Value::greater: {a:?} > {b:?}"),
        }
    }

    pub fn greater_equal(self, rhs: Value<'ast>) -> Value<'ast> {
        match (self, rhs) {
            (Value::I64(a), Value::I64(b)) => Value::Bool(a >= b),
            (Value::U64(a), Value::U64(b)) => Value::Bool(a >= b),
            (Value::Double(a), Value::Double(b)) => Value::Bool(a >= b),
            (a, b) => unreachable!("Value::greater_equal: {a:?} >= {b:?}"),
        }
    }

    pub fn less(self, rhs: Value<'ast>) -> Value<'ast> {
        match (self, rhs) {
            (Value::I64(a), Value::I64(b)) => Value::Bool(a < b),
            (Value::U64(a), Value::U64(b)) => Value::Bool(a < b),
            (Value::Double(a), Value::Double(b)) => Value::Bool(a < b),
            (a, b) => unreachable!("Value::less: {a:?} < {b:?}"),
        }
    }

    pub fn less_equal(self, rhs: Value<'ast>) -> Value<'ast> {
        match (self, rhs) {
            (Value::I64(a), Value::I64(b)) => Value::Bool(a <= b),
            (Value::U64(a), Value::U64(b)) => Value::Bool(a <= b),
            (Value::Double(a), Value::Double(b)) => Value::Bool(a <= b),
            (a, b) => unreachable!("Value::less_equal: {a:?} <= {b:?}"),
        }
    }

    pub fn negate(self) -> Value<'ast> {
        match self {
            Value::I64(v) => Value::I64(v.wrapping_neg()),
            Value::U64(v) => Value::U64(v.wrapping_neg()),
            Value::Double(v) => Value::Double(-v),
            v => unreachable!("Value::negate: -{v:?}"),
        }
    }
}
