//! The type-conversion registry: one coercion per legal `(from, to)` pair.
//!
//! Built over the analyzer's conversion table, so a cast that passed
//! analysis always finds its coercion here.

use aspen_par::Type;
use aspen_sem::cast::CONVERSIONS;

use crate::value::Value;

type Coerce = for<'a> fn(Value<'a>) -> Value<'a>;

struct CastEntry {
    from: Type,
    to: Type,
    coerce: Coerce,
}

pub struct CastRegistry {
    entries: Vec<CastEntry>,
}

impl Default for CastRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl CastRegistry {
    /// One entry per pair in the analyzer's conversion table.
    pub fn standard() -> Self {
        let entries = CONVERSIONS
            .iter()
            .map(|(from, to)| CastEntry {
                from: from.clone(),
                to: to.clone(),
                coerce: coercion(from, to),
            })
            .collect();
        Self { entries }
    }

    /// Applies the registered coercion for `(from, to)`.
    pub fn coerce<'a>(&self, from: &Type, to: &Type, value: Value<'a>) -> Value<'a> {
        let entry = self
            .entries
            .iter()
            .find(|entry| &entry.from == from && &entry.to == to)
            .unwrap_or_else(|| {
                unreachable!("CastRegistry::coerce: no conversion from {from} to {to}")
            });
        (entry.coerce)(value)
    }
}

fn coercion(from: &Type, to: &Type) -> Coerce {
    match (from, to) {
        (Type::I64, Type::U64) => i64_to_u64,
        (Type::U64, Type::I64) => u64_to_i64,
        (Type::I64, Type::Double) => i64_to_double,
        (Type::Double, Type::I64) => double_to_i64,
        (Type::U64, Type::Double) => u64_to_double,
        (Type::Double, Type::U64) => double_to_u64,
        _ => unreachable!("coercion: no conversion from {from} to {to}"),
    }
}

fn i64_to_u64(value: Value<'_>) -> Value<'_> {
    match value {
        Value::I64(v) => Value::U64(v as u64),
        other => unreachable!("i64_to_u64: {other:?}"),
    }
}

fn u64_to_i64(value: Value<'_>) -> Value<'_> {
    match value {
        Value::U64(v) => Value::I64(v as i64),
        other => unreachable!("u64_to_i64: {other:?}"),
    }
}

fn i64_to_double(value: Value<'_>) -> Value<'_> {
    match value {
        Value::I64(v) => Value::Double(v as f64),
        other => unreachable!("i64_to_double: {other:?}"),
    }
}

fn double_to_i64(value: Value<'_>) -> Value<'_> {
    match value {
        Value::Double(v) => Value::I64(v as i64),
        other => unreachable!("double_to_i64: {other:?}"),
    }
}

fn u64_to_double(value: Value<'_>) -> Value<'_> {
    match value {
        Value::U64(v) => Value::Double(v as f64),
        other => unreachable!("u64_to_double: {other:?}"),
    }
}

fn double_to_u64(value: Value<'_>) -> Value<'_> {
    match value {
        Value::Double(v) => Value::U64(v as u64),
        other => unreachable!("double_to_u64: {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspen_sem::cast::is_conversion_legal;

    #[test]
    fn every_legal_conversion_has_a_coercion() {
        // the registry is built from the analyzer's table, so a legal cast
        // can never reach the evaluator without a handler
        let registry = CastRegistry::standard();
        for (from, to) in &CONVERSIONS {
            assert!(is_conversion_legal(from, to));
            assert!(registry
                .entries
                .iter()
                .any(|entry| &entry.from == from && &entry.to == to));
        }
        assert_eq!(registry.entries.len(), CONVERSIONS.len());
    }

    #[test]
    fn conversions_between_integer_kinds_reinterpret() {
        let registry = CastRegistry::standard();
        assert_eq!(
            registry.coerce(&Type::I64, &Type::U64, Value::I64(-1)),
            Value::U64(u64::MAX)
        );
        assert_eq!(
            registry.coerce(&Type::U64, &Type::I64, Value::U64(u64::MAX)),
            Value::I64(-1)
        );
    }

    #[test]
    fn conversions_to_double_and_back_truncate() {
        let registry = CastRegistry::standard();
        assert_eq!(
            registry.coerce(&Type::I64, &Type::Double, Value::I64(3)),
            Value::Double(3.0)
        );
        assert_eq!(
            registry.coerce(&Type::Double, &Type::I64, Value::Double(2.9)),
            Value::I64(2)
        );
        assert_eq!(
            registry.coerce(&Type::U64, &Type::Double, Value::U64(8)),
            Value::Double(8.0)
        );
        assert_eq!(
            registry.coerce(&Type::Double, &Type::U64, Value::Double(2.9)),
            Value::U64(2)
        );
    }
}
