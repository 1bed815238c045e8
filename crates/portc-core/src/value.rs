//! Compile-time constant values.

use std::fmt;

use ordered_float::OrderedFloat;

use crate::EnumId;

/// A folded constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstValue {
    Bool(bool),
    /// Any integer-typed constant (`byte`, `int` or `long`).
    Int(i64),
    /// Any floating constant (`float` or `double`).
    Float(OrderedFloat<f64>),
    String(String),
    Enum { id: EnumId, value: i64 },
    Array(Vec<ConstValue>),
    Null,
}

impl ConstValue {
    pub fn float(value: f64) -> Self {
        ConstValue::Float(OrderedFloat(value))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view, including the underlying value of an enum constant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConstValue::Int(v) | ConstValue::Enum { value: v, .. } => Some(*v),
            _ => None,
        }
    }

    /// Floating view; integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConstValue::Float(v) => Some(v.0),
            ConstValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Bool(b) => write!(f, "{b}"),
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Float(v) => write!(f, "{:?}", v.0),
            ConstValue::String(s) => write!(f, "{s:?}"),
            ConstValue::Enum { value, .. } => write!(f, "{value}"),
            ConstValue::Array(items) => {
                f.write_str("{ ")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(" }")
            }
            ConstValue::Null => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_views() {
        assert_eq!(ConstValue::Int(4).as_int(), Some(4));
        assert_eq!(
            ConstValue::Enum {
                id: EnumId(0),
                value: 6
            }
            .as_int(),
            Some(6)
        );
        assert_eq!(ConstValue::Int(2).as_f64(), Some(2.0));
        assert_eq!(ConstValue::Bool(true).as_int(), None);
    }

    #[test]
    fn display_formats() {
        assert_eq!(ConstValue::float(1.5).to_string(), "1.5");
        assert_eq!(ConstValue::String("a\"b".into()).to_string(), "\"a\\\"b\"");
        let arr = ConstValue::Array(vec![ConstValue::Int(1), ConstValue::Int(2)]);
        assert_eq!(arr.to_string(), "{ 1, 2 }");
    }
}
