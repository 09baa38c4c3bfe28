//! The dynamically-typed value stored in record bins.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// The bin map of a record: bin name to value. Names are unique.
pub type Bins = HashMap<String, Value>;

/// A loosely-typed bin value.
///
/// The variant set is closed: every Rust field type supported by the mapper converts to
/// and from one of these shapes. Unsigned integers are stored two's-complement in
/// [`Value::Int`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent value (nil user key, `None` optional field).
    #[default]
    Nil,
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// UTF-8 text.
    String(String),
    /// Boolean.
    Bool(bool),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Ordered sequence.
    List(Vec<Value>),
    /// Key/value pairs. Key order carries no meaning.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Short name of the variant, used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Returns `true` for [`Value::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns the string slice of a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a string key in a [`Value::Map`].
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(pairs) => pairs
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Nil => 0,
            Self::Bool(_) => 1,
            Self::Int(_) => 2,
            Self::Float(_) => 3,
            Self::String(_) => 4,
            Self::Bytes(_) => 5,
            Self::List(_) => 6,
            Self::Map(_) => 7,
        }
    }

    /// Total order used to lay out encoded map pairs: by variant, then by content.
    pub(crate) fn canonical_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::Bytes(a), Self::Bytes(b)) => a.cmp(b),
            (Self::List(a), Self::List(b)) => a
                .iter()
                .zip(b)
                .map(|(x, y)| x.canonical_cmp(y))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Self::Map(a), Self::Map(b)) => a
                .iter()
                .zip(b)
                .map(|((xk, xv), (yk, yv))| xk.canonical_cmp(yk).then_with(|| xv.canonical_cmp(yv)))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => Ok(()),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Bytes(b) => f.write_str(&hex::encode(b)),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(v as i64)
                }
            }
        )*
    }
}

impl_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_groups_by_variant() {
        let mut values = vec![
            Value::from("b"),
            Value::Int(2),
            Value::Nil,
            Value::from("a"),
            Value::Int(-1),
            Value::List(vec![Value::Int(1)]),
            Value::List(vec![]),
        ];
        values.sort_by(Value::canonical_cmp);
        assert_eq!(
            values,
            vec![
                Value::Nil,
                Value::Int(-1),
                Value::Int(2),
                Value::from("a"),
                Value::from("b"),
                Value::List(vec![]),
                Value::List(vec![Value::Int(1)]),
            ]
        );
    }

    #[test]
    fn display_is_plain_text() {
        assert_eq!(Value::from("key1").to_string(), "key1");
        assert_eq!(Value::from(10).to_string(), "10");
        assert_eq!(Value::Nil.to_string(), "");
        assert_eq!(Value::Bytes(vec![0xab, 0x01]).to_string(), "ab01");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "[1, 2]");
        let map = Value::Map(vec![(Value::from("a"), Value::from(1))]);
        assert_eq!(map.to_string(), "{a: 1}");
    }

    #[test]
    fn map_lookup_by_string_key() {
        let map = Value::Map(vec![
            (Value::from("a"), Value::from(1)),
            (Value::from(2), Value::from("two")),
        ]);
        assert_eq!(map.get("a"), Some(&Value::Int(1)));
        assert_eq!(map.get("2"), None);
        assert_eq!(Value::from(1).get("a"), None);
    }

    #[test]
    fn unsigned_wraps_into_int() {
        assert_eq!(Value::from(u64::MAX), Value::Int(-1));
        assert_eq!(Value::from(None::<i32>), Value::Nil);
    }
}
