//! Conversion between Rust field types and [`Value`].
//!
//! [`ToValue`] is the encode side: the value written into a bin and the emptiness test
//! used by `omitempty` and by metadata routing. [`FromValue`] is the coercion engine used
//! by the decoder whenever a loosely-typed bin value must populate a statically-typed
//! field.
//!
//! ## Coercion Rules
//!
//! * A [`Value::Nil`] source yields the destination's zero value (`None` for
//!   optional fields). This is never an error.
//! * Strings accept text, integers (base 10), floats (shortest round-trip text) and
//!   booleans.
//! * Integers accept any integer (narrowing `as` cast, no overflow check), floats
//!   (truncated toward zero) and base-10 text.
//! * Floats accept floats, integers and decimal text.
//! * Booleans accept booleans, `true`/`false`-style text and numbers (non-zero is
//!   `true`).
//! * Sequences and maps convert element by element and report the failing index or side.
//! * `Option<T>` coerces into `T` and wraps the result.
//! * Nested structs deriving [`Mapped`](crate::Mapped) convert from a map keyed by bin
//!   name.
//! * Timestamps (`chrono::DateTime<Utc>`, feature `chrono`) parse RFC-3339 text.

use crate::error::{MapperError, Result};
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// Types that can be written into a bin.
pub trait ToValue {
    /// Converts the field into its bin representation.
    fn to_value(&self) -> Result<Value>;

    /// Reports whether the field holds its type's empty value.
    ///
    /// Empty means: zero-length strings and collections, `false`, numeric zero, `None`
    /// or `Some` of an empty value, [`Value::Nil`] and the zero timestamp. Nested structs
    /// are never empty.
    fn is_empty_value(&self) -> bool;

    /// Encodes a `Vec<Self>`. Lists by default; `u8` overrides it to write raw bytes.
    #[doc(hidden)]
    fn slice_to_value(items: &[Self]) -> Result<Value>
    where
        Self: Sized,
    {
        items
            .iter()
            .map(ToValue::to_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    }
}

/// Types that can be populated from a bin.
pub trait FromValue: Sized {
    /// Coerces a loosely-typed value into `Self`.
    fn from_value(value: &Value) -> Result<Self>;

    /// Assigns a record counter (generation or expiration).
    ///
    /// Only integer types support this; the value is range-checked before narrowing.
    fn from_counter(value: u32) -> Result<Self> {
        let _ = value;
        Err(MapperError::Unsupported(
            std::any::type_name::<Self>().to_string(),
        ))
    }
}

fn parse_error(text: &str, target: &str, err: impl std::fmt::Display) -> MapperError {
    MapperError::Conversion(format!("cannot convert string '{text}' to {target}: {err}"))
}

// --- INTEGERS ---

macro_rules! impl_integer {
    (@impl $t:ty { $($extra:tt)* }) => {
        impl ToValue for $t {
            fn to_value(&self) -> Result<Value> {
                Ok(Value::Int(*self as i64))
            }

            fn is_empty_value(&self) -> bool {
                *self == 0
            }

            $($extra)*
        }

        impl FromValue for $t {
            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::Nil => Ok(0),
                    Value::Int(i) => Ok(*i as $t),
                    Value::Float(x) => Ok(*x as i64 as $t),
                    Value::String(s) => s
                        .parse::<i64>()
                        .map(|i| i as $t)
                        .map_err(|e| parse_error(s, "int", e)),
                    other => Err(MapperError::cannot_convert(other.kind(), "int")),
                }
            }

            fn from_counter(value: u32) -> Result<Self> {
                <$t>::try_from(value).map_err(|_| MapperError::Overflow {
                    value: u64::from(value),
                    target: stringify!($t).to_string(),
                })
            }
        }
    };
    ($($t:ty),*) => {
        $( impl_integer!(@impl $t {}); )*
    };
}

impl_integer!(i8, i16, i32, i64, isize, u16, u32, u64, usize);
impl_integer!(@impl u8 {
    fn slice_to_value(items: &[Self]) -> Result<Value> {
        Ok(Value::Bytes(items.to_vec()))
    }
});

// --- FLOATS ---

macro_rules! impl_float {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Result<Value> {
                    Ok(Value::Float(f64::from(*self)))
                }

                fn is_empty_value(&self) -> bool {
                    *self == 0.0
                }
            }

            impl FromValue for $t {
                fn from_value(value: &Value) -> Result<Self> {
                    match value {
                        Value::Nil => Ok(0.0),
                        Value::Float(x) => Ok(*x as $t),
                        Value::Int(i) => Ok(*i as f64 as $t),
                        Value::String(s) => s
                            .parse::<f64>()
                            .map(|x| x as $t)
                            .map_err(|e| parse_error(s, "float", e)),
                        other => Err(MapperError::cannot_convert(other.kind(), "float")),
                    }
                }
            }
        )*
    }
}

impl_float!(f32, f64);

// --- BOOL ---

fn parse_bool(text: &str) -> Result<bool> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(parse_error(text, "bool", "invalid syntax")),
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Bool(*self))
    }

    fn is_empty_value(&self) -> bool {
        !*self
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Nil => Ok(false),
            Value::Bool(b) => Ok(*b),
            Value::String(s) => parse_bool(s),
            Value::Int(i) => Ok(*i != 0),
            Value::Float(x) => Ok(*x != 0.0),
            other => Err(MapperError::cannot_convert(other.kind(), "bool")),
        }
    }
}

// --- STRING ---

impl ToValue for String {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::String(self.clone()))
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Nil => Ok(String::new()),
            Value::String(s) => Ok(s.clone()),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(x) => Ok(x.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(MapperError::cannot_convert(other.kind(), "string")),
        }
    }
}

// --- VALUE (the "any" type) ---

impl ToValue for Value {
    fn to_value(&self) -> Result<Value> {
        Ok(self.clone())
    }

    fn is_empty_value(&self) -> bool {
        self.is_nil()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

// --- OPTIONAL ---

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Result<Value> {
        match self {
            Some(inner) => inner.to_value(),
            None => Ok(Value::Nil),
        }
    }

    fn is_empty_value(&self) -> bool {
        self.as_ref().is_none_or(ToValue::is_empty_value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        if value.is_nil() {
            return Ok(None);
        }
        T::from_value(value).map(Some)
    }
}

// --- SEQUENCES ---

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Result<Value> {
        T::slice_to_value(self)
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

fn convert_element<T: FromValue>(index: usize, item: &Value) -> Result<T> {
    T::from_value(item).map_err(|e| MapperError::Element {
        index,
        source: Box::new(e),
    })
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Nil => Ok(Vec::new()),
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| convert_element(i, item))
                .collect(),
            Value::Bytes(bytes) => bytes
                .iter()
                .enumerate()
                .map(|(i, b)| convert_element(i, &Value::Int(i64::from(*b))))
                .collect(),
            other => Err(MapperError::cannot_convert(other.kind(), "slice")),
        }
    }
}

impl<const N: usize> ToValue for [u8; N] {
    fn to_value(&self) -> Result<Value> {
        Ok(Value::Bytes(self.to_vec()))
    }

    fn is_empty_value(&self) -> bool {
        N == 0
    }
}

impl<const N: usize> FromValue for [u8; N] {
    fn from_value(value: &Value) -> Result<Self> {
        let bytes: Vec<u8> = match value {
            Value::Nil => return Ok([0; N]),
            Value::Bytes(bytes) => bytes.clone(),
            Value::List(_) => Vec::<u8>::from_value(value)?,
            other => return Err(MapperError::cannot_convert(other.kind(), "byte array")),
        };
        <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
            MapperError::Conversion(format!(
                "cannot convert {} bytes to array of length {N}",
                bytes.len()
            ))
        })
    }
}

// --- MAPS ---

fn convert_entry<K: FromValue, V: FromValue>(key: &Value, value: &Value) -> Result<(K, V)> {
    let key = K::from_value(key).map_err(|e| MapperError::MapEntry {
        side: "key",
        source: Box::new(e),
    })?;
    let value = V::from_value(value).map_err(|e| MapperError::MapEntry {
        side: "value",
        source: Box::new(e),
    })?;
    Ok((key, value))
}

fn map_to_value<'a, K, V>(entries: impl Iterator<Item = (&'a K, &'a V)>) -> Result<Value>
where
    K: ToValue + 'a,
    V: ToValue + 'a,
{
    let mut pairs = entries
        .map(|(k, v)| Ok((k.to_value()?, v.to_value()?)))
        .collect::<Result<Vec<_>>>()?;
    // hash maps iterate in arbitrary order; equal maps must encode equal
    pairs.sort_by(|a, b| a.0.canonical_cmp(&b.0));
    Ok(Value::Map(pairs))
}

impl<K, V, S> ToValue for HashMap<K, V, S>
where
    K: ToValue,
    V: ToValue,
{
    fn to_value(&self) -> Result<Value> {
        map_to_value(self.iter())
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> FromValue for HashMap<K, V, S>
where
    K: FromValue + Eq + Hash,
    V: FromValue,
    S: BuildHasher + Default,
{
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Nil => Ok(HashMap::default()),
            Value::Map(pairs) => pairs.iter().map(|(k, v)| convert_entry(k, v)).collect(),
            other => Err(MapperError::cannot_convert(other.kind(), "map")),
        }
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Result<Value> {
        map_to_value(self.iter())
    }

    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K: FromValue + Ord, V: FromValue> FromValue for BTreeMap<K, V> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Nil => Ok(BTreeMap::new()),
            Value::Map(pairs) => pairs.iter().map(|(k, v)| convert_entry(k, v)).collect(),
            other => Err(MapperError::cannot_convert(other.kind(), "map")),
        }
    }
}

// --- TIMESTAMP ---

#[cfg(feature = "chrono")]
mod timestamp {
    use super::*;
    use chrono::{DateTime, SecondsFormat, Utc};

    /// Written as RFC-3339 text.
    ///
    /// The Unix epoch (`DateTime::<Utc>::default()`) is the zero timestamp, so a genuine
    /// `1970-01-01T00:00:00Z` counts as empty and is dropped under `omitempty`.
    impl ToValue for DateTime<Utc> {
        fn to_value(&self) -> Result<Value> {
            Ok(Value::String(
                self.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ))
        }

        fn is_empty_value(&self) -> bool {
            *self == DateTime::<Utc>::default()
        }
    }

    impl FromValue for DateTime<Utc> {
        fn from_value(value: &Value) -> Result<Self> {
            match value {
                Value::Nil => Ok(DateTime::<Utc>::default()),
                Value::String(s) => DateTime::parse_from_rfc3339(s)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| parse_error(s, "timestamp", e)),
                other => Err(MapperError::cannot_convert(other.kind(), "timestamp")),
            }
        }
    }
}
