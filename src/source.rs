//! Capability traits describing the records the decoder reads from.
//!
//! The mapper does not own the storage client's record, key or value types. Instead,
//! those types describe themselves through [`RecordSource`] and [`RecordKey`]:
//!
//! * a *record* exposes an optional key, a bin map and the generation/expiration
//!   counters;
//! * a *batch record* wraps a record (plus error and result fields the mapper ignores);
//! * a *key* exposes namespace, set name, digest and the optional user key value.
//!
//! [`Shape`] lists the components of a source in declaration order. The decoder visits
//! them in that order, which decides the order in which destination fields are written.

use crate::value::Value;
use std::fmt;

/// A recognized piece of a record-shaped source.
pub enum Component<'a> {
    /// A batch-record wrapper. Decoded recursively.
    BatchRecord(&'a dyn RecordSource),
    /// A nested record. Its counters and its own components are decoded.
    Record(&'a dyn RecordSource),
    /// A key. Only present when the key is set.
    Key(&'a dyn RecordKey),
    /// A bin map.
    Bins(&'a crate::value::Bins),
    /// A bare generation counter.
    Generation,
    /// A bare expiration counter.
    Expiration,
}

/// The structural view of a decode source.
pub enum Shape<'a> {
    /// A struct with the listed components, possibly none.
    Struct {
        /// Type name used in lookup errors.
        name: &'static str,
        /// Recognized components in declaration order.
        components: Vec<Component<'a>>,
    },
    /// Anything that is not a struct: scalars, sequences, absent pointers.
    Other(&'static str),
}

/// A value the decoder can read from.
pub trait RecordSource {
    /// Structural view of the value.
    fn shape(&self) -> Shape<'_>;

    /// The generation counter, if the type has one.
    fn generation(&self) -> Option<u32> {
        None
    }

    /// The expiration counter, if the type has one.
    fn expiration(&self) -> Option<u32> {
        None
    }
}

/// The key accessors the decoder needs.
pub trait RecordKey {
    /// Namespace of the key.
    fn namespace(&self) -> &str;

    /// Set name of the key.
    fn set_name(&self) -> &str;

    /// The user key, if the key carries one.
    fn value(&self) -> Option<&dyn UserValue>;

    /// The 20-byte digest.
    fn digest(&self) -> &[u8];
}

/// A user key value with its string form and its underlying object.
pub trait UserValue: fmt::Display {
    /// The wrapped value.
    fn underlying_value(&self) -> Value;
}

impl UserValue for Value {
    fn underlying_value(&self) -> Value {
        self.clone()
    }
}

// --- NON-STRUCT SOURCES ---

macro_rules! impl_other_source {
    ($($t:ty),*) => {
        $(
            impl RecordSource for $t {
                fn shape(&self) -> Shape<'_> {
                    Shape::Other(stringify!($t))
                }
            }
        )*
    }
}

impl_other_source!(
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, String, str, Value
);

impl<T> RecordSource for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Other("Vec")
    }
}

impl<T> RecordSource for [T] {
    fn shape(&self) -> Shape<'_> {
        Shape::Other("slice")
    }
}

// --- POINTERS ---

impl<T: RecordSource + ?Sized> RecordSource for &T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }

    fn generation(&self) -> Option<u32> {
        (**self).generation()
    }

    fn expiration(&self) -> Option<u32> {
        (**self).expiration()
    }
}

impl<T: RecordSource + ?Sized> RecordSource for Box<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }

    fn generation(&self) -> Option<u32> {
        (**self).generation()
    }

    fn expiration(&self) -> Option<u32> {
        (**self).expiration()
    }
}

impl<T: RecordSource> RecordSource for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(inner) => inner.shape(),
            None => Shape::Other("None"),
        }
    }

    fn generation(&self) -> Option<u32> {
        self.as_ref().and_then(RecordSource::generation)
    }

    fn expiration(&self) -> Option<u32> {
        self.as_ref().and_then(RecordSource::expiration)
    }
}
