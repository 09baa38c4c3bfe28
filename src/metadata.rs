//! Embeddable metadata containers and the encoded [`Record`].
//!
//! Flatten [`Key`], [`KeyValue`] and [`Metadata`] into an application struct to receive
//! key and record housekeeping data on decode, or to provide it on encode:
//!
//! ```rust
//! use aeromap::{Key, KeyValue, Mapped, Metadata};
//!
//! #[derive(Debug, Default, Mapped)]
//! struct Movie {
//!     #[aero(flatten)]
//!     key: Key,
//!     #[aero(flatten)]
//!     key_value: KeyValue,
//!     #[aero(flatten)]
//!     metadata: Metadata,
//!     #[aero("title")]
//!     title: String,
//! }
//! ```

use crate::source::{Component, RecordKey, RecordSource, Shape, UserValue};
use crate::value::{Bins, Value};
use aeromap_derive::Mapped;
use serde::{Deserialize, Serialize};

/// Record key details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Mapped)]
pub struct Key {
    /// Namespace of the record.
    #[aero("meta,namespace")]
    pub namespace: String,
    /// Set name of the record.
    #[aero("meta,set_name")]
    pub set_name: String,
    /// Digest of the record key.
    #[aero("meta,digest")]
    pub digest: [u8; 20],
}

/// The user key of a record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Mapped)]
pub struct KeyValue {
    /// User-defined key. Any value the storage layer supports.
    #[aero("meta,user_key")]
    pub user_key: Value,
}

/// Record generation and expiration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Mapped)]
pub struct Metadata {
    /// Number of times the record has been updated.
    #[aero("meta,generation")]
    pub generation: u32,
    /// Seconds until the record expires.
    #[aero("meta,expiration")]
    pub expiration: u32,
}

/// The record produced by [`encode`](crate::encode).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Namespace, set name and digest.
    pub key: Key,
    /// User key.
    pub key_value: KeyValue,
    /// Generation and expiration.
    pub metadata: Metadata,
    /// Bin name to value.
    pub bins: Bins,
}

impl Record {
    /// Returns the value of bin `name`.
    pub fn bin(&self, name: &str) -> Option<&Value> {
        self.bins.get(name)
    }
}

impl RecordSource for Record {
    fn shape(&self) -> Shape<'_> {
        Shape::Struct {
            name: "Record",
            components: vec![
                Component::Key(self),
                Component::Bins(&self.bins),
                Component::Generation,
                Component::Expiration,
            ],
        }
    }

    fn generation(&self) -> Option<u32> {
        Some(self.metadata.generation)
    }

    fn expiration(&self) -> Option<u32> {
        Some(self.metadata.expiration)
    }
}

impl RecordKey for Record {
    fn namespace(&self) -> &str {
        &self.key.namespace
    }

    fn set_name(&self) -> &str {
        &self.key.set_name
    }

    fn value(&self) -> Option<&dyn UserValue> {
        let user_key = &self.key_value.user_key;
        (!user_key.is_nil()).then_some(user_key as &dyn UserValue)
    }

    fn digest(&self) -> &[u8] {
        &self.key.digest
    }
}
