//! # aeromap
//!
//! Annotation-driven mapping between strongly typed Rust structs and generic
//! key/metadata/bin records.
//!
//! ## Overview
//!
//! A record is made of a key (namespace, set name, digest and an optional user key), two
//! housekeeping counters (generation and expiration) and a map of named *bins* holding
//! loosely typed [`Value`]s. Instead of writing conversion code by hand, annotate the
//! fields of a struct and let the mapper walk it:
//!
//! *   **Encode:** [`encode`] turns a struct into a [`Record`]. Metadata fields are routed
//!     to the key and counters, ordinary fields become bins.
//! *   **Decode:** [`decode`] populates a struct from anything implementing
//!     [`RecordSource`], coercing bin values to the declared field types (numeric
//!     narrowing, string parsing, element-wise collections, nested structs).
//! *   **Inspect:** [`Mapper::inspect`] prints how a type maps, which helps when an
//!     annotation does not do what you expect.
//!
//! ## Annotations
//!
//! ```text
//! #[aero("name")]              bin "name"
//! #[aero("name,omitempty")]    bin "name", skipped on encode when empty
//! #[aero("name,omit")]         never written on encode, still read on decode
//! #[aero("meta,generation")]   metadata: generation, expiration, namespace,
//!                              set_name, digest, user_key
//! #[aero(flatten)]             embedded struct, contributes to the same record
//! ```
//!
//! Fields without an `aero` attribute (or with an empty tag) are not mapped. A tag is
//! parsed once per type; a malformed tag is reported by every encode and decode of that
//! type.
//!
//! ## Usage
//!
//! ```rust
//! use aeromap::{Key, Mapped, Metadata, decode, encode};
//!
//! #[derive(Debug, Default, PartialEq, Mapped)]
//! struct Movie {
//!     #[aero(flatten)]
//!     key: Key,
//!     #[aero(flatten)]
//!     metadata: Metadata,
//!     #[aero("title")]
//!     title: String,
//!     #[aero("year,omitempty")]
//!     year: u16,
//! }
//!
//! # fn main() -> aeromap::Result<()> {
//! let movie = Movie { title: "Alien".into(), year: 1979, ..Movie::default() };
//! let record = encode(&movie)?;
//! assert_eq!(record.bins.len(), 2);
//!
//! let mut copy = Movie::default();
//! decode(&record, &mut copy)?;
//! assert_eq!(copy, movie);
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and spans: schema construction at `debug`, skipped
//! and absent bins at `trace`. No subscriber is installed.
//!
//! ### Safety and Error Handling
//!
//! * **No Unsafe:** the crate forbids `unsafe` code.
//! * **No Panics:** No `unwrap()` or `panic!()` calls in the library (enforced by clippy lints).
//! * **Comprehensive Errors:** All failures correspond to a [`MapperError`] variant,
//!   wrapped with the field, element or map side where they happened.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

// Generated code refers to `aeromap::...`, which must also resolve inside this crate.
extern crate self as aeromap;

// --- PUBLIC API MODULES ---
pub mod api;
pub mod convert;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod inspector;
pub mod metadata;
pub mod schema;
pub mod source;
pub mod tag;
pub mod value;

// --- MACRO SUPPORT MODULES ---

/// Runtime utilities used by the derived code.
#[doc(hidden)]
pub mod rt;

// --- RE-EXPORTS ---

pub use api::Mapper;
pub use convert::{FromValue, ToValue};
pub use decoder::decode;
pub use encoder::encode;
pub use error::{MapperError, Result};
pub use inspector::{MappingInspector, MappingReport};
pub use metadata::{Key, KeyValue, Metadata, Record};
pub use schema::{BinValue, Mapped, Schema};
pub use source::{Component, RecordKey, RecordSource, Shape, UserValue};
pub use tag::{Directive, MetaTag};
pub use value::{Bins, Value};

// Re-export the derive macro so it is accessible as `aeromap::Mapped`
pub use aeromap_derive::Mapped;
