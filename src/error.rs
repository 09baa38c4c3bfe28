//! Centralized error handling for aeromap.
//!
//! Every failure in the mapper is reported through [`MapperError`]. Library code never
//! panics; all conditions propagate through [`Result`] and the first error at any
//! recursion depth aborts the whole `encode` / `decode` call.
//!
//! ## Error Categories
//!
//! - **Source shape** ([`MapperError::InvalidSourceType`], [`MapperError::InvalidSource`]):
//!   the decode source is not a struct, or is a struct without any record component.
//! - **Annotations** ([`MapperError::InvalidTag`]): a malformed `aero` tag.
//! - **Types** ([`MapperError::TypeMismatch`], [`MapperError::Conversion`],
//!   [`MapperError::Unsupported`], [`MapperError::Overflow`]): a value cannot be placed
//!   into its destination.
//! - **Lookup** ([`MapperError::NotFound`]): a named field or accessor is missing.
//! - **Context** ([`MapperError::Field`], [`MapperError::Element`],
//!   [`MapperError::MapEntry`], [`MapperError::Nested`]): wrap an underlying error with
//!   the location where it happened. The wrapped error is available through `source()`.
//!
//! ## Partial Mutation
//!
//! A failed `decode` may already have written some fields of the destination. There is
//! no rollback; treat any error as a potentially partially-mutated destination.
//!
//! ```rust
//! use aeromap::{Mapped, MapperError};
//!
//! #[derive(Default, Mapped)]
//! struct Movie {
//!     #[aero("title")]
//!     title: String,
//! }
//!
//! let mut movie = Movie::default();
//! let result = aeromap::decode(&42_i64, &mut movie);
//! assert_eq!(result, Err(MapperError::InvalidSourceType));
//! ```

/// A specialized `Result` type for mapper operations.
pub type Result<T> = std::result::Result<T, MapperError>;

/// The error enum covering every failure of the mapper.
///
/// The type is `Clone` so that schema construction failures can be cached per struct
/// type and handed out to every caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapperError {
    /// The decode source is neither a struct nor a pointer to one.
    #[error("source must be a struct or a pointer to a struct")]
    InvalidSourceType,

    /// The decode source is struct-shaped but carries none of the record components
    /// (batch record, record, bin map, generation/expiration).
    #[error("source does not contain a record")]
    InvalidSource,

    /// A field annotation has more than one unlabeled token.
    #[error("invalid tag: {0}")]
    InvalidTag(String),

    /// A metadata field's declared type does not match the slot it is routed to.
    #[error("type mismatch for '{name}': expected {expected}, got {found}")]
    TypeMismatch {
        /// Metadata name or accessor involved.
        name: String,
        /// Type required by the destination.
        expected: String,
        /// Type actually provided.
        found: String,
    },

    /// A value could not be converted to the destination type.
    #[error("{0}")]
    Conversion(String),

    /// The destination field type does not support the requested assignment.
    #[error("unsupported field type: {0}")]
    Unsupported(String),

    /// A numeric metadata value does not fit into the destination field.
    #[error("value '{value}' overflows destination type '{target}'")]
    Overflow {
        /// The source value.
        value: u64,
        /// The destination type.
        target: String,
    },

    /// A named field or accessor is missing from a type.
    #[error("{name} not found on type {owner}")]
    NotFound {
        /// The missing field or accessor.
        name: String,
        /// The type that was searched.
        owner: String,
    },

    /// A failure while converting the value of a named field.
    #[error("error converting value for field {field}: {source}")]
    Field {
        /// Rust field name or metadata tag.
        field: String,
        /// The underlying failure.
        #[source]
        source: Box<MapperError>,
    },

    /// A failure while converting a sequence element.
    #[error("error converting slice element at index {index}: {source}")]
    Element {
        /// Position of the offending element.
        index: usize,
        /// The underlying failure.
        #[source]
        source: Box<MapperError>,
    },

    /// A failure while converting a map key or value.
    #[error("error converting map {side}: {source}")]
    MapEntry {
        /// `"key"` or `"value"`.
        side: &'static str,
        /// The underlying failure.
        #[source]
        source: Box<MapperError>,
    },

    /// A failure while mapping a nested struct.
    #[error("error mapping nested struct {target}: {source}")]
    Nested {
        /// The nested struct type.
        target: String,
        /// The underlying failure.
        #[source]
        source: Box<MapperError>,
    },
}

impl MapperError {
    /// Builds a [`MapperError::Conversion`] for a value of `found` kind that cannot
    /// become a `target`.
    pub fn cannot_convert(found: impl std::fmt::Display, target: impl std::fmt::Display) -> Self {
        Self::Conversion(format!("cannot convert {found} to {target}"))
    }

    /// Wraps `self` with the name of the field being processed.
    pub fn in_field(self, field: impl Into<String>) -> Self {
        Self::Field {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping context wrappers.
    pub fn root_cause(&self) -> &MapperError {
        match self {
            Self::Field { source, .. }
            | Self::Element { source, .. }
            | Self::MapEntry { source, .. }
            | Self::Nested { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
