//! Parsing of `aero` field annotations.
//!
//! A tag is a comma-separated list of tokens. Three tokens are reserved flags
//! (`meta`, `omit`, `omitempty`); any other token is the bin name (or, together with
//! `meta`, the metadata name). Whitespace around tokens is ignored.
//!
//! ```text
//! #[aero("title")]              bin "title"
//! #[aero("desc, omitempty")]    bin "desc", skipped when empty
//! #[aero("label,omit")]         never written
//! #[aero("meta,generation")]    routed to the record generation
//! ```

use crate::error::{MapperError, Result};
use serde::Serialize;
use std::fmt;

const TAG_META: &str = "meta";
const TAG_OMIT: &str = "omit";
const TAG_OMIT_EMPTY: &str = "omitempty";

/// The parsed form of one field annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Directive {
    /// The field is routed to record metadata instead of a bin.
    pub is_metadata: bool,
    /// The field is never written to the bin map.
    pub omit: bool,
    /// The field is skipped when it holds an empty value.
    pub omit_empty: bool,
    /// Bin name, or metadata name when `is_metadata` is set. May be empty.
    pub name: String,
}

impl Directive {
    /// Parses a tag string.
    ///
    /// A second unlabeled token is ambiguous and rejected. A lone `meta` without a name
    /// does not enable metadata routing: the field becomes an ordinary bin called `meta`.
    ///
    /// The empty tag means "not mapped" and is filtered out before this point.
    pub fn parse(tag: &str) -> Result<Self> {
        let mut parsed = Directive::default();

        for token in tag.split(',').map(str::trim) {
            match token {
                TAG_META => parsed.is_metadata = true,
                TAG_OMIT => parsed.omit = true,
                TAG_OMIT_EMPTY => parsed.omit_empty = true,
                name if parsed.name.is_empty() => parsed.name = name.to_string(),
                _ => return Err(MapperError::InvalidTag(tag.to_string())),
            }
        }

        if parsed.is_metadata && parsed.name.is_empty() {
            parsed.is_metadata = false;
            parsed.name = TAG_META.to_string();
        }

        Ok(parsed)
    }

    /// The metadata slot this directive targets, if it is a recognized metadata field.
    pub fn meta_tag(&self) -> Option<MetaTag> {
        if self.is_metadata {
            MetaTag::from_name(&self.name)
        } else {
            None
        }
    }

    /// The bin name, if the field carries one.
    pub fn bin_name(&self) -> Option<&str> {
        (!self.name.is_empty()).then_some(self.name.as_str())
    }
}

/// Recognized metadata names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaTag {
    /// Record modification count.
    Generation,
    /// Record time-to-live in seconds.
    Expiration,
    /// Key namespace.
    Namespace,
    /// Key set name.
    SetName,
    /// 20-byte key digest.
    Digest,
    /// Original user key value.
    UserKey,
}

impl MetaTag {
    /// Resolves a metadata name as written in a tag.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "generation" => Some(Self::Generation),
            "expiration" => Some(Self::Expiration),
            "namespace" => Some(Self::Namespace),
            "set_name" => Some(Self::SetName),
            "digest" => Some(Self::Digest),
            "user_key" => Some(Self::UserKey),
            _ => None,
        }
    }

    /// The name as written in a tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generation => "generation",
            Self::Expiration => "expiration",
            Self::Namespace => "namespace",
            Self::SetName => "set_name",
            Self::Digest => "digest",
            Self::UserKey => "user_key",
        }
    }
}

impl fmt::Display for MetaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
