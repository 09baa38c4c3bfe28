//! Struct to [`Record`] encoding.
//!
//! Fields are visited depth-first in declaration order. Flattened structs contribute to
//! the same record in place; an absent optional flattened struct is skipped. For each
//! leaf field:
//!
//! 1. metadata fields are routed to the key, user key or counters, unless empty;
//! 2. `omit` fields, and `omitempty` fields holding an empty value, are skipped;
//! 3. fields without a bin name are skipped;
//! 4. everything else is written to the bin map. An empty field without an omit flag is
//!    still written, as its type's zero value, so bin presence stays stable across
//!    encodes.

use crate::error::{MapperError, Result};
use crate::metadata::Record;
use crate::schema::{BinValue, FieldRef, Mapped, field_at};
use crate::tag::{Directive, MetaTag};
use crate::value::{Bins, Value};

/// Encodes a mapped struct into a new [`Record`].
///
/// The input is not modified. A malformed tag anywhere in the type aborts the call.
#[tracing::instrument(level = "trace", skip_all, err)]
pub fn encode<T: Mapped>(value: &T) -> Result<Record> {
    let mut record = Record::default();
    encode_into(value, &mut record)?;
    Ok(record)
}

/// Encodes only the bin map of `value`, dropping metadata.
pub(crate) fn encode_bins(value: &dyn Mapped) -> Result<Bins> {
    let mut record = Record::default();
    encode_into(value, &mut record)?;
    Ok(record.bins)
}

fn encode_into(source: &dyn Mapped, record: &mut Record) -> Result<()> {
    let schema = source.schema()?;

    for (index, field) in schema.fields().iter().enumerate() {
        let value = match field_at(source, schema, index)? {
            FieldRef::Nil => continue,
            FieldRef::Embedded(inner) => {
                encode_into(inner, record)?;
                continue;
            }
            FieldRef::Leaf(value) => value,
        };

        let Some(directive) = field.directive() else {
            continue;
        };

        if directive.is_metadata {
            route_metadata(value, directive, record)?;
        } else if let Some((name, bin)) = bin_entry(directive, value)? {
            record.bins.insert(name, bin);
        } else {
            tracing::trace!(field = field.ident, "bin skipped");
        }
    }

    Ok(())
}

fn bin_entry(directive: &Directive, value: &dyn BinValue) -> Result<Option<(String, Value)>> {
    let empty = value.is_empty_bin();
    if directive.omit || (directive.omit_empty && empty) {
        return Ok(None);
    }

    let Some(name) = directive.bin_name() else {
        return Ok(None);
    };

    let bin = if empty {
        value.zero_bin()?
    } else {
        value.to_bin()?
    };
    Ok(Some((name.to_string(), bin)))
}

fn route_metadata(value: &dyn BinValue, directive: &Directive, record: &mut Record) -> Result<()> {
    let Some(tag) = directive.meta_tag() else {
        tracing::trace!(name = %directive.name, "unknown metadata name");
        return Ok(());
    };

    match tag {
        MetaTag::Generation => set_metadata(value, &mut record.metadata.generation, tag),
        MetaTag::Expiration => set_metadata(value, &mut record.metadata.expiration, tag),
        MetaTag::Namespace => set_metadata(value, &mut record.key.namespace, tag),
        MetaTag::SetName => set_metadata(value, &mut record.key.set_name, tag),
        MetaTag::Digest => set_metadata(value, &mut record.key.digest, tag),
        MetaTag::UserKey => set_metadata(value, &mut record.key_value.user_key, tag),
    }
}

/// Copies `value` into a metadata slot. Empty values leave the slot untouched; the
/// declared type must be exactly the slot type.
fn set_metadata<S: Clone + 'static>(value: &dyn BinValue, slot: &mut S, tag: MetaTag) -> Result<()> {
    if value.is_empty_bin() {
        tracing::trace!(%tag, "empty metadata field skipped");
        return Ok(());
    }

    match value.as_any().downcast_ref::<S>() {
        Some(v) => {
            *slot = v.clone();
            Ok(())
        }
        None => Err(MapperError::TypeMismatch {
            name: tag.to_string(),
            expected: std::any::type_name::<S>().to_string(),
            found: value.declared_type().to_string(),
        }),
    }
}
