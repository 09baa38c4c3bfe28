//! [`RecordSource`] to struct decoding.
//!
//! The source is inspected through its [`Shape`]. Components are visited in declaration
//! order and each one drives a specialized pass over the destination's mapped fields:
//!
//! | Component       | Pass                                                      |
//! |-----------------|-----------------------------------------------------------|
//! | batch record    | full decode of the wrapped source                         |
//! | record          | counters, then full decode of the record                  |
//! | key             | namespace, set name, user key, digest                     |
//! | bins            | every non-metadata field with a bin name                  |
//! | bare counters   | generation / expiration (top-level source only)           |
//!
//! The first error at any depth aborts the call. Fields written before the error keep
//! their new values.

use crate::error::{MapperError, Result};
use crate::schema::{BinValue, FieldMut, Mapped, field_at_mut};
use crate::source::{Component, RecordKey, RecordSource, Shape};
use crate::tag::MetaTag;
use crate::value::{Bins, Value};

/// Length of a record key digest.
pub const DIGEST_LEN: usize = 20;

/// Decodes `source` into `target`.
///
/// `source` must be a struct-shaped value exposing at least one record component (a
/// batch record, a record, a bin map, or bare generation/expiration counters).
#[tracing::instrument(level = "trace", skip_all, err)]
pub fn decode<S, T>(source: &S, target: &mut T) -> Result<()>
where
    S: RecordSource,
    T: Mapped,
{
    decode_source(source, target, false)
}

fn decode_source(source: &dyn RecordSource, target: &mut dyn Mapped, inner: bool) -> Result<()> {
    let (name, components) = match source.shape() {
        Shape::Struct { name, components } => (name, components),
        Shape::Other(kind) => {
            tracing::trace!(kind, "source is not a struct");
            return Err(MapperError::InvalidSourceType);
        }
    };

    let mut is_record = false;
    for component in components {
        match component {
            Component::BatchRecord(batch) => {
                is_record = true;
                decode_source(batch, target, true)?;
            }
            Component::Record(record) => {
                is_record = true;
                decode_metadata(record, source_name(record), target)?;
                decode_source(record, target, true)?;
            }
            Component::Key(key) => decode_key(key, target)?,
            Component::Bins(bins) => {
                is_record = true;
                decode_bins(bins, target)?;
            }
            Component::Generation | Component::Expiration if !inner => {
                is_record = true;
                decode_metadata(source, name, target)?;
            }
            Component::Generation | Component::Expiration => {}
        }
    }

    if is_record {
        Ok(())
    } else {
        Err(MapperError::InvalidSource)
    }
}

fn source_name(source: &dyn RecordSource) -> &'static str {
    match source.shape() {
        Shape::Struct { name, .. } => name,
        Shape::Other(kind) => kind,
    }
}

// --- BINS ---

fn decode_bins(bins: &Bins, target: &mut dyn Mapped) -> Result<()> {
    let schema = target.schema()?;

    for (index, field) in schema.fields().iter().enumerate() {
        let slot = match field_at_mut(&mut *target, schema, index)? {
            FieldMut::Nil => continue,
            FieldMut::Embedded(inner) => {
                decode_bins(bins, inner)?;
                continue;
            }
            FieldMut::Leaf(slot) => slot,
        };

        let Some(directive) = field.directive() else {
            continue;
        };
        if directive.is_metadata {
            continue;
        }
        let Some(name) = directive.bin_name() else {
            continue;
        };

        let Some(value) = bins.get(name) else {
            tracing::trace!(bin = name, "bin not present in source");
            continue;
        };

        slot.assign(value).map_err(|e| e.in_field(field.ident))?;
    }

    Ok(())
}

/// Populates a nested struct from the pairs of a [`Value::Map`].
///
/// Each string key selects the field with that bin name, or failing that the field with
/// that Rust name, searching embedded structs last. Keys matching no field are ignored.
pub(crate) fn copy_struct(pairs: &[(Value, Value)], target: &mut dyn Mapped) -> Result<()> {
    for (key, value) in pairs {
        let Some(name) = key.as_str() else {
            tracing::trace!(kind = key.kind(), "non-string key in nested struct map");
            continue;
        };
        if !assign_named(&mut *target, name, value)? {
            tracing::trace!(key = name, "no field for nested struct key");
        }
    }
    Ok(())
}

fn assign_named(target: &mut dyn Mapped, name: &str, value: &Value) -> Result<bool> {
    let schema = target.schema()?;

    let by_ident = || {
        schema
            .lookup(name)
            .ok()
            .filter(|(_, f)| f.directive().is_some_and(|d| !d.is_metadata))
    };
    if let Some((index, field)) = schema.bin(name).or_else(by_ident) {
        if let FieldMut::Leaf(slot) = field_at_mut(&mut *target, schema, index)? {
            slot.assign(value).map_err(|e| e.in_field(field.ident))?;
            return Ok(true);
        }
    }

    for (index, field) in schema.fields().iter().enumerate() {
        if field.directive().is_some() {
            continue;
        }
        if let FieldMut::Embedded(inner) = field_at_mut(&mut *target, schema, index)? {
            if assign_named(inner, name, value)? {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

// --- KEY ---

fn decode_key(key: &dyn RecordKey, target: &mut dyn Mapped) -> Result<()> {
    let schema = target.schema()?;

    for (index, field) in schema.fields().iter().enumerate() {
        let slot = match field_at_mut(&mut *target, schema, index)? {
            FieldMut::Nil => continue,
            FieldMut::Embedded(inner) => {
                decode_key(key, inner)?;
                continue;
            }
            FieldMut::Leaf(slot) => slot,
        };

        let Some(tag) = field.directive().and_then(|d| d.meta_tag()) else {
            continue;
        };

        match tag {
            MetaTag::Namespace => set_exact(slot, key.namespace().to_string(), "Namespace")?,
            MetaTag::SetName => set_exact(slot, key.set_name().to_string(), "SetName")?,
            MetaTag::UserKey => {
                let user_key = key.value().map_or(Value::Nil, |v| v.underlying_value());
                set_exact(slot, user_key, "Value")?;
            }
            MetaTag::Digest => set_digest(slot, key.digest())?,
            MetaTag::Generation | MetaTag::Expiration => {}
        }
    }

    Ok(())
}

/// Stores an accessor result, requiring the field to have exactly the result's type.
fn set_exact<V: 'static>(slot: &mut dyn BinValue, value: V, accessor: &str) -> Result<()> {
    let expected = slot.declared_type();
    match slot.as_any_mut().downcast_mut::<V>() {
        Some(field) => {
            *field = value;
            Ok(())
        }
        None => Err(MapperError::TypeMismatch {
            name: accessor.to_string(),
            expected: expected.to_string(),
            found: std::any::type_name::<V>().to_string(),
        }),
    }
}

fn set_digest(slot: &mut dyn BinValue, digest: &[u8]) -> Result<()> {
    let expected = slot.declared_type();
    let any = slot.as_any_mut();

    if let Some(bytes) = any.downcast_mut::<Vec<u8>>() {
        *bytes = digest.to_vec();
        return Ok(());
    }

    if let Some(array) = any.downcast_mut::<[u8; DIGEST_LEN]>() {
        *array = <[u8; DIGEST_LEN]>::try_from(digest).map_err(|_| {
            MapperError::Conversion(format!(
                "method Digest returned bytes of length {}, expected array of length {DIGEST_LEN}",
                digest.len()
            ))
        })?;
        return Ok(());
    }

    Err(MapperError::TypeMismatch {
        name: "Digest".to_string(),
        expected: expected.to_string(),
        found: format!("Vec<u8> or [u8; {DIGEST_LEN}]"),
    })
}

// --- RECORD COUNTERS ---

fn decode_metadata(record: &dyn RecordSource, owner: &str, target: &mut dyn Mapped) -> Result<()> {
    let schema = target.schema()?;

    for (index, field) in schema.fields().iter().enumerate() {
        let slot = match field_at_mut(&mut *target, schema, index)? {
            FieldMut::Nil => continue,
            FieldMut::Embedded(inner) => {
                decode_metadata(record, owner, inner)?;
                continue;
            }
            FieldMut::Leaf(slot) => slot,
        };

        let Some(tag) = field.directive().and_then(|d| d.meta_tag()) else {
            continue;
        };

        let counter = match tag {
            MetaTag::Generation => record.generation(),
            MetaTag::Expiration => record.expiration(),
            _ => continue,
        };

        let counter = counter.ok_or_else(|| MapperError::NotFound {
            name: format!("field '{tag}'"),
            owner: owner.to_string(),
        })?;

        slot.assign_counter(counter)
            .map_err(|e| e.in_field(tag.as_str()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Key, KeyValue, Metadata, Record};
    use aeromap_derive::Mapped;

    #[derive(Debug, Default, Mapped)]
    struct Movie {
        #[aero(flatten)]
        key: Key,
        #[aero(flatten)]
        key_value: KeyValue,
        #[aero(flatten)]
        metadata: Metadata,
        #[aero("title")]
        title: String,
        #[aero("length")]
        length: i32,
    }

    fn record() -> Record {
        let mut bins = Bins::new();
        bins.insert("title".into(), Value::from("Alien"));
        bins.insert("length".into(), Value::from("117"));
        Record {
            key: Key {
                namespace: "ns1".into(),
                set_name: "movies".into(),
                digest: [1; 20],
            },
            key_value: KeyValue {
                user_key: Value::from("alien"),
            },
            metadata: Metadata {
                generation: 2,
                expiration: 600,
            },
            bins,
        }
    }

    #[test]
    fn decodes_encoded_record() -> Result<()> {
        let mut movie = Movie::default();
        decode(&record(), &mut movie)?;

        assert_eq!(movie.key.namespace, "ns1");
        assert_eq!(movie.key.set_name, "movies");
        assert_eq!(movie.key.digest, [1; 20]);
        assert_eq!(movie.key_value.user_key, Value::from("alien"));
        assert_eq!(movie.metadata.generation, 2);
        assert_eq!(movie.metadata.expiration, 600);
        assert_eq!(movie.title, "Alien");
        assert_eq!(movie.length, 117);
        Ok(())
    }

    #[derive(Debug, Default, Mapped)]
    struct Geo {
        #[aero("lat")]
        lat: f64,
    }

    #[derive(Debug, Default, Mapped)]
    struct Place {
        #[aero(flatten)]
        geo: Geo,
        #[aero("name")]
        label: String,
        #[aero("omitempty")]
        code: String,
        #[aero("meta,generation")]
        generation: u32,
    }

    #[test]
    fn nested_keys_resolve_by_bin_then_field_name() -> Result<()> {
        let mut place = Place::default();
        copy_struct(
            &[
                (Value::from("name"), Value::from("Harbor")),
                (Value::from("code"), Value::from("HB")),
                (Value::from("lat"), Value::from(51.5)),
                (Value::from("generation"), Value::from(7)),
                (Value::from("unknown"), Value::from(true)),
                (Value::Int(1), Value::from("x")),
            ],
            &mut place,
        )?;

        assert_eq!(place.label, "Harbor");
        assert_eq!(place.code, "HB");
        assert_eq!(place.geo.lat, 51.5);
        // metadata fields are not reachable through a nested map
        assert_eq!(place.generation, 0);
        Ok(())
    }

    #[test]
    fn nested_key_errors_name_the_field() {
        let mut place = Place::default();
        let err = copy_struct(&[(Value::from("lat"), Value::from("north"))], &mut place);
        assert!(matches!(
            err,
            Err(MapperError::Field { ref field, .. }) if field == "lat"
        ));
    }

    #[derive(Debug, Default, Mapped)]
    struct SmallCounters {
        #[aero("meta,expiration")]
        expiration: u8,
    }

    #[test]
    fn counters_overflow() {
        let mut target = SmallCounters::default();
        let err = decode(&record(), &mut target);
        assert_eq!(
            err,
            Err(MapperError::Overflow {
                value: 600,
                target: "u8".into()
            }
            .in_field("expiration"))
        );
    }

    #[derive(Debug, Default, Mapped)]
    struct TextualKey {
        #[aero("meta,namespace")]
        namespace: Option<String>,
    }

    #[test]
    fn key_fields_require_exact_types() {
        let mut target = TextualKey::default();
        let err = decode(&record(), &mut target);
        assert!(matches!(
            err,
            Err(MapperError::TypeMismatch { ref name, .. }) if name == "Namespace"
        ));
    }

    #[derive(Debug, Default, Mapped)]
    struct VecDigest {
        #[aero("meta,digest")]
        digest: Vec<u8>,
        #[aero("meta,user_key")]
        user_key: Value,
    }

    #[test]
    fn digest_into_byte_vec() -> Result<()> {
        let mut target = VecDigest::default();
        let mut source = record();
        source.key_value.user_key = Value::Nil;
        decode(&source, &mut target)?;
        assert_eq!(target.digest, vec![1; 20]);
        assert_eq!(target.user_key, Value::Nil);
        Ok(())
    }
}
