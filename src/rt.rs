// src/rt.rs

//! Runtime utilities for generated code (Macros).
//! Do not use directly.

use crate::decoder;
use crate::encoder;
use crate::error::{MapperError, Result};
use crate::schema::{FieldMut, FieldRef, Mapped};
use crate::value::Value;

/// Types usable behind `#[aero(flatten)]`.
///
/// Implemented by the derive macro for every mapped struct, and here for the optional
/// and boxed wrappers. An absent optional struct yields `None`.
pub trait Embed {
    /// Shared view of the embedded struct, if present.
    fn embedded(&self) -> Option<&dyn Mapped>;

    /// Mutable view of the embedded struct, if present.
    fn embedded_mut(&mut self) -> Option<&mut dyn Mapped>;
}

impl<T: Embed> Embed for Option<T> {
    fn embedded(&self) -> Option<&dyn Mapped> {
        self.as_ref().and_then(Embed::embedded)
    }

    fn embedded_mut(&mut self) -> Option<&mut dyn Mapped> {
        self.as_mut().and_then(Embed::embedded_mut)
    }
}

impl<T: Embed> Embed for Box<T> {
    fn embedded(&self) -> Option<&dyn Mapped> {
        (**self).embedded()
    }

    fn embedded_mut(&mut self) -> Option<&mut dyn Mapped> {
        (**self).embedded_mut()
    }
}

/// Dereference-on-read for a flattened field.
pub fn embedded_ref<E: Embed>(field: &E) -> FieldRef<'_> {
    match field.embedded() {
        Some(inner) => FieldRef::Embedded(inner),
        None => FieldRef::Nil,
    }
}

/// Mutable counterpart of [`embedded_ref`].
pub fn embedded_mut<E: Embed>(field: &mut E) -> FieldMut<'_> {
    match field.embedded_mut() {
        Some(inner) => FieldMut::Embedded(inner),
        None => FieldMut::Nil,
    }
}

/// `ToValue` body for a mapped struct stored as an ordinary bin.
pub fn struct_to_value(value: &dyn Mapped) -> Result<Value> {
    let mut bins: Vec<_> = encoder::encode_bins(value)?.into_iter().collect();
    bins.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(Value::Map(
        bins.into_iter()
            .map(|(name, v)| (Value::String(name), v))
            .collect(),
    ))
}

/// `FromValue` body for a mapped struct stored as an ordinary bin.
pub fn struct_from_value<T: Mapped + Default>(value: &Value) -> Result<T> {
    let target_name = std::any::type_name::<T>();
    let mut target = T::default();
    match value {
        Value::Nil => Ok(target),
        Value::Map(pairs) => {
            decoder::copy_struct(pairs, &mut target).map_err(|e| MapperError::Nested {
                target: target_name.to_string(),
                source: Box::new(e),
            })?;
            Ok(target)
        }
        other => Err(MapperError::cannot_convert(
            other.kind(),
            format!("struct {target_name}"),
        )),
    }
}
