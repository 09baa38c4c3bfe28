//! Per-type schema descriptors and the field access traits used by the encoder and
//! decoder.
//!
//! `#[derive(Mapped)]` lists the mapped fields of a struct once, in declaration order,
//! as [`RawField`] entries. The first call to [`Mapped::schema`] parses every tag into
//! a [`Directive`] and caches the resulting [`Schema`] for the lifetime of the process.
//! Traversal then walks the cached descriptor and asks the value for field `i` through
//! [`Mapped::field`] / [`Mapped::field_mut`].

use crate::convert::{FromValue, ToValue};
use crate::error::{MapperError, Result};
use crate::tag::Directive;
use crate::value::Value;
use serde::Serialize;
use std::any::Any;

/// A field entry as emitted by the derive macro.
#[derive(Debug, Clone, Copy)]
pub struct RawField {
    /// Rust field name.
    pub ident: &'static str,
    /// The `aero` tag string. `None` for embedded structs.
    pub tag: Option<&'static str>,
}

/// How a mapped field takes part in the record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// An embedded struct whose fields contribute to the same record.
    Embedded,
    /// A leaf field described by its parsed tag.
    Leaf(Directive),
}

/// One mapped field of a struct.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    /// Rust field name.
    pub ident: &'static str,
    /// Role of the field.
    pub kind: FieldKind,
}

impl FieldSchema {
    /// The directive of a leaf field.
    pub fn directive(&self) -> Option<&Directive> {
        match &self.kind {
            FieldKind::Leaf(directive) => Some(directive),
            FieldKind::Embedded => None,
        }
    }
}

/// The mapping descriptor of one struct type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    type_name: &'static str,
    fields: Vec<FieldSchema>,
}

impl Schema {
    /// Builds the descriptor by parsing every field tag.
    ///
    /// Fails with the first malformed tag.
    pub fn build(type_name: &'static str, raw: &[RawField]) -> Result<Self> {
        let fields = raw
            .iter()
            .map(|field| {
                let kind = match field.tag {
                    Some(tag) => FieldKind::Leaf(Directive::parse(tag)?),
                    None => FieldKind::Embedded,
                };
                Ok(FieldSchema {
                    ident: field.ident,
                    kind,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(ty = type_name, fields = fields.len(), "built mapping schema");
        Ok(Self { type_name, fields })
    }

    /// Name of the described type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Mapped fields in declaration order.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Finds a mapped field by its Rust name.
    pub fn lookup(&self, ident: &str) -> Result<(usize, &FieldSchema)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.ident == ident)
            .ok_or_else(|| MapperError::NotFound {
                name: format!("field '{ident}'"),
                owner: self.type_name.to_string(),
            })
    }

    /// Finds the leaf field writing to bin `name`. Embedded structs are not searched.
    pub fn bin(&self, name: &str) -> Option<(usize, &FieldSchema)> {
        self.fields.iter().enumerate().find(|(_, f)| {
            f.directive()
                .is_some_and(|d| !d.is_metadata && d.name == name)
        })
    }
}

/// Read access to one mapped field.
pub enum FieldRef<'a> {
    /// A leaf value.
    Leaf(&'a dyn BinValue),
    /// A present embedded struct.
    Embedded(&'a dyn Mapped),
    /// An absent optional embedded struct. Only usable for emptiness testing.
    Nil,
}

/// Write access to one mapped field.
pub enum FieldMut<'a> {
    /// A leaf value.
    Leaf(&'a mut dyn BinValue),
    /// A present embedded struct.
    Embedded(&'a mut dyn Mapped),
    /// An absent optional embedded struct. Left untouched by the decoder.
    Nil,
}

/// A struct whose fields map onto a record. Implement with `#[derive(Mapped)]`.
pub trait Mapped {
    /// The cached schema of this type.
    fn schema(&self) -> Result<&'static Schema>;

    /// Field `index` of [`Schema::fields`].
    fn field(&self, index: usize) -> Option<FieldRef<'_>>;

    /// Mutable access to field `index` of [`Schema::fields`].
    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>>;
}

/// Object-safe view of a leaf field, implemented for every type that converts to and
/// from [`Value`].
pub trait BinValue: Any {
    /// The bin representation of the field.
    fn to_bin(&self) -> Result<Value>;

    /// See [`ToValue::is_empty_value`].
    fn is_empty_bin(&self) -> bool;

    /// The bin representation of the type's zero value.
    fn zero_bin(&self) -> Result<Value>;

    /// Coerces `value` into the field and stores it.
    fn assign(&mut self, value: &Value) -> Result<()>;

    /// Stores a record counter after a range check.
    fn assign_counter(&mut self, value: u32) -> Result<()>;

    /// The declared type of the field.
    fn declared_type(&self) -> &'static str;

    /// Exact-type access for metadata routing.
    fn as_any(&self) -> &dyn Any;

    /// Exact-type mutable access for key decoding.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> BinValue for T
where
    T: ToValue + FromValue + Default + Any,
{
    fn to_bin(&self) -> Result<Value> {
        ToValue::to_value(self)
    }

    fn is_empty_bin(&self) -> bool {
        ToValue::is_empty_value(self)
    }

    fn zero_bin(&self) -> Result<Value> {
        ToValue::to_value(&T::default())
    }

    fn assign(&mut self, value: &Value) -> Result<()> {
        *self = T::from_value(value)?;
        Ok(())
    }

    fn assign_counter(&mut self, value: u32) -> Result<()> {
        *self = T::from_counter(value)?;
        Ok(())
    }

    fn declared_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Fetches field `index` of `value`, failing when the accessor does not know it.
pub(crate) fn field_at<'a>(
    value: &'a dyn Mapped,
    schema: &Schema,
    index: usize,
) -> Result<FieldRef<'a>> {
    value.field(index).ok_or_else(|| missing_field(schema, index))
}

/// Mutable counterpart of [`field_at`].
pub(crate) fn field_at_mut<'a>(
    value: &'a mut dyn Mapped,
    schema: &Schema,
    index: usize,
) -> Result<FieldMut<'a>> {
    value
        .field_mut(index)
        .ok_or_else(|| missing_field(schema, index))
}

fn missing_field(schema: &Schema, index: usize) -> MapperError {
    let name = schema
        .fields()
        .get(index)
        .map_or_else(|| format!("field #{index}"), |f| format!("field '{}'", f.ident));
    MapperError::NotFound {
        name,
        owner: schema.type_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::MetaTag;

    const RAW: &[RawField] = &[
        RawField {
            ident: "key",
            tag: None,
        },
        RawField {
            ident: "title",
            tag: Some("title"),
        },
        RawField {
            ident: "generation",
            tag: Some("meta,generation"),
        },
    ];

    #[test]
    fn build_parses_tags() -> Result<()> {
        let schema = Schema::build("Movie", RAW)?;
        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.fields()[0].kind, FieldKind::Embedded);
        assert_eq!(
            schema.fields()[2].directive().and_then(Directive::meta_tag),
            Some(MetaTag::Generation)
        );
        Ok(())
    }

    #[test]
    fn build_fails_on_bad_tag() {
        let raw = [RawField {
            ident: "title",
            tag: Some("title,name"),
        }];
        assert_eq!(
            Schema::build("Movie", &raw),
            Err(MapperError::InvalidTag("title,name".into()))
        );
    }

    #[test]
    fn lookup_by_name() -> Result<()> {
        let schema = Schema::build("Movie", RAW)?;
        assert_eq!(schema.lookup("title")?.0, 1);
        assert_eq!(schema.bin("title").map(|(i, f)| (i, f.ident)), Some((1, "title")));
        assert!(schema.bin("generation").is_none());
        assert_eq!(
            schema.lookup("length").map(|(i, _)| i),
            Err(MapperError::NotFound {
                name: "field 'length'".into(),
                owner: "Movie".into()
            })
        );
        Ok(())
    }

    #[test]
    fn bin_value_assigns_through_coercion() -> Result<()> {
        let mut length = 0_i32;
        let field: &mut dyn BinValue = &mut length;
        field.assign(&Value::String("10".into()))?;
        assert_eq!(field.declared_type(), "i32");
        assert_eq!(field.zero_bin()?, Value::Int(0));
        assert_eq!(length, 10);
        Ok(())
    }
}
