// src/inspector.rs

//! Tools for inspecting how a struct maps onto a record.
//! useful for debugging `aero` annotations before touching real data.

use crate::error::Result;
use crate::schema::{FieldKind, FieldRef, Mapped, field_at};
use serde::Serialize;

/// A structural report of a mapped type.
#[derive(Debug, Serialize)]
pub struct MappingReport {
    /// Rust type name.
    pub type_name: String,
    /// Number of bins the type can write.
    pub bin_count: usize,
    /// Mapped fields in declaration order.
    pub fields: Vec<FieldInfo>,
}

/// How one field takes part in the record.
#[derive(Debug, Serialize)]
pub struct FieldInfo {
    /// Rust field name.
    pub ident: String,
    /// Role hint: "Bin", "Metadata", "Embedded", "Embedded (absent)" or "Skipped".
    pub role: String,
    /// Bin name or metadata route.
    pub target: Option<String>,
    /// `omit` flag.
    pub omit: bool,
    /// `omitempty` flag.
    pub omit_empty: bool,
    /// Fields of an embedded struct.
    pub children: Vec<FieldInfo>,
}

/// The mapping inspector tool.
#[derive(Debug)]
pub struct MappingInspector;

impl MappingInspector {
    /// Reports the mapping of `T`, descending into embedded structs of its default value.
    pub fn inspect<T: Mapped + Default>() -> Result<MappingReport> {
        Self::inspect_value(&T::default())
    }

    /// Reports the mapping of a concrete value. Optional embedded structs are only
    /// expanded when present.
    pub fn inspect_value(value: &dyn Mapped) -> Result<MappingReport> {
        let schema = value.schema()?;
        let fields = Self::inspect_fields(value)?;
        Ok(MappingReport {
            type_name: schema.type_name().to_string(),
            bin_count: count_bins(&fields),
            fields,
        })
    }

    fn inspect_fields(value: &dyn Mapped) -> Result<Vec<FieldInfo>> {
        let schema = value.schema()?;
        let mut fields = Vec::with_capacity(schema.fields().len());

        for (index, field) in schema.fields().iter().enumerate() {
            let info = match (&field.kind, field_at(value, schema, index)?) {
                (FieldKind::Embedded, FieldRef::Embedded(inner)) => FieldInfo {
                    ident: field.ident.to_string(),
                    role: "Embedded".to_string(),
                    target: None,
                    omit: false,
                    omit_empty: false,
                    children: Self::inspect_fields(inner)?,
                },
                (FieldKind::Embedded, _) => FieldInfo {
                    ident: field.ident.to_string(),
                    role: "Embedded (absent)".to_string(),
                    target: None,
                    omit: false,
                    omit_empty: false,
                    children: Vec::new(),
                },
                (FieldKind::Leaf(directive), _) => {
                    let (role, target) = if let Some(tag) = directive.meta_tag() {
                        ("Metadata", Some(tag.to_string()))
                    } else if directive.is_metadata {
                        ("Skipped", Some(directive.name.clone()))
                    } else if directive.omit {
                        ("Skipped", directive.bin_name().map(str::to_string))
                    } else {
                        match directive.bin_name() {
                            Some(name) => ("Bin", Some(name.to_string())),
                            None => ("Skipped", None),
                        }
                    };
                    FieldInfo {
                        ident: field.ident.to_string(),
                        role: role.to_string(),
                        target,
                        omit: directive.omit,
                        omit_empty: directive.omit_empty,
                        children: Vec::new(),
                    }
                }
            };
            fields.push(info);
        }

        Ok(fields)
    }
}

fn count_bins(fields: &[FieldInfo]) -> usize {
    fields
        .iter()
        .map(|f| match f.role.as_str() {
            "Bin" => 1,
            _ => count_bins(&f.children),
        })
        .sum()
}

impl std::fmt::Display for MappingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== MAPPING REPORT: {} ===", self.type_name)?;
        writeln!(f, "Bins: {}", self.bin_count)?;
        for (i, field) in self.fields.iter().enumerate() {
            field.fmt_recursive(f, "", i + 1 == self.fields.len())?;
        }
        Ok(())
    }
}

impl FieldInfo {
    fn fmt_recursive(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> std::fmt::Result {
        let connector = if is_last { "└── " } else { "├── " };
        let child_prefix = if is_last { "    " } else { "│   " };
        let target = self
            .target
            .as_deref()
            .map(|t| format!(" -> {t}"))
            .unwrap_or_default();
        let flags = match (self.omit, self.omit_empty) {
            (true, _) => " [omit]",
            (false, true) => " [omitempty]",
            (false, false) => "",
        };

        writeln!(
            f,
            "{}{}[{}] {}{}{}",
            prefix, connector, self.role, self.ident, target, flags
        )?;

        for (i, child) in self.children.iter().enumerate() {
            let is_last_child = i + 1 == self.children.len();
            child.fmt_recursive(f, &format!("{prefix}{child_prefix}"), is_last_child)?;
        }
        Ok(())
    }
}
