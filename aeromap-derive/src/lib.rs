//! # Aeromap Derive Macros
//!
//! This crate provides the procedural macros for `aeromap`. It automates the implementation
//! of `Mapped`, the flatten support trait, and the value conversions that let a mapped
//! struct be stored as an ordinary (nested) bin.
//!
//! Compatible with `syn 2.0`.

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::ParseStream;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derives `Mapped`, `Embed`, `ToValue`, `FromValue` and `RecordSource`.
///
/// Field attributes:
/// * `#[aero("name,omitempty")]` maps the field with the given tag.
/// * `#[aero(flatten)]` embeds a mapped struct (or `Option`/`Box` of one).
///
/// Fields without an `aero` attribute, or with an empty tag, are not mapped. The struct
/// must implement `Default`.
#[proc_macro_derive(Mapped, attributes(aero))]
pub fn derive_mapped(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;

    let data_struct = match input.data {
        Data::Struct(ds) => ds,
        _ => {
            return syn::Error::new(name.span(), "Mapped only supports structs")
                .to_compile_error()
                .into();
        }
    };

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(&input.generics, "Mapped does not support generic structs")
            .to_compile_error()
            .into();
    }

    let named = match data_struct.fields {
        Fields::Named(named) => named.named,
        _ => {
            return syn::Error::new(name.span(), "Mapped only supports structs with named fields")
                .to_compile_error()
                .into();
        }
    };

    let mut fields = Vec::new();
    for field in named {
        let attr = match parse_attributes(&field.attrs) {
            Ok(attr) => attr,
            Err(e) => return e.to_compile_error().into(),
        };
        let Some(ident) = field.ident else {
            continue;
        };

        match attr {
            Some(FieldAttr::Flatten) => fields.push(MappedField {
                ident,
                tag: None,
            }),
            Some(FieldAttr::Tag(tag)) if !tag.value().is_empty() => fields.push(MappedField {
                ident,
                tag: Some(tag),
            }),
            // Untagged or empty tag: not part of the mapping.
            _ => {}
        }
    }

    let impl_mapped = generate_mapped(&name, &fields);
    let impl_values = generate_value_conversions(&name);

    let expanded = quote! {
        #impl_mapped
        #impl_values
    };

    TokenStream::from(expanded)
}

// --- Internal Data Structures ---
struct MappedField {
    ident: syn::Ident,
    /// `None` for flattened fields.
    tag: Option<LitStr>,
}

enum FieldAttr {
    Tag(LitStr),
    Flatten,
}

/// Parses the single `aero` attribute of a field, if any.
fn parse_attributes(attrs: &[Attribute]) -> syn::Result<Option<FieldAttr>> {
    let mut found = None;

    for attr in attrs {
        if !attr.path().is_ident("aero") {
            continue;
        }
        if found.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate aero attribute"));
        }

        let parsed = attr.parse_args_with(|input: ParseStream| {
            if input.peek(LitStr) {
                return Ok(FieldAttr::Tag(input.parse()?));
            }
            let key: syn::Ident = input.parse()?;
            if key == "flatten" {
                return Ok(FieldAttr::Flatten);
            }
            Err(syn::Error::new(
                key.span(),
                "Unknown aero attribute. Supported: \"<tag>\", flatten",
            ))
        })?;
        found = Some(parsed);
    }

    Ok(found)
}

// --- Generator: Mapped + Embed ---

fn generate_mapped(name: &syn::Ident, fields: &[MappedField]) -> proc_macro2::TokenStream {
    let type_name = name.to_string();

    let raw_fields = fields.iter().map(|f| {
        let ident = f.ident.unraw().to_string();
        let tag = match &f.tag {
            Some(tag) => quote! { Some(#tag) },
            None => quote! { None },
        };
        quote! { aeromap::schema::RawField { ident: #ident, tag: #tag } }
    });

    let read_arms = fields.iter().enumerate().map(|(index, f)| {
        let fname = &f.ident;
        if f.tag.is_some() {
            quote! { #index => Some(aeromap::schema::FieldRef::Leaf(&self.#fname)), }
        } else {
            quote! { #index => Some(aeromap::rt::embedded_ref(&self.#fname)), }
        }
    });

    let write_arms = fields.iter().enumerate().map(|(index, f)| {
        let fname = &f.ident;
        if f.tag.is_some() {
            quote! { #index => Some(aeromap::schema::FieldMut::Leaf(&mut self.#fname)), }
        } else {
            quote! { #index => Some(aeromap::rt::embedded_mut(&mut self.#fname)), }
        }
    });

    quote! {
        impl aeromap::schema::Mapped for #name {
            fn schema(&self) -> aeromap::Result<&'static aeromap::schema::Schema> {
                static SCHEMA: std::sync::OnceLock<aeromap::Result<aeromap::schema::Schema>> =
                    std::sync::OnceLock::new();
                SCHEMA
                    .get_or_init(|| aeromap::schema::Schema::build(#type_name, &[#(#raw_fields),*]))
                    .as_ref()
                    .map_err(Clone::clone)
            }

            #[allow(unreachable_patterns)]
            fn field(&self, index: usize) -> Option<aeromap::schema::FieldRef<'_>> {
                match index {
                    #(#read_arms)*
                    _ => None,
                }
            }

            #[allow(unreachable_patterns)]
            fn field_mut(&mut self, index: usize) -> Option<aeromap::schema::FieldMut<'_>> {
                match index {
                    #(#write_arms)*
                    _ => None,
                }
            }
        }

        impl aeromap::rt::Embed for #name {
            fn embedded(&self) -> Option<&dyn aeromap::schema::Mapped> {
                Some(self)
            }

            fn embedded_mut(&mut self) -> Option<&mut dyn aeromap::schema::Mapped> {
                Some(self)
            }
        }

        impl aeromap::source::RecordSource for #name {
            fn shape(&self) -> aeromap::source::Shape<'_> {
                aeromap::source::Shape::Struct {
                    name: #type_name,
                    components: Vec::new(),
                }
            }
        }
    }
}

// --- Generator: ToValue / FromValue ---

fn generate_value_conversions(name: &syn::Ident) -> proc_macro2::TokenStream {
    quote! {
        impl aeromap::convert::ToValue for #name {
            fn to_value(&self) -> aeromap::Result<aeromap::value::Value> {
                aeromap::rt::struct_to_value(self)
            }

            fn is_empty_value(&self) -> bool {
                false
            }
        }

        impl aeromap::convert::FromValue for #name {
            fn from_value(value: &aeromap::value::Value) -> aeromap::Result<Self> {
                aeromap::rt::struct_from_value::<Self>(value)
            }
        }
    }
}
