//! Derive macros for quill records and entities.
//!
//! This crate provides `#[derive(Record)]`, which declares the bindable
//! fields of a struct, and `#[derive(Entity)]`, which additionally maps the
//! struct to a table and builds it back from result rows.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta, Type};

/// Column treated as the key when no field is marked `primary_key`.
const PRIMARY_KEY_CONVENTION: &str = "Id";

/// Derives `quill_core::Record` for a struct with named fields.
///
/// # Field Attributes
///
/// - `#[field(skip)]` - Excludes the field from persistence
/// - `#[field(name = "Column")]` - Binds the field under another column name
///   (optional, defaults to the field name)
///
/// Mapped fields must implement `Clone` and `quill_core::ToSqlValue`.
#[proc_macro_derive(Record, attributes(field))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_record_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derives `quill_core::Entity` (and with it `Record` and `FromRow`).
///
/// # Attributes
///
/// - `#[entity(table = "table_name")]` - Specifies the table name (optional,
///   defaults to snake_case of struct name)
///
/// # Field Attributes
///
/// - `#[field(skip)]` - Excludes the field; it is filled with
///   `Default::default()` when reading rows
/// - `#[field(name = "Column")]` - Specifies the column name
/// - `#[field(primary_key)]` - Marks the key column (optional, defaults to
///   the column named `Id`, compared case-insensitively)
///
/// Mapped fields must also implement `quill_core::FromSqlValue`.
#[proc_macro_derive(Entity, attributes(entity, field))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_entity_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_record_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let fields = collect_fields(input)?;
    Ok(record_tokens(&input.ident, &fields))
}

fn derive_entity_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let fields = collect_fields(input)?;
    let table_name = get_table_name(&input.attrs, struct_name)?;

    let marked: Vec<&FieldInfo> = fields.iter().filter(|f| f.primary_key).collect();
    if marked.len() > 1 {
        return Err(syn::Error::new_spanned(
            &marked[1].field_name,
            "only one field can be marked #[field(primary_key)]",
        ));
    }
    let primary_key = marked
        .first()
        .map(|f| f.column_name.clone())
        .or_else(|| {
            fields
                .iter()
                .find(|f| !f.skip && f.column_name.eq_ignore_ascii_case(PRIMARY_KEY_CONVENTION))
                .map(|f| f.column_name.clone())
        })
        .unwrap_or_else(|| String::from(PRIMARY_KEY_CONVENTION));

    let record = record_tokens(struct_name, &fields);
    let type_name = struct_name.to_string();

    let initializers: Vec<TokenStream2> = fields
        .iter()
        .map(|info| {
            let field_name = &info.field_name;
            let field_type = &info.field_type;
            let column_name = &info.column_name;
            if info.skip {
                quote! { #field_name: ::core::default::Default::default() }
            } else {
                quote! { #field_name: row.get::<#field_type>(#column_name)? }
            }
        })
        .collect();

    Ok(quote! {
        #record

        impl ::quill_core::FromRow for #struct_name {
            fn from_row(row: &::quill_core::Row) -> ::quill_core::Result<Self> {
                ::core::result::Result::Ok(Self {
                    #(#initializers),*
                })
            }
        }

        impl ::quill_core::Entity for #struct_name {
            const META: ::quill_core::EntityMeta = ::quill_core::EntityMeta {
                type_name: #type_name,
                table: #table_name,
                primary_key: #primary_key,
            };
        }
    })
}

fn record_tokens(struct_name: &Ident, fields: &[FieldInfo]) -> TokenStream2 {
    let descriptors: Vec<TokenStream2> = fields
        .iter()
        .map(|info| {
            let column_name = &info.column_name;
            if info.skip {
                quote! { ::quill_core::FieldDescriptor::skipped(#column_name) }
            } else {
                quote! { ::quill_core::FieldDescriptor::mapped(#column_name) }
            }
        })
        .collect();

    let arms: Vec<TokenStream2> = fields
        .iter()
        .filter(|info| !info.skip)
        .map(|info| {
            let field_name = &info.field_name;
            let column_name = &info.column_name;
            quote! {
                #column_name => ::core::option::Option::Some(
                    ::quill_core::ToSqlValue::to_sql_value(
                        ::core::clone::Clone::clone(&self.#field_name),
                    ),
                ),
            }
        })
        .collect();

    quote! {
        impl ::quill_core::Record for #struct_name {
            const FIELDS: &'static [::quill_core::FieldDescriptor] = &[
                #(#descriptors),*
            ];

            fn field_value(&self, name: &str) -> ::core::option::Option<::quill_core::SqlValue> {
                match name {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    }
}

struct FieldInfo {
    field_name: Ident,
    field_type: Type,
    column_name: String,
    skip: bool,
    primary_key: bool,
}

#[derive(Default)]
struct FieldAttrs {
    name: Option<String>,
    skip: bool,
    primary_key: bool,
}

fn collect_fields(input: &DeriveInput) -> syn::Result<Vec<FieldInfo>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "quill derives only support structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "quill derives only support structs",
            ));
        }
    };

    let mut infos = Vec::with_capacity(fields.len());
    for field in fields {
        let field_name = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip && attrs.primary_key {
            return Err(syn::Error::new_spanned(
                field,
                "a skipped field cannot be the primary key",
            ));
        }
        infos.push(FieldInfo {
            column_name: attrs.name.unwrap_or_else(|| field_name.to_string()),
            field_name,
            field_type: field.ty.clone(),
            skip: attrs.skip,
            primary_key: attrs.primary_key,
        });
    }

    for (i, info) in infos.iter().enumerate() {
        if infos[..i].iter().any(|other| other.column_name == info.column_name) {
            return Err(syn::Error::new_spanned(
                &info.field_name,
                format!("column '{}' is declared twice", info.column_name),
            ));
        }
    }

    Ok(infos)
}

fn get_table_name(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<String> {
    for attr in attrs {
        if attr.path().is_ident("entity") {
            let mut table_name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("table") {
                    table_name = Some(string_value(&meta)?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported entity attribute"))
                }
            })?;
            if let Some(name) = table_name {
                return Ok(name);
            }
        }
    }
    Ok(to_snake_case(&struct_name.to_string()))
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("field") {
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    result.skip = true;
                } else if meta.path.is_ident("primary_key") {
                    result.primary_key = true;
                } else if meta.path.is_ident("name") {
                    result.name = Some(string_value(&meta)?);
                } else {
                    return Err(meta.error("unsupported field attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}

fn string_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    if let Expr::Lit(lit) = &value {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new_spanned(value, "expected a string literal"))
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
