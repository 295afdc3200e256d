//! Implementation of the `#[derive(Record)]` macro.
//!
//! Generates a `Record` implementation that answers each named field through
//! `ToValue`, plus a name constant per field for building fragments.

use std::collections::{HashMap, HashSet};

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, parse_quote, Data, DeriveInput, Error, Fields, Result};

use crate::attrs::parse_record_attrs;

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let mut field_matches: Vec<TokenStream> = Vec::new();
    let mut field_constants: Vec<TokenStream> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut constants: HashMap<String, String> = HashMap::new();
    let mut generics = input.generics.clone();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let record_attrs = parse_record_attrs(&field.attrs)?;
        if record_attrs.skip {
            continue;
        }

        let query_name = record_attrs
            .rename
            .unwrap_or_else(|| field_name.to_string());
        if !seen.insert(query_name.clone()) {
            return Err(Error::new(
                field.span(),
                format!("duplicate record field name '{query_name}'"),
            ));
        }

        let screaming = to_screaming_snake_case(&query_name);
        if let Some(other) = constants.insert(screaming.clone(), query_name.clone()) {
            return Err(Error::new(
                field.span(),
                format!(
                    "record field names '{other}' and '{query_name}' both generate the constant `{screaming}`"
                ),
            ));
        }
        let const_name = format_ident!("{}", screaming);
        field_constants.push(quote! {
            /// Field name as used in filter expressions.
            pub const #const_name: &'static str = #query_name;
        });

        let ty = &field.ty;
        generics
            .make_where_clause()
            .predicates
            .push(parse_quote! { #ty: ::sift::ToValue });

        field_matches.push(quote! {
            #query_name => ::core::option::Option::Some(::sift::ToValue::to_value(&self.#field_name)),
        });
    }

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let (plain_impl_generics, _, plain_where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #plain_impl_generics #struct_name #ty_generics #plain_where_clause {
            #(#field_constants)*
        }

        impl #impl_generics ::sift::Record for #struct_name #ty_generics #where_clause {
            fn field(&self, name: &str) -> ::core::option::Option<::sift::Value> {
                match name {
                    #(#field_matches)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    };

    Ok(expanded)
}

/// Convert a field name to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_ascii_lowercase();
        } else {
            result.push('_');
            prev_was_lower = false;
        }
    }

    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }

    result
}
