//! Attribute parsing for the Record derive macro.
//!
//! Parses the `#[record(...)]` field attributes.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Lit, Meta, Result, Token,
};

/// Field-level attributes from `#[record(...)]`.
#[derive(Debug, Clone)]
pub struct RecordAttr {
    /// Leave this field out of the record.
    pub skip: bool,
    /// Name the field is queried by (default: the Rust field name).
    pub rename: Option<String>,
    pub span: Span,
}

impl Default for RecordAttr {
    fn default() -> Self {
        RecordAttr {
            skip: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

impl Parse for RecordAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = RecordAttr {
            span: input.span(),
            ..RecordAttr::default()
        };

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,

                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    let syn::Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &nv.value
                    else {
                        return Err(Error::new(
                            nv.value.span(),
                            "rename must be a string literal",
                        ));
                    };
                    let name = s.value();
                    if name.is_empty() {
                        return Err(Error::new(s.span(), "rename must not be empty"));
                    }
                    attr.rename = Some(name);
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown record attribute. Expected: skip or rename = \"...\"",
                    ));
                }
            }
        }

        if attr.skip && attr.rename.is_some() {
            return Err(Error::new(attr.span, "skip and rename cannot be combined"));
        }

        Ok(attr)
    }
}

/// Extract `#[record(...)]` attributes from a field's attributes.
pub fn parse_record_attrs(attrs: &[Attribute]) -> Result<RecordAttr> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            return attr.parse_args::<RecordAttr>();
        }
    }
    Ok(RecordAttr::default())
}
