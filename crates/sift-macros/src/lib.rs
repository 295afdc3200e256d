//! Proc macros for Sift.
//!
//! - [`Record`] - Expose a struct's named fields to filter expressions
//!
//! For working examples, see `sift/tests/derive.rs`.

mod attrs;
mod derive;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Record` trait for a struct with named fields.
///
/// Each field is answered through `ToValue`, so any field type with a
/// `ToValue` implementation works: strings, numbers, booleans, `Option<T>`
/// (where `None` reads as no value) and `Vec<T>`.
///
/// # Field Attributes
///
/// - `#[record(rename = "Title")]` - Query the field under another name
/// - `#[record(skip)]` - Leave the field out of the record
///
/// A `pub const` with the query name is generated for every exposed field,
/// named in SCREAMING_SNAKE_CASE (`Title` becomes `Page::TITLE`).
///
/// # Example
///
/// ```ignore
/// use sift::{Record, SearchList};
///
/// #[derive(Clone, Record)]
/// struct Page {
///     #[record(rename = "Title")]
///     title: String,
///     #[record(rename = "Sort")]
///     sort: i64,
///     #[record(skip)]
///     cached_html: String,
/// }
///
/// let list = SearchList::new(pages);
/// let top = list.filter(("Sort:GreaterThan", 10))?;
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
