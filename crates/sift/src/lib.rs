//! Sift - Search-filter expressions over in-memory collections.
//!
//! Sift filters lists of records with compact expressions of the form
//! `Field[:Filter][:modifier]*`, paired with a value:
//!
//! ```text
//! "Title"                        exact match (the default filter)
//! "Title:not"                    exact match, negated
//! "Title:StartsWith:nocase"      prefix match, ignoring case
//! "Sort:GreaterThan:not"         not greater than
//! ```
//!
//! Each filter compiles to SQL-style fragments (`"Title" LIKE ?`) which the
//! [`sift_query`] engine evaluates against every record.
//!
//! # Quick Start
//!
//! ```rust
//! use sift::{Record, SearchList};
//!
//! #[derive(Clone, Record)]
//! struct Page {
//!     #[record(rename = "Title")]
//!     title: String,
//!     #[record(rename = "Sort")]
//!     sort: i64,
//! }
//!
//! let pages = SearchList::new(vec![
//!     Page { title: "First Object".into(), sort: 200 },
//!     Page { title: "Second Object".into(), sort: 150 },
//!     Page { title: "Third Object".into(), sort: 50 },
//! ]);
//!
//! let big = pages.filter(("Sort:GreaterThan", 100))?;
//! assert_eq!(big.len(), 2);
//!
//! let rest = pages.exclude(("Title:StartsWith", "First"))?;
//! assert_eq!(rest.first().map(|p| p.title.as_str()), Some("Second Object"));
//!
//! let found = pages.find(("Title:EndsWith:nocase", "third OBJECT"))?;
//! assert_eq!(found.map(|p| p.sort), Some(50));
//! # Ok::<(), sift::SiftError>(())
//! ```
//!
//! # Filtering Semantics
//!
//! | Call | Keeps a record when |
//! |------|---------------------|
//! | [`SearchList::filter`] | every filter matches |
//! | [`SearchList::filter_any`] | at least one filter matches |
//! | [`SearchList::exclude`] | not every filter matches |
//! | [`SearchList::exclude_any`] | no filter matches |
//!
//! A list value (`("Title", vec!["A", "B"])`) matches any of its items.
//! Negated and excluding filters keep records that have no value for the
//! field.
//!
//! # Modules
//!
//! - [`filters`] - The filter catalogue and the [`SearchFilter`] trait
//! - [`registry`] - Name lookup and expression parsing
//! - [`forms`] - Conditionally required form fields
//! - [`query`] - The predicate engine, re-exported from `sift-query`

mod error;
pub mod filters;
pub mod forms;
mod list;
pub mod registry;

pub use sift_query as query;
pub use sift_query::{
    like_to_regex, parse_fragment, Clause, ClauseSink, Condition, Connector, Number, Op,
    ParsedTerm, Predicate, Query, QueryError, Record, ToValue, Value,
};

pub use sift_macros::Record;

pub use error::{Result, SiftError};
pub use filters::{
    ComparisonFilter, ComparisonKind, ExactMatchFilter, FilterArgs, FulltextFilter,
    PatternFilter, PatternKind, SearchFilter,
};
pub use forms::{
    DependentRequiredFields, MessageKind, RequirementRules, ValidationMessage, ValidationResult,
};
pub use list::{Filters, SearchList};
pub use registry::{FilterFactory, FilterRegistry, DEFAULT_FILTER};
