//! Sift Query - SQL-fragment predicates over in-memory records.
//!
//! Sift Query evaluates the `WHERE` side of SQL against a slice of records
//! instead of a database. Predicates are written as parameterized fragments,
//! the same strings an ORM would send to the server:
//!
//! - Comparison operators: `=`, `!=`, `<>`, `<`, `>`, `<=`, `>=`
//! - Null tests: `IS`, `IS NOT`
//! - Patterns: `LIKE`, `NOT LIKE`, `LIKE BINARY`, `NOT LIKE BINARY`
//! - Membership: `IN (?, ?)`, `NOT IN (?, ?)`
//! - Fulltext: `MATCH ("Field") AGAINST (?)`, evaluated as a `LIKE`
//! - Connectors: `AND`, `OR` and parentheses
//!
//! # Quick Start
//!
//! ```rust
//! use sift_query::{Query, Record, Value};
//!
//! struct Task {
//!     name: String,
//!     priority: i32,
//! }
//!
//! impl Record for Task {
//!     fn field(&self, name: &str) -> Option<Value> {
//!         match name {
//!             "Name" => Some(Value::from(self.name.as_str())),
//!             "Priority" => Some(Value::from(self.priority)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let tasks = vec![
//!     Task { name: "Write docs".into(), priority: 3 },
//!     Task { name: "Fix bug".into(), priority: 5 },
//!     Task { name: "Old task".into(), priority: 1 },
//! ];
//!
//! let mut query = Query::new(&tasks);
//! query
//!     .where_clause(r#""Priority" >= ?"#, 3)?
//!     .where_clause(r#""Name" NOT LIKE ?"#, "%docs")?;
//!
//! let results = query.execute();
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].name, "Fix bug");
//! # Ok::<(), sift_query::QueryError>(())
//! ```
//!
//! # Matching Semantics
//!
//! Comparisons coerce loosely: `"100"` equals `100` and numeric strings
//! order numerically. `LIKE` and `AGAINST` ignore case; the `BINARY` forms
//! do not. A record with no value for a field matches only `IS NULL`,
//! `= NULL` and the `NOT LIKE` forms.
//!
//! Fragments that cannot be parsed are skipped. Well-formed fragments with an
//! operator outside the table above fail with
//! [`QueryError::UnsupportedOperator`].

mod clause;
mod error;
mod op;
mod parser;
mod predicate;
mod query;
mod record;
mod value;

pub use clause::{like_to_regex, Clause};
pub use error::{QueryError, Result};
pub use op::Op;
pub use parser::{parse_fragment, Condition, Connector, ParsedTerm};
pub use predicate::Predicate;
pub use query::{ClauseSink, Query};
pub use record::{Record, ToValue};
pub use value::{Number, Value};
