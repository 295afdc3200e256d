//! Query builder and executor.
//!
//! A [`Query`] borrows a source slice and accumulates [`Predicate`]s, either
//! parsed from SQL fragments or merged in from other queries. Executing the
//! query consumes it and returns the matching records in source order.

use std::cmp::Ordering;
use std::fmt;

use tracing::{debug, trace};

use crate::clause::Clause;
use crate::error::{QueryError, Result};
use crate::op::Op;
use crate::parser::{parse_fragment, Condition};
use crate::predicate::Predicate;
use crate::record::Record;
use crate::value::{Number, Value};

/// Destination for the fragments a search filter emits.
///
/// [`Query`] is the implementation the collection uses; the trait keeps
/// search filters independent of the record type being queried.
pub trait ClauseSink {
    /// Adds a fragment as a conjunction.
    fn push_where(&mut self, fragment: &str, value: Value) -> Result<()>;

    /// Adds the fragments as one disjunctive predicate.
    fn push_where_any(&mut self, clauses: Vec<(String, Value)>) -> Result<()>;

    /// Adds the negation of a fragment as a conjunction.
    fn push_exclude(&mut self, fragment: &str, value: Value) -> Result<()>;

    /// Adds a prebuilt predicate as a conjunction.
    fn push_predicate(&mut self, predicate: Predicate);
}

/// An in-memory query over a slice of records.
///
/// Predicates form an implicit AND chain. Fragments containing `OR`, and
/// everything added through the `*_any` methods, become a single disjunctive
/// predicate in that chain.
///
/// # Example
///
/// ```
/// use sift_query::{Query, Value};
/// use serde_json::json;
///
/// let rows = vec![
///     json!({"Title": "First", "Score": 300}),
///     json!({"Title": "Second", "Score": 101}),
///     json!({"Title": "Third", "Score": 99}),
/// ];
///
/// let mut query = Query::new(&rows);
/// query
///     .where_clause(r#""Score" > ?"#, 100)
///     .unwrap()
///     .where_clause(r#""Title" LIKE ?"#, "s%")
///     .unwrap();
///
/// let found = query.execute();
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0]["Title"], "Second");
/// ```
pub struct Query<'s, R> {
    source: &'s [R],
    predicates: Vec<Predicate>,
}

impl<'s, R> Clone for Query<'s, R> {
    fn clone(&self) -> Self {
        Query {
            source: self.source,
            predicates: self.predicates.clone(),
        }
    }
}

impl<R> fmt::Debug for Query<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("source_len", &self.source.len())
            .field("predicates", &self.predicates)
            .finish()
    }
}

impl<'s, R: Record> Query<'s, R> {
    /// Creates a query over `source` with no predicates.
    ///
    /// An empty query matches all records.
    pub fn new(source: &'s [R]) -> Self {
        Query {
            source,
            predicates: Vec::new(),
        }
    }

    // ========================================================================
    // Source
    // ========================================================================

    /// Returns the source slice.
    pub fn source(&self) -> &'s [R] {
        self.source
    }

    /// Points the query at another source, keeping its predicates.
    pub fn set_source(&mut self, source: &'s [R]) {
        self.source = source;
    }

    // ========================================================================
    // Predicate builders
    // ========================================================================

    /// Adds a fragment as a conjunction.
    ///
    /// A list `value` supplies the positional placeholder values; any other
    /// value is the single placeholder value. Fragments that do not parse are
    /// skipped. An unsupported operator fails the call and nothing from the
    /// fragment is kept.
    pub fn where_clause(&mut self, fragment: &str, value: impl Into<Value>) -> Result<&mut Self> {
        if let Some(predicate) = compile_fragment(fragment, value.into())? {
            let leaves = predicate.leaf_count();
            match predicate {
                // A pure AND chain joins the query's own chain.
                Predicate::And(children) => self.predicates.extend(children),
                other => self.predicates.push(other),
            }
            trace!(
                fragment,
                leaves,
                predicates = self.predicates.len(),
                "sift.query.where"
            );
        }
        Ok(self)
    }

    /// Adds several fragments, each as a conjunction.
    pub fn where_clauses<I, K, V>(&mut self, clauses: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (fragment, value) in clauses {
            self.where_clause(fragment.as_ref(), value)?;
        }
        Ok(self)
    }

    /// Adds the fragments as a single predicate that matches when any of
    /// them does.
    ///
    /// Fragments that do not parse are skipped. When none is left the
    /// predicate is an empty disjunction and the query matches nothing.
    pub fn where_any<I, K, V>(&mut self, clauses: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut alternatives = Vec::new();
        for (fragment, value) in clauses {
            if let Some(predicate) = compile_fragment(fragment.as_ref(), value.into())? {
                alternatives.push(predicate);
            }
        }
        self.predicates.push(Predicate::any(alternatives));
        Ok(self)
    }

    /// Adds a prebuilt predicate as a conjunction.
    pub fn where_predicate(&mut self, predicate: Predicate) -> &mut Self {
        self.predicates.push(predicate);
        self
    }

    /// Merges another query's predicates into this query's AND chain.
    pub fn where_query<Q>(&mut self, other: Query<'_, Q>) -> &mut Self {
        self.predicates.extend(other.predicates);
        self
    }

    /// Adds another query's predicates as one disjunctive predicate.
    ///
    /// An empty query is an empty disjunction and matches nothing.
    pub fn where_any_query<Q>(&mut self, other: Query<'_, Q>) -> &mut Self {
        self.predicates.push(Predicate::any(other.predicates));
        self
    }

    /// Adds the negation of another query: records matching all of its
    /// predicates are dropped.
    ///
    /// An empty query matches every record, so excluding it drops them all.
    pub fn exclude_query<Q>(&mut self, other: Query<'_, Q>) -> &mut Self {
        self.predicates.push(Predicate::all(other.predicates).negate());
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the accumulated predicates.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Consumes the query, returning its predicates.
    pub fn into_predicates(self) -> Vec<Predicate> {
        self.predicates
    }

    /// Returns `true` if this query has no predicates (matches everything).
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Tests if a single record satisfies every predicate.
    pub fn matches(&self, record: &R) -> bool {
        self.predicates.iter().all(|p| p.evaluate(record))
    }

    /// Runs the query, returning the matching records in source order.
    pub fn execute(self) -> Vec<&'s R> {
        let source = self.source;
        let results: Vec<&'s R> = source.iter().filter(|r| self.matches(r)).collect();
        debug!(
            source = source.len(),
            predicates = self.predicates.len(),
            matched = results.len(),
            "sift.query.execute"
        );
        results
    }

    /// Returns the first matching record.
    pub fn first(self) -> Option<&'s R> {
        self.source.iter().find(|r| self.matches(r))
    }

    /// Returns `true` if any record matches.
    pub fn exists(self) -> bool {
        self.source.iter().any(|r| self.matches(r))
    }

    /// Counts the matching records.
    pub fn count(self) -> usize {
        self.source.iter().filter(|r| self.matches(r)).count()
    }

    /// Largest value of `field` among matching records.
    ///
    /// Records without a value, and values that do not compare with the
    /// current maximum, are skipped.
    pub fn max(self, field: &str) -> Option<Value> {
        self.extreme(field, Ordering::Greater)
    }

    /// Smallest value of `field` among matching records.
    pub fn min(self, field: &str) -> Option<Value> {
        self.extreme(field, Ordering::Less)
    }

    /// Sum of the numeric values of `field` among matching records.
    ///
    /// Numeric strings count; other values are ignored. An empty sum is 0.
    pub fn sum(self, field: &str) -> Number {
        self.numbers(field)
            .into_iter()
            .fold(Number::I64(0), Number::add)
    }

    /// Mean of the numeric values of `field`, or `None` if there are none.
    pub fn avg(self, field: &str) -> Option<f64> {
        let numbers = self.numbers(field);
        if numbers.is_empty() {
            return None;
        }
        let total: f64 = numbers.iter().map(|n| n.to_f64()).sum();
        Some(total / numbers.len() as f64)
    }

    fn values(&self, field: &str) -> Vec<Value> {
        self.source
            .iter()
            .filter(|r| self.matches(r))
            .filter_map(|r| r.field(field))
            .filter(|v| !v.is_null())
            .collect()
    }

    fn numbers(&self, field: &str) -> Vec<Number> {
        self.values(field)
            .iter()
            .filter_map(Value::to_number)
            .collect()
    }

    fn extreme(self, field: &str, wanted: Ordering) -> Option<Value> {
        self.values(field).into_iter().reduce(|best, candidate| {
            if candidate.loose_cmp(&best) == Some(wanted) {
                candidate
            } else {
                best
            }
        })
    }

    // ========================================================================
    // Relational operations outside the in-memory filter kernel
    // ========================================================================

    /// Not supported: in-memory queries do not group.
    pub fn group_by(&mut self, _field: &str) -> Result<&mut Self> {
        Err(QueryError::NotImplemented("group by"))
    }

    /// Not supported: in-memory queries do not group.
    pub fn having(&mut self, _fragment: &str, _value: impl Into<Value>) -> Result<&mut Self> {
        Err(QueryError::NotImplemented("having"))
    }

    /// Not supported: results keep source order.
    pub fn sort(&mut self, _field: &str, _descending: bool) -> Result<&mut Self> {
        Err(QueryError::NotImplemented("sort"))
    }

    /// Not supported: results are never paged.
    pub fn limit(&mut self, _limit: usize, _offset: usize) -> Result<&mut Self> {
        Err(QueryError::NotImplemented("limit"))
    }

    /// Not supported: results are never deduplicated.
    pub fn distinct(&mut self, _distinct: bool) -> Result<&mut Self> {
        Err(QueryError::NotImplemented("distinct"))
    }

    /// Not supported: there is only one source.
    pub fn inner_join(&mut self, _table: &str, _on: &str) -> Result<&mut Self> {
        Err(QueryError::NotImplemented("inner join"))
    }

    /// Not supported: there is only one source.
    pub fn left_join(&mut self, _table: &str, _on: &str) -> Result<&mut Self> {
        Err(QueryError::NotImplemented("left join"))
    }

    /// Not supported: records are returned whole.
    pub fn select_columns(&mut self, _columns: &[&str]) -> Result<&mut Self> {
        Err(QueryError::NotImplemented("column selection"))
    }

    /// Not supported: the query has no SQL form.
    pub fn sql(&self) -> Result<String> {
        Err(QueryError::NotImplemented("sql"))
    }
}

impl<R: Record> ClauseSink for Query<'_, R> {
    fn push_where(&mut self, fragment: &str, value: Value) -> Result<()> {
        self.where_clause(fragment, value).map(|_| ())
    }

    fn push_where_any(&mut self, clauses: Vec<(String, Value)>) -> Result<()> {
        self.where_any(clauses).map(|_| ())
    }

    fn push_exclude(&mut self, fragment: &str, value: Value) -> Result<()> {
        if let Some(predicate) = compile_fragment(fragment, value)? {
            self.predicates.push(predicate.negate());
        }
        Ok(())
    }

    fn push_predicate(&mut self, predicate: Predicate) {
        self.where_predicate(predicate);
    }
}

/// Parses and compiles one fragment. `Ok(None)` means the fragment was
/// skipped as malformed.
fn compile_fragment(fragment: &str, value: Value) -> Result<Option<Predicate>> {
    match parse_fragment(fragment, value.into_list()) {
        Some(condition) => compile(condition).map(Some),
        None => Ok(None),
    }
}

fn compile(condition: Condition) -> Result<Predicate> {
    match condition {
        Condition::Term(term) => {
            let op = Op::parse(&term.operator)?;
            Ok(Predicate::Leaf(Clause::new(term.field, op, term.value)?))
        }
        Condition::All(children) => Ok(Predicate::all(
            children.into_iter().map(compile).collect::<Result<_>>()?,
        )),
        Condition::Any(children) => Ok(Predicate::any(
            children.into_iter().map(compile).collect::<Result<_>>()?,
        )),
    }
}
