//! Filterable collections.
//!
//! [`SearchList`] owns a list of records and filters it with search-filter
//! expressions. Each call builds a [`Query`] over the list, lets one search
//! filter per expression push its fragments into it, and collects the
//! survivors into a new list.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use sift::{SearchList, Value};
//!
//! let list = SearchList::new(vec![
//!     json!({"Title": "First Object", "Sort": 300}),
//!     json!({"Title": "Second Object", "Sort": 101}),
//!     json!({"Title": "Third Object", "Sort": 99}),
//! ]);
//!
//! let big = list.filter(("Sort:GreaterThan", 100))?;
//! assert_eq!(big.len(), 2);
//!
//! let rest = list.exclude_any([("Title:StartsWith", "First"), ("Title:EndsWith", "Third Object")])?;
//! assert_eq!(rest.column("Title"), vec![Value::from("Second Object")]);
//! # Ok::<(), sift::SiftError>(())
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Deserialize;
use sift_query::{Predicate, Query, Record, Value};
use tracing::debug;

use crate::error::Result;
use crate::registry::FilterRegistry;

/// An ordered set of `(expression, value)` pairs.
///
/// Built from any of the shapes a caller naturally has at hand:
///
/// - one pair: `("Title:not", "First")`
/// - pairs in a `Vec`, an array, a `BTreeMap` or a `HashMap`
/// - bare expressions, each paired with null: `Filters::keys(["Title"])`
///
/// A list value (`("Title", vec!["a", "b"])`) is handed to the filter whole;
/// the built-in filters read it as "any of these".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<String, serde_json::Value>")]
pub struct Filters(Vec<(String, Value)>);

impl Filters {
    pub fn new() -> Self {
        Filters(Vec::new())
    }

    /// Expressions without values; each is paired with null.
    pub fn keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Filters(keys.into_iter().map(|k| (k.into(), Value::Null)).collect())
    }

    /// Adds a pair, builder style.
    pub fn with(mut self, expression: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(expression, value);
        self
    }

    pub fn push(&mut self, expression: impl Into<String>, value: impl Into<Value>) {
        self.0.push((expression.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> From<(K, V)> for Filters {
    fn from((expression, value): (K, V)) -> Self {
        Filters(vec![(expression.into(), value.into())])
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for Filters {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Filters {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Filters {
    fn from(pairs: BTreeMap<K, V>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>, S> From<HashMap<K, V, S>> for Filters {
    fn from(pairs: HashMap<K, V, S>) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<Vec<&str>> for Filters {
    fn from(keys: Vec<&str>) -> Self {
        Filters::keys(keys)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Filters(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Filters {
    type Item = (&'a str, &'a Value);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Value)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// A list of records filterable with search-filter expressions.
///
/// Filtering never mutates the list; every filtering call returns a new list
/// holding clones of the surviving records, in their original order.
#[derive(Debug, Clone)]
pub struct SearchList<R> {
    items: Vec<R>,
    registry: Arc<FilterRegistry>,
}

impl<R> Default for SearchList<R> {
    fn default() -> Self {
        SearchList::new(Vec::new())
    }
}

impl<R> SearchList<R> {
    /// Creates a list that resolves filters through the shared registry.
    pub fn new(items: Vec<R>) -> Self {
        SearchList::with_registry(items, FilterRegistry::shared())
    }

    /// Creates a list that resolves filters through `registry`.
    pub fn with_registry(items: Vec<R>, registry: Arc<FilterRegistry>) -> Self {
        SearchList { items, registry }
    }

    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Same as [`len`](Self::len).
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.items.iter()
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn first(&self) -> Option<&R> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&R> {
        self.items.last()
    }

    pub fn push(&mut self, item: R) {
        self.items.push(item);
    }

    pub fn into_inner(self) -> Vec<R> {
        self.items
    }

    fn derive(&self, items: Vec<R>) -> Self {
        SearchList {
            items,
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<R: Record> SearchList<R> {
    /// Values of `field` across the list; records without it give null.
    pub fn column(&self, field: &str) -> Vec<Value> {
        self.items
            .iter()
            .map(|item| item.field(field).unwrap_or_default())
            .collect()
    }

    /// An unfiltered query over the list.
    pub fn query(&self) -> Query<'_, R> {
        Query::new(&self.items)
    }

    /// The first record matching all filters.
    pub fn find(&self, filters: impl Into<Filters>) -> Result<Option<&R>> {
        let filters = filters.into();
        Ok(self.filtered_query(&filters, true)?.first())
    }

    /// Keeps the records matching all filters.
    pub fn filter(&self, filters: impl Into<Filters>) -> Result<Self>
    where
        R: Clone,
    {
        let filters = filters.into();
        let query = self.filtered_query(&filters, true)?;
        Ok(self.collect("filter", &filters, query))
    }

    /// Keeps the records matching at least one filter. With no filters
    /// nothing matches.
    pub fn filter_any(&self, filters: impl Into<Filters>) -> Result<Self>
    where
        R: Clone,
    {
        let filters = filters.into();
        let query = self.any_query(&filters, true)?;
        Ok(self.collect("filter_any", &filters, query))
    }

    /// Drops the records matching all filters.
    ///
    /// Each filter contributes its exclusive form and a record is kept if it
    /// satisfies any of them. With no filters every record is dropped.
    pub fn exclude(&self, filters: impl Into<Filters>) -> Result<Self>
    where
        R: Clone,
    {
        let filters = filters.into();
        let query = self.any_query(&filters, false)?;
        Ok(self.collect("exclude", &filters, query))
    }

    /// Drops the records matching any filter.
    pub fn exclude_any(&self, filters: impl Into<Filters>) -> Result<Self>
    where
        R: Clone,
    {
        let filters = filters.into();
        let query = self.filtered_query(&filters, false)?;
        Ok(self.collect("exclude_any", &filters, query))
    }

    fn filtered_query(&self, filters: &Filters, inclusive: bool) -> Result<Query<'_, R>> {
        let mut query = self.query();
        for (expression, value) in filters {
            self.apply_filter(&mut query, expression, value, inclusive)?;
        }
        Ok(query)
    }

    /// One predicate per filter, OR-combined. A filter that adds nothing
    /// counts as matching everything; no filters at all match nothing.
    fn any_query(&self, filters: &Filters, inclusive: bool) -> Result<Query<'_, R>> {
        let mut groups = Vec::with_capacity(filters.len());
        for (expression, value) in filters {
            let mut group = self.query();
            self.apply_filter(&mut group, expression, value, inclusive)?;
            groups.push(Predicate::all(group.into_predicates()));
        }
        let mut query = self.query();
        query.where_predicate(Predicate::any(groups));
        Ok(query)
    }

    fn apply_filter(
        &self,
        query: &mut Query<'_, R>,
        expression: &str,
        value: &Value,
        inclusive: bool,
    ) -> Result<()> {
        let filter = self.registry.create(expression, value.clone())?;
        if inclusive {
            filter.apply(query)?;
        } else {
            filter.exclude(query)?;
        }
        Ok(())
    }

    fn collect(&self, operation: &'static str, filters: &Filters, query: Query<'_, R>) -> Self
    where
        R: Clone,
    {
        let items: Vec<R> = query.execute().into_iter().cloned().collect();
        debug!(
            operation,
            filters = filters.len(),
            source = self.items.len(),
            kept = items.len(),
            "sift.list.filter"
        );
        self.derive(items)
    }
}

impl<R> From<Vec<R>> for SearchList<R> {
    fn from(items: Vec<R>) -> Self {
        SearchList::new(items)
    }
}

impl<R> FromIterator<R> for SearchList<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        SearchList::new(iter.into_iter().collect())
    }
}

impl<R> IntoIterator for SearchList<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a SearchList<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
