//! Filter registry.
//!
//! Maps filter names to factories and turns filter expressions such as
//! `Title:StartsWith:nocase` into [`SearchFilter`] instances.
//!
//! # Expression Syntax
//!
//! ```text
//! <field>[:<filter>][:<modifier>]*
//! ```
//!
//! The field always comes first. When the second part is a modifier the
//! default filter supports (`Title:not`), it and everything after it are
//! modifiers of the default filter. Otherwise it names the filter.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use sift_query::Value;
use tracing::debug;

use crate::error::{Result, SiftError};
use crate::filters::{self, FilterArgs, SearchFilter};

/// Constructor for a search filter.
pub type FilterFactory = fn(FilterArgs) -> Box<dyn SearchFilter>;

/// Name of the filter used when an expression names none.
pub const DEFAULT_FILTER: &str = "ExactMatch";

static SHARED: Lazy<Arc<FilterRegistry>> = Lazy::new(|| Arc::new(FilterRegistry::default()));

/// A set of named filter factories with a default filter.
///
/// # Example
///
/// ```
/// use sift::{FilterRegistry, Value};
///
/// let registry = FilterRegistry::default();
/// let filter = registry.create("Title:StartsWith:nocase", Value::from("fir")).unwrap();
/// assert_eq!(filter.name(), "StartsWith");
/// assert_eq!(filter.args().modifiers, vec!["nocase"]);
///
/// // A modifier of the default filter in second position.
/// let filter = registry.create("Title:not", Value::from("First")).unwrap();
/// assert_eq!(filter.name(), "ExactMatch");
/// ```
#[derive(Clone)]
pub struct FilterRegistry {
    factories: BTreeMap<String, FilterFactory>,
    default_filter: String,
}

impl Default for FilterRegistry {
    /// A registry holding the built-in catalogue.
    fn default() -> Self {
        let mut registry = FilterRegistry::new();
        registry
            .register("ExactMatch", filters::exact_match)
            .register("PartialMatch", filters::partial_match)
            .register("StartsWith", filters::starts_with)
            .register("EndsWith", filters::ends_with)
            .register("GreaterThan", filters::greater_than)
            .register("GreaterThanOrEqual", filters::greater_than_or_equal)
            .register("LessThan", filters::less_than)
            .register("LessThanOrEqual", filters::less_than_or_equal)
            .register("Fulltext", filters::fulltext);
        registry
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.factories.keys().collect::<Vec<_>>())
            .field("default_filter", &self.default_filter)
            .finish()
    }
}

impl FilterRegistry {
    /// Creates an empty registry whose default filter is `ExactMatch`.
    pub fn new() -> Self {
        FilterRegistry {
            factories: BTreeMap::new(),
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }

    /// The process-wide registry holding the built-in catalogue.
    pub fn shared() -> Arc<FilterRegistry> {
        Arc::clone(&SHARED)
    }

    /// Registers a factory, replacing any filter of the same name.
    pub fn register(&mut self, name: impl Into<String>, factory: FilterFactory) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    /// Sets the filter used when an expression names none.
    pub fn with_default_filter(mut self, name: impl Into<String>) -> Self {
        self.default_filter = name.into();
        self
    }

    /// The filter used when an expression names none.
    pub fn default_filter(&self) -> &str {
        &self.default_filter
    }

    /// Registered filter names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Returns `true` if `name` resolves to a registered filter.
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Looks up a factory by exact name, then ignoring case, then with a
    /// trailing `Filter` removed (`ExactMatchFilter` finds `ExactMatch`).
    pub fn resolve(&self, name: &str) -> Option<FilterFactory> {
        if let Some(factory) = self.factories.get(name) {
            return Some(*factory);
        }
        if let Some((_, factory)) = self
            .factories
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            return Some(*factory);
        }
        let stripped = name
            .strip_suffix("Filter")
            .or_else(|| name.strip_suffix("filter"))?;
        if stripped.is_empty() {
            return None;
        }
        self.resolve(stripped)
    }

    /// Builds the filter an expression describes.
    pub fn create(&self, expression: &str, value: impl Into<Value>) -> Result<Box<dyn SearchFilter>> {
        let mut parts = expression.split(':').map(str::trim);
        let field = parts
            .next()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| SiftError::EmptyExpression(expression.to_string()))?;
        let rest: Vec<&str> = parts.collect();

        let (filter_name, modifiers) = match rest.split_first() {
            None => (self.default_filter.as_str(), Vec::new()),
            Some((second, tail)) if second.is_empty() => (self.default_filter.as_str(), tail.to_vec()),
            Some((second, tail)) => {
                if self.default_supports(second)? {
                    (self.default_filter.as_str(), rest.clone())
                } else {
                    (*second, tail.to_vec())
                }
            }
        };

        let factory = self
            .resolve(filter_name)
            .ok_or_else(|| SiftError::UnknownFilter(filter_name.to_string()))?;
        let modifiers: Vec<String> = modifiers
            .into_iter()
            .filter(|m| !m.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();

        let filter = factory(FilterArgs::new(field, value, modifiers));
        let supported = filter.supported_modifiers();
        if let Some(bad) = filter
            .args()
            .modifiers
            .iter()
            .find(|m| !supported.contains(&m.as_str()))
        {
            return Err(SiftError::unsupported_modifier(filter.name(), bad.as_str()));
        }

        debug!(
            expression,
            filter = filter.name(),
            field,
            "sift.filter.create"
        );
        Ok(filter)
    }

    fn default_supports(&self, modifier: &str) -> Result<bool> {
        let factory = self
            .resolve(&self.default_filter)
            .ok_or_else(|| SiftError::UnknownFilter(self.default_filter.clone()))?;
        let sample = factory(FilterArgs::new("", Value::Null, Vec::new()));
        let modifier = modifier.to_ascii_lowercase();
        Ok(sample.supported_modifiers().contains(&modifier.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::ExactMatchFilter;

    #[test]
    fn default_filter_when_unnamed() {
        let registry = FilterRegistry::default();
        let filter = registry.create("Title", "x").unwrap();
        assert_eq!(filter.name(), "ExactMatch");
        assert_eq!(filter.args().field, "Title");
        assert!(filter.args().modifiers.is_empty());
    }

    #[test]
    fn second_part_as_modifier() {
        let registry = FilterRegistry::default();
        let filter = registry.create("Title:NOT:case", "x").unwrap();
        assert_eq!(filter.name(), "ExactMatch");
        assert_eq!(filter.args().modifiers, vec!["not", "case"]);
    }

    #[test]
    fn second_part_as_filter_name() {
        let registry = FilterRegistry::default();
        let filter = registry.create("Sort:GreaterThan:not", 100).unwrap();
        assert_eq!(filter.name(), "GreaterThan");
        assert_eq!(filter.args().modifiers, vec!["not"]);
        assert_eq!(filter.args().value, Value::from(100));
    }

    #[test]
    fn lookup_fallbacks() {
        let registry = FilterRegistry::default();
        assert!(registry.contains("StartsWith"));
        assert!(registry.contains("startswith"));
        assert!(registry.contains("StartsWithFilter"));
        assert!(registry.contains("partialmatchfilter"));
        assert!(!registry.contains("Filter"));
        assert!(!registry.contains("Regex"));
    }

    #[test]
    fn unknown_filter() {
        let registry = FilterRegistry::default();
        let err = registry.create("Title:Soundex", "x").unwrap_err();
        assert!(matches!(err, SiftError::UnknownFilter(ref name) if name == "Soundex"));
        assert_eq!(err.to_string(), "unknown search filter 'Soundex'");
    }

    #[test]
    fn unsupported_modifier() {
        let registry = FilterRegistry::default();
        let err = registry.create("Sort:GreaterThan:nocase", 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "GreaterThan does not support modifier 'nocase'"
        );
    }

    #[test]
    fn empty_expression() {
        let registry = FilterRegistry::default();
        assert!(matches!(
            registry.create("", "x"),
            Err(SiftError::EmptyExpression(_))
        ));
        assert!(matches!(
            registry.create(":StartsWith", "x"),
            Err(SiftError::EmptyExpression(_))
        ));
    }

    #[test]
    fn custom_filters_and_default() {
        fn shouting(args: FilterArgs) -> Box<dyn SearchFilter> {
            let mut args = args;
            args.value = Value::from(args.value.to_string().to_uppercase());
            Box::new(ExactMatchFilter::new(args))
        }

        let mut registry = FilterRegistry::default();
        registry.register("Shout", shouting);
        let filter = registry.create("Title:Shout", "abc").unwrap();
        assert_eq!(filter.args().value, Value::from("ABC"));

        let registry = registry.with_default_filter("PartialMatch");
        assert_eq!(registry.default_filter(), "PartialMatch");
        assert_eq!(registry.create("Title", "x").unwrap().name(), "PartialMatch");
    }

    #[test]
    fn missing_default_filter() {
        let registry = FilterRegistry::new().with_default_filter("Nope");
        assert!(matches!(
            registry.create("Title:not", "x"),
            Err(SiftError::UnknownFilter(_))
        ));
    }

    #[test]
    fn shared_registry_has_catalogue() {
        assert_eq!(FilterRegistry::shared().names().count(), 9);
        assert!(FilterRegistry::shared().contains("Fulltext"));
    }
}
