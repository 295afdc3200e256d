//! Conditionally required form fields.
//!
//! [`DependentRequiredFields`] checks submitted form data. Some fields are
//! always required. Others are required only when other fields' values pass
//! a set of search filters, such as "Phone is required when Contact is
//! `phone`".
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use sift::DependentRequiredFields;
//!
//! let mut validator = DependentRequiredFields::new();
//! validator
//!     .add_required_field("Name")
//!     .add_dependent_required_field("Phone", ("Contact", "phone"))
//!     .add_dependent_required_field("Reason", ("Rating:LessThan", 3));
//!
//! let data = json!({"Name": "Ada", "Contact": "phone", "Rating": 5});
//! let result = validator.validate(&data)?;
//! assert!(!result.is_valid());
//! assert!(result.has_error("Phone"));
//! assert!(!result.has_error("Reason"));
//! # Ok::<(), sift::SiftError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use sift_query::{Record, Value};
use tracing::debug;

use crate::error::Result;
use crate::list::{Filters, SearchList};
use crate::registry::FilterRegistry;

/// Validator rules in serializable form.
///
/// ```json
/// {
///   "required": ["Name"],
///   "dependent": {
///     "Phone": {"Contact": "phone"},
///     "Reason": {"Rating:LessThan": 3}
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequirementRules {
    /// Fields that must always have a value.
    pub required: Vec<String>,
    /// Fields that must have a value when all their filters keep the data.
    pub dependent: BTreeMap<String, Filters>,
}

/// Kind of a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// A required field has no value.
    Required,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Required => write!(f, "required"),
        }
    }
}

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    pub field: String,
    pub message: String,
    pub kind: MessageKind,
}

/// Outcome of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    messages: Vec<ValidationMessage>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no check failed.
    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    /// Returns `true` if `field` failed a check.
    pub fn has_error(&self, field: &str) -> bool {
        self.messages.iter().any(|m| m.field == field)
    }

    /// Records a failed check.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>, kind: MessageKind) {
        self.messages.push(ValidationMessage {
            field: field.into(),
            message: message.into(),
            kind,
        });
    }
}

/// Form validator with always-required and conditionally required fields.
///
/// A dependent field is required when every one of its filters keeps a
/// one-field record holding the dependency's submitted value. The dependency
/// field is the part of the filter expression before the first `:`.
///
/// The two kinds of field check for a value differently. An always-required
/// field fails when it is missing or blank: null, whitespace-only text or an
/// empty list. A dependent field fails when it is missing or empty, which
/// also counts `0`, `"0"` and `false` as no value (see [`Value::is_empty`]).
#[derive(Debug, Clone)]
pub struct DependentRequiredFields {
    required: Vec<String>,
    dependent: Vec<(String, Filters)>,
    registry: Arc<FilterRegistry>,
}

impl Default for DependentRequiredFields {
    fn default() -> Self {
        Self::new()
    }
}

impl DependentRequiredFields {
    /// Creates a validator with no rules that resolves filters through the
    /// shared registry.
    pub fn new() -> Self {
        Self::with_registry(FilterRegistry::shared())
    }

    pub fn with_registry(registry: Arc<FilterRegistry>) -> Self {
        DependentRequiredFields {
            required: Vec::new(),
            dependent: Vec::new(),
            registry,
        }
    }

    /// Creates a validator from deserialized rules.
    pub fn from_rules(rules: RequirementRules) -> Self {
        let mut validator = Self::new();
        for field in rules.required {
            validator.add_required_field(field);
        }
        for (field, filters) in rules.dependent {
            validator.add_dependent_required_field(field, filters);
        }
        validator
    }

    /// Creates a validator from a JSON document of [`RequirementRules`].
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: RequirementRules = serde_json::from_str(json)?;
        Ok(Self::from_rules(rules))
    }

    /// Marks a field as always required.
    pub fn add_required_field(&mut self, field: impl Into<String>) -> &mut Self {
        let field = field.into();
        if !self.required.contains(&field) {
            self.required.push(field);
        }
        self
    }

    pub fn remove_required_field(&mut self, field: &str) -> &mut Self {
        self.required.retain(|f| f != field);
        self
    }

    /// Marks a field as required when all `filters` keep the submitted data.
    /// Replaces any earlier rule for the field.
    pub fn add_dependent_required_field(
        &mut self,
        field: impl Into<String>,
        filters: impl Into<Filters>,
    ) -> &mut Self {
        let field = field.into();
        let filters = filters.into();
        match self.dependent.iter_mut().find(|(f, _)| *f == field) {
            Some(rule) => rule.1 = filters,
            None => self.dependent.push((field, filters)),
        }
        self
    }

    pub fn remove_dependent_required_field(&mut self, field: &str) -> &mut Self {
        self.dependent.retain(|(f, _)| f != field);
        self
    }

    /// Always-required fields, in insertion order.
    pub fn required_fields(&self) -> &[String] {
        &self.required
    }

    /// Dependent rules, in insertion order.
    pub fn dependent_fields(&self) -> impl Iterator<Item = (&str, &Filters)> {
        self.dependent.iter().map(|(f, filters)| (f.as_str(), filters))
    }

    /// Validates `data`, titling messages with the field names.
    pub fn validate<D: Record + ?Sized>(&self, data: &D) -> Result<ValidationResult> {
        self.validate_with_titles(data, |_| None)
    }

    /// Validates `data`, titling messages through `titles` and falling back
    /// to the field name.
    pub fn validate_with_titles<D, F>(&self, data: &D, titles: F) -> Result<ValidationResult>
    where
        D: Record + ?Sized,
        F: Fn(&str) -> Option<String>,
    {
        let mut result = ValidationResult::new();
        let fail = |result: &mut ValidationResult, field: &str| {
            if result.has_error(field) {
                return;
            }
            let title = titles(field)
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| field.to_string());
            result.add_error(field, format!("\"{title}\" is required"), MessageKind::Required);
        };

        for field in &self.required {
            if is_blank(data, field) {
                fail(&mut result, field);
            }
        }

        for (field, filters) in &self.dependent {
            let required = self.dependency_holds(data, filters)?;
            debug!(field = field.as_str(), required, "sift.validate.dependency");
            if required && is_empty(data, field) {
                fail(&mut result, field);
            }
        }

        debug!(
            valid = result.is_valid(),
            errors = result.messages().len(),
            "sift.validate"
        );
        Ok(result)
    }

    fn dependency_holds<D: Record + ?Sized>(&self, data: &D, filters: &Filters) -> Result<bool> {
        for (expression, value) in filters {
            let dependency = expression.split(':').next().unwrap_or_default().trim();
            let submitted = data.field(dependency).unwrap_or_default();
            let record: BTreeMap<String, Value> =
                BTreeMap::from([(dependency.to_string(), submitted)]);
            let list = SearchList::with_registry(vec![record], Arc::clone(&self.registry));
            if list.filter((expression, value.clone()))?.is_empty() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn is_blank<D: Record + ?Sized>(data: &D, field: &str) -> bool {
    data.field(field).map_or(true, |v| v.is_blank())
}

fn is_empty<D: Record + ?Sized>(data: &D, field: &str) -> bool {
    data.field(field).map_or(true, |v| v.is_empty())
}
