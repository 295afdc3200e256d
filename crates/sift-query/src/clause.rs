//! Compiled clauses.
//!
//! A [`Clause`] is one fragment term after placeholder substitution: a field
//! name, an operator, and the literal to compare against. Pattern operators
//! carry their compiled regex so evaluation never re-parses the pattern.

use regex::{Regex, RegexBuilder};

use crate::error::Result;
use crate::op::Op;
use crate::value::Value;

/// A single compiled predicate term.
///
/// # Example
///
/// ```
/// use sift_query::{Clause, Op, Value};
///
/// let clause = Clause::new("Name", Op::Like, "jo%").unwrap();
/// assert!(clause.matches(Some(&Value::from("Joanna"))));
/// assert!(!clause.matches(None));
/// ```
#[derive(Debug, Clone)]
pub struct Clause {
    field: String,
    op: Op,
    value: Value,
    pattern: Option<Regex>,
}

impl Clause {
    /// Compiles a clause.
    ///
    /// Fails only when a pattern operator's literal produces an invalid regex,
    /// which cannot happen for text literals since every non-wildcard
    /// character is escaped.
    pub fn new(field: impl Into<String>, op: Op, value: impl Into<Value>) -> Result<Self> {
        let value = value.into();
        let pattern = if op.is_pattern_op() {
            match value.to_text() {
                Some(text) => Some(like_to_regex(&text, op.is_case_insensitive())?),
                None => None,
            }
        } else {
            None
        };
        Ok(Clause {
            field: field.into(),
            op,
            value,
            pattern,
        })
    }

    /// The field this clause reads.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The comparison operator.
    pub fn op(&self) -> Op {
        self.op
    }

    /// The literal compared against.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Evaluates this clause against a record's field value.
    ///
    /// `None` and `Some(Value::Null)` both mean the record has no value for
    /// the field. Such a record only matches the absence forms: `IS NULL`,
    /// `= NULL`, `NOT LIKE` and `NOT LIKE BINARY`.
    pub fn matches(&self, field_value: Option<&Value>) -> bool {
        match field_value {
            Some(value) if !value.is_null() => self.matches_present(value),
            _ => self.matches_absent(),
        }
    }

    fn matches_absent(&self) -> bool {
        match self.op {
            Op::Is | Op::Eq => self.value.is_null(),
            Op::NotLike | Op::NotLikeBinary => true,
            _ => false,
        }
    }

    fn matches_present(&self, field: &Value) -> bool {
        if self.op.is_negated() {
            return !self.matches_positive(self.op.positive(), field);
        }
        self.matches_positive(self.op, field)
    }

    fn matches_positive(&self, op: Op, field: &Value) -> bool {
        match op {
            Op::Eq => self.equals(field),
            Op::Lt | Op::Gt | Op::Lte | Op::Gte => field
                .loose_cmp(&self.value)
                .is_some_and(|ordering| op.eval_ordering(ordering)),
            Op::Is => field.identical(&self.value),
            Op::Like | Op::LikeBinary | Op::Against => self.like(field),
            Op::In => self.contains(field),
            Op::Ne | Op::IsNot | Op::NotLike | Op::NotLikeBinary | Op::NotIn => false,
        }
    }

    fn equals(&self, field: &Value) -> bool {
        if self.value.is_null() {
            field.identical(&self.value)
        } else {
            field.loose_eq(&self.value)
        }
    }

    fn like(&self, field: &Value) -> bool {
        match (&self.pattern, field.to_text()) {
            (Some(pattern), Some(text)) => pattern.is_match(&text),
            _ => false,
        }
    }

    fn contains(&self, field: &Value) -> bool {
        match &self.value {
            Value::List(items) => items.iter().any(|item| field.loose_eq(item)),
            // A string list such as "(a, b)" is split on commas.
            Value::String(s) => s
                .chars()
                .filter(|c| !matches!(c, '(' | ')' | ' '))
                .collect::<String>()
                .split(',')
                .any(|item| field.loose_eq(&Value::from(item))),
            _ => false,
        }
    }
}

/// Translates a SQL `LIKE` pattern into an anchored regex.
///
/// `%` matches any run of characters and `_` exactly one; every other
/// character is matched literally.
pub fn like_to_regex(pattern: &str, case_insensitive: bool) -> Result<Regex> {
    let mut source = String::with_capacity(pattern.len() + 2);
    source.push('^');
    for c in pattern.chars() {
        match c {
            '%' => source.push_str(".*"),
            '_' => source.push('.'),
            other => {
                let mut buf = [0u8; 4];
                source.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }
    source.push('$');
    Ok(RegexBuilder::new(&source)
        .case_insensitive(case_insensitive)
        .build()?)
}
