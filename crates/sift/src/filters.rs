//! Search filters.
//!
//! A search filter takes a field, a value and a list of modifiers, and turns
//! them into SQL fragments for a [`ClauseSink`]. Every filter has two entry
//! points: [`SearchFilter::apply`] keeps the records the filter describes and
//! [`SearchFilter::exclude`] keeps the rest. The `not` modifier swaps them.
//!
//! # Catalogue
//!
//! | Filter | Inclusive fragment | Modifiers |
//! |--------|--------------------|-----------|
//! | `ExactMatch` | `"F" = ?`, `"F" IN (?, ?)`, `"F" IS NULL` | `not`, `nocase`, `case` |
//! | `PartialMatch` | `"F" LIKE ?` with `%v%` | `not`, `nocase`, `case` |
//! | `StartsWith` | `"F" LIKE ?` with `v%` | `not`, `nocase`, `case` |
//! | `EndsWith` | `"F" LIKE ?` with `%v` | `not`, `nocase`, `case` |
//! | `GreaterThan` | `"F" > ?` | `not` |
//! | `GreaterThanOrEqual` | `"F" >= ?` | `not` |
//! | `LessThan` | `"F" < ?` | `not` |
//! | `LessThanOrEqual` | `"F" <= ?` | `not` |
//! | `Fulltext` | `MATCH ("F") AGAINST (?)` | `not` |
//!
//! Every exclusive form keeps the records the inclusive form drops, including
//! records without a value for the field.

use std::fmt;

use sift_query::{ClauseSink, Predicate, Result, Value};

/// Modifier that swaps the inclusive and exclusive forms.
pub const NOT: &str = "not";
/// Modifier forcing case-insensitive comparison.
pub const NOCASE: &str = "nocase";
/// Modifier forcing case-sensitive comparison.
pub const CASE: &str = "case";

const CASE_MODIFIERS: &[&str] = &[NOT, NOCASE, CASE];
const NOT_ONLY: &[&str] = &[NOT];

/// Arguments handed to a filter factory.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterArgs {
    /// Field the filter reads.
    pub field: String,
    /// Value to compare against. A list means "any of these".
    pub value: Value,
    /// Lower-cased modifiers.
    pub modifiers: Vec<String>,
}

impl FilterArgs {
    pub fn new(field: impl Into<String>, value: impl Into<Value>, modifiers: Vec<String>) -> Self {
        FilterArgs {
            field: field.into(),
            value: value.into(),
            modifiers,
        }
    }

    /// Returns `true` if the modifier is present.
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers
            .iter()
            .any(|m| m.eq_ignore_ascii_case(modifier))
    }

    /// Returns `true` if the `not` modifier is present.
    pub fn is_negated(&self) -> bool {
        self.has_modifier(NOT)
    }

    /// Requested collation: `Some(true)` for `case`, `Some(false)` for
    /// `nocase`, `None` for the default. `case` wins when both are given.
    pub fn case_sensitivity(&self) -> Option<bool> {
        if self.has_modifier(CASE) {
            Some(true)
        } else if self.has_modifier(NOCASE) {
            Some(false)
        } else {
            None
        }
    }

    /// The field as a quoted identifier.
    pub fn quoted_field(&self) -> String {
        format!("\"{}\"", self.field)
    }

    /// The value as a list of candidates.
    pub fn values(&self) -> Vec<Value> {
        self.value.clone().into_list()
    }
}

/// A predicate generator that emits SQL fragments.
pub trait SearchFilter: fmt::Debug {
    /// Registry name of the filter family.
    fn name(&self) -> &'static str;

    /// The arguments the filter was built from.
    fn args(&self) -> &FilterArgs;

    /// Modifiers this filter accepts.
    fn supported_modifiers(&self) -> &'static [&'static str] {
        NOT_ONLY
    }

    /// Emits the fragments selecting the records the filter describes.
    fn apply_inclusive(&self, sink: &mut dyn ClauseSink) -> Result<()>;

    /// Emits the fragments selecting every other record.
    fn apply_exclusive(&self, sink: &mut dyn ClauseSink) -> Result<()>;

    /// Filter entry point.
    fn apply(&self, sink: &mut dyn ClauseSink) -> Result<()> {
        if self.args().is_negated() {
            self.apply_exclusive(sink)
        } else {
            self.apply_inclusive(sink)
        }
    }

    /// Exclude entry point.
    fn exclude(&self, sink: &mut dyn ClauseSink) -> Result<()> {
        if self.args().is_negated() {
            self.apply_inclusive(sink)
        } else {
            self.apply_exclusive(sink)
        }
    }
}

/// Builds the comparison clause for one value of `field`.
///
/// An exact match with the default collation compares with `=`; anything
/// else becomes a pattern match.
pub fn comparison_clause(field: &str, exact: bool, negated: bool, case: Option<bool>) -> String {
    let op = match (exact, case, negated) {
        (true, None, false) => "=",
        (true, None, true) => "!=",
        (_, Some(true), false) => "LIKE BINARY",
        (_, Some(true), true) => "NOT LIKE BINARY",
        (_, _, false) => "LIKE",
        (_, _, true) => "NOT LIKE",
    };
    format!("{field} {op} ?")
}

fn placeholders(count: usize) -> String {
    format!("({})", vec!["?"; count].join(", "))
}

fn repeat_joined(clause: &str, count: usize, connector: &str) -> String {
    vec![clause; count].join(connector)
}

fn match_nothing(sink: &mut dyn ClauseSink) {
    sink.push_predicate(Predicate::Or(Vec::new()));
}

// ============================================================================
// ExactMatch
// ============================================================================

/// Equality against one value, or membership in a list of values.
#[derive(Debug, Clone)]
pub struct ExactMatchFilter {
    args: FilterArgs,
}

impl ExactMatchFilter {
    pub fn new(args: FilterArgs) -> Self {
        ExactMatchFilter { args }
    }

    fn emit(&self, sink: &mut dyn ClauseSink, negated: bool) -> Result<()> {
        match &self.args.value {
            Value::List(items) => self.emit_many(sink, items, negated),
            value => self.emit_one(sink, value, negated),
        }
    }

    fn emit_one(&self, sink: &mut dyn ClauseSink, value: &Value, negated: bool) -> Result<()> {
        let field = self.args.quoted_field();
        if value.is_null() {
            let test = if negated { "IS NOT NULL" } else { "IS NULL" };
            return sink.push_where(&format!("{field} {test}"), Value::Null);
        }

        let clause = comparison_clause(&field, true, negated, self.args.case_sensitivity());
        let fragment = if negated {
            format!("{clause} OR {field} IS NULL")
        } else {
            clause
        };
        sink.push_where(&fragment, value.clone())
    }

    fn emit_many(&self, sink: &mut dyn ClauseSink, items: &[Value], negated: bool) -> Result<()> {
        let field = self.args.quoted_field();
        let has_null = items.iter().any(Value::is_null);
        let values: Vec<Value> = items.iter().filter(|v| !v.is_null()).cloned().collect();

        if values.is_empty() {
            return match (has_null, negated) {
                (true, false) => sink.push_where(&format!("{field} IS NULL"), Value::Null),
                (true, true) => sink.push_where(&format!("{field} IS NOT NULL"), Value::Null),
                (false, false) => {
                    match_nothing(sink);
                    Ok(())
                }
                (false, true) => Ok(()),
            };
        }

        let mut fragment = match self.args.case_sensitivity() {
            None => {
                let op = if negated { "NOT IN" } else { "IN" };
                format!("{field} {op} {}", placeholders(values.len()))
            }
            case => {
                let clause = comparison_clause(&field, true, negated, case);
                let connector = if negated { " AND " } else { " OR " };
                repeat_joined(&clause, values.len(), connector)
            }
        };
        match (has_null, negated) {
            (true, false) | (false, true) => fragment.push_str(&format!(" OR {field} IS NULL")),
            (true, true) => fragment.push_str(&format!(" AND {field} IS NOT NULL")),
            (false, false) => {}
        }
        sink.push_where(&fragment, Value::List(values))
    }
}

impl SearchFilter for ExactMatchFilter {
    fn name(&self) -> &'static str {
        "ExactMatch"
    }

    fn args(&self) -> &FilterArgs {
        &self.args
    }

    fn supported_modifiers(&self) -> &'static [&'static str] {
        CASE_MODIFIERS
    }

    fn apply_inclusive(&self, sink: &mut dyn ClauseSink) -> Result<()> {
        self.emit(sink, false)
    }

    fn apply_exclusive(&self, sink: &mut dyn ClauseSink) -> Result<()> {
        self.emit(sink, true)
    }
}

// ============================================================================
// PartialMatch / StartsWith / EndsWith
// ============================================================================

/// Where the value must appear in the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Anywhere: `%v%`.
    Partial,
    /// At the start: `v%`.
    StartsWith,
    /// At the end: `%v`.
    EndsWith,
}

impl PatternKind {
    pub fn name(self) -> &'static str {
        match self {
            PatternKind::Partial => "PartialMatch",
            PatternKind::StartsWith => "StartsWith",
            PatternKind::EndsWith => "EndsWith",
        }
    }

    /// Wraps a value in the `LIKE` wildcards for this kind.
    pub fn pattern(self, text: &str) -> String {
        match self {
            PatternKind::Partial => format!("%{text}%"),
            PatternKind::StartsWith => format!("{text}%"),
            PatternKind::EndsWith => format!("%{text}"),
        }
    }
}

/// Substring match through `LIKE`.
#[derive(Debug, Clone)]
pub struct PatternFilter {
    kind: PatternKind,
    args: FilterArgs,
}

impl PatternFilter {
    pub fn new(kind: PatternKind, args: FilterArgs) -> Self {
        PatternFilter { kind, args }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    fn emit(&self, sink: &mut dyn ClauseSink, negated: bool) -> Result<()> {
        let items = self.args.values();
        if items.is_empty() {
            if !negated {
                match_nothing(sink);
            }
            return Ok(());
        }

        let clause = comparison_clause(
            &self.args.quoted_field(),
            false,
            negated,
            self.args.case_sensitivity(),
        );
        let patterns: Vec<Value> = items
            .iter()
            .map(|v| Value::from(self.kind.pattern(&v.to_text().unwrap_or_default())))
            .collect();
        if !negated && patterns.len() > 1 {
            return sink.push_where_any(
                patterns.into_iter().map(|p| (clause.clone(), p)).collect(),
            );
        }
        sink.push_where(
            &repeat_joined(&clause, patterns.len(), " AND "),
            Value::List(patterns),
        )
    }
}

impl SearchFilter for PatternFilter {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn args(&self) -> &FilterArgs {
        &self.args
    }

    fn supported_modifiers(&self) -> &'static [&'static str] {
        CASE_MODIFIERS
    }

    fn apply_inclusive(&self, sink: &mut dyn ClauseSink) -> Result<()> {
        self.emit(sink, false)
    }

    fn apply_exclusive(&self, sink: &mut dyn ClauseSink) -> Result<()> {
        self.emit(sink, true)
    }
}

// ============================================================================
// GreaterThan / GreaterThanOrEqual / LessThan / LessThanOrEqual
// ============================================================================

/// Ordering comparison used by a [`ComparisonFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonKind {
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl ComparisonKind {
    pub fn name(self) -> &'static str {
        match self {
            ComparisonKind::GreaterThan => "GreaterThan",
            ComparisonKind::GreaterThanOrEqual => "GreaterThanOrEqual",
            ComparisonKind::LessThan => "LessThan",
            ComparisonKind::LessThanOrEqual => "LessThanOrEqual",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonKind::GreaterThan => ">",
            ComparisonKind::GreaterThanOrEqual => ">=",
            ComparisonKind::LessThan => "<",
            ComparisonKind::LessThanOrEqual => "<=",
        }
    }
}

/// Ordering comparison against a value.
#[derive(Debug, Clone)]
pub struct ComparisonFilter {
    kind: ComparisonKind,
    args: FilterArgs,
}

impl ComparisonFilter {
    pub fn new(kind: ComparisonKind, args: FilterArgs) -> Self {
        ComparisonFilter { kind, args }
    }

    pub fn kind(&self) -> ComparisonKind {
        self.kind
    }

    fn emit(&self, sink: &mut dyn ClauseSink, negated: bool) -> Result<()> {
        let items = self.args.values();
        if items.is_empty() {
            if !negated {
                match_nothing(sink);
            }
            return Ok(());
        }

        let clause = format!("{} {} ?", self.args.quoted_field(), self.kind.symbol());
        let fragment = repeat_joined(&clause, items.len(), " OR ");
        if negated {
            sink.push_exclude(&fragment, Value::List(items))
        } else {
            sink.push_where(&fragment, Value::List(items))
        }
    }
}

impl SearchFilter for ComparisonFilter {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn args(&self) -> &FilterArgs {
        &self.args
    }

    fn apply_inclusive(&self, sink: &mut dyn ClauseSink) -> Result<()> {
        self.emit(sink, false)
    }

    fn apply_exclusive(&self, sink: &mut dyn ClauseSink) -> Result<()> {
        self.emit(sink, true)
    }
}

// ============================================================================
// Fulltext
// ============================================================================

/// `MATCH ... AGAINST` search, evaluated in memory as a case-insensitive
/// pattern match.
#[derive(Debug, Clone)]
pub struct FulltextFilter {
    args: FilterArgs,
}

impl FulltextFilter {
    pub fn new(args: FilterArgs) -> Self {
        FulltextFilter { args }
    }

    fn clause(&self) -> String {
        format!("MATCH ({}) AGAINST (?)", self.args.quoted_field())
    }
}

impl SearchFilter for FulltextFilter {
    fn name(&self) -> &'static str {
        "Fulltext"
    }

    fn args(&self) -> &FilterArgs {
        &self.args
    }

    fn apply_inclusive(&self, sink: &mut dyn ClauseSink) -> Result<()> {
        let items = self.args.values();
        if items.is_empty() {
            match_nothing(sink);
            return Ok(());
        }
        let clause = self.clause();
        sink.push_where_any(items.into_iter().map(|v| (clause.clone(), v)).collect())
    }

    fn apply_exclusive(&self, sink: &mut dyn ClauseSink) -> Result<()> {
        let items = self.args.values();
        if items.is_empty() {
            return Ok(());
        }
        let fragment = repeat_joined(&self.clause(), items.len(), " OR ");
        sink.push_exclude(&fragment, Value::List(items))
    }
}

// ============================================================================
// Factories
// ============================================================================

pub fn exact_match(args: FilterArgs) -> Box<dyn SearchFilter> {
    Box::new(ExactMatchFilter::new(args))
}

pub fn partial_match(args: FilterArgs) -> Box<dyn SearchFilter> {
    Box::new(PatternFilter::new(PatternKind::Partial, args))
}

pub fn starts_with(args: FilterArgs) -> Box<dyn SearchFilter> {
    Box::new(PatternFilter::new(PatternKind::StartsWith, args))
}

pub fn ends_with(args: FilterArgs) -> Box<dyn SearchFilter> {
    Box::new(PatternFilter::new(PatternKind::EndsWith, args))
}

pub fn greater_than(args: FilterArgs) -> Box<dyn SearchFilter> {
    Box::new(ComparisonFilter::new(ComparisonKind::GreaterThan, args))
}

pub fn greater_than_or_equal(args: FilterArgs) -> Box<dyn SearchFilter> {
    Box::new(ComparisonFilter::new(
        ComparisonKind::GreaterThanOrEqual,
        args,
    ))
}

pub fn less_than(args: FilterArgs) -> Box<dyn SearchFilter> {
    Box::new(ComparisonFilter::new(ComparisonKind::LessThan, args))
}

pub fn less_than_or_equal(args: FilterArgs) -> Box<dyn SearchFilter> {
    Box::new(ComparisonFilter::new(ComparisonKind::LessThanOrEqual, args))
}

pub fn fulltext(args: FilterArgs) -> Box<dyn SearchFilter> {
    Box::new(FulltextFilter::new(args))
}
