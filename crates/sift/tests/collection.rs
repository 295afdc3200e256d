//! End-to-end filtering of a JSON-backed collection.

use serde_json::json;
use sift::{Filters, SearchList, SiftError, Value};

// ============================================================================
// Fixture
// ============================================================================

fn objects() -> SearchList<serde_json::Value> {
    SearchList::new(vec![
        json!({
            "Title": "First Object",
            "NoCase": "CaSe SeNsItIvE",
            "CaseSensitive": "Case Sensitive",
            "StartsWithTest": "Test Value",
            "GreaterThan100": 300,
            "LessThan100": 50,
        }),
        json!({
            "Title": "Second Object",
            "NoCase": "case sensitive",
            "CaseSensitive": "case sensitive",
            "StartsWithTest": "Not Starts With Test",
            "GreaterThan100": 101,
            "LessThan100": 99,
        }),
        json!({
            "Title": "Third Object",
            "NoCase": null,
            "StartsWithTest": "Does not start with test",
            "GreaterThan100": 99,
            "LessThan100": 99,
        }),
        json!({
            "Title": "Fourth Object",
            "StartsWithTest": "test value, but lower case",
            "GreaterThan100": 100,
            "LessThan100": 100,
        }),
    ])
}

fn titles(list: &SearchList<serde_json::Value>) -> Vec<String> {
    list.column("Title").iter().map(Value::to_string).collect()
}

fn found_title(found: Option<&serde_json::Value>) -> Option<&str> {
    found.and_then(|o| o["Title"].as_str())
}

// ============================================================================
// find
// ============================================================================

#[test]
fn find_exact_title() {
    let list = objects();
    let found = list.find(("Title", "First Object")).unwrap();
    assert_eq!(found_title(found), Some("First Object"));
}

#[test]
fn find_starts_with_nocase() {
    let list = objects();
    let found = list.find(("StartsWithTest:StartsWith:nocase", "Test")).unwrap();
    assert_eq!(found_title(found), Some("First Object"));
}

#[test]
fn find_starts_with_negated() {
    let list = objects();
    let found = list.find(("StartsWithTest:StartsWith:not", "Test")).unwrap();
    assert_eq!(found_title(found), Some("Second Object"));
}

#[test]
fn find_less_than() {
    let list = objects();
    let found = list.find(("GreaterThan100:LessThan", 100)).unwrap();
    assert_eq!(found_title(found), Some("Third Object"));
}

#[test]
fn find_without_result() {
    let list = objects();
    assert!(list.find(("Title", "No Results")).unwrap().is_none());
    assert!(list.find(("LessThan100:GreaterThan", 1000)).unwrap().is_none());
    assert!(list.find(("LessThan100:LessThan:not", 1000)).unwrap().is_none());
}

// ============================================================================
// filter
// ============================================================================

#[test]
fn filter_negated_title() {
    let list = objects();
    let kept = list.filter(("Title:not", "First Object")).unwrap();
    assert_eq!(
        titles(&kept),
        vec!["Second Object", "Third Object", "Fourth Object"]
    );
}

#[test]
fn filter_two_negations() {
    let list = objects();
    let kept = list
        .filter([
            ("Title:not", "First Object"),
            ("Title:ExactMatch:not", "Second Object"),
        ])
        .unwrap();
    assert_eq!(titles(&kept), vec!["Third Object", "Fourth Object"]);
}

#[test]
fn filter_negated_missing_value_keeps_all() {
    let list = objects();
    assert_eq!(list.filter(("Title:not", "No Object")).unwrap().len(), 4);
}

#[test]
fn filter_title_in_list() {
    let list = objects();
    let kept = list
        .filter(("Title", vec!["First Object", "Second Object"]))
        .unwrap();
    assert_eq!(titles(&kept), vec!["First Object", "Second Object"]);
}

#[test]
fn filter_bare_keys_match_null() {
    let list = objects();
    assert!(list
        .filter(Filters::keys(["Title", "No Object"]))
        .unwrap()
        .is_empty());
    let kept = list.filter(Filters::keys(["NoCase"])).unwrap();
    assert_eq!(titles(&kept), vec!["Third Object", "Fourth Object"]);
}

#[test]
fn filter_default_collation_is_exact() {
    let list = objects();
    let kept = list.filter(("NoCase", "case sensitive")).unwrap();
    assert_eq!(titles(&kept), vec!["Second Object"]);
    assert!(list.filter(("NoCase", "Case Sensitive")).unwrap().is_empty());
}

#[test]
fn filter_nocase() {
    let list = objects();
    let kept = list.filter(("NoCase:nocase", "case sensitive")).unwrap();
    assert_eq!(titles(&kept), vec!["First Object", "Second Object"]);

    let kept = list
        .filter([
            ("NoCase:nocase", "case sensitive"),
            ("CaseSensitive", "case sensitive"),
        ])
        .unwrap();
    assert_eq!(titles(&kept), vec!["Second Object"]);
}

#[test]
fn filter_case_modifier() {
    let list = objects();
    let kept = list.filter(("NoCase:case", "case sensitive")).unwrap();
    assert_eq!(titles(&kept), vec!["Second Object"]);
    let kept = list.filter(("Title:PartialMatch:case", "object")).unwrap();
    assert!(kept.is_empty());
    let kept = list.filter(("Title:PartialMatch", "object")).unwrap();
    assert_eq!(kept.len(), 4);
}

#[test]
fn filter_comparisons() {
    let list = objects();
    assert_eq!(
        titles(&list.filter(("GreaterThan100:GreaterThan", 100)).unwrap()),
        vec!["First Object", "Second Object"]
    );
    assert_eq!(
        titles(&list.filter(("LessThan100:LessThan", 100)).unwrap()),
        vec!["First Object", "Second Object", "Third Object"]
    );
    assert_eq!(
        titles(&list.filter(("LessThan100:LessThan:not", 100)).unwrap()),
        vec!["Fourth Object"]
    );
    assert_eq!(
        titles(&list.filter(("GreaterThan100:GreaterThanOrEqual", 100)).unwrap()),
        vec!["First Object", "Second Object", "Fourth Object"]
    );
    assert_eq!(
        titles(&list.filter(("LessThan100:LessThanOrEqual", 50)).unwrap()),
        vec!["First Object"]
    );
}

#[test]
fn filter_combined_comparisons() {
    let list = objects();
    let kept = list
        .filter([
            ("LessThan100:LessThan", 100),
            ("GreaterThan100:GreaterThan:not", 100),
        ])
        .unwrap();
    assert_eq!(titles(&kept), vec!["Third Object"]);

    let kept = list
        .filter([
            ("LessThan100:LessThan", 1),
            ("GreaterThan100:GreaterThan", 100),
        ])
        .unwrap();
    assert!(kept.is_empty());
}

#[test]
fn filter_pattern_families() {
    let list = objects();
    assert_eq!(
        titles(&list.filter(("Title:EndsWith", "d Object")).unwrap()),
        vec!["Second Object", "Third Object"]
    );
    assert_eq!(
        titles(&list.filter(("Title:PartialMatch", vec!["irs", "our"])).unwrap()),
        vec!["First Object", "Fourth Object"]
    );
    assert_eq!(
        titles(&list.filter(("Title:StartsWith:not", vec!["F", "S"])).unwrap()),
        vec!["Third Object"]
    );
}

#[test]
fn filter_fulltext() {
    let list = objects();
    assert_eq!(
        titles(&list.filter(("StartsWithTest:Fulltext", "%value%")).unwrap()),
        vec!["First Object", "Fourth Object"]
    );
    assert_eq!(
        titles(&list.filter(("StartsWithTest:Fulltext:not", "%value%")).unwrap()),
        vec!["Second Object", "Third Object"]
    );
}

#[test]
fn filter_from_json_filters() {
    let list = objects();
    let filters: Filters = serde_json::from_value(json!({
        "GreaterThan100:GreaterThan": 99,
        "Title:not": ["First Object", "Fourth Object"],
    }))
    .unwrap();
    assert_eq!(titles(&list.filter(filters).unwrap()), vec!["Second Object"]);
}

#[test]
fn filter_is_chainable() {
    let list = objects();
    let kept = list
        .filter(("LessThan100:LessThan", 100))
        .and_then(|l| l.filter(("Title:StartsWith", "S")))
        .unwrap();
    assert_eq!(titles(&kept), vec!["Second Object"]);
}

// ============================================================================
// filter_any
// ============================================================================

#[test]
fn filter_any_is_disjunctive() {
    let list = objects();
    let kept = list
        .filter_any([
            ("Title", Value::from("Third Object")),
            ("GreaterThan100:GreaterThan", Value::from(200)),
        ])
        .unwrap();
    assert_eq!(titles(&kept), vec!["First Object", "Third Object"]);
}

// ============================================================================
// exclude
// ============================================================================

#[test]
fn exclude_negated_title() {
    let list = objects();
    let kept = list.exclude(("Title:not", "First Object")).unwrap();
    assert_eq!(titles(&kept), vec!["First Object"]);
}

#[test]
fn exclude_two_negations() {
    let list = objects();
    let kept = list
        .exclude([
            ("Title:not", "First Object"),
            ("Title:ExactMatch:not", "Second Object"),
        ])
        .unwrap();
    assert_eq!(titles(&kept), vec!["First Object", "Second Object"]);
}

#[test]
fn exclude_missing_values() {
    let list = objects();
    assert!(list.exclude(("Title:not", "No Object")).unwrap().is_empty());
    assert_eq!(list.exclude(("Title", "No Object")).unwrap().len(), 4);
}

#[test]
fn exclude_keeps_records_without_the_field() {
    let list = objects();
    let kept = list.exclude(("NoCase:PartialMatch", "sensitive")).unwrap();
    assert_eq!(titles(&kept), vec!["Third Object", "Fourth Object"]);
}

#[test]
fn comparison_with_null_value_partitions() {
    let list = SearchList::new(vec![json!({"G": 5}), json!({"G": 200}), json!({})]);
    let filters = Filters::keys(["G:GreaterThan"]);
    assert!(list.filter(filters.clone()).unwrap().is_empty());
    assert_eq!(list.exclude(filters).unwrap().len(), 3);
}

#[test]
fn comparison_on_list_field_partitions() {
    let list = SearchList::new(vec![json!({"G": [1, 2]}), json!({"G": 200})]);
    let kept = list.filter(("G:GreaterThan", 100)).unwrap();
    let dropped = list.exclude(("G:GreaterThan", 100)).unwrap();
    assert_eq!(kept.column("G"), vec![Value::from(200)]);
    assert_eq!(dropped.column("G"), vec![Value::from(vec![1, 2])]);

    let kept = list.filter(("G:LessThanOrEqual:not", 100)).unwrap();
    assert_eq!(kept.len(), 2);
}

#[test]
fn empty_filter_sets() {
    let list = objects();
    assert_eq!(list.filter(Filters::new()).unwrap().len(), 4);
    assert_eq!(list.exclude_any(Filters::new()).unwrap().len(), 4);
    assert!(list.filter_any(Filters::new()).unwrap().is_empty());
    assert!(list.exclude(Filters::new()).unwrap().is_empty());
}

#[test]
fn exclude_any_removes_every_match() {
    let list = objects();
    let kept = list
        .exclude_any([
            ("Title", Value::from("First Object")),
            ("LessThan100", Value::from(100)),
        ])
        .unwrap();
    assert_eq!(titles(&kept), vec!["Second Object", "Third Object"]);
}

// ============================================================================
// Errors and the kernel
// ============================================================================

#[test]
fn errors_surface() {
    let list = objects();
    assert!(matches!(
        list.filter(("Title:Soundex", "x")),
        Err(SiftError::UnknownFilter(_))
    ));
    assert!(matches!(
        list.filter(("GreaterThan100:GreaterThan:nocase", 1)),
        Err(SiftError::UnsupportedModifier { .. })
    ));
    assert!(matches!(
        list.filter((":StartsWith", "x")),
        Err(SiftError::EmptyExpression(_))
    ));
}

#[test]
fn query_aggregates_over_list() {
    let list = objects();
    assert_eq!(list.query().max("GreaterThan100"), Some(Value::from(300)));
    assert_eq!(list.query().min("LessThan100"), Some(Value::from(50)));
    assert_eq!(list.query().avg("LessThan100"), Some(87.0));

    let mut query = list.query();
    query
        .where_clause(r#""Title" LIKE ?"#, "%d Object")
        .unwrap();
    assert_eq!(query.count(), 2);
}
