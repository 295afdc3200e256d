//! Property-based tests for search-filter lists using proptest.

use std::collections::BTreeMap;

use proptest::prelude::*;
use sift::{SearchList, Value};

// ============================================================================
// Test helpers
// ============================================================================

type Row = BTreeMap<String, Value>;

fn row(id: usize, score: Option<i64>, name: Option<String>) -> Row {
    let mut r = Row::new();
    r.insert("Id".to_string(), Value::from(id));
    if let Some(s) = score {
        r.insert("Score".to_string(), Value::from(s));
    }
    if let Some(n) = name {
        r.insert("Name".to_string(), Value::from(n));
    }
    r
}

fn list_strategy() -> impl Strategy<Value = SearchList<Row>> {
    prop::collection::vec(
        (
            prop::option::weighted(0.8, -50i64..50),
            prop::option::weighted(0.8, "[a-cA-C]{0,3}"),
        ),
        0..30,
    )
    .prop_map(|cells| {
        cells
            .into_iter()
            .enumerate()
            .map(|(id, (score, name))| row(id, score, name))
            .collect::<SearchList<Row>>()
    })
}

fn negation() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(""), Just(":not")]
}

/// A catalogue filter expression with a value that fits it.
fn clause_strategy() -> impl Strategy<Value = (String, Value)> {
    let case = prop_oneof![Just(""), Just(":nocase"), Just(":case")];
    let numeric = (
        prop_oneof![
            Just("ExactMatch"),
            Just("GreaterThan"),
            Just("GreaterThanOrEqual"),
            Just("LessThan"),
            Just("LessThanOrEqual"),
        ],
        negation(),
        -50i64..50,
    )
        .prop_map(|(filter, m, v)| (format!("Score:{filter}{m}"), Value::from(v)));
    let text = (
        prop_oneof![
            Just("ExactMatch"),
            Just("PartialMatch"),
            Just("StartsWith"),
            Just("EndsWith"),
        ],
        negation(),
        case,
        "[a-cA-C]{1,2}",
    )
        .prop_map(|(filter, m, c, v)| (format!("Name:{filter}{m}{c}"), Value::from(v)));
    let fulltext = (negation(), "[a-c]{1,2}")
        .prop_map(|(m, v)| (format!("Name:Fulltext{m}"), Value::from(format!("%{v}%"))));
    prop_oneof![numeric, text, fulltext]
}

fn ids(list: &SearchList<Row>) -> Vec<Value> {
    list.column("Id")
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Filtering twice with the same clause changes nothing.
    #[test]
    fn filter_is_idempotent(list in list_strategy(), (expr, value) in clause_strategy()) {
        let once = list.filter((expr.as_str(), value.clone())).unwrap();
        let twice = once.filter((expr.as_str(), value)).unwrap();
        prop_assert_eq!(ids(&once), ids(&twice));
    }

    /// The order of independent filters does not matter.
    #[test]
    fn filters_commute(
        list in list_strategy(),
        (a, av) in clause_strategy(),
        (b, bv) in clause_strategy(),
    ) {
        let ab = list
            .filter((a.as_str(), av.clone()))
            .and_then(|l| l.filter((b.as_str(), bv.clone())))
            .unwrap();
        let ba = list
            .filter((b.as_str(), bv))
            .and_then(|l| l.filter((a.as_str(), av)))
            .unwrap();
        prop_assert_eq!(ids(&ab), ids(&ba));
    }

    /// filter and exclude of one clause partition the list.
    #[test]
    fn filter_and_exclude_partition(list in list_strategy(), (expr, value) in clause_strategy()) {
        let kept = ids(&list.filter((expr.as_str(), value.clone())).unwrap());
        let dropped = ids(&list.exclude((expr.as_str(), value)).unwrap());
        prop_assert_eq!(kept.len() + dropped.len(), list.len());
        prop_assert!(kept.iter().all(|id| !dropped.contains(id)));
    }

    /// Comparison filters partition the list even for a null value or a
    /// list-valued field.
    #[test]
    fn comparison_partitions_odd_values(
        list in list_strategy(),
        filter in prop_oneof![
            Just("GreaterThan"),
            Just("GreaterThanOrEqual"),
            Just("LessThan"),
            Just("LessThanOrEqual"),
        ],
        m in negation(),
        value in prop_oneof![(-50i64..50).prop_map(Value::from), Just(Value::Null)],
        listed in prop::collection::vec(-50i64..50, 0..3),
    ) {
        let mut rows: Vec<Row> = list.iter().cloned().collect();
        let mut extra = row(rows.len(), None, None);
        extra.insert("Score".to_string(), Value::from(listed));
        rows.push(extra);
        let list: SearchList<Row> = rows.into_iter().collect();

        let expr = format!("Score:{filter}{m}");
        let kept = ids(&list.filter((expr.as_str(), value.clone())).unwrap());
        let dropped = ids(&list.exclude((expr.as_str(), value)).unwrap());
        prop_assert_eq!(kept.len() + dropped.len(), list.len());
        prop_assert!(kept.iter().all(|id| !dropped.contains(id)));
    }

    /// A positive clause never keeps a record without the field.
    #[test]
    fn missing_field_never_matches(
        list in list_strategy(),
        (expr, value) in clause_strategy().prop_filter("positive", |(e, _)| !e.contains(":not")),
    ) {
        let field = expr.split(':').next().unwrap_or_default();
        let kept = list.filter((expr.as_str(), value)).unwrap();
        prop_assert!(kept.iter().all(|r| !r.get(field).map_or(true, Value::is_null)));
    }

    /// A list value is the disjunction of its items.
    #[test]
    fn list_value_expands_to_any(
        list in list_strategy(),
        values in prop::collection::vec(-50i64..50, 1..4),
    ) {
        let as_list = list
            .filter(("Score", Value::List(values.iter().copied().map(Value::from).collect())))
            .unwrap();
        let pairs: Vec<(&str, Value)> = values.iter().map(|v| ("Score", Value::from(*v))).collect();
        let as_any = list.filter_any(pairs).unwrap();
        prop_assert_eq!(ids(&as_list), ids(&as_any));
    }

    /// exclude_any keeps exactly the records no clause matches.
    #[test]
    fn exclude_any_is_complement_of_filter_any(
        list in list_strategy(),
        (a, av) in clause_strategy(),
        (b, bv) in clause_strategy(),
    ) {
        let clauses = vec![(a.as_str(), av), (b.as_str(), bv)];
        let any = ids(&list.filter_any(clauses.clone()).unwrap());
        let none = ids(&list.exclude_any(clauses).unwrap());
        prop_assert_eq!(any.len() + none.len(), list.len());
        prop_assert!(any.iter().all(|id| !none.contains(id)));
    }
}
