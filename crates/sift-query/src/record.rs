//! Field access for filterable records.
//!
//! Records come in two shapes: keyed mappings (`HashMap`, `BTreeMap`, JSON
//! objects) and attributed objects (plain structs). Both are read through the
//! [`Record`] trait; structs implement it by hand or with
//! `#[derive(Record)]` from `sift-macros`.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use crate::value::{Number, Value};

/// Trait for types that can be filtered by a query.
///
/// # Manual Implementation
///
/// ```
/// use sift_query::{Record, Value};
///
/// struct Task {
///     name: String,
///     priority: u8,
/// }
///
/// impl Record for Task {
///     fn field(&self, name: &str) -> Option<Value> {
///         match name {
///             "Name" => Some(Value::from(self.name.as_str())),
///             "Priority" => Some(Value::from(self.priority)),
///             _ => None,
///         }
///     }
/// }
///
/// let task = Task { name: "Write docs".into(), priority: 3 };
/// assert_eq!(task.field("Priority"), Some(Value::from(3u8)));
/// assert_eq!(task.field("Unknown"), None);
/// ```
pub trait Record {
    /// Returns the value of a field, or `None` if the record has no such
    /// field.
    ///
    /// Returning `Some(Value::Null)` is equivalent to `None` for filtering.
    fn field(&self, name: &str) -> Option<Value>;
}

/// Conversion of a field into a [`Value`] by reference.
///
/// Used by `#[derive(Record)]` to read struct fields without moving them.
pub trait ToValue {
    /// Converts the field to a value.
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for Number {
    fn to_value(&self) -> Value {
        Value::Number(*self)
    }
}

macro_rules! to_value_number {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

to_value_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToValue::to_value)
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        Value::from(self.clone())
    }
}

impl<V: ToValue, S: BuildHasher> Record for HashMap<String, V, S> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).map(ToValue::to_value)
    }
}

impl<V: ToValue> Record for BTreeMap<String, V> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).map(ToValue::to_value)
    }
}

impl Record for serde_json::Map<String, serde_json::Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).map(ToValue::to_value)
    }
}

impl Record for serde_json::Value {
    fn field(&self, name: &str) -> Option<Value> {
        match self {
            serde_json::Value::Object(map) => map.field(name),
            _ => None,
        }
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

impl<R: Record + ?Sized> Record for Rc<R> {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

impl<R: Record + ?Sized> Record for Arc<R> {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestItem {
        name: String,
        count: i32,
        note: Option<String>,
    }

    impl Record for TestItem {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "name" => Some(self.name.to_value()),
                "count" => Some(self.count.to_value()),
                "note" => Some(self.note.to_value()),
                _ => None,
            }
        }
    }

    #[test]
    fn record_manual_impl() {
        let item = TestItem {
            name: "test".to_string(),
            count: 42,
            note: None,
        };

        assert_eq!(item.field("name"), Some(Value::from("test")));
        assert_eq!(item.field("count"), Some(Value::from(42)));
        assert_eq!(item.field("note"), Some(Value::Null));
        assert_eq!(item.field("unknown"), None);
    }

    #[test]
    fn keyed_mappings() {
        let mut hash: HashMap<String, Value> = HashMap::new();
        hash.insert("a".into(), Value::from(1));
        assert_eq!(hash.field("a"), Some(Value::from(1)));
        assert_eq!(hash.field("b"), None);

        let mut tree: BTreeMap<String, &str> = BTreeMap::new();
        tree.insert("a".into(), "x");
        assert_eq!(tree.field("a"), Some(Value::from("x")));
    }

    #[test]
    fn json_objects() {
        let json = serde_json::json!({"Title": "First", "Count": 3, "Gone": null});
        assert_eq!(json.field("Title"), Some(Value::from("First")));
        assert_eq!(json.field("Count"), Some(Value::from(3i64)));
        assert_eq!(json.field("Gone"), Some(Value::Null));
        assert_eq!(json.field("Other"), None);
        assert_eq!(serde_json::json!([1, 2]).field("0"), None);
    }

    #[test]
    fn smart_pointers_delegate() {
        let item = Rc::new(TestItem {
            name: "rc".to_string(),
            count: 1,
            note: Some("n".to_string()),
        });
        assert_eq!(item.field("name"), Some(Value::from("rc")));
        let boxed: Box<dyn Record> = Box::new(serde_json::json!({"k": true}));
        assert_eq!(boxed.field("k"), Some(Value::Bool(true)));
    }

    #[test]
    fn to_value_conversions() {
        assert_eq!(7u8.to_value(), Value::from(7u8));
        assert_eq!("s".to_value(), Value::from("s"));
        assert_eq!(Some(2.5).to_value(), Value::from(2.5));
        assert_eq!(None::<i32>.to_value(), Value::Null);
        assert_eq!(
            vec![1, 2].to_value(),
            Value::List(vec![Value::from(1), Value::from(2)])
        );
    }
}
