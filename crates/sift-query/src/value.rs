//! Runtime value types for field comparison.
//!
//! [`Value`] is the dynamically typed value a [`Record`](crate::Record) hands
//! to the engine and the literal a clause compares against. Comparisons are
//! "loose" in the way SQL fragments expect: numeric strings compare as numbers,
//! everything else compares by its text form.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Dynamically typed scalar, or a list of scalars.
///
/// # Example
///
/// ```
/// use sift_query::{Number, Value};
///
/// assert_eq!(Value::from(42), Value::Number(Number::I64(42)));
/// assert_eq!(Value::from("x"), Value::String("x".to_string()));
/// assert_eq!(Value::from(None::<i32>), Value::Null);
/// assert!(Value::from("100").loose_eq(&Value::from(100)));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// String value.
    String(String),
    /// List of values, used by `IN` and multi-value filters.
    List(Vec<Value>),
}

impl Value {
    /// Returns `true` if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if this is a `String` value.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns `true` if this is a `Number` value.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Returns `true` if this is a `List` value.
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts the list items, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Turns a list into its items and any other value into a one-element list.
    pub fn into_list(self) -> Vec<Value> {
        match self {
            Value::List(items) => items,
            other => vec![other],
        }
    }

    /// Returns `true` for values a form would treat as "not filled in":
    /// null, whitespace-only strings and empty lists.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Returns `true` for null, `false`, zero, `""`, `"0"` and empty lists.
    ///
    /// Stricter than [`Value::is_blank`]: `0` and `false` count as empty,
    /// while whitespace-only text does not.
    pub fn is_empty(&self) -> bool {
        !self.truthy()
    }

    /// Numeric view of the value: numbers, numeric strings and booleans.
    pub fn to_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => Number::parse(s),
            Value::Bool(b) => Some(Number::I64(*b as i64)),
            _ => None,
        }
    }

    /// Text view of a scalar value. Lists and null have none.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(true) => Some(Cow::Borrowed("1")),
            Value::Bool(false) => Some(Cow::Borrowed("0")),
            Value::Null | Value::List(_) => None,
        }
    }

    /// Strict identity: same variant and same value.
    ///
    /// Numbers of different representations are identical when they are
    /// equal, so `I64(1)` and `U64(1)` are the same value.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.compare(*b) == Some(Ordering::Equal),
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.identical(y))
            }
            _ => self == other,
        }
    }

    /// Loose equality with string/number coercion.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Bool(a), b) | (b, Value::Bool(a)) => b.truthy() == *a,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Value::List(_), _) | (_, Value::List(_)) => false,
            (Value::String(a), Value::String(b)) => match (Number::parse(a), Number::parse(b)) {
                (Some(x), Some(y)) => x.compare(y) == Some(Ordering::Equal),
                _ => a == b,
            },
            _ => self.loose_cmp(other) == Some(Ordering::Equal),
        }
    }

    /// Ordering for `<`, `>`, `<=` and `>=`.
    ///
    /// Numeric when both sides have a numeric view, otherwise lexicographic on
    /// the text forms. Null and lists are unordered.
    pub fn loose_cmp(&self, other: &Value) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.to_number(), other.to_number()) {
            return a.compare(b);
        }
        match (self.to_text(), other.to_text()) {
            (Some(a), Some(b)) => Some(a.as_ref().cmp(b.as_ref())),
            _ => None,
        }
    }

    fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.to_f64() != 0.0,
            Value::String(s) => !s.is_empty() && s != "0",
            Value::List(items) => !items.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
///
/// Comparisons between different numeric types are handled by converting
/// to the appropriate common type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            (Number::I64(a), Number::U64(b)) => Some(compare_signed(a, b)),
            (Number::U64(a), Number::I64(b)) => Some(compare_signed(b, a).reverse()),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Parses a numeric string: integers first, then floats.
    ///
    /// Surrounding whitespace is ignored; anything else that is not part of
    /// a number makes the string non-numeric.
    pub fn parse(s: &str) -> Option<Number> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(n) = s.parse::<i64>() {
            return Some(Number::I64(n));
        }
        if let Ok(n) = s.parse::<u64>() {
            return Some(Number::U64(n));
        }
        match s.parse::<f64>() {
            // "inf" and "NaN" parse as floats but are not numeric strings.
            Ok(n) if n.is_finite() => Some(Number::F64(n)),
            _ => None,
        }
    }

    /// Adds two numbers, staying integral while it fits.
    pub fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => a
                .checked_add(b)
                .map(Number::I64)
                .unwrap_or(Number::F64(a as f64 + b as f64)),
            (Number::U64(a), Number::U64(b)) => a
                .checked_add(b)
                .map(Number::U64)
                .unwrap_or(Number::F64(a as f64 + b as f64)),
            _ => Number::F64(self.to_f64() + other.to_f64()),
        }
    }
}

fn compare_signed(a: i64, b: u64) -> Ordering {
    if a < 0 {
        Ordering::Less
    } else {
        (a as u64).cmp(&b)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            // Whole floats print without a fraction, like "100" for 100.0.
            Number::F64(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Number::F64(n) => write!(f, "{n}"),
        }
    }
}

macro_rules! number_from {
    ($variant:ident as $target:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(n: $t) -> Self {
                    Number::$variant(n as $target)
                }
            }

            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Number(Number::I64(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Number(Number::U64(u))
                } else {
                    n.as_f64().map_or(Value::Null, |f| Value::Number(Number::F64(f)))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            // Nested objects are not comparable scalars.
            serde_json::Value::Object(_) => Value::Null,
        }
    }
}
