//! Attribute values
//!
//! [`Value`] is what a [`Subject`] hands back for an attribute lookup, and
//! what scalar and containment conditions compare against.
//!
//! ## Comparison semantics
//!
//! - Integers and floats compare numerically across the two variants
//! - Objects compare by identity (same shared instance)
//! - Ordering is only defined between numbers, between strings and between
//!   booleans; anything else is incomparable, which keeps range checks false

use crate::subject::{Subject, TypeTag};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A subject shared between an owner and the values that point at it
pub type SharedSubject = Arc<dyn Subject + Send + Sync>;

/// Value of a subject attribute or a condition literal
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// String
    String(String),
    /// Ordered sequence (one-to-many associations are lists of objects)
    List(Vec<Value>),
    /// Associated object whose own attributes can be queried
    #[serde(skip)]
    Object(SharedSubject),
}

impl Value {
    /// Wrap a subject as an object value
    pub fn object(subject: impl Subject + Send + Sync + 'static) -> Self {
        Self::Object(Arc::new(subject))
    }

    /// Build a list value
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Short name of the variant, used in error messages
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }

    /// Whether this is `Null`
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the object, if this value is one
    #[must_use]
    pub fn as_object(&self) -> Option<&SharedSubject> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Borrow the list elements, if this value is a list
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Integer(i) => f.debug_tuple("Integer").field(i).finish(),
            Self::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Object(object) => f
                .debug_tuple("Object")
                .field(&object.type_tag().as_str())
                .finish(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => write!(f, "{:?}", s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Self::Object(object) => write!(f, "#<{}>", object.type_tag()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Integer(i), Self::Float(x)) | (Self::Float(x), Self::Integer(i)) => {
                int_float_cmp(*i, *x) == Some(Ordering::Equal)
            }
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.partial_cmp(b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Float(b)) => int_float_cmp(*a, *b),
            (Self::Float(a), Self::Integer(b)) => int_float_cmp(*b, *a).map(Ordering::reverse),
            (Self::String(a), Self::String(b)) => a.partial_cmp(b),
            _ if self == other => Some(Ordering::Equal),
            _ => None,
        }
    }
}

/// Exact comparison of an integer against a float.
///
/// Casting `i` to `f64` rounds above 2^53, so the float is split into its
/// integral part (compared as `i64`) and its fraction instead.
fn int_float_cmp(i: i64, x: f64) -> Option<Ordering> {
    // 2^63, the first float above i64::MAX
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

    if x.is_nan() {
        return None;
    }
    if x >= I64_BOUND {
        return Some(Ordering::Less);
    }
    if x < -I64_BOUND {
        return Some(Ordering::Greater);
    }

    let whole = x.trunc();
    // In range, so the cast is exact
    match i.cmp(&(whole as i64)) {
        Ordering::Equal if x > whole => Some(Ordering::Less),
        Ordering::Equal if x < whole => Some(Ordering::Greater),
        ordering => Some(ordering),
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&TypeTag> for Value {
    fn from(tag: &TypeTag) -> Self {
        Self::String(tag.as_str().to_string())
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Self::list(items)
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<SharedSubject> for Value {
    fn from(object: SharedSubject) -> Self {
        Self::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::Record;

    #[test]
    fn test_numeric_equality_across_variants() {
        assert_eq!(Value::Integer(2), Value::Float(2.0));
        assert_eq!(Value::Float(2.0), Value::Integer(2));
        assert_ne!(Value::Integer(2), Value::Float(2.5));
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let above = Value::Integer(9_007_199_254_740_993);
        let float = Value::Float(9_007_199_254_740_992.0);
        let exact = Value::Integer(9_007_199_254_740_992);

        assert_ne!(above, float);
        assert_ne!(float, above);
        assert_eq!(exact, float);
        assert_eq!(above.partial_cmp(&float), Some(Ordering::Greater));
        assert_eq!(float.partial_cmp(&above), Some(Ordering::Less));

        assert!(Value::Integer(2) < Value::Float(2.5));
        assert!(Value::Float(2.5) < Value::Integer(3));
        assert!(Value::Float(-2.5) < Value::Integer(-2));
        assert!(Value::Integer(i64::MAX) < Value::Float(9_223_372_036_854_775_808.0));
        assert!(Value::Integer(i64::MIN) > Value::Float(f64::NEG_INFINITY));
        assert_eq!(Value::Integer(i64::MIN), Value::Float(-9_223_372_036_854_775_808.0));
        assert_eq!(Value::Integer(0).partial_cmp(&Value::Float(f64::NAN)), None);
    }

    #[test]
    fn test_null_is_only_equal_to_null() {
        assert!(Value::from(None::<i64>).is_null());
        assert!(!Value::from(0).is_null());
        assert_eq!(Value::Null, Value::Null);
    }

    #[test]
    fn test_mismatched_kinds_are_not_equal() {
        assert_ne!(Value::from("1"), Value::Integer(1));
        assert_ne!(Value::Bool(true), Value::Integer(1));
        assert_ne!(Value::Null, Value::Bool(false));
    }

    #[test]
    fn test_objects_compare_by_identity() {
        let author = Value::object(Record::new("User"));
        let same = author.clone();
        let twin = Value::object(Record::new("User"));

        assert_eq!(author, same);
        assert_ne!(author, twin);
    }

    #[test]
    fn test_ordering() {
        assert!(Value::Integer(1) < Value::Integer(2));
        assert!(Value::Integer(1) < Value::Float(1.5));
        assert!(Value::from("a") < Value::from("b"));
        assert_eq!(
            Value::Null.partial_cmp(&Value::Null),
            Some(Ordering::Equal)
        );
        assert_eq!(Value::from("1").partial_cmp(&Value::Integer(1)), None);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::from(vec![1, 2]).kind(), "list");
        assert_eq!(Value::from(None::<i64>).kind(), "null");
        assert_eq!(Value::object(Record::new("User")).kind(), "object");
    }

    #[test]
    fn test_display() {
        let list = Value::list([Value::from(1), Value::from("x"), Value::Null]);
        assert_eq!(list.to_string(), "[1, \"x\", null]");
        assert_eq!(Value::object(Record::new("User")).to_string(), "#<User>");
    }
}
