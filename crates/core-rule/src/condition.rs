//! # Condition trees
//!
//! A rule's conditions describe which attribute values a subject instance
//! must carry for the rule to apply. They form a tree:
//!
//! - **Scalar**: the attribute must equal a value
//! - **Containment**: the attribute must be one of a list of values, or lie
//!   inside an inclusive range
//! - **Nested**: the attribute is an associated object (or a list of them)
//!   whose own attributes are matched recursively
//!
//! ## Evaluation
//!
//! Sibling entries are combined with AND. A nested condition applied to a
//! list attribute holds if **any** element satisfies it:
//!
//! ```
//! use core_rule::condition::{matches_conditions, ConditionNode, Conditions};
//! use core_rule::subject::Record;
//! use core_rule::Value;
//!
//! let conditions = Conditions::from([(
//!     "tasks".to_string(),
//!     ConditionNode::nested([("done", ConditionNode::eq(true))]),
//! )]);
//!
//! let project = Record::new("Project").with_attribute(
//!     "tasks",
//!     Value::list([
//!         Value::object(Record::new("Task").with_attribute("done", false)),
//!         Value::object(Record::new("Task").with_attribute("done", true)),
//!     ]),
//! );
//!
//! assert!(matches_conditions(&project, &conditions).unwrap());
//! ```
//!
//! ## Security
//!
//! - Attribute lookup failures are propagated, never read as "no match"
//! - Tree depth is bounded by [`MAX_CONDITION_DEPTH`] at declaration time,
//!   which also bounds evaluation recursion

use crate::error::{Result, RuleError};
use crate::subject::Subject;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Maximum nesting depth of a condition tree
pub const MAX_CONDITION_DEPTH: usize = 32;

/// Attribute name to condition mapping
///
/// An empty mapping means "no conditions".
pub type Conditions = BTreeMap<String, ConditionNode>;

/// One node of a condition tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConditionNode {
    /// Attribute must equal this value
    Scalar(Value),
    /// Attribute must be contained in a collection or range
    Containment(Containment),
    /// Attribute is an object (or list of objects) matched recursively
    Nested(Conditions),
}

/// Collection an attribute value must belong to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Containment {
    /// Discrete set of accepted values
    Values(Vec<Value>),
    /// Inclusive range of accepted values
    Range(ValueRange),
}

/// Inclusive range `start..=end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lower bound (inclusive)
    pub start: Value,
    /// Upper bound (inclusive)
    pub end: Value,
}

impl ValueRange {
    /// Create an inclusive range
    pub fn new(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Check if `value` lies within the range
    ///
    /// Values that cannot be ordered against the bounds are outside.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.start <= *value && *value <= self.end
    }
}

impl Containment {
    /// Check if `value` is a member of this collection
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Self::Values(values) => values.contains(value),
            Self::Range(range) => range.contains(value),
        }
    }
}

impl ConditionNode {
    /// Equality condition
    pub fn eq(value: impl Into<Value>) -> Self {
        Self::Scalar(value.into())
    }

    /// Membership condition over a discrete set
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Containment(Containment::Values(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    /// Membership condition over an inclusive range
    pub fn range(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self::Containment(Containment::Range(ValueRange::new(start, end)))
    }

    /// Nested condition on an associated object
    pub fn nested<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ConditionNode)>,
        K: Into<String>,
    {
        Self::Nested(
            entries
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        )
    }

    /// Whether this node recurses into an associated object
    #[must_use]
    pub const fn is_nested(&self) -> bool {
        matches!(self, Self::Nested(_))
    }

    /// Nesting depth of this node (leaves are 0)
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Nested(children) => conditions_depth(children),
            _ => 0,
        }
    }
}

/// Nesting depth of a condition mapping (a flat mapping is 1)
#[must_use]
pub fn conditions_depth(conditions: &Conditions) -> usize {
    1 + conditions
        .values()
        .map(ConditionNode::depth)
        .max()
        .unwrap_or(0)
}

/// Reject trees deeper than [`MAX_CONDITION_DEPTH`]
///
/// # Errors
///
/// Returns `RuleError::ConditionTooDeep` if the limit is exceeded
pub fn validate_depth(conditions: &Conditions) -> Result<()> {
    let depth = conditions_depth(conditions);
    if depth > MAX_CONDITION_DEPTH {
        return Err(RuleError::ConditionTooDeep {
            max: MAX_CONDITION_DEPTH,
            depth,
        });
    }
    Ok(())
}

/// Evaluate a condition mapping against a subject instance
///
/// Returns `Ok(true)` when every entry holds. Entries are checked in key
/// order and evaluation stops at the first entry that does not hold.
///
/// # Errors
///
/// * `RuleError::Attribute` - an attribute lookup failed
/// * `RuleError::NotAnObject` - a nested condition met a non-object value
pub fn matches_conditions(subject: &dyn Subject, conditions: &Conditions) -> Result<bool> {
    for (name, node) in conditions {
        let attribute = subject.attribute(name).map_err(|err| {
            warn!(
                subject = %subject.type_tag(),
                attribute = %name,
                error = %err,
                "Attribute lookup failed during condition evaluation"
            );
            err
        })?;

        if !matches_node(name, &attribute, node)? {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Check one attribute value against one condition node
fn matches_node(name: &str, attribute: &Value, node: &ConditionNode) -> Result<bool> {
    match node {
        ConditionNode::Nested(children) => match attribute {
            // One-to-many: any element satisfying the nested condition is enough
            Value::List(elements) => {
                for element in elements {
                    if matches_nested(name, element, children)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            single => matches_nested(name, single, children),
        },
        ConditionNode::Containment(collection) => Ok(collection.contains(attribute)),
        ConditionNode::Scalar(expected) => Ok(attribute == expected),
    }
}

fn matches_nested(name: &str, value: &Value, children: &Conditions) -> Result<bool> {
    // Vacuously true, whatever the value is
    if children.is_empty() {
        return Ok(true);
    }

    match value {
        Value::Object(object) => matches_conditions(object.as_ref(), children),
        other => Err(RuleError::NotAnObject {
            attribute: name.to_string(),
            found: other.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AttributeError;
    use crate::subject::Record;

    fn conditions<const N: usize>(entries: [(&str, ConditionNode); N]) -> Conditions {
        entries
            .into_iter()
            .map(|(name, node)| (name.to_string(), node))
            .collect()
    }

    #[test]
    fn test_empty_conditions_match_anything() {
        let record = Record::new("Article");
        assert!(matches_conditions(&record, &Conditions::new()).unwrap());
    }

    #[test]
    fn test_scalar_equality() {
        let record = Record::new("Article").with_attribute("published", true);

        let expect_true = conditions([("published", ConditionNode::eq(true))]);
        let expect_false = conditions([("published", ConditionNode::eq(false))]);

        assert!(matches_conditions(&record, &expect_true).unwrap());
        assert!(!matches_conditions(&record, &expect_false).unwrap());
    }

    #[test]
    fn test_siblings_are_anded() {
        let record = Record::new("Article")
            .with_attribute("published", true)
            .with_attribute("priority", 5);

        let both = conditions([
            ("published", ConditionNode::eq(true)),
            ("priority", ConditionNode::eq(5)),
        ]);
        let one_wrong = conditions([
            ("published", ConditionNode::eq(true)),
            ("priority", ConditionNode::eq(4)),
        ]);

        assert!(matches_conditions(&record, &both).unwrap());
        assert!(!matches_conditions(&record, &one_wrong).unwrap());
    }

    #[test]
    fn test_containment_values_and_range() {
        let record = Record::new("Person")
            .with_attribute("priority", 2)
            .with_attribute("age", 40);

        let listed = conditions([("priority", ConditionNode::one_of([1, 2, 3]))]);
        let adult = conditions([("age", ConditionNode::range(18, 65))]);
        let senior = conditions([("age", ConditionNode::range(50, 65))]);

        assert!(matches_conditions(&record, &listed).unwrap());
        assert!(matches_conditions(&record, &adult).unwrap());
        assert!(!matches_conditions(&record, &senior).unwrap());
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let range = ValueRange::new(18, 65);

        assert!(range.contains(&Value::Integer(18)));
        assert!(range.contains(&Value::Integer(65)));
        assert!(!range.contains(&Value::Integer(17)));
        assert!(!range.contains(&Value::Integer(66)));
        assert!(!range.contains(&Value::from("40")));
    }

    #[test]
    fn test_missing_attribute_propagates() {
        let record = Record::new("Article");
        let tree = conditions([("published", ConditionNode::eq(true))]);
        let result = matches_conditions(&record, &tree);

        assert!(matches!(
            result,
            Err(RuleError::Attribute(AttributeError::Missing { .. }))
        ));
    }

    #[test]
    fn test_nested_on_scalar_is_an_error() {
        let record = Record::new("Article").with_attribute("author", "alice");
        let tree = conditions([(
            "author",
            ConditionNode::nested([("active", ConditionNode::eq(true))]),
        )]);

        assert!(matches!(
            matches_conditions(&record, &tree),
            Err(RuleError::NotAnObject { found: "string", .. })
        ));
    }

    #[test]
    fn test_empty_nested_is_vacuous() {
        let record = Record::new("Article").with_attribute("author", Value::Null);
        let tree = conditions([("author", ConditionNode::Nested(Conditions::new()))]);

        assert!(matches_conditions(&record, &tree).unwrap());
    }

    #[test]
    fn test_depth() {
        assert_eq!(conditions_depth(&Conditions::new()), 1);
        assert_eq!(
            conditions_depth(&conditions([("a", ConditionNode::eq(1))])),
            1
        );

        let tree = conditions([(
            "comments",
            ConditionNode::nested([(
                "author",
                ConditionNode::nested([("active", ConditionNode::eq(true))]),
            )]),
        )]);
        assert_eq!(conditions_depth(&tree), 3);
    }

    #[test]
    fn test_depth_limit() {
        let mut node = ConditionNode::eq(true);
        for _ in 0..MAX_CONDITION_DEPTH {
            node = ConditionNode::nested([("child", node)]);
        }
        let tree = conditions([("root", node)]);

        assert!(matches!(
            validate_depth(&tree),
            Err(RuleError::ConditionTooDeep { max: MAX_CONDITION_DEPTH, .. })
        ));
    }
}
