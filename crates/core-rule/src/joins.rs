//! Join specifications for query layers
//!
//! A query layer that pre-filters records by a rule's conditions has to load
//! every association the condition tree reaches into. [`association_joins`]
//! lists those associations as a tree.
//!
//! `None` means the conditions need no joins at all, which is different from
//! a join whose own children list is empty.

use crate::condition::{ConditionNode, Conditions};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One association to join, with the associations to join beneath it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    /// Association (attribute) name
    pub name: String,
    /// Joins required inside the association
    pub children: Vec<JoinSpec>,
}

impl JoinSpec {
    /// Create a join with children
    #[must_use]
    pub fn new(name: impl Into<String>, children: Vec<JoinSpec>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// Create a join with no nested joins
    #[must_use]
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

/// Serializes as a single-entry map `{ name: [children...] }`
impl Serialize for JoinSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.children)?;
        map.end()
    }
}

/// Derive the joins a condition tree needs
///
/// Every `Nested` entry yields a join named after the attribute; scalar and
/// containment entries yield nothing. Returns `None` if this level has no
/// nested entries.
#[must_use]
pub fn association_joins(conditions: &Conditions) -> Option<Vec<JoinSpec>> {
    let joins: Vec<JoinSpec> = conditions
        .iter()
        .filter_map(|(name, node)| match node {
            ConditionNode::Nested(children) => Some(JoinSpec::new(
                name.clone(),
                association_joins(children).unwrap_or_default(),
            )),
            ConditionNode::Scalar(_) | ConditionNode::Containment(_) => None,
        })
        .collect();

    (!joins.is_empty()).then_some(joins)
}
