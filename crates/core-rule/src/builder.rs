//! Builder pattern for ergonomic rule construction

use crate::action::ActionTag;
use crate::condition::{ConditionNode, Conditions};
use crate::error::{Result, RuleError};
use crate::predicate::{Predicate, PredicateArgs};
use crate::rule::RuleDefinition;
use crate::subject::SubjectSpec;

/// Builder for creating `RuleDefinition` instances with a fluent API
///
/// # Examples
///
/// ```
/// use core_rule::builder::RuleBuilder;
/// use core_rule::ConditionNode;
///
/// # fn example() -> Result<(), core_rule::RuleError> {
/// // Unconditional grant
/// let rule = RuleBuilder::can().action("read").on("Article").build()?;
///
/// // Forbid with a condition tree
/// let rule = RuleBuilder::cannot()
///     .action("destroy")
///     .on("Article")
///     .condition("locked", ConditionNode::eq(true))
///     .build()?;
///
/// // Wildcard rule decided by a predicate
/// let rule = RuleBuilder::can()
///     .action("manage")
///     .on_all()
///     .when(|args| args.subject.is_some())
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    polarity: bool,
    actions: Vec<ActionTag>,
    subjects: Vec<SubjectSpec>,
    conditions: Conditions,
    predicate: Option<Predicate>,
}

impl Default for RuleBuilder {
    fn default() -> Self {
        Self::can()
    }
}

impl RuleBuilder {
    /// Create a builder for a granting rule
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a granting rule
    #[must_use]
    pub fn can() -> Self {
        Self::with_polarity(true)
    }

    /// Start a forbidding rule
    #[must_use]
    pub fn cannot() -> Self {
        Self::with_polarity(false)
    }

    fn with_polarity(polarity: bool) -> Self {
        Self {
            polarity,
            actions: Vec::new(),
            subjects: Vec::new(),
            conditions: Conditions::new(),
            predicate: None,
        }
    }

    /// Add an action (`"manage"` is the wildcard)
    #[must_use]
    pub fn action(mut self, action: impl Into<ActionTag>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Add several actions
    #[must_use]
    pub fn actions<I, A>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ActionTag>,
    {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    /// Add a subject type
    #[must_use]
    pub fn on(mut self, subject: impl Into<SubjectSpec>) -> Self {
        self.subjects.push(subject.into());
        self
    }

    /// Apply the rule to every subject
    #[must_use]
    pub fn on_all(self) -> Self {
        self.on(SubjectSpec::All)
    }

    /// Add (or replace) the condition on one attribute
    #[must_use]
    pub fn condition(mut self, attribute: impl Into<String>, node: ConditionNode) -> Self {
        self.conditions.insert(attribute.into(), node);
        self
    }

    /// Merge a whole condition mapping
    #[must_use]
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions.extend(conditions);
        self
    }

    /// Attach a prebuilt predicate
    #[must_use]
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Attach an infallible predicate closure
    #[must_use]
    pub fn when<F>(self, f: F) -> Self
    where
        F: Fn(&PredicateArgs<'_>) -> bool + Send + Sync + 'static,
    {
        self.with_predicate(Predicate::new(f))
    }

    /// Build the `RuleDefinition`
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidRule` if no action or no subject was set,
    /// and `RuleError::ConditionTooDeep` if the condition tree is too deep.
    pub fn build(self) -> Result<RuleDefinition> {
        if self.actions.is_empty() {
            return Err(RuleError::InvalidRule("action is required".to_string()));
        }
        if self.subjects.is_empty() {
            return Err(RuleError::InvalidRule("subject is required".to_string()));
        }

        RuleDefinition::new(
            self.polarity,
            self.actions,
            self.subjects,
            self.conditions,
            self.predicate,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_action() {
        let result = RuleBuilder::can().on("Article").build();
        assert!(matches!(result, Err(RuleError::InvalidRule(msg)) if msg.contains("action")));
    }

    #[test]
    fn test_missing_subject() {
        let result = RuleBuilder::can().action("read").build();
        assert!(matches!(result, Err(RuleError::InvalidRule(msg)) if msg.contains("subject")));
    }

    #[test]
    fn test_default_is_granting() {
        let rule = RuleBuilder::new().action("read").on("Article").build().unwrap();
        assert!(rule.polarity());

        let rule = RuleBuilder::cannot()
            .action("read")
            .on("Article")
            .build()
            .unwrap();
        assert!(!rule.polarity());
    }

    #[test]
    fn test_manage_and_all_become_wildcards() {
        let rule = RuleBuilder::can()
            .action("manage")
            .on("all")
            .build()
            .unwrap();

        assert!(rule.actions().contains(&ActionTag::Manage));
        assert_eq!(rule.subjects(), &[SubjectSpec::All]);
    }

    #[test]
    fn test_condition_replaces_same_attribute() {
        let rule = RuleBuilder::can()
            .action("read")
            .on("Article")
            .condition("published", ConditionNode::eq(false))
            .condition("published", ConditionNode::eq(true))
            .build()
            .unwrap();

        assert_eq!(rule.conditions().len(), 1);
        assert_eq!(rule.conditions()["published"], ConditionNode::eq(true));
    }

    #[test]
    fn test_when_marks_predicate_only() {
        let rule = RuleBuilder::can()
            .action("read")
            .on("Article")
            .when(|_| true)
            .build()
            .unwrap();

        assert!(rule.is_only_predicate());
        assert!(rule.predicate().is_some());
    }
}
