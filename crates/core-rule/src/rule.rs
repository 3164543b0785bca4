//! Rule definitions and matchers
//!
//! A rule is declared as a [`RuleDefinition`]: polarity, actions, subjects,
//! a condition tree and an optional predicate. The ability registry that
//! owns the rule expands its actions once every rule is known, which turns
//! the definition into an immutable [`RuleMatcher`]:
//!
//! ```
//! use core_rule::{ActionAliases, ActionTag, ConditionNode, Record, RuleBuilder, SubjectRef};
//!
//! # fn main() -> Result<(), core_rule::RuleError> {
//! let aliases = ActionAliases::new().alias("modify", ["update", "destroy"]);
//!
//! let rule = RuleBuilder::can()
//!     .action("modify")
//!     .on("Article")
//!     .condition("published", ConditionNode::eq(false))
//!     .build()?
//!     .finalize(&aliases);
//!
//! let draft = Record::new("Article").with_attribute("published", false);
//! let update = ActionTag::named("update");
//!
//! assert!(rule.is_relevant(&update, SubjectRef::from(&draft)));
//! assert!(rule.matches(&update, SubjectRef::from(&draft), &[])?);
//! # Ok(())
//! # }
//! ```
//!
//! Relevance (`is_relevant`) only looks at actions and subjects. Whether the
//! conditions hold for a concrete instance is a separate question
//! (`matches`), asked only of relevant rules.

use crate::action::{ActionExpander, ActionTag};
use crate::condition::{matches_conditions, validate_depth, Conditions};
use crate::error::{Result, RuleError};
use crate::joins::{association_joins, JoinSpec};
use crate::naming::{tableize, NamingStrategy};
use crate::predicate::{Predicate, PredicateArgs};
use crate::subject::{SubjectRef, SubjectSpec};
use crate::value::Value;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// A declared rule whose actions have not been expanded yet
#[derive(Debug, Clone)]
pub struct RuleDefinition {
    /// `true` grants, `false` forbids when the rule matches
    polarity: bool,
    actions: BTreeSet<ActionTag>,
    subjects: Vec<SubjectSpec>,
    /// Empty mapping when the rule has no conditions
    conditions: Conditions,
    predicate: Option<Predicate>,
}

impl RuleDefinition {
    /// Declare a rule
    ///
    /// # Errors
    ///
    /// * `RuleError::InvalidRule` - no actions or no subjects were given
    /// * `RuleError::ConditionTooDeep` - the condition tree is too deep
    pub fn new<A, S>(
        polarity: bool,
        actions: A,
        subjects: S,
        conditions: Conditions,
        predicate: Option<Predicate>,
    ) -> Result<Self>
    where
        A: IntoIterator,
        A::Item: Into<ActionTag>,
        S: IntoIterator,
        S::Item: Into<SubjectSpec>,
    {
        let actions: BTreeSet<ActionTag> = actions.into_iter().map(Into::into).collect();
        if actions.is_empty() {
            return Err(RuleError::InvalidRule(
                "A rule needs at least one action".to_string(),
            ));
        }

        let mut unique: Vec<SubjectSpec> = Vec::new();
        for subject in subjects.into_iter().map(Into::into) {
            if !unique.contains(&subject) {
                unique.push(subject);
            }
        }
        if unique.is_empty() {
            return Err(RuleError::InvalidRule(
                "A rule needs at least one subject".to_string(),
            ));
        }

        validate_depth(&conditions)?;

        Ok(Self {
            polarity,
            actions,
            subjects: unique,
            conditions,
            predicate,
        })
    }

    // ===== Accessors =====

    /// `true` for a granting rule, `false` for a forbidding one
    #[must_use]
    pub const fn polarity(&self) -> bool {
        self.polarity
    }

    /// Declared actions
    #[must_use]
    pub fn actions(&self) -> &BTreeSet<ActionTag> {
        &self.actions
    }

    /// Declared subjects, in declaration order
    #[must_use]
    pub fn subjects(&self) -> &[SubjectSpec] {
        &self.subjects
    }

    /// Condition tree
    #[must_use]
    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// Custom predicate, if any
    #[must_use]
    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    // ===== Static queries =====

    /// Whether the rule declares no conditions
    #[must_use]
    pub fn is_conditions_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether the rule is decided by its predicate alone
    #[must_use]
    pub fn is_only_predicate(&self) -> bool {
        self.is_conditions_empty() && self.predicate.is_some()
    }

    /// Conditions with nested keys renamed for query generation
    #[must_use]
    pub fn tableized_conditions(&self, naming: &dyn NamingStrategy) -> Conditions {
        tableize(&self.conditions, naming)
    }

    /// Associations a query layer must join to evaluate the conditions
    #[must_use]
    pub fn association_joins(&self) -> Option<Vec<JoinSpec>> {
        association_joins(&self.conditions)
    }

    /// Expand the declared actions and freeze the rule
    #[must_use]
    pub fn finalize(self, expander: &dyn ActionExpander) -> RuleMatcher {
        let mut expanded_actions = expander.expand(&self.actions);
        // The declared actions always stay covered
        expanded_actions.extend(self.actions.iter().cloned());

        debug!(
            polarity = self.polarity,
            declared = ?self.actions,
            expanded = ?expanded_actions,
            subjects = ?self.subjects,
            "Rule finalized"
        );

        RuleMatcher {
            definition: self,
            expanded_actions,
        }
    }
}

/// A finalized, immutable rule ready for relevance and condition queries
///
/// Matchers are `Send + Sync` and can be shared between reader threads once
/// published.
#[derive(Debug, Clone)]
pub struct RuleMatcher {
    definition: RuleDefinition,
    expanded_actions: BTreeSet<ActionTag>,
}

impl RuleMatcher {
    /// The definition this matcher was built from
    #[must_use]
    pub fn definition(&self) -> &RuleDefinition {
        &self.definition
    }

    /// `true` for a granting rule, `false` for a forbidding one
    #[must_use]
    pub const fn polarity(&self) -> bool {
        self.definition.polarity
    }

    /// Declared actions closed under the action hierarchy
    #[must_use]
    pub fn expanded_actions(&self) -> &BTreeSet<ActionTag> {
        &self.expanded_actions
    }

    /// Check if this rule applies to the action/subject pair
    ///
    /// Conditions and predicate are not consulted.
    #[must_use]
    pub fn is_relevant(&self, action: &ActionTag, subject: SubjectRef<'_>) -> bool {
        let relevant = self.matches_action(action) && self.matches_subject(subject);
        trace!(%action, %subject, relevant, "Rule relevance");
        relevant
    }

    /// Check if the rule's conditions hold for `subject`
    ///
    /// Assumes [`is_relevant`](Self::is_relevant) already holds.
    ///
    /// 1. A predicate, when present, decides alone
    /// 2. Otherwise an instance is matched against the condition tree
    /// 3. Type-level checks and rules without conditions hold
    ///
    /// # Errors
    ///
    /// Attribute lookup and predicate failures are returned unchanged.
    pub fn matches(
        &self,
        action: &ActionTag,
        subject: SubjectRef<'_>,
        extra: &[Value],
    ) -> Result<bool> {
        let verdict = match (&self.definition.predicate, subject.instance()) {
            (Some(predicate), _) => predicate.call(&self.predicate_args(action, subject, extra))?,
            (None, Some(instance)) if !self.definition.conditions.is_empty() => {
                matches_conditions(instance, &self.definition.conditions)?
            }
            (None, _) => true,
        };

        trace!(%action, %subject, verdict, "Rule conditions");
        Ok(verdict)
    }

    /// Whether the rule declares no conditions
    #[must_use]
    pub fn is_conditions_empty(&self) -> bool {
        self.definition.is_conditions_empty()
    }

    /// Whether the rule is decided by its predicate alone
    #[must_use]
    pub fn is_only_predicate(&self) -> bool {
        self.definition.is_only_predicate()
    }

    /// Conditions with nested keys renamed for query generation
    #[must_use]
    pub fn tableized_conditions(&self, naming: &dyn NamingStrategy) -> Conditions {
        self.definition.tableized_conditions(naming)
    }

    /// Associations a query layer must join to evaluate the conditions
    #[must_use]
    pub fn association_joins(&self) -> Option<Vec<JoinSpec>> {
        self.definition.association_joins()
    }

    fn matches_action(&self, action: &ActionTag) -> bool {
        self.expanded_actions
            .iter()
            .any(|declared| declared.is_wildcard() || declared == action)
    }

    fn matches_subject(&self, subject: SubjectRef<'_>) -> bool {
        self.definition
            .subjects
            .iter()
            .any(|spec| spec.matches(subject))
    }

    fn predicate_args<'a>(
        &self,
        action: &'a ActionTag,
        subject: SubjectRef<'a>,
        extra: &'a [Value],
    ) -> PredicateArgs<'a> {
        let wildcard_action = self.expanded_actions.iter().any(ActionTag::is_wildcard);
        let wildcard_subject = self.definition.subjects.iter().any(SubjectSpec::is_wildcard);

        PredicateArgs {
            action: wildcard_action.then_some(action),
            subject_type: wildcard_subject.then(|| subject.type_tag()),
            subject: subject.instance(),
            extra,
        }
    }
}
