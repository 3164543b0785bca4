//! Custom predicates
//!
//! A rule may carry a predicate instead of (or on top of) a condition tree.
//! When present it alone decides whether the rule's conditions hold; the
//! condition tree is then only used to derive query joins.
//!
//! The predicate always receives the same [`PredicateArgs`] shape. Slots that
//! do not apply to the rule are `None`:
//!
//! | slot           | present when                              |
//! |----------------|-------------------------------------------|
//! | `action`       | the rule's expanded actions include `manage` |
//! | `subject_type` | the rule's subjects include `all`         |
//! | `subject`      | the check is made against an instance     |
//!
//! [`PredicateArgs::positional`] flattens those slots into the positional
//! argument list `(action?, subject_type?, instance-or-absent, extra...)`.

use crate::action::ActionTag;
use crate::error::Result;
use crate::subject::{Subject, TypeTag};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

type PredicateFn = dyn Fn(&PredicateArgs<'_>) -> Result<bool> + Send + Sync;

/// Custom matcher attached to a rule
///
/// # Example
///
/// ```
/// use core_rule::predicate::Predicate;
///
/// // Grant only to subjects checked with an explicit "owner" flag
/// let owner_only = Predicate::new(|args| {
///     args.extra.first().is_some_and(|flag| *flag == true.into())
/// });
/// ```
#[derive(Clone)]
pub struct Predicate {
    inner: Arc<PredicateFn>,
}

impl Predicate {
    /// Wrap an infallible predicate
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&PredicateArgs<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(move |args: &PredicateArgs<'_>| -> Result<bool> { Ok(f(args)) }),
        }
    }

    /// Wrap a predicate that may fail; failures reach the caller unchanged
    pub fn try_new<F>(f: F) -> Self
    where
        F: Fn(&PredicateArgs<'_>) -> Result<bool> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Invoke the predicate
    ///
    /// # Errors
    ///
    /// Returns whatever error the predicate itself reports
    pub fn call(&self, args: &PredicateArgs<'_>) -> Result<bool> {
        (self.inner)(args)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Arguments handed to a [`Predicate`]
#[derive(Clone)]
pub struct PredicateArgs<'a> {
    /// Action being checked (wildcard-action rules only)
    pub action: Option<&'a ActionTag>,
    /// Type being checked (wildcard-subject rules only)
    pub subject_type: Option<TypeTag>,
    /// The instance, absent for type-level checks
    pub subject: Option<&'a dyn Subject>,
    /// Opaque caller-supplied arguments, forwarded verbatim
    pub extra: &'a [Value],
}

impl<'a> PredicateArgs<'a> {
    /// Positional view of the arguments
    #[must_use]
    pub fn positional(&self) -> Vec<Argument<'a>> {
        let mut args = Vec::with_capacity(3 + self.extra.len());

        if let Some(action) = self.action {
            args.push(Argument::Action(action));
        }
        if let Some(subject_type) = &self.subject_type {
            args.push(Argument::SubjectType(subject_type.clone()));
        }
        args.push(match self.subject {
            Some(subject) => Argument::Subject(subject),
            None => Argument::Absent,
        });
        args.extend(self.extra.iter().map(Argument::Extra));

        args
    }
}

impl fmt::Debug for PredicateArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateArgs")
            .field("action", &self.action)
            .field("subject_type", &self.subject_type)
            .field("subject", &self.subject.map(|s| s.type_tag()))
            .field("extra", &self.extra)
            .finish()
    }
}

/// One positional predicate argument
#[derive(Clone)]
pub enum Argument<'a> {
    /// The concrete action being checked
    Action(&'a ActionTag),
    /// The subject's type
    SubjectType(TypeTag),
    /// The subject instance
    Subject(&'a dyn Subject),
    /// Placeholder for the instance in type-level checks
    Absent,
    /// A caller-supplied extra argument
    Extra(&'a Value),
}

impl fmt::Debug for Argument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(action) => f.debug_tuple("Action").field(action).finish(),
            Self::SubjectType(tag) => f.debug_tuple("SubjectType").field(tag).finish(),
            Self::Subject(subject) => f
                .debug_tuple("Subject")
                .field(&subject.type_tag())
                .finish(),
            Self::Absent => f.write_str("Absent"),
            Self::Extra(value) => f.debug_tuple("Extra").field(value).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;
    use crate::subject::Record;

    #[test]
    fn test_positional_with_every_slot() {
        let action = ActionTag::named("update");
        let record = Record::new("Article");
        let extra = [Value::from(7)];

        let args = PredicateArgs {
            action: Some(&action),
            subject_type: Some(TypeTag::new("Article")),
            subject: Some(&record),
            extra: &extra,
        };

        let positional = args.positional();
        assert_eq!(positional.len(), 4);
        assert!(matches!(positional[0], Argument::Action(a) if *a == action));
        assert!(matches!(&positional[1], Argument::SubjectType(t) if t.as_str() == "Article"));
        assert!(matches!(positional[2], Argument::Subject(_)));
        assert!(matches!(positional[3], Argument::Extra(Value::Integer(7))));
    }

    #[test]
    fn test_positional_type_level_uses_absent_marker() {
        let args = PredicateArgs {
            action: None,
            subject_type: None,
            subject: None,
            extra: &[],
        };

        let positional = args.positional();
        assert_eq!(positional.len(), 1);
        assert!(matches!(positional[0], Argument::Absent));
    }

    #[test]
    fn test_predicate_errors_propagate() {
        let failing = Predicate::try_new(|_| Err(RuleError::predicate("backend down")));
        let args = PredicateArgs {
            action: None,
            subject_type: None,
            subject: None,
            extra: &[],
        };

        assert!(matches!(failing.call(&args), Err(RuleError::Predicate(reason)) if reason == "backend down"));
    }
}
