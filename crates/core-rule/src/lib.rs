// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 P47H Team <https://p47h.com>

//! # core-rule
//!
//! Single-rule evaluation for ability-rule style authorization.
//!
//! A rule grants (`can`) or forbids (`cannot`) a set of actions on a set of
//! subject types, optionally narrowed by attribute conditions or a custom
//! predicate. This crate answers, for one rule at a time:
//!
//! - Does the rule apply to this action and subject? ([`RuleMatcher::is_relevant`])
//! - Do its conditions hold for this subject? ([`RuleMatcher::matches`])
//! - Which associations must a query layer join to pre-filter records?
//!   ([`RuleMatcher::association_joins`])
//!
//! Combining the verdicts of several rules into a final decision belongs to
//! the ability registry that owns them.
//!
//! ## Security
//!
//! - Attribute and predicate failures are propagated, never read as "deny"
//! - Strict limits on manifest size to prevent algorithmic DoS
//!   - MAX_RULES_PER_MANIFEST = 1024
//!   - MAX_CONDITION_DEPTH = 32

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod builder;
pub mod condition;
pub mod error;
pub mod joins;
pub mod manifest;
pub mod naming;
pub mod predicate;
pub mod rule;
pub mod subject;
pub mod value;

pub use action::{ActionAliases, ActionExpander, ActionTag, NoExpansion};
pub use builder::RuleBuilder;
pub use condition::{ConditionNode, Conditions, Containment, ValueRange, MAX_CONDITION_DEPTH};
/// Re-export commonly used types
pub use error::{AttributeError, Result, RuleError};
pub use joins::JoinSpec;
pub use manifest::{Polarity, RuleEntry, RuleManifest};
pub use naming::{NamingStrategy, Verbatim};
pub use predicate::{Argument, Predicate, PredicateArgs};
pub use rule::{RuleDefinition, RuleMatcher};
pub use subject::{Record, Subject, SubjectRef, SubjectSpec, TypeTag};
pub use value::{SharedSubject, Value};

/// Maximum number of rules per manifest (DoS mitigation)
pub const MAX_RULES_PER_MANIFEST: usize = 1024;

/// Maximum length for manifest name (DoS mitigation)
pub const MAX_MANIFEST_NAME_LENGTH: usize = 128;
