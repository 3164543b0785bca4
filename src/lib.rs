// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 P47H Team <https://p47h.com>

//! # p47h-rules
//!
//! Ability-rule style authorization: declaration, relevance, condition
//! matching and query join derivation.
//!
//! ## Quick Start
//!
//! ```rust
//! use p47h_rules::rules::{ActionTag, ConditionNode, NoExpansion, Record, RuleBuilder, SubjectRef};
//!
//! # fn main() -> Result<(), p47h_rules::rules::RuleError> {
//! let rule = RuleBuilder::can()
//!     .action("read")
//!     .on("Article")
//!     .condition("published", ConditionNode::eq(true))
//!     .build()?
//!     .finalize(&NoExpansion);
//!
//! let article = Record::new("Article").with_attribute("published", true);
//! let read = ActionTag::named("read");
//!
//! assert!(rule.is_relevant(&read, SubjectRef::from(&article)));
//! assert!(rule.matches(&read, SubjectRef::from(&article), &[])?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! This facade crate re-exports the following modules:
//!
//! - [`rules`] - Rule definitions and matchers (from `core-rule`)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Rule engine module.
///
/// Re-exports `core_rule` for rule declaration and evaluation.
pub mod rules {
    pub use core_rule::*;
}

// Convenience re-exports at root level
pub use core_rule::{RuleBuilder, RuleDefinition, RuleManifest, RuleMatcher};
