//! Action tags and action-hierarchy expansion
//!
//! A rule declares the actions it covers. Before a rule can answer relevance
//! queries its declared actions are closed under an [`ActionExpander`], so
//! that e.g. a rule declared for `modify` also covers `update` and `destroy`.
//!
//! ```rust
//! use core_rule::action::{ActionAliases, ActionExpander, ActionTag};
//! use std::collections::BTreeSet;
//!
//! let aliases = ActionAliases::new().alias("modify", ["update", "destroy"]);
//!
//! let declared: BTreeSet<ActionTag> = [ActionTag::named("modify")].into();
//! let expanded = aliases.expand(&declared);
//!
//! assert!(expanded.contains(&ActionTag::named("modify")));
//! assert!(expanded.contains(&ActionTag::named("update")));
//! assert!(expanded.contains(&ActionTag::named("destroy")));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Name of the wildcard action in manifests and string conversions
pub const MANAGE: &str = "manage";

/// Action token a rule can be declared for
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionTag {
    /// Wildcard: every action
    Manage,
    /// A concrete action such as `read` or `update`
    ///
    /// Never holds `"manage"`: [`ActionTag::named`], `From<String>`,
    /// `From<&str>` and deserialization all map that name to
    /// [`ActionTag::Manage`]. A `Named("manage")` built by hand is still
    /// treated as the wildcard by [`ActionTag::is_wildcard`].
    Named(String),
}

impl ActionTag {
    /// Create the wildcard action
    #[must_use]
    pub const fn manage() -> Self {
        Self::Manage
    }

    /// Create a named action (`"manage"` still yields the wildcard)
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::from(name.into())
    }

    /// Whether this tag is the wildcard action
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        match self {
            Self::Manage => true,
            Self::Named(name) => name == MANAGE,
        }
    }

    /// Get the action name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Manage => MANAGE,
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ActionTag {
    fn from(name: String) -> Self {
        if name == MANAGE {
            Self::Manage
        } else {
            Self::Named(name)
        }
    }
}

impl From<&str> for ActionTag {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<ActionTag> for String {
    fn from(action: ActionTag) -> Self {
        match action {
            ActionTag::Manage => MANAGE.to_string(),
            ActionTag::Named(name) => name,
        }
    }
}

/// Closes a set of declared actions under an action hierarchy.
///
/// Implementations must return a superset of `actions`.
pub trait ActionExpander {
    /// Expand the declared actions
    fn expand(&self, actions: &BTreeSet<ActionTag>) -> BTreeSet<ActionTag>;
}

impl<F> ActionExpander for F
where
    F: Fn(&BTreeSet<ActionTag>) -> BTreeSet<ActionTag>,
{
    fn expand(&self, actions: &BTreeSet<ActionTag>) -> BTreeSet<ActionTag> {
        self(actions)
    }
}

/// Expander that leaves the declared actions untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExpansion;

impl ActionExpander for NoExpansion {
    fn expand(&self, actions: &BTreeSet<ActionTag>) -> BTreeSet<ActionTag> {
        actions.clone()
    }
}

/// Table of action aliases (`alias -> actions it stands for`)
///
/// Expansion is transitive: if `modify -> update` and `update -> patch`,
/// a rule declared for `modify` covers all three. Cycles are harmless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionAliases {
    aliases: BTreeMap<ActionTag, BTreeSet<ActionTag>>,
}

impl ActionAliases {
    /// Creates an empty alias table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an alias (builder style), merging with any existing targets
    #[must_use]
    pub fn alias<I, A>(mut self, alias: impl Into<ActionTag>, targets: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ActionTag>,
    {
        self.aliases
            .entry(alias.into())
            .or_default()
            .extend(targets.into_iter().map(Into::into));
        self
    }

    /// Registers an alias, replacing its previous targets
    ///
    /// # Returns
    ///
    /// `Some(old_targets)` if the alias was already registered, `None` if new
    pub fn register<I, A>(
        &mut self,
        alias: impl Into<ActionTag>,
        targets: I,
    ) -> Option<BTreeSet<ActionTag>>
    where
        I: IntoIterator<Item = A>,
        A: Into<ActionTag>,
    {
        let targets = targets.into_iter().map(Into::into).collect();
        self.aliases.insert(alias.into(), targets)
    }

    /// Direct targets of an alias
    pub fn targets(&self, alias: &ActionTag) -> Option<&BTreeSet<ActionTag>> {
        self.aliases.get(alias)
    }

    /// Iterate over `(alias, targets)` pairs in alias order
    pub fn iter(&self) -> impl Iterator<Item = (&ActionTag, &BTreeSet<ActionTag>)> {
        self.aliases.iter()
    }

    /// Number of registered aliases
    #[must_use]
    pub fn count(&self) -> usize {
        self.aliases.len()
    }

    /// Whether no aliases are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl ActionExpander for ActionAliases {
    fn expand(&self, actions: &BTreeSet<ActionTag>) -> BTreeSet<ActionTag> {
        let mut expanded = actions.clone();
        let mut pending: Vec<&ActionTag> = actions.iter().collect();

        while let Some(action) = pending.pop() {
            let Some(targets) = self.aliases.get(action) else {
                continue;
            };
            for target in targets {
                if expanded.insert(target.clone()) {
                    pending.push(target);
                }
            }
        }

        expanded
    }
}
