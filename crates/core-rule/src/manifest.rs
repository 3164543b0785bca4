//! Rule manifests
//!
//! A manifest is a named, serializable set of rules plus the alias table
//! used to expand their actions. Manifests are loaded from TOML:
//!
//! ```toml
//! name = "blog"
//!
//! [aliases]
//! modify = ["update", "destroy"]
//!
//! [[rules]]
//! polarity = "can"
//! actions = ["read"]
//! subjects = ["Article"]
//!
//! [rules.conditions]
//! published = { Scalar = true }
//! author = { Nested = { active = { Scalar = true } } }
//! ```
//!
//! ## Limits
//!
//! - `MAX_RULES_PER_MANIFEST` (1024): Maximum rules per manifest
//! - `MAX_MANIFEST_NAME_LENGTH` (128): Maximum manifest name length
//! - `MAX_CONDITION_DEPTH` (32): Maximum condition nesting
//!
//! Predicates are closures and cannot be written to a manifest; rules that
//! need one are declared in code with [`RuleBuilder`](crate::RuleBuilder).

use crate::action::{ActionAliases, ActionTag};
use crate::condition::Conditions;
use crate::error::{Result, RuleError};
use crate::rule::{RuleDefinition, RuleMatcher};
use crate::subject::SubjectSpec;
use crate::{MAX_MANIFEST_NAME_LENGTH, MAX_RULES_PER_MANIFEST};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Whether a rule grants or forbids
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// The rule grants when it matches
    #[default]
    Can,
    /// The rule forbids when it matches
    Cannot,
}

impl Polarity {
    /// `true` for [`Polarity::Can`]
    #[must_use]
    pub const fn is_can(self) -> bool {
        matches!(self, Self::Can)
    }
}

impl From<bool> for Polarity {
    fn from(polarity: bool) -> Self {
        if polarity {
            Self::Can
        } else {
            Self::Cannot
        }
    }
}

/// Serialized form of one rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
    /// Grant or forbid (defaults to grant)
    #[serde(default)]
    pub polarity: Polarity,
    /// Declared actions
    pub actions: Vec<ActionTag>,
    /// Declared subjects
    pub subjects: Vec<SubjectSpec>,
    /// Condition tree (omitted when empty)
    #[serde(default, skip_serializing_if = "Conditions::is_empty")]
    pub conditions: Conditions,
}

impl RuleEntry {
    /// Validate the entry into a predicate-free definition
    ///
    /// # Errors
    ///
    /// Same as [`RuleDefinition::new`]
    pub fn to_definition(&self) -> Result<RuleDefinition> {
        RuleDefinition::new(
            self.polarity.is_can(),
            self.actions.iter().cloned(),
            self.subjects.iter().cloned(),
            self.conditions.clone(),
            None,
        )
    }
}

impl From<&RuleDefinition> for RuleEntry {
    fn from(definition: &RuleDefinition) -> Self {
        Self {
            polarity: definition.polarity().into(),
            actions: definition.actions().iter().cloned().collect(),
            subjects: definition.subjects().to_vec(),
            conditions: definition.conditions().clone(),
        }
    }
}

/// A named rule set with its action aliases
///
/// The `#[serde(try_from)]` attribute ensures every deserialized manifest
/// passes the same validation as one built through [`RuleManifest::new`]
/// and [`RuleManifest::add_rule`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ManifestRaw", into = "ManifestRaw")]
pub struct RuleManifest {
    name: String,
    aliases: ActionAliases,
    definitions: Vec<RuleDefinition>,
}

/// Raw manifest structure for deserialization (internal use only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestRaw {
    name: String,
    #[serde(default, skip_serializing_if = "ActionAliases::is_empty")]
    aliases: ActionAliases,
    #[serde(default)]
    rules: Vec<RuleEntry>,
}

/// Convert ManifestRaw to RuleManifest with validation
///
/// # Errors
///
/// - `NameTooLong`: Manifest name exceeds `MAX_MANIFEST_NAME_LENGTH`
/// - `TooManyRules`: More than `MAX_RULES_PER_MANIFEST` rules
/// - `InvalidRule` / `ConditionTooDeep`: A rule fails validation
impl TryFrom<ManifestRaw> for RuleManifest {
    type Error = RuleError;

    fn try_from(raw: ManifestRaw) -> Result<Self> {
        check_name(&raw.name)?;

        if raw.rules.len() > MAX_RULES_PER_MANIFEST {
            return Err(RuleError::TooManyRules {
                max: MAX_RULES_PER_MANIFEST,
                attempted: raw.rules.len(),
            });
        }

        let definitions = raw
            .rules
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                entry.to_definition().map_err(|err| match err {
                    RuleError::InvalidRule(reason) => {
                        RuleError::InvalidRule(format!("rule #{}: {}", index + 1, reason))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: raw.name,
            aliases: raw.aliases,
            definitions,
        })
    }
}

impl From<RuleManifest> for ManifestRaw {
    fn from(manifest: RuleManifest) -> Self {
        Self {
            rules: manifest.definitions.iter().map(RuleEntry::from).collect(),
            name: manifest.name,
            aliases: manifest.aliases,
        }
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.len() > MAX_MANIFEST_NAME_LENGTH {
        return Err(RuleError::NameTooLong {
            max: MAX_MANIFEST_NAME_LENGTH,
            length: name.len(),
        });
    }
    Ok(())
}

impl RuleManifest {
    // ===== Constructors =====

    /// Create an empty manifest
    ///
    /// # Errors
    ///
    /// Returns `RuleError::NameTooLong` if name exceeds `MAX_MANIFEST_NAME_LENGTH`
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        check_name(&name)?;

        Ok(Self {
            name,
            aliases: ActionAliases::new(),
            definitions: Vec::new(),
        })
    }

    /// Replace the alias table
    #[must_use]
    pub fn with_aliases(mut self, aliases: ActionAliases) -> Self {
        self.aliases = aliases;
        self
    }

    /// Append a rule
    ///
    /// # Errors
    ///
    /// - `RuleError::TooManyRules` if the manifest is full
    /// - `RuleError::InvalidRule` if the rule carries a predicate
    pub fn add_rule(mut self, definition: RuleDefinition) -> Result<Self> {
        if self.definitions.len() >= MAX_RULES_PER_MANIFEST {
            return Err(RuleError::TooManyRules {
                max: MAX_RULES_PER_MANIFEST,
                attempted: self.definitions.len() + 1,
            });
        }
        if definition.predicate().is_some() {
            return Err(RuleError::InvalidRule(
                "Rules with predicates cannot be stored in a manifest".to_string(),
            ));
        }

        self.definitions.push(definition);
        Ok(self)
    }

    // ===== Accessors =====

    /// Get the manifest name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the alias table
    #[must_use]
    pub fn aliases(&self) -> &ActionAliases {
        &self.aliases
    }

    /// Rule definitions in declaration order
    #[must_use]
    pub fn definitions(&self) -> &[RuleDefinition] {
        &self.definitions
    }

    /// Finalize every rule against the manifest's alias table
    #[must_use]
    pub fn matchers(&self) -> Vec<RuleMatcher> {
        debug!(
            manifest = %self.name,
            rules = self.definitions.len(),
            aliases = self.aliases.count(),
            "Finalizing manifest rules"
        );

        self.definitions
            .iter()
            .cloned()
            .map(|definition| definition.finalize(&self.aliases))
            .collect()
    }

    // ===== Serialization =====

    /// Parse and validate a manifest from TOML
    ///
    /// # Errors
    ///
    /// Returns `RuleError::TomlError` if parsing or validation fails
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(toml_str)?;
        debug!(
            manifest = %manifest.name,
            rules = manifest.definitions.len(),
            "Manifest loaded"
        );
        Ok(manifest)
    }

    /// Serialize the manifest to TOML
    ///
    /// # Errors
    ///
    /// Returns `RuleError::SerializationError` if TOML serialization fails
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| RuleError::SerializationError(e.to_string()))
    }
}
