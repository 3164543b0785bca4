//! Error types for core-rule

use thiserror::Error;

/// Result type alias for rule operations
pub type Result<T> = core::result::Result<T, RuleError>;

/// Failure to resolve an attribute on a subject.
///
/// Attribute lookups are external calls; whatever they report is carried to
/// the caller unchanged. A missing attribute is never read as "no match".
#[derive(Debug, Error)]
pub enum AttributeError {
    /// The subject has no attribute with this name
    #[error("{subject_type} has no attribute `{attribute}`")]
    Missing {
        /// Type of the subject that was queried
        subject_type: String,
        /// Attribute that could not be resolved
        attribute: String,
    },

    /// The accessor exists but failed while producing a value
    #[error("Failed to read attribute `{attribute}`: {reason}")]
    Failed {
        /// Attribute being read
        attribute: String,
        /// Accessor-provided failure reason
        reason: String,
    },
}

/// Errors that can occur while declaring or evaluating rules
#[derive(Debug, Error)]
pub enum RuleError {
    /// Attribute resolution failed during condition evaluation
    #[error(transparent)]
    Attribute(#[from] AttributeError),

    /// A nested condition was applied to an attribute that is not an object
    #[error("Attribute `{attribute}` is a {found}, nested conditions require an object")]
    NotAnObject {
        /// Attribute carrying the nested condition
        attribute: String,
        /// Kind of value actually found
        found: &'static str,
    },

    /// Invalid rule declaration
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// Invalid subject document
    #[error("Invalid subject: {0}")]
    InvalidSubject(String),

    /// The custom predicate reported a failure
    #[error("Predicate failed: {0}")]
    Predicate(String),

    // ===== Declaration limits =====
    /// Condition tree nests deeper than allowed
    #[error("Condition tree exceeds maximum depth of {max} (depth: {depth})")]
    ConditionTooDeep {
        /// Maximum allowed depth
        max: usize,
        /// Actual depth of the tree
        depth: usize,
    },

    /// Manifest exceeds maximum allowed rules
    #[error("Manifest exceeds maximum {max} rules (attempted: {attempted})")]
    TooManyRules {
        /// Maximum allowed rules
        max: usize,
        /// Attempted number of rules
        attempted: usize,
    },

    /// Manifest name exceeds maximum length
    #[error("Manifest name exceeds maximum {max} characters (length: {length})")]
    NameTooLong {
        /// Maximum allowed length
        max: usize,
        /// Actual name length
        length: usize,
    },

    // ===== Configuration =====
    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl RuleError {
    /// Convenience constructor for predicate failures
    pub fn predicate(reason: impl Into<String>) -> Self {
        Self::Predicate(reason.into())
    }
}
