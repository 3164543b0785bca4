//! Subjects: the things rules grant or forbid actions on
//!
//! A rule names the subject *types* it applies to ([`SubjectSpec`]). At query
//! time the caller passes either a concrete instance or a bare type
//! ([`SubjectRef`]). Instances expose their attributes through the
//! [`Subject`] capability trait, which is all condition evaluation needs.
//!
//! [`Record`] is a map-backed `Subject` for callers that do not have a
//! domain type at hand (tests, tooling, subject documents loaded from TOML).

use crate::error::{AttributeError, Result, RuleError};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Name of the wildcard subject in manifests and string conversions
pub const ALL: &str = "all";

/// Type name used for nested subject tables that do not declare one
pub const DEFAULT_OBJECT_TYPE: &str = "Object";

/// Name of a subject type
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(String);

impl TypeTag {
    /// Create a type tag
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the type name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeTag {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Capability a subject instance must provide to be checked against rules
///
/// Attribute access is treated as an arbitrary external call: it may fail,
/// and failures are propagated to whoever asked for the verdict.
pub trait Subject {
    /// The instance's own type
    fn type_tag(&self) -> TypeTag;

    /// Whether this instance is of type `tag` or one of its subtypes
    ///
    /// Defaults to exact type equality. Override to expose a hierarchy.
    fn is_kind_of(&self, tag: &TypeTag) -> bool {
        self.type_tag() == *tag
    }

    /// Look up an attribute by name
    ///
    /// # Errors
    ///
    /// Returns `AttributeError` if the attribute does not exist or cannot be read
    fn attribute(&self, name: &str) -> core::result::Result<Value, AttributeError>;
}

/// Subject argument of a relevance or condition query
#[derive(Clone, Copy)]
pub enum SubjectRef<'a> {
    /// A concrete instance with attributes
    Instance(&'a dyn Subject),
    /// A bare type (class-level check, no attributes to test)
    Type(&'a TypeTag),
}

impl<'a> SubjectRef<'a> {
    /// Type of the subject: the instance's type, or the bare type itself
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Instance(subject) => subject.type_tag(),
            Self::Type(tag) => (*tag).clone(),
        }
    }

    /// The instance, if this is not a bare type
    #[must_use]
    pub fn instance(&self) -> Option<&'a dyn Subject> {
        match self {
            Self::Instance(subject) => Some(*subject),
            Self::Type(_) => None,
        }
    }

    /// Whether this is a bare type
    #[must_use]
    pub const fn is_type(&self) -> bool {
        matches!(self, Self::Type(_))
    }
}

impl<'a> From<&'a TypeTag> for SubjectRef<'a> {
    fn from(tag: &'a TypeTag) -> Self {
        Self::Type(tag)
    }
}

impl<'a, S: Subject + 'a> From<&'a S> for SubjectRef<'a> {
    fn from(subject: &'a S) -> Self {
        Self::Instance(subject)
    }
}

impl fmt::Debug for SubjectRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(subject) => f
                .debug_tuple("Instance")
                .field(&subject.type_tag().as_str())
                .finish(),
            Self::Type(tag) => f.debug_tuple("Type").field(&tag.as_str()).finish(),
        }
    }
}

impl fmt::Display for SubjectRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(subject) => write!(f, "#<{}>", subject.type_tag()),
            Self::Type(tag) => write!(f, "{}", tag),
        }
    }
}

/// Subject declaration of a rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubjectSpec {
    /// Wildcard: every subject
    All,
    /// A subject type; instances of subtypes match too
    Type(TypeTag),
}

impl SubjectSpec {
    /// Create the wildcard subject
    #[must_use]
    pub const fn all() -> Self {
        Self::All
    }

    /// Create a type subject (`"all"` still yields the wildcard)
    #[must_use]
    pub fn of(name: impl Into<String>) -> Self {
        Self::from(name.into())
    }

    /// Whether this is the wildcard subject
    #[must_use]
    pub const fn is_wildcard(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Check if this declaration covers `subject`
    ///
    /// Bare types only match by exact tag; instances also match through
    /// [`Subject::is_kind_of`].
    #[must_use]
    pub fn matches(&self, subject: SubjectRef<'_>) -> bool {
        match (self, subject) {
            (Self::All, _) => true,
            (Self::Type(tag), SubjectRef::Type(other)) => tag == other,
            (Self::Type(tag), SubjectRef::Instance(instance)) => {
                instance.type_tag() == *tag || instance.is_kind_of(tag)
            }
        }
    }
}

impl fmt::Display for SubjectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Type(tag) => write!(f, "{}", tag),
        }
    }
}

impl From<String> for SubjectSpec {
    fn from(name: String) -> Self {
        if name == ALL {
            Self::All
        } else {
            Self::Type(TypeTag(name))
        }
    }
}

impl From<&str> for SubjectSpec {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<TypeTag> for SubjectSpec {
    fn from(tag: TypeTag) -> Self {
        Self::Type(tag)
    }
}

impl From<SubjectSpec> for String {
    fn from(spec: SubjectSpec) -> Self {
        match spec {
            SubjectSpec::All => ALL.to_string(),
            SubjectSpec::Type(tag) => tag.0,
        }
    }
}

/// Map-backed subject
///
/// # Example
///
/// ```
/// use core_rule::subject::{Record, Subject, TypeTag};
/// use core_rule::Value;
///
/// let author = Record::new("User").with_attribute("active", true);
/// let article = Record::new("Article")
///     .with_ancestor("Document")
///     .with_attribute("published", true)
///     .with_attribute("author", Value::object(author));
///
/// assert!(article.is_kind_of(&TypeTag::new("Document")));
/// assert_eq!(article.attribute("published").unwrap(), Value::Bool(true));
/// assert!(article.attribute("title").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Record {
    type_tag: TypeTag,
    ancestors: Vec<TypeTag>,
    attributes: BTreeMap<String, Value>,
}

impl Record {
    /// Create a record of the given type with no attributes
    #[must_use]
    pub fn new(type_tag: impl Into<TypeTag>) -> Self {
        Self {
            type_tag: type_tag.into(),
            ancestors: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Declare a supertype of this record's type
    #[must_use]
    pub fn with_ancestor(mut self, tag: impl Into<TypeTag>) -> Self {
        self.ancestors.push(tag.into());
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Supertypes, nearest first
    #[must_use]
    pub fn ancestors(&self) -> &[TypeTag] {
        &self.ancestors
    }

    /// All attributes
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Load a record from a TOML subject document
    ///
    /// ```toml
    /// type = "Article"
    /// ancestors = ["Document"]
    ///
    /// [attributes]
    /// published = true
    ///
    /// [attributes.author]
    /// type = "User"
    /// attributes = { active = true }
    ///
    /// [[attributes.comments]]
    /// type = "Comment"
    /// attributes = { approved = false }
    /// ```
    ///
    /// Tables inside `attributes` become objects with the same layout
    /// (`type` defaults to `Object`), arrays become lists.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or the layout is wrong
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(toml_str)?;
        record_from_table(&table, true)
    }
}

impl Subject for Record {
    fn type_tag(&self) -> TypeTag {
        self.type_tag.clone()
    }

    fn is_kind_of(&self, tag: &TypeTag) -> bool {
        self.type_tag == *tag || self.ancestors.contains(tag)
    }

    fn attribute(&self, name: &str) -> core::result::Result<Value, AttributeError> {
        self.attributes
            .get(name)
            .cloned()
            .ok_or_else(|| AttributeError::Missing {
                subject_type: self.type_tag.to_string(),
                attribute: name.to_string(),
            })
    }
}

fn record_from_table(table: &toml::Table, top_level: bool) -> Result<Record> {
    for key in table.keys() {
        if !matches!(key.as_str(), "type" | "ancestors" | "attributes") {
            return Err(RuleError::InvalidSubject(format!(
                "Unexpected key `{}` (attributes belong in an `attributes` table)",
                key
            )));
        }
    }

    let type_tag = match table.get("type") {
        Some(toml::Value::String(name)) => TypeTag::new(name.as_str()),
        Some(other) => {
            return Err(RuleError::InvalidSubject(format!(
                "`type` must be a string, found {}",
                other.type_str()
            )))
        }
        None if top_level => {
            return Err(RuleError::InvalidSubject("`type` is required".into()));
        }
        None => TypeTag::new(DEFAULT_OBJECT_TYPE),
    };

    let mut record = Record::new(type_tag);

    match table.get("ancestors") {
        Some(toml::Value::Array(items)) => {
            for item in items {
                let toml::Value::String(name) = item else {
                    return Err(RuleError::InvalidSubject(
                        "`ancestors` must be a list of strings".into(),
                    ));
                };
                record = record.with_ancestor(name.as_str());
            }
        }
        Some(_) => {
            return Err(RuleError::InvalidSubject(
                "`ancestors` must be a list of strings".into(),
            ))
        }
        None => {}
    }

    match table.get("attributes") {
        Some(toml::Value::Table(attributes)) => {
            for (name, value) in attributes {
                record = record.with_attribute(name.as_str(), value_from_toml(value)?);
            }
        }
        Some(_) => {
            return Err(RuleError::InvalidSubject(
                "`attributes` must be a table".into(),
            ))
        }
        None => {}
    }

    Ok(record)
}

fn value_from_toml(value: &toml::Value) -> Result<Value> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::Integer(*i),
        toml::Value::Float(x) => Value::Float(*x),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::List(
            items
                .iter()
                .map(value_from_toml)
                .collect::<Result<Vec<_>>>()?,
        ),
        toml::Value::Table(table) => Value::object(record_from_table(table, false)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_spec_strings() {
        assert_eq!(SubjectSpec::from("all"), SubjectSpec::All);
        assert_eq!(SubjectSpec::of("Article"), SubjectSpec::Type("Article".into()));
        assert_eq!(String::from(SubjectSpec::All), "all");
        assert_eq!(SubjectSpec::of("Article").to_string(), "Article");
    }

    #[test]
    fn test_wildcard_matches_types_and_instances() {
        let article = Record::new("Article");
        let tag = TypeTag::new("Comment");

        assert!(SubjectSpec::All.matches(SubjectRef::from(&article)));
        assert!(SubjectSpec::All.matches(SubjectRef::from(&tag)));
    }

    #[test]
    fn test_instance_matches_own_type_and_ancestors() {
        let dog = Record::new("Dog").with_ancestor("Animal");

        assert!(SubjectSpec::of("Dog").matches(SubjectRef::from(&dog)));
        assert!(SubjectSpec::of("Animal").matches(SubjectRef::from(&dog)));
        assert!(!SubjectSpec::of("Cat").matches(SubjectRef::from(&dog)));
    }

    #[test]
    fn test_bare_type_matches_exact_tag_only() {
        let dog = TypeTag::new("Dog");

        assert!(SubjectSpec::of("Dog").matches(SubjectRef::Type(&dog)));
        assert!(!SubjectSpec::of("Animal").matches(SubjectRef::Type(&dog)));
    }

    #[test]
    fn test_missing_attribute_is_an_error() {
        let record = Record::new("Article");
        let err = record.attribute("title").unwrap_err();

        assert!(matches!(
            err,
            AttributeError::Missing { ref subject_type, ref attribute }
                if subject_type == "Article" && attribute == "title"
        ));
    }

    #[test]
    fn test_subject_ref_accessors() {
        let record = Record::new("Article");
        let tag = TypeTag::new("Article");

        let instance = SubjectRef::from(&record);
        assert!(!instance.is_type());
        assert!(instance.instance().is_some());
        assert_eq!(instance.type_tag(), tag);

        let bare = SubjectRef::from(&tag);
        assert!(bare.is_type());
        assert!(bare.instance().is_none());
        assert_eq!(bare.to_string(), "Article");
    }

    #[test]
    fn test_record_from_toml() {
        let record = Record::from_toml(
            r#"
type = "Article"
ancestors = ["Document"]

[attributes]
published = true
priority = 2
tags = ["rust", "authz"]

[attributes.author]
type = "User"
attributes = { active = true }

[[attributes.comments]]
type = "Comment"
attributes = { approved = false }

[[attributes.comments]]
attributes = { approved = true }
"#,
        )
        .unwrap();

        assert_eq!(record.type_tag(), TypeTag::new("Article"));
        assert!(record.is_kind_of(&TypeTag::new("Document")));
        assert_eq!(record.attribute("priority").unwrap(), Value::Integer(2));
        assert_eq!(
            record.attribute("tags").unwrap(),
            Value::list(["rust", "authz"])
        );

        let author = record.attribute("author").unwrap();
        let author = author.as_object().unwrap();
        assert_eq!(author.type_tag(), TypeTag::new("User"));
        assert_eq!(author.attribute("active").unwrap(), Value::Bool(true));

        let comments = record.attribute("comments").unwrap();
        let comments = comments.as_list().unwrap();
        assert_eq!(comments.len(), 2);
        let second = comments[1].as_object().unwrap();
        assert_eq!(second.type_tag(), TypeTag::new(DEFAULT_OBJECT_TYPE));
    }

    #[test]
    fn test_record_from_toml_requires_type() {
        let result = Record::from_toml("[attributes]\npublished = true\n");
        assert!(matches!(result, Err(RuleError::InvalidSubject(_))));
    }

    #[test]
    fn test_record_from_toml_rejects_loose_attributes() {
        let result = Record::from_toml("type = \"Article\"\npublished = true\n");
        assert!(matches!(result, Err(RuleError::InvalidSubject(_))));
    }
}
