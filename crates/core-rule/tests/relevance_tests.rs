//! Integration tests for rule relevance (action and subject matching)

use core_rule::{
    ActionAliases, ActionTag, AttributeError, Conditions, NoExpansion, Record, RuleBuilder,
    RuleDefinition, RuleMatcher, Subject, SubjectRef, TypeTag, Value,
};

/// Subject with a fixed type hierarchy: Dog < Mammal < Animal
struct Dog;

impl Subject for Dog {
    fn type_tag(&self) -> TypeTag {
        TypeTag::new("Dog")
    }

    fn is_kind_of(&self, tag: &TypeTag) -> bool {
        matches!(tag.as_str(), "Dog" | "Mammal" | "Animal")
    }

    fn attribute(&self, name: &str) -> Result<Value, AttributeError> {
        Err(AttributeError::Missing {
            subject_type: "Dog".to_string(),
            attribute: name.to_string(),
        })
    }
}

fn read_articles() -> RuleMatcher {
    RuleBuilder::can()
        .action("read")
        .on("Article")
        .build()
        .unwrap()
        .finalize(&NoExpansion)
}

#[test]
fn test_exact_action_and_subject() {
    let rule = read_articles();
    let article = Record::new("Article");

    assert!(rule.is_relevant(&ActionTag::named("read"), SubjectRef::from(&article)));
    assert!(!rule.is_relevant(&ActionTag::named("update"), SubjectRef::from(&article)));
}

#[test]
fn test_subject_mismatch() {
    let rule = read_articles();
    let comment = Record::new("Comment");
    let comment_type = TypeTag::new("Comment");

    assert!(!rule.is_relevant(&ActionTag::named("read"), SubjectRef::from(&comment)));
    assert!(!rule.is_relevant(&ActionTag::named("read"), SubjectRef::Type(&comment_type)));
}

#[test]
fn test_type_level_exact_match() {
    let rule = read_articles();
    let article = TypeTag::new("Article");

    assert!(rule.is_relevant(&ActionTag::named("read"), SubjectRef::Type(&article)));
}

#[test]
fn test_instance_of_subtype_is_relevant() {
    let rule = RuleBuilder::can()
        .action("pet")
        .on("Animal")
        .build()
        .unwrap()
        .finalize(&NoExpansion);

    assert!(rule.is_relevant(&ActionTag::named("pet"), SubjectRef::from(&Dog)));
}

#[test]
fn test_record_ancestors_are_subtypes() {
    let rule = RuleBuilder::can()
        .action("read")
        .on("Document")
        .build()
        .unwrap()
        .finalize(&NoExpansion);
    let article = Record::new("Article").with_ancestor("Document");

    assert!(rule.is_relevant(&ActionTag::named("read"), SubjectRef::from(&article)));
}

#[test]
fn test_bare_subtype_does_not_match_supertype_rule() {
    let rule = RuleBuilder::can()
        .action("pet")
        .on("Animal")
        .build()
        .unwrap()
        .finalize(&NoExpansion);
    let dog_type = TypeTag::new("Dog");

    // Type-level checks never walk a hierarchy
    assert!(!rule.is_relevant(&ActionTag::named("pet"), SubjectRef::Type(&dog_type)));
}

#[test]
fn test_wildcard_subject() {
    let rule = RuleBuilder::can()
        .action("read")
        .on_all()
        .build()
        .unwrap()
        .finalize(&NoExpansion);
    let anything = TypeTag::new("Anything");

    assert!(rule.is_relevant(&ActionTag::named("read"), SubjectRef::from(&Dog)));
    assert!(rule.is_relevant(&ActionTag::named("read"), SubjectRef::Type(&anything)));
}

#[test]
fn test_wildcard_action() {
    let rule = RuleBuilder::can()
        .action("manage")
        .on("Article")
        .build()
        .unwrap()
        .finalize(&NoExpansion);
    let article = Record::new("Article");

    for action in ["read", "update", "destroy", "publish"] {
        assert!(rule.is_relevant(&ActionTag::named(action), SubjectRef::from(&article)));
    }
}

#[test]
fn test_aliases_expand_actions() {
    let aliases = ActionAliases::new()
        .alias("modify", ["update", "destroy"])
        .alias("update", ["patch"]);

    let rule = RuleBuilder::can()
        .action("modify")
        .on("Article")
        .build()
        .unwrap()
        .finalize(&aliases);
    let article = Record::new("Article");

    for action in ["modify", "update", "destroy", "patch"] {
        assert!(
            rule.is_relevant(&ActionTag::named(action), SubjectRef::from(&article)),
            "{} should be covered",
            action
        );
    }
    assert!(!rule.is_relevant(&ActionTag::named("read"), SubjectRef::from(&article)));
}

#[test]
fn test_expander_can_grant_wildcard() {
    // A registry may decide that some alias stands for every action
    let admin_is_manage = |actions: &std::collections::BTreeSet<ActionTag>| {
        let mut expanded = actions.clone();
        if actions.contains(&ActionTag::named("admin")) {
            expanded.insert(ActionTag::Manage);
        }
        expanded
    };

    let rule = RuleBuilder::can()
        .action("admin")
        .on("Article")
        .build()
        .unwrap()
        .finalize(&admin_is_manage);
    let article = Record::new("Article");

    assert!(rule.is_relevant(&ActionTag::named("anything"), SubjectRef::from(&article)));
}

#[test]
fn test_relevance_ignores_conditions() {
    let rule = RuleBuilder::can()
        .action("read")
        .on("Article")
        .condition("published", core_rule::ConditionNode::eq(true))
        .when(|_| false)
        .build()
        .unwrap()
        .finalize(&NoExpansion);

    // No attributes at all: relevance must not touch them
    let article = Record::new("Article");
    assert!(rule.is_relevant(&ActionTag::named("read"), SubjectRef::from(&article)));
}

#[test]
fn test_hand_built_manage_tag_covers_every_action() {
    let rule = RuleDefinition::new(
        true,
        [ActionTag::Named("manage".to_string())],
        ["Article"],
        Conditions::new(),
        None,
    )
    .unwrap()
    .finalize(&NoExpansion);
    let article = Record::new("Article");

    assert!(rule.is_relevant(&ActionTag::named("publish"), SubjectRef::from(&article)));
    assert!(rule.is_relevant(&ActionTag::manage(), SubjectRef::from(&article)));
}
