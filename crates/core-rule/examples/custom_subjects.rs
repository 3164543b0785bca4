//! # Custom Subjects Example
//!
//! Demonstrates how to expose domain types to the rule engine by
//! implementing the `Subject` trait, including a type hierarchy and an
//! attribute that is computed on demand.
//!
//! ## Run
//!
//! ```bash
//! cargo run -p core-rule --example custom_subjects
//! ```

use core_rule::{
    ActionAliases, ActionTag, AttributeError, ConditionNode, RuleBuilder, Subject, SubjectRef,
    TypeTag, Value,
};
use std::sync::Arc;

// ============================================================================
// DOMAIN MODEL
// ============================================================================

struct User {
    name: String,
    banned: bool,
}

impl Subject for User {
    fn type_tag(&self) -> TypeTag {
        TypeTag::new("User")
    }

    fn attribute(&self, name: &str) -> Result<Value, AttributeError> {
        match name {
            "name" => Ok(Value::from(self.name.as_str())),
            "banned" => Ok(Value::from(self.banned)),
            _ => Err(AttributeError::Missing {
                subject_type: "User".to_string(),
                attribute: name.to_string(),
            }),
        }
    }
}

/// Blog posts are documents; rules on `Document` cover them too
struct BlogPost {
    author: Arc<User>,
    words: u32,
    reviewers: Vec<Arc<User>>,
}

impl Subject for BlogPost {
    fn type_tag(&self) -> TypeTag {
        TypeTag::new("BlogPost")
    }

    fn is_kind_of(&self, tag: &TypeTag) -> bool {
        matches!(tag.as_str(), "BlogPost" | "Document")
    }

    fn attribute(&self, name: &str) -> Result<Value, AttributeError> {
        match name {
            "author" => Ok(Value::Object(self.author.clone())),
            "reviewers" => Ok(Value::list(
                self.reviewers
                    .iter()
                    .map(|reviewer| Value::Object(reviewer.clone())),
            )),
            // Computed attribute
            "reading_minutes" => Ok(Value::from(self.words / 200)),
            _ => Err(AttributeError::Missing {
                subject_type: "BlogPost".to_string(),
                attribute: name.to_string(),
            }),
        }
    }
}

fn user(name: &str, banned: bool) -> Arc<User> {
    Arc::new(User {
        name: name.to_string(),
        banned,
    })
}

// ============================================================================
// MAIN
// ============================================================================

fn main() -> Result<(), core_rule::RuleError> {
    let aliases = ActionAliases::new().alias("review", ["comment", "approve"]);

    // Short documents written by users in good standing, reviewed by alice
    let rule = RuleBuilder::can()
        .action("review")
        .on("Document")
        .condition(
            "author",
            ConditionNode::nested([("banned", ConditionNode::eq(false))]),
        )
        .condition("reading_minutes", ConditionNode::range(0, 10))
        .condition(
            "reviewers",
            ConditionNode::nested([("name", ConditionNode::eq("alice"))]),
        )
        .build()?
        .finalize(&aliases);

    let posts = [
        (
            "short post by bob",
            BlogPost {
                author: user("bob", false),
                words: 800,
                reviewers: vec![user("carol", false), user("alice", false)],
            },
        ),
        (
            "post by a banned author",
            BlogPost {
                author: user("mallory", true),
                words: 800,
                reviewers: vec![user("alice", false)],
            },
        ),
        (
            "very long post",
            BlogPost {
                author: user("bob", false),
                words: 12_000,
                reviewers: vec![user("alice", false)],
            },
        ),
    ];

    let approve = ActionTag::named("approve");

    println!("=== Custom Subjects ===\n");
    for (label, post) in &posts {
        let subject = SubjectRef::from(post);
        let relevant = rule.is_relevant(&approve, subject);
        let verdict = relevant && rule.matches(&approve, subject, &[])?;
        println!("{:<28} relevant={:<5} granted={}", label, relevant, verdict);
    }

    println!("\nJoins needed: {:?}", rule.association_joins());

    Ok(())
}
