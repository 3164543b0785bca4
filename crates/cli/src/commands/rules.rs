use colored::*;
use core_rule::{
    ActionTag, JoinSpec, Polarity, Record, RuleEntry, RuleManifest, RuleMatcher, Subject,
    SubjectRef, SubjectSpec,
};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use tracing::debug;

fn load_manifest(file_path: &str) -> anyhow::Result<RuleManifest> {
    let content =
        fs::read_to_string(file_path).map_err(|e| anyhow::anyhow!("Failed to read file: {}", e))?;

    let manifest = RuleManifest::from_toml(&content).map_err(|e| anyhow::anyhow!("{}", e))?;
    debug!(
        file = file_path,
        name = manifest.name(),
        rules = manifest.definitions().len(),
        "Manifest loaded"
    );

    Ok(manifest)
}

fn describe(matcher: &RuleMatcher) -> String {
    let polarity = if matcher.polarity() { "can" } else { "cannot" };
    let actions: Vec<&str> = matcher
        .definition()
        .actions()
        .iter()
        .map(ActionTag::as_str)
        .collect();
    let subjects: Vec<String> = matcher
        .definition()
        .subjects()
        .iter()
        .map(SubjectSpec::to_string)
        .collect();

    format!(
        "{} [{}] on [{}]",
        polarity,
        actions.join(", "),
        subjects.join(", ")
    )
}

pub fn check(file_path: &str) -> anyhow::Result<()> {
    println!("{} {}", "Checking manifest:".bold(), file_path);

    let manifest = load_manifest(file_path)?;

    println!("  {} Manifest name: {}", "✓".green(), manifest.name());
    println!("  {} Aliases: {}", "✓".green(), manifest.aliases().count());
    println!("  {} Rules: {}", "✓".green(), manifest.definitions().len());

    let mut warnings = 0;

    // Check for duplicate rules
    let mut seen_rules = HashSet::new();
    for (i, definition) in manifest.definitions().iter().enumerate() {
        let entry = RuleEntry::from(definition);
        let rule_key = format!(
            "{:?}:{:?}:{:?}:{:?}",
            entry.polarity, entry.actions, entry.subjects, entry.conditions
        );
        if !seen_rules.insert(rule_key) {
            println!("  {} Rule {} is a duplicate", "⚠".yellow(), i + 1);
            warnings += 1;
        }
    }

    // Aliases that nothing refers to expand nothing
    for (alias, _) in manifest.aliases().iter() {
        let used = manifest
            .definitions()
            .iter()
            .any(|definition| definition.actions().contains(alias));
        if !used {
            println!("  {} Alias `{}` is not used by any rule", "⚠".yellow(), alias);
            warnings += 1;
        }
    }

    println!();
    if warnings == 0 {
        println!("{} Manifest is valid!", "✓".green().bold());
    } else {
        println!(
            "{} Manifest is valid with {} warning(s)",
            "⚠".yellow().bold(),
            warnings
        );
    }

    Ok(())
}

pub fn explain(
    file_path: &str,
    action: &str,
    subject_path: &str,
    type_only: bool,
) -> anyhow::Result<()> {
    let manifest = load_manifest(file_path)?;

    let subject_content = fs::read_to_string(subject_path)
        .map_err(|e| anyhow::anyhow!("Failed to read subject file: {}", e))?;
    let record = Record::from_toml(&subject_content).map_err(|e| anyhow::anyhow!("{}", e))?;
    debug!(
        file = subject_path,
        subject = %record.type_tag(),
        ancestors = record.ancestors().len(),
        attributes = record.attributes().len(),
        "Subject loaded"
    );

    let action = ActionTag::named(action);
    let type_tag = record.type_tag();
    let subject = if type_only {
        SubjectRef::Type(&type_tag)
    } else {
        SubjectRef::from(&record)
    };

    println!(
        "{} {} {} {}",
        "Explaining".bold(),
        action,
        "on".bold(),
        subject
    );

    for (i, matcher) in manifest.matchers().iter().enumerate() {
        let label = format!("Rule {}: {}", i + 1, describe(matcher));

        if !matcher.is_relevant(&action, subject) {
            println!("  {} {} (not relevant)", "-".dimmed(), label.dimmed());
            continue;
        }

        match matcher.matches(&action, subject, &[]) {
            Ok(true) => {
                let verdict = if matcher.polarity() {
                    "grants".green()
                } else {
                    "forbids".red()
                };
                println!("  {} {} {}", "✓".green(), label, verdict);
            }
            Ok(false) => {
                println!("  {} {} (conditions not met)", "✗".yellow(), label);
            }
            Err(e) => {
                println!("  {} {} {}", "⚠".red(), label, e.to_string().red());
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct RuleJoins {
    rule: usize,
    polarity: Polarity,
    joins: Option<Vec<JoinSpec>>,
}

pub fn joins(file_path: &str) -> anyhow::Result<()> {
    let manifest = load_manifest(file_path)?;

    let report: Vec<RuleJoins> = manifest
        .definitions()
        .iter()
        .enumerate()
        .map(|(i, definition)| RuleJoins {
            rule: i + 1,
            polarity: definition.polarity().into(),
            joins: definition.association_joins(),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
