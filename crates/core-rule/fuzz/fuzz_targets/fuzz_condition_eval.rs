//! Fuzz target for condition evaluation
//!
//! Input is a manifest and a subject document separated by a `---` line.
//! Evaluating any accepted rule against any accepted subject may fail with
//! an error but must never panic.

#![no_main]

use core_rule::{ActionTag, Record, RuleManifest, Subject, SubjectRef};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Some((manifest, subject)) = data.split_once("\n---\n") else {
        return;
    };
    let (Ok(manifest), Ok(record)) = (RuleManifest::from_toml(manifest), Record::from_toml(subject))
    else {
        return;
    };

    let type_tag = record.type_tag();
    for matcher in manifest.matchers() {
        for action in matcher.expanded_actions().clone() {
            for subject in [SubjectRef::from(&record), SubjectRef::Type(&type_tag)] {
                if matcher.is_relevant(&action, subject) {
                    let _ = matcher.matches(&action, subject, &[]);
                }
            }
        }
        let _ = matcher.matches(&ActionTag::Manage, SubjectRef::from(&record), &[]);
    }
});
