//! Fuzz target for RuleManifest::from_toml
//!
//! Manifest deserialization must handle arbitrary TOML input without
//! panicking, and every accepted manifest must respect the size limits.

#![no_main]

use core_rule::{RuleManifest, MAX_CONDITION_DEPTH, MAX_MANIFEST_NAME_LENGTH, MAX_RULES_PER_MANIFEST};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(manifest) = RuleManifest::from_toml(data) else {
        return;
    };

    assert!(manifest.name().len() <= MAX_MANIFEST_NAME_LENGTH);
    assert!(manifest.definitions().len() <= MAX_RULES_PER_MANIFEST);

    for definition in manifest.definitions() {
        assert!(!definition.actions().is_empty());
        assert!(!definition.subjects().is_empty());
        assert!(core_rule::condition::conditions_depth(definition.conditions()) <= MAX_CONDITION_DEPTH);
        let _ = definition.association_joins();
    }

    // Finalizing must terminate even with cyclic aliases
    let _ = manifest.matchers();
    let _ = manifest.to_toml();
});
