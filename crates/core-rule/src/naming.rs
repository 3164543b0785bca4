//! Naming hook for exposing conditions to query generation
//!
//! Query layers usually address associations by table name rather than by
//! attribute name (`author` -> `users`). How names map is a convention of the
//! host application, so it is injected as a [`NamingStrategy`]. Matching never
//! goes through this hook.

use crate::condition::Conditions;

/// Maps an association attribute name to the name a query layer expects
pub trait NamingStrategy {
    /// Table name for an association attribute
    fn table_name(&self, attribute: &str) -> String;
}

impl<F> NamingStrategy for F
where
    F: Fn(&str) -> String,
{
    fn table_name(&self, attribute: &str) -> String {
        self(attribute)
    }
}

/// Keeps attribute names as they are
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl NamingStrategy for Verbatim {
    fn table_name(&self, attribute: &str) -> String {
        attribute.to_string()
    }
}

/// Rename the top-level nested keys of `conditions` through `naming`
///
/// Scalar and containment keys are left untouched, as are the keys inside
/// nested mappings.
#[must_use]
pub fn tableize(conditions: &Conditions, naming: &dyn NamingStrategy) -> Conditions {
    conditions
        .iter()
        .map(|(name, node)| {
            let key = if node.is_nested() {
                naming.table_name(name)
            } else {
                name.clone()
            };
            (key, node.clone())
        })
        .collect()
}
