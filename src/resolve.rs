//! Rewrites raw parameter keys to canonical field names.

use std::collections::HashMap;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Capitalize the first character of a key, leaving the remainder as-is.
/// This produces the literal field name used for descriptor lookup.
pub(crate) fn canonicalize(key: &str) -> String {
    let mut chars = key.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::default(),
    }
}

/// Immutable after construction; shared by every parse call.
#[derive(Debug)]
pub(crate) struct Resolver {
    // Merged alias table; values are already canonicalized.
    aliases: HashMap<String, String>,
    // Canonical field names in declaration order.
    field_names: Vec<String>,
}

impl Resolver {
    pub(crate) fn new(aliases: HashMap<String, String>, field_names: Vec<String>) -> Self {
        Self {
            aliases,
            field_names,
        }
    }

    /// Resolve a stripped raw key to a canonical field name.
    ///
    /// The resolution order is exact:
    /// 1. Exact (case-sensitive) match against the merged alias table.
    /// 2. Case-insensitive first-character prefix match; only a unique
    ///    match resolves, ambiguity falls through.
    /// 3. Capitalize-first canonicalization of the key, accepted when it is
    ///    the literal name of a field.
    ///
    /// An unresolvable key yields `None`; the caller drops the parameter
    /// without error.
    pub(crate) fn resolve(&self, key: &str) -> Option<String> {
        if let Some(canonical) = self.aliases.get(key) {
            return Some(canonical.clone());
        }

        if let Some(initial) = key.chars().next() {
            let matched: Vec<&String> = self
                .field_names
                .iter()
                .filter(|name| {
                    name.chars()
                        .next()
                        .is_some_and(|first| first.eq_ignore_ascii_case(&initial))
                })
                .collect();

            match matched.as_slice() {
                [unique] => return Some((*unique).clone()),
                [] => {}
                _ => {
                    #[cfg(feature = "tracing_debug")]
                    debug!("First-letter prefix of '{key}' is ambiguous; continuing to exact lookup.");
                }
            }
        }

        let canonical = canonicalize(key);

        if self.field_names.iter().any(|name| name == &canonical) {
            return Some(canonical);
        }

        #[cfg(feature = "tracing_debug")]
        debug!("Dropping unresolvable key '{key}'.");
        None
    }
}
