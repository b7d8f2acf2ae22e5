//! Shortname aliases for inner-scope symbols.
//!
//! `module:mw/Api~Api` can be referenced as plain `Api` as long as no other
//! registered long name has the same inner-scope suffix.

use std::collections::HashMap;

use crate::registry::Registry;

/// Outcome of [`add_shortname_aliases`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AliasReport {
    /// Aliases that were registered, in registration order.
    pub added: Vec<String>,
    /// Shortnames shared by more than one long name.
    pub ambiguous: Vec<String>,
}

/// Inner-scope suffix of a long name: everything after the first `~`.
///
/// Returns `None` when the long name has no `~` or nothing follows it.
#[must_use]
pub fn shortname(longname: &str) -> Option<&str> {
    longname
        .split_once('~')
        .map(|(_, short)| short)
        .filter(|short| !short.is_empty())
}

/// Register an alias for every unambiguous shortname in the registry.
///
/// Ambiguous shortnames are reported with a warning and never registered.
/// Aliases never replace an existing mapping.
pub fn add_shortname_aliases(registry: &mut Registry) -> AliasReport {
    let entries: Vec<(String, String)> = registry
        .entries()
        .map(|(name, url)| (name.to_owned(), url.to_owned()))
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (longname, _) in &entries {
        if let Some(short) = shortname(longname) {
            *counts.entry(short).or_default() += 1;
        }
    }

    let mut report = AliasReport::default();
    for (longname, url) in &entries {
        let Some(short) = shortname(longname) else {
            continue;
        };
        let count = counts.get(short).copied().unwrap_or_default();
        if count == 1 {
            if registry.register_alias(short, url) {
                report.added.push(short.to_owned());
            }
        } else if !report.ambiguous.iter().any(|seen| seen == short) {
            tracing::warn!(shortname = %short, candidates = count, "Ambiguous shortname");
            report.ambiguous.push(short.to_owned());
        }
    }

    report
}
