//! Pattern-based test selection
//!
//! Every pattern is a shell-style glob (`*`, `?`, `[...]`) matched against
//! whole test identifiers. All patterns are compiled before any matching so
//! a syntax error is reported up front, and every pattern must match at
//! least one test.

use glob::Pattern;
use std::collections::BTreeMap;

use crate::catalog::{Catalog, TestDefinition};
use crate::error::{Error, Result};
use crate::suggest::suggest;

/// Resolve `patterns` against `catalog` into the union of matching tests.
pub fn select<S: AsRef<str>>(
    patterns: &[S],
    catalog: &Catalog,
) -> Result<BTreeMap<String, TestDefinition>> {
    let globs = patterns
        .iter()
        .map(|pattern| {
            let pattern = pattern.as_ref();
            Pattern::new(&collapse_stars(pattern))
                .map(|compiled| (pattern, compiled))
                .map_err(|source| Error::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut selected = BTreeMap::new();
    for (pattern, compiled) in &globs {
        let before = selected.len();
        let mut matched = false;
        for (id, test) in &catalog.tests {
            if compiled.matches(id) {
                matched = true;
                selected.insert(id.clone(), test.clone());
            }
        }

        if !matched {
            let suggestion = suggest(pattern, catalog.ids()).map(str::to_string);
            return Err(Error::NoMatch {
                pattern: pattern.to_string(),
                suggestion,
            });
        }
        tracing::debug!(
            "Pattern '{}' added {} tests",
            pattern,
            selected.len() - before
        );
    }

    tracing::info!("Selected {} tests", selected.len());
    Ok(selected)
}

/// Reduce every run of `*` to one. Ids have no path separators, so `**`
/// means the same as `*`, but `glob` only accepts it as a whole component.
fn collapse_stars(pattern: &str) -> String {
    let mut collapsed = String::with_capacity(pattern.len());
    let mut previous_star = false;
    for c in pattern.chars() {
        if c == '*' && previous_star {
            continue;
        }
        previous_star = c == '*';
        collapsed.push(c);
    }
    collapsed
}
