//! Conversion of kselftest lists into test catalogs
//!
//! `run_kselftest.sh --list` prints one `suite:name` per line. Each entry
//! becomes a two-level catalog leaf that runs that single kselftest.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Program invoked for every converted kselftest
pub const KSELFTEST_RUNNER: &str = "run_kselftest.sh";

/// Catalog leaf produced for one kselftest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KselftestEntry {
    /// Always `true`; marks the node as a leaf test
    #[serde(rename = "__is_test")]
    pub is_test: bool,

    /// Command running just this kselftest
    pub command: Vec<String>,
}

impl KselftestEntry {
    fn new(entry: &str) -> Self {
        Self {
            is_test: true,
            command: vec![
                KSELFTEST_RUNNER.to_string(),
                "--error-on-fail".to_string(),
                "-t".to_string(),
                entry.to_string(),
            ],
        }
    }
}

/// Suites keyed by name, each holding its tests keyed by name
pub type KselftestCatalog = BTreeMap<String, BTreeMap<String, KselftestEntry>>;

/// Parse a kselftest list. Empty lines are ignored.
pub fn parse_list(contents: &str) -> Result<KselftestCatalog> {
    let mut suites = KselftestCatalog::new();

    for (index, line) in contents.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let (suite, name) = line.split_once(':').ok_or_else(|| Error::KselftestLine {
            line_number: index + 1,
            line: line.to_string(),
        })?;

        let tests = suites.entry(suite.to_string()).or_default();
        if tests.contains_key(name) {
            return Err(Error::KselftestDuplicate {
                suite: suite.to_string(),
                name: name.to_string(),
            });
        }
        tests.insert(name.to_string(), KselftestEntry::new(line));
    }

    Ok(suites)
}

/// Parse a kselftest list and render it as pretty-printed catalog JSON.
pub fn list_to_catalog_json(contents: &str) -> Result<String> {
    let suites = parse_list(contents)?;
    Ok(serde_json::to_string_pretty(&suites)?)
}
