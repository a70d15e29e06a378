//! Test catalog loading and flattening
//!
//! A catalog is a JSON object tree. Any object with `"__is_test": true` is a
//! leaf test whose identifier is the dot-joined path of keys leading to it.
//! `"tags"` on a group is inherited by every test beneath it, and the
//! top-level `"bad_tags"` list declares tags that exclude a test by default.
//!
//! ```json
//! {
//!   "bad_tags": ["flaky"],
//!   "kvm": {
//!     "tags": ["slow"],
//!     "guest_memfd": { "__is_test": true, "command": ["./guest_memfd_test"] }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::{Error, Result};

/// Marker key identifying a leaf test node
pub const IS_TEST_KEY: &str = "__is_test";

/// Key holding a test's argv
pub const COMMAND_KEY: &str = "command";

/// Key holding tags on either a group or a test
pub const TAGS_KEY: &str = "tags";

/// Top-level key holding the globally bad tags
pub const BAD_TAGS_KEY: &str = "bad_tags";

/// A single runnable test: an argv plus its (inherited and own) tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDefinition {
    /// Command argument vector; the first element is the program
    #[serde(default)]
    pub command: Vec<String>,

    /// Tags attached to the test, including those inherited from groups
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl TestDefinition {
    /// Create a test definition from an argv
    pub fn new<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            tags: BTreeSet::new(),
        }
    }

    /// Add tags to the definition
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Whether the test carries the given tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Flat view of a test catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Tests keyed by dotted identifier
    pub tests: BTreeMap<String, TestDefinition>,

    /// Tags that exclude a test unless explicitly included
    pub bad_tags: BTreeSet<String>,
}

impl Catalog {
    /// Load and flatten a catalog file
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let catalog = Catalog::load("tests.json")?;
    /// for id in catalog.ids() {
    ///     println!("{id}");
    /// }
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::CatalogNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&contents)?;
        tracing::info!(
            "Loaded {} tests from {}",
            catalog.tests.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse a catalog from JSON text
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(contents)?;
        Self::from_value(&value)
    }

    /// Build a catalog from an already-parsed JSON tree
    pub fn from_value(value: &Value) -> Result<Self> {
        let root = value.as_object().ok_or_else(|| Error::CatalogInvalid {
            path: String::new(),
            message: "top level must be an object".to_string(),
        })?;

        let bad_tags = match root.get(BAD_TAGS_KEY) {
            Some(v) => string_list("", BAD_TAGS_KEY, v)?.into_iter().collect(),
            None => BTreeSet::new(),
        };
        let tests = flatten("", value, &BTreeSet::new())?;

        tracing::debug!(
            "Flattened catalog: {} tests, {} bad tags",
            tests.len(),
            bad_tags.len()
        );
        Ok(Self { tests, bad_tags })
    }

    /// Known test identifiers in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tests.keys().map(String::as_str)
    }

    /// Look up a test by identifier
    pub fn get(&self, id: &str) -> Option<&TestDefinition> {
        self.tests.get(id)
    }

    /// Number of tests in the catalog
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Whether the catalog has no tests
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

/// Flatten the subtree at `prefix` into a map of dotted id to definition.
///
/// `inherited` holds the tags collected from enclosing groups. The root
/// (empty prefix) is never itself a test, and its `bad_tags` entry is not
/// part of the tree.
pub fn flatten(
    prefix: &str,
    node: &Value,
    inherited: &BTreeSet<String>,
) -> Result<BTreeMap<String, TestDefinition>> {
    let Some(map) = node.as_object() else {
        return Ok(BTreeMap::new());
    };

    if !prefix.is_empty() && is_test_node(prefix, map)? {
        let mut definition = parse_leaf(prefix, map)?;
        definition.tags.extend(inherited.iter().cloned());
        return Ok(BTreeMap::from([(prefix.to_string(), definition)]));
    }

    let mut tags = inherited.clone();
    if let Some(value) = map.get(TAGS_KEY) {
        tags.extend(string_list(prefix, TAGS_KEY, value)?);
    }

    let mut tests = BTreeMap::new();
    for (key, child) in map {
        if prefix.is_empty() && key == BAD_TAGS_KEY {
            continue;
        }
        let child_prefix = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        tests.extend(flatten(&child_prefix, child, &tags)?);
    }
    Ok(tests)
}

fn is_test_node(path: &str, map: &Map<String, Value>) -> Result<bool> {
    match map.get(IS_TEST_KEY) {
        None => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(Error::CatalogInvalid {
            path: path.to_string(),
            message: format!("'{IS_TEST_KEY}' must be a boolean"),
        }),
    }
}

fn parse_leaf(path: &str, map: &Map<String, Value>) -> Result<TestDefinition> {
    let command = match map.get(COMMAND_KEY) {
        Some(v) => string_list(path, COMMAND_KEY, v)?,
        None => Vec::new(),
    };
    let tags = match map.get(TAGS_KEY) {
        Some(v) => string_list(path, TAGS_KEY, v)?,
        None => Vec::new(),
    };
    Ok(TestDefinition::new(command).with_tags(tags))
}

fn string_list(path: &str, key: &str, value: &Value) -> Result<Vec<String>> {
    let invalid = || Error::CatalogInvalid {
        path: path.to_string(),
        message: format!("'{key}' must be a list of strings"),
    };

    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}
