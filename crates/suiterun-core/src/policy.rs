//! Tag-based skip policy

use std::collections::BTreeSet;

use crate::catalog::TestDefinition;

/// Operator-supplied tag filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Tests carrying any of these tags are skipped (unless they are bad,
    /// in which case only the bad-tag rule applies)
    pub skip_tags: BTreeSet<String>,

    /// Bad tags the operator explicitly opted into running
    pub include_bad_tags: BTreeSet<String>,
}

impl SelectionPolicy {
    /// Create an empty policy that skips nothing but bad tests
    pub fn new() -> Self {
        Self::default()
    }

    /// Add tags to skip
    pub fn with_skip_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Add bad tags to force-include
    pub fn with_include_bad_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_bad_tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// Decide whether `test` is skipped under `policy` given the catalog's
/// `bad_tags`.
///
/// A bad test (any tag in `bad_tags`) is skipped unless one of its tags is in
/// `include_bad_tags`. A test that is not bad is skipped if any of its tags
/// is in `skip_tags`; skip tags have no override.
pub fn should_skip(
    test: &TestDefinition,
    policy: &SelectionPolicy,
    bad_tags: &BTreeSet<String>,
) -> bool {
    let is_bad = test.tags.iter().any(|tag| bad_tags.contains(tag));
    if is_bad {
        return !test
            .tags
            .iter()
            .any(|tag| policy.include_bad_tags.contains(tag));
    }

    test.tags.iter().any(|tag| policy.skip_tags.contains(tag))
}
