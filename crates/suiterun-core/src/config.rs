//! Run configuration
//!
//! One `RunConfig` is built per invocation (from command-line flags) and
//! passed by reference into selection and execution.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::policy::SelectionPolicy;

/// Everything a single run needs to know
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Path to the JSON test catalog
    pub test_config: PathBuf,

    /// Glob patterns selecting tests
    pub patterns: Vec<String>,

    /// Skip/include tag filters
    pub policy: SelectionPolicy,

    /// Directory for per-test log files
    pub log_dir: Option<PathBuf>,

    /// Where to write the JUnit XML report
    pub junit_xml: Option<PathBuf>,

    /// Stop at the first failed test and drop the rest
    pub bail_on_failure: bool,

    /// Per-test wall-clock limit
    pub timeout: Option<Duration>,
}

impl RunConfig {
    /// Create a config for the given catalog and patterns
    pub fn new(test_config: impl Into<PathBuf>, patterns: Vec<String>) -> Self {
        Self {
            test_config: test_config.into(),
            patterns,
            ..Default::default()
        }
    }

    /// Check invariants that flag parsing can't express
    pub fn validate(&self) -> Result<()> {
        if self.patterns.is_empty() {
            return Err(Error::ConfigInvalid {
                message: "at least one test identifier is required".to_string(),
            });
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::ConfigInvalid {
                message: "timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
