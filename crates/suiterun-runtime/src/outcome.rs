//! Per-test outcomes and the result of a whole run

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;

use crate::error::ExecutionError;

/// How a single test ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestStatus {
    /// Command exited with status 0
    Passed,
    /// Command exited non-zero (other than the not-found sentinel)
    Failed,
    /// Command could not be executed properly
    Error,
    /// Excluded by tag policy
    Skipped,
    /// Never attempted because the run bailed or was interrupted
    Dropped,
}

impl TestStatus {
    /// Short fixed-width label for summaries
    pub fn label(self) -> &'static str {
        match self {
            TestStatus::Passed => "PASS",
            TestStatus::Failed => "FAIL",
            TestStatus::Error => "ERR",
            TestStatus::Skipped => "SKIP",
            TestStatus::Dropped => "DROP",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one requested test. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Dotted test identifier
    pub test_id: String,

    /// Final status
    pub status: TestStatus,

    /// When the test was dispatched or decided against
    pub start_time: DateTime<Utc>,

    /// When the test finished
    pub end_time: DateTime<Utc>,

    /// Captured combined output, when a log directory was configured
    pub log_path: Option<PathBuf>,

    /// Execution error message (never set for plain failures)
    pub error: Option<String>,
}

impl RunOutcome {
    /// Create an outcome spanning `start_time..end_time`
    pub fn new(
        test_id: impl Into<String>,
        status: TestStatus,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            status,
            start_time,
            end_time,
            log_path: None,
            error: None,
        }
    }

    /// Create a zero-length outcome at `at`
    pub fn instant(test_id: impl Into<String>, status: TestStatus, at: DateTime<Utc>) -> Self {
        Self::new(test_id, status, at, at)
    }

    /// Attach the log file path
    pub fn with_log_path(mut self, log_path: Option<PathBuf>) -> Self {
        self.log_path = log_path;
        self
    }

    /// Attach an execution error message
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Wall-clock duration in whole milliseconds (never negative)
    pub fn duration_millis(&self) -> u64 {
        let millis = (self.end_time - self.start_time).num_milliseconds();
        u64::try_from(millis).unwrap_or(0)
    }
}

/// Number of outcomes per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Passed tests
    pub passed: usize,
    /// Failed tests
    pub failed: usize,
    /// Errored tests
    pub errors: usize,
    /// Skipped tests
    pub skipped: usize,
    /// Dropped tests
    pub dropped: usize,
}

impl StatusCounts {
    /// Tally a sequence of outcomes
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a RunOutcome>) -> Self {
        let mut counts = Self::default();
        for outcome in outcomes {
            match outcome.status {
                TestStatus::Passed => counts.passed += 1,
                TestStatus::Failed => counts.failed += 1,
                TestStatus::Error => counts.errors += 1,
                TestStatus::Skipped => counts.skipped += 1,
                TestStatus::Dropped => counts.dropped += 1,
            }
        }
        counts
    }

    /// Total number of outcomes
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errors + self.skipped + self.dropped
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One outcome per requested test, in identifier order
    pub outcomes: Vec<RunOutcome>,

    /// First execution error encountered, if any
    pub execution_error: Option<ExecutionError>,
}

impl RunReport {
    /// Tally the outcomes
    pub fn counts(&self) -> StatusCounts {
        StatusCounts::from_outcomes(&self.outcomes)
    }

    /// Whether any test failed
    pub fn has_failures(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| o.status == TestStatus::Failed)
    }

    /// Whether any test actually ran to a pass/fail verdict
    pub fn any_ran(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o.status, TestStatus::Passed | TestStatus::Failed))
    }
}
