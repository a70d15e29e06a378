//! Test execution engine
//!
//! Runs the selected tests one at a time in identifier order. For every
//! test, in order:
//!
//! - an empty command is an execution error (the run continues);
//! - a test excluded by tag policy is skipped;
//! - otherwise the command is spawned and awaited. Exit 0 passes, exit 127
//!   or a launch failure is an execution error, any other exit fails.
//!
//! With bail-on-failure, the first *failed* test stops the run and every
//! remaining test is recorded as dropped. Execution errors never stop a run;
//! only the first one is kept on the report.

use anyhow::Context;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use suiterun_core::{Catalog, RunConfig, SelectionPolicy, TestDefinition, should_skip};
use tokio::fs::File;
use tokio::process::Command;

use crate::capture::{log_path_for, tee_output};
use crate::error::{ExecutionError, Result};
use crate::outcome::{RunOutcome, RunReport, TestStatus};

/// Exit status a shell uses for "command not found"
pub const NOT_FOUND_EXIT_CODE: i32 = 127;

const SIGINT: i32 = 2;

/// How long to wait for a pending shutdown after a child died of SIGINT
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Execution options, derived from a [`RunConfig`] and the catalog
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Skip/include tag filters
    pub policy: SelectionPolicy,

    /// Tags that exclude a test by default
    pub bad_tags: BTreeSet<String>,

    /// Directory for per-test log files
    pub log_dir: Option<PathBuf>,

    /// Stop at the first failure, dropping the remaining tests
    pub bail_on_failure: bool,

    /// Per-test wall-clock limit
    pub timeout: Option<Duration>,
}

impl RunOptions {
    /// Build options for a run over `catalog`
    pub fn from_config(config: &RunConfig, catalog: &Catalog) -> Self {
        Self {
            policy: config.policy.clone(),
            bad_tags: catalog.bad_tags.clone(),
            log_dir: config.log_dir.clone(),
            bail_on_failure: config.bail_on_failure,
            timeout: config.timeout,
        }
    }
}

/// How a spawned command ended
#[derive(Debug)]
enum Execution {
    Exited(ExitStatus),
    TimedOut(Duration),
    Failed(io::Error),
}

/// Sequential test runner
pub struct Engine {
    options: RunOptions,
}

impl Engine {
    /// Create a new engine with the given options
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Run every test in `tests` to completion.
    pub async fn run(&self, tests: &BTreeMap<String, TestDefinition>) -> Result<RunReport> {
        self.run_until(tests, std::future::pending()).await
    }

    /// Run `tests`, stopping early if `shutdown` resolves.
    ///
    /// On shutdown the running child is killed, its outcome is an
    /// `interrupted` error, and every later test is dropped.
    ///
    /// The returned error is reserved for setup failures (log directory or
    /// log file creation); test-level problems are reported in the
    /// [`RunReport`].
    pub async fn run_until<F>(
        &self,
        tests: &BTreeMap<String, TestDefinition>,
        shutdown: F,
    ) -> Result<RunReport>
    where
        F: Future<Output = ()>,
    {
        if let Some(log_dir) = &self.options.log_dir {
            tokio::fs::create_dir_all(log_dir)
                .await
                .with_context(|| format!("creating log directory {}", log_dir.display()))?;
        }

        tokio::pin!(shutdown);
        let test_ids: Vec<&String> = tests.keys().collect();
        let mut report = RunReport::default();

        for (index, (test_id, test)) in tests.iter().enumerate() {
            let start = Utc::now();

            if test.command.is_empty() {
                let outcome = RunOutcome::instant(test_id.as_str(), TestStatus::Error, start)
                    .with_error("empty command");
                record_error(&mut report, outcome);
                continue;
            }

            if should_skip(test, &self.options.policy, &self.options.bad_tags) {
                tracing::info!("Skipping {} (tags: {:?})", test_id, test.tags);
                report.outcomes.push(RunOutcome::new(
                    test_id.as_str(),
                    TestStatus::Skipped,
                    start,
                    Utc::now(),
                ));
                continue;
            }

            let log = self.open_log(test_id).await?;
            let log_path = log.as_ref().map(|(path, _)| path.clone());
            tracing::info!("Running {}: {:?}", test_id, test.command);

            let mut execution = tokio::select! {
                biased;
                _ = &mut shutdown => None,
                execution = self.execute(test, log.map(|(_, file)| file)) => Some(execution),
            };
            // Ctrl+C reaches the child too, which may exit before the
            // shutdown future is seen.
            let grace = match &execution {
                Some(Execution::Exited(status)) if stopped_by_sigint(status) => {
                    Some(SHUTDOWN_GRACE)
                }
                Some(Execution::Exited(_)) => Some(Duration::ZERO),
                _ => None,
            };
            if let Some(grace) = grace {
                if tokio::time::timeout(grace, &mut shutdown).await.is_ok() {
                    execution = None;
                }
            }
            let end = Utc::now();
            let outcome = RunOutcome::new(test_id.as_str(), TestStatus::Passed, start, end)
                .with_log_path(log_path);

            let Some(execution) = execution else {
                tracing::warn!("Interrupted while running {}", test_id);
                record_error(&mut report, errored(outcome, "interrupted"));
                drop_remaining(&mut report, &test_ids[index + 1..], end);
                return Ok(report);
            };

            match execution {
                Execution::Exited(status) if status.success() => {
                    tracing::info!("{}: passed in {} ms", test_id, outcome.duration_millis());
                    report.outcomes.push(outcome);
                }
                Execution::Exited(status) if status.code() == Some(NOT_FOUND_EXIT_CODE) => {
                    record_error(&mut report, errored(outcome, status.to_string()));
                }
                Execution::Exited(status) => {
                    tracing::info!("{}: failed ({})", test_id, status);
                    report.outcomes.push(RunOutcome {
                        status: TestStatus::Failed,
                        ..outcome
                    });
                    if self.options.bail_on_failure {
                        tracing::warn!(
                            "Bailing after failure of {}; dropping {} remaining tests",
                            test_id,
                            test_ids.len() - index - 1
                        );
                        drop_remaining(&mut report, &test_ids[index + 1..], end);
                        return Ok(report);
                    }
                }
                Execution::TimedOut(limit) => {
                    let message = format!("timed out after {}s", limit.as_secs_f64());
                    record_error(&mut report, errored(outcome, message));
                }
                Execution::Failed(err) => {
                    record_error(&mut report, errored(outcome, err.to_string()));
                }
            }
        }

        Ok(report)
    }

    /// Create the log file for `test_id`, if logging is configured.
    async fn open_log(&self, test_id: &str) -> Result<Option<(PathBuf, File)>> {
        let Some(log_dir) = &self.options.log_dir else {
            return Ok(None);
        };

        let path = log_path_for(log_dir, test_id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating log directory for test {test_id}"))?;
        }
        let file = File::create(&path)
            .await
            .with_context(|| format!("creating log file for test {test_id}"))?;
        tracing::debug!("Logging {} to {}", test_id, path.display());
        Ok(Some((path, file)))
    }

    async fn execute(&self, test: &TestDefinition, log: Option<File>) -> Execution {
        match self.spawn_and_wait(test, log).await {
            Ok(execution) => execution,
            Err(err) => Execution::Failed(err),
        }
    }

    async fn spawn_and_wait(&self, test: &TestDefinition, log: Option<File>) -> io::Result<Execution> {
        let Some((program, args)) = test.command.split_first() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty command"));
        };

        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);
        if log.is_some() {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        let mut child = command.spawn().map_err(|err| {
            io::Error::new(err.kind(), format!("failed to start '{program}': {err}"))
        })?;
        let mut log = log;

        let wait = async {
            if let Some(log) = log.as_mut() {
                tee_output(child.stdout.take(), child.stderr.take(), log).await?;
            }
            child.wait().await
        };

        let Some(limit) = self.options.timeout else {
            return Ok(Execution::Exited(wait.await?));
        };

        let waited = tokio::time::timeout(limit, wait).await;
        match waited {
            Ok(status) => Ok(Execution::Exited(status?)),
            Err(_) => {
                if let Err(err) = child.kill().await {
                    tracing::warn!("Failed to kill timed out test: {}", err);
                }
                Ok(Execution::TimedOut(limit))
            }
        }
    }
}

/// Whether the child was stopped by SIGINT, directly or through a shell
/// reporting `128 + SIGINT`.
fn stopped_by_sigint(status: &ExitStatus) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if status.signal() == Some(SIGINT) {
            return true;
        }
    }
    status.code() == Some(128 + SIGINT)
}

fn errored(outcome: RunOutcome, message: impl Into<String>) -> RunOutcome {
    RunOutcome {
        status: TestStatus::Error,
        ..outcome
    }
    .with_error(message)
}

/// Append an error outcome, keeping the first execution error on the report.
fn record_error(report: &mut RunReport, outcome: RunOutcome) {
    let error = ExecutionError::new(
        outcome.test_id.as_str(),
        outcome.error.clone().unwrap_or_default(),
    );
    tracing::error!("{}", error);
    report.execution_error.get_or_insert(error);
    report.outcomes.push(outcome);
}

fn drop_remaining(report: &mut RunReport, remaining: &[&String], at: DateTime<Utc>) {
    report.outcomes.extend(
        remaining
            .iter()
            .map(|test_id| RunOutcome::instant(test_id.as_str(), TestStatus::Dropped, at)),
    );
}
