//! Select, run, and report tests

use anyhow::{Context, Result};
use std::process::ExitCode;
use suiterun_core::{Catalog, RunConfig};
use suiterun_runtime::{Engine, RunOptions, RunReport, junit};

use crate::summary;

/// Overall result of a run, in exit-code precedence order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// A test could not be executed properly
    ExecutionError(String),
    /// At least one test failed
    Failed,
    /// Nothing passed or failed (everything skipped, dropped, or errored)
    NothingRan,
    /// Every test that ran passed
    Passed,
}

impl Verdict {
    /// Classify a finished run
    pub fn of(report: &RunReport) -> Self {
        if let Some(error) = &report.execution_error {
            return Verdict::ExecutionError(error.to_string());
        }
        if report.has_failures() {
            return Verdict::Failed;
        }
        if !report.any_ran() {
            return Verdict::NothingRan;
        }
        Verdict::Passed
    }

    /// Process exit code for this verdict
    pub fn exit_code(&self) -> u8 {
        match self {
            Verdict::Passed => 0,
            Verdict::Failed => 1,
            Verdict::ExecutionError(_) | Verdict::NothingRan => crate::FATAL_EXIT_CODE,
        }
    }
}

/// Run the run command
pub async fn run(config: &RunConfig) -> Result<ExitCode> {
    config.validate()?;

    tracing::info!("Loading test catalog from {}", config.test_config.display());
    let catalog = Catalog::load(&config.test_config).context("parsing test config")?;
    let selected = suiterun_core::select(&config.patterns, &catalog)?;

    let engine = Engine::new(RunOptions::from_config(config, &catalog));
    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::warn!("Received interrupt, stopping run"),
            Err(err) => {
                tracing::warn!("Failed to install Ctrl+C handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };
    let report = engine.run_until(&selected, shutdown).await?;

    summary::print(&report);

    if let Some(path) = &config.junit_xml {
        junit::write_report(&report.outcomes, path).context("generating JUnit report")?;
    }

    let verdict = Verdict::of(&report);
    match &verdict {
        Verdict::ExecutionError(message) => eprintln!("Error: {message}"),
        Verdict::NothingRan => eprintln!("Error: no tests were run"),
        Verdict::Failed => tracing::info!("One or more tests failed"),
        Verdict::Passed => {}
    }
    Ok(ExitCode::from(verdict.exit_code()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use suiterun_runtime::{ExecutionError, RunOutcome, TestStatus};

    fn report(statuses: &[TestStatus]) -> RunReport {
        let now = Utc::now();
        RunReport {
            outcomes: statuses
                .iter()
                .enumerate()
                .map(|(i, status)| RunOutcome::instant(format!("t{i}"), *status, now))
                .collect(),
            execution_error: None,
        }
    }

    #[test]
    fn test_all_passed() {
        let verdict = Verdict::of(&report(&[TestStatus::Passed, TestStatus::Skipped]));
        assert_eq!(verdict, Verdict::Passed);
        assert_eq!(verdict.exit_code(), 0);
    }

    #[test]
    fn test_failure() {
        let verdict = Verdict::of(&report(&[TestStatus::Failed, TestStatus::Dropped]));
        assert_eq!(verdict, Verdict::Failed);
        assert_eq!(verdict.exit_code(), 1);
    }

    #[test]
    fn test_execution_error_outranks_failure() {
        let mut report = report(&[TestStatus::Failed, TestStatus::Error]);
        report.execution_error = Some(ExecutionError::new("t1", "empty command"));

        let verdict = Verdict::of(&report);
        assert_eq!(
            verdict,
            Verdict::ExecutionError("error running t1: empty command".to_string())
        );
        assert_eq!(verdict.exit_code(), 127);
    }

    #[test]
    fn test_nothing_ran() {
        let verdict = Verdict::of(&report(&[TestStatus::Skipped, TestStatus::Skipped]));
        assert_eq!(verdict, Verdict::NothingRan);
        assert_eq!(verdict.exit_code(), 127);
    }
}
