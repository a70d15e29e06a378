//! Human-readable run summary

use colored::{ColoredString, Colorize};
use suiterun_runtime::{RunReport, TestStatus};

/// Print the summary table to stdout
pub fn print(report: &RunReport) {
    print!("{}", render(report));
}

/// Render the summary: one line per test, then the totals
pub fn render(report: &RunReport) -> String {
    let mut out = String::from("\n=== Test Results Summary ===\n");
    for outcome in &report.outcomes {
        out.push_str(&format!(
            "{:<60} {}\n",
            outcome.test_id,
            colorize(outcome.status)
        ));
    }

    let counts = report.counts();
    out.push_str(&format!(
        "\nTotal: {}, Passed: {}, Failed: {}, Error: {}, Skipped: {}, Dropped: {}\n",
        counts.total(),
        counts.passed,
        counts.failed,
        counts.errors,
        counts.skipped,
        counts.dropped
    ));
    out
}

fn colorize(status: TestStatus) -> ColoredString {
    let label = status.label();
    match status {
        TestStatus::Passed => label.green(),
        TestStatus::Failed => label.red().bold(),
        TestStatus::Error => label.magenta().bold(),
        TestStatus::Skipped => label.yellow(),
        TestStatus::Dropped => label.dimmed(),
    }
}
