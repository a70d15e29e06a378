//! Suiterun CLI
//!
//! Runs catalogued test commands selected by glob pattern.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use suiterun_core::{RunConfig, SelectionPolicy};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod summary;

/// Exit code for configuration, selection, and execution errors
const FATAL_EXIT_CODE: u8 = 127;

/// Suiterun - test-suite orchestrator for external test commands
#[derive(Parser)]
#[command(name = "suiterun")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tests matching one or more patterns
    Run(RunArgs),

    /// Convert a kselftest list (`suite:name` per line) into a test catalog
    ParseKselftestList {
        /// Kselftest list file
        file: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Path to a JSON file with test definitions
    #[arg(long, env = "SUITERUN_TEST_CONFIG")]
    test_config: PathBuf,

    /// Skip tests with this tag (repeatable)
    #[arg(long = "skip-tag", value_name = "TAG")]
    skip_tags: Vec<String>,

    /// Run tests carrying this bad tag anyway (repeatable)
    #[arg(long = "include-bad", value_name = "TAG")]
    include_bad: Vec<String>,

    /// Write each test's output to <DIR>/<suite>/<test>.log
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Write a JUnit XML report to this file
    #[arg(long, value_name = "FILE")]
    junit_xml: Option<PathBuf>,

    /// Stop after the first failing test
    #[arg(long)]
    bail_on_failure: bool,

    /// Kill a test that runs longer than this many seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Test identifier globs (`*`, `?`, `[...]`)
    #[arg(required = true, value_name = "PATTERN")]
    patterns: Vec<String>,
}

impl RunArgs {
    fn into_config(self) -> RunConfig {
        RunConfig {
            test_config: self.test_config,
            patterns: self.patterns,
            policy: SelectionPolicy::new()
                .with_skip_tags(self.skip_tags)
                .with_include_bad_tags(self.include_bad),
            log_dir: self.log_dir,
            junit_xml: self.junit_xml,
            bail_on_failure: self.bail_on_failure,
            timeout: self.timeout.map(Duration::from_secs),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(FATAL_EXIT_CODE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Run(args) => {
            if args.no_color {
                colored::control::set_override(false);
            }
            commands::run::run(&args.into_config()).await
        }
        Commands::ParseKselftestList { file } => {
            commands::kselftest::run(&file).map(|()| ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(FATAL_EXIT_CODE)
        }
    }
}
