//! Suiterun Runtime
//!
//! This crate executes selected tests and reports on them.
//!
//! # Features
//!
//! - Sequential, deterministic execution with bail-on-failure
//! - Per-test log capture (console + file)
//! - Per-test timeout and operator interrupt
//! - JUnit XML reports
//!
//! # Usage
//!
//! ```rust,ignore
//! use suiterun_runtime::{Engine, RunOptions};
//!
//! let engine = Engine::new(RunOptions::from_config(&config, &catalog));
//! let report = engine.run(&selected).await?;
//! suiterun_runtime::junit::write_report(&report.outcomes, "report.xml")?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod capture;
pub mod engine;
pub mod error;
pub mod junit;
pub mod outcome;

pub use engine::{Engine, RunOptions};
pub use error::{Error, ExecutionError, Result};
pub use outcome::{RunOutcome, RunReport, StatusCounts, TestStatus};
