//! CLI command implementations

pub mod kselftest;
pub mod run;
