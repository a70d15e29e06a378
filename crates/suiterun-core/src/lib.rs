//! Suiterun Core Library
//!
//! This crate provides the data model shared by the suiterun tools:
//! - Test catalog loading and flattening
//! - Tag-based skip policy
//! - Glob selection with "did you mean" suggestions
//! - Kselftest list conversion
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Catalog   │────▶│  Selector   │────▶│   Engine    │
//! │   (JSON)    │     │ (+suggest)  │     │  (runtime)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use suiterun_core::{Catalog, select};
//!
//! let catalog = Catalog::load("tests.json")?;
//! let selected = select(&["kvm.*"], &catalog)?;
//! for id in selected.keys() {
//!     println!("Test: {id}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod kselftest;
pub mod policy;
pub mod select;
pub mod suggest;

pub use catalog::{Catalog, TestDefinition};
pub use config::RunConfig;
pub use error::{Error, Result};
pub use policy::{SelectionPolicy, should_skip};
pub use select::select;
pub use suggest::suggest;
