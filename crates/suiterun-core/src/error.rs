//! Error types for suiterun-core

use thiserror::Error;

/// Result type alias for suiterun-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a catalog or selecting tests
#[derive(Error, Debug)]
pub enum Error {
    /// Test catalog file could not be found
    #[error("test catalog not found: {path}")]
    CatalogNotFound {
        /// Path that was searched
        path: String,
    },

    /// Failed to parse the JSON catalog
    #[error("failed to parse test catalog: {0}")]
    CatalogParse(#[from] serde_json::Error),

    /// The catalog parsed as JSON but has the wrong shape
    #[error("invalid test catalog at '{path}': {message}")]
    CatalogInvalid {
        /// Dotted path of the offending node (empty for the root)
        path: String,
        /// Description of what's invalid
        message: String,
    },

    /// Invalid run configuration
    #[error("invalid configuration: {message}")]
    ConfigInvalid {
        /// Description of what's invalid
        message: String,
    },

    /// A selection pattern is not valid glob syntax
    #[error("invalid glob pattern {pattern}: {source}")]
    InvalidPattern {
        /// The pattern as given on the command line
        pattern: String,
        /// Underlying glob error
        source: glob::PatternError,
    },

    /// A selection pattern matched nothing in the catalog
    #[error("no tests match pattern: {pattern}{}", did_you_mean(.suggestion))]
    NoMatch {
        /// The pattern that matched nothing
        pattern: String,
        /// Closest known test identifier, if any
        suggestion: Option<String>,
    },

    /// A kselftest list line is not in `suite:name` form
    #[error("can't parse suite:name line {line_number}: {line:?}")]
    KselftestLine {
        /// 1-based line number
        line_number: usize,
        /// Raw line content
        line: String,
    },

    /// A kselftest list names the same test twice
    #[error("duplicate test {suite}:{name}")]
    KselftestDuplicate {
        /// Suite portion of the entry
        suite: String,
        /// Test portion of the entry
        name: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(". Did you mean '{name}'?"),
        None => String::new(),
    }
}
