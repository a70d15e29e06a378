//! Convert a kselftest list into a test catalog

use anyhow::{Context, Result};
use std::path::Path;
use suiterun_core::kselftest;

/// Run the parse-kselftest-list command
pub fn run(path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let json = kselftest::list_to_catalog_json(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;
    println!("{json}");
    Ok(())
}
