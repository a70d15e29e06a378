//! Integration tests for loading a catalog file and selecting from it
//!
//! Tests use temporary directories with real catalog files to verify:
//! - Tag inheritance through nested groups
//! - Selection by glob with suggestions on a miss
//! - Skip policy against the catalog's bad tags
//! - Round-trip of a converted kselftest list

use std::path::PathBuf;
use suiterun_core::{Catalog, Error, RunConfig, SelectionPolicy, kselftest, select, should_skip};
use tempfile::TempDir;

const CATALOG: &str = r#"{
    "bad_tags": ["broken"],
    "kvm": {
        "tags": ["virt"],
        "guest_memfd": {"__is_test": true, "command": ["./guest_memfd_test"]},
        "dirty_log": {
            "__is_test": true,
            "command": ["./dirty_log_test", "-i", "4"],
            "tags": ["slow"]
        },
        "x86": {
            "tags": ["arch"],
            "sev": {"__is_test": true, "command": ["./sev_test"], "tags": ["broken"]}
        }
    },
    "net": {
        "ping": {"__is_test": true, "command": ["ping", "-c", "1", "localhost"]}
    }
}"#;

fn write_catalog(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("tests.json");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_flattens_with_inherited_tags() {
    let dir = TempDir::new().unwrap();
    let catalog = Catalog::load(write_catalog(&dir, CATALOG)).unwrap();

    let ids: Vec<&str> = catalog.ids().collect();
    assert_eq!(
        ids,
        vec!["kvm.dirty_log", "kvm.guest_memfd", "kvm.x86.sev", "net.ping"]
    );

    let sev = catalog.get("kvm.x86.sev").unwrap();
    assert_eq!(sev.command, vec!["./sev_test"]);
    assert!(sev.has_tag("virt"));
    assert!(sev.has_tag("arch"));
    assert!(sev.has_tag("broken"));

    let ping = catalog.get("net.ping").unwrap();
    assert!(ping.tags.is_empty());
    assert!(catalog.bad_tags.contains("broken"));
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = Catalog::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::CatalogNotFound { .. }));
}

#[test]
fn test_select_and_skip() {
    let dir = TempDir::new().unwrap();
    let catalog = Catalog::load(write_catalog(&dir, CATALOG)).unwrap();

    let selected = select(&["kvm.*"], &catalog).unwrap();
    assert_eq!(selected.len(), 3);

    let policy = SelectionPolicy::new().with_skip_tags(["slow"]);
    let skipped: Vec<&str> = selected
        .iter()
        .filter(|(_, test)| should_skip(test, &policy, &catalog.bad_tags))
        .map(|(id, _)| id.as_str())
        .collect();
    assert_eq!(skipped, vec!["kvm.dirty_log", "kvm.x86.sev"]);

    let policy = policy.with_include_bad_tags(["broken"]);
    assert!(!should_skip(
        &selected["kvm.x86.sev"],
        &policy,
        &catalog.bad_tags
    ));
}

#[test]
fn test_select_miss_suggests_closest() {
    let dir = TempDir::new().unwrap();
    let catalog = Catalog::load(write_catalog(&dir, CATALOG)).unwrap();

    let err = select(&["net.ping", "kvm.guest_memfdd"], &catalog).unwrap_err();
    assert_eq!(
        err.to_string(),
        "no tests match pattern: kvm.guest_memfdd. Did you mean 'kvm.guest_memfd'?"
    );
}

#[test]
fn test_converted_kselftest_list_loads() {
    let dir = TempDir::new().unwrap();
    let json = kselftest::list_to_catalog_json("kvm:guest_memfd_test\nnet:ping\n").unwrap();
    let path = write_catalog(&dir, &json);

    let catalog = Catalog::load(&path).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(
        catalog.get("net.ping").unwrap().command,
        vec![kselftest::KSELFTEST_RUNNER, "--error-on-fail", "-t", "net:ping"]
    );

    let config = RunConfig::new(path.clone(), vec!["net.*".to_string()]);
    config.validate().unwrap();
    assert_eq!(select(&config.patterns, &catalog).unwrap().len(), 1);
}
