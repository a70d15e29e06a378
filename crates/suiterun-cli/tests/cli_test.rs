use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// Write `json` as `tests.json` in a fresh temporary directory.
fn catalog(json: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("tests.json"), json).unwrap();
    dir
}

fn suiterun_run(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("suiterun");
    cmd.env_remove("SUITERUN_TEST_CONFIG")
        .env_remove("RUST_LOG")
        .arg("run")
        .arg("--no-color")
        .arg("--test-config")
        .arg(dir.join("tests.json"));
    cmd
}

const TWO_ECHOES: &str = r#"{
    "foo": {
        "bar": {"__is_test": true, "command": ["echo", "hello"]},
        "baz": {"__is_test": true, "command": ["echo", "world"]}
    }
}"#;

#[test]
fn test_valid_tests_pass() {
    let dir = catalog(TWO_ECHOES);

    suiterun_run(dir.path())
        .args(["foo.bar", "foo.baz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello\nworld\n"))
        .stdout(predicate::str::contains("=== Test Results Summary ==="))
        .stdout(predicate::str::contains(format!("{:<60} PASS", "foo.bar")))
        .stdout(predicate::str::contains(
            "Total: 2, Passed: 2, Failed: 0, Error: 0, Skipped: 0, Dropped: 0",
        ));
}

#[test]
fn test_glob_patterns() {
    let dir = catalog(TWO_ECHOES);

    suiterun_run(dir.path())
        .arg("foo.ba?")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 2, Passed: 2"));
}

#[test]
fn test_double_star_glob() {
    let dir = catalog(TWO_ECHOES);

    suiterun_run(dir.path())
        .arg("foo.**")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 2, Passed: 2"));
}

#[test]
fn test_unmatched_pattern_suggests() {
    let dir = catalog(
        r#"{"foo": {"bar": {"__is_test": true, "command": ["echo", "hello"]}}}"#,
    );

    suiterun_run(dir.path())
        .arg("foo.baz")
        .assert()
        .code(127)
        .stdout(predicate::str::contains("hello").not())
        .stderr(predicate::str::contains(
            "no tests match pattern: foo.baz. Did you mean 'foo.bar'?",
        ));
}

#[test]
fn test_unmatched_glob() {
    let dir = catalog(TWO_ECHOES);

    suiterun_run(dir.path())
        .arg("nonexistent.*")
        .assert()
        .code(127)
        .stderr(predicate::str::contains("no tests match pattern: nonexistent.*"));
}

#[test]
fn test_invalid_glob() {
    let dir = catalog(TWO_ECHOES);

    suiterun_run(dir.path())
        .arg("foo[")
        .assert()
        .code(127)
        .stderr(predicate::str::contains("invalid glob pattern foo["));
}

#[test]
fn test_failing_test_exits_one() {
    let dir = catalog(r#"{"foo": {"bar": {"__is_test": true, "command": ["sh", "-c", "exit 1"]}}}"#);

    suiterun_run(dir.path())
        .arg("foo.bar")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(format!("{:<60} FAIL", "foo.bar")));
}

#[test]
fn test_bail_on_failure() {
    let dir = catalog(
        r#"{"foo": {
            "bar": {"__is_test": true, "command": ["sh", "-c", "exit 1"]},
            "baz": {"__is_test": true, "command": ["echo", "world"]}
        }}"#,
    );

    suiterun_run(dir.path())
        .args(["--bail-on-failure", "foo.*"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("world").not())
        .stdout(predicate::str::contains(format!("{:<60} DROP", "foo.baz")))
        .stdout(predicate::str::contains(
            "Total: 2, Passed: 0, Failed: 1, Error: 0, Skipped: 0, Dropped: 1",
        ));
}

#[test]
fn test_skip_tags() {
    let dir = catalog(
        r#"{"foo": {
            "bar": {"__is_test": true, "command": ["echo", "hello"], "tags": ["slow"]},
            "baz": {"__is_test": true, "command": ["echo", "world"], "tags": ["flaky"]},
            "qux": {"__is_test": true, "command": ["echo", "test"]}
        }}"#,
    );

    suiterun_run(dir.path())
        .args(["--skip-tag", "slow", "--skip-tag", "flaky", "foo.*"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello").not())
        .stdout(predicate::str::contains(
            "Total: 3, Passed: 1, Failed: 0, Error: 0, Skipped: 2, Dropped: 0",
        ));
}

const BAD_TAGGED: &str = r#"{
    "bad_tags": ["bad"],
    "foo": {
        "bar": {"__is_test": true, "command": ["echo", "hello"], "tags": ["bad"]},
        "baz": {"__is_test": true, "command": ["echo", "world"]}
    }
}"#;

#[test]
fn test_bad_tags_skipped_by_default() {
    let dir = catalog(BAD_TAGGED);

    suiterun_run(dir.path())
        .arg("foo.*")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{:<60} SKIP", "foo.bar")))
        .stdout(predicate::str::contains("Passed: 1, Failed: 0, Error: 0, Skipped: 1"));
}

#[test]
fn test_include_bad() {
    let dir = catalog(BAD_TAGGED);

    suiterun_run(dir.path())
        .args(["--include-bad", "bad", "foo.*"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello"))
        .stdout(predicate::str::contains("Total: 2, Passed: 2"));
}

#[test]
fn test_nothing_ran_is_an_error() {
    let dir = catalog(BAD_TAGGED);

    suiterun_run(dir.path())
        .arg("foo.bar")
        .assert()
        .code(127)
        .stderr(predicate::str::contains("no tests were run"));
}

#[test]
fn test_empty_command_is_an_error() {
    let dir = catalog(
        r#"{"foo": {
            "a": {"__is_test": true, "command": []},
            "b": {"__is_test": true, "command": ["echo", "still-runs"]}
        }}"#,
    );

    suiterun_run(dir.path())
        .arg("foo.*")
        .assert()
        .code(127)
        .stdout(predicate::str::contains("still-runs"))
        .stdout(predicate::str::contains(format!("{:<60} ERR", "foo.a")))
        .stderr(predicate::str::contains("error running foo.a: empty command"));
}

#[test]
fn test_junit_and_logs() {
    let dir = catalog(
        r#"{"suite": {
            "ok": {"__is_test": true, "command": ["echo", "fine"]},
            "broken": {"__is_test": true, "command": ["sh", "-c", "echo oops; exit 2"]}
        }}"#,
    );
    let log_dir = dir.path().join("logs");
    let report = dir.path().join("report.xml");

    suiterun_run(dir.path())
        .arg("--log-dir")
        .arg(&log_dir)
        .arg("--junit-xml")
        .arg(&report)
        .arg("suite.*")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("oops"));

    let log = std::fs::read_to_string(log_dir.join("suite").join("broken.log")).unwrap();
    assert_eq!(log, "oops\n");

    let xml = std::fs::read_to_string(&report).unwrap();
    assert!(xml.contains(r#"<testsuite name="suite" tests="2" failures="1" errors="0" skipped="0""#));
    assert!(xml.contains("<![CDATA[oops\n]]>"));
}

#[test]
fn test_junit_with_non_utf8_log() {
    let dir = catalog(
        r#"{"s": {"binary": {"__is_test": true, "command": ["sh", "-c", "printf 'caf\\351\\n'; exit 1"]}}}"#,
    );
    let report = dir.path().join("report.xml");

    suiterun_run(dir.path())
        .arg("--log-dir")
        .arg(dir.path().join("logs"))
        .arg("--junit-xml")
        .arg(&report)
        .arg("s.binary")
        .assert()
        .code(1);

    let xml = std::fs::read_to_string(&report).unwrap();
    assert!(xml.contains("<![CDATA[caf\u{FFFD}\n]]>"));
}

#[test]
fn test_missing_test_config() {
    cargo_bin_cmd!("suiterun")
        .env_remove("SUITERUN_TEST_CONFIG")
        .args(["run", "foo.bar"])
        .assert()
        .code(127)
        .stderr(predicate::str::contains("--test-config"));
}

#[test]
fn test_invalid_catalog_json() {
    let dir = catalog(r#"{"foo": {"#);

    suiterun_run(dir.path())
        .arg("foo.bar")
        .assert()
        .code(127)
        .stderr(predicate::str::contains("parsing test config"));
}

#[test]
fn test_parse_kselftest_list() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("kselftest-list.txt");
    std::fs::write(&list, "kvm:guest_memfd_test\nfutex:functional").unwrap();

    let output = cargo_bin_cmd!("suiterun")
        .arg("parse-kselftest-list")
        .arg(&list)
        .output()
        .unwrap();
    assert!(output.status.success());

    let actual: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let expected = serde_json::json!({
        "futex": {
            "functional": {
                "__is_test": true,
                "command": ["run_kselftest.sh", "--error-on-fail", "-t", "futex:functional"]
            }
        },
        "kvm": {
            "guest_memfd_test": {
                "__is_test": true,
                "command": ["run_kselftest.sh", "--error-on-fail", "-t", "kvm:guest_memfd_test"]
            }
        }
    });
    assert_eq!(actual, expected);
}

#[test]
fn test_parse_kselftest_list_bad_line() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("kselftest-list.txt");
    std::fs::write(&list, "no-colon-here\n").unwrap();

    cargo_bin_cmd!("suiterun")
        .arg("parse-kselftest-list")
        .arg(&list)
        .assert()
        .code(127)
        .stderr(predicate::str::contains("can't parse suite:name line"));
}
