//! JUnit XML report generation
//!
//! Outcomes are grouped into suites by the identifier before the last dot;
//! the last segment is the case name. An identifier without a dot is its own
//! suite and case. Suites are ordered by name and cases keep run order, so
//! the same outcomes always render to the same bytes.

use anyhow::Context;
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, Event};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::outcome::{RunOutcome, TestStatus};

/// Result element of a test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseResult {
    /// No child element
    Passed,
    /// `<failure>` with the captured log
    Failure {
        /// `message` attribute
        message: String,
        /// Captured log text
        content: String,
    },
    /// `<error>` with the captured log
    Error {
        /// `message` attribute
        message: String,
        /// Captured log text
        content: String,
    },
    /// `<skipped>`
    Skipped {
        /// `message` attribute
        message: String,
    },
}

/// One `<testcase>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JunitCase {
    /// Last identifier segment
    pub name: String,
    /// Suite name
    pub classname: String,
    /// Duration in milliseconds
    pub time_millis: u64,
    /// Result element
    pub result: CaseResult,
}

/// One `<testsuite>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JunitSuite {
    /// Identifier prefix shared by the cases
    pub name: String,
    /// Number of cases
    pub tests: usize,
    /// Failed cases
    pub failures: usize,
    /// Errored cases
    pub errors: usize,
    /// Skipped and dropped cases
    pub skipped: usize,
    /// Sum of the case durations in milliseconds
    pub time_millis: u64,
    /// Cases in run order
    pub cases: Vec<JunitCase>,
}

/// A complete `<testsuites>` document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JunitReport {
    /// Suites ordered by name
    pub suites: Vec<JunitSuite>,
}

impl JunitReport {
    /// Group outcomes into suites, reading the logs of failed and errored
    /// tests.
    pub fn from_outcomes(outcomes: &[RunOutcome]) -> Result<Self> {
        let mut suites: BTreeMap<String, JunitSuite> = BTreeMap::new();

        for outcome in outcomes {
            let (suite_name, case_name) = split_test_id(&outcome.test_id);
            let suite = suites
                .entry(suite_name.to_string())
                .or_insert_with(|| JunitSuite {
                    name: suite_name.to_string(),
                    ..Default::default()
                });

            let result = match outcome.status {
                TestStatus::Passed => CaseResult::Passed,
                TestStatus::Failed => {
                    suite.failures += 1;
                    CaseResult::Failure {
                        message: "Test failed".to_string(),
                        content: read_log(outcome.log_path.as_deref())
                            .with_context(|| {
                                format!("reading log file for failed test {}", outcome.test_id)
                            })?,
                    }
                }
                TestStatus::Error => {
                    suite.errors += 1;
                    CaseResult::Error {
                        message: format!(
                            "Test execution failed: {}",
                            outcome.error.as_deref().unwrap_or("unknown error")
                        ),
                        content: read_log(outcome.log_path.as_deref())
                            .with_context(|| {
                                format!("reading log file for errored test {}", outcome.test_id)
                            })?,
                    }
                }
                TestStatus::Skipped => {
                    suite.skipped += 1;
                    CaseResult::Skipped {
                        message: "Test skipped".to_string(),
                    }
                }
                TestStatus::Dropped => {
                    suite.skipped += 1;
                    CaseResult::Skipped {
                        message: "Test dropped".to_string(),
                    }
                }
            };

            let time_millis = outcome.duration_millis();
            suite.tests += 1;
            suite.time_millis += time_millis;
            suite.cases.push(JunitCase {
                name: case_name.to_string(),
                classname: suite_name.to_string(),
                time_millis,
                result,
            });
        }

        Ok(Self {
            suites: suites.into_values().collect(),
        })
    }

    /// Render the report as an indented XML document
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("testsuites")))?;

        for suite in &self.suites {
            let tests = suite.tests.to_string();
            let failures = suite.failures.to_string();
            let errors = suite.errors.to_string();
            let skipped = suite.skipped.to_string();
            let time = format_seconds(suite.time_millis);
            writer.write_event(Event::Start(BytesStart::new("testsuite").with_attributes([
                ("name", suite.name.as_str()),
                ("tests", tests.as_str()),
                ("failures", failures.as_str()),
                ("errors", errors.as_str()),
                ("skipped", skipped.as_str()),
                ("time", time.as_str()),
            ])))?;

            for case in &suite.cases {
                write_case(&mut writer, case)?;
            }

            writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("testsuites")))?;
        let mut xml = String::from_utf8(writer.into_inner()).context("JUnit XML is not UTF-8")?;
        xml.push('\n');
        Ok(xml)
    }

    /// Write the report to `path`
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_xml()?)
            .with_context(|| format!("writing JUnit XML to {}", path.display()))?;
        tracing::info!("Wrote JUnit report to {}", path.display());
        Ok(())
    }
}

/// Build and write a report for `outcomes` in one step
pub fn write_report<P: AsRef<Path>>(outcomes: &[RunOutcome], path: P) -> Result<()> {
    JunitReport::from_outcomes(outcomes)?.write(path)
}

/// Split `suite.sub.case` into (`suite.sub`, `case`).
pub fn split_test_id(test_id: &str) -> (&str, &str) {
    test_id.rsplit_once('.').unwrap_or((test_id, test_id))
}

fn write_case(writer: &mut Writer<Vec<u8>>, case: &JunitCase) -> Result<()> {
    let time = format_seconds(case.time_millis);
    let start = BytesStart::new("testcase").with_attributes([
        ("name", case.name.as_str()),
        ("classname", case.classname.as_str()),
        ("time", time.as_str()),
    ]);

    match &case.result {
        CaseResult::Passed => {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        CaseResult::Failure { message, content } => {
            writer.write_event(Event::Start(start))?;
            write_detail(writer, "failure", message, content)?;
        }
        CaseResult::Error { message, content } => {
            writer.write_event(Event::Start(start))?;
            write_detail(writer, "error", message, content)?;
        }
        CaseResult::Skipped { message } => {
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Empty(
                BytesStart::new("skipped").with_attributes([("message", message.as_str())]),
            ))?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

fn write_detail(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    message: &str,
    content: &str,
) -> Result<()> {
    let start = BytesStart::new(tag).with_attributes([("message", message)]);
    if content.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for section in cdata_sections(content) {
        writer.write_event(Event::CData(BytesCData::new(section)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Split text so no section contains the CDATA terminator `]]>`.
fn cdata_sections(text: &str) -> Vec<String> {
    let parts: Vec<&str> = text.split("]]>").collect();
    let last = parts.len() - 1;
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let mut section = String::with_capacity(part.len() + 3);
            if i > 0 {
                section.push('>');
            }
            section.push_str(part);
            if i < last {
                section.push_str("]]");
            }
            section
        })
        .collect()
}

fn format_seconds(millis: u64) -> String {
    format!("{}.{:03}", millis / 1000, millis % 1000)
}

/// Read a captured log. Bytes that are not UTF-8 are replaced, not rejected.
fn read_log(path: Option<&Path>) -> std::io::Result<String> {
    match path {
        Some(path) => {
            let bytes = std::fs::read(path)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        None => Ok(String::new()),
    }
}
