// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The JUnit-style XML renderer.

use crate::{
    aggregator::SuiteGroups,
    config::RunnerConfig,
    errors::ReportError,
    record::{Outcome, ResultRecord},
    store::RecordStore,
};
use camino::Utf8PathBuf;
use chrono::{DateTime, Local};
use junit_writer::{NonPassKind, Report, TestCase, TestCaseStatus, TestSuite};
use std::fs::File;
use tracing::debug;

/// The fixed file name of the XML report within the output directory.
pub const XML_REPORT_FILE: &str = "output.xml";

/// Builds the XML report model from a run's accepted records.
///
/// Each suite group becomes one `testsuite` element, named after its key
/// with the resolved output suffix appended. The root counters are the sums
/// of the per-suite counters.
pub fn build_report(
    store: &RecordStore,
    config: &RunnerConfig,
    started_at: DateTime<Local>,
) -> Report {
    let suffix = config.outsuffix.resolve(started_at);
    let mut report = Report::new(&config.report_title);
    report.set_timestamp(started_at);

    for group in SuiteGroups::build(store).iter() {
        let name = if suffix.is_empty() {
            group.key.to_owned()
        } else {
            format!("{}-{suffix}", group.key)
        };
        let mut suite = TestSuite::new(name);
        if let Some(first) = group.records.first() {
            suite.set_timestamp(first.start_time);
        }
        for (property_name, value) in &config.properties {
            suite.add_property((property_name.as_str(), value.as_str()));
        }

        let mut system_out = String::new();
        let mut system_err = String::new();
        for record in &group.records {
            suite.add_test_case(to_test_case(record));
            system_out.push_str(&record.stdout);
            system_err.push_str(&record.stderr);
        }
        if !system_out.is_empty() {
            suite.set_system_out(system_out);
        }
        if !system_err.is_empty() {
            suite.set_system_err(system_err);
        }
        report.add_suite(suite);
    }

    report
}

fn to_test_case(record: &ResultRecord) -> TestCase {
    let status = match record.outcome {
        Outcome::Success => TestCaseStatus::Pass,
        Outcome::Failure | Outcome::Error => {
            let kind = if record.outcome == Outcome::Failure {
                NonPassKind::Failure
            } else {
                NonPassKind::Error
            };
            let (ty, message, description) = match &record.error {
                Some(error) => (
                    error.kind.clone(),
                    error.message.clone(),
                    error.trace.clone(),
                ),
                None => (String::new(), String::new(), String::new()),
            };
            TestCaseStatus::NonPass {
                kind,
                ty,
                message,
                description,
            }
        }
        Outcome::Skip => TestCaseStatus::Skipped {
            message: record
                .error
                .as_ref()
                .map(|error| error.message.clone())
                .unwrap_or_default(),
        },
    };

    let mut test_case = TestCase::new(record.display_name(), status);
    test_case
        .set_classname(record.test_id.class_scope())
        .set_start_time(record.start_time)
        .set_stop_time(record.stop_time)
        .set_time(record.elapsed)
        .set_rerun(record.rerun_count)
        .set_screenshot(&record.screenshot)
        .set_steps(&record.step_text, &record.expected_text);
    test_case
}

/// Renders and writes the XML report, returning the path written.
pub fn write_report(
    store: &RecordStore,
    config: &RunnerConfig,
    started_at: DateTime<Local>,
) -> Result<Utf8PathBuf, ReportError> {
    let path = config.output.join(XML_REPORT_FILE);
    let report = build_report(store, config, started_at);
    let file = File::create(&path).map_err(|error| ReportError::Xml {
        path: path.clone(),
        error,
    })?;
    report
        .serialize(file)
        .map_err(|error| ReportError::XmlSerialize {
            path: path.clone(),
            error,
        })?;
    debug!(%path, suites = report.suites.len(), "wrote XML report");
    Ok(path)
}
