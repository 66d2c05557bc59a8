// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{errors::SerializeError, serialize::serialize_report};
use chrono::{DateTime, Local};
use std::{io, time::Duration};

/// The root element of a JUnit report.
///
/// Counters are accumulated additively as suites are added, so the root
/// attributes always equal the sum of the per-suite attributes.
#[derive(Clone, Debug)]
pub struct Report {
    /// The name of this report, usually the configured report title.
    pub name: String,

    /// The time the run began, if known.
    pub timestamp: Option<DateTime<Local>>,

    /// The overall time taken by the run.
    ///
    /// This is serialized as the number of seconds with six decimal places.
    pub time: Duration,

    /// The total number of tests from all suites.
    pub tests: usize,

    /// The total number of failures from all suites.
    pub failures: usize,

    /// The total number of errors from all suites.
    pub errors: usize,

    /// The total number of skipped tests from all suites.
    pub skipped: usize,

    /// The test suites contained in this report.
    pub suites: Vec<TestSuite>,
}

impl Report {
    /// Creates a new `Report` with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: None,
            time: Duration::ZERO,
            tests: 0,
            failures: 0,
            errors: 0,
            skipped: 0,
            suites: vec![],
        }
    }

    /// Sets the start timestamp of the report.
    pub fn set_timestamp(&mut self, timestamp: DateTime<Local>) -> &mut Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Adds a suite and updates the `tests`, `failures`, `errors`, `skipped`
    /// and `time` counters.
    ///
    /// When generating a new report, use of this method is recommended over
    /// pushing to `self.suites` directly.
    pub fn add_suite(&mut self, suite: TestSuite) -> &mut Self {
        self.tests += suite.tests;
        self.failures += suite.failures;
        self.errors += suite.errors;
        self.skipped += suite.skipped;
        self.time += suite.time;
        self.suites.push(suite);
        self
    }

    /// Adds several suites and updates the counters.
    pub fn add_suites(&mut self, suites: impl IntoIterator<Item = TestSuite>) -> &mut Self {
        for suite in suites {
            self.add_suite(suite);
        }
        self
    }

    /// Serialize this report to the given writer.
    pub fn serialize(&self, writer: impl io::Write) -> Result<(), SerializeError> {
        serialize_report(self, writer).map_err(SerializeError::from)
    }

    /// Serialize this report to a string.
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> Result<String, SerializeError> {
        let mut buf: Vec<u8> = vec![];
        self.serialize(&mut buf)?;
        String::from_utf8(buf).map_err(|utf8_err| {
            SerializeError::from(quick_xml::Error::from(utf8_err.utf8_error()))
        })
    }
}

/// Represents a single test suite: a group of [`TestCase`] instances that
/// originated from the same test class or suite description.
#[derive(Clone, Debug)]
pub struct TestSuite {
    /// The name of this suite, with any configured output suffix appended.
    pub name: String,

    /// The time the suite's first test began, if known.
    pub timestamp: Option<DateTime<Local>>,

    /// The total number of tests in this suite.
    pub tests: usize,

    /// The total number of tests in this suite that failed.
    pub failures: usize,

    /// The total number of tests in this suite that errored.
    pub errors: usize,

    /// The total number of tests in this suite that were skipped.
    pub skipped: usize,

    /// The overall time taken by the suite, the sum of its test times.
    pub time: Duration,

    /// The test cases that form this suite.
    pub test_cases: Vec<TestCase>,

    /// Custom properties set for the run, e.g. environment descriptions.
    pub properties: Vec<Property>,

    /// Data written to standard output by the tests in this suite.
    pub system_out: Option<Output>,

    /// Data written to standard error by the tests in this suite.
    pub system_err: Option<Output>,
}

impl TestSuite {
    /// Creates a new `TestSuite`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: None,
            tests: 0,
            failures: 0,
            errors: 0,
            skipped: 0,
            time: Duration::ZERO,
            test_cases: vec![],
            properties: vec![],
            system_out: None,
            system_err: None,
        }
    }

    /// Sets the start timestamp of the suite.
    pub fn set_timestamp(&mut self, timestamp: DateTime<Local>) -> &mut Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Adds a property to this suite.
    pub fn add_property(&mut self, property: impl Into<Property>) -> &mut Self {
        self.properties.push(property.into());
        self
    }

    /// Adds a test case to this suite and updates the counters.
    ///
    /// When generating a new report, use of this method is recommended over
    /// pushing to `self.test_cases` directly.
    pub fn add_test_case(&mut self, test_case: TestCase) -> &mut Self {
        self.tests += 1;
        self.time += test_case.time;
        match &test_case.status {
            TestCaseStatus::Pass => {}
            TestCaseStatus::NonPass { kind, .. } => match kind {
                NonPassKind::Failure => self.failures += 1,
                NonPassKind::Error => self.errors += 1,
            },
            TestCaseStatus::Skipped { .. } => self.skipped += 1,
        }
        self.test_cases.push(test_case);
        self
    }

    /// Adds several test cases to this suite and updates the counters.
    pub fn add_test_cases(&mut self, test_cases: impl IntoIterator<Item = TestCase>) -> &mut Self {
        for test_case in test_cases {
            self.add_test_case(test_case);
        }
        self
    }

    /// Sets standard output for the suite.
    pub fn set_system_out(&mut self, system_out: impl AsRef<str>) -> &mut Self {
        self.system_out = Some(Output::new(system_out.as_ref()));
        self
    }

    /// Sets standard error for the suite.
    pub fn set_system_err(&mut self, system_err: impl AsRef<str>) -> &mut Self {
        self.system_err = Some(Output::new(system_err.as_ref()));
        self
    }
}

/// Represents a single test case.
#[derive(Clone, Debug)]
pub struct TestCase {
    /// The display name of the test case.
    pub name: String,

    /// The "classname" of the test case: the dotted path to the owning
    /// class, without the trailing method name.
    pub classname: String,

    /// The time at which this test began execution.
    pub start_time: Option<DateTime<Local>>,

    /// The time at which this test stopped execution.
    pub stop_time: Option<DateTime<Local>>,

    /// The time it took to execute this test.
    pub time: Duration,

    /// The status of this test.
    pub status: TestCaseStatus,

    /// How many prior attempts preceded the recorded one.
    pub rerun: u32,

    /// An opaque screenshot reference captured on failure, or empty.
    pub screenshot: String,

    /// The test procedure text parsed from the test's documentation.
    pub step: String,

    /// The expected-result text parsed from the test's documentation.
    pub expected: String,
}

impl TestCase {
    /// Creates a new test case.
    pub fn new(name: impl Into<String>, status: TestCaseStatus) -> Self {
        Self {
            name: name.into(),
            classname: String::new(),
            start_time: None,
            stop_time: None,
            time: Duration::ZERO,
            status,
            rerun: 0,
            screenshot: String::new(),
            step: String::new(),
            expected: String::new(),
        }
    }

    /// Sets the classname of the test.
    pub fn set_classname(&mut self, classname: impl Into<String>) -> &mut Self {
        self.classname = classname.into();
        self
    }

    /// Sets the start timestamp for the test case.
    pub fn set_start_time(&mut self, start_time: DateTime<Local>) -> &mut Self {
        self.start_time = Some(start_time);
        self
    }

    /// Sets the stop timestamp for the test case.
    pub fn set_stop_time(&mut self, stop_time: DateTime<Local>) -> &mut Self {
        self.stop_time = Some(stop_time);
        self
    }

    /// Sets the time taken by the test case.
    pub fn set_time(&mut self, time: Duration) -> &mut Self {
        self.time = time;
        self
    }

    /// Sets the rerun count.
    pub fn set_rerun(&mut self, rerun: u32) -> &mut Self {
        self.rerun = rerun;
        self
    }

    /// Sets the screenshot reference.
    pub fn set_screenshot(&mut self, screenshot: impl Into<String>) -> &mut Self {
        self.screenshot = screenshot.into();
        self
    }

    /// Sets the step and expected-result text.
    pub fn set_steps(&mut self, step: impl Into<String>, expected: impl Into<String>) -> &mut Self {
        self.step = step.into();
        self.expected = expected.into();
        self
    }
}

/// Represents the outcome of a test case.
#[derive(Clone, Debug)]
pub enum TestCaseStatus {
    /// The test passed. Serialized as the `PASS` status attribute.
    Pass,

    /// The test did not pass. Serialized as the `FAIL` status attribute with
    /// a `failure` or `error` child element.
    NonPass {
        /// Whether the test failed an assertion or hit an unexpected error.
        kind: NonPassKind,

        /// The "type" of the failure, usually the exception kind.
        ty: String,

        /// The failure message.
        message: String,

        /// The full diagnostic text, embedded as CDATA.
        description: String,
    },

    /// The test was skipped. Serialized as the `SKIP` status attribute with
    /// a `skipped` child element.
    Skipped {
        /// The skip reason.
        message: String,
    },
}

impl TestCaseStatus {
    /// The value of the `status` attribute for this outcome.
    pub fn status_attr(&self) -> &'static str {
        match self {
            TestCaseStatus::Pass => "PASS",
            TestCaseStatus::NonPass { .. } => "FAIL",
            TestCaseStatus::Skipped { .. } => "SKIP",
        }
    }
}

/// Distinguishes expected failures from unexpected errors.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NonPassKind {
    /// An expected kind of issue, e.g. a failed assertion. Serialized as
    /// `failure`.
    Failure,

    /// An unexpected issue in a test. Serialized as `error`.
    Error,
}

/// Custom properties set for a test run, e.g. environment variables.
#[derive(Clone, Debug)]
pub struct Property {
    /// The name of the property.
    pub name: String,

    /// The value of the property.
    pub value: String,
}

impl Property {
    /// Creates a new `Property` instance.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<T> From<(T, T)> for Property
where
    T: Into<String>,
{
    fn from((k, v): (T, T)) -> Self {
        Property::new(k, v)
    }
}

/// Text written to standard output or standard error during test execution.
///
/// XUnit assumes the output is valid Unicode; characters that are not legal
/// in XML 1.0 documents are removed on construction.
#[derive(Clone, Debug)]
pub struct Output {
    output: Box<str>,
}

impl Output {
    /// Creates a new output, removing any characters illegal in XML from it.
    pub fn new(output: impl AsRef<str>) -> Self {
        let output = crate::serialize::xml_safe(output.as_ref())
            .into_owned()
            .into_boxed_str();
        Self { output }
    }

    /// Returns the output.
    pub fn as_str(&self) -> &str {
        &self.output
    }

    /// Converts the output into a string.
    pub fn into_string(self) -> String {
        self.output.into_string()
    }
}

impl AsRef<str> for Output {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<Output> for String {
    fn from(output: Output) -> Self {
        output.into_string()
    }
}
