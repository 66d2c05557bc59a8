// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result records: the finalized outcome snapshot of one test execution.

use chrono::{DateTime, Local};
use std::{fmt, time::Duration};

/// The stable identifier of a logical test within one run.
///
/// The format is the dotted `suite.class.method` path; sub-tests carry a
/// distinct variant of the owning test's id.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TestId(String);

impl TestId {
    /// Creates a new test id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The trailing method name of the id.
    pub fn method_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// The class scope of the id: everything before the trailing method
    /// name, with any `__main__.` module prefix stripped.
    pub fn class_scope(&self) -> &str {
        let scoped = self.0.strip_prefix("__main__.").unwrap_or(&self.0);
        match scoped.rfind('.') {
            Some(pos) => &scoped[..pos],
            None => "",
        }
    }

    /// The sequence number encoded in the method name, when present.
    ///
    /// A method named `test_0007_login` yields 7. Tests without a numeric
    /// component after the first underscore yield 0, which keeps them in
    /// encounter order under a stable sort.
    pub fn sequence_number(&self) -> u64 {
        self.method_name()
            .split('_')
            .nth(1)
            .and_then(|part| part.parse().ok())
            .unwrap_or(0)
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TestId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The classified outcome of one test execution.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The test passed.
    Success,
    /// The test failed an assertion.
    Failure,
    /// The test hit an unexpected error.
    Error,
    /// The test was skipped.
    Skip,
}

impl Outcome {
    /// True for the failure and error outcomes.
    pub fn is_problem(self) -> bool {
        matches!(self, Outcome::Failure | Outcome::Error)
    }

    /// The status keyword used by the HTML report, indexed by outcome.
    pub fn status_keyword(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "danger",
            Outcome::Error => "warning",
            Outcome::Skip => "info",
        }
    }

    /// The console label for this outcome.
    pub(crate) fn console_label(self) -> &'static str {
        match self {
            Outcome::Success => "OK",
            Outcome::Failure => "FAIL",
            Outcome::Error => "ERROR",
            Outcome::Skip => "SKIP",
        }
    }
}

/// Diagnostic details for a failed or errored execution.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorDetail {
    /// The kind of the error, usually an exception type name.
    pub kind: String,
    /// The error message.
    pub message: String,
    /// The formatted stack trace.
    pub trace: String,
}

impl ErrorDetail {
    /// Creates a new error detail.
    pub fn new(
        kind: impl Into<String>,
        message: impl Into<String>,
        trace: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            trace: trace.into(),
        }
    }
}

/// The finalized snapshot of one executed test or sub-test.
///
/// Created by the outcome classifier when a test completes; immutable once
/// accepted by the [`RecordStore`](crate::store::RecordStore).
#[derive(Clone, Debug)]
pub struct ResultRecord {
    /// The identity of the test this record describes.
    pub test_id: TestId,
    /// The grouping key: the suite-level description when present, else the
    /// owning class scope.
    pub suite_key: String,
    /// The classified outcome.
    pub outcome: Outcome,
    /// When this attempt started.
    pub start_time: DateTime<Local>,
    /// When this attempt stopped.
    pub stop_time: DateTime<Local>,
    /// How long this attempt took.
    pub elapsed: Duration,
    /// A short label extracted from the test's documentation.
    pub description: String,
    /// The procedure text: documentation before the `======` separator.
    pub step_text: String,
    /// The expected-result text: documentation after the separator.
    pub expected_text: String,
    /// Diagnostics, populated only for Failure and Error. For Skip the
    /// message field carries the skip reason.
    pub error: Option<ErrorDetail>,
    /// An opaque screenshot reference captured on failure, or empty.
    pub screenshot: String,
    /// How many prior attempts preceded this one.
    pub rerun_count: u32,
    /// Standard output captured during the attempt.
    pub stdout: String,
    /// Standard error captured during the attempt.
    pub stderr: String,
}

impl ResultRecord {
    /// The display name used by both reports: `description (method)`.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.description, self.test_id.method_name())
    }

    /// The full diagnostic text for the record, or the empty string.
    pub fn error_info(&self) -> &str {
        self.error.as_ref().map(|e| e.trace.as_str()).unwrap_or("")
    }
}

/// Splits a test's documentation into step and expected-result text.
///
/// The text up to and including the first newline is treated as a title and
/// dropped (a one-line doc is kept whole); the first run of six or more `=`
/// characters separates the procedure from the expected result. Without a
/// separator the whole remainder is the step text and the expected text is
/// empty. A missing doc behaves like the bare separator, yielding two empty
/// parts.
pub fn split_doc(doc: Option<&str>) -> (String, String) {
    let doc = match doc {
        Some(doc) if !doc.is_empty() => doc,
        _ => "======",
    };
    let body = match doc.split_once('\n') {
        Some((_title, rest)) => rest,
        None => doc,
    };
    match find_separator(body) {
        Some((start, len)) => {
            let step = &body[..start];
            let expected = body[start + len..].trim();
            (step.to_owned(), expected.to_owned())
        }
        None => (body.to_owned(), String::new()),
    }
}

/// Finds the first run of six or more `=` characters, returning its byte
/// offset and length.
fn find_separator(text: &str) -> Option<(usize, usize)> {
    let start = text.find("======")?;
    let len = text[start..]
        .bytes()
        .take_while(|&b| b == b'=')
        .count();
    Some((start, len))
}
