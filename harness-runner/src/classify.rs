// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps a completed attempt into result records.

use crate::{
    events::{Execution, ExecutionOutcome, TestCase},
    record::{split_doc, ErrorDetail, Outcome, ResultRecord, TestId},
};
use chrono::{DateTime, Local};
use std::time::Duration;
use tracing::debug;

/// Timing taken by the tracker around one `execute` call.
#[derive(Copy, Clone, Debug)]
pub(crate) struct AttemptTiming {
    pub(crate) start: DateTime<Local>,
    pub(crate) stop: DateTime<Local>,
    pub(crate) elapsed: Duration,
}

/// The classifier's verdict on one attempt.
pub(crate) enum Classified {
    /// Records to accept, plus whether the attempt qualifies for a rerun.
    Records {
        records: Vec<ResultRecord>,
        rerun_eligible: bool,
    },
    /// Counted in the statistics only; never recorded, never rerun.
    ExpectedFailure,
    /// Counted in the statistics only; never recorded, never rerun.
    UnexpectedSuccess,
}

/// Classifies one attempt's execution into result records.
///
/// Sub-test errors each produce their own record under the sub-test's id,
/// always with the Error outcome regardless of the sub-test's own kind. A
/// Failure or Error outcome, or any sub-test error, makes the attempt
/// eligible for a rerun.
pub(crate) fn classify_attempt(
    test: &mut dyn TestCase,
    execution: Execution,
    timing: AttemptTiming,
    retry: u32,
) -> Classified {
    let Execution {
        outcome,
        sub_errors,
        stdout,
        stderr,
    } = execution;

    let meta = TestMeta::gather(test);
    let mut records = Vec::new();

    for sub_error in sub_errors {
        let detail = with_captures(sub_error.detail, &stdout, &stderr);
        let screenshot = capture_screenshot(test, &sub_error.id);
        records.push(meta.record(
            sub_error.id,
            Outcome::Error,
            Some(detail),
            screenshot,
            timing,
            retry,
            &stdout,
            &stderr,
        ));
    }

    match outcome {
        ExecutionOutcome::Success => {
            records.push(meta.record(
                meta.id.clone(),
                Outcome::Success,
                None,
                String::new(),
                timing,
                retry,
                &stdout,
                &stderr,
            ));
        }
        ExecutionOutcome::Failure(detail) => {
            let detail = with_captures(detail, &stdout, &stderr);
            let screenshot = capture_screenshot(test, &meta.id);
            records.push(meta.record(
                meta.id.clone(),
                Outcome::Failure,
                Some(detail),
                screenshot,
                timing,
                retry,
                &stdout,
                &stderr,
            ));
        }
        ExecutionOutcome::Error(detail) => {
            let detail = with_captures(detail, &stdout, &stderr);
            let screenshot = capture_screenshot(test, &meta.id);
            records.push(meta.record(
                meta.id.clone(),
                Outcome::Error,
                Some(detail),
                screenshot,
                timing,
                retry,
                &stdout,
                &stderr,
            ));
        }
        ExecutionOutcome::Skip(reason) => {
            let detail = ErrorDetail::new("skip", reason, "");
            records.push(meta.record(
                meta.id.clone(),
                Outcome::Skip,
                Some(detail),
                String::new(),
                timing,
                retry,
                &stdout,
                &stderr,
            ));
        }
        ExecutionOutcome::ExpectedFailure(_) => return Classified::ExpectedFailure,
        ExecutionOutcome::UnexpectedSuccess => return Classified::UnexpectedSuccess,
    }

    let rerun_eligible = records.iter().any(|r| r.outcome.is_problem());

    Classified::Records {
        records,
        rerun_eligible,
    }
}

/// Metadata gathered once per attempt from the test.
struct TestMeta {
    id: TestId,
    suite_key: String,
    description: String,
    step_text: String,
    expected_text: String,
}

impl TestMeta {
    fn gather(test: &mut dyn TestCase) -> Self {
        let id = test.id();
        let suite_key = match test.suite_doc() {
            Some(doc) if !doc.trim().is_empty() => doc.trim().to_owned(),
            _ => {
                let scope = id.class_scope();
                if scope.is_empty() {
                    id.as_str().to_owned()
                } else {
                    scope.to_owned()
                }
            }
        };
        let description = describe(test.doc(), &id);
        let (step_text, expected_text) = split_doc(test.doc());
        Self {
            id,
            suite_key,
            description,
            step_text,
            expected_text,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        test_id: TestId,
        outcome: Outcome,
        error: Option<ErrorDetail>,
        screenshot: String,
        timing: AttemptTiming,
        retry: u32,
        stdout: &str,
        stderr: &str,
    ) -> ResultRecord {
        ResultRecord {
            test_id,
            suite_key: self.suite_key.clone(),
            outcome,
            start_time: timing.start,
            stop_time: timing.stop,
            elapsed: timing.elapsed,
            description: self.description.clone(),
            step_text: self.step_text.clone(),
            expected_text: self.expected_text.clone(),
            error,
            screenshot,
            rerun_count: retry,
            stdout: stdout.to_owned(),
            stderr: stderr.to_owned(),
        }
    }
}

/// Derives the short test label from the documentation's first line.
///
/// A short source (fewer than three words) yields the first word, a longer
/// one the last. Tests without documentation fall back to
/// `method (class.scope)`.
fn describe(doc: Option<&str>, id: &TestId) -> String {
    let fallback;
    let source = match doc.map(|d| d.lines().next().unwrap_or("")) {
        Some(first_line) if !first_line.trim().is_empty() => first_line,
        _ => {
            fallback = format!("{} ({})", id.method_name(), id.class_scope());
            &fallback
        }
    };
    let words: Vec<&str> = source.split_whitespace().collect();
    let picked = if words.len() < 3 {
        words.first().copied()
    } else {
        words.last().copied()
    };
    picked.unwrap_or("").to_owned()
}

/// Appends non-empty captured output to the diagnostic trace as trailing
/// sections.
fn with_captures(mut detail: ErrorDetail, stdout: &str, stderr: &str) -> ErrorDetail {
    if !stdout.is_empty() {
        detail.trace.push_str("\nStdout:\n");
        detail.trace.push_str(stdout);
        if !stdout.ends_with('\n') {
            detail.trace.push('\n');
        }
    }
    if !stderr.is_empty() {
        detail.trace.push_str("\nStderr:\n");
        detail.trace.push_str(stderr);
        if !stderr.ends_with('\n') {
            detail.trace.push('\n');
        }
    }
    detail
}

/// Best-effort screenshot capture and session teardown.
///
/// A failing capture leaves the reference empty; a teardown failure keeps a
/// successful capture. Neither escalates past a debug log line.
fn capture_screenshot(test: &mut dyn TestCase, test_id: &TestId) -> String {
    let Some(driver) = test.driver() else {
        return String::new();
    };
    let screenshot = match driver.capture_screenshot() {
        Ok(reference) => reference,
        Err(error) => {
            debug!(%test_id, %error, "screenshot capture failed");
            String::new()
        }
    };
    if let Err(error) = driver.terminate_session() {
        debug!(%test_id, %error, "session teardown failed");
    }
    screenshot
}
