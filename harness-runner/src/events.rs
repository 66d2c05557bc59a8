// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The execution-mechanism seam: tests, attempts, and their outcomes.
//!
//! The harness does not run browsers or processes itself. It drives
//! [`TestCase`] implementations, each of which executes one attempt and
//! reports a tagged [`ExecutionOutcome`] instead of signalling through
//! raised exceptions.

use crate::{driver::Driver, record::ErrorDetail, record::TestId};

/// The terminal outcome of one execution attempt.
#[derive(Clone, Debug)]
pub enum ExecutionOutcome {
    /// The test passed.
    Success,
    /// The test failed an assertion.
    Failure(ErrorDetail),
    /// The test raised an unexpected error.
    Error(ErrorDetail),
    /// The test was skipped, with a reason.
    Skip(String),
    /// The test failed in a way it was marked as expected to fail.
    ///
    /// Counted in the run statistics but never recorded in the reports and
    /// never rerun.
    ExpectedFailure(ErrorDetail),
    /// A test marked as expected-to-fail passed.
    ///
    /// Counted in the run statistics but never recorded in the reports and
    /// never rerun.
    UnexpectedSuccess,
}

/// An error reported for a single sub-test within an attempt.
#[derive(Clone, Debug)]
pub struct SubTestError {
    /// The sub-test's own identity, distinct from the owning test's id.
    pub id: TestId,
    /// The diagnostics for the sub-test.
    pub detail: ErrorDetail,
}

/// Everything one attempt produced: the terminal outcome, any sub-test
/// errors raised along the way, and the captured output streams.
#[derive(Clone, Debug)]
pub struct Execution {
    /// The terminal outcome of the attempt.
    pub outcome: ExecutionOutcome,
    /// Sub-test errors reported during the attempt.
    pub sub_errors: Vec<SubTestError>,
    /// Standard output captured during the attempt.
    pub stdout: String,
    /// Standard error captured during the attempt.
    pub stderr: String,
}

impl Execution {
    /// Creates an execution result with no sub-test errors or output.
    pub fn new(outcome: ExecutionOutcome) -> Self {
        Self {
            outcome,
            sub_errors: vec![],
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Attaches captured output streams.
    pub fn with_output(mut self, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self.stderr = stderr.into();
        self
    }

    /// Attaches a sub-test error.
    pub fn with_sub_error(mut self, sub_error: SubTestError) -> Self {
        self.sub_errors.push(sub_error);
        self
    }
}

/// A single runnable test known to the harness.
///
/// One `execute` call is one attempt; the harness takes start and stop
/// times around the call and re-invokes it for reruns.
pub trait TestCase {
    /// The dotted `suite.class.method` identity of this test.
    fn id(&self) -> TestId;

    /// The test method's documentation, used for the description and the
    /// step/expected split.
    fn doc(&self) -> Option<&str> {
        None
    }

    /// The suite-level description, used as the grouping key when present.
    fn suite_doc(&self) -> Option<&str> {
        None
    }

    /// The automation driver tied to this test, used for best-effort
    /// screenshot capture and session teardown on failure.
    fn driver(&mut self) -> Option<&mut dyn Driver> {
        None
    }

    /// Executes one attempt of this test.
    fn execute(&mut self) -> Execution;
}

/// An ordered collection of tests to run.
#[derive(Default)]
pub struct Suite {
    tests: Vec<Box<dyn TestCase>>,
}

impl Suite {
    /// Creates an empty suite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a test to the suite.
    pub fn add_test(&mut self, test: impl TestCase + 'static) -> &mut Self {
        self.tests.push(Box::new(test));
        self
    }

    /// Appends several boxed tests to the suite.
    pub fn add_tests(&mut self, tests: impl IntoIterator<Item = Box<dyn TestCase>>) -> &mut Self {
        self.tests.extend(tests);
        self
    }

    /// The number of tests in the suite.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// True if the suite holds no tests.
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub(crate) fn tests_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn TestCase>> {
        self.tests.iter_mut()
    }
}
