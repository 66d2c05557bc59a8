// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end runs through the harness: scripted tests, rerun handling, and
//! the files both reporters write.

use camino_tempfile::Utf8TempDir;
use harness_runner::{
    Driver, DriverError, ErrorDetail, Execution, ExecutionOutcome, Outcome, OutSuffix,
    RunnerConfig, SubTestError, Suite, TestCase, TestHarness, TestId,
};
use pretty_assertions::assert_eq;
use std::fs;

/// A driver that records how it was used and can be told to fail capture.
#[derive(Default)]
struct FakeDriver {
    captures: u32,
    terminations: u32,
    fail_capture: bool,
}

impl Driver for FakeDriver {
    fn capture_screenshot(&mut self) -> Result<String, DriverError> {
        self.captures += 1;
        if self.fail_capture {
            return Err("capture failed".into());
        }
        Ok(format!("shots/capture-{}.png", self.captures))
    }

    fn terminate_session(&mut self) -> Result<(), DriverError> {
        self.terminations += 1;
        Ok(())
    }
}

/// A test that replays a scripted sequence of executions, one per attempt.
struct ScriptedTest {
    id: &'static str,
    doc: Option<&'static str>,
    suite_doc: Option<&'static str>,
    script: Vec<Execution>,
    attempts: usize,
    driver: Option<FakeDriver>,
}

impl ScriptedTest {
    fn new(id: &'static str, script: Vec<Execution>) -> Self {
        Self {
            id,
            doc: None,
            suite_doc: None,
            script,
            attempts: 0,
            driver: None,
        }
    }

    fn with_doc(mut self, doc: &'static str) -> Self {
        self.doc = Some(doc);
        self
    }

    fn with_suite_doc(mut self, suite_doc: &'static str) -> Self {
        self.suite_doc = Some(suite_doc);
        self
    }

    fn with_driver(mut self, driver: FakeDriver) -> Self {
        self.driver = Some(driver);
        self
    }
}

impl TestCase for ScriptedTest {
    fn id(&self) -> TestId {
        TestId::new(self.id)
    }

    fn doc(&self) -> Option<&str> {
        self.doc
    }

    fn suite_doc(&self) -> Option<&str> {
        self.suite_doc
    }

    fn driver(&mut self) -> Option<&mut dyn Driver> {
        self.driver.as_mut().map(|d| d as &mut dyn Driver)
    }

    fn execute(&mut self) -> Execution {
        let execution = self.script[self.attempts.min(self.script.len() - 1)].clone();
        self.attempts += 1;
        execution
    }
}

fn failure(message: &str) -> Execution {
    Execution::new(ExecutionOutcome::Failure(ErrorDetail::new(
        "AssertionError",
        message,
        format!("Traceback (most recent call last):\n{message}"),
    )))
}

fn success() -> Execution {
    Execution::new(ExecutionOutcome::Success)
}

fn harness(dir: &Utf8TempDir, rerun: u32) -> TestHarness {
    TestHarness::new(
        RunnerConfig::new()
            .output(dir.path().join("Results"))
            .outsuffix(OutSuffix::Empty)
            .rerun(rerun)
            .verbosity(0),
    )
}

#[test]
fn flaky_test_recovers_within_budget() {
    let dir = Utf8TempDir::new().expect("tempdir");
    let mut suite = Suite::new();
    suite.add_test(
        ScriptedTest::new(
            "__main__.UserGUI.test_U0001",
            vec![failure("first"), failure("second"), success()],
        )
        .with_doc("Login works"),
    );

    let report = harness(&dir, 2).run(&mut suite).expect("run succeeds");

    assert_eq!(report.stats.tests_run, 1);
    assert_eq!(report.stats.passed, 1);
    assert_eq!(report.stats.failed, 0);
    assert!(report.success());

    // All three attempts stay in the arena; only the last is accepted.
    assert_eq!(report.store.attempt_count(), 3);
    assert_eq!(report.store.len(), 1);
    let accepted = report
        .store
        .current_for(&TestId::new("__main__.UserGUI.test_U0001"))
        .expect("accepted record");
    assert_eq!(accepted.outcome, Outcome::Success);
    assert_eq!(accepted.rerun_count, 2);
}

#[test]
fn persistent_failure_exhausts_budget() {
    let dir = Utf8TempDir::new().expect("tempdir");
    let mut suite = Suite::new();
    suite.add_test(ScriptedTest::new(
        "__main__.UserGUI.test_U0002",
        vec![failure("broken")],
    ));

    let report = harness(&dir, 2).run(&mut suite).expect("run succeeds");

    assert_eq!(report.stats.tests_run, 1);
    assert_eq!(report.stats.failed, 1);
    assert!(!report.success());
    assert_eq!(report.store.attempt_count(), 3);
    let accepted = report
        .store
        .current_for(&TestId::new("__main__.UserGUI.test_U0002"))
        .expect("accepted record");
    assert_eq!(accepted.rerun_count, 2);
}

#[test]
fn skip_on_rerun_supersedes_the_failure() {
    let dir = Utf8TempDir::new().expect("tempdir");
    let mut suite = Suite::new();
    suite.add_test(ScriptedTest::new(
        "__main__.UserGUI.test_U0003",
        vec![
            failure("flaky"),
            Execution::new(ExecutionOutcome::Skip("environment gone".to_owned())),
        ],
    ));

    let report = harness(&dir, 3).run(&mut suite).expect("run succeeds");

    // The skip is not rerun-eligible, so the loop stops there.
    assert_eq!(report.store.attempt_count(), 2);
    assert_eq!(report.stats.skipped, 1);
    assert_eq!(report.stats.failed, 0);
}

#[test]
fn screenshot_captured_and_session_terminated_on_failure() {
    let dir = Utf8TempDir::new().expect("tempdir");
    let mut suite = Suite::new();
    suite.add_test(
        ScriptedTest::new("__main__.UserGUI.test_U0004", vec![failure("boom")])
            .with_driver(FakeDriver::default()),
    );

    let report = harness(&dir, 0).run(&mut suite).expect("run succeeds");
    let accepted = report
        .store
        .current_for(&TestId::new("__main__.UserGUI.test_U0004"))
        .expect("accepted record");
    assert_eq!(accepted.screenshot, "shots/capture-1.png");
}

#[test]
fn failed_capture_leaves_the_reference_empty() {
    let dir = Utf8TempDir::new().expect("tempdir");
    let mut suite = Suite::new();
    suite.add_test(
        ScriptedTest::new("__main__.UserGUI.test_U0005", vec![failure("boom")]).with_driver(
            FakeDriver {
                fail_capture: true,
                ..FakeDriver::default()
            },
        ),
    );

    let report = harness(&dir, 0).run(&mut suite).expect("run succeeds");
    let accepted = report
        .store
        .current_for(&TestId::new("__main__.UserGUI.test_U0005"))
        .expect("accepted record");
    assert_eq!(accepted.screenshot, "");
}

#[test]
fn sub_test_errors_get_their_own_records_and_trigger_reruns() {
    let dir = Utf8TempDir::new().expect("tempdir");
    let with_sub_error = Execution::new(ExecutionOutcome::Success).with_sub_error(SubTestError {
        id: TestId::new("__main__.UserGUI.test_U0006 (case=1)"),
        detail: ErrorDetail::new("AssertionError", "sub failed", "trace"),
    });
    let mut suite = Suite::new();
    suite.add_test(ScriptedTest::new(
        "__main__.UserGUI.test_U0006",
        vec![with_sub_error, success()],
    ));

    let report = harness(&dir, 1).run(&mut suite).expect("run succeeds");

    // First attempt: a sub-test error record plus the owning test's success.
    // The rerun supersedes the owning record; the sub-test record from the
    // first attempt keeps its identity.
    assert_eq!(report.store.attempt_count(), 3);
    let sub = report
        .store
        .current_for(&TestId::new("__main__.UserGUI.test_U0006 (case=1)"))
        .expect("sub-test record");
    assert_eq!(sub.outcome, Outcome::Error);
    let main = report
        .store
        .current_for(&TestId::new("__main__.UserGUI.test_U0006"))
        .expect("main record");
    assert_eq!(main.outcome, Outcome::Success);
    assert_eq!(main.rerun_count, 1);
}

#[test]
fn expected_failures_count_but_leave_no_records() {
    let dir = Utf8TempDir::new().expect("tempdir");
    let mut suite = Suite::new();
    suite.add_test(ScriptedTest::new(
        "__main__.UserGUI.test_U0007",
        vec![Execution::new(ExecutionOutcome::ExpectedFailure(
            ErrorDetail::new("AssertionError", "known issue", "trace"),
        ))],
    ));
    suite.add_test(ScriptedTest::new(
        "__main__.UserGUI.test_U0008",
        vec![Execution::new(ExecutionOutcome::UnexpectedSuccess)],
    ));

    let report = harness(&dir, 2).run(&mut suite).expect("run succeeds");

    assert_eq!(report.stats.tests_run, 2);
    assert_eq!(report.stats.expected_failures, 1);
    assert_eq!(report.stats.unexpected_successes, 1);
    assert!(report.store.is_empty());
    // Neither outcome is rerun, even with budget available.
    assert_eq!(report.store.attempt_count(), 0);
}

#[test]
fn both_report_files_are_written() {
    let dir = Utf8TempDir::new().expect("tempdir");
    let mut suite = Suite::new();
    suite.add_test(
        ScriptedTest::new("__main__.UserGUI.test_0001_login", vec![success()])
            .with_doc("Login test\n1. open the page\n======\nthe page loads")
            .with_suite_doc("User interface"),
    );
    suite.add_test(ScriptedTest::new(
        "__main__.UserGUI.test_0002_logout",
        vec![failure("logout broken")],
    ));

    let report = harness(&dir, 0).run(&mut suite).expect("run succeeds");

    let xml_path = report.xml_path.expect("xml path");
    let html_path = report.html_path.expect("html path");
    assert_eq!(xml_path.file_name(), Some("output.xml"));
    assert_eq!(html_path.file_name(), Some("report.html"));

    let xml = fs::read_to_string(&xml_path).expect("read xml");
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<testsuite name=\"User interface\""));
    assert!(xml.contains("<testsuite name=\"UserGUI\""));
    assert!(xml.contains("status=\"PASS\""));
    assert!(xml.contains("status=\"FAIL\""));
    assert!(xml.contains("type=\"AssertionError\""));

    let html = fs::read_to_string(&html_path).expect("read html");
    assert!(html.contains("<tr class=\"success\">"));
    assert!(html.contains("<tr class=\"danger\">"));
    assert!(html.contains("Test Report"));
}

#[test]
fn suite_names_carry_the_literal_suffix() {
    let dir = Utf8TempDir::new().expect("tempdir");
    let mut suite = Suite::new();
    suite.add_test(ScriptedTest::new(
        "__main__.UserGUI.test_0001_login",
        vec![success()],
    ));

    let harness = TestHarness::new(
        RunnerConfig::new()
            .output(dir.path().join("Results"))
            .outsuffix(OutSuffix::Literal("build42".to_owned()))
            .verbosity(0),
    );
    let report = harness.run(&mut suite).expect("run succeeds");

    let xml = fs::read_to_string(report.xml_path.expect("xml path")).expect("read xml");
    assert!(xml.contains("<testsuite name=\"UserGUI-build42\""));
}

#[test]
fn cdata_terminator_in_a_trace_stays_well_formed() {
    let dir = Utf8TempDir::new().expect("tempdir");
    let mut suite = Suite::new();
    suite.add_test(ScriptedTest::new(
        "__main__.UserGUI.test_U0009",
        vec![Execution::new(ExecutionOutcome::Error(ErrorDetail::new(
            "ValueError",
            "bad payload",
            "payload contained ]]> mid-stream",
        )))],
    ));

    let report = harness(&dir, 0).run(&mut suite).expect("run succeeds");
    let xml = fs::read_to_string(report.xml_path.expect("xml path")).expect("read xml");
    assert!(!xml.contains("payload contained ]]> mid-stream"));
    assert!(xml.contains("]]]]><![CDATA[>"));
}

#[test]
fn empty_suite_still_produces_reports() {
    let dir = Utf8TempDir::new().expect("tempdir");
    let mut suite = Suite::new();

    let report = harness(&dir, 0).run(&mut suite).expect("run succeeds");

    assert_eq!(report.stats.tests_run, 0);
    assert!(report.success());
    let xml = fs::read_to_string(report.xml_path.expect("xml path")).expect("read xml");
    assert!(xml.contains("tests=\"0\""));
    let html = fs::read_to_string(report.html_path.expect("html path")).expect("read html");
    assert!(html.contains("No tests run"));
}

#[test]
fn captured_output_lands_in_the_suite_and_the_trace() {
    let dir = Utf8TempDir::new().expect("tempdir");
    let mut suite = Suite::new();
    suite.add_test(ScriptedTest::new(
        "__main__.UserGUI.test_U0010",
        vec![failure("boom").with_output("stdout line\n", "stderr line\n")],
    ));

    let report = harness(&dir, 0).run(&mut suite).expect("run succeeds");

    let accepted = report
        .store
        .current_for(&TestId::new("__main__.UserGUI.test_U0010"))
        .expect("accepted record");
    let error = accepted.error.as_ref().expect("error detail");
    assert!(error.trace.contains("\nStdout:\nstdout line\n"));
    assert!(error.trace.contains("\nStderr:\nstderr line\n"));

    let xml = fs::read_to_string(report.xml_path.expect("xml path")).expect("read xml");
    assert!(xml.contains("<system-out>"));
    assert!(xml.contains("<system-err>"));
}

#[test]
fn custom_template_engine_is_used() {
    struct FixedEngine;
    impl harness_runner::reporter::html::TemplateEngine for FixedEngine {
        fn render(
            &self,
            _template: &str,
            data: &harness_runner::reporter::html::HtmlReportData,
        ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            Ok(format!("custom:{}", data.total))
        }
    }

    let dir = Utf8TempDir::new().expect("tempdir");
    let mut suite = Suite::new();
    suite.add_test(ScriptedTest::new(
        "__main__.UserGUI.test_U0011",
        vec![success()],
    ));

    let harness = TestHarness::with_engine(
        RunnerConfig::new()
            .output(dir.path().join("Results"))
            .verbosity(0),
        Box::new(FixedEngine),
    );
    let report = harness.run(&mut suite).expect("run succeeds");
    let html = fs::read_to_string(report.html_path.expect("html path")).expect("read html");
    assert_eq!(html, "custom:1");
}
