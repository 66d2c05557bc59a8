// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The harness entry point: runs a suite, tracks results, reruns failures,
//! and writes both reports.

use crate::{
    classify::{classify_attempt, AttemptTiming, Classified},
    config::RunnerConfig,
    console::ConsoleReporter,
    errors::{HarnessError, ReportError},
    events::{Suite, TestCase},
    record::{Outcome, TestId},
    reporter::{html, html::TemplateEngine, junit},
    store::RecordStore,
};
use camino::Utf8PathBuf;
use chrono::{DateTime, Local};
use std::{
    fs,
    time::{Duration, Instant},
};
use tracing::info;

/// Aggregate counters over one run.
///
/// `tests_run` counts each test once regardless of reruns; the outcome
/// counters reflect the finally accepted record of each test.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunStats {
    /// The number of tests run, reruns not included.
    pub tests_run: usize,
    /// Tests whose accepted record passed.
    pub passed: usize,
    /// Tests whose accepted record failed.
    pub failed: usize,
    /// Tests whose accepted record errored.
    pub errored: usize,
    /// Tests whose accepted record was skipped.
    pub skipped: usize,
    /// Tests that failed as expected. Not recorded in the reports.
    pub expected_failures: usize,
    /// Expected-to-fail tests that passed. Not recorded in the reports.
    pub unexpected_successes: usize,
}

/// The outcome of a completed run.
#[derive(Debug)]
pub struct RunReport {
    /// Aggregate counters for the run.
    pub stats: RunStats,
    /// When the run started.
    pub started_at: DateTime<Local>,
    /// Wall-clock duration of the run. Zero when elapsed-time recording is
    /// disabled.
    pub elapsed: Duration,
    /// Every attempt's record, with supersession applied.
    pub store: RecordStore,
    /// The XML report path, if it was written.
    pub xml_path: Option<Utf8PathBuf>,
    /// The HTML report path, if it was written.
    pub html_path: Option<Utf8PathBuf>,
}

impl RunReport {
    /// True when no accepted record failed or errored.
    pub fn success(&self) -> bool {
        self.stats.failed == 0 && self.stats.errored == 0
    }
}

/// Runs suites and renders their reports.
pub struct TestHarness {
    config: RunnerConfig,
    engine: Box<dyn TemplateEngine>,
}

impl TestHarness {
    /// Creates a harness using the bundled template engine.
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            engine: Box::new(html::DefaultEngine),
        }
    }

    /// Creates a harness with a custom template engine for the HTML report.
    pub fn with_engine(config: RunnerConfig, engine: Box<dyn TemplateEngine>) -> Self {
        Self { config, engine }
    }

    /// The harness configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs every test in the suite and writes both reports.
    ///
    /// Tests whose attempt fails or errors are re-executed up to the
    /// configured rerun budget; a later attempt's records supersede the
    /// earlier attempt's. Both reports are attempted even if one fails;
    /// report failures are collected into
    /// [`HarnessError::Report`](crate::errors::HarnessError::Report).
    pub fn run(&self, suite: &mut Suite) -> Result<RunReport, HarnessError> {
        let started_at = Local::now();
        let timer = Instant::now();
        let console = ConsoleReporter::new(self.config.verbosity);
        let mut store = RecordStore::new();
        let mut stats = RunStats::default();

        info!(
            tests = suite.len(),
            rerun = self.config.rerun,
            "starting run"
        );

        for test in suite.tests_mut() {
            self.run_test(test.as_mut(), &console, &mut store, &mut stats)?;
        }

        stats.passed = store.count(Outcome::Success);
        stats.failed = store.count(Outcome::Failure);
        stats.errored = store.count(Outcome::Error);
        stats.skipped = store.count(Outcome::Skip);

        let elapsed = if self.config.elapsed_times {
            timer.elapsed()
        } else {
            Duration::ZERO
        };

        console.summary(&store, &stats, elapsed)?;
        info!(
            tests_run = stats.tests_run,
            failed = stats.failed,
            errored = stats.errored,
            "run finished"
        );

        let mut report_errors = Vec::new();
        let mut html_path = None;
        let mut xml_path = None;
        match fs::create_dir_all(&self.config.output) {
            Err(error) => report_errors.push(ReportError::CreateDir {
                path: self.config.output.clone(),
                error,
            }),
            Ok(()) => {
                match html::write_report(
                    &store,
                    &self.config,
                    self.engine.as_ref(),
                    started_at,
                    elapsed,
                ) {
                    Ok(path) => html_path = Some(path),
                    Err(error) => report_errors.push(error),
                }
                match junit::write_report(&store, &self.config, started_at) {
                    Ok(path) => xml_path = Some(path),
                    Err(error) => report_errors.push(error),
                }
            }
        }

        if !report_errors.is_empty() {
            return Err(HarnessError::Report(report_errors));
        }

        Ok(RunReport {
            stats,
            started_at,
            elapsed,
            store,
            xml_path,
            html_path,
        })
    }

    /// Runs one test through its attempt loop.
    fn run_test(
        &self,
        test: &mut dyn TestCase,
        console: &ConsoleReporter,
        store: &mut RecordStore,
        stats: &mut RunStats,
    ) -> Result<(), HarnessError> {
        let budget = self.config.rerun;
        let mut retry = 0u32;
        loop {
            let start = Local::now();
            let attempt_timer = Instant::now();
            let execution = test.execute();
            let (elapsed, stop) = if self.config.elapsed_times {
                (attempt_timer.elapsed(), Local::now())
            } else {
                (Duration::ZERO, start)
            };
            let timing = AttemptTiming {
                start,
                stop,
                elapsed,
            };

            if retry == 0 {
                stats.tests_run += 1;
            }

            match classify_attempt(test, execution, timing, retry) {
                Classified::ExpectedFailure => {
                    stats.expected_failures += 1;
                    console.report_expected_failure(&id_display(&test.id()))?;
                    return Ok(());
                }
                Classified::UnexpectedSuccess => {
                    stats.unexpected_successes += 1;
                    console.report_unexpected_success(&id_display(&test.id()))?;
                    return Ok(());
                }
                Classified::Records {
                    records,
                    rerun_eligible,
                } => {
                    for record in records {
                        console.report_record(&record)?;
                        store.accept(record);
                    }
                    if rerun_eligible && retry < budget {
                        retry += 1;
                        let display = id_display(&test.id());
                        console.report_rerun(&display, retry, budget)?;
                        info!(test = %test.id(), retry, budget, "retrying failed test");
                        continue;
                    }
                    return Ok(());
                }
            }
        }
    }
}

fn id_display(id: &TestId) -> String {
    format!("{} ({})", id.method_name(), id.class_scope())
}
