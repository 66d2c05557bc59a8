// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run configuration.

use camino::Utf8PathBuf;
use chrono::{DateTime, Local};

/// The suffix appended to per-suite names in the XML report.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum OutSuffix {
    /// Use the run's start time, formatted `%Y%m%d%H%M%S`.
    #[default]
    Timestamp,
    /// No suffix.
    Empty,
    /// A fixed literal suffix.
    Literal(String),
}

impl OutSuffix {
    pub(crate) fn resolve(&self, started_at: DateTime<Local>) -> String {
        match self {
            OutSuffix::Timestamp => started_at.format("%Y%m%d%H%M%S").to_string(),
            OutSuffix::Empty => String::new(),
            OutSuffix::Literal(suffix) => suffix.clone(),
        }
    }
}

/// Configuration for a [`TestHarness`](crate::runner::TestHarness) run.
///
/// Both report files are always written UTF-8 encoded; the encoding is not
/// configurable.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// The directory both reports are written to, created if absent.
    pub output: Utf8PathBuf,

    /// The suffix appended to suite names in the XML report.
    pub outsuffix: OutSuffix,

    /// The rerun budget: how many additional attempts a failing test gets.
    /// Zero disables reruns.
    pub rerun: u32,

    /// The title used for both reports.
    pub report_title: String,

    /// A custom HTML template path. A missing or unreadable template falls
    /// back to the bundled default.
    pub template: Option<Utf8PathBuf>,

    /// When false, recorded elapsed times are forced to zero so repeated
    /// runs produce comparable reports.
    pub elapsed_times: bool,

    /// Console verbosity: 0 is quiet, 1 prints a dot per test, 2 and above
    /// print a line per attempt.
    pub verbosity: u8,

    /// Whether tracebacks include local variables. Presentation-only; the
    /// execution mechanism decides what its traces contain.
    pub tb_locals: bool,

    /// JUnit suite properties, emitted into every `testsuite` element.
    pub properties: Vec<(String, String)>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            output: Utf8PathBuf::from("Results"),
            outsuffix: OutSuffix::default(),
            rerun: 0,
            report_title: "Test Report".to_owned(),
            template: None,
            elapsed_times: true,
            verbosity: 1,
            tb_locals: false,
            properties: vec![],
        }
    }
}

impl RunnerConfig {
    /// Creates a configuration with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output directory.
    pub fn output(mut self, output: impl Into<Utf8PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Sets the suite-name suffix behavior.
    pub fn outsuffix(mut self, outsuffix: OutSuffix) -> Self {
        self.outsuffix = outsuffix;
        self
    }

    /// Sets the rerun budget.
    pub fn rerun(mut self, rerun: u32) -> Self {
        self.rerun = rerun;
        self
    }

    /// Sets the report title.
    pub fn report_title(mut self, title: impl Into<String>) -> Self {
        self.report_title = title.into();
        self
    }

    /// Sets a custom HTML template path.
    pub fn template(mut self, template: impl Into<Utf8PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Enables or disables elapsed-time recording.
    pub fn elapsed_times(mut self, elapsed_times: bool) -> Self {
        self.elapsed_times = elapsed_times;
        self
    }

    /// Sets the console verbosity.
    pub fn verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Sets whether tracebacks should include local variables.
    pub fn tb_locals(mut self, tb_locals: bool) -> Self {
        self.tb_locals = tb_locals;
        self
    }

    /// Adds a JUnit suite property.
    pub fn property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }
}
