// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live console output for a run.

use crate::{
    record::{Outcome, ResultRecord},
    runner::RunStats,
    store::RecordStore,
};
use std::{io, io::Write, time::Duration};
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

const SEPARATOR_HEAVY: &str =
    "======================================================================";
const SEPARATOR_LIGHT: &str =
    "----------------------------------------------------------------------";

pub(crate) struct ConsoleReporter {
    stdout: BufferWriter,
    verbosity: u8,
}

impl ConsoleReporter {
    pub(crate) fn new(verbosity: u8) -> Self {
        Self {
            stdout: BufferWriter::stdout(ColorChoice::Auto),
            verbosity,
        }
    }

    /// Reports one accepted record: a dot at verbosity 1, a line at 2 and
    /// above.
    pub(crate) fn report_record(&self, record: &ResultRecord) -> io::Result<()> {
        if self.verbosity == 0 {
            return Ok(());
        }
        let mut buffer = self.stdout.buffer();
        let spec = outcome_spec(record.outcome);
        if self.verbosity == 1 {
            buffer.set_color(&spec)?;
            write!(buffer, "{}", outcome_dot(record.outcome))?;
            buffer.reset()?;
        } else {
            write!(buffer, "{} ... ", record.display_name())?;
            buffer.set_color(&spec)?;
            write!(buffer, "{}", record.outcome.console_label())?;
            buffer.reset()?;
            writeln!(buffer)?;
        }
        self.stdout.print(&buffer)
    }

    pub(crate) fn report_expected_failure(&self, display: &str) -> io::Result<()> {
        self.report_special(display, 'x', "expected failure")
    }

    pub(crate) fn report_unexpected_success(&self, display: &str) -> io::Result<()> {
        self.report_special(display, 'u', "unexpected success")
    }

    fn report_special(&self, display: &str, dot: char, label: &str) -> io::Result<()> {
        if self.verbosity == 0 {
            return Ok(());
        }
        let mut buffer = self.stdout.buffer();
        if self.verbosity == 1 {
            write!(buffer, "{dot}")?;
        } else {
            writeln!(buffer, "{display} ... {label}")?;
        }
        self.stdout.print(&buffer)
    }

    pub(crate) fn report_rerun(&self, display: &str, retry: u32, budget: u32) -> io::Result<()> {
        if self.verbosity < 2 {
            return Ok(());
        }
        let mut buffer = self.stdout.buffer();
        writeln!(buffer, "Retrying {display} (attempt {retry} of {budget})")?;
        self.stdout.print(&buffer)
    }

    /// Prints the problem list and the closing summary.
    pub(crate) fn summary(
        &self,
        store: &RecordStore,
        stats: &RunStats,
        elapsed: Duration,
    ) -> io::Result<()> {
        let mut buffer = self.stdout.buffer();
        if self.verbosity > 0 {
            writeln!(buffer)?;
        }

        for record in store.current() {
            let label = match record.outcome {
                Outcome::Failure => "FAIL",
                Outcome::Error => "ERROR",
                _ => continue,
            };
            writeln!(buffer, "{SEPARATOR_HEAVY}")?;
            buffer.set_color(&outcome_spec(record.outcome))?;
            write!(buffer, "{label}")?;
            buffer.reset()?;
            writeln!(buffer, ": {}", record.display_name())?;
            writeln!(buffer, "{SEPARATOR_LIGHT}")?;
            if let Some(error) = &record.error {
                writeln!(buffer, "{}", error.trace.trim_end())?;
            }
            writeln!(buffer)?;
        }

        writeln!(buffer, "{SEPARATOR_LIGHT}")?;
        let plural = if stats.tests_run == 1 { "" } else { "s" };
        writeln!(
            buffer,
            "Ran {} test{plural} in {:.3}s",
            stats.tests_run,
            elapsed.as_secs_f64()
        )?;
        writeln!(buffer)?;

        let details = summary_details(stats);

        if stats.failed > 0 || stats.errored > 0 {
            buffer.set_color(&bold(Color::Red))?;
            write!(buffer, "FAILED")?;
        } else {
            buffer.set_color(&bold(Color::Green))?;
            write!(buffer, "OK")?;
        }
        buffer.reset()?;
        if details.is_empty() {
            writeln!(buffer)?;
        } else {
            writeln!(buffer, " ({})", details.join(", "))?;
        }
        self.stdout.print(&buffer)
    }
}

/// The parenthesized summary entries, zero counts omitted.
fn summary_details(stats: &RunStats) -> Vec<String> {
    let mut details = Vec::new();
    if stats.failed > 0 {
        details.push(format!("Failures={}", stats.failed));
    }
    if stats.errored > 0 {
        details.push(format!("Errors={}", stats.errored));
    }
    if stats.skipped > 0 {
        details.push(format!("Skipped={}", stats.skipped));
    }
    if stats.expected_failures > 0 {
        details.push(format!("expected failures={}", stats.expected_failures));
    }
    if stats.unexpected_successes > 0 {
        details.push(format!("unexpected successes={}", stats.unexpected_successes));
    }
    details
}

fn outcome_dot(outcome: Outcome) -> char {
    match outcome {
        Outcome::Success => '.',
        Outcome::Failure => 'F',
        Outcome::Error => 'E',
        Outcome::Skip => 'S',
    }
}

fn outcome_spec(outcome: Outcome) -> ColorSpec {
    match outcome {
        Outcome::Success => bold(Color::Green),
        Outcome::Failure | Outcome::Error => bold(Color::Red),
        Outcome::Skip => bold(Color::Yellow),
    }
}

fn bold(color: Color) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_bold(true);
    spec
}
