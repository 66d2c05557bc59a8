// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The templated HTML renderer.

use crate::{
    aggregator::{OutcomeCounts, SuiteGroups},
    config::RunnerConfig,
    errors::ReportError,
    store::RecordStore,
};
use camino::Utf8PathBuf;
use chrono::{DateTime, Local};
use std::{error, fmt::Write as _, fs, time::Duration};
use tracing::{debug, warn};

/// The fixed file name of the HTML report within the output directory.
pub const HTML_REPORT_FILE: &str = "report.html";

/// The bundled fallback template.
const DEFAULT_TEMPLATE: &str = include_str!("templates/report.html");

/// The values a template is rendered against.
///
/// Everything is pre-formatted text; `rows` is a pre-rendered HTML fragment
/// holding the result table body. Each row carries the record's display
/// name, class name, step detail, error message, expected-result text,
/// elapsed time to six decimals, rerun count, screenshot reference, and
/// outcome label, on a `tr` classed with the outcome's status keyword.
#[derive(Clone, Debug)]
pub struct HtmlReportData {
    /// The configured report title.
    pub title: String,
    /// The run's start time, formatted `%Y-%m-%d %H:%M:%S`.
    pub start_time: String,
    /// The run's wall-clock duration, formatted like `0:00:05.123456`.
    pub duration: String,
    /// The overall outcome summary, e.g. `Pass: 3, Fail: 1`.
    pub status: String,
    /// The number of reported results.
    pub total: String,
    /// The pre-rendered table body rows.
    pub rows: String,
}

/// The template-engine seam.
///
/// The bundled [`DefaultEngine`] does plain placeholder substitution; a
/// richer engine can be plugged into the harness without changing the
/// renderer.
pub trait TemplateEngine {
    /// Renders a template against the report data.
    fn render(
        &self,
        template: &str,
        data: &HtmlReportData,
    ) -> Result<String, Box<dyn error::Error + Send + Sync>>;
}

/// Substitutes `{{name}}` placeholders with the corresponding report field.
///
/// Unknown placeholders are left in place.
#[derive(Debug, Default)]
pub struct DefaultEngine;

impl TemplateEngine for DefaultEngine {
    fn render(
        &self,
        template: &str,
        data: &HtmlReportData,
    ) -> Result<String, Box<dyn error::Error + Send + Sync>> {
        let mut out = template.to_owned();
        for (name, value) in [
            ("{{title}}", data.title.as_str()),
            ("{{start_time}}", data.start_time.as_str()),
            ("{{duration}}", data.duration.as_str()),
            ("{{status}}", data.status.as_str()),
            ("{{total}}", data.total.as_str()),
            ("{{rows}}", data.rows.as_str()),
        ] {
            out = out.replace(name, value);
        }
        Ok(out)
    }
}

/// Builds the data a template is rendered against.
pub fn build_report_data(
    store: &RecordStore,
    config: &RunnerConfig,
    started_at: DateTime<Local>,
    elapsed: Duration,
) -> HtmlReportData {
    let groups = SuiteGroups::build(store);

    let mut totals = OutcomeCounts::default();
    let mut rows = String::new();
    for group in groups.iter() {
        let _ = writeln!(
            rows,
            "            <tr class=\"heading\"><td colspan=\"9\">{} &mdash; {}</td></tr>",
            escape(group.key),
            group.counts
        );
        for record in &group.records {
            let message = record
                .error
                .as_ref()
                .map(|error| escape(&error.message))
                .unwrap_or_default();
            let _ = writeln!(
                rows,
                "            <tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                 <td>{}</td><td>{:.6}s</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                record.outcome.status_keyword(),
                escape(&record.display_name()),
                escape(record.test_id.class_scope()),
                detail_cell(record),
                message,
                escape(&record.expected_text),
                record.elapsed.as_secs_f64(),
                record.rerun_count,
                escape(&record.screenshot),
                record.outcome.console_label()
            );
            totals.tally(record.outcome);
        }
    }

    let status = if totals.total() == 0 {
        "No tests run".to_owned()
    } else {
        totals.to_string()
    };

    HtmlReportData {
        title: config.report_title.clone(),
        start_time: started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        duration: format_timedelta(elapsed),
        status,
        total: totals.total().to_string(),
        rows,
    }
}

/// Renders the detail column: the step text, one line per `<br>`, and for a
/// non-pass the error kind appended.
fn detail_cell(record: &crate::record::ResultRecord) -> String {
    let mut cell = record
        .step_text
        .lines()
        .map(escape)
        .collect::<Vec<_>>()
        .join("<br>");
    if record.outcome.is_problem() {
        if let Some(error) = &record.error {
            let _ = write!(cell, "<br><b>ErrorType:</b>&nbsp;{}", escape(&error.kind));
        }
    }
    cell
}

/// Formats a duration the way a stringified Python `timedelta` reads, with
/// microseconds omitted when zero.
fn format_timedelta(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let micros = elapsed.subsec_micros();
    if micros == 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours}:{minutes:02}:{seconds:02}.{micros:06}")
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders and writes the HTML report, returning the path written.
///
/// A configured template that cannot be read falls back to the bundled one.
pub fn write_report(
    store: &RecordStore,
    config: &RunnerConfig,
    engine: &dyn TemplateEngine,
    started_at: DateTime<Local>,
    elapsed: Duration,
) -> Result<Utf8PathBuf, ReportError> {
    let template = match &config.template {
        Some(path) => match fs::read_to_string(path) {
            Ok(template) => template,
            Err(error) => {
                warn!(%path, %error, "could not read template, using the bundled one");
                DEFAULT_TEMPLATE.to_owned()
            }
        },
        None => DEFAULT_TEMPLATE.to_owned(),
    };

    let data = build_report_data(store, config, started_at, elapsed);
    let rendered = engine
        .render(&template, &data)
        .map_err(|error| ReportError::HtmlRender { error })?;

    let path = config.output.join(HTML_REPORT_FILE);
    fs::write(&path, rendered).map_err(|error| ReportError::Html {
        path: path.clone(),
        error,
    })?;
    debug!(%path, "wrote HTML report");
    Ok(path)
}
