// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the harness.

use camino::Utf8PathBuf;
use std::{error, fmt, io};
use thiserror::Error;

/// An error produced while writing one of the reports.
///
/// Report writing is best-effort per renderer: a failing XML report does not
/// stop the HTML report from being attempted, so a run can surface several of
/// these at once.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The output directory could not be created.
    #[error("error creating output directory `{path}`")]
    CreateDir {
        /// The directory that could not be created.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The XML report could not be written to disk.
    #[error("error writing XML report to `{path}`")]
    Xml {
        /// The report file path.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The XML report could not be serialized.
    #[error("error serializing XML report for `{path}`")]
    XmlSerialize {
        /// The report file path.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: junit_writer::SerializeError,
    },

    /// The HTML report could not be written to disk.
    #[error("error writing HTML report to `{path}`")]
    Html {
        /// The report file path.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The template engine failed to render the HTML report.
    #[error("error rendering HTML report")]
    HtmlRender {
        /// The underlying error.
        #[source]
        error: Box<dyn error::Error + Send + Sync>,
    },
}

/// An error returned by a harness run.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Writing to the console failed.
    #[error("error writing to the console")]
    Console(#[from] io::Error),

    /// One or both reports could not be produced.
    ///
    /// The run itself completed; only report output was lost.
    #[error("{}", format_report_errors(.0))]
    Report(Vec<ReportError>),
}

fn format_report_errors(errors: &[ReportError]) -> String {
    let mut out = format!(
        "{} report error{} occurred",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
    for error in errors {
        out.push_str("\n  - ");
        out.push_str(&DisplayErrorChain(error).to_string());
    }
    out
}

/// Renders an error and its source chain on one line.
struct DisplayErrorChain<'a, E>(&'a E);

impl<'a, E: error::Error> fmt::Display for DisplayErrorChain<'a, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(error) = source {
            write!(f, ": {error}")?;
            source = error.source();
        }
        Ok(())
    }
}
