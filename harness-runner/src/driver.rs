// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The automation-driver seam.

/// Errors surfaced by a [`Driver`].
///
/// Driver failures during outcome classification are best-effort and are
/// never propagated past the classifier.
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

/// The narrow interface the harness needs from the automation library.
///
/// Both operations are invoked only while classifying a Failure or Error
/// outcome, and both are best-effort: a failing capture leaves the record's
/// screenshot reference empty.
pub trait Driver {
    /// Captures a screenshot of the current session, returning an opaque
    /// reference to it (typically a file path).
    fn capture_screenshot(&mut self) -> Result<String, DriverError>;

    /// Terminates the automation session backing the test.
    fn terminate_session(&mut self) -> Result<(), DriverError>;
}
