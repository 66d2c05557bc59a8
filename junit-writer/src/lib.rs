// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generate JUnit-style XML reports for UI test runs.
//!
//! The data model mirrors the classic `testsuites`/`testsuite`/`testcase`
//! tree, extended with the attributes the harness records per test: start
//! and stop timestamps, rerun count, screenshot reference, and the
//! step/expected text parsed from the test's documentation.

mod errors;
mod report;
mod serialize;

pub use errors::*;
pub use report::*;
