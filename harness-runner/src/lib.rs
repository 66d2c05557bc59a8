// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Execution tracking and report generation for UI test-automation suites.
//!
//! The harness drives a suite of [`TestCase`](events::TestCase)
//! implementations one at a time, classifies each outcome into a
//! [`ResultRecord`](record::ResultRecord), re-runs failing tests within a
//! bounded retry budget (superseding the earlier attempt's record), and
//! renders the final results as a JUnit-style XML report and a templated
//! HTML report from the same aggregated data.

pub mod aggregator;
mod classify;
pub mod config;
mod console;
pub mod driver;
pub mod errors;
pub mod events;
pub mod record;
pub mod reporter;
pub mod runner;
pub mod store;

pub use config::{OutSuffix, RunnerConfig};
pub use driver::{Driver, DriverError};
pub use errors::{HarnessError, ReportError};
pub use events::{Execution, ExecutionOutcome, Suite, SubTestError, TestCase};
pub use record::{ErrorDetail, Outcome, ResultRecord, TestId};
pub use runner::{RunReport, RunStats, TestHarness};
