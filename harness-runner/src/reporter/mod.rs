// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report renderers.
//!
//! Both renderers consume the same aggregated view of a run's accepted
//! records, so the XML and HTML reports always describe the same outcomes.

pub mod html;
pub mod junit;
