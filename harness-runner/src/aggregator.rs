// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Groups accepted records into report-ready suites.

use crate::{
    record::{Outcome, ResultRecord},
    store::RecordStore,
};
use indexmap::IndexMap;
use std::fmt;

/// Per-outcome counts for one suite group.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OutcomeCounts {
    /// Number of passing records.
    pub passed: usize,
    /// Number of failing records.
    pub failed: usize,
    /// Number of errored records.
    pub errored: usize,
    /// Number of skipped records.
    pub skipped: usize,
}

impl OutcomeCounts {
    pub(crate) fn tally(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.passed += 1,
            Outcome::Failure => self.failed += 1,
            Outcome::Error => self.errored += 1,
            Outcome::Skip => self.skipped += 1,
        }
    }

    /// The total number of records counted.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errored + self.skipped
    }
}

/// Displays the counts as a comma-separated summary, omitting zero entries.
impl fmt::Display for OutcomeCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (label, count) in [
            ("Pass", self.passed),
            ("Fail", self.failed),
            ("Error", self.errored),
            ("Skip", self.skipped),
        ] {
            if count == 0 {
                continue;
            }
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{label}: {count}")?;
            first = false;
        }
        Ok(())
    }
}

/// One group of records sharing a suite key.
#[derive(Debug)]
pub struct SuiteGroup<'a> {
    /// The grouping key: the suite's description, or its class scope.
    pub key: &'a str,
    /// The group's records, ordered by sequence number.
    pub records: Vec<&'a ResultRecord>,
    /// Per-outcome counts over the group.
    pub counts: OutcomeCounts,
}

/// All accepted records, grouped by suite key.
///
/// Groups appear in the order their keys were first seen; within a group,
/// records are sorted by their method's sequence number with ties kept in
/// acceptance order.
#[derive(Debug, Default)]
pub struct SuiteGroups<'a> {
    groups: Vec<SuiteGroup<'a>>,
}

impl<'a> SuiteGroups<'a> {
    /// Builds the grouping over a store's currently accepted records.
    pub fn build(store: &'a RecordStore) -> Self {
        let mut by_key: IndexMap<&str, SuiteGroup<'a>> = IndexMap::new();
        for record in store.current() {
            let group = by_key
                .entry(record.suite_key.as_str())
                .or_insert_with(|| SuiteGroup {
                    key: record.suite_key.as_str(),
                    records: vec![],
                    counts: OutcomeCounts::default(),
                });
            group.records.push(record);
            group.counts.tally(record.outcome);
        }
        let mut groups: Vec<_> = by_key.into_values().collect();
        for group in &mut groups {
            group
                .records
                .sort_by_key(|record| record.test_id.sequence_number());
        }
        Self { groups }
    }

    /// Iterates over the groups in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = &SuiteGroup<'a>> {
        self.groups.iter()
    }

    /// The number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True if no group was formed.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
