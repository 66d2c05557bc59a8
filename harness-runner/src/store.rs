// Copyright (c) The harness-runner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only record storage with O(1) supersession.
//!
//! Every classified attempt is kept in an arena; a separate index maps each
//! test identity to its currently accepted record. Accepting a later attempt
//! for the same identity replaces the index entry without scanning, and the
//! superseded attempt stays in the arena for inspection.

use crate::record::{Outcome, ResultRecord, TestId};
use indexmap::IndexMap;

/// An opaque handle to a record in the arena.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct RecordId(usize);

/// The per-run collection of result records.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<ResultRecord>,
    current: IndexMap<TestId, RecordId>,
}

impl RecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts a record as the current result for its test identity.
    ///
    /// A record accepted earlier for the same identity is superseded: it
    /// stays in the arena but no longer appears in [`current`](Self::current).
    /// The index keeps the identity's original position, so report order
    /// follows first acceptance.
    pub fn accept(&mut self, record: ResultRecord) -> RecordId {
        let id = RecordId(self.records.len());
        self.current.insert(record.test_id.clone(), id);
        self.records.push(record);
        id
    }

    /// Looks up a record by handle, including superseded ones.
    pub fn get(&self, id: RecordId) -> Option<&ResultRecord> {
        self.records.get(id.0)
    }

    /// The currently accepted record for a test identity, if any.
    pub fn current_for(&self, test_id: &TestId) -> Option<&ResultRecord> {
        self.current.get(test_id).map(|id| &self.records[id.0])
    }

    /// Iterates over the currently accepted records in first-acceptance
    /// order.
    pub fn current(&self) -> impl Iterator<Item = &ResultRecord> {
        self.current.values().map(|id| &self.records[id.0])
    }

    /// Iterates over the currently accepted records with a given outcome.
    pub fn with_outcome(&self, outcome: Outcome) -> impl Iterator<Item = &ResultRecord> {
        self.current().filter(move |r| r.outcome == outcome)
    }

    /// The number of currently accepted records.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// True if no record has been accepted.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// The total number of attempts in the arena, superseded included.
    pub fn attempt_count(&self) -> usize {
        self.records.len()
    }

    /// Counts the currently accepted records with a given outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.with_outcome(outcome).count()
    }
}
