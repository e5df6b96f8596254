// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-participant accumulation shared by the lock and signal aggregators.

use std::collections::{btree_map::Entry, BTreeMap};

use serde::Serialize;

use crate::model::ParticipantKey;

/// A record that can absorb a later contribution for the same participant.
pub trait Accumulate {
    fn accumulate(&mut self, later: Self);
}

/// Records keyed by participant, iterated in key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ledger<R> {
    entries: BTreeMap<ParticipantKey, R>,
}

impl<R> Default for Ledger<R> {
    fn default() -> Self {
        Self { entries: BTreeMap::new() }
    }
}

impl<R: Accumulate> Ledger<R> {
    /// Insert `record` for `key`, or merge it into the existing record. Returns the
    /// record as stored after the merge.
    pub fn upsert(&mut self, key: ParticipantKey, record: R) -> &R {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                let existing = entry.into_mut();
                existing.accumulate(record);
                existing
            }
            Entry::Vacant(entry) => entry.insert(record),
        }
    }
}

impl<R> Ledger<R> {
    pub fn get(&self, key: &ParticipantKey) -> Option<&R> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantKey, &R)> {
        self.entries.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &R> {
        self.entries.values()
    }
}
