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

//! Lock aggregation.

use std::collections::BTreeMap;

use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::{
    ledger::{Accumulate, Ledger},
    model::{RawLockEvent, Term},
    value::effective_lock_value,
};

/// Everything locked under one participant key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantLockRecord {
    /// Sum of locked wei.
    pub raw_amount: U256,
    /// Sum of the effective value of each lock, each with its own bonus.
    pub effective_amount: U256,
    /// Lock contracts, most recently seen first.
    pub lock_addresses: Vec<Address>,
}

impl Accumulate for ParticipantLockRecord {
    fn accumulate(&mut self, later: Self) {
        self.raw_amount += later.raw_amount;
        self.effective_amount += later.effective_amount;
        let mut addresses = later.lock_addresses;
        addresses.append(&mut self.lock_addresses);
        self.lock_addresses = addresses;
    }
}

/// Result of [aggregate_locks].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LockAggregate {
    pub locks: Ledger<ParticipantLockRecord>,
    /// Same accumulation, restricted to locks flagged as validator intent.
    pub validating_locks: Ledger<ParticipantLockRecord>,
    pub total_raw: U256,
    pub total_effective: U256,
    /// Raw locked wei per recognized term.
    pub raw_by_term: BTreeMap<Term, U256>,
    /// Number of lock events.
    pub count: usize,
}

/// Group lock events by participant key and sum raw and effective amounts.
///
/// Every event is counted. A lock with an unrecognized term still adds to the raw
/// totals but contributes zero effective value.
pub fn aggregate_locks(events: &[RawLockEvent], campaign_start: u64) -> LockAggregate {
    let mut aggregate = LockAggregate::default();

    for event in events {
        let effective =
            effective_lock_value(event.amount, event.term, event.lock_timestamp, campaign_start);
        aggregate.total_raw += event.amount;
        aggregate.total_effective += effective;
        if let Ok(term) = event.term() {
            *aggregate.raw_by_term.entry(term).or_insert(U256::ZERO) += event.amount;
        }

        let record = ParticipantLockRecord {
            raw_amount: event.amount,
            effective_amount: effective,
            lock_addresses: vec![event.lock_address],
        };
        if event.is_validator {
            aggregate.validating_locks.upsert(event.participant_key.clone(), record.clone());
        }
        aggregate.locks.upsert(event.participant_key.clone(), record);
    }
    aggregate.count = events.len();

    tracing::debug!(
        "Aggregated {} locks from {} participants ({} validating)",
        aggregate.count,
        aggregate.locks.len(),
        aggregate.validating_locks.len()
    );

    aggregate
}
