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

//! Signal aggregation.
//!
//! A signal is valued at the current balance of the signaling contract, so unlike
//! locks the totals change over time unless balances are pinned to a block.

use std::collections::HashSet;

use alloy::primitives::{Address, U256};
use anyhow::Context;
use futures_util::future::try_join_all;
use serde::Serialize;

use crate::{
    ledger::{Accumulate, Ledger},
    model::RawSignalEvent,
    oracle::BalanceOracle,
    value::effective_signal_value,
    LockdropError,
};

/// Maximum number of balance lookups in flight at once.
pub const BALANCE_CHUNK_SIZE: usize = 100;

/// Everything signaled under one participant key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantSignalRecord {
    pub raw_amount: U256,
    pub effective_amount: U256,
    /// Signaling contracts, most recently seen first.
    pub source_addresses: Vec<Address>,
}

impl Accumulate for ParticipantSignalRecord {
    fn accumulate(&mut self, later: Self) {
        self.raw_amount += later.raw_amount;
        self.effective_amount += later.effective_amount;
        let mut addresses = later.source_addresses;
        addresses.append(&mut self.source_addresses);
        self.source_addresses = addresses;
    }
}

/// Result of [aggregate_signals].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignalAggregate {
    pub signals: Ledger<ParticipantSignalRecord>,
    pub total_raw: U256,
    pub total_effective: U256,
    /// Number of signal events before deduplication.
    pub count: usize,
}

/// Keep the first signal from each source address, in arrival order.
pub fn dedup_signals(events: &[RawSignalEvent]) -> Vec<&RawSignalEvent> {
    let mut seen = HashSet::new();
    events.iter().filter(|event| seen.insert(event.source_address)).collect()
}

/// Fetch the balance of every signaler.
///
/// Lookups run concurrently in chunks of [BALANCE_CHUNK_SIZE]. Any failed lookup fails
/// the whole call, so a partial signal total is never produced.
pub async fn fetch_signal_balances<O: BalanceOracle + ?Sized>(
    signalers: &[&RawSignalEvent],
    oracle: &O,
    at_block: Option<u64>,
) -> Result<Vec<U256>, LockdropError> {
    let mut balances = Vec::with_capacity(signalers.len());
    for chunk in signalers.chunks(BALANCE_CHUNK_SIZE) {
        tracing::debug!("Fetching balances for {} signalers", chunk.len());
        let futures: Vec<_> = chunk
            .iter()
            .map(|signal| async move {
                oracle.get_balance(signal.source_address, at_block).await.with_context(|| {
                    format!("Failed to get balance of signaler {}", signal.source_address)
                })
            })
            .collect();
        let results = try_join_all(futures).await.map_err(LockdropError::NetworkUnavailable)?;
        balances.extend(results);
    }
    Ok(balances)
}

/// Reduce deduplicated signalers and their balances into per-participant records.
///
/// `count` is carried through as the raw number of signal events.
pub fn reduce_signals(
    signalers: &[&RawSignalEvent],
    balances: &[U256],
    count: usize,
) -> SignalAggregate {
    let mut aggregate = SignalAggregate { count, ..Default::default() };

    for (signal, &balance) in signalers.iter().zip(balances) {
        let effective = effective_signal_value(balance);
        aggregate.total_raw += balance;
        aggregate.total_effective += effective;
        aggregate.signals.upsert(
            signal.participant_key.clone(),
            ParticipantSignalRecord {
                raw_amount: balance,
                effective_amount: effective,
                source_addresses: vec![signal.source_address],
            },
        );
    }

    aggregate
}

/// Deduplicate signal events by source address, value each remaining signaler at its
/// balance and group by participant key.
pub async fn aggregate_signals<O: BalanceOracle + ?Sized>(
    events: &[RawSignalEvent],
    oracle: &O,
    at_block: Option<u64>,
) -> Result<SignalAggregate, LockdropError> {
    let signalers = dedup_signals(events);
    if signalers.len() < events.len() {
        tracing::debug!(
            "Discarded {} repeated signals from already seen addresses",
            events.len() - signalers.len()
        );
    }

    let balances = fetch_signal_balances(&signalers, oracle, at_block).await?;
    let aggregate = reduce_signals(&signalers, &balances, events.len());

    tracing::debug!(
        "Aggregated {} signals from {} signalers and {} participants",
        aggregate.count,
        signalers.len(),
        aggregate.signals.len()
    );

    Ok(aggregate)
}
