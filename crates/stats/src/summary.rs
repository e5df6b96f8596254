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

//! Participation summary: combines lock, signal and series results.

use std::collections::BTreeMap;

use alloy::primitives::U256;
use serde::Serialize;

use crate::{
    cache::EventCache,
    events::EventSource,
    ledger::Ledger,
    locks::{aggregate_locks, LockAggregate, ParticipantLockRecord},
    model::Term,
    oracle::BalanceOracle,
    series::{bucketize, TimeSeries},
    signals::{aggregate_signals, ParticipantSignalRecord, SignalAggregate},
    units::to_ether,
    LockdropError,
};

/// Participation statistics for a lockdrop. Totals and averages are in ether;
/// per-participant records keep their wei amounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipationSummary {
    pub total_eth_locked: f64,
    pub total_effective_eth_locked: f64,
    pub total_eth_signaled: f64,
    pub total_effective_eth_signaled: f64,
    pub total_eth: f64,
    pub total_effective_eth: f64,
    /// Fraction of effective ether contributed by locks, which sets the lockers' share of
    /// the participant allocation. `None` when nothing was contributed.
    pub lockers_share: Option<f64>,
    /// Fraction of effective ether contributed by signals.
    pub signalers_share: Option<f64>,
    /// Ether locked per term. Every term is present.
    pub total_eth_locked_by_term: BTreeMap<Term, f64>,
    pub num_locks: usize,
    /// Signal events before deduplication.
    pub num_signals: usize,
    /// `None` when there are no locks.
    pub avg_lock: Option<f64>,
    /// `None` when there are no signals.
    pub avg_signal: Option<f64>,
    pub locks: Ledger<ParticipantLockRecord>,
    pub validating_locks: Ledger<ParticipantLockRecord>,
    pub signals: Ledger<ParticipantSignalRecord>,
    pub participants_by_block: Vec<(u64, u64)>,
    pub eth_locked_by_block: Vec<(u64, f64)>,
    pub block_to_approx_timestamp: BTreeMap<u64, u64>,
}

/// Settings for one summary run.
#[derive(Debug, Clone, Default)]
pub struct SummaryConfig {
    /// Value signals at this block instead of the latest one.
    pub at_block: Option<u64>,
}

fn average(total: U256, count: usize) -> Result<Option<f64>, LockdropError> {
    if count == 0 {
        return Ok(None);
    }
    Ok(Some(to_ether(total / U256::from(count))?))
}

/// Shares of `total` held by `locked` and `signaled`.
fn shares(locked: f64, signaled: f64, total: f64) -> (Option<f64>, Option<f64>) {
    if total == 0.0 {
        return (None, None);
    }
    (Some(locked / total), Some(signaled / total))
}

/// Combine the aggregator outputs into a [ParticipationSummary].
///
/// This is the only place wei totals are converted to ether.
pub fn build_summary(
    locks: LockAggregate,
    signals: SignalAggregate,
    series: TimeSeries,
) -> Result<ParticipationSummary, LockdropError> {
    let total_raw = locks.total_raw + signals.total_raw;
    let total_effective = locks.total_effective + signals.total_effective;

    let total_eth_locked_by_term = Term::ALL
        .into_iter()
        .map(|term| {
            let wei = locks.raw_by_term.get(&term).copied().unwrap_or(U256::ZERO);
            Ok((term, to_ether(wei)?))
        })
        .collect::<Result<BTreeMap<_, _>, LockdropError>>()?;

    let total_effective_eth_locked = to_ether(locks.total_effective)?;
    let total_effective_eth_signaled = to_ether(signals.total_effective)?;
    let total_effective_eth = to_ether(total_effective)?;
    let (lockers_share, signalers_share) =
        shares(total_effective_eth_locked, total_effective_eth_signaled, total_effective_eth);

    Ok(ParticipationSummary {
        total_eth_locked: to_ether(locks.total_raw)?,
        total_effective_eth_locked,
        total_eth_signaled: to_ether(signals.total_raw)?,
        total_effective_eth_signaled,
        total_eth: to_ether(total_raw)?,
        total_effective_eth,
        lockers_share,
        signalers_share,
        total_eth_locked_by_term,
        num_locks: locks.count,
        num_signals: signals.count,
        avg_lock: average(locks.total_raw, locks.count)?,
        avg_signal: average(signals.total_raw, signals.count)?,
        locks: locks.locks,
        validating_locks: locks.validating_locks,
        signals: signals.signals,
        participants_by_block: series.participants_by_block,
        eth_locked_by_block: series.eth_locked_by_block,
        block_to_approx_timestamp: series.block_to_approx_timestamp,
    })
}

/// Fetch (or reuse cached) events, aggregate them and build the summary.
///
/// Fails with [LockdropError::EmptyDataset] before any balance is fetched when the
/// lockdrop has no events.
pub async fn compute_participation_summary<S, O>(
    source: &S,
    oracle: &O,
    cache: &mut EventCache,
    config: &SummaryConfig,
) -> Result<ParticipationSummary, LockdropError>
where
    S: EventSource + ?Sized,
    O: BalanceOracle + ?Sized,
{
    let start_time = std::time::Instant::now();
    let events = cache.get_or_fetch(source).await?;

    let series = bucketize(&events.locks, &events.signals)?;
    let locks = aggregate_locks(&events.locks, events.lock_start_time);
    let signals = aggregate_signals(&events.signals, oracle, config.at_block).await?;
    let summary = build_summary(locks, signals, series)?;

    tracing::info!(
        "Built participation summary in {:.2}s: {} locks ({} ETH), {} signals ({} ETH)",
        start_time.elapsed().as_secs_f64(),
        summary.num_locks,
        summary.total_eth_locked,
        summary.num_signals,
        summary.total_eth_signaled
    );

    Ok(summary)
}
