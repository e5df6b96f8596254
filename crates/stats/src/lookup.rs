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

//! Lookup of all locks and signals made by a single address.

use alloy::primitives::{Address, B256, U256};
use anyhow::Context;
use futures_util::future::try_join_all;
use serde::Serialize;

use crate::{
    events::{fetch_lock_events, fetch_signal_events, EventSource},
    model::{RawEvent, RawLockEvent, RawSignalEvent},
    oracle::BalanceOracle,
    units::to_ether,
    value::{effective_lock_value, effective_signal_value},
    LockdropError,
};

/// Storage slot of a lock contract holding its owner.
pub const LOCK_OWNER_SLOT: u64 = 0;
/// Storage slot of a lock contract holding its unlock time.
pub const LOCK_UNLOCK_TIME_SLOT: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
    Lock,
    Signal,
}

/// One lock or signal made by the looked up address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressLookupResult {
    #[serde(rename = "type")]
    pub kind: LookupKind,
    pub event: RawEvent,
    pub effective_eth: f64,
    /// Minutes until the lock can be withdrawn, negative once unlocked. `None` for signals.
    pub minutes_until_unlock: Option<i64>,
}

/// Fields recorded in a lock contract at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockStorage {
    pub owner: Address,
    pub unlock_time: u64,
}

/// Parse a user supplied Ethereum address, with or without `0x` prefix.
pub fn parse_address(input: &str) -> Result<Address, LockdropError> {
    let input = input.trim();
    let digits = input.strip_prefix("0x").unwrap_or(input);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(LockdropError::MalformedAddress(format!(
            "{input:?} is not a hex encoded address"
        )));
    }
    if digits.len() != 40 {
        return Err(LockdropError::MalformedAddress(format!(
            "{input:?} has {} hex digits, expected 40",
            digits.len()
        )));
    }
    digits.parse::<Address>().map_err(|err| LockdropError::MalformedAddress(err.to_string()))
}

/// Read the owner and unlock time stored in a lock contract.
pub async fn read_lock_storage<O: BalanceOracle + ?Sized>(
    oracle: &O,
    lock_address: Address,
) -> anyhow::Result<LockStorage> {
    let (owner, unlock_time) = tokio::try_join!(
        oracle.storage_slot(lock_address, U256::from(LOCK_OWNER_SLOT)),
        oracle.storage_slot(lock_address, U256::from(LOCK_UNLOCK_TIME_SLOT)),
    )?;
    Ok(LockStorage {
        owner: Address::from_word(B256::from(owner.to_be_bytes::<32>())),
        unlock_time: unlock_time.saturating_to(),
    })
}

async fn describe_lock<O: BalanceOracle + ?Sized>(
    oracle: &O,
    lock: RawLockEvent,
    lock_start_time: u64,
    now: u64,
) -> Result<AddressLookupResult, LockdropError> {
    let storage = read_lock_storage(oracle, lock.lock_address)
        .await
        .with_context(|| format!("Failed to read lock storage of {}", lock.lock_address))
        .map_err(LockdropError::NetworkUnavailable)?;
    let effective =
        effective_lock_value(lock.amount, lock.term, lock.lock_timestamp, lock_start_time);
    let minutes_until_unlock = minutes_until(storage.unlock_time, now);

    Ok(AddressLookupResult {
        kind: LookupKind::Lock,
        effective_eth: to_ether(effective)?,
        minutes_until_unlock: Some(minutes_until_unlock),
        event: lock.into(),
    })
}

/// Whole minutes from `now` until `unlock_time`, negative once it has passed.
pub fn minutes_until(unlock_time: u64, now: u64) -> i64 {
    // Any u64 difference divided by 60 fits in an i64.
    ((i128::from(unlock_time) - i128::from(now)) / 60) as i64
}

async fn describe_signal<O: BalanceOracle + ?Sized>(
    oracle: &O,
    signal: RawSignalEvent,
    at_block: Option<u64>,
) -> Result<AddressLookupResult, LockdropError> {
    let balance = oracle
        .get_balance(signal.source_address, at_block)
        .await
        .map_err(LockdropError::NetworkUnavailable)?;

    Ok(AddressLookupResult {
        kind: LookupKind::Signal,
        effective_eth: to_ether(effective_signal_value(balance))?,
        minutes_until_unlock: None,
        event: signal.into(),
    })
}

/// All locks owned by, and signals sent from, the address in `input`.
///
/// The address is validated before any request is made. Locks come first, each group
/// in arrival order.
pub async fn lookup_address<S, O>(
    source: &S,
    oracle: &O,
    input: &str,
    at_block: Option<u64>,
) -> Result<Vec<AddressLookupResult>, LockdropError>
where
    S: EventSource + ?Sized,
    O: BalanceOracle + ?Sized,
{
    let address = parse_address(input)?;
    tracing::info!("Looking up locks and signals for {address}");

    let to_block = source
        .head_block()
        .await
        .context("Failed to get head block")
        .map_err(LockdropError::NetworkUnavailable)?;
    let (locks, signals, lock_start_time, now) = tokio::try_join!(
        async {
            fetch_lock_events(source, Some(address), to_block).await.context("Failed to get locks")
        },
        async {
            fetch_signal_events(source, Some(address), to_block)
                .await
                .context("Failed to get signals")
        },
        async { source.lock_start_time().await.context("Failed to get lock start time") },
        async { oracle.current_timestamp().await.context("Failed to get current timestamp") },
    )
    .map_err(LockdropError::NetworkUnavailable)?;

    let mut results = try_join_all(
        locks.into_iter().map(|lock| describe_lock(oracle, lock, lock_start_time, now)),
    )
    .await?;
    results.extend(
        try_join_all(signals.into_iter().map(|signal| describe_signal(oracle, signal, at_block)))
            .await?,
    );

    tracing::debug!("Found {} lockdrop actions for {address}", results.len());
    Ok(results)
}
