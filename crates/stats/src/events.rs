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

//! Event fetching and log decoding.

use alloy::{
    primitives::Address,
    providers::Provider,
    rpc::types::{BlockNumberOrTag, Filter, Log},
    sol_types::SolEvent,
};
use anyhow::Context;
use async_trait::async_trait;

use crate::{
    cache::CacheKey,
    contracts::ILockdrop,
    deployments::Deployment,
    model::{EventKind, RawEvent, RawLockEvent, RawSignalEvent},
    LockdropError, LOG_QUERY_CHUNK_SIZE,
};

/// Source of historical lockdrop events for one contract.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Identifies the network and contract the events come from.
    fn cache_key(&self) -> CacheKey;

    /// Last block to read events up to, resolved once per fetch so every event kind
    /// covers the same range. `None` reads everything the source has.
    async fn head_block(&self) -> anyhow::Result<Option<u64>> {
        Ok(None)
    }

    /// All events of `kind` up to `to_block` inclusive, in arrival order. When `address`
    /// is set, only locks owned by it or signals sent from it are returned.
    async fn get_events(
        &self,
        kind: EventKind,
        address: Option<Address>,
        to_block: Option<u64>,
    ) -> anyhow::Result<Vec<RawEvent>>;

    /// Campaign start recorded in the contract.
    async fn lock_start_time(&self) -> anyhow::Result<u64>;
}

/// All events needed to build a summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockdropEvents {
    pub locks: Vec<RawLockEvent>,
    pub signals: Vec<RawSignalEvent>,
    pub lock_start_time: u64,
}

impl LockdropEvents {
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty() && self.signals.is_empty()
    }
}

/// Locked events, optionally restricted to one owner.
pub async fn fetch_lock_events<S: EventSource + ?Sized>(
    source: &S,
    owner: Option<Address>,
    to_block: Option<u64>,
) -> anyhow::Result<Vec<RawLockEvent>> {
    let events = source.get_events(EventKind::Locked, owner, to_block).await?;
    Ok(events
        .into_iter()
        .filter_map(|event| match event {
            RawEvent::Lock(lock) => Some(lock),
            RawEvent::Signal(_) => None,
        })
        .collect())
}

/// Signaled events, optionally restricted to one signaling contract.
pub async fn fetch_signal_events<S: EventSource + ?Sized>(
    source: &S,
    contract: Option<Address>,
    to_block: Option<u64>,
) -> anyhow::Result<Vec<RawSignalEvent>> {
    let events = source.get_events(EventKind::Signaled, contract, to_block).await?;
    Ok(events
        .into_iter()
        .filter_map(|event| match event {
            RawEvent::Signal(signal) => Some(signal),
            RawEvent::Lock(_) => None,
        })
        .collect())
}

/// Fetch every lock and signal event plus the campaign start, concurrently.
pub async fn fetch_all_events<S: EventSource + ?Sized>(
    source: &S,
) -> Result<LockdropEvents, LockdropError> {
    let to_block = source
        .head_block()
        .await
        .context("Failed to get head block")
        .map_err(LockdropError::NetworkUnavailable)?;
    tracing::info!("Fetching lockdrop events up to block {to_block:?}...");

    let (locks, signals, lock_start_time) = tokio::join!(
        async {
            fetch_lock_events(source, None, to_block).await.context("Failed to get lock events")
        },
        async {
            fetch_signal_events(source, None, to_block)
                .await
                .context("Failed to get signal events")
        },
        async { source.lock_start_time().await.context("Failed to get lock start time") }
    );

    let events = LockdropEvents {
        locks: locks.map_err(LockdropError::NetworkUnavailable)?,
        signals: signals.map_err(LockdropError::NetworkUnavailable)?,
        lock_start_time: lock_start_time.map_err(LockdropError::NetworkUnavailable)?,
    };

    tracing::info!(
        "Fetched {} lock events and {} signal events",
        events.locks.len(),
        events.signals.len()
    );

    Ok(events)
}

/// Query logs in chunks to avoid hitting provider limits
pub async fn query_logs_chunked<P: Provider>(
    provider: &P,
    filter: Filter,
    from_block: u64,
    to_block: u64,
    chunk_size: u64,
) -> anyhow::Result<Vec<Log>> {
    let chunk_size = chunk_size.max(1);
    let mut all_logs = Vec::new();

    let mut current_from = from_block;
    while current_from <= to_block {
        let current_to = current_from.saturating_add(chunk_size - 1).min(to_block);

        let chunk_filter = filter
            .clone()
            .from_block(BlockNumberOrTag::Number(current_from))
            .to_block(BlockNumberOrTag::Number(current_to));

        let logs = provider.get_logs(&chunk_filter).await?;
        tracing::debug!("Fetched {} logs in blocks {}..={}", logs.len(), current_from, current_to);
        all_logs.extend(logs);

        current_from = current_to + 1;
    }

    Ok(all_logs)
}

/// Decode every log of `kind`. A log that does not decode fails the whole batch.
pub fn decode_logs(kind: EventKind, logs: &[Log]) -> anyhow::Result<Vec<RawEvent>> {
    logs.iter()
        .map(|log| match kind {
            EventKind::Locked => decode_lock_log(log).map(RawEvent::from),
            EventKind::Signaled => decode_signal_log(log).map(RawEvent::from),
        })
        .collect()
}

pub fn decode_lock_log(log: &Log) -> anyhow::Result<RawLockEvent> {
    let decoded = log.log_decode::<ILockdrop::Locked>().context("Failed to decode Locked log")?;
    let block_number = log.block_number.context("Locked log is missing its block number")?;
    let data = decoded.inner.data;
    Ok(RawLockEvent {
        participant_key: data.edgewareAddr,
        owner: data.owner,
        lock_address: data.lockAddr,
        amount: data.eth,
        term: data.term,
        lock_timestamp: data.time.saturating_to(),
        is_validator: data.isValidator,
        block_number,
    })
}

pub fn decode_signal_log(log: &Log) -> anyhow::Result<RawSignalEvent> {
    let decoded =
        log.log_decode::<ILockdrop::Signaled>().context("Failed to decode Signaled log")?;
    let block_number = log.block_number.context("Signaled log is missing its block number")?;
    let data = decoded.inner.data;
    Ok(RawSignalEvent {
        source_address: data.contractAddr,
        participant_key: data.edgewareAddr,
        signal_timestamp: data.time.saturating_to(),
        block_number,
    })
}

/// [EventSource] reading logs of a [Deployment] through an RPC provider.
#[derive(Clone, Debug)]
pub struct ProviderEventSource<P> {
    provider: P,
    deployment: Deployment,
    chain_id: u64,
    to_block: Option<u64>,
    chunk_size: u64,
}

impl<P: Provider> ProviderEventSource<P> {
    pub fn new(provider: P, deployment: Deployment, chain_id: u64) -> Self {
        Self { provider, deployment, chain_id, to_block: None, chunk_size: LOG_QUERY_CHUNK_SIZE }
    }

    /// Stop scanning at `to_block` instead of the latest block.
    pub fn with_to_block(self, to_block: Option<u64>) -> Self {
        Self { to_block, ..self }
    }

    pub fn with_chunk_size(self, chunk_size: u64) -> Self {
        Self { chunk_size, ..self }
    }

    async fn resolve_head(&self) -> anyhow::Result<u64> {
        match self.to_block {
            Some(block) => Ok(block),
            None => self.provider.get_block_number().await.context("Failed to get block number"),
        }
    }

    async fn query(&self, filter: Filter, to_block: Option<u64>) -> anyhow::Result<Vec<Log>> {
        let to_block = match to_block {
            Some(block) => block,
            None => self.resolve_head().await?,
        };
        query_logs_chunked(
            &self.provider,
            filter,
            self.deployment.from_block,
            to_block,
            self.chunk_size,
        )
        .await
    }
}

#[async_trait]
impl<P> EventSource for ProviderEventSource<P>
where
    P: Provider + Send + Sync,
{
    fn cache_key(&self) -> CacheKey {
        CacheKey { chain_id: self.chain_id, lockdrop_address: self.deployment.lockdrop_address }
    }

    async fn head_block(&self) -> anyhow::Result<Option<u64>> {
        self.resolve_head().await.map(Some)
    }

    async fn get_events(
        &self,
        kind: EventKind,
        address: Option<Address>,
        to_block: Option<u64>,
    ) -> anyhow::Result<Vec<RawEvent>> {
        let signature = match kind {
            EventKind::Locked => ILockdrop::Locked::SIGNATURE_HASH,
            EventKind::Signaled => ILockdrop::Signaled::SIGNATURE_HASH,
        };
        let mut filter =
            Filter::new().address(self.deployment.lockdrop_address).event_signature(signature);
        // `owner` and `contractAddr` are the first indexed topic of their events.
        if let Some(address) = address {
            filter = filter.topic1(address.into_word());
        }

        let logs = self.query(filter, to_block).await?;
        decode_logs(kind, &logs)
    }

    async fn lock_start_time(&self) -> anyhow::Result<u64> {
        let lockdrop = ILockdrop::new(self.deployment.lockdrop_address, &self.provider);
        let start = lockdrop
            .LOCK_START_TIME()
            .call()
            .await
            .context("Failed to call LOCK_START_TIME")?;
        Ok(start.saturating_to())
    }
}
