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

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use lockdrop_stats::{
    compute_participation_summary, fetch_all_events, lookup_address, BalanceOracle, CacheKey,
    EventCache, EventKind, EventSource, LockdropError, LookupKind, RawEvent, RawLockEvent,
    RawSignalEvent, SummaryConfig, Term, CAMPAIGN_START,
};

const ETHER: u64 = 1_000_000_000_000_000_000;

fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(ETHER)
}

/// In-memory lockdrop with call counters.
#[derive(Default)]
struct MemorySource {
    chain_id: u64,
    lock_start_time: u64,
    locks: Vec<RawLockEvent>,
    signals: Vec<RawSignalEvent>,
    head: Option<u64>,
    fetches: AtomicUsize,
    head_calls: AtomicUsize,
    requested_to_blocks: Mutex<Vec<Option<u64>>>,
}

#[async_trait]
impl EventSource for MemorySource {
    fn cache_key(&self) -> CacheKey {
        CacheKey { chain_id: self.chain_id, lockdrop_address: Address::repeat_byte(0x1b) }
    }

    async fn head_block(&self) -> anyhow::Result<Option<u64>> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.head)
    }

    async fn get_events(
        &self,
        kind: EventKind,
        address: Option<Address>,
        to_block: Option<u64>,
    ) -> anyhow::Result<Vec<RawEvent>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.requested_to_blocks.lock().unwrap().push(to_block);
        let in_range = |block: u64| to_block.map_or(true, |to| block <= to);
        let events = match kind {
            EventKind::Locked => self
                .locks
                .iter()
                .filter(|lock| in_range(lock.block_number))
                .filter(|lock| address.map_or(true, |owner| lock.owner == owner))
                .cloned()
                .map(RawEvent::from)
                .collect(),
            EventKind::Signaled => self
                .signals
                .iter()
                .filter(|signal| in_range(signal.block_number))
                .filter(|signal| address.map_or(true, |source| signal.source_address == source))
                .cloned()
                .map(RawEvent::from)
                .collect(),
        };
        Ok(events)
    }

    async fn lock_start_time(&self) -> anyhow::Result<u64> {
        Ok(self.lock_start_time)
    }
}

/// Source whose event queries fail or never complete.
struct BrokenSource {
    hang: bool,
}

#[async_trait]
impl EventSource for BrokenSource {
    fn cache_key(&self) -> CacheKey {
        CacheKey { chain_id: 1, lockdrop_address: Address::repeat_byte(0x1b) }
    }

    async fn get_events(
        &self,
        kind: EventKind,
        _address: Option<Address>,
        _to_block: Option<u64>,
    ) -> anyhow::Result<Vec<RawEvent>> {
        match kind {
            EventKind::Locked => Ok(Vec::new()),
            EventKind::Signaled if self.hang => std::future::pending().await,
            EventKind::Signaled => Err(anyhow::anyhow!("connection refused")),
        }
    }

    async fn lock_start_time(&self) -> anyhow::Result<u64> {
        Ok(CAMPAIGN_START)
    }
}

#[derive(Default)]
struct MemoryOracle {
    balances: HashMap<Address, U256>,
    storage: HashMap<(Address, U256), U256>,
    now: u64,
    calls: AtomicUsize,
}

#[async_trait]
impl BalanceOracle for MemoryOracle {
    async fn get_balance(&self, address: Address, _at_block: Option<u64>) -> anyhow::Result<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.balances.get(&address).copied().ok_or_else(|| anyhow::anyhow!("node unreachable"))
    }

    async fn current_timestamp(&self) -> anyhow::Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.now)
    }

    async fn storage_slot(&self, address: Address, slot: U256) -> anyhow::Result<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.storage.get(&(address, slot)).copied().unwrap_or_default())
    }
}

fn lock(owner: u8, key: &'static [u8], lock_addr: u8, amount: U256, term: Term) -> RawLockEvent {
    RawLockEvent {
        participant_key: Bytes::from_static(key),
        owner: Address::repeat_byte(owner),
        lock_address: Address::repeat_byte(lock_addr),
        amount,
        term: term.into(),
        lock_timestamp: CAMPAIGN_START + 3600,
        is_validator: false,
        block_number: 7_870_000 + lock_addr as u64,
    }
}

fn signal(source: u8, key: &'static [u8], block_number: u64) -> RawSignalEvent {
    RawSignalEvent {
        source_address: Address::repeat_byte(source),
        participant_key: Bytes::from_static(key),
        signal_timestamp: CAMPAIGN_START + block_number,
        block_number,
    }
}

fn sample_lockdrop() -> (MemorySource, MemoryOracle) {
    let mut validator = lock(0x02, b"edg-2", 0x22, ether(20), Term::TwelveMonth);
    validator.is_validator = true;
    let source = MemorySource {
        chain_id: 1,
        lock_start_time: CAMPAIGN_START,
        locks: vec![
            lock(0x01, b"edg-1", 0x11, ether(10), Term::ThreeMonth),
            validator,
            lock(0x01, b"edg-1", 0x12, ether(30), Term::SixMonth),
        ],
        signals: vec![
            signal(0xa, b"edg-3", 7_870_100),
            signal(0xa, b"edg-3", 7_870_900),
            signal(0xb, b"edg-1", 7_871_500),
        ],
        ..Default::default()
    };
    let oracle = MemoryOracle {
        balances: HashMap::from([
            (Address::repeat_byte(0xa), ether(50)),
            (Address::repeat_byte(0xb), ether(30)),
        ]),
        ..Default::default()
    };
    (source, oracle)
}

#[tokio::test]
async fn test_full_summary() {
    let (source, oracle) = sample_lockdrop();
    let mut cache = EventCache::new();
    let summary =
        compute_participation_summary(&source, &oracle, &mut cache, &SummaryConfig::default())
            .await
            .unwrap();

    assert_eq!(summary.num_locks, 3);
    assert_eq!(summary.total_eth_locked, 60.0);
    // 10 * 1.5 + 20 * 2.2 * 1.5 + 30 * 1.3 * 1.5
    assert_eq!(summary.total_effective_eth_locked, 15.0 + 66.0 + 58.5);
    assert_eq!(summary.avg_lock, Some(20.0));

    assert_eq!(summary.num_signals, 3);
    assert_eq!(summary.total_eth_signaled, 80.0);
    assert_eq!(summary.total_effective_eth_signaled, 16.0);
    assert_eq!(summary.total_eth, 140.0);

    assert_eq!(summary.total_eth_locked_by_term[&Term::SixMonth], 30.0);
    assert_eq!(summary.locks.len(), 2);
    assert_eq!(summary.validating_locks.len(), 1);
    assert_eq!(summary.signals.len(), 2);
    assert_eq!(
        summary.locks.get(&Bytes::from_static(b"edg-1")).unwrap().lock_addresses,
        vec![Address::repeat_byte(0x12), Address::repeat_byte(0x11)]
    );

    let (_, final_count) = *summary.participants_by_block.last().unwrap();
    assert_eq!(final_count, 6);
    assert_eq!(summary.eth_locked_by_block.last().unwrap().1, 60.0);
}

#[tokio::test]
async fn test_cache_reuse_and_network_switch() {
    let (source, oracle) = sample_lockdrop();
    let mut cache = EventCache::new();
    let config = SummaryConfig::default();

    let first = compute_participation_summary(&source, &oracle, &mut cache, &config).await.unwrap();
    let fetches = source.fetches.load(Ordering::SeqCst);
    let second =
        compute_participation_summary(&source, &oracle, &mut cache, &config).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(source.fetches.load(Ordering::SeqCst), fetches);

    // A different network with the same contract address is fetched separately.
    let other = MemorySource { chain_id: 3, ..Default::default() };
    let err =
        compute_participation_summary(&other, &oracle, &mut cache, &config).await.unwrap_err();
    assert!(err.is_empty_dataset());
    assert_eq!(cache.len(), 2);

    assert!(cache.invalidate(&source.cache_key()));
    compute_participation_summary(&source, &oracle, &mut cache, &config).await.unwrap();
    assert_eq!(source.fetches.load(Ordering::SeqCst), fetches * 2);
}

#[tokio::test]
async fn test_empty_lockdrop_skips_balances() {
    let source =
        MemorySource { chain_id: 1, lock_start_time: CAMPAIGN_START, ..Default::default() };
    let oracle = MemoryOracle::default();
    let mut cache = EventCache::new();

    let err =
        compute_participation_summary(&source, &oracle, &mut cache, &SummaryConfig::default())
            .await
            .unwrap_err();
    assert!(matches!(err, LockdropError::EmptyDataset));
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_balance_fails_summary() {
    let (source, mut oracle) = sample_lockdrop();
    oracle.balances.remove(&Address::repeat_byte(0xb));
    let mut cache = EventCache::new();

    let err =
        compute_participation_summary(&source, &oracle, &mut cache, &SummaryConfig::default())
            .await
            .unwrap_err();
    assert!(matches!(err, LockdropError::NetworkUnavailable(_)));
}

#[tokio::test]
async fn test_invalid_term_does_not_abort() {
    let (mut source, oracle) = sample_lockdrop();
    source.locks[0].term = 5;
    let mut cache = EventCache::new();

    let summary =
        compute_participation_summary(&source, &oracle, &mut cache, &SummaryConfig::default())
            .await
            .unwrap();
    assert_eq!(summary.num_locks, 3);
    assert_eq!(summary.total_eth_locked, 60.0);
    assert_eq!(summary.total_effective_eth_locked, 66.0 + 58.5);
}

#[tokio::test]
async fn test_lookup_address() {
    let (source, mut oracle) = sample_lockdrop();
    let unlock_time = CAMPAIGN_START + 90 * 24 * 60 * 60;
    oracle.now = unlock_time - 600;
    let unlock_slot = U256::from(1);
    oracle.storage.insert((Address::repeat_byte(0x11), unlock_slot), U256::from(unlock_time));
    let unlocked = U256::from(unlock_time - 6000);
    oracle.storage.insert((Address::repeat_byte(0x12), unlock_slot), unlocked);

    let owner = format!("{:x}", Address::repeat_byte(0x01));
    let results = lookup_address(&source, &oracle, &owner, None).await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.kind == LookupKind::Lock));
    assert_eq!(results[0].minutes_until_unlock, Some(10));
    assert_eq!(results[0].effective_eth, 15.0);
    assert_eq!(results[1].minutes_until_unlock, Some(-90));

    let signaler = Address::repeat_byte(0xa).to_string();
    let results = lookup_address(&source, &oracle, &signaler, None).await.unwrap();
    // Both signals from the address are listed, each valued at the current balance.
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.kind == LookupKind::Signal && r.effective_eth == 10.0));
    assert!(results.iter().all(|r| r.minutes_until_unlock.is_none()));
}

#[tokio::test]
async fn test_lookup_rejects_malformed_address() {
    let (source, oracle) = sample_lockdrop();
    let err = lookup_address(&source, &oracle, "0x1234", None).await.unwrap_err();
    assert!(matches!(err, LockdropError::MalformedAddress(_)));
    assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_event_fetch_leaves_cache_empty() {
    let source = BrokenSource { hang: false };
    let oracle = MemoryOracle::default();
    let mut cache = EventCache::new();

    let err =
        compute_participation_summary(&source, &oracle, &mut cache, &SummaryConfig::default())
            .await
            .unwrap_err();
    assert!(matches!(err, LockdropError::NetworkUnavailable(_)));
    assert!(cache.is_empty());
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_abandoned_run_leaves_cache_empty() {
    let source = BrokenSource { hang: true };
    let oracle = MemoryOracle::default();
    let mut cache = EventCache::new();
    let config = SummaryConfig::default();

    let run = compute_participation_summary(&source, &oracle, &mut cache, &config);
    assert!(tokio::time::timeout(Duration::from_millis(50), run).await.is_err());
    assert!(cache.is_empty());
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_events_share_one_head_block() {
    let (mut source, _) = sample_lockdrop();
    source.head = Some(7_870_500);

    let events = fetch_all_events(&source).await.unwrap();
    assert_eq!(source.head_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*source.requested_to_blocks.lock().unwrap(), vec![Some(7_870_500); 2]);
    assert_eq!(events.locks.len(), 3);
    assert_eq!(events.signals.len(), 1);
}
