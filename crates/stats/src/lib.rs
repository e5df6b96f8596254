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

//! Participation statistics for the lockdrop, computed from on-chain `Locked` and
//! `Signaled` events.

// Declare modules
pub mod bonus;
pub mod cache;
pub mod contracts;
pub mod deployments;
pub mod error;
pub mod events;
pub mod ledger;
pub mod locks;
pub mod lookup;
pub mod model;
pub mod oracle;
pub mod series;
pub mod signals;
pub mod summary;
pub mod units;
pub mod value;

// Re-export commonly used types
pub use bonus::{bonus_percent, CAMPAIGN_START};
pub use cache::{CacheKey, EventCache};
pub use deployments::Deployment;
pub use error::LockdropError;
pub use events::{
    decode_logs, fetch_all_events, fetch_lock_events, fetch_signal_events, query_logs_chunked,
    EventSource, LockdropEvents, ProviderEventSource,
};
pub use ledger::{Accumulate, Ledger};
pub use locks::{aggregate_locks, LockAggregate, ParticipantLockRecord};
pub use lookup::{
    lookup_address, minutes_until, parse_address, read_lock_storage, AddressLookupResult,
    LockStorage, LookupKind,
};
pub use model::{EventKind, ParticipantKey, RawEvent, RawLockEvent, RawSignalEvent, Term};
pub use oracle::{BalanceOracle, ProviderOracle};
pub use series::{bucketize, TimeSeries};
pub use signals::{aggregate_signals, dedup_signals, ParticipantSignalRecord, SignalAggregate};
pub use summary::{
    build_summary, compute_participation_summary, ParticipationSummary, SummaryConfig,
};
pub use value::{effective_lock_value, effective_signal_value, effective_term_value};

/// Width, in blocks, of one bucket of the participation time series.
pub const BLOCK_BUCKET_SIZE: u64 = 600;
/// Chunk size for log queries to avoid rate limiting
pub const LOG_QUERY_CHUNK_SIZE: u64 = 50_000;
