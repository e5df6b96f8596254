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

//! Session cache of fetched lockdrop events.

use std::collections::HashMap;

use alloy::primitives::Address;

use crate::{
    events::{fetch_all_events, EventSource, LockdropEvents},
    LockdropError,
};

/// Identifies the event log of one lockdrop contract on one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub chain_id: u64,
    pub lockdrop_address: Address,
}

/// Historical events keyed by network and contract, so switching networks never
/// reuses another network's logs.
///
/// Entries are only written after a complete fetch succeeds; an abandoned or failed
/// fetch leaves the cache untouched.
#[derive(Debug, Default)]
pub struct EventCache {
    entries: HashMap<CacheKey, LockdropEvents>,
}

impl EventCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&LockdropEvents> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: CacheKey, events: LockdropEvents) {
        self.entries.insert(key, events);
    }

    /// Drop the events for `key`. Returns whether anything was cached.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached events for `source`, fetching them on first use.
    pub async fn get_or_fetch<S: EventSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<&LockdropEvents, LockdropError> {
        let key = source.cache_key();
        if self.entries.contains_key(&key) {
            tracing::debug!(
                "Using cached events for {} on chain {}",
                key.lockdrop_address,
                key.chain_id
            );
        } else {
            let events = fetch_all_events(source).await?;
            self.entries.insert(key, events);
        }
        Ok(&self.entries[&key])
    }
}
