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

//! Balance, timestamp and storage reads against the chain.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    rpc::types::{BlockId, BlockNumberOrTag},
};
use anyhow::Context;
use async_trait::async_trait;

/// Read-only view of chain state used to value signals and inspect locks.
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    /// Balance of `address` in wei, at `at_block` if given, otherwise at the latest block.
    async fn get_balance(&self, address: Address, at_block: Option<u64>) -> anyhow::Result<U256>;

    /// Timestamp of the latest block.
    async fn current_timestamp(&self) -> anyhow::Result<u64>;

    /// Raw value of storage slot `slot` of the contract at `address`.
    async fn storage_slot(&self, address: Address, slot: U256) -> anyhow::Result<U256>;
}

/// [BalanceOracle] backed by an RPC provider.
#[derive(Clone, Debug)]
pub struct ProviderOracle<P> {
    provider: P,
}

impl<P> ProviderOracle<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P> BalanceOracle for ProviderOracle<P>
where
    P: Provider + Send + Sync,
{
    async fn get_balance(&self, address: Address, at_block: Option<u64>) -> anyhow::Result<U256> {
        let request = self.provider.get_balance(address);
        let balance = match at_block {
            Some(block) => request.block_id(BlockId::number(block)).await,
            None => request.await,
        };
        balance.with_context(|| format!("Failed to get balance of {address}"))
    }

    async fn current_timestamp(&self) -> anyhow::Result<u64> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .context("Failed to get latest block")?
            .context("Latest block not found")?;
        Ok(block.header.timestamp)
    }

    async fn storage_slot(&self, address: Address, slot: U256) -> anyhow::Result<U256> {
        self.provider
            .get_storage_at(address, slot)
            .await
            .with_context(|| format!("Failed to read storage slot {slot} of {address}"))
    }
}
