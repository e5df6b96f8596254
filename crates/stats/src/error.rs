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

//! Error taxonomy for the aggregation engine.

use alloy::primitives::utils::UnitsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LockdropError {
    /// The event source or the balance oracle could not be reached.
    #[error("network unavailable: {0:#}")]
    NetworkUnavailable(anyhow::Error),

    /// There are no events to work with.
    #[error("no lock or signal events found")]
    EmptyDataset,

    #[error("invalid lock term: {0}")]
    InvalidTerm(u8),

    /// Rejected before any network call is issued.
    #[error("malformed address: {0}")]
    MalformedAddress(String),

    #[error("failed to convert amount to decimal units: {0}")]
    Units(#[from] UnitsError),

    #[error("invalid decimal amount: {0}")]
    Decimal(#[from] std::num::ParseFloatError),
}

impl LockdropError {
    /// Whether the consumer should render a "no data" state instead of a failure.
    pub fn is_empty_dataset(&self) -> bool {
        matches!(self, LockdropError::EmptyDataset)
    }
}
