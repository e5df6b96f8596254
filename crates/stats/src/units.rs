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

//! Conversion of wei amounts to decimal ether for presentation.

use alloy::primitives::{utils::format_units, U256};

use crate::LockdropError;

/// Format wei as a decimal ether string.
pub fn format_ether(wei: U256) -> Result<String, LockdropError> {
    Ok(format_units(wei, "ether")?)
}

/// Convert wei to ether as a float. Only used at presentation boundaries.
pub fn to_ether(wei: U256) -> Result<f64, LockdropError> {
    Ok(format_ether(wei)?.parse::<f64>()?)
}
