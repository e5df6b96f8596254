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

//! Effective value of locked and signaled amounts.
//!
//! All math is done on wei amounts in [U256]. Percent factors are multiplied together
//! before the single division so no intermediate rounding happens.

use alloy::primitives::U256;

use crate::{bonus::bonus_percent, model::Term};

/// Share of a signaled balance that counts, in percent.
pub const SIGNAL_PERCENT: u64 = 20;

const PERCENT: u64 = 100;

/// Effective value of a lock with a known term and bonus percent.
pub fn effective_term_value(amount: U256, term: Term, bonus_percent: u64) -> U256 {
    let factor = U256::from(term.premium_percent()) * U256::from(bonus_percent);
    amount * factor / U256::from(PERCENT * PERCENT)
}

/// Effective value of a lock event.
///
/// Unknown term tags are logged and contribute zero.
pub fn effective_lock_value(
    amount: U256,
    term: u8,
    lock_timestamp: u64,
    campaign_start: u64,
) -> U256 {
    match Term::try_from(term) {
        Ok(term) => {
            effective_term_value(amount, term, bonus_percent(lock_timestamp, campaign_start))
        }
        Err(err) => {
            tracing::error!("Found invalid term, counting lock as zero: {err}");
            U256::ZERO
        }
    }
}

/// Effective value of a signaled balance. The bonus curve does not apply.
pub fn effective_signal_value(balance: U256) -> U256 {
    balance * U256::from(SIGNAL_PERCENT) / U256::from(PERCENT)
}
