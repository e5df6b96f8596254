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

//! Early-participation bonus curve.

/// 2019-06-01T00:00:00Z. The bonus curve only applies to the campaign starting here.
pub const CAMPAIGN_START: u64 = 1_559_347_200;

/// Width of one bonus window.
pub const BONUS_WINDOW_SECS: u64 = 15 * 24 * 60 * 60;

/// Multiplier applied when no time-based bonus is earned.
pub const NEUTRAL_PERCENT: u64 = 100;

/// Bonus percent per window, starting at [CAMPAIGN_START]. Window `i` ends (inclusive)
/// at `CAMPAIGN_START + (i + 1) * BONUS_WINDOW_SECS`.
const BONUS_STEPS: [u64; 6] = [150, 140, 130, 120, 110, 100];

/// Bonus multiplier, in percent, for a lock made at `lock_timestamp` in a campaign
/// starting at `campaign_start`.
///
/// Any campaign other than [CAMPAIGN_START] gets [NEUTRAL_PERCENT]. Locks after the
/// last window also get [NEUTRAL_PERCENT].
pub fn bonus_percent(lock_timestamp: u64, campaign_start: u64) -> u64 {
    if campaign_start != CAMPAIGN_START {
        return NEUTRAL_PERCENT;
    }
    BONUS_STEPS
        .iter()
        .zip(1u64..)
        .find(|(_, window)| lock_timestamp <= CAMPAIGN_START + window * BONUS_WINDOW_SECS)
        .map(|(percent, _)| *percent)
        .unwrap_or(NEUTRAL_PERCENT)
}
