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

//! Cumulative participation series quantized into block buckets.

use std::collections::BTreeMap;

use alloy::primitives::U256;
use serde::Serialize;

use crate::{
    model::{RawLockEvent, RawSignalEvent},
    units::to_ether,
    LockdropError, BLOCK_BUCKET_SIZE,
};

/// Cumulative step series over block buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeries {
    /// (bucket boundary, events so far). Non-decreasing.
    pub participants_by_block: Vec<(u64, u64)>,
    /// (bucket boundary, ether locked so far). Locks only.
    pub eth_locked_by_block: Vec<(u64, f64)>,
    /// Approximate wall-clock time for raw block numbers and bucket boundaries.
    pub block_to_approx_timestamp: BTreeMap<u64, u64>,
}

/// Smallest bucket boundary at or above `block`.
pub fn bucket_ceiling(block: u64) -> u64 {
    block.div_ceil(BLOCK_BUCKET_SIZE) * BLOCK_BUCKET_SIZE
}

struct Point {
    block: u64,
    timestamp: u64,
    locked: Option<U256>,
}

/// Builds one cumulative series, merging points that fall into the same bucket.
struct StepSeries<T> {
    /// Boundary of the zero point, absent when the first event is in the bucket at block 0.
    floor: Option<u64>,
    points: Vec<(u64, T)>,
}

impl<T: Copy> StepSeries<T> {
    fn starting_at(first_block: u64, zero: T) -> Self {
        let floor = bucket_ceiling(first_block).checked_sub(BLOCK_BUCKET_SIZE);
        Self { floor, points: floor.map(|block| (block, zero)).into_iter().collect() }
    }

    fn record(&mut self, boundary: u64, value: T) {
        // The initial zero point is never overwritten.
        let started = self.points.len() > usize::from(self.floor.is_some());
        match self.points.last_mut() {
            Some(last) if started && last.0 == boundary => last.1 = value,
            _ => self.points.push((boundary, value)),
        }
    }
}

/// Merge lock and signal events by block number and build cumulative series over
/// buckets of [BLOCK_BUCKET_SIZE] blocks.
///
/// Each event belongs to the bucket boundary at or above its block. Both series start
/// with a zero point one bucket below the first relevant event, except when that event
/// is at block 0 and there is no bucket below it.
pub fn bucketize(
    locks: &[RawLockEvent],
    signals: &[RawSignalEvent],
) -> Result<TimeSeries, LockdropError> {
    let mut points: Vec<Point> = locks
        .iter()
        .map(|lock| Point {
            block: lock.block_number,
            timestamp: lock.lock_timestamp,
            locked: Some(lock.amount),
        })
        .chain(signals.iter().map(|signal| Point {
            block: signal.block_number,
            timestamp: signal.signal_timestamp,
            locked: None,
        }))
        .collect();
    points.sort_by_key(|point| point.block);

    let Some(first) = points.first() else {
        return Err(LockdropError::EmptyDataset);
    };

    let mut timestamps = BTreeMap::new();
    let mut participants = StepSeries::starting_at(first.block, 0u64);
    if let Some(floor) = participants.floor {
        timestamps.insert(floor, first.timestamp);
    }

    let mut locked_series: Option<StepSeries<U256>> = None;
    let mut participant_count = 0u64;
    let mut total_locked = U256::ZERO;

    for point in &points {
        let boundary = bucket_ceiling(point.block);
        timestamps.insert(point.block, point.timestamp);
        timestamps.insert(boundary, point.timestamp);

        participant_count += 1;
        participants.record(boundary, participant_count);

        if let Some(amount) = point.locked {
            let series = locked_series.get_or_insert_with(|| {
                let series = StepSeries::starting_at(point.block, U256::ZERO);
                if let Some(floor) = series.floor {
                    timestamps.entry(floor).or_insert(point.timestamp);
                }
                series
            });
            total_locked += amount;
            series.record(boundary, total_locked);
        }
    }

    let eth_locked_by_block = match locked_series {
        Some(series) => series
            .points
            .into_iter()
            .map(|(block, wei)| Ok((block, to_ether(wei)?)))
            .collect::<Result<Vec<_>, LockdropError>>()?,
        None => Vec::new(),
    };

    Ok(TimeSeries {
        participants_by_block: participants.points,
        eth_locked_by_block,
        block_to_approx_timestamp: timestamps,
    })
}
