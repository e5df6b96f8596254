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

//! Raw event types produced by the event source.

use alloy::primitives::{Address, Bytes, U256};
use serde::Serialize;

use crate::LockdropError;

/// Destination-chain public key supplied by a participant. Used as the grouping key.
pub type ParticipantKey = Bytes;

/// Lock duration chosen by the locker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Term {
    ThreeMonth,
    SixMonth,
    TwelveMonth,
}

impl Term {
    pub const ALL: [Term; 3] = [Term::ThreeMonth, Term::SixMonth, Term::TwelveMonth];

    /// Term premium in percent, applied on top of the bonus curve.
    pub const fn premium_percent(self) -> u64 {
        match self {
            Term::ThreeMonth => 100,
            Term::SixMonth => 130,
            Term::TwelveMonth => 220,
        }
    }
}

impl TryFrom<u8> for Term {
    type Error = LockdropError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Term::ThreeMonth),
            1 => Ok(Term::SixMonth),
            2 => Ok(Term::TwelveMonth),
            other => Err(LockdropError::InvalidTerm(other)),
        }
    }
}

impl From<Term> for u8 {
    fn from(term: Term) -> Self {
        match term {
            Term::ThreeMonth => 0,
            Term::SixMonth => 1,
            Term::TwelveMonth => 2,
        }
    }
}

/// A decoded `Locked` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawLockEvent {
    pub participant_key: ParticipantKey,
    /// Account that created the lock.
    pub owner: Address,
    /// Lock contract holding the funds.
    pub lock_address: Address,
    /// Amount in wei.
    pub amount: U256,
    /// Term tag as emitted on chain. Not guaranteed to be a known [Term].
    pub term: u8,
    pub lock_timestamp: u64,
    pub is_validator: bool,
    pub block_number: u64,
}

impl RawLockEvent {
    pub fn term(&self) -> Result<Term, LockdropError> {
        Term::try_from(self.term)
    }
}

/// A decoded `Signaled` event. The signaled value is not part of the event, it is
/// the current balance of `source_address`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawSignalEvent {
    pub source_address: Address,
    pub participant_key: ParticipantKey,
    pub signal_timestamp: u64,
    pub block_number: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    Locked,
    Signaled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawEvent {
    Lock(RawLockEvent),
    Signal(RawSignalEvent),
}

impl RawEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            RawEvent::Lock(_) => EventKind::Locked,
            RawEvent::Signal(_) => EventKind::Signaled,
        }
    }

    pub fn block_number(&self) -> u64 {
        match self {
            RawEvent::Lock(lock) => lock.block_number,
            RawEvent::Signal(signal) => signal.block_number,
        }
    }

    pub fn timestamp(&self) -> u64 {
        match self {
            RawEvent::Lock(lock) => lock.lock_timestamp,
            RawEvent::Signal(signal) => signal.signal_timestamp,
        }
    }

    pub fn participant_key(&self) -> &ParticipantKey {
        match self {
            RawEvent::Lock(lock) => &lock.participant_key,
            RawEvent::Signal(signal) => &signal.participant_key,
        }
    }
}

impl From<RawLockEvent> for RawEvent {
    fn from(event: RawLockEvent) -> Self {
        RawEvent::Lock(event)
    }
}

impl From<RawSignalEvent> for RawEvent {
    fn from(event: RawSignalEvent) -> Self {
        RawEvent::Signal(event)
    }
}
