// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Global context register
//!
//! A bit-addressable store used to pass lightweight flags into kernel dispatch
//! without threading them through every call. The fastpath only ever touches
//! the low [`FastpathBackend::BITS`](crate::FastpathBackend::BITS) slots.
//!
//! Each single-slot operation is atomic. Nothing here makes a group of writes
//! atomic; callers that update several slots may be observed mid-transition.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::FastpathError;

/// Index of one bit in a [`ContextRegister`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ContextSlot(u8);

impl ContextSlot {
    /// Number of slots an [`AtomicContextRegister`] holds.
    pub const CAPACITY: u8 = u64::BITS as u8;

    pub const MATH: ContextSlot = ContextSlot(0);
    pub const MHA: ContextSlot = ContextSlot(1);
    pub const ENCODER: ContextSlot = ContextSlot(2);
    pub const NESTED_TENSOR: ContextSlot = ContextSlot(3);

    pub fn new(index: u8) -> Result<Self, FastpathError> {
        if index >= Self::CAPACITY {
            return Err(FastpathError::SlotOutOfRange {
                slot: index,
                capacity: Self::CAPACITY,
            });
        }
        Ok(ContextSlot(index))
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    fn mask(&self) -> u64 {
        1u64 << self.0
    }
}

impl TryFrom<u8> for ContextSlot {
    type Error = FastpathError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        ContextSlot::new(index)
    }
}

impl From<ContextSlot> for u8 {
    fn from(slot: ContextSlot) -> Self {
        slot.0
    }
}

impl fmt::Display for ContextSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx[{}]", self.0)
    }
}

/// Storage primitives of the global context register.
///
/// Implementations must be shareable across threads; every call is a single
/// synchronous read or write.
pub trait ContextRegister: Send + Sync + fmt::Debug {
    /// Raw bit value of `slot`.
    fn get(&self, slot: ContextSlot) -> bool;

    /// Write 1 to `slot`.
    fn set(&self, slot: ContextSlot);

    /// Write 0 to `slot`.
    fn unset(&self, slot: ContextSlot);
}

/// [`ContextRegister`] backed by a single `AtomicU64`.
#[derive(Debug, Default)]
pub struct AtomicContextRegister {
    bits: AtomicU64,
}

impl AtomicContextRegister {
    /// A fresh register with every bit unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// All 64 raw bits.
    pub fn raw_bits(&self) -> u64 {
        self.bits.load(Ordering::Acquire)
    }

    /// Clear every bit.
    pub fn reset(&self) {
        self.bits.store(0, Ordering::Release);
    }
}

impl ContextRegister for AtomicContextRegister {
    fn get(&self, slot: ContextSlot) -> bool {
        self.bits.load(Ordering::Acquire) & slot.mask() != 0
    }

    fn set(&self, slot: ContextSlot) {
        self.bits.fetch_or(slot.mask(), Ordering::AcqRel);
    }

    fn unset(&self, slot: ContextSlot) {
        self.bits.fetch_and(!slot.mask(), Ordering::AcqRel);
    }
}

static GLOBAL_REGISTER: OnceLock<Arc<AtomicContextRegister>> = OnceLock::new();

/// The process-wide register, created on first use.
pub fn global_register() -> Arc<AtomicContextRegister> {
    GLOBAL_REGISTER
        .get_or_init(|| Arc::new(AtomicContextRegister::new()))
        .clone()
}
