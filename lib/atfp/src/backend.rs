// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::FastpathError;
use crate::register::ContextSlot;

/// Kernel backends of the AT Inference Fastpath.
///
/// The discriminant of each real backend is the index of its bit in the
/// global context register. `Error` is a sentinel and owns no bit.
#[derive(Copy, Debug, Clone, Display, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[repr(i8)]
pub enum FastpathBackend {
    #[strum(serialize = "error")]
    Error = -1,
    /// Reference math implementation
    #[strum(serialize = "math")]
    Math = 0,
    /// Fused multi-head attention
    #[strum(serialize = "mha")]
    Mha = 1,
    /// Fused transformer encoder layer
    #[strum(serialize = "encoder")]
    Encoder = 2,
    /// Nested tensor (padding-free) path
    #[strum(serialize = "nested_tensor")]
    NestedTensor = 3,
}

impl FastpathBackend {
    /// Number of register bits used by the backends.
    pub const BITS: u8 = 4;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Math => "math",
            Self::Mha => "mha",
            Self::Encoder => "encoder",
            Self::NestedTensor => "nested_tensor",
        }
    }

    /// The real backends, in register bit order.
    pub fn all() -> [FastpathBackend; FastpathBackend::BITS as usize] {
        [Self::Math, Self::Mha, Self::Encoder, Self::NestedTensor]
    }

    /// Decode a raw backend value. `-1` decodes to the `Error` sentinel.
    pub fn from_raw(value: i8) -> Result<Self, FastpathError> {
        match value {
            -1 => Ok(Self::Error),
            0 => Ok(Self::Math),
            1 => Ok(Self::Mha),
            2 => Ok(Self::Encoder),
            3 => Ok(Self::NestedTensor),
            other => Err(FastpathError::UnknownBackend(other)),
        }
    }

    /// Register slot backing this backend's enable flag.
    pub fn slot(&self) -> Result<ContextSlot, FastpathError> {
        match self {
            Self::Error => Err(FastpathError::UnknownBackend(*self as i8)),
            Self::Math => Ok(ContextSlot::MATH),
            Self::Mha => Ok(ContextSlot::MHA),
            Self::Encoder => Ok(ContextSlot::ENCODER),
            Self::NestedTensor => Ok(ContextSlot::NESTED_TENSOR),
        }
    }
}

impl TryFrom<i8> for FastpathBackend {
    type Error = FastpathError;

    fn try_from(value: i8) -> Result<Self, FastpathError> {
        FastpathBackend::from_raw(value)
    }
}

impl From<FastpathBackend> for i8 {
    fn from(backend: FastpathBackend) -> Self {
        backend as i8
    }
}
