// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

use atfp_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FastpathError {
    /// Raw backend value outside the enumeration, or the `Error` sentinel used as a flag.
    #[error("Unknown fastpath backend: {0}")]
    UnknownBackend(i8),

    #[error("Context slot {slot} out of range (register holds {capacity} slots)")]
    SlotOutOfRange { slot: u8, capacity: u8 },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
