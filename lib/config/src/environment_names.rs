// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Environment variable names read by the fastpath crates.
//!
//! ## Organization
//!
//! - **Logging**: log level, configuration file and output format
//! - **Fastpath**: startup overrides for the four kernel backends

/// Logging environment variables
pub mod logging {
    /// Log filter directives (e.g., "debug", "atfp=trace")
    pub const ATFP_LOG: &str = "ATFP_LOG";

    /// Path to logging configuration file
    pub const ATFP_LOGGING_CONFIG_PATH: &str = "ATFP_LOGGING_CONFIG_PATH";

    /// Enable JSONL logging format
    pub const ATFP_LOGGING_JSONL: &str = "ATFP_LOGGING_JSONL";

    /// Disable ANSI terminal colors in logs
    pub const ATFP_SDK_DISABLE_ANSI_LOGGING: &str = "ATFP_SDK_DISABLE_ANSI_LOGGING";
}

/// Fastpath backend configuration
pub mod fastpath {
    /// Prefix shared by the backend overrides
    pub const PREFIX: &str = "ATFP_";

    /// Path to a TOML file with backend settings
    pub const ATFP_CONFIG_PATH: &str = "ATFP_CONFIG_PATH";

    /// Math kernel
    pub const ATFP_ENABLE_MATH: &str = "ATFP_ENABLE_MATH";

    /// Multi-head attention kernel
    pub const ATFP_ENABLE_MHA: &str = "ATFP_ENABLE_MHA";

    /// Transformer encoder kernel
    pub const ATFP_ENABLE_ENCODER: &str = "ATFP_ENABLE_ENCODER";

    /// Nested tensor kernel
    pub const ATFP_ENABLE_NESTED_TENSOR: &str = "ATFP_ENABLE_NESTED_TENSOR";

    /// Backend overrides in register bit order
    pub const BACKEND_OVERRIDES: [&str; 4] = [
        ATFP_ENABLE_MATH,
        ATFP_ENABLE_MHA,
        ATFP_ENABLE_ENCODER,
        ATFP_ENABLE_NESTED_TENSOR,
    ];
}
