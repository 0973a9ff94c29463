// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Configuration primitives shared by the fastpath crates.
//!
//! Flag values arrive as strings from environment variables. This crate owns the
//! vocabulary of accepted spellings and the names of every variable the fastpath
//! crates read, so both sides agree on them.

use thiserror::Error;

pub mod environment_names;

/// Spellings accepted as `true`, compared case-insensitively.
pub const TRUTHY_VALUES: [&str; 4] = ["1", "true", "on", "yes"];

/// Spellings accepted as `false`, compared case-insensitively.
pub const FALSEY_VALUES: [&str; 4] = ["0", "false", "off", "no"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "Invalid boolean value for {key}: '{value}'. Expected one of: true/false, 1/0, on/off, yes/no"
    )]
    InvalidBool { key: String, value: String },

    #[error("Failed to read environment variable {key}: {source}")]
    Env {
        key: String,
        #[source]
        source: std::env::VarError,
    },
}

/// Classify `val` as a boolean, or `None` when it is neither truthy nor falsey.
pub fn classify_bool(val: &str) -> Option<bool> {
    let lowered = val.trim().to_ascii_lowercase();
    if TRUTHY_VALUES.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSEY_VALUES.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Parse the value configured for `key`.
///
/// `key` is only used to build the error message.
pub fn parse_bool(key: &str, val: &str) -> Result<bool, ConfigError> {
    classify_bool(val).ok_or_else(|| ConfigError::InvalidBool {
        key: key.to_string(),
        value: val.to_string(),
    })
}

/// Read a boolean environment variable.
///
/// # Returns
/// * `Ok(Some(flag))` - the variable holds a recognized spelling
/// * `Ok(None)` - the variable is unset or empty
/// * `Err(_)` - the variable holds anything else, or is not unicode
pub fn env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match std::env::var(key) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => parse_bool(key, &val).map(Some),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(ConfigError::Env {
            key: key.to_string(),
            source,
        }),
    }
}

/// Lenient form of [`env_bool`]: anything but a truthy value reads as `false`.
pub fn env_is_truthy(key: &str) -> bool {
    matches!(env_bool(key), Ok(Some(true)))
}
