// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use anyhow::{Context, Result};
use atfp_config::environment_names::fastpath as env_fastpath;
use derive_builder::Builder;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::backend::FastpathBackend;
use crate::error::FastpathError;

/// System-wide settings file
const SYSTEM_CONFIG_PATH: &str = "/opt/atfp/etc/fastpath.toml";

/// Requested enablement of the four fastpath backends.
///
/// Used both as the argument of a scoped kernel configuration and as the
/// startup configuration of the process-wide register. Every backend defaults
/// to enabled.
#[derive(Serialize, Deserialize, Debug, Builder, Clone, Copy, PartialEq, Eq, Hash)]
#[builder(build_fn(private, name = "build_internal"), derive(Debug, Serialize))]
pub struct FastpathSettings {
    /// Set this at runtime with environment variable ATFP_ENABLE_MATH
    #[builder(default = "true")]
    #[builder_field_attr(serde(skip_serializing_if = "Option::is_none"))]
    pub enable_math: bool,

    /// Set this at runtime with environment variable ATFP_ENABLE_MHA
    #[builder(default = "true")]
    #[builder_field_attr(serde(skip_serializing_if = "Option::is_none"))]
    pub enable_mha: bool,

    /// Set this at runtime with environment variable ATFP_ENABLE_ENCODER
    #[builder(default = "true")]
    #[builder_field_attr(serde(skip_serializing_if = "Option::is_none"))]
    pub enable_encoder: bool,

    /// Set this at runtime with environment variable ATFP_ENABLE_NESTED_TENSOR
    #[builder(default = "true")]
    #[builder_field_attr(serde(skip_serializing_if = "Option::is_none"))]
    pub enable_nested_tensor: bool,
}

impl Default for FastpathSettings {
    fn default() -> Self {
        Self::all_enabled()
    }
}

impl fmt::Display for FastpathSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "math={}, ", self.enable_math)?;
        write!(f, "mha={}, ", self.enable_mha)?;
        write!(f, "encoder={}, ", self.enable_encoder)?;
        write!(f, "nested_tensor={}", self.enable_nested_tensor)
    }
}

impl FastpathSettings {
    pub fn builder() -> FastpathSettingsBuilder {
        FastpathSettingsBuilder::default()
    }

    pub fn all_enabled() -> Self {
        Self::uniform(true)
    }

    pub fn all_disabled() -> Self {
        Self::uniform(false)
    }

    fn uniform(enabled: bool) -> Self {
        Self {
            enable_math: enabled,
            enable_mha: enabled,
            enable_encoder: enabled,
            enable_nested_tensor: enabled,
        }
    }

    /// Requested value for `backend`; `None` for the `Error` sentinel.
    pub fn get(&self, backend: FastpathBackend) -> Option<bool> {
        match backend {
            FastpathBackend::Error => None,
            FastpathBackend::Math => Some(self.enable_math),
            FastpathBackend::Mha => Some(self.enable_mha),
            FastpathBackend::Encoder => Some(self.enable_encoder),
            FastpathBackend::NestedTensor => Some(self.enable_nested_tensor),
        }
    }

    /// `(backend, enabled)` pairs in register bit order.
    pub fn entries(&self) -> [(FastpathBackend, bool); FastpathBackend::BITS as usize] {
        [
            (FastpathBackend::Math, self.enable_math),
            (FastpathBackend::Mha, self.enable_mha),
            (FastpathBackend::Encoder, self.enable_encoder),
            (FastpathBackend::NestedTensor, self.enable_nested_tensor),
        ]
    }

    /// Settings whose backend bits follow the low four bits of `mask`
    /// (bit set means enabled, bit 0 is math).
    pub fn from_enabled_mask(mask: u8) -> Self {
        Self {
            enable_math: mask & 0b0001 != 0,
            enable_mha: mask & 0b0010 != 0,
            enable_encoder: mask & 0b0100 != 0,
            enable_nested_tensor: mask & 0b1000 != 0,
        }
    }

    pub(crate) fn figment() -> Result<Figment> {
        let config_path = std::env::var(env_fastpath::ATFP_CONFIG_PATH).unwrap_or_default();
        Ok(Figment::new()
            .merge(Serialized::defaults(FastpathSettings::default()))
            .merge(Toml::file(SYSTEM_CONFIG_PATH))
            .merge(Toml::file(config_path))
            .merge(Serialized::defaults(Self::env_overrides()?)))
    }

    /// Backend overrides from `ATFP_ENABLE_*`. Unset and empty variables are skipped.
    fn env_overrides() -> Result<FastpathSettingsBuilder> {
        let mut overrides = FastpathSettingsBuilder::default();
        for (backend, key) in FastpathBackend::all()
            .into_iter()
            .zip(env_fastpath::BACKEND_OVERRIDES)
        {
            let Some(enabled) = atfp_config::env_bool(key)
                .map_err(FastpathError::from)
                .with_context(|| format!("invalid {backend} backend override"))?
            else {
                continue;
            };
            tracing::warn!(%backend, enabled, "{key} overrides fastpath backend");
            match backend {
                FastpathBackend::Math => overrides.enable_math(enabled),
                FastpathBackend::Mha => overrides.enable_mha(enabled),
                FastpathBackend::Encoder => overrides.enable_encoder(enabled),
                FastpathBackend::NestedTensor => overrides.enable_nested_tensor(enabled),
                FastpathBackend::Error => continue,
            };
        }
        Ok(overrides)
    }

    /// Load the startup settings
    /// Configuration is prioritized in the following order, where the last has the lowest priority:
    /// 1. `ATFP_ENABLE_*` environment variables
    /// 2. TOML file named by `ATFP_CONFIG_PATH`
    /// 3. /opt/atfp/etc/fastpath.toml
    /// 4. Defaults (every backend enabled)
    pub fn from_settings() -> Result<FastpathSettings> {
        let settings: FastpathSettings = Self::figment()?
            .extract()
            .context("failed to load fastpath settings")?;
        Ok(settings)
    }
}

impl FastpathSettingsBuilder {
    /// Build the settings; unset fields default to enabled.
    pub fn build(&self) -> Result<FastpathSettings> {
        Ok(self.build_internal()?)
    }
}
