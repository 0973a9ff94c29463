// SPDX-FileCopyrightText: Copyright (c) 2024-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! AT Inference Fastpath kernel controls
//!
//! Four process-wide flags decide which kernels the inference fastpath may
//! dispatch to: math, multi-head attention, encoder and nested tensor. The
//! flags live in a global context register as inverted bits (an unset bit
//! means the backend is enabled) and are read and written through
//! [`FastpathFlags`].
//!
//! ```ignore
//! let settings = FastpathSettings::builder().enable_nested_tensor(false).build()?;
//! atfp::with_kernel(settings, || run_inference(batch));
//! ```
//!
//! The free functions in this crate operate on the process-wide register.
//! Construct a [`FastpathFlags`] over your own [`ContextRegister`] to keep the
//! state isolated.

pub use anyhow::{Context as ErrorContext, Error, Result};

pub mod access;
pub mod backend;
pub mod config;
pub mod error;
pub mod flags;
pub mod kernel;
pub mod logging;
pub mod register;
pub mod trace;

pub use backend::FastpathBackend;
pub use config::{FastpathSettings, FastpathSettingsBuilder};
pub use error::FastpathError;
pub use flags::FastpathFlags;
pub use kernel::KernelGuard;
pub use register::{AtomicContextRegister, ContextRegister, ContextSlot};
pub use trace::{GlobalCtxOp, Trace};

use std::sync::OnceLock;

static GLOBAL_FLAGS: OnceLock<FastpathFlags> = OnceLock::new();

/// Flags over the process-wide register.
pub fn global() -> &'static FastpathFlags {
    GLOBAL_FLAGS.get_or_init(FastpathFlags::global)
}

/// Returns whether the math kernel is enabled.
pub fn math_enabled() -> bool {
    global().math_enabled()
}

/// Enables or disables the math kernel.
pub fn enable_math(enabled: bool) {
    global().enable_math(enabled)
}

/// Returns whether the multi-head attention kernel is enabled.
pub fn mha_enabled() -> bool {
    global().mha_enabled()
}

/// Enables or disables the multi-head attention kernel.
pub fn enable_mha(enabled: bool) {
    global().enable_mha(enabled)
}

/// Returns whether the encoder kernel is enabled.
pub fn encoder_enabled() -> bool {
    global().encoder_enabled()
}

/// Enables or disables the encoder kernel.
pub fn enable_encoder(enabled: bool) {
    global().enable_encoder(enabled)
}

/// Returns whether the nested tensor kernel is enabled.
pub fn nested_tensor_enabled() -> bool {
    global().nested_tensor_enabled()
}

/// Enables or disables the nested tensor kernel.
pub fn enable_nested_tensor(enabled: bool) {
    global().enable_nested_tensor(enabled)
}

/// Temporarily apply `settings` to the process-wide flags. The previous
/// flags come back when the guard is dropped.
#[must_use = "the previous flags are restored as soon as the guard is dropped"]
pub fn kernel(settings: FastpathSettings) -> KernelGuard<'static> {
    global().kernel(settings)
}

/// Run `f` with `settings` applied to the process-wide flags.
pub fn with_kernel<F, R>(settings: FastpathSettings, f: F) -> R
where
    F: FnOnce() -> R,
{
    global().with_kernel(settings, f)
}

/// Load [`FastpathSettings::from_settings`] and write it to the process-wide flags.
pub fn init_from_settings() -> Result<FastpathSettings> {
    let settings = FastpathSettings::from_settings()?;
    global().apply(&settings);
    tracing::info!(%settings, "fastpath backends configured");
    Ok(settings)
}
