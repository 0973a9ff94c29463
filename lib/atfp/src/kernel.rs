// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Scoped fastpath kernel configuration

use crate::config::FastpathSettings;
use crate::flags::FastpathFlags;

/// Restores the fastpath flags captured at entry when dropped.
///
/// Entry reads the four flags in bit order, then writes the requested ones in
/// the same order. Drop writes the captured values back in that order again,
/// on every exit path including panics. Flags changed by other threads while
/// the guard is alive are overwritten too.
#[must_use = "the previous flags are restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct KernelGuard<'a> {
    flags: &'a FastpathFlags,
    previous: FastpathSettings,
}

impl<'a> KernelGuard<'a> {
    pub(crate) fn enter(flags: &'a FastpathFlags, settings: FastpathSettings) -> Self {
        let previous = flags.snapshot();
        // restore on unwind even if applying panics part way through
        let guard = KernelGuard { flags, previous };
        flags.apply(&settings);
        tracing::debug!(%previous, requested = %settings, "entered fastpath kernel scope");
        guard
    }

    /// Flags captured on entry.
    pub fn previous(&self) -> &FastpathSettings {
        &self.previous
    }
}

impl Drop for KernelGuard<'_> {
    fn drop(&mut self) {
        self.flags.apply(&self.previous);
        tracing::debug!(restored = %self.previous, "exited fastpath kernel scope");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::register::AtomicContextRegister;

    fn isolated() -> FastpathFlags {
        FastpathFlags::new(Arc::new(AtomicContextRegister::new()))
    }

    #[test]
    fn test_default_request_enables_everything() {
        let flags = isolated();
        flags.apply(&FastpathSettings::all_disabled());
        {
            let guard = flags.kernel(FastpathSettings::default());
            assert_eq!(flags.snapshot(), FastpathSettings::all_enabled());
            assert_eq!(guard.previous(), &FastpathSettings::all_disabled());
        }
        assert_eq!(flags.snapshot(), FastpathSettings::all_disabled());
    }

    #[test]
    fn test_restores_every_combination() {
        let flags = isolated();
        for entry in 0..16u8 {
            for requested in 0..16u8 {
                let entry = FastpathSettings::from_enabled_mask(entry);
                let requested = FastpathSettings::from_enabled_mask(requested);
                flags.apply(&entry);
                {
                    let _guard = flags.kernel(requested);
                    assert_eq!(flags.snapshot(), requested);
                }
                assert_eq!(flags.snapshot(), entry);
            }
        }
    }

    #[test]
    fn test_restores_changes_made_inside_the_scope() {
        let flags = isolated();
        let requested = FastpathSettings::builder()
            .enable_encoder(false)
            .build()
            .unwrap();
        flags.with_kernel(requested, || {
            assert!(!flags.encoder_enabled());
            flags.enable_math(false);
            flags.enable_encoder(true);
        });
        assert_eq!(flags.snapshot(), FastpathSettings::all_enabled());
    }

    #[test]
    fn test_with_kernel_returns_closure_result() {
        let flags = isolated();
        let seen = flags.with_kernel(FastpathSettings::from_enabled_mask(0b0011), || {
            flags.snapshot()
        });
        assert_eq!(seen, FastpathSettings::from_enabled_mask(0b0011));
        assert_eq!(flags.snapshot(), FastpathSettings::all_enabled());
    }

    #[test]
    fn test_nested_scopes_unwind_in_order() {
        let flags = isolated();
        let outer = FastpathSettings::from_enabled_mask(0b1100);
        let inner = FastpathSettings::from_enabled_mask(0b0110);
        {
            let _outer = flags.kernel(outer);
            {
                let _inner = flags.kernel(inner);
                assert_eq!(flags.snapshot(), inner);
            }
            assert_eq!(flags.snapshot(), outer);
        }
        assert_eq!(flags.snapshot(), FastpathSettings::all_enabled());
    }
}
