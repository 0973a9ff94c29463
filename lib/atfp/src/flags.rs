// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Enable flags of the fastpath backends
//!
//! The register stores each flag inverted: the default state of a backend is
//! enabled and is represented by an unset bit, so a set bit disables the
//! backend. Getters and setters translate between the two.

use std::sync::Arc;

use crate::access::with_access;
use crate::backend::FastpathBackend;
use crate::config::FastpathSettings;
use crate::error::FastpathError;
use crate::kernel::KernelGuard;
use crate::register::{ContextRegister, ContextSlot, global_register};

/// Enablement every backend has when its bit is unset.
pub const DEFAULT_ENABLED: bool = true;

/// Facade over the enable bits of a [`ContextRegister`].
#[derive(Clone, Debug)]
pub struct FastpathFlags {
    register: Arc<dyn ContextRegister>,
}

impl FastpathFlags {
    pub fn new(register: Arc<dyn ContextRegister>) -> Self {
        Self { register }
    }

    /// Flags over the process-wide register.
    pub fn global() -> Self {
        Self::new(global_register())
    }

    pub fn register(&self) -> &Arc<dyn ContextRegister> {
        &self.register
    }

    fn is_global_ctx(&self, slot: ContextSlot, default: bool) -> bool {
        with_access(self.register.as_ref(), |access| {
            let raw = access.get_global_ctx(slot);
            tracing::trace!(%slot, raw, path = %access.path(), "read fastpath flag");
            raw != default
        })
    }

    fn write_global_ctx(&self, slot: ContextSlot, enabled: bool, default: bool) {
        with_access(self.register.as_ref(), |access| {
            let raw = enabled != default;
            if raw {
                access.set_global_ctx(slot);
            } else {
                access.unset_global_ctx(slot);
            }
            tracing::debug!(%slot, enabled, raw, path = %access.path(), "wrote fastpath flag");
        })
    }

    /// Whether the math kernel is enabled.
    pub fn math_enabled(&self) -> bool {
        self.is_global_ctx(ContextSlot::MATH, DEFAULT_ENABLED)
    }

    /// Enable or disable the math kernel.
    pub fn enable_math(&self, enabled: bool) {
        self.write_global_ctx(ContextSlot::MATH, enabled, DEFAULT_ENABLED)
    }

    /// Whether the multi-head attention kernel is enabled.
    pub fn mha_enabled(&self) -> bool {
        self.is_global_ctx(ContextSlot::MHA, DEFAULT_ENABLED)
    }

    /// Enable or disable the multi-head attention kernel.
    pub fn enable_mha(&self, enabled: bool) {
        self.write_global_ctx(ContextSlot::MHA, enabled, DEFAULT_ENABLED)
    }

    /// Whether the encoder kernel is enabled.
    pub fn encoder_enabled(&self) -> bool {
        self.is_global_ctx(ContextSlot::ENCODER, DEFAULT_ENABLED)
    }

    /// Enable or disable the encoder kernel.
    pub fn enable_encoder(&self, enabled: bool) {
        self.write_global_ctx(ContextSlot::ENCODER, enabled, DEFAULT_ENABLED)
    }

    /// Whether the nested tensor kernel is enabled.
    pub fn nested_tensor_enabled(&self) -> bool {
        self.is_global_ctx(ContextSlot::NESTED_TENSOR, DEFAULT_ENABLED)
    }

    /// Enable or disable the nested tensor kernel.
    pub fn enable_nested_tensor(&self, enabled: bool) {
        self.write_global_ctx(ContextSlot::NESTED_TENSOR, enabled, DEFAULT_ENABLED)
    }

    pub fn is_enabled(&self, backend: FastpathBackend) -> Result<bool, FastpathError> {
        Ok(self.is_global_ctx(backend.slot()?, DEFAULT_ENABLED))
    }

    pub fn set_enabled(
        &self,
        backend: FastpathBackend,
        enabled: bool,
    ) -> Result<(), FastpathError> {
        self.write_global_ctx(backend.slot()?, enabled, DEFAULT_ENABLED);
        Ok(())
    }

    /// Current flags, read in bit order.
    pub fn snapshot(&self) -> FastpathSettings {
        FastpathSettings {
            enable_math: self.math_enabled(),
            enable_mha: self.mha_enabled(),
            enable_encoder: self.encoder_enabled(),
            enable_nested_tensor: self.nested_tensor_enabled(),
        }
    }

    /// Write all four flags in bit order. Nothing is restored afterwards.
    pub fn apply(&self, settings: &FastpathSettings) {
        self.enable_math(settings.enable_math);
        self.enable_mha(settings.enable_mha);
        self.enable_encoder(settings.enable_encoder);
        self.enable_nested_tensor(settings.enable_nested_tensor);
    }

    /// Apply `settings` until the returned guard is dropped, then restore
    /// the flags captured on entry.
    #[must_use = "the previous flags are restored as soon as the guard is dropped"]
    pub fn kernel(&self, settings: FastpathSettings) -> KernelGuard<'_> {
        KernelGuard::enter(self, settings)
    }

    /// Run `f` with `settings` applied. The entry flags are restored however
    /// `f` exits, including by panic.
    pub fn with_kernel<F, R>(&self, settings: FastpathSettings, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = self.kernel(settings);
        f()
    }
}

impl Default for FastpathFlags {
    fn default() -> Self {
        Self::global()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::AtomicContextRegister;
    use crate::trace;
    use crate::trace::GlobalCtxOp;
    use rstest::rstest;

    fn isolated() -> (Arc<AtomicContextRegister>, FastpathFlags) {
        let register = Arc::new(AtomicContextRegister::new());
        let flags = FastpathFlags::new(register.clone());
        (register, flags)
    }

    #[test]
    fn test_fresh_register_enables_everything() {
        let (register, flags) = isolated();
        assert!(flags.math_enabled());
        assert!(flags.mha_enabled());
        assert!(flags.encoder_enabled());
        assert!(flags.nested_tensor_enabled());
        assert_eq!(flags.snapshot(), FastpathSettings::all_enabled());
        assert_eq!(register.raw_bits(), 0);
    }

    #[rstest]
    #[case(FastpathBackend::Math)]
    #[case(FastpathBackend::Mha)]
    #[case(FastpathBackend::Encoder)]
    #[case(FastpathBackend::NestedTensor)]
    fn test_set_then_get(#[case] backend: FastpathBackend) {
        let (_, flags) = isolated();
        for enabled in [false, true, false, false, true] {
            flags.set_enabled(backend, enabled).unwrap();
            assert_eq!(flags.is_enabled(backend).unwrap(), enabled);
        }
    }

    #[rstest]
    #[case(FastpathBackend::Math, 0b0001)]
    #[case(FastpathBackend::Mha, 0b0010)]
    #[case(FastpathBackend::Encoder, 0b0100)]
    #[case(FastpathBackend::NestedTensor, 0b1000)]
    fn test_disabling_sets_the_bit(#[case] backend: FastpathBackend, #[case] bit: u64) {
        let (register, flags) = isolated();
        flags.set_enabled(backend, false).unwrap();
        assert_eq!(register.raw_bits(), bit);
        flags.set_enabled(backend, true).unwrap();
        assert_eq!(register.raw_bits(), 0);
    }

    #[test]
    fn test_named_accessors_match_indexed_accessors() {
        let (_, flags) = isolated();
        flags.enable_math(false);
        flags.enable_encoder(false);
        assert!(!flags.is_enabled(FastpathBackend::Math).unwrap());
        assert!(flags.is_enabled(FastpathBackend::Mha).unwrap());
        assert!(!flags.is_enabled(FastpathBackend::Encoder).unwrap());
        assert!(flags.is_enabled(FastpathBackend::NestedTensor).unwrap());

        flags.set_enabled(FastpathBackend::Mha, false).unwrap();
        flags.set_enabled(FastpathBackend::Math, true).unwrap();
        assert!(flags.math_enabled());
        assert!(!flags.mha_enabled());
    }

    #[test]
    fn test_error_backend_is_rejected() {
        let (register, flags) = isolated();
        assert!(matches!(
            flags.is_enabled(FastpathBackend::Error),
            Err(FastpathError::UnknownBackend(-1))
        ));
        assert!(flags.set_enabled(FastpathBackend::Error, false).is_err());
        assert_eq!(register.raw_bits(), 0);
    }

    #[test]
    fn test_raw_bits_read_inverted() {
        let (register, flags) = isolated();
        register.set(ContextSlot::NESTED_TENSOR);
        assert!(!flags.nested_tensor_enabled());
        assert!(flags.math_enabled());
    }

    #[test]
    fn test_apply_and_snapshot() {
        let (register, flags) = isolated();
        let settings = FastpathSettings::from_enabled_mask(0b1010);
        flags.apply(&settings);
        assert_eq!(flags.snapshot(), settings);
        assert_eq!(register.raw_bits(), 0b0101);
    }

    #[test]
    fn test_traced_writes_are_recorded_and_applied() {
        let (register, flags) = isolated();
        let ((), recorded) = trace::record(|| {
            flags.enable_mha(false);
            assert!(!flags.mha_enabled());
            flags.enable_mha(true);
        });
        assert_eq!(register.raw_bits(), 0);
        assert_eq!(
            recorded.ops(),
            &[
                GlobalCtxOp::SetGlobalCtx {
                    slot: ContextSlot::MHA
                },
                GlobalCtxOp::GetGlobalCtx {
                    slot: ContextSlot::MHA,
                    value: true
                },
                GlobalCtxOp::UnsetGlobalCtx {
                    slot: ContextSlot::MHA
                },
            ]
        );
    }

    #[test]
    fn test_replay_reproduces_traced_flags() {
        let (_, flags) = isolated();
        let ((), recorded) = trace::record(|| {
            flags.apply(&FastpathSettings::from_enabled_mask(0b0110));
        });

        let (replica_register, replica) = isolated();
        recorded.replay(&*replica_register);
        assert_eq!(replica.snapshot(), flags.snapshot());
    }
}
