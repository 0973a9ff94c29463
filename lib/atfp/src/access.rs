// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Register access paths
//!
//! The facade never touches a [`ContextRegister`] directly. It goes through a
//! [`ContextAccess`] picked by [`with_access`]: the eager path when no trace
//! session is open on this thread, the traced path otherwise. Both paths leave
//! the live register in the same state.

use strum::Display;

use crate::register::{ContextRegister, ContextSlot};
use crate::trace::{self, GlobalCtxOp};

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum AccessPath {
    Eager,
    Traced,
}

/// Register operations as issued by the facade.
pub trait ContextAccess {
    fn path(&self) -> AccessPath;

    fn get_global_ctx(&self, slot: ContextSlot) -> bool;

    fn set_global_ctx(&self, slot: ContextSlot);

    fn unset_global_ctx(&self, slot: ContextSlot);
}

/// Direct register access.
pub struct EagerAccess<'a> {
    register: &'a dyn ContextRegister,
}

impl<'a> EagerAccess<'a> {
    pub fn new(register: &'a dyn ContextRegister) -> Self {
        Self { register }
    }
}

impl ContextAccess for EagerAccess<'_> {
    fn path(&self) -> AccessPath {
        AccessPath::Eager
    }

    fn get_global_ctx(&self, slot: ContextSlot) -> bool {
        self.register.get(slot)
    }

    fn set_global_ctx(&self, slot: ContextSlot) {
        self.register.set(slot)
    }

    fn unset_global_ctx(&self, slot: ContextSlot) {
        self.register.unset(slot)
    }
}

/// Records every operation into the open trace sessions, then applies it.
pub struct TracedAccess<'a> {
    register: &'a dyn ContextRegister,
}

impl<'a> TracedAccess<'a> {
    pub fn new(register: &'a dyn ContextRegister) -> Self {
        Self { register }
    }
}

impl ContextAccess for TracedAccess<'_> {
    fn path(&self) -> AccessPath {
        AccessPath::Traced
    }

    fn get_global_ctx(&self, slot: ContextSlot) -> bool {
        let value = self.register.get(slot);
        trace::push_op(GlobalCtxOp::GetGlobalCtx { slot, value });
        value
    }

    fn set_global_ctx(&self, slot: ContextSlot) {
        trace::push_op(GlobalCtxOp::SetGlobalCtx { slot });
        self.register.set(slot)
    }

    fn unset_global_ctx(&self, slot: ContextSlot) {
        trace::push_op(GlobalCtxOp::UnsetGlobalCtx { slot });
        self.register.unset(slot)
    }
}

/// Run `f` against the access path selected for the current thread.
pub fn with_access<F, R>(register: &dyn ContextRegister, f: F) -> R
where
    F: FnOnce(&dyn ContextAccess) -> R,
{
    if trace::is_tracing() {
        f(&TracedAccess::new(register))
    } else {
        f(&EagerAccess::new(register))
    }
}
