// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

//! Ahead-of-time trace sessions
//!
//! While a session is active on a thread, every register operation issued by
//! the fastpath facade on that thread is recorded as a [`GlobalCtxOp`] so the
//! same flag changes can be replayed later against another register. Sessions
//! nest; an operation is recorded into every session open on the thread.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::register::{ContextRegister, ContextSlot};

thread_local! {
    /// Open sessions on this thread, innermost last
    static ACTIVE_SESSIONS: RefCell<Vec<Vec<GlobalCtxOp>>> = const { RefCell::new(Vec::new()) };
}

/// One recorded register operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GlobalCtxOp {
    /// A read, with the raw bit observed at record time
    GetGlobalCtx { slot: ContextSlot, value: bool },
    SetGlobalCtx { slot: ContextSlot },
    UnsetGlobalCtx { slot: ContextSlot },
}

impl GlobalCtxOp {
    pub fn slot(&self) -> ContextSlot {
        match self {
            Self::GetGlobalCtx { slot, .. }
            | Self::SetGlobalCtx { slot }
            | Self::UnsetGlobalCtx { slot } => *slot,
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::GetGlobalCtx { .. })
    }
}

/// Operations recorded by one session, in issue order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    ops: Vec<GlobalCtxOp>,
}

impl Trace {
    pub fn ops(&self) -> &[GlobalCtxOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Re-apply the recorded mutations to `register`. Reads are skipped.
    pub fn replay(&self, register: &dyn ContextRegister) {
        let mut applied = 0usize;
        for op in &self.ops {
            match *op {
                GlobalCtxOp::GetGlobalCtx { .. } => continue,
                GlobalCtxOp::SetGlobalCtx { slot } => register.set(slot),
                GlobalCtxOp::UnsetGlobalCtx { slot } => register.unset(slot),
            }
            applied += 1;
        }
        tracing::debug!(recorded = self.ops.len(), applied, "replayed fastpath trace");
    }
}

/// Whether a trace session is open on the current thread.
pub fn is_tracing() -> bool {
    ACTIVE_SESSIONS.with(|sessions| !sessions.borrow().is_empty())
}

/// Run `f` inside a new trace session and return what it recorded.
///
/// If `f` panics the session is closed and its recording discarded.
pub fn record<F, R>(f: F) -> (R, Trace)
where
    F: FnOnce() -> R,
{
    let session = Session::open();
    let result = f();
    (result, session.close())
}

pub(crate) fn push_op(op: GlobalCtxOp) {
    ACTIVE_SESSIONS.with(|sessions| {
        for recording in sessions.borrow_mut().iter_mut() {
            recording.push(op);
        }
    });
}

struct Session {
    closed: bool,
}

impl Session {
    fn open() -> Self {
        ACTIVE_SESSIONS.with(|sessions| sessions.borrow_mut().push(Vec::new()));
        Session { closed: false }
    }

    fn close(mut self) -> Trace {
        self.closed = true;
        let ops = ACTIVE_SESSIONS
            .with(|sessions| sessions.borrow_mut().pop())
            .unwrap_or_default();
        Trace { ops }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed {
            ACTIVE_SESSIONS.with(|sessions| sessions.borrow_mut().pop());
        }
    }
}
