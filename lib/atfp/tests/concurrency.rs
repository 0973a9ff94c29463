// SPDX-FileCopyrightText: Copyright (c) 2025-2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::thread;

use atfp::{AtomicContextRegister, FastpathBackend, FastpathFlags, trace};

const ITERATIONS: usize = 10_000;

fn toggle(flags: &FastpathFlags, backend: FastpathBackend) {
    for i in 0..ITERATIONS {
        let enabled = i % 2 == 0;
        flags.set_enabled(backend, enabled).unwrap();
        assert_eq!(flags.is_enabled(backend).unwrap(), enabled);
    }
}

#[test]
fn test_independent_backends_do_not_interfere() {
    let flags = FastpathFlags::new(Arc::new(AtomicContextRegister::new()));

    thread::scope(|s| {
        s.spawn(|| toggle(&flags, FastpathBackend::Math));
        s.spawn(|| toggle(&flags, FastpathBackend::NestedTensor));
    });

    // the last write of each loop disables
    assert!(!flags.math_enabled());
    assert!(!flags.nested_tensor_enabled());
    assert!(flags.mha_enabled());
    assert!(flags.encoder_enabled());
}

#[test]
fn test_all_backends_from_separate_threads() {
    let register = Arc::new(AtomicContextRegister::new());
    let flags = FastpathFlags::new(register.clone());

    thread::scope(|s| {
        for backend in FastpathBackend::all() {
            let flags = flags.clone();
            s.spawn(move || toggle(&flags, backend));
        }
    });

    assert_eq!(register.raw_bits(), 0b1111);
}

#[test]
fn test_trace_sessions_are_per_thread() {
    let flags = FastpathFlags::new(Arc::new(AtomicContextRegister::new()));

    let ((), recorded) = trace::record(|| {
        thread::scope(|s| {
            s.spawn(|| {
                assert!(!trace::is_tracing());
                flags.enable_encoder(false);
            });
        });
        flags.enable_mha(false);
    });

    assert_eq!(recorded.len(), 1);
    assert!(!flags.encoder_enabled());
    assert!(!flags.mha_enabled());
}
