// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use trustchain_precompile::{Execution, Precompile, PrecompileError, Selector, TrustChainPrecompile};

fuzz_target!(|data: &[u8]| {
    let exec = Execution::new(1_700_000_000);
    let p = TrustChainPrecompile::default();

    let raw = p.run(data, &exec);
    assert!(!matches!(raw, Err(PrecompileError::Fault(_))));

    // Replay the payload under every selector so argument decoding is reached.
    for selector in Selector::ALL {
        let mut input = selector.bytes().to_vec();
        input.extend_from_slice(data);
        let out = p.run(&input, &exec);
        assert!(!matches!(out, Err(PrecompileError::Fault(_))));
        if let Ok(words) = out {
            assert_eq!(words.len() % 32, 0);
        }
    }
});
