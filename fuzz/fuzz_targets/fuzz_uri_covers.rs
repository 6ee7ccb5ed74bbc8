// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use trustchain_core::uri::{covers, validate};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Some((grant, request)) = text.split_once('\n') else {
        return;
    };
    if validate(grant).is_ok() && validate(request).is_ok() {
        // Every valid pattern covers itself.
        assert_eq!(covers(request, request), Ok(true));
        assert!(covers(grant, request).is_ok());
    }
});
