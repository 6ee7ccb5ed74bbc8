// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use trustchain_core::crypto::sha256;
use trustchain_core::{DChain, Dot, Entity, Revocation};

fuzz_target!(|data: &[u8]| {
    if let Ok(e) = Entity::parse(data) {
        assert_eq!(e.hash(), &sha256(data));
    }
    if let Ok(d) = Dot::parse(data) {
        assert_eq!(d.revokable_hashes()[0], sha256(data));
        if let Some(access) = d.access() {
            assert!(trustchain_core::uri::validate(&access.uri).is_ok());
        }
    }
    if let Ok(r) = Revocation::parse(data) {
        assert_eq!(r.hash(), &sha256(data));
    }
    if let Ok(c) = DChain::parse(data) {
        assert_eq!(c.len() * 32, data.len());
        assert!(c.revokable_hashes().is_none());
    }
});
