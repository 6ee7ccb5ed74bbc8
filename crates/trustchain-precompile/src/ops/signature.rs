// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use trustchain_core::abi::bool_word;
use trustchain_core::crypto::{verify_ed25519, verify_packed as verify_packed_blob};

use super::{Call, OpResult};

pub(super) fn verify(call: &Call<'_>) -> OpResult {
    let decoded = call
        .args
        .word(0)
        .and_then(|vk| Ok((vk, call.args.bytes(1)?, call.args.bytes(2)?)));
    let valid = match decoded {
        Ok((vk, sig, msg)) => verify_ed25519(vk, sig, msg),
        Err(_) => false,
    };
    Ok(bool_word(valid))
}

pub(super) fn verify_packed(call: &Call<'_>) -> OpResult {
    let valid = call.args.bytes(0).map(verify_packed_blob).unwrap_or(false);
    Ok(bool_word(valid))
}
