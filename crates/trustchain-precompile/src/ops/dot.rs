// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use trustchain_core::abi::{u64_word, WordWriter};
use trustchain_core::{Dot, Hash32, ObjectKind};

use super::{nth, rejected, Call, OpResult};
use crate::error::PrecompileError;
use crate::selector::Selector;
use crate::LOG_TARGET;

const OP: Selector = Selector::UnpackDot;
const WORDS: usize = 7;

fn cached(call: &Call<'_>, hash: &Hash32) -> Result<Arc<Dot>, PrecompileError> {
    call.store().dot(hash).ok_or_else(|| {
        tracing::warn!(target: LOG_TARGET, dot = %hex::encode(hash), "dot not unpacked");
        PrecompileError::missing(ObjectKind::Dot, hash)
    })
}

/// `[valid, revoker count, is permission, expiry, giver, receiver, hash]`
pub(super) fn unpack(call: &Call<'_>) -> OpResult {
    let blob = match call.args.bytes(0) {
        Ok(blob) => blob,
        Err(err) => return Ok(rejected(OP, WORDS, &err)),
    };
    let parsed = match Dot::parse(blob) {
        Ok(dot) => dot,
        Err(err) => return Ok(rejected(OP, WORDS, &err)),
    };
    if !parsed.sig_valid() {
        return Ok(rejected(OP, WORDS, &"bad signature"));
    }
    // A DOT already cached under this hash is identical by construction.
    let dot = match call.store().dot(parsed.hash()) {
        Some(existing) => existing,
        None => call.store().put_dot(parsed),
    };
    let mut out = WordWriter::with_words(WORDS);
    out.push_bool(true)
        .push_u64(dot.revokers().len() as u64)
        .push_bool(dot.is_permission())
        .push_u64(dot.expiry().unwrap_or(0))
        .push_word(dot.giver())
        .push_word(dot.receiver())
        .push_word(dot.hash());
    Ok(out.into_vec())
}

pub(super) fn delegated_revoker(call: &Call<'_>) -> OpResult {
    let hash = call.args.word(0)?;
    let index = call.args.u64(1)?;
    let dot = cached(call, hash)?;
    let revoker = nth(dot.revokers(), index)?;
    let mut out = WordWriter::with_words(1);
    out.push_word(&revoker);
    Ok(out.into_vec())
}

pub(super) fn num_revokable_hashes(call: &Call<'_>) -> OpResult {
    let hash = call.args.word(0)?;
    let dot = cached(call, hash)?;
    Ok(u64_word(dot.revokable_hashes().len() as u64))
}

pub(super) fn revokable_hash(call: &Call<'_>) -> OpResult {
    let hash = call.args.word(0)?;
    let index = call.args.u64(1)?;
    let dot = cached(call, hash)?;
    let revokable = nth(&dot.revokable_hashes(), index)?;
    let mut out = WordWriter::with_words(1);
    out.push_word(&revokable);
    Ok(out.into_vec())
}
