// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use trustchain_core::abi::WordWriter;
use trustchain_core::{Entity, ObjectKind};

use super::{nth, rejected, Call, OpResult};
use crate::error::PrecompileError;
use crate::selector::Selector;
use crate::LOG_TARGET;

const OP: Selector = Selector::UnpackEntity;
const WORDS: usize = 4;

/// `[valid, revoker count, expiry, vk]`
pub(super) fn unpack(call: &Call<'_>) -> OpResult {
    let blob = match call.args.bytes(0) {
        Ok(blob) => blob,
        Err(err) => return Ok(rejected(OP, WORDS, &err)),
    };
    let entity = match Entity::parse(blob) {
        Ok(entity) => entity,
        Err(err) => return Ok(rejected(OP, WORDS, &err)),
    };
    if !entity.sig_valid() {
        return Ok(rejected(OP, WORDS, &"bad signature"));
    }
    let mut out = WordWriter::with_words(WORDS);
    out.push_bool(true)
        .push_u64(entity.revokers().len() as u64)
        .push_u64(entity.expiry().unwrap_or(0))
        .push_word(entity.vk());
    call.store().put_entity(entity);
    Ok(out.into_vec())
}

pub(super) fn delegated_revoker(call: &Call<'_>) -> OpResult {
    let vk = call.args.word(0)?;
    let index = call.args.u64(1)?;
    let Some(entity) = call.store().entity(vk) else {
        tracing::warn!(target: LOG_TARGET, vk = %hex::encode(vk), "entity not unpacked");
        return Err(PrecompileError::missing(ObjectKind::Entity, vk));
    };
    let revoker = nth(entity.revokers(), index)?;
    let mut out = WordWriter::with_words(1);
    out.push_word(&revoker);
    Ok(out.into_vec())
}
