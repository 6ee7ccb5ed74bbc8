// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use trustchain_core::abi::{u64_word, WordWriter};
use trustchain_core::{
    check_access_grants, DChain, GrantStatus, Hash32, NarrowingPolicy, ObjectError, ObjectKind,
    Permissions,
};

use super::{nth, rejected, Call, OpResult};
use crate::error::PrecompileError;
use crate::selector::Selector;
use crate::LOG_TARGET;

const OP: Selector = Selector::UnpackAccessDChain;
const WORDS: usize = 3;

/// `[valid, dot count, chain hash]`. A chain already cached is kept as is,
/// so earlier augmentation survives a re-unpack.
pub(super) fn unpack(call: &Call<'_>) -> OpResult {
    let blob = match call.args.bytes(0) {
        Ok(blob) => blob,
        Err(err) => return Ok(rejected(OP, WORDS, &err)),
    };
    let chain = match DChain::parse_bounded(blob, call.config.max_chain_len) {
        Ok(chain) => chain,
        Err(err) => return Ok(rejected(OP, WORDS, &err)),
    };
    let chain = call.store().insert_chain_if_absent(chain);
    let mut out = WordWriter::with_words(WORDS);
    out.push_bool(true)
        .push_u64(chain.len() as u64)
        .push_word(chain.chain_hash());
    Ok(out.into_vec())
}

fn cached(call: &Call<'_>, hash: &Hash32) -> Result<Arc<DChain>, PrecompileError> {
    call.store().chain(hash).ok_or_else(|| {
        tracing::warn!(target: LOG_TARGET, chain = %hex::encode(hash), "chain not unpacked");
        PrecompileError::missing(ObjectKind::DChain, hash)
    })
}

/// The chain with every member resolved from the store.
fn augmented(call: &Call<'_>, hash: &Hash32) -> Result<Arc<DChain>, PrecompileError> {
    match call.store().augment_chain(hash) {
        Ok(Some(chain)) => Ok(chain),
        Ok(None) => Err(PrecompileError::missing(ObjectKind::DChain, hash)),
        Err(ObjectError::MissingDot(key)) => Err(PrecompileError::MissingObject {
            kind: ObjectKind::Dot,
            key,
        }),
        Err(err) => Err(PrecompileError::Fault(err.to_string())),
    }
}

fn revokable_hashes(call: &Call<'_>, hash: &Hash32) -> Result<Vec<Hash32>, PrecompileError> {
    augmented(call, hash)?
        .revokable_hashes()
        .ok_or_else(|| PrecompileError::missing(ObjectKind::DChain, hash))
}

pub(super) fn dot_hash(call: &Call<'_>) -> OpResult {
    let hash = call.args.word(0)?;
    let index = call.args.u64(1)?;
    let chain = cached(call, hash)?;
    let dot_hash = nth(chain.dot_hashes(), index)?;
    let mut out = WordWriter::with_words(1);
    out.push_word(&dot_hash);
    Ok(out.into_vec())
}

pub(super) fn num_revokable_hashes(call: &Call<'_>) -> OpResult {
    let hash = call.args.word(0)?;
    Ok(u64_word(revokable_hashes(call, hash)?.len() as u64))
}

pub(super) fn revokable_hash(call: &Call<'_>) -> OpResult {
    let hash = call.args.word(0)?;
    let index = call.args.u64(1)?;
    let revokable = nth(&revokable_hashes(call, hash)?, index)?;
    let mut out = WordWriter::with_words(1);
    out.push_word(&revokable);
    Ok(out.into_vec())
}

/// `[status code]` for `(chain hash, adps, namespace, uri suffix)`.
pub(super) fn grants(call: &Call<'_>) -> OpResult {
    let hash = call.args.word(0)?;
    let requested = Permissions::from_packed(&call.args.word(1)?[..8]);
    let namespace = call.args.word(2)?;
    let suffix = call.args.bytes(3)?;

    let status = match call.store().augment_chain(hash) {
        Ok(None) => GrantStatus::UnknownChain,
        Err(_) => GrantStatus::UnresolvedDot,
        Ok(Some(chain)) => check_access_grants(
            &chain,
            requested,
            namespace,
            suffix,
            call.ctx.now(),
            call.store(),
            &NarrowingPolicy,
        ),
    };
    tracing::debug!(
        target: LOG_TARGET,
        chain = %hex::encode(hash),
        requested = %requested,
        status = %status,
        verified = status.is_verified(),
        "grant check"
    );
    Ok(u64_word(u64::from(status.code())))
}
