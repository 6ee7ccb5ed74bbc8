// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-operation handlers. Each handler decodes its own arguments from the
//! word codec, talks to the execution's scratch store and encodes its result
//! words. Unpack handlers answer malformed input with zero-filled results;
//! lookups of objects that were never unpacked are call failures.

mod chain;
mod dot;
mod entity;
mod revocation;
mod signature;

use trustchain_core::abi::{AbiError, Args, WORD};
use trustchain_core::ScratchStore;

use crate::config::PrecompileConfig;
use crate::context::ExecutionContext;
use crate::error::PrecompileError;
use crate::selector::Selector;
use crate::LOG_TARGET;

pub(crate) type OpResult = Result<Vec<u8>, PrecompileError>;

/// Everything a handler may touch during one call.
pub(crate) struct Call<'a> {
    pub args: Args<'a>,
    pub ctx: &'a dyn ExecutionContext,
    pub config: &'a PrecompileConfig,
}

impl Call<'_> {
    pub fn store(&self) -> &ScratchStore {
        self.ctx.scratch()
    }
}

pub(crate) fn dispatch(selector: Selector, call: &Call<'_>) -> OpResult {
    match selector {
        Selector::VerifyEd25519 => signature::verify(call),
        Selector::VerifyEd25519Packed => signature::verify_packed(call),
        Selector::UnpackEntity => entity::unpack(call),
        Selector::GetEntityDelegatedRevoker => entity::delegated_revoker(call),
        Selector::UnpackDot => dot::unpack(call),
        Selector::GetDotDelegatedRevoker => dot::delegated_revoker(call),
        Selector::GetDotNumRevokableHashes => dot::num_revokable_hashes(call),
        Selector::GetDotRevokableHash => dot::revokable_hash(call),
        Selector::UnpackAccessDChain => chain::unpack(call),
        Selector::GetDChainDotHash => chain::dot_hash(call),
        Selector::GetDChainNumRevokableHashes => chain::num_revokable_hashes(call),
        Selector::GetDChainRevokableHash => chain::revokable_hash(call),
        Selector::ADChainGrants => chain::grants(call),
        Selector::UnpackRevocation => revocation::unpack(call),
        Selector::SliceByte32 => slice_byte32(call),
    }
}

/// Element `index` of `items`, or an out-of-range failure.
pub(crate) fn nth<T: Copy>(items: &[T], index: u64) -> Result<T, PrecompileError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .copied()
        .ok_or(PrecompileError::IndexOutOfRange {
            index,
            len: items.len(),
        })
}

/// Logs a rejected blob and yields the zero-filled result for `words`.
pub(crate) fn rejected(op: Selector, words: usize, reason: &dyn std::fmt::Display) -> Vec<u8> {
    tracing::debug!(target: LOG_TARGET, op = op.name(), reason = %reason, "input rejected");
    trustchain_core::abi::WordWriter::zeroed(words)
}

fn slice_byte32(call: &Call<'_>) -> OpResult {
    let blob = call.args.bytes(0)?;
    let offset = call.args.usize(1)?;
    let end = offset.checked_add(WORD).ok_or(AbiError::Overflow)?;
    let window = blob.get(offset..end).ok_or(AbiError::OutOfBounds {
        offset,
        len: WORD,
        available: blob.len(),
    })?;
    Ok(window.to_vec())
}
