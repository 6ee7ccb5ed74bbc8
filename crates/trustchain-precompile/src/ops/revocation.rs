// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use trustchain_core::abi::WordWriter;
use trustchain_core::Revocation;

use super::{rejected, Call, OpResult};
use crate::selector::Selector;
use crate::LOG_TARGET;

const OP: Selector = Selector::UnpackRevocation;
const WORDS: usize = 3;

/// `[valid, target, issuer]`. One revocation per target is retained, and
/// only an issuer with authority over a cached target can claim it. A
/// genuine revocation reports as valid whether or not it was retained.
pub(super) fn unpack(call: &Call<'_>) -> OpResult {
    let blob = match call.args.bytes(0) {
        Ok(blob) => blob,
        Err(err) => return Ok(rejected(OP, WORDS, &err)),
    };
    let revocation = match Revocation::parse(blob) {
        Ok(r) => r,
        Err(err) => return Ok(rejected(OP, WORDS, &err)),
    };
    if !revocation.sig_valid() {
        return Ok(rejected(OP, WORDS, &"bad signature"));
    }
    let mut out = WordWriter::with_words(WORDS);
    out.push_bool(true)
        .push_word(revocation.target())
        .push_word(revocation.issuer());
    let outcome = call.store().record_revocation(revocation);
    tracing::debug!(target: LOG_TARGET, outcome = ?outcome, "revocation unpacked");
    Ok(out.into_vec())
}
