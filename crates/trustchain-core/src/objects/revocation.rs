// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use ed25519_dalek::SigningKey;

use super::{
    copy_hash, read_sections, set_once, split_signed, text, timestamp, SectionWriter, TAG_COMMENT,
    TAG_CREATED,
};
use crate::crypto::{seal, sha256, verify_ed25519, SIG_LEN, VK_LEN};
use crate::error::{ObjectKind, ObjectResult};
use crate::Hash32;

/// `issuer | target | terminator | signature`
pub const REVOCATION_MIN_LEN: usize = 2 * VK_LEN + 1 + SIG_LEN;

const KIND: ObjectKind = ObjectKind::Revocation;

/// A signed statement that `target` (a DOT hash or verifying key) is no
/// longer trusted. Whether the issuer had the authority to say so is decided
/// against the target, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revocation {
    hash: Hash32,
    issuer: Hash32,
    target: Hash32,
    created: Option<u64>,
    comment: Option<String>,
    sig_valid: bool,
}

impl Revocation {
    pub fn parse(blob: &[u8]) -> ObjectResult<Self> {
        let (body, sig) = split_signed(KIND, blob, REVOCATION_MIN_LEN)?;
        let issuer = copy_hash(&body[..VK_LEN]);
        let target = copy_hash(&body[VK_LEN..2 * VK_LEN]);
        let mut created = None;
        let mut comment = None;
        for s in read_sections(KIND, body, 2 * VK_LEN)? {
            match s.tag {
                TAG_CREATED => set_once(KIND, s.tag, &mut created, timestamp(KIND, &s)?)?,
                TAG_COMMENT => set_once(KIND, s.tag, &mut comment, text(KIND, &s)?)?,
                _ => {}
            }
        }
        Ok(Self {
            hash: sha256(blob),
            issuer,
            target,
            created,
            comment,
            sig_valid: verify_ed25519(&issuer, sig, body),
        })
    }

    pub fn hash(&self) -> &Hash32 {
        &self.hash
    }

    pub fn issuer(&self) -> &Hash32 {
        &self.issuer
    }

    pub fn target(&self) -> &Hash32 {
        &self.target
    }

    pub fn created(&self) -> Option<u64> {
        self.created
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn sig_valid(&self) -> bool {
        self.sig_valid
    }
}

#[derive(Debug, Clone)]
pub struct RevocationBuilder {
    target: Hash32,
    created: Option<u64>,
    comment: Option<String>,
}

impl RevocationBuilder {
    pub fn new(target: Hash32) -> Self {
        Self {
            target,
            created: None,
            comment: None,
        }
    }

    pub fn created(mut self, at: u64) -> Self {
        self.created = Some(at);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn sign(&self, issuer: &SigningKey) -> ObjectResult<Vec<u8>> {
        let mut prefix = issuer.verifying_key().to_bytes().to_vec();
        prefix.extend_from_slice(&self.target);
        let mut w = SectionWriter::with_prefix(&prefix);
        if let Some(created) = self.created {
            w.put(KIND, TAG_CREATED, &created.to_be_bytes())?;
        }
        if let Some(comment) = &self.comment {
            w.put(KIND, TAG_COMMENT, comment.as_bytes())?;
        }
        Ok(seal(issuer, w.finish()))
    }
}
