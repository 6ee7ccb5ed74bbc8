// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Binary codecs for the routing objects.
//!
//! Entities, DOTs and revocations share one layout: a fixed prefix, a table
//! of `tag | len | payload` sections closed by a `0x00` byte, then a 64-byte
//! Ed25519 signature over everything before it.

mod dchain;
mod dot;
mod entity;
mod revocation;

pub use dchain::{DChain, MAX_CHAIN_DOTS};
pub use dot::{AccessGrant, Dot, DotBuilder, DotGrant, DotKind, PermissionGrant, DOT_MIN_LEN};
pub use entity::{Entity, EntityBuilder, ENTITY_MIN_LEN};
pub use revocation::{Revocation, RevocationBuilder, REVOCATION_MIN_LEN};

use crate::crypto::SIG_LEN;
use crate::error::{ObjectError, ObjectKind, ObjectResult};
use crate::Hash32;

pub(crate) const TAG_END: u8 = 0x00;
pub(crate) const TAG_CREATED: u8 = 0x02;
pub(crate) const TAG_EXPIRY: u8 = 0x03;
pub(crate) const TAG_REVOKER: u8 = 0x04;
pub(crate) const TAG_CONTACT: u8 = 0x05;
pub(crate) const TAG_COMMENT: u8 = 0x06;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Section<'a> {
    pub tag: u8,
    pub payload: &'a [u8],
}

/// Splits a signed blob into body and signature.
pub(crate) fn split_signed(
    kind: ObjectKind,
    blob: &[u8],
    min: usize,
) -> ObjectResult<(&[u8], &[u8])> {
    if blob.len() < min {
        return Err(ObjectError::TooShort {
            kind,
            len: blob.len(),
            min,
        });
    }
    Ok(blob.split_at(blob.len() - SIG_LEN))
}

/// Reads the section table of `body` starting at `start`. The terminator
/// must be the final byte of the body.
pub(crate) fn read_sections(
    kind: ObjectKind,
    body: &[u8],
    start: usize,
) -> ObjectResult<Vec<Section<'_>>> {
    let mut out = Vec::new();
    let mut pos = start;
    loop {
        let Some(&tag) = body.get(pos) else {
            return Err(ObjectError::Truncated { kind });
        };
        if tag == TAG_END {
            pos += 1;
            break;
        }
        let Some(&len) = body.get(pos + 1) else {
            return Err(ObjectError::Truncated { kind });
        };
        let begin = pos + 2;
        let end = begin + usize::from(len);
        let Some(payload) = body.get(begin..end) else {
            return Err(ObjectError::Truncated { kind });
        };
        out.push(Section { tag, payload });
        pos = end;
    }
    if pos != body.len() {
        return Err(ObjectError::TrailingBytes {
            kind,
            remaining: body.len() - pos,
        });
    }
    Ok(out)
}

pub(crate) fn timestamp(kind: ObjectKind, s: &Section<'_>) -> ObjectResult<u64> {
    let raw: [u8; 8] = s.payload.try_into().map_err(|_| ObjectError::BadSectionLength {
        kind,
        tag: s.tag,
        len: s.payload.len(),
    })?;
    Ok(u64::from_be_bytes(raw))
}

pub(crate) fn key(kind: ObjectKind, s: &Section<'_>) -> ObjectResult<Hash32> {
    s.payload.try_into().map_err(|_| ObjectError::BadSectionLength {
        kind,
        tag: s.tag,
        len: s.payload.len(),
    })
}

pub(crate) fn text(kind: ObjectKind, s: &Section<'_>) -> ObjectResult<String> {
    std::str::from_utf8(s.payload)
        .map(str::to_owned)
        .map_err(|_| ObjectError::InvalidText { kind })
}

pub(crate) fn set_once<T>(
    kind: ObjectKind,
    tag: u8,
    slot: &mut Option<T>,
    value: T,
) -> ObjectResult<()> {
    if slot.is_some() {
        return Err(ObjectError::DuplicateSection { kind, tag });
    }
    *slot = Some(value);
    Ok(())
}

pub(crate) fn copy_hash(bytes: &[u8]) -> Hash32 {
    let mut out = [0u8; 32];
    let n = bytes.len().min(32);
    out[..n].copy_from_slice(&bytes[..n]);
    out
}

/// Optional metadata shared by entities and DOTs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub created: Option<u64>,
    pub expiry: Option<u64>,
    pub revokers: Vec<Hash32>,
    pub contact: Option<String>,
    pub comment: Option<String>,
}

impl Metadata {
    /// Consumes a common section. Returns false when the tag is not one of
    /// the shared ones.
    pub(crate) fn absorb(&mut self, kind: ObjectKind, s: &Section<'_>) -> ObjectResult<bool> {
        match s.tag {
            TAG_CREATED => set_once(kind, s.tag, &mut self.created, timestamp(kind, s)?)?,
            TAG_EXPIRY => set_once(kind, s.tag, &mut self.expiry, timestamp(kind, s)?)?,
            TAG_REVOKER => self.revokers.push(key(kind, s)?),
            TAG_CONTACT => set_once(kind, s.tag, &mut self.contact, text(kind, s)?)?,
            TAG_COMMENT => set_once(kind, s.tag, &mut self.comment, text(kind, s)?)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        matches!(self.expiry, Some(expiry) if expiry <= now)
    }

    pub(crate) fn encode(&self, kind: ObjectKind, out: &mut SectionWriter) -> ObjectResult<()> {
        if let Some(created) = self.created {
            out.put(kind, TAG_CREATED, &created.to_be_bytes())?;
        }
        if let Some(expiry) = self.expiry {
            out.put(kind, TAG_EXPIRY, &expiry.to_be_bytes())?;
        }
        for revoker in &self.revokers {
            out.put(kind, TAG_REVOKER, revoker)?;
        }
        if let Some(contact) = &self.contact {
            out.put(kind, TAG_CONTACT, contact.as_bytes())?;
        }
        if let Some(comment) = &self.comment {
            out.put(kind, TAG_COMMENT, comment.as_bytes())?;
        }
        Ok(())
    }
}

/// Accumulates a signed body for the builders.
#[derive(Debug, Default)]
pub(crate) struct SectionWriter {
    buf: Vec<u8>,
}

impl SectionWriter {
    pub fn with_prefix(prefix: &[u8]) -> Self {
        Self {
            buf: prefix.to_vec(),
        }
    }

    pub fn put(&mut self, kind: ObjectKind, tag: u8, payload: &[u8]) -> ObjectResult<()> {
        let len = u8::try_from(payload.len()).map_err(|_| ObjectError::FieldTooLong {
            kind,
            len: payload.len(),
        })?;
        self.buf.push(tag);
        self.buf.push(len);
        self.buf.extend_from_slice(payload);
        Ok(())
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buf.push(TAG_END);
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_require_terminator_at_end() {
        let body = [0xaa, 0x03, 0x01, 0x02, 0x03, 0x00];
        let s = read_sections(ObjectKind::Entity, &body, 1).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].tag, 0x03);

        let trailing = [0x00, 0x00, 0x07];
        assert!(matches!(
            read_sections(ObjectKind::Entity, &trailing, 0),
            Err(ObjectError::TrailingBytes { remaining: 2, .. })
        ));
    }

    #[test]
    fn section_running_past_body_is_truncated() {
        let body = [0x05, 0x09, 0x41];
        assert!(matches!(
            read_sections(ObjectKind::Dot, &body, 0),
            Err(ObjectError::Truncated { .. })
        ));
        assert!(matches!(
            read_sections(ObjectKind::Dot, &[], 0),
            Err(ObjectError::Truncated { .. })
        ));
    }

    #[test]
    fn duplicate_expiry_is_rejected() {
        let mut meta = Metadata::default();
        let s = Section {
            tag: TAG_EXPIRY,
            payload: &[0, 0, 0, 0, 0, 0, 0, 9],
        };
        assert!(meta.absorb(ObjectKind::Entity, &s).unwrap());
        assert_eq!(
            meta.absorb(ObjectKind::Entity, &s),
            Err(ObjectError::DuplicateSection {
                kind: ObjectKind::Entity,
                tag: TAG_EXPIRY
            })
        );
    }

    #[test]
    fn expiry_is_inclusive_of_now() {
        let meta = Metadata {
            expiry: Some(100),
            ..Metadata::default()
        };
        assert!(!meta.is_expired_at(99));
        assert!(meta.is_expired_at(100));
        assert!(!Metadata::default().is_expired_at(u64::MAX));
    }
}
