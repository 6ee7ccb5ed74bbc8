// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use ed25519_dalek::SigningKey;

use super::{
    copy_hash, key, read_sections, set_once, split_signed, text, Metadata, Section, SectionWriter,
};
use crate::crypto::{seal, sha256, verify_ed25519, SIG_LEN, VK_LEN};
use crate::error::{ObjectError, ObjectKind, ObjectResult};
use crate::permissions::Permissions;
use crate::uri;
use crate::Hash32;

const KIND: ObjectKind = ObjectKind::Dot;

const OFFSET_TTL: usize = 2 * VK_LEN;
/// Position of the kind marker inside the blob.
pub const OFFSET_KIND: usize = OFFSET_TTL + 1;
const SECTIONS_START: usize = OFFSET_KIND + 1;

/// `giver | receiver | ttl | kind | terminator | signature`
pub const DOT_MIN_LEN: usize = SECTIONS_START + 1 + SIG_LEN;

const TAG_PERMISSIONS: u8 = 0x10;
const TAG_NAMESPACE: u8 = 0x11;
const TAG_URI: u8 = 0x12;
const TAG_KV: u8 = 0x20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotKind {
    Access,
    Permission,
}

impl DotKind {
    pub fn from_marker(marker: u8) -> ObjectResult<Self> {
        match marker {
            0x01 => Ok(DotKind::Access),
            0x02 => Ok(DotKind::Permission),
            other => Err(ObjectError::UnknownDotKind(other)),
        }
    }

    pub fn marker(self) -> u8 {
        match self {
            DotKind::Access => 0x01,
            DotKind::Permission => 0x02,
        }
    }
}

/// Access to a URI pattern inside one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    pub permissions: Permissions,
    pub namespace: Hash32,
    pub uri: String,
}

/// Namespace-level key/value permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionGrant {
    pub entries: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DotGrant {
    Access(AccessGrant),
    Permission(PermissionGrant),
}

impl DotGrant {
    pub fn kind(&self) -> DotKind {
        match self {
            DotGrant::Access(_) => DotKind::Access,
            DotGrant::Permission(_) => DotKind::Permission,
        }
    }
}

/// Declaration of Trust: a signed grant from `giver` to `receiver`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dot {
    hash: Hash32,
    giver: Hash32,
    receiver: Hash32,
    ttl: u8,
    meta: Metadata,
    grant: DotGrant,
    sig_valid: bool,
}

fn parse_access(sections: &[Section<'_>], meta: &mut Metadata) -> ObjectResult<AccessGrant> {
    let mut permissions = None;
    let mut namespace = None;
    let mut uri_pattern = None;
    for s in sections {
        match s.tag {
            TAG_PERMISSIONS => {
                let raw: [u8; 8] = s.payload.try_into().map_err(|_| ObjectError::BadSectionLength {
                    kind: KIND,
                    tag: s.tag,
                    len: s.payload.len(),
                })?;
                set_once(KIND, s.tag, &mut permissions, Permissions::from_packed(&raw))?;
            }
            TAG_NAMESPACE => set_once(KIND, s.tag, &mut namespace, key(KIND, s)?)?,
            TAG_URI => {
                let pattern = text(KIND, s)?;
                uri::validate(&pattern)?;
                set_once(KIND, s.tag, &mut uri_pattern, pattern)?;
            }
            _ => {
                meta.absorb(KIND, s)?;
            }
        }
    }
    Ok(AccessGrant {
        permissions: permissions.ok_or(ObjectError::MissingSection {
            kind: KIND,
            tag: TAG_PERMISSIONS,
        })?,
        namespace: namespace.ok_or(ObjectError::MissingSection {
            kind: KIND,
            tag: TAG_NAMESPACE,
        })?,
        uri: uri_pattern.ok_or(ObjectError::MissingSection {
            kind: KIND,
            tag: TAG_URI,
        })?,
    })
}

fn parse_permission(
    sections: &[Section<'_>],
    meta: &mut Metadata,
) -> ObjectResult<PermissionGrant> {
    let mut grant = PermissionGrant::default();
    for s in sections {
        if s.tag != TAG_KV {
            meta.absorb(KIND, s)?;
            continue;
        }
        let bad_len = || ObjectError::BadSectionLength {
            kind: KIND,
            tag: s.tag,
            len: s.payload.len(),
        };
        let (&key_len, rest) = s.payload.split_first().ok_or_else(bad_len)?;
        if rest.len() < usize::from(key_len) {
            return Err(bad_len());
        }
        let (k, v) = rest.split_at(usize::from(key_len));
        let k = std::str::from_utf8(k).map_err(|_| ObjectError::InvalidText { kind: KIND })?;
        let v = std::str::from_utf8(v).map_err(|_| ObjectError::InvalidText { kind: KIND })?;
        if grant.entries.insert(k.to_owned(), v.to_owned()).is_some() {
            return Err(ObjectError::DuplicateSection { kind: KIND, tag: TAG_KV });
        }
    }
    Ok(grant)
}

impl Dot {
    /// Parses a DOT. The kind marker at [`OFFSET_KIND`] is only consulted
    /// once the blob is long enough to hold the fixed prefix.
    pub fn parse(blob: &[u8]) -> ObjectResult<Self> {
        let (body, sig) = split_signed(KIND, blob, DOT_MIN_LEN)?;
        let kind = DotKind::from_marker(body[OFFSET_KIND])?;
        let giver = copy_hash(&body[..VK_LEN]);
        let receiver = copy_hash(&body[VK_LEN..2 * VK_LEN]);
        let ttl = body[OFFSET_TTL];
        let sections = read_sections(KIND, body, SECTIONS_START)?;
        let mut meta = Metadata::default();
        let grant = match kind {
            DotKind::Access => DotGrant::Access(parse_access(&sections, &mut meta)?),
            DotKind::Permission => DotGrant::Permission(parse_permission(&sections, &mut meta)?),
        };
        Ok(Self {
            hash: sha256(blob),
            giver,
            receiver,
            ttl,
            meta,
            grant,
            sig_valid: verify_ed25519(&giver, sig, body),
        })
    }

    pub fn hash(&self) -> &Hash32 {
        &self.hash
    }

    pub fn giver(&self) -> &Hash32 {
        &self.giver
    }

    pub fn receiver(&self) -> &Hash32 {
        &self.receiver
    }

    pub fn ttl(&self) -> u8 {
        self.ttl
    }

    pub fn sig_valid(&self) -> bool {
        self.sig_valid
    }

    pub fn kind(&self) -> DotKind {
        self.grant.kind()
    }

    pub fn is_permission(&self) -> bool {
        self.kind() == DotKind::Permission
    }

    pub fn grant(&self) -> &DotGrant {
        &self.grant
    }

    pub fn access(&self) -> Option<&AccessGrant> {
        match &self.grant {
            DotGrant::Access(a) => Some(a),
            DotGrant::Permission(_) => None,
        }
    }

    pub fn expiry(&self) -> Option<u64> {
        self.meta.expiry
    }

    pub fn created(&self) -> Option<u64> {
        self.meta.created
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        self.meta.is_expired_at(now)
    }

    pub fn revokers(&self) -> &[Hash32] {
        &self.meta.revokers
    }

    pub fn contact(&self) -> Option<&str> {
        self.meta.contact.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.meta.comment.as_deref()
    }

    /// Hashes whose revocation invalidates this DOT.
    pub fn revokable_hashes(&self) -> [Hash32; 3] {
        [self.hash, self.giver, self.receiver]
    }

    /// The giver or one of the delegated revokers.
    pub fn may_be_revoked_by(&self, issuer: &Hash32) -> bool {
        issuer == &self.giver || self.meta.revokers.contains(issuer)
    }
}

#[derive(Debug, Clone)]
pub struct DotBuilder {
    receiver: Hash32,
    ttl: u8,
    meta: Metadata,
    grant: DotGrant,
}

impl DotBuilder {
    pub fn access(
        receiver: Hash32,
        permissions: Permissions,
        namespace: Hash32,
        uri: impl Into<String>,
    ) -> Self {
        Self {
            receiver,
            ttl: 0,
            meta: Metadata::default(),
            grant: DotGrant::Access(AccessGrant {
                permissions,
                namespace,
                uri: uri.into(),
            }),
        }
    }

    pub fn permission(receiver: Hash32) -> Self {
        Self {
            receiver,
            ttl: 0,
            meta: Metadata::default(),
            grant: DotGrant::Permission(PermissionGrant::default()),
        }
    }

    pub fn ttl(mut self, ttl: u8) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn created(mut self, at: u64) -> Self {
        self.meta.created = Some(at);
        self
    }

    pub fn expiry(mut self, at: u64) -> Self {
        self.meta.expiry = Some(at);
        self
    }

    pub fn revoker(mut self, vk: Hash32) -> Self {
        self.meta.revokers.push(vk);
        self
    }

    pub fn contact(mut self, contact: impl Into<String>) -> Self {
        self.meta.contact = Some(contact.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.meta.comment = Some(comment.into());
        self
    }

    /// Adds a key/value entry; ignored for access DOTs.
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let DotGrant::Permission(p) = &mut self.grant {
            p.entries.insert(key.into(), value.into());
        }
        self
    }

    pub fn sign(&self, giver: &SigningKey) -> ObjectResult<Vec<u8>> {
        let mut prefix = Vec::with_capacity(SECTIONS_START);
        prefix.extend_from_slice(giver.verifying_key().as_bytes());
        prefix.extend_from_slice(&self.receiver);
        prefix.push(self.ttl);
        prefix.push(self.grant.kind().marker());
        let mut w = SectionWriter::with_prefix(&prefix);
        match &self.grant {
            DotGrant::Access(a) => {
                uri::validate(&a.uri)?;
                w.put(KIND, TAG_PERMISSIONS, &a.permissions.to_packed())?;
                w.put(KIND, TAG_NAMESPACE, &a.namespace)?;
                w.put(KIND, TAG_URI, a.uri.as_bytes())?;
            }
            DotGrant::Permission(p) => {
                for (k, v) in &p.entries {
                    let key_len = u8::try_from(k.len()).map_err(|_| ObjectError::FieldTooLong {
                        kind: KIND,
                        len: k.len(),
                    })?;
                    let mut payload = Vec::with_capacity(1 + k.len() + v.len());
                    payload.push(key_len);
                    payload.extend_from_slice(k.as_bytes());
                    payload.extend_from_slice(v.as_bytes());
                    w.put(KIND, TAG_KV, &payload)?;
                }
            }
        }
        self.meta.encode(KIND, &mut w)?;
        Ok(seal(giver, w.finish()))
    }
}
