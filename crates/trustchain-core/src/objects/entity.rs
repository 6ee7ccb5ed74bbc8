// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use ed25519_dalek::SigningKey;

use super::{copy_hash, read_sections, split_signed, Metadata, SectionWriter};
use crate::crypto::{seal, sha256, verify_ed25519, SIG_LEN, VK_LEN};
use crate::error::{ObjectKind, ObjectResult};
use crate::Hash32;

/// `vk | terminator | signature`
pub const ENTITY_MIN_LEN: usize = VK_LEN + 1 + SIG_LEN;

const KIND: ObjectKind = ObjectKind::Entity;

/// A self-signed identity bound to a verifying key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    vk: Hash32,
    meta: Metadata,
    hash: Hash32,
    sig_valid: bool,
}

impl Entity {
    /// Parses the blob and checks the self-signature. A structurally sound
    /// entity with a bad signature is returned with `sig_valid() == false`.
    pub fn parse(blob: &[u8]) -> ObjectResult<Self> {
        let (body, sig) = split_signed(KIND, blob, ENTITY_MIN_LEN)?;
        let vk = copy_hash(&body[..VK_LEN]);
        let mut meta = Metadata::default();
        for section in read_sections(KIND, body, VK_LEN)? {
            // Unrecognised sections are carried by length and ignored.
            meta.absorb(KIND, &section)?;
        }
        Ok(Self {
            vk,
            meta,
            hash: sha256(blob),
            sig_valid: verify_ed25519(&vk, sig, body),
        })
    }

    pub fn vk(&self) -> &Hash32 {
        &self.vk
    }

    pub fn hash(&self) -> &Hash32 {
        &self.hash
    }

    pub fn sig_valid(&self) -> bool {
        self.sig_valid
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

    /// The entity itself or one of its delegated revokers.
    pub fn may_be_revoked_by(&self, issuer: &Hash32) -> bool {
        issuer == &self.vk || self.meta.revokers.contains(issuer)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityBuilder {
    meta: Metadata,
}

impl EntityBuilder {
    pub fn new() -> Self {
        Self::default()
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

    pub fn sign(&self, key: &SigningKey) -> ObjectResult<Vec<u8>> {
        let mut w = SectionWriter::with_prefix(key.verifying_key().as_bytes());
        self.meta.encode(KIND, &mut w)?;
        Ok(seal(key, w.finish()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ObjectError;

    fn sk(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    #[test]
    fn builder_output_parses_back() {
        let key = sk(1);
        let blob = EntityBuilder::new()
            .created(10)
            .expiry(500)
            .revoker([4; 32])
            .revoker([5; 32])
            .contact("ops@example.org")
            .comment("gateway")
            .sign(&key)
            .unwrap();
        let e = Entity::parse(&blob).unwrap();
        assert!(e.sig_valid());
        assert_eq!(e.vk(), key.verifying_key().as_bytes());
        assert_eq!(e.expiry(), Some(500));
        assert_eq!(e.created(), Some(10));
        assert_eq!(e.revokers(), &[[4; 32], [5; 32]]);
        assert_eq!(e.contact(), Some("ops@example.org"));
        assert_eq!(e.comment(), Some("gateway"));
    }

    #[test]
    fn minimal_entity_is_valid() {
        let blob = EntityBuilder::new().sign(&sk(2)).unwrap();
        assert_eq!(blob.len(), ENTITY_MIN_LEN);
        let e = Entity::parse(&blob).unwrap();
        assert!(e.sig_valid());
        assert_eq!(e.expiry(), None);
        assert!(e.revokers().is_empty());
    }

    #[test]
    fn tampered_body_fails_signature_only() {
        let mut blob = EntityBuilder::new().expiry(77).sign(&sk(3)).unwrap();
        // Flip a byte of the expiry payload; structure is unchanged.
        blob[VK_LEN + 2 + 7] ^= 0x01;
        let e = Entity::parse(&blob).unwrap();
        assert!(!e.sig_valid());
    }

    #[test]
    fn short_blob_is_rejected() {
        assert!(matches!(
            Entity::parse(&[0u8; ENTITY_MIN_LEN - 1]),
            Err(ObjectError::TooShort { .. })
        ));
    }

    #[test]
    fn unknown_sections_are_skipped() {
        let key = sk(4);
        let mut body = key.verifying_key().to_bytes().to_vec();
        body.extend_from_slice(&[0x7f, 0x02, 0xde, 0xad, 0x00]);
        let blob = seal(&key, body);
        let e = Entity::parse(&blob).unwrap();
        assert!(e.sig_valid());
    }

    #[test]
    fn overlong_contact_cannot_be_minted() {
        let err = EntityBuilder::new()
            .contact("x".repeat(300))
            .sign(&sk(5))
            .unwrap_err();
        assert!(matches!(err, ObjectError::FieldTooLong { len: 300, .. }));
    }

    #[test]
    fn revocation_authority_includes_delegates() {
        let key = sk(6);
        let blob = EntityBuilder::new().revoker([9; 32]).sign(&key).unwrap();
        let e = Entity::parse(&blob).unwrap();
        assert!(e.may_be_revoked_by(key.verifying_key().as_bytes()));
        assert!(e.may_be_revoked_by(&[9; 32]));
        assert!(!e.may_be_revoked_by(&[8; 32]));
    }
}
