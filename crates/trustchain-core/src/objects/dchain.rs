// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use super::{copy_hash, Dot};
use crate::crypto::sha256;
use crate::error::{ObjectError, ObjectResult};
use crate::lookup::ObjectLookup;
use crate::Hash32;

/// Upper bound on chain members accepted by the codec.
pub const MAX_CHAIN_DOTS: usize = 64;

const HASH_LEN: usize = 32;

/// Ordered delegation path, root first.
///
/// A freshly parsed chain holds only member hashes. [`DChain::augment`]
/// resolves the members from a lookup; operations that need the DOTs
/// themselves return `None` until every member is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DChain {
    chain_hash: Hash32,
    dot_hashes: Vec<Hash32>,
    dots: Vec<Option<Arc<Dot>>>,
}

impl DChain {
    pub fn parse(blob: &[u8]) -> ObjectResult<Self> {
        Self::parse_bounded(blob, MAX_CHAIN_DOTS)
    }

    pub fn parse_bounded(blob: &[u8], max: usize) -> ObjectResult<Self> {
        if blob.is_empty() || blob.len() % HASH_LEN != 0 {
            return Err(ObjectError::BadChainLength { len: blob.len() });
        }
        let count = blob.len() / HASH_LEN;
        let max = max.min(MAX_CHAIN_DOTS);
        if count > max {
            return Err(ObjectError::ChainTooLong { count, max });
        }
        let dot_hashes: Vec<Hash32> = blob.chunks_exact(HASH_LEN).map(copy_hash).collect();
        Ok(Self {
            chain_hash: sha256(blob),
            dots: vec![None; dot_hashes.len()],
            dot_hashes,
        })
    }

    /// Encodes member hashes back into the chain blob.
    pub fn encode(hashes: &[Hash32]) -> Vec<u8> {
        hashes.iter().flat_map(|h| h.iter().copied()).collect()
    }

    pub fn chain_hash(&self) -> &Hash32 {
        &self.chain_hash
    }

    pub fn len(&self) -> usize {
        self.dot_hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dot_hashes.is_empty()
    }

    pub fn dot_hash(&self, index: usize) -> Option<&Hash32> {
        self.dot_hashes.get(index)
    }

    pub fn dot_hashes(&self) -> &[Hash32] {
        &self.dot_hashes
    }

    pub fn dot(&self, index: usize) -> Option<&Arc<Dot>> {
        self.dots.get(index).and_then(Option::as_ref)
    }

    pub fn is_augmented(&self) -> bool {
        self.dots.iter().all(Option::is_some)
    }

    /// Resolves every unresolved member. Already resolved members are left
    /// untouched, so repeated calls are no-ops. Stops at the first member
    /// the lookup cannot supply.
    pub fn augment(&mut self, lookup: &dyn ObjectLookup) -> ObjectResult<()> {
        for (hash, slot) in self.dot_hashes.iter().zip(self.dots.iter_mut()) {
            if slot.is_some() {
                continue;
            }
            let dot = lookup
                .dot(hash)
                .ok_or_else(|| ObjectError::MissingDot(hex::encode(hash)))?;
            *slot = Some(dot);
        }
        Ok(())
    }

    /// Giver of the root DOT, once resolved.
    pub fn giver_vk(&self) -> Option<&Hash32> {
        self.dot(0).map(|d| d.giver())
    }

    /// `[root giver, hash_0, receiver_0, .., hash_n, receiver_n]`; `None`
    /// while any member is unresolved.
    pub fn revokable_hashes(&self) -> Option<Vec<Hash32>> {
        if !self.is_augmented() {
            return None;
        }
        let mut out = Vec::with_capacity(2 * self.len() + 1);
        out.push(*self.giver_vk()?);
        for dot in self.dots.iter().flatten() {
            out.push(*dot.hash());
            out.push(*dot.receiver());
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{DotBuilder, Entity, Revocation};
    use crate::permissions::Permissions;
    use ed25519_dalek::SigningKey;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Dots(HashMap<Hash32, Arc<Dot>>);

    impl ObjectLookup for Dots {
        fn dot(&self, hash: &Hash32) -> Option<Arc<Dot>> {
            self.0.get(hash).cloned()
        }
        fn entity(&self, _vk: &Hash32) -> Option<Arc<Entity>> {
            None
        }
        fn revocations(&self, _target: &Hash32) -> Vec<Arc<Revocation>> {
            Vec::new()
        }
    }

    fn two_hop() -> (Dots, Vec<Hash32>) {
        let a = SigningKey::from_bytes(&[1; 32]);
        let b = SigningKey::from_bytes(&[2; 32]);
        let c = SigningKey::from_bytes(&[3; 32]);
        let mut dots = Dots::default();
        let mut hashes = Vec::new();
        for (from, to) in [(&a, &b), (&b, &c)] {
            let blob = DotBuilder::access(
                to.verifying_key().to_bytes(),
                Permissions::CONSUME,
                [0; 32],
                "x/*",
            )
            .ttl(4)
            .sign(from)
            .unwrap();
            let dot = Dot::parse(&blob).unwrap();
            hashes.push(*dot.hash());
            dots.0.insert(*dot.hash(), Arc::new(dot));
        }
        (dots, hashes)
    }

    #[test]
    fn length_must_be_positive_multiple_of_hash() {
        assert_eq!(DChain::parse(&[]), Err(ObjectError::BadChainLength { len: 0 }));
        assert_eq!(DChain::parse(&[0; 33]), Err(ObjectError::BadChainLength { len: 33 }));
        assert_eq!(DChain::parse(&[0; 64]).unwrap().len(), 2);
    }

    #[test]
    fn overlong_chain_is_rejected_before_iteration() {
        let blob = vec![0u8; (MAX_CHAIN_DOTS + 1) * HASH_LEN];
        assert!(matches!(DChain::parse(&blob), Err(ObjectError::ChainTooLong { .. })));
        assert!(matches!(
            DChain::parse_bounded(&[0u8; 96], 2),
            Err(ObjectError::ChainTooLong { count: 3, max: 2 })
        ));
    }

    #[test]
    fn augment_is_idempotent() {
        let (dots, hashes) = two_hop();
        let mut chain = DChain::parse(&DChain::encode(&hashes)).unwrap();
        assert!(!chain.is_augmented());
        assert!(chain.revokable_hashes().is_none());
        chain.augment(&dots).unwrap();
        let first = chain.clone();
        chain.augment(&dots).unwrap();
        assert_eq!(chain, first);
        assert!(Arc::ptr_eq(chain.dot(0).unwrap(), first.dot(0).unwrap()));
    }

    #[test]
    fn augment_reports_missing_member() {
        let (mut dots, hashes) = two_hop();
        dots.0.remove(&hashes[1]);
        let mut chain = DChain::parse(&DChain::encode(&hashes)).unwrap();
        assert_eq!(
            chain.augment(&dots),
            Err(ObjectError::MissingDot(hex::encode(hashes[1])))
        );
        assert!(chain.dot(0).is_some());
        assert!(!chain.is_augmented());
    }

    #[test]
    fn revokable_hashes_follow_chain_order() {
        let (dots, hashes) = two_hop();
        let mut chain = DChain::parse(&DChain::encode(&hashes)).unwrap();
        chain.augment(&dots).unwrap();
        let r = chain.revokable_hashes().unwrap();
        assert_eq!(r.len(), 5);
        assert_eq!(r[0], SigningKey::from_bytes(&[1; 32]).verifying_key().to_bytes());
        assert_eq!(r[1], hashes[0]);
        assert_eq!(r[2], SigningKey::from_bytes(&[2; 32]).verifying_key().to_bytes());
        assert_eq!(r[3], hashes[1]);
        assert_eq!(r[4], SigningKey::from_bytes(&[3; 32]).verifying_key().to_bytes());
    }
}
