// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Execution-scoped object cache.
//!
//! Precompile calls are stateless on their own; the scratch store is how an
//! `UnpackDOT` in one call becomes visible to an `ADChainGrants` in the next.
//! Entities are keyed by verifying key, DOTs and chains by content hash, and
//! revocations by their target with the leading byte inverted.
//!
//! One `parking_lot::Mutex` guards the whole map. It is never held while a
//! lookup is in flight, because chain augmentation reads the store again.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::ObjectResult;
use crate::lookup::ObjectLookup;
use crate::objects::{DChain, Dot, Entity, Revocation};
use crate::Hash32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScratchObject {
    Entity(Arc<Entity>),
    Dot(Arc<Dot>),
    Chain(Arc<DChain>),
    Revocations(Vec<Arc<Revocation>>),
}

impl ScratchObject {
    fn label(&self) -> &'static str {
        match self {
            ScratchObject::Entity(_) => "entity",
            ScratchObject::Dot(_) => "dot",
            ScratchObject::Chain(_) => "chain",
            ScratchObject::Revocations(_) => "revocations",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationOutcome {
    Recorded,
    /// An issuer with authority over the target displaced a held revocation
    /// whose issuer has none, or whose authority could not be established.
    Replaced,
    /// The same revocation (by content hash) is already held.
    AlreadyKnown,
    /// An authorised revocation already represents the target, the issuer
    /// may not revoke the cached target, the slot holds another kind of
    /// object, or the signature did not verify.
    Ignored,
}

/// Whether an issuer may revoke a target, judged from what is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Authority {
    Granted,
    Denied,
    Unknown,
}

fn authority(
    objects: &HashMap<Hash32, ScratchObject>,
    target: &Hash32,
    issuer: &Hash32,
) -> Authority {
    let granted = match objects.get(target) {
        Some(ScratchObject::Dot(dot)) => dot.may_be_revoked_by(issuer),
        Some(ScratchObject::Entity(entity)) => entity.may_be_revoked_by(issuer),
        // A key may always revoke itself.
        _ if issuer == target => true,
        _ => return Authority::Unknown,
    };
    if granted {
        Authority::Granted
    } else {
        Authority::Denied
    }
}

/// Left-aligned 32-byte key: longer input is truncated, shorter input is
/// zero-extended. Inputs sharing a 32-byte prefix map to the same key.
pub fn key_from_slice(bytes: &[u8]) -> Hash32 {
    let mut key = [0u8; 32];
    let n = bytes.len().min(32);
    key[..n].copy_from_slice(&bytes[..n]);
    key
}

/// Key under which revocations of `target` are kept.
pub fn revocation_index_key(target: &Hash32) -> Hash32 {
    let mut key = *target;
    key[0] = !key[0];
    key
}

#[derive(Debug, Default)]
pub struct ScratchStore {
    objects: Mutex<HashMap<Hash32, ScratchObject>>,
}

impl ScratchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &Hash32) -> Option<ScratchObject> {
        self.objects.lock().get(key).cloned()
    }

    /// Stores `object`, returning whatever occupied the key before.
    pub fn put(&self, key: Hash32, object: ScratchObject) -> Option<ScratchObject> {
        tracing::debug!(
            target: "trustchain.scratch",
            key = %hex::encode(key),
            kind = object.label(),
            "scratch put"
        );
        self.objects.lock().insert(key, object)
    }

    pub fn get_slice(&self, key: &[u8]) -> Option<ScratchObject> {
        self.get(&key_from_slice(key))
    }

    pub fn put_slice(&self, key: &[u8], object: ScratchObject) -> Option<ScratchObject> {
        self.put(key_from_slice(key), object)
    }

    pub fn clear(&self) {
        let mut objects = self.objects.lock();
        if !objects.is_empty() {
            tracing::debug!(
                target: "trustchain.scratch",
                entries = objects.len(),
                "scratch cleared"
            );
        }
        objects.clear();
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }

    pub fn entity(&self, vk: &Hash32) -> Option<Arc<Entity>> {
        match self.objects.lock().get(vk) {
            Some(ScratchObject::Entity(e)) => Some(Arc::clone(e)),
            _ => None,
        }
    }

    pub fn dot(&self, hash: &Hash32) -> Option<Arc<Dot>> {
        match self.objects.lock().get(hash) {
            Some(ScratchObject::Dot(d)) => Some(Arc::clone(d)),
            _ => None,
        }
    }

    pub fn chain(&self, hash: &Hash32) -> Option<Arc<DChain>> {
        match self.objects.lock().get(hash) {
            Some(ScratchObject::Chain(c)) => Some(Arc::clone(c)),
            _ => None,
        }
    }

    pub fn put_entity(&self, entity: Entity) -> Arc<Entity> {
        let entity = Arc::new(entity);
        self.put(*entity.vk(), ScratchObject::Entity(Arc::clone(&entity)));
        entity
    }

    pub fn put_dot(&self, dot: Dot) -> Arc<Dot> {
        let dot = Arc::new(dot);
        self.put(*dot.hash(), ScratchObject::Dot(Arc::clone(&dot)));
        dot
    }

    /// Caches `chain` unless a chain with the same hash is already held, in
    /// which case the held (possibly augmented) chain is returned.
    pub fn insert_chain_if_absent(&self, chain: DChain) -> Arc<DChain> {
        let key = *chain.chain_hash();
        let mut objects = self.objects.lock();
        if let Some(ScratchObject::Chain(existing)) = objects.get(&key) {
            return Arc::clone(existing);
        }
        let chain = Arc::new(chain);
        tracing::debug!(
            target: "trustchain.scratch",
            key = %hex::encode(key),
            dots = chain.len(),
            "chain cached"
        );
        objects.insert(key, ScratchObject::Chain(Arc::clone(&chain)));
        chain
    }

    /// Records a verified revocation, keeping one per target.
    ///
    /// Authority is judged against the cached target: an issuer that may not
    /// revoke a cached DOT or entity is ignored. Otherwise the first
    /// revocation seen is retained, unless a later one is authorised and the
    /// held one is not.
    pub fn record_revocation(&self, revocation: Revocation) -> RevocationOutcome {
        if !revocation.sig_valid() {
            return RevocationOutcome::Ignored;
        }
        let target = *revocation.target();
        let key = revocation_index_key(&target);
        let mut objects = self.objects.lock();
        let incoming = authority(&objects, &target, revocation.issuer());
        let outcome = match objects.get(&key) {
            _ if incoming == Authority::Denied => RevocationOutcome::Ignored,
            None => RevocationOutcome::Recorded,
            Some(ScratchObject::Revocations(held)) => match held.first() {
                None => RevocationOutcome::Recorded,
                Some(_) if held.iter().any(|r| r.hash() == revocation.hash()) => {
                    RevocationOutcome::AlreadyKnown
                }
                Some(current) => {
                    let current = authority(&objects, &target, current.issuer());
                    if incoming == Authority::Granted && current != Authority::Granted {
                        RevocationOutcome::Replaced
                    } else {
                        RevocationOutcome::Ignored
                    }
                }
            },
            Some(_) => RevocationOutcome::Ignored,
        };
        if matches!(outcome, RevocationOutcome::Recorded | RevocationOutcome::Replaced) {
            objects.insert(key, ScratchObject::Revocations(vec![Arc::new(revocation)]));
        }
        tracing::debug!(
            target: "trustchain.scratch",
            key = %hex::encode(key),
            outcome = ?outcome,
            "revocation submitted"
        );
        outcome
    }

    /// Resolves the members of a cached chain and stores the result back.
    ///
    /// Returns `Ok(None)` for an unknown chain. Members resolved before a
    /// missing one stay resolved in the store.
    pub fn augment_chain(&self, chain_hash: &Hash32) -> ObjectResult<Option<Arc<DChain>>> {
        let Some(held) = self.chain(chain_hash) else {
            return Ok(None);
        };
        if held.is_augmented() {
            return Ok(Some(held));
        }
        let mut chain = DChain::clone(&held);
        let result = chain.augment(self);
        let chain = Arc::new(chain);
        self.objects
            .lock()
            .insert(*chain_hash, ScratchObject::Chain(Arc::clone(&chain)));
        if let Err(err) = result {
            tracing::warn!(
                target: "trustchain.scratch",
                chain = %hex::encode(chain_hash),
                error = %err,
                "chain member not cached"
            );
            return Err(err);
        }
        Ok(Some(chain))
    }
}

impl ObjectLookup for ScratchStore {
    fn dot(&self, hash: &Hash32) -> Option<Arc<Dot>> {
        ScratchStore::dot(self, hash)
    }

    fn entity(&self, vk: &Hash32) -> Option<Arc<Entity>> {
        ScratchStore::entity(self, vk)
    }

    fn revocations(&self, target: &Hash32) -> Vec<Arc<Revocation>> {
        match self.objects.lock().get(&revocation_index_key(target)) {
            Some(ScratchObject::Revocations(held)) => held.clone(),
            _ => Vec::new(),
        }
    }
}
