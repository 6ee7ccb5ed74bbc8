// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Delegation-chain grant verification.
//!
//! [`check_access_grants`] decides whether an augmented access chain lets its
//! final receiver exercise a permission set over a namespace and URI suffix
//! at a given time. Checks run in a fixed order and the first failure is
//! reported:
//!
//! 1. request validation (URI suffix)
//! 2. chain structure: member resolution, hash match, giver/receiver
//!    continuity, access kind, TTL
//! 3. per DOT: signature, expiry, revocation
//! 4. composition of the hop grants through a [`GrantPolicy`]
//! 5. entities of every participant
//!
//! Entities are optional: a participant whose entity was never unpacked
//! yields [`GrantStatus::VerifiedIncomplete`] instead of a failure.

use std::fmt;
use std::sync::Arc;

use crate::lookup::ObjectLookup;
use crate::objects::{AccessGrant, DChain, Dot, DotKind, MAX_CHAIN_DOTS};
use crate::permissions::Permissions;
use crate::uri;
use crate::{Hash32, ZERO_HASH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrantStatus {
    Verified,
    VerifiedIncomplete,
    BadChain,
    UnresolvedDot,
    InvalidSignature,
    InsufficientPermission,
    NamespaceMismatch,
    Expired,
    Revoked,
    MalformedUriSuffix,
    TtlExceeded,
    NotAccessChain,
    UnknownChain,
}

impl GrantStatus {
    pub const fn code(self) -> u16 {
        match self {
            Self::Verified => 200,
            Self::VerifiedIncomplete => 201,
            Self::BadChain => 400,
            Self::UnresolvedDot => 401,
            Self::InvalidSignature => 402,
            Self::InsufficientPermission => 403,
            Self::NamespaceMismatch => 404,
            Self::Expired => 405,
            Self::Revoked => 406,
            Self::MalformedUriSuffix => 407,
            Self::TtlExceeded => 408,
            Self::NotAccessChain => 409,
            Self::UnknownChain => 410,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Verified => "VERIFIED",
            Self::VerifiedIncomplete => "VERIFIED_INCOMPLETE",
            Self::BadChain => "BAD_CHAIN",
            Self::UnresolvedDot => "UNRESOLVED_DOT",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::InsufficientPermission => "INSUFFICIENT_PERMISSION",
            Self::NamespaceMismatch => "NAMESPACE_MISMATCH",
            Self::Expired => "EXPIRED",
            Self::Revoked => "REVOKED",
            Self::MalformedUriSuffix => "MALFORMED_URI_SUFFIX",
            Self::TtlExceeded => "TTL_EXCEEDED",
            Self::NotAccessChain => "NOT_ACCESS_CHAIN",
            Self::UnknownChain => "UNKNOWN_CHAIN",
        }
    }

    pub const fn is_verified(self) -> bool {
        matches!(self, Self::Verified | Self::VerifiedIncomplete)
    }
}

impl fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.code())
    }
}

/// What the caller asks the chain to prove. `None` fields are unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantRequest<'a> {
    pub permissions: Permissions,
    pub namespace: Option<&'a Hash32>,
    pub uri: Option<&'a str>,
}

/// Decides whether the hop grants, root first, jointly satisfy a request.
pub trait GrantPolicy: Send + Sync {
    fn evaluate(
        &self,
        hops: &[&AccessGrant],
        request: &GrantRequest<'_>,
    ) -> Result<(), GrantStatus>;
}

/// Every hop must on its own grant the whole request, and all hops must
/// name the same namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrowingPolicy;

impl GrantPolicy for NarrowingPolicy {
    fn evaluate(
        &self,
        hops: &[&AccessGrant],
        request: &GrantRequest<'_>,
    ) -> Result<(), GrantStatus> {
        let Some(first) = hops.first() else {
            return Err(GrantStatus::BadChain);
        };
        if let Some(ns) = request.namespace {
            if &first.namespace != ns {
                return Err(GrantStatus::NamespaceMismatch);
            }
        }
        for hop in hops {
            if hop.namespace != first.namespace {
                return Err(GrantStatus::NamespaceMismatch);
            }
            if !hop.permissions.covers(request.permissions) {
                return Err(GrantStatus::InsufficientPermission);
            }
            if let Some(uri) = request.uri {
                // Patterns were validated when the DOT was parsed.
                if !uri::covers(&hop.uri, uri).unwrap_or(false) {
                    return Err(GrantStatus::InsufficientPermission);
                }
            }
        }
        Ok(())
    }
}

fn honoured_revocation(
    lookup: &dyn ObjectLookup,
    target: &Hash32,
    authorised: impl Fn(&Hash32) -> bool,
) -> bool {
    lookup
        .revocations(target)
        .iter()
        .any(|r| r.sig_valid() && r.target() == target && authorised(r.issuer()))
}

fn resolve_members(
    chain: &DChain,
    lookup: &dyn ObjectLookup,
) -> Result<Vec<Arc<Dot>>, GrantStatus> {
    let n = chain.len();
    if n == 0 || n > MAX_CHAIN_DOTS {
        return Err(GrantStatus::BadChain);
    }
    let mut dots: Vec<Arc<Dot>> = Vec::with_capacity(n);
    for (i, hash) in chain.dot_hashes().iter().enumerate() {
        let dot = chain
            .dot(i)
            .cloned()
            .or_else(|| lookup.dot(hash))
            .ok_or(GrantStatus::UnresolvedDot)?;
        if dot.hash() != hash {
            return Err(GrantStatus::BadChain);
        }
        if let Some(prev) = dots.last() {
            if prev.receiver() != dot.giver() {
                return Err(GrantStatus::BadChain);
            }
        }
        if dot.kind() != DotKind::Access {
            return Err(GrantStatus::NotAccessChain);
        }
        // Hop i may be followed by n - 1 - i further delegations.
        if usize::from(dot.ttl()) < n - 1 - i {
            return Err(GrantStatus::TtlExceeded);
        }
        dots.push(dot);
    }
    Ok(dots)
}

/// Evaluates `chain` against the request. An all-zero `namespace` and an
/// empty `uri_suffix` leave that dimension unconstrained.
pub fn check_access_grants(
    chain: &DChain,
    requested: Permissions,
    namespace: &Hash32,
    uri_suffix: &[u8],
    now: u64,
    lookup: &dyn ObjectLookup,
    policy: &dyn GrantPolicy,
) -> GrantStatus {
    let uri = if uri_suffix.is_empty() {
        None
    } else {
        match uri::parse_suffix(uri_suffix) {
            Ok(s) => Some(s),
            Err(_) => return GrantStatus::MalformedUriSuffix,
        }
    };
    let request = GrantRequest {
        permissions: requested,
        namespace: (namespace != &ZERO_HASH).then_some(namespace),
        uri,
    };

    let dots = match resolve_members(chain, lookup) {
        Ok(dots) => dots,
        Err(status) => return status,
    };

    for dot in &dots {
        if !dot.sig_valid() {
            return GrantStatus::InvalidSignature;
        }
        if dot.is_expired_at(now) {
            return GrantStatus::Expired;
        }
        if honoured_revocation(lookup, dot.hash(), |issuer| dot.may_be_revoked_by(issuer)) {
            return GrantStatus::Revoked;
        }
    }

    let hops: Vec<&AccessGrant> = dots.iter().filter_map(|d| d.access()).collect();
    if let Err(status) = policy.evaluate(&hops, &request) {
        return status;
    }

    let mut participants: Vec<&Hash32> = Vec::with_capacity(dots.len() + 1);
    participants.extend(dots.first().map(|d| d.giver()));
    participants.extend(dots.iter().map(|d| d.receiver()));

    let mut incomplete = false;
    for vk in participants {
        match lookup.entity(vk) {
            Some(entity) => {
                if !entity.sig_valid() {
                    return GrantStatus::InvalidSignature;
                }
                if entity.is_expired_at(now) {
                    return GrantStatus::Expired;
                }
                if honoured_revocation(lookup, vk, |issuer| entity.may_be_revoked_by(issuer)) {
                    return GrantStatus::Revoked;
                }
            }
            None => {
                incomplete = true;
                if honoured_revocation(lookup, vk, |issuer| issuer == vk) {
                    return GrantStatus::Revoked;
                }
            }
        }
    }

    if incomplete {
        GrantStatus::VerifiedIncomplete
    } else {
        GrantStatus::Verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{DotBuilder, Entity, EntityBuilder, Revocation, RevocationBuilder};
    use ed25519_dalek::SigningKey;
    use std::collections::HashMap;

    const NS: Hash32 = [0x5a; 32];

    fn sk(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    fn vk(seed: u8) -> Hash32 {
        sk(seed).verifying_key().to_bytes()
    }

    #[derive(Default)]
    struct Fixture {
        dots: HashMap<Hash32, Arc<Dot>>,
        entities: HashMap<Hash32, Arc<Entity>>,
        revocations: HashMap<Hash32, Vec<Arc<Revocation>>>,
    }

    impl ObjectLookup for Fixture {
        fn dot(&self, hash: &Hash32) -> Option<Arc<Dot>> {
            self.dots.get(hash).cloned()
        }
        fn entity(&self, vk: &Hash32) -> Option<Arc<Entity>> {
            self.entities.get(vk).cloned()
        }
        fn revocations(&self, target: &Hash32) -> Vec<Arc<Revocation>> {
            self.revocations.get(target).cloned().unwrap_or_default()
        }
    }

    impl Fixture {
        fn add_dot(&mut self, blob: &[u8]) -> Hash32 {
            let dot = Dot::parse(blob).unwrap();
            let hash = *dot.hash();
            self.dots.insert(hash, Arc::new(dot));
            hash
        }

        fn add_entity(&mut self, seed: u8, builder: EntityBuilder) {
            let e = Entity::parse(&builder.sign(&sk(seed)).unwrap()).unwrap();
            self.entities.insert(*e.vk(), Arc::new(e));
        }

        fn revoke(&mut self, target: Hash32, issuer: u8) {
            let blob = RevocationBuilder::new(target).sign(&sk(issuer)).unwrap();
            let r = Revocation::parse(&blob).unwrap();
            self.revocations.entry(target).or_default().push(Arc::new(r));
        }

        fn chain(&self, hashes: &[Hash32]) -> DChain {
            let mut chain = DChain::parse(&DChain::encode(hashes)).unwrap();
            chain.augment(self).unwrap();
            chain
        }
    }

    fn hop(from: u8, to: u8, perms: Permissions, uri: &str, ttl: u8) -> Vec<u8> {
        DotBuilder::access(vk(to), perms, NS, uri)
            .ttl(ttl)
            .expiry(1_000)
            .sign(&sk(from))
            .unwrap()
    }

    /// 1 -> 2 -> 3 with entities for everyone.
    fn two_hops() -> (Fixture, Vec<Hash32>) {
        let mut f = Fixture::default();
        let perms = Permissions::CONSUME_STAR | Permissions::PUBLISH;
        let a = f.add_dot(&hop(1, 2, perms, "bldg/*", 2));
        let b = f.add_dot(&hop(2, 3, Permissions::CONSUME_PLUS, "bldg/+/temp", 0));
        for seed in 1..=3 {
            f.add_entity(seed, EntityBuilder::new());
        }
        (f, vec![a, b])
    }

    fn check(
        f: &Fixture,
        chain: &DChain,
        perms: Permissions,
        ns: &Hash32,
        uri: &str,
        now: u64,
    ) -> GrantStatus {
        check_access_grants(chain, perms, ns, uri.as_bytes(), now, f, &NarrowingPolicy)
    }

    #[test]
    fn status_codes_are_stable() {
        assert_eq!(GrantStatus::Verified.code(), 200);
        assert_eq!(GrantStatus::VerifiedIncomplete.code(), 201);
        assert_eq!(GrantStatus::TtlExceeded.code(), 408);
        assert_eq!(GrantStatus::UnknownChain.code(), 410);
        assert_eq!(GrantStatus::Revoked.to_string(), "REVOKED (406)");
        assert!(GrantStatus::VerifiedIncomplete.is_verified());
        assert!(!GrantStatus::Expired.is_verified());
    }

    #[test]
    fn narrowed_request_verifies() {
        let (f, hashes) = two_hops();
        let chain = f.chain(&hashes);
        assert_eq!(
            check(&f, &chain, Permissions::CONSUME, &NS, "bldg/3/temp", 10),
            GrantStatus::Verified
        );
        assert_eq!(
            check(&f, &chain, Permissions::CONSUME, &ZERO_HASH, "", 10),
            GrantStatus::Verified
        );
    }

    #[test]
    fn missing_entity_is_incomplete() {
        let (mut f, hashes) = two_hops();
        f.entities.remove(&vk(2));
        let chain = f.chain(&hashes);
        assert_eq!(
            check(&f, &chain, Permissions::CONSUME, &NS, "", 10),
            GrantStatus::VerifiedIncomplete
        );
    }

    #[test]
    fn request_beyond_any_hop_is_refused() {
        let (f, hashes) = two_hops();
        let chain = f.chain(&hashes);
        assert_eq!(
            check(&f, &chain, Permissions::PUBLISH, &NS, "", 10),
            GrantStatus::InsufficientPermission
        );
        assert_eq!(
            check(&f, &chain, Permissions::CONSUME, &NS, "bldg/3/power", 10),
            GrantStatus::InsufficientPermission
        );
        assert_eq!(
            check(&f, &chain, Permissions::CONSUME, &[1; 32], "", 10),
            GrantStatus::NamespaceMismatch
        );
    }

    #[test]
    fn malformed_suffix_is_reported_first() {
        let (f, hashes) = two_hops();
        let chain = f.chain(&hashes);
        assert_eq!(
            check(&f, &chain, Permissions::CONSUME, &NS, "a//b", 10),
            GrantStatus::MalformedUriSuffix
        );
        assert_eq!(
            check_access_grants(
                &chain,
                Permissions::CONSUME,
                &NS,
                &[0xff],
                10,
                &f,
                &NarrowingPolicy
            ),
            GrantStatus::MalformedUriSuffix
        );
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let (f, hashes) = two_hops();
        let chain = f.chain(&hashes);
        assert_eq!(check(&f, &chain, Permissions::CONSUME, &NS, "", 999), GrantStatus::Verified);
        assert_eq!(check(&f, &chain, Permissions::CONSUME, &NS, "", 1_000), GrantStatus::Expired);
    }

    #[test]
    fn revocation_needs_authority() {
        let (mut f, hashes) = two_hops();
        f.revoke(hashes[1], 9);
        let chain = f.chain(&hashes);
        assert_eq!(check(&f, &chain, Permissions::CONSUME, &NS, "", 10), GrantStatus::Verified);

        f.revoke(hashes[1], 2);
        assert_eq!(check(&f, &chain, Permissions::CONSUME, &NS, "", 10), GrantStatus::Revoked);
    }

    #[test]
    fn entity_revocation_by_delegate_is_honoured() {
        let (mut f, hashes) = two_hops();
        f.add_entity(3, EntityBuilder::new().revoker(vk(8)));
        f.revoke(vk(3), 8);
        let chain = f.chain(&hashes);
        assert_eq!(check(&f, &chain, Permissions::CONSUME, &NS, "", 10), GrantStatus::Revoked);
    }

    #[test]
    fn uncached_entity_may_only_revoke_itself() {
        let (mut f, hashes) = two_hops();
        f.entities.remove(&vk(3));
        f.revoke(vk(3), 8);
        let chain = f.chain(&hashes);
        assert_eq!(
            check(&f, &chain, Permissions::CONSUME, &NS, "", 10),
            GrantStatus::VerifiedIncomplete
        );
        f.revoke(vk(3), 3);
        assert_eq!(check(&f, &chain, Permissions::CONSUME, &NS, "", 10), GrantStatus::Revoked);
    }

    #[test]
    fn expired_entity_fails_chain() {
        let (mut f, hashes) = two_hops();
        f.add_entity(1, EntityBuilder::new().expiry(5));
        let chain = f.chain(&hashes);
        assert_eq!(check(&f, &chain, Permissions::CONSUME, &NS, "", 10), GrantStatus::Expired);
    }

    #[test]
    fn broken_continuity_is_bad_chain() {
        let mut f = Fixture::default();
        let a = f.add_dot(&hop(1, 2, Permissions::CONSUME, "*", 1));
        let b = f.add_dot(&hop(4, 3, Permissions::CONSUME, "*", 0));
        let chain = f.chain(&[a, b]);
        assert_eq!(check(&f, &chain, Permissions::CONSUME, &NS, "", 10), GrantStatus::BadChain);
    }

    #[test]
    fn ttl_limits_depth() {
        let mut f = Fixture::default();
        let a = f.add_dot(&hop(1, 2, Permissions::CONSUME, "*", 0));
        let b = f.add_dot(&hop(2, 3, Permissions::CONSUME, "*", 0));
        let chain = f.chain(&[a, b]);
        assert_eq!(check(&f, &chain, Permissions::CONSUME, &NS, "", 10), GrantStatus::TtlExceeded);
    }

    #[test]
    fn permission_dot_is_not_an_access_chain() {
        let mut f = Fixture::default();
        let p = f.add_dot(&DotBuilder::permission(vk(2)).entry("k", "v").sign(&sk(1)).unwrap());
        let chain = f.chain(&[p]);
        assert_eq!(
            check(&f, &chain, Permissions::CONSUME, &NS, "", 10),
            GrantStatus::NotAccessChain
        );
    }

    #[test]
    fn unresolved_member_is_reported() {
        let (mut f, hashes) = two_hops();
        let chain = DChain::parse(&DChain::encode(&hashes)).unwrap();
        f.dots.remove(&hashes[1]);
        assert_eq!(
            check(&f, &chain, Permissions::CONSUME, &NS, "", 10),
            GrantStatus::UnresolvedDot
        );
    }

    #[test]
    fn forged_dot_signature_is_rejected() {
        let mut blob = hop(1, 2, Permissions::CONSUME, "*", 0);
        let n = blob.len();
        blob[n - 1] ^= 0x01;
        let mut f = Fixture::default();
        let h = f.add_dot(&blob);
        let chain = f.chain(&[h]);
        assert_eq!(
            check(&f, &chain, Permissions::CONSUME, &NS, "", 10),
            GrantStatus::InvalidSignature
        );
    }

    struct DenyAll;

    impl GrantPolicy for DenyAll {
        fn evaluate(
            &self,
            _hops: &[&AccessGrant],
            _request: &GrantRequest<'_>,
        ) -> Result<(), GrantStatus> {
            Err(GrantStatus::InsufficientPermission)
        }
    }

    #[test]
    fn policy_is_pluggable() {
        let (f, hashes) = two_hops();
        let chain = f.chain(&hashes);
        assert_eq!(
            check_access_grants(&chain, Permissions::NONE, &ZERO_HASH, b"", 10, &f, &DenyAll),
            GrantStatus::InsufficientPermission
        );
    }
}
