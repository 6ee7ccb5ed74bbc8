// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use crate::objects::{Dot, Entity, Revocation};
use crate::Hash32;

/// Read access to previously validated objects.
///
/// The chain verifier only sees objects through this trait, so it can be
/// driven by the scratch store or by a fixed set of objects in tests.
pub trait ObjectLookup {
    fn dot(&self, hash: &Hash32) -> Option<Arc<Dot>>;

    fn entity(&self, vk: &Hash32) -> Option<Arc<Entity>>;

    /// Revocations recorded against `target` (a DOT hash or verifying key).
    fn revocations(&self, target: &Hash32) -> Vec<Arc<Revocation>>;
}
