// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! trustchain-core
//!
//! Building blocks for the trust-chain precompile:
//! - ABI-style word codec for precompile arguments and results
//! - Codecs for Entities, DOTs, delegation chains and revocations
//! - The execution-scoped scratch store that carries validated objects
//!   between otherwise stateless precompile calls
//! - The delegation-chain grant verifier

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod abi;
pub mod crypto;
pub mod error;
pub mod grants;
pub mod lookup;
pub mod objects;
pub mod permissions;
pub mod scratch;
pub mod uri;

pub use crate::error::{ObjectError, ObjectKind, ObjectResult};
pub use crate::grants::{
    check_access_grants, GrantPolicy, GrantRequest, GrantStatus, NarrowingPolicy,
};
pub use crate::lookup::ObjectLookup;
pub use crate::objects::{DChain, Dot, DotGrant, Entity, Revocation};
pub use crate::permissions::Permissions;
pub use crate::scratch::{RevocationOutcome, ScratchObject, ScratchStore};

/// 32-byte digest or verifying key.
pub type Hash32 = [u8; 32];

pub const ZERO_HASH: Hash32 = [0u8; 32];
