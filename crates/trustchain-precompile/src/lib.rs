// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! trustchain-precompile
//!
//! Exposes the trust-chain primitives of `trustchain-core` through the
//! bytes-in/bytes-out precompile calling convention: a 4-byte selector
//! followed by word-encoded arguments, answered with word-encoded results.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
mod ops;
pub mod registry;
pub mod selector;

pub use crate::config::PrecompileConfig;
pub use crate::context::{Execution, ExecutionContext};
pub use crate::dispatch::{Precompile, TrustChainPrecompile};
pub use crate::error::{CallError, ConfigError, PrecompileError};
pub use crate::registry::{CallOutcome, PrecompileSet};
pub use crate::selector::Selector;

pub(crate) const LOG_TARGET: &str = "trustchain.precompile";
