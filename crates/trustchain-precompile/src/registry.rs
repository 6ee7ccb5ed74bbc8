// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::PrecompileConfig;
use crate::context::ExecutionContext;
use crate::dispatch::{Precompile, TrustChainPrecompile};
use crate::error::{CallError, PrecompileError};
use crate::LOG_TARGET;

/// Result of a metered call. A failed `output` still consumed `gas_used`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    pub gas_used: u64,
    pub output: Result<Vec<u8>, PrecompileError>,
}

/// Precompiles keyed by their reserved 20-byte address.
#[derive(Default, Clone)]
pub struct PrecompileSet {
    entries: BTreeMap<[u8; 20], Arc<dyn Precompile>>,
}

impl std::fmt::Debug for PrecompileSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.keys().map(hex::encode))
            .finish()
    }
}

impl PrecompileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding only the trust-chain precompile at its configured
    /// address.
    pub fn with_trustchain(config: PrecompileConfig) -> Self {
        let mut set = Self::new();
        set.register(config.address, Arc::new(TrustChainPrecompile::new(config)));
        set
    }

    pub fn register(
        &mut self,
        address: [u8; 20],
        precompile: Arc<dyn Precompile>,
    ) -> Option<Arc<dyn Precompile>> {
        self.entries.insert(address, precompile)
    }

    pub fn contains(&self, address: &[u8; 20]) -> bool {
        self.entries.contains_key(address)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &[u8; 20]> {
        self.entries.keys()
    }

    /// Charges the precompile's fee against `gas_limit` and runs it.
    pub fn call(
        &self,
        address: &[u8; 20],
        input: &[u8],
        gas_limit: u64,
        ctx: &dyn ExecutionContext,
    ) -> Result<CallOutcome, CallError> {
        let precompile = self
            .entries
            .get(address)
            .ok_or_else(|| CallError::NotPrecompile(hex::encode(address)))?;
        let required = precompile.required_gas(input);
        if gas_limit < required {
            tracing::debug!(target: LOG_TARGET, required, limit = gas_limit, "out of gas");
            return Err(CallError::OutOfGas {
                required,
                limit: gas_limit,
            });
        }
        let output = precompile.run(input, ctx);
        if let Err(err) = &output {
            tracing::debug!(
                target: LOG_TARGET,
                address = %hex::encode(address),
                error = %err,
                "precompile call failed"
            );
        }
        Ok(CallOutcome {
            gas_used: required,
            output,
        })
    }
}
