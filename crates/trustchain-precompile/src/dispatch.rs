// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use trustchain_core::abi::Args;

use crate::config::PrecompileConfig;
use crate::context::ExecutionContext;
use crate::error::PrecompileError;
use crate::ops::{self, Call};
use crate::selector::Selector;
use crate::LOG_TARGET;

/// A native function reachable from VM code at a reserved address.
pub trait Precompile: Send + Sync {
    fn required_gas(&self, input: &[u8]) -> u64;

    fn run(&self, input: &[u8], ctx: &dyn ExecutionContext) -> Result<Vec<u8>, PrecompileError>;
}

#[derive(Debug, Clone, Default)]
pub struct TrustChainPrecompile {
    config: PrecompileConfig,
}

impl TrustChainPrecompile {
    pub fn new(config: PrecompileConfig) -> Self {
        Self { config }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl Precompile for TrustChainPrecompile {
    fn required_gas(&self, _input: &[u8]) -> u64 {
        self.config.gas_cost
    }

    fn run(&self, input: &[u8], ctx: &dyn ExecutionContext) -> Result<Vec<u8>, PrecompileError> {
        if input.len() < 4 {
            return Err(PrecompileError::InputTooShort { len: input.len() });
        }
        let (head, rest) = input.split_at(4);
        let Some(selector) = Selector::from_bytes([head[0], head[1], head[2], head[3]]) else {
            tracing::debug!(target: LOG_TARGET, selector = %hex::encode(head), "unknown selector");
            return Err(PrecompileError::UnknownSelector(hex::encode(head)));
        };
        tracing::trace!(
            target: LOG_TARGET,
            op = selector.name(),
            input_len = input.len(),
            "dispatch"
        );

        let call = Call {
            args: Args::new(rest),
            ctx,
            config: &self.config,
        };
        match catch_unwind(AssertUnwindSafe(|| ops::dispatch(selector, &call))) {
            Ok(result) => result,
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                tracing::error!(
                    target: LOG_TARGET,
                    op = selector.name(),
                    panic = %msg,
                    "precompile fault"
                );
                Err(PrecompileError::Fault(msg))
            }
        }
    }
}
