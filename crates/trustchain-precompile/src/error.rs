// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;
use trustchain_core::abi::AbiError;
use trustchain_core::ObjectKind;

/// A failed precompile call. The host reports it to the caller as a failed
/// result; gas for the call is still charged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrecompileError {
    #[error("input of {len} bytes has no selector")]
    InputTooShort { len: usize },

    #[error("unknown selector 0x{0}")]
    UnknownSelector(String),

    #[error("argument decoding failed: {0}")]
    Abi(#[from] AbiError),

    #[error("{kind} {key} is not in the scratch store")]
    MissingObject { kind: ObjectKind, key: String },

    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange { index: u64, len: usize },

    #[error("precompile fault: {0}")]
    Fault(String),
}

impl PrecompileError {
    pub(crate) fn missing(kind: ObjectKind, key: &[u8]) -> Self {
        Self::MissingObject {
            kind,
            key: hex::encode(key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("no precompile at 0x{0}")]
    NotPrecompile(String),

    #[error("gas limit {limit} below required {required}")]
    OutOfGas { required: u64, limit: u64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid precompile address: {0}")]
    Address(String),

    #[error("invalid config: {0}")]
    Invalid(&'static str),
}
