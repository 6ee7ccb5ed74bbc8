// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use thiserror::Error;

use crate::uri::UriError;

pub type ObjectResult<T> = Result<T, ObjectError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Entity,
    Dot,
    DChain,
    Revocation,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectKind::Entity => "entity",
            ObjectKind::Dot => "dot",
            ObjectKind::DChain => "dchain",
            ObjectKind::Revocation => "revocation",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    #[error("{kind} blob of {len} bytes is shorter than the {min} byte minimum")]
    TooShort {
        kind: ObjectKind,
        len: usize,
        min: usize,
    },

    #[error("{kind} section table runs past the signed body")]
    Truncated { kind: ObjectKind },

    #[error("{kind} section 0x{tag:02x} has invalid length {len}")]
    BadSectionLength { kind: ObjectKind, tag: u8, len: usize },

    #[error("{kind} section 0x{tag:02x} appears more than once")]
    DuplicateSection { kind: ObjectKind, tag: u8 },

    #[error("{kind} is missing required section 0x{tag:02x}")]
    MissingSection { kind: ObjectKind, tag: u8 },

    #[error("{kind} has {remaining} bytes between terminator and signature")]
    TrailingBytes { kind: ObjectKind, remaining: usize },

    #[error("unknown dot kind marker 0x{0:02x}")]
    UnknownDotKind(u8),

    #[error("{kind} text field is not valid utf-8")]
    InvalidText { kind: ObjectKind },

    #[error("{kind} field of {len} bytes does not fit a section")]
    FieldTooLong { kind: ObjectKind, len: usize },

    #[error("invalid uri pattern: {0}")]
    InvalidUri(#[from] UriError),

    #[error("dchain blob length {len} is not a positive multiple of 32")]
    BadChainLength { len: usize },

    #[error("dchain has {count} members, limit is {max}")]
    ChainTooLong { count: usize, max: usize },

    #[error("dchain member {0} is not in the scratch store")]
    MissingDot(String),
}
