// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Operation selectors: the first four bytes of the Keccak-256 digest of each
//! operation's canonical signature. The values are fixed by the on-chain
//! callers and are not recomputed at runtime.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    VerifyEd25519,
    VerifyEd25519Packed,
    UnpackEntity,
    GetEntityDelegatedRevoker,
    UnpackDot,
    GetDotDelegatedRevoker,
    UnpackAccessDChain,
    GetDChainDotHash,
    GetDotNumRevokableHashes,
    GetDotRevokableHash,
    GetDChainNumRevokableHashes,
    GetDChainRevokableHash,
    UnpackRevocation,
    ADChainGrants,
    SliceByte32,
}

impl Selector {
    pub const ALL: [Selector; 15] = [
        Self::VerifyEd25519,
        Self::VerifyEd25519Packed,
        Self::UnpackEntity,
        Self::GetEntityDelegatedRevoker,
        Self::UnpackDot,
        Self::GetDotDelegatedRevoker,
        Self::UnpackAccessDChain,
        Self::GetDChainDotHash,
        Self::GetDotNumRevokableHashes,
        Self::GetDotRevokableHash,
        Self::GetDChainNumRevokableHashes,
        Self::GetDChainRevokableHash,
        Self::UnpackRevocation,
        Self::ADChainGrants,
        Self::SliceByte32,
    ];

    pub const fn bytes(self) -> [u8; 4] {
        match self {
            Self::VerifyEd25519 => [0x0b, 0x35, 0xfe, 0x44],
            Self::VerifyEd25519Packed => [0x70, 0xd6, 0x95, 0xf7],
            Self::UnpackEntity => [0xe7, 0xb6, 0x86, 0xa7],
            Self::GetEntityDelegatedRevoker => [0x3a, 0xfe, 0x3a, 0x8a],
            Self::UnpackDot => [0x3a, 0xab, 0x47, 0xb2],
            Self::GetDotDelegatedRevoker => [0xe0, 0x03, 0x1b, 0x1d],
            Self::UnpackAccessDChain => [0x22, 0xaf, 0x1b, 0x27],
            Self::GetDChainDotHash => [0xda, 0x3c, 0xd6, 0x74],
            Self::GetDotNumRevokableHashes => [0x84, 0xea, 0x2e, 0x31],
            Self::GetDotRevokableHash => [0x24, 0xf6, 0x18, 0xb6],
            Self::GetDChainNumRevokableHashes => [0x05, 0xd5, 0x6a, 0x4e],
            Self::GetDChainRevokableHash => [0xee, 0xf9, 0x36, 0x11],
            Self::UnpackRevocation => [0xe5, 0x73, 0x1b, 0x77],
            Self::ADChainGrants => [0x8c, 0x75, 0x65, 0xdc],
            Self::SliceByte32 => [0xce, 0x7a, 0x94, 0xeb],
        }
    }

    pub const fn signature(self) -> &'static str {
        match self {
            Self::VerifyEd25519 => "VerifyEd25519(bytes32,bytes,bytes)",
            Self::VerifyEd25519Packed => "VerifyEd25519Packed(bytes)",
            Self::UnpackEntity => "UnpackEntity(bytes)",
            Self::GetEntityDelegatedRevoker => "GetEntityDelegatedRevoker(bytes32,uint8)",
            Self::UnpackDot => "UnpackDOT(bytes)",
            Self::GetDotDelegatedRevoker => "GetDOTDelegatedRevoker(bytes32,uint8)",
            Self::UnpackAccessDChain => "UnpackAccessDChain(bytes)",
            Self::GetDChainDotHash => "GetDChainDOTHash(bytes32,uint8)",
            Self::GetDotNumRevokableHashes => "GetDOTNumRevokableHashes(bytes32)",
            Self::GetDotRevokableHash => "GetDOTRevokableHash(bytes32,uint32)",
            Self::GetDChainNumRevokableHashes => "GetDChainNumRevokableHashes(bytes32)",
            Self::GetDChainRevokableHash => "GetDChainRevokableHash(bytes32,uint32)",
            Self::UnpackRevocation => "UnpackRevocation(bytes)",
            Self::ADChainGrants => "ADChainGrants(bytes32,bytes8,bytes32,bytes)",
            Self::SliceByte32 => "SliceByte32(bytes,uint32)",
        }
    }

    /// Operation name without the argument list.
    pub fn name(self) -> &'static str {
        let sig = self.signature();
        sig.split('(').next().unwrap_or(sig)
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.bytes() == bytes)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.signature())
    }
}
