// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Access permission sets (ADPS).
//!
//! A permission set is a 64-bit mask. The star and plus variants of consume
//! and tap imply their weaker forms, so coverage is decided against the
//! implication closure of the granted set.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Permissions(u64);

impl Permissions {
    pub const NONE: Permissions = Permissions(0);
    pub const CONSUME: Permissions = Permissions(1 << 0);
    pub const CONSUME_PLUS: Permissions = Permissions(1 << 1);
    pub const CONSUME_STAR: Permissions = Permissions(1 << 2);
    pub const PUBLISH: Permissions = Permissions(1 << 3);
    pub const TAP: Permissions = Permissions(1 << 4);
    pub const TAP_PLUS: Permissions = Permissions(1 << 5);
    pub const TAP_STAR: Permissions = Permissions(1 << 6);
    pub const LIST: Permissions = Permissions(1 << 7);

    const TOKENS: [(&'static str, Permissions); 8] = [
        ("C*", Permissions::CONSUME_STAR),
        ("C+", Permissions::CONSUME_PLUS),
        ("C", Permissions::CONSUME),
        ("P", Permissions::PUBLISH),
        ("T*", Permissions::TAP_STAR),
        ("T+", Permissions::TAP_PLUS),
        ("T", Permissions::TAP),
        ("L", Permissions::LIST),
    ];

    pub const fn from_bits(bits: u64) -> Self {
        Permissions(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Decodes the `bytes8` argument form: the leading eight bytes of the
    /// slice, big-endian, zero-extended when shorter.
    pub fn from_packed(packed: &[u8]) -> Self {
        let mut raw = [0u8; 8];
        let n = packed.len().min(8);
        raw[..n].copy_from_slice(&packed[..n]);
        Permissions(u64::from_be_bytes(raw))
    }

    pub fn to_packed(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub const fn contains(self, other: Permissions) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Permissions) -> Permissions {
        Permissions(self.0 | other.0)
    }

    /// Adds every permission implied by the ones present.
    pub fn closure(self) -> Permissions {
        let mut out = self;
        if out.contains(Permissions::CONSUME_STAR) {
            out = out.union(Permissions::CONSUME_PLUS);
        }
        if out.contains(Permissions::CONSUME_PLUS) {
            out = out.union(Permissions::CONSUME);
        }
        if out.contains(Permissions::TAP_STAR) {
            out = out.union(Permissions::TAP_PLUS);
        }
        if out.contains(Permissions::TAP_PLUS) {
            out = out.union(Permissions::TAP);
        }
        out
    }

    /// True when every requested bit is granted directly or by implication.
    pub fn covers(self, requested: Permissions) -> bool {
        self.closure().contains(requested)
    }
}

impl std::ops::BitOr for Permissions {
    type Output = Permissions;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Canonical order is C, C+, C*, P, T, T+, T*, L.
        let order = [
            ("C", Permissions::CONSUME),
            ("C+", Permissions::CONSUME_PLUS),
            ("C*", Permissions::CONSUME_STAR),
            ("P", Permissions::PUBLISH),
            ("T", Permissions::TAP),
            ("T+", Permissions::TAP_PLUS),
            ("T*", Permissions::TAP_STAR),
            ("L", Permissions::LIST),
        ];
        for (token, perm) in order {
            if self.contains(perm) {
                f.write_str(token)?;
            }
        }
        let unknown = self.0 & !0xff;
        if unknown != 0 {
            write!(f, "#{unknown:x}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised permission token at position {position} in {input:?}")]
pub struct ParsePermissionsError {
    pub input: String,
    pub position: usize,
}

impl FromStr for Permissions {
    type Err = ParsePermissionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = Permissions::NONE;
        let mut rest = s;
        while !rest.is_empty() {
            let Some((token, perm)) = Permissions::TOKENS
                .iter()
                .find(|(token, _)| rest.starts_with(token))
            else {
                return Err(ParsePermissionsError {
                    input: s.to_string(),
                    position: s.len() - rest.len(),
                });
            };
            out = out.union(*perm);
            rest = &rest[token.len()..];
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_implies_plus_and_base() {
        let granted = Permissions::CONSUME_STAR;
        assert!(granted.covers(Permissions::CONSUME));
        assert!(granted.covers(Permissions::CONSUME_PLUS));
        assert!(!granted.covers(Permissions::PUBLISH));
        assert!(!Permissions::CONSUME.covers(Permissions::CONSUME_STAR));
    }

    #[test]
    fn empty_request_is_always_covered() {
        assert!(Permissions::NONE.covers(Permissions::NONE));
    }

    #[test]
    fn unknown_bits_must_be_granted_verbatim() {
        let odd = Permissions::from_bits(1 << 40);
        assert!(!Permissions::from_bits(0xff).covers(odd));
        assert!(Permissions::from_bits(1 << 40).covers(odd));
    }

    #[test]
    fn packed_form_reads_leading_bytes() {
        let p = Permissions::CONSUME | Permissions::LIST;
        let mut word = [0u8; 32];
        word[..8].copy_from_slice(&p.to_packed());
        assert_eq!(Permissions::from_packed(&word), p);
        assert_eq!(Permissions::from_packed(&[]), Permissions::NONE);
    }

    #[test]
    fn text_form_parses_and_displays() {
        let p: Permissions = "C*PT+L".parse().unwrap();
        assert!(p.contains(Permissions::CONSUME_STAR));
        assert!(p.contains(Permissions::TAP_PLUS));
        assert!(!p.contains(Permissions::TAP));
        assert_eq!(p.to_string(), "C*PT+L");
        assert!("CX".parse::<Permissions>().is_err());
    }
}
