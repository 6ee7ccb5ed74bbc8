// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! URI suffix patterns carried by access DOTs and grant requests.
//!
//! Segments are `/`-separated. `+` matches exactly one segment and `*`
//! matches any number of segments, including none.

use thiserror::Error;

pub const MAX_URI_LEN: usize = 256;
pub const MAX_URI_SEGMENTS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    #[error("uri is empty")]
    Empty,
    #[error("uri of {0} bytes exceeds {MAX_URI_LEN}")]
    TooLong(usize),
    #[error("uri has more than {MAX_URI_SEGMENTS} segments")]
    TooManySegments,
    #[error("uri segment {0} is empty")]
    EmptySegment(usize),
    #[error("uri segment {0} mixes a wildcard with other characters")]
    PartialWildcard(usize),
    #[error("uri contains more than one '*'")]
    MultipleStar,
    #[error("uri contains a non-printable character")]
    InvalidChar,
    #[error("uri is not valid utf-8")]
    NotUtf8,
}

/// Validates a pattern and returns its segments.
pub fn segments(pattern: &str) -> Result<Vec<&str>, UriError> {
    if pattern.is_empty() {
        return Err(UriError::Empty);
    }
    if pattern.len() > MAX_URI_LEN {
        return Err(UriError::TooLong(pattern.len()));
    }
    if !pattern.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(UriError::InvalidChar);
    }
    let parts: Vec<&str> = pattern.split('/').collect();
    if parts.len() > MAX_URI_SEGMENTS {
        return Err(UriError::TooManySegments);
    }
    let mut stars = 0usize;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            return Err(UriError::EmptySegment(i));
        }
        if *part == "*" {
            stars += 1;
        } else if part.contains(['*', '+']) && *part != "+" {
            return Err(UriError::PartialWildcard(i));
        }
    }
    if stars > 1 {
        return Err(UriError::MultipleStar);
    }
    Ok(parts)
}

pub fn validate(pattern: &str) -> Result<(), UriError> {
    segments(pattern).map(|_| ())
}

pub fn parse_suffix(raw: &[u8]) -> Result<&str, UriError> {
    let s = std::str::from_utf8(raw).map_err(|_| UriError::NotUtf8)?;
    validate(s)?;
    Ok(s)
}

/// True when every concrete URI matched by `request` is also matched by
/// `grant`.
pub fn covers(grant: &str, request: &str) -> Result<bool, UriError> {
    let g = segments(grant)?;
    let r = segments(request)?;
    Ok(covers_segments(&g, &r))
}

fn covers_segments(grant: &[&str], request: &[&str]) -> bool {
    match (grant.first(), request.first()) {
        (None, None) => true,
        (Some(&"*"), _) => (0..=request.len()).any(|i| covers_segments(&grant[1..], &request[i..])),
        (None, Some(_)) | (Some(_), None) => false,
        // A request star can expand to any depth; only a grant star covers it.
        (Some(_), Some(&"*")) => false,
        (Some(&"+"), Some(_)) => covers_segments(&grant[1..], &request[1..]),
        (Some(g), Some(r)) => g == r && *r != "+" && covers_segments(&grant[1..], &request[1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(g: &str, r: &str) -> bool {
        covers(g, r).unwrap()
    }

    #[test]
    fn literal_patterns_match_exactly() {
        assert!(c("a/b/c", "a/b/c"));
        assert!(!c("a/b/c", "a/b"));
        assert!(!c("a/b", "a/b/c"));
    }

    #[test]
    fn star_covers_any_depth() {
        assert!(c("a/*", "a"));
        assert!(c("a/*", "a/b/c/d"));
        assert!(c("*", "x/+/*"));
        assert!(c("a/*/z", "a/b/c/z"));
        assert!(!c("a/*/z", "a/b/c"));
        assert!(!c("*/a", "*"));
    }

    #[test]
    fn plus_covers_one_segment() {
        assert!(c("a/+/c", "a/b/c"));
        assert!(c("a/+/c", "a/+/c"));
        assert!(!c("a/+/c", "a/b/d/c"));
        assert!(!c("a/b/c", "a/+/c"));
        assert!(!c("a/+", "a/*"));
    }

    #[test]
    fn malformed_patterns_are_rejected() {
        assert_eq!(validate(""), Err(UriError::Empty));
        assert_eq!(validate("a//b"), Err(UriError::EmptySegment(1)));
        assert_eq!(validate("a/b*"), Err(UriError::PartialWildcard(1)));
        assert_eq!(validate("*/a/*"), Err(UriError::MultipleStar));
        assert_eq!(validate("a b"), Err(UriError::InvalidChar));
        assert_eq!(validate(&"a".repeat(MAX_URI_LEN + 1)), Err(UriError::TooLong(MAX_URI_LEN + 1)));
        assert_eq!(parse_suffix(&[0xff, 0xfe]), Err(UriError::NotUtf8));
    }
}
