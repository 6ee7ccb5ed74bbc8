// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Word codec for precompile call data.
//!
//! Arguments are a flat sequence of 32-byte head words. A dynamic `bytes`
//! argument at head index `i` stores the byte offset (from the start of the
//! argument buffer) of a length word, followed by the payload. Every offset
//! and length is untrusted and checked before slicing.

use thiserror::Error;

use crate::Hash32;

pub const WORD: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("read of {len} bytes at offset {offset} exceeds input of {available} bytes")]
    OutOfBounds {
        offset: usize,
        len: usize,
        available: usize,
    },
    #[error("word {index} does not fit in 64 bits")]
    ValueTooLarge { index: usize },
    #[error("offset or length arithmetic overflowed")]
    Overflow,
}

pub type AbiResult<T> = Result<T, AbiError>;

fn slice_at(buf: &[u8], offset: usize, len: usize) -> AbiResult<&[u8]> {
    let end = offset.checked_add(len).ok_or(AbiError::Overflow)?;
    buf.get(offset..end).ok_or(AbiError::OutOfBounds {
        offset,
        len,
        available: buf.len(),
    })
}

fn word_to_u64(word: &[u8; WORD]) -> Option<u64> {
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return None;
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[WORD - 8..]);
    Some(u64::from_be_bytes(tail))
}

/// Read-only view over ABI-encoded arguments.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    buf: &'a [u8],
}

impl<'a> Args<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn word(&self, index: usize) -> AbiResult<&'a [u8; WORD]> {
        let offset = index.checked_mul(WORD).ok_or(AbiError::Overflow)?;
        let bytes = slice_at(self.buf, offset, WORD)?;
        bytes.try_into().map_err(|_| AbiError::Overflow)
    }

    pub fn u64(&self, index: usize) -> AbiResult<u64> {
        word_to_u64(self.word(index)?).ok_or(AbiError::ValueTooLarge { index })
    }

    pub fn usize(&self, index: usize) -> AbiResult<usize> {
        usize::try_from(self.u64(index)?).map_err(|_| AbiError::ValueTooLarge { index })
    }

    /// Dynamic byte array referenced by head word `index`.
    pub fn bytes(&self, index: usize) -> AbiResult<&'a [u8]> {
        let offset = self.usize(index)?;
        let len_word: &[u8; WORD] = slice_at(self.buf, offset, WORD)?
            .try_into()
            .map_err(|_| AbiError::Overflow)?;
        let len = word_to_u64(len_word)
            .and_then(|v| usize::try_from(v).ok())
            .ok_or(AbiError::ValueTooLarge { index })?;
        let start = offset.checked_add(WORD).ok_or(AbiError::Overflow)?;
        slice_at(self.buf, start, len)
    }
}

/// Builds right-aligned 32-byte result words.
#[derive(Debug, Default, Clone)]
pub struct WordWriter {
    out: Vec<u8>,
}

impl WordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_words(words: usize) -> Self {
        Self {
            out: Vec::with_capacity(words.saturating_mul(WORD)),
        }
    }

    pub fn push_bool(&mut self, value: bool) -> &mut Self {
        self.push_u64(u64::from(value))
    }

    pub fn push_u64(&mut self, value: u64) -> &mut Self {
        self.out.extend_from_slice(&[0u8; WORD - 8]);
        self.out.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn push_word(&mut self, word: &Hash32) -> &mut Self {
        self.out.extend_from_slice(word);
        self
    }

    /// Left-aligned copy of up to one word, zero padded.
    pub fn push_key(&mut self, key: &[u8]) -> &mut Self {
        let mut word = [0u8; WORD];
        let n = key.len().min(WORD);
        word[..n].copy_from_slice(&key[..n]);
        self.push_word(&word)
    }

    pub fn zeroed(words: usize) -> Vec<u8> {
        vec![0u8; words.saturating_mul(WORD)]
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.out
    }
}

pub fn bool_word(value: bool) -> Vec<u8> {
    let mut w = WordWriter::with_words(1);
    w.push_bool(value);
    w.into_vec()
}

pub fn u64_word(value: u64) -> Vec<u8> {
    let mut w = WordWriter::with_words(1);
    w.push_u64(value);
    w.into_vec()
}

/// Argument token for [`encode_args`].
#[derive(Debug, Clone, Copy)]
pub enum Token<'a> {
    Word(Hash32),
    Uint(u64),
    Bytes(&'a [u8]),
}

/// Head/tail encoding of an argument list; offsets are relative to the
/// start of the returned buffer.
pub fn encode_args(tokens: &[Token<'_>]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = WordWriter::with_words(tokens.len());
    let mut tail = Vec::new();
    for token in tokens {
        match token {
            Token::Word(word) => {
                head.push_word(word);
            }
            Token::Uint(value) => {
                head.push_u64(*value);
            }
            Token::Bytes(payload) => {
                head.push_u64((head_len + tail.len()) as u64);
                let mut len_word = WordWriter::with_words(1);
                len_word.push_u64(payload.len() as u64);
                tail.extend_from_slice(&len_word.into_vec());
                tail.extend_from_slice(payload);
                let pad = (WORD - payload.len() % WORD) % WORD;
                tail.extend(std::iter::repeat(0u8).take(pad));
            }
        }
    }
    let mut out = head.into_vec();
    out.extend_from_slice(&tail);
    out
}

pub fn encode_call(selector: [u8; 4], tokens: &[Token<'_>]) -> Vec<u8> {
    let mut out = selector.to_vec();
    out.extend_from_slice(&encode_args(tokens));
    out
}
