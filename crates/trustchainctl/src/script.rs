// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! JSON call scripts: a list of precompile calls replayed in one execution so
//! objects unpacked by earlier calls are visible to later ones.

use serde::Deserialize;
use serde_json::{json, Value};
use trustchain_core::abi::{encode_call, Token};
use trustchain_core::scratch::key_from_slice;
use trustchain_core::{Hash32, Permissions};
use trustchain_precompile::{ExecutionContext, PrecompileSet, Selector};

/// One argument. `adps` takes the textual permission form (`C*PL`) and
/// packs it into the leading bytes of a word; `text` is UTF-8 `bytes`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScriptToken {
    Word(String),
    Uint(u64),
    Bytes(String),
    Text(String),
    Adps(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptCall {
    /// Operation name, e.g. `UnpackDOT`.
    pub op: Option<String>,
    #[serde(default)]
    pub args: Vec<ScriptToken>,
    /// Raw call data in hex; used instead of `op`/`args` when present.
    pub input: Option<String>,
    pub gas_limit: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    pub calls: Vec<ScriptCall>,
}

enum Owned {
    Word(Hash32),
    Uint(u64),
    Bytes(Vec<u8>),
}

pub fn decode_hex(s: &str) -> Result<Vec<u8>, String> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(|e| format!("invalid hex {s:?}: {e}"))
}

fn decode_word(s: &str) -> Result<Hash32, String> {
    let bytes = decode_hex(s)?;
    if bytes.len() > 32 {
        return Err(format!("word {s:?} is longer than 32 bytes"));
    }
    Ok(key_from_slice(&bytes))
}

fn own(token: &ScriptToken) -> Result<Owned, String> {
    Ok(match token {
        ScriptToken::Word(s) => Owned::Word(decode_word(s)?),
        ScriptToken::Uint(v) => Owned::Uint(*v),
        ScriptToken::Bytes(s) => Owned::Bytes(decode_hex(s)?),
        ScriptToken::Text(s) => Owned::Bytes(s.as_bytes().to_vec()),
        ScriptToken::Adps(s) => {
            let perms: Permissions = s.parse().map_err(|e| format!("{e}"))?;
            Owned::Word(key_from_slice(&perms.to_packed()))
        }
    })
}

pub fn resolve_selector(op: &str) -> Result<Selector, String> {
    Selector::from_name(op).ok_or_else(|| format!("unknown operation {op:?}"))
}

/// Selector plus word-encoded arguments.
pub fn encode(op: &str, args: &[ScriptToken]) -> Result<Vec<u8>, String> {
    let selector = resolve_selector(op)?;
    let owned = args.iter().map(own).collect::<Result<Vec<_>, _>>()?;
    let tokens: Vec<Token<'_>> = owned
        .iter()
        .map(|o| match o {
            Owned::Word(w) => Token::Word(*w),
            Owned::Uint(v) => Token::Uint(*v),
            Owned::Bytes(b) => Token::Bytes(b),
        })
        .collect();
    Ok(encode_call(selector.bytes(), &tokens))
}

fn call_input(call: &ScriptCall) -> Result<Vec<u8>, String> {
    match (&call.input, &call.op) {
        (Some(input), _) => decode_hex(input),
        (None, Some(op)) => encode(op, &call.args),
        (None, None) => Err("call needs either op or input".to_string()),
    }
}

/// Runs every call against `address`, reporting each result in order. A
/// failed call is reported and does not stop the script.
pub fn run(
    script: &Script,
    set: &PrecompileSet,
    address: &[u8; 20],
    default_gas: u64,
    ctx: &dyn ExecutionContext,
) -> Result<Vec<Value>, String> {
    let mut results = Vec::with_capacity(script.calls.len());
    for (index, call) in script.calls.iter().enumerate() {
        let input = call_input(call).map_err(|e| format!("call {index}: {e}"))?;
        let gas_limit = call.gas_limit.unwrap_or(default_gas);
        let label = call.op.clone().unwrap_or_else(|| "raw".to_string());
        tracing::debug!(index, op = %label, input_len = input.len(), "script call");
        let entry = match set.call(address, &input, gas_limit, ctx) {
            Ok(outcome) => match outcome.output {
                Ok(output) => json!({
                    "op": label,
                    "gas_used": outcome.gas_used,
                    "words": output.chunks(32).map(hex::encode).collect::<Vec<_>>(),
                }),
                Err(err) => json!({
                    "op": label,
                    "gas_used": outcome.gas_used,
                    "error": err.to_string(),
                }),
            },
            Err(err) => json!({"op": label, "gas_used": 0, "error": err.to_string()}),
        };
        results.push(entry);
    }
    Ok(results)
}
