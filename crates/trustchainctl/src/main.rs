// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod script;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use trustchain_core::crypto::sha256;
use trustchain_core::objects::{DotBuilder, EntityBuilder, RevocationBuilder};
use trustchain_core::{Hash32, Permissions};
use trustchain_precompile::{Execution, PrecompileConfig, PrecompileSet};

use crate::script::{decode_hex, Script, ScriptToken};

#[derive(Debug, Parser)]
#[command(name = "trustchainctl")]
#[command(about = "Mint trust-chain objects and replay precompile calls")]
struct Cli {
    #[arg(long, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Writes a fresh raw 32-byte Ed25519 seed.
    Keygen {
        #[arg(long)]
        out: PathBuf,
    },
    MintEntity {
        #[arg(long)]
        key: PathBuf,
        #[arg(long)]
        created: Option<u64>,
        #[arg(long)]
        expiry: Option<u64>,
        #[arg(long = "revoker")]
        revokers: Vec<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Mints an access DOT, or a permission DOT when `--entry` is given.
    MintDot {
        #[arg(long)]
        key: PathBuf,
        #[arg(long)]
        receiver: String,
        #[arg(long, default_value = "")]
        permissions: String,
        #[arg(long)]
        namespace: Option<String>,
        #[arg(long)]
        uri: Option<String>,
        /// `key=value` entry of a permission DOT.
        #[arg(long = "entry")]
        entries: Vec<String>,
        #[arg(long, default_value_t = 0)]
        ttl: u8,
        #[arg(long)]
        created: Option<u64>,
        #[arg(long)]
        expiry: Option<u64>,
        #[arg(long = "revoker")]
        revokers: Vec<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    MintRevocation {
        #[arg(long)]
        key: PathBuf,
        #[arg(long)]
        target: String,
        #[arg(long)]
        created: Option<u64>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Prints call data for one operation; `--args` is a JSON token list.
    Encode {
        #[arg(long)]
        op: String,
        #[arg(long, default_value = "[]")]
        args: String,
    },
    /// Replays a call script inside a single execution.
    Run {
        #[arg(long)]
        script: PathBuf,
        #[arg(long)]
        now: u64,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log))
        .with_writer(std::io::stderr)
        .init();

    match run(cli.cmd) {
        Ok(v) => println!("{v}"),
        Err(msg) => {
            println!("{}", json!({"error": msg}));
            std::process::exit(1);
        }
    }
}

fn run(cmd: Command) -> Result<serde_json::Value, String> {
    match cmd {
        Command::Keygen { out } => {
            let key = SigningKey::generate(&mut OsRng);
            fs::write(&out, key.to_bytes()).map_err(|e| e.to_string())?;
            tracing::info!(path = %out.display(), "wrote signing key");
            Ok(json!({"vk": hex::encode(key.verifying_key().to_bytes())}))
        }
        Command::MintEntity {
            key,
            created,
            expiry,
            revokers,
            contact,
            comment,
        } => {
            let sk = load_key(&key)?;
            let mut b = EntityBuilder::new();
            if let Some(at) = created {
                b = b.created(at);
            }
            if let Some(at) = expiry {
                b = b.expiry(at);
            }
            for r in &revokers {
                b = b.revoker(parse_hex32(r)?);
            }
            if let Some(c) = contact {
                b = b.contact(c);
            }
            if let Some(c) = comment {
                b = b.comment(c);
            }
            let blob = b.sign(&sk).map_err(|e| e.to_string())?;
            Ok(minted(&blob, json!({"vk": hex::encode(sk.verifying_key().to_bytes())})))
        }
        Command::MintDot {
            key,
            receiver,
            permissions,
            namespace,
            uri,
            entries,
            ttl,
            created,
            expiry,
            revokers,
            contact,
            comment,
        } => {
            let sk = load_key(&key)?;
            let receiver = parse_hex32(&receiver)?;
            let mut b = if entries.is_empty() {
                let perms: Permissions = permissions.parse().map_err(|e| format!("{e}"))?;
                let namespace = namespace
                    .as_deref()
                    .map(parse_hex32)
                    .transpose()?
                    .unwrap_or([0u8; 32]);
                let uri = uri.ok_or_else(|| "access DOT requires --uri".to_string())?;
                DotBuilder::access(receiver, perms, namespace, uri)
            } else {
                let mut b = DotBuilder::permission(receiver);
                for entry in &entries {
                    let (k, v) = entry
                        .split_once('=')
                        .ok_or_else(|| format!("entry {entry:?} must be key=value"))?;
                    b = b.entry(k, v);
                }
                b
            };
            b = b.ttl(ttl);
            if let Some(at) = created {
                b = b.created(at);
            }
            if let Some(at) = expiry {
                b = b.expiry(at);
            }
            for r in &revokers {
                b = b.revoker(parse_hex32(r)?);
            }
            if let Some(c) = contact {
                b = b.contact(c);
            }
            if let Some(c) = comment {
                b = b.comment(c);
            }
            let blob = b.sign(&sk).map_err(|e| e.to_string())?;
            Ok(minted(&blob, json!({})))
        }
        Command::MintRevocation {
            key,
            target,
            created,
            comment,
        } => {
            let sk = load_key(&key)?;
            let mut b = RevocationBuilder::new(parse_hex32(&target)?);
            if let Some(at) = created {
                b = b.created(at);
            }
            if let Some(c) = comment {
                b = b.comment(c);
            }
            let blob = b.sign(&sk).map_err(|e| e.to_string())?;
            Ok(minted(&blob, json!({})))
        }
        Command::Encode { op, args } => {
            let tokens: Vec<ScriptToken> = serde_json::from_str(&args).map_err(|e| e.to_string())?;
            let input = script::encode(&op, &tokens)?;
            Ok(json!({"input": hex::encode(input)}))
        }
        Command::Run {
            script: script_path,
            now,
            config,
        } => {
            let cfg = match config {
                Some(path) => PrecompileConfig::load(path).map_err(|e| e.to_string())?,
                None => PrecompileConfig::from_env(),
            };
            let payload = fs::read(&script_path).map_err(|e| e.to_string())?;
            let parsed: Script = serde_json::from_slice(&payload).map_err(|e| e.to_string())?;
            let set = PrecompileSet::with_trustchain(cfg);
            let exec = Execution::new(now);
            tracing::info!(calls = parsed.calls.len(), now, "running script");
            let results = script::run(&parsed, &set, &cfg.address, cfg.gas_cost, &exec)?;
            exec.finish();
            Ok(json!(results))
        }
    }
}

fn minted(blob: &[u8], mut extra: serde_json::Value) -> serde_json::Value {
    extra["blob"] = json!(hex::encode(blob));
    extra["hash"] = json!(hex::encode(sha256(blob)));
    extra
}

fn load_key(path: &Path) -> Result<SigningKey, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    let seed: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| "signing key must be raw 32-byte seed".to_string())?;
    Ok(SigningKey::from_bytes(&seed))
}

fn parse_hex32(s: &str) -> Result<Hash32, String> {
    let b = decode_hex(s)?;
    b.try_into().map_err(|_| "expected 32-byte hex".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustchain_core::{Dot, Entity};

    fn write_key(dir: &Path, seed: u8) -> PathBuf {
        let path = dir.join(format!("key{seed}"));
        fs::write(&path, [seed; 32]).unwrap();
        path
    }

    #[test]
    fn minted_entity_parses() {
        let dir = tempfile::tempdir().unwrap();
        let key = write_key(dir.path(), 1);
        let out = run(Command::MintEntity {
            key,
            created: Some(1),
            expiry: Some(99),
            revokers: vec![hex::encode([3u8; 32])],
            contact: None,
            comment: Some("ops".to_string()),
        })
        .unwrap();
        let blob = hex::decode(out["blob"].as_str().unwrap()).unwrap();
        let e = Entity::parse(&blob).unwrap();
        assert!(e.sig_valid());
        assert_eq!(e.expiry(), Some(99));
        assert_eq!(out["hash"], json!(hex::encode(e.hash())));
    }

    #[test]
    fn minted_dot_variants() {
        let dir = tempfile::tempdir().unwrap();
        let key = write_key(dir.path(), 2);
        let base = |entries: Vec<String>, uri: Option<String>| Command::MintDot {
            key: key.clone(),
            receiver: hex::encode([5u8; 32]),
            permissions: "C*P".to_string(),
            namespace: None,
            uri,
            entries,
            ttl: 2,
            created: None,
            expiry: None,
            revokers: Vec::new(),
            contact: None,
            comment: None,
        };

        let out = run(base(Vec::new(), Some("a/*".to_string()))).unwrap();
        let dot = Dot::parse(&hex::decode(out["blob"].as_str().unwrap()).unwrap()).unwrap();
        assert_eq!(dot.ttl(), 2);
        assert!(dot.access().unwrap().permissions.contains(Permissions::CONSUME_STAR));

        let out = run(base(vec!["quota=3".to_string()], None)).unwrap();
        let dot = Dot::parse(&hex::decode(out["blob"].as_str().unwrap()).unwrap()).unwrap();
        assert!(dot.is_permission());

        assert!(run(base(Vec::new(), None)).is_err());
        assert!(run(base(vec!["novalue".to_string()], None)).is_err());
    }

    #[test]
    fn short_key_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short");
        fs::write(&path, [1u8; 16]).unwrap();
        assert!(load_key(&path).is_err());
    }

    #[test]
    fn encode_prints_selector_prefixed_input() {
        let out = run(Command::Encode {
            op: "SliceByte32".to_string(),
            args: r#"[{"bytes":"00ff"},{"uint":0}]"#.to_string(),
        })
        .unwrap();
        assert!(out["input"].as_str().unwrap().starts_with("ce7a94eb"));
    }
}
