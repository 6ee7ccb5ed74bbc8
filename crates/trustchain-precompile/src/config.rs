// Copyright (c) 2026 Joseph Verdicchio and EvidenceOS Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;

use serde::Deserialize;
use trustchain_core::objects::MAX_CHAIN_DOTS;

use crate::error::ConfigError;

pub const DEFAULT_ADDRESS: [u8; 20] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x02, 0x85, 0x89,
];
pub const DEFAULT_GAS_COST: u64 = 3_000;

const MAX_CHAIN_LEN_ENV: &str = "TRUSTCHAIN_MAX_CHAIN_LEN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecompileConfig {
    pub address: [u8; 20],
    pub gas_cost: u64,
    /// Longest chain `UnpackAccessDChain` accepts; never above the codec
    /// ceiling.
    pub max_chain_len: usize,
}

impl Default for PrecompileConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            gas_cost: DEFAULT_GAS_COST,
            max_chain_len: MAX_CHAIN_DOTS,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    address: Option<String>,
    gas_cost: Option<u64>,
    max_chain_len: Option<usize>,
}

fn parse_address(raw: &str) -> Result<[u8; 20], ConfigError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(digits).map_err(|_| ConfigError::Address(raw.to_string()))?;
    bytes
        .try_into()
        .map_err(|_| ConfigError::Address(raw.to_string()))
}

impl PrecompileConfig {
    /// Reads a JSON config; absent fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let payload = fs::read(path)?;
        let file: ConfigFile = serde_json::from_slice(&payload)?;
        let mut cfg = Self::default();
        if let Some(address) = file.address.as_deref() {
            cfg.address = parse_address(address)?;
        }
        if let Some(gas_cost) = file.gas_cost {
            cfg.gas_cost = gas_cost;
        }
        if let Some(max_chain_len) = file.max_chain_len {
            cfg.max_chain_len = max_chain_len;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults with `TRUSTCHAIN_MAX_CHAIN_LEN` applied when it parses to a
    /// usable bound.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(len) = std::env::var(MAX_CHAIN_LEN_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|len| (1..=MAX_CHAIN_DOTS).contains(len))
        {
            cfg.max_chain_len = len;
        }
        cfg
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chain_len == 0 {
            return Err(ConfigError::Invalid("max_chain_len must be at least 1"));
        }
        if self.max_chain_len > MAX_CHAIN_DOTS {
            return Err(ConfigError::Invalid("max_chain_len exceeds codec limit"));
        }
        if self.gas_cost == 0 {
            return Err(ConfigError::Invalid("gas_cost must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock")
    }

    fn from_env_with(value: Option<&str>) -> PrecompileConfig {
        match value {
            Some(v) => std::env::set_var(MAX_CHAIN_LEN_ENV, v),
            None => std::env::remove_var(MAX_CHAIN_LEN_ENV),
        }
        let cfg = PrecompileConfig::from_env();
        std::env::remove_var(MAX_CHAIN_LEN_ENV);
        cfg
    }

    #[test]
    fn env_overrides_max_chain_len() {
        let _env_lock = env_lock();
        assert_eq!(from_env_with(Some("8")).max_chain_len, 8);
        assert_eq!(from_env_with(Some(" 16 ")).max_chain_len, 16);
        assert_eq!(from_env_with(Some("64")).max_chain_len, MAX_CHAIN_DOTS);
        assert_eq!(from_env_with(None), PrecompileConfig::default());
    }

    #[test]
    fn unusable_env_values_fall_back_to_default() {
        let _env_lock = env_lock();
        for raw in ["eight", "", "-1", "0", "65"] {
            let cfg = from_env_with(Some(raw));
            assert_eq!(cfg.max_chain_len, MAX_CHAIN_DOTS, "{raw:?}");
            assert!(cfg.validate().is_ok());
        }
    }

    #[test]
    fn defaults_validate() {
        let cfg = PrecompileConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(hex::encode(cfg.address), "0000000000000000000000000000000000028589");
    }

    #[test]
    fn load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("precompile.json");
        fs::write(
            &path,
            br#"{"address":"0x00000000000000000000000000000000000000ff","max_chain_len":8}"#,
        )
        .unwrap();
        let cfg = PrecompileConfig::load(&path).unwrap();
        assert_eq!(cfg.address[19], 0xff);
        assert_eq!(cfg.max_chain_len, 8);
        assert_eq!(cfg.gas_cost, DEFAULT_GAS_COST);
    }

    #[test]
    fn load_rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("precompile.json");

        fs::write(&path, br#"{"max_chain_len":65}"#).unwrap();
        assert!(matches!(PrecompileConfig::load(&path), Err(ConfigError::Invalid(_))));

        fs::write(&path, br#"{"address":"0x1234"}"#).unwrap();
        assert!(matches!(PrecompileConfig::load(&path), Err(ConfigError::Address(_))));

        fs::write(&path, br#"{"gas":1}"#).unwrap();
        assert!(matches!(PrecompileConfig::load(&path), Err(ConfigError::Parse(_))));

        assert!(matches!(
            PrecompileConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
