//! Runtime configuration: KDF cost, default gas, and node endpoints.
//!
//! Nothing here is a module-level constant that clients silently pick up.
//! Build a [`Config`] (defaults, env, or JSON) and pass it where it is needed.
//!
//! Recognized environment variables (a `.env` file is honoured):
//! - `ONT_SCRYPT_N`, `ONT_SCRYPT_R`, `ONT_SCRYPT_P`
//! - `ONT_GAS_PRICE`, `ONT_GAS_LIMIT`
//! - `ONT_NODE_HOST` (e.g. `127.0.0.1` or `polaris1.ont.io`)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default gas price attached to new transactions.
pub const DEFAULT_GAS_PRICE: u64 = 2500;
/// Default gas limit attached to new transactions.
pub const DEFAULT_GAS_LIMIT: u64 = 20000;

pub const REST_PORT: u16 = 20334;
pub const WS_PORT: u16 = 20335;
pub const RPC_PORT: u16 = 20336;

/// Upper bounds on scrypt cost accepted from persisted accounts and config.
pub const MAX_SCRYPT_N: u32 = 1 << 20;
pub const MAX_SCRYPT_MEMORY: u64 = 1 << 30;
pub const MAX_SCRYPT_RP: u64 = 1 << 10;

/// scrypt cost parameters for private-key encryption.
///
/// Serialized with the field names used by the persisted account form
/// (`n`, `r`, `p`, `dkLen`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScryptParams {
    pub n: u32,
    pub r: u32,
    pub p: u32,
    #[serde(rename = "dkLen")]
    pub dk_len: u32,
}

impl Default for ScryptParams {
    fn default() -> Self {
        Self { n: 4096, r: 8, p: 8, dk_len: 64 }
    }
}

impl ScryptParams {
    /// Parameters with the given cost and the fixed 64-byte output.
    pub fn new(n: u32, r: u32, p: u32) -> Self {
        Self { n, r, p, dk_len: 64 }
    }

    /// Check the parameters are usable for key encryption.
    pub fn validate(&self) -> Result<()> {
        if self.n < 2 || !self.n.is_power_of_two() {
            return Err(Error::Keystore(format!("scrypt n must be a power of two ≥ 2, got {}", self.n)));
        }
        if self.n > MAX_SCRYPT_N {
            return Err(Error::Keystore(format!("scrypt n must be at most {MAX_SCRYPT_N}, got {}", self.n)));
        }
        if self.r == 0 || self.p == 0 {
            return Err(Error::Keystore("scrypt r and p must be non-zero".into()));
        }
        // scrypt allocates 128 * r * n bytes and does p passes over it.
        let memory = 128 * u64::from(self.r) * u64::from(self.n);
        if memory > MAX_SCRYPT_MEMORY || u64::from(self.r) * u64::from(self.p) > MAX_SCRYPT_RP {
            return Err(Error::Keystore(format!(
                "scrypt cost too high (n={}, r={}, p={})",
                self.n, self.r, self.p
            )));
        }
        if self.dk_len != 64 {
            return Err(Error::Keystore(format!("scrypt dkLen must be 64, got {}", self.dk_len)));
        }
        Ok(())
    }

    /// `log2(n)`, as the scrypt crate expects it.
    pub fn log_n(&self) -> u8 {
        self.n.trailing_zeros() as u8
    }
}

/// REST, JSON-RPC and WebSocket URLs of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEndpoints {
    pub rest: String,
    pub rpc: String,
    pub ws: String,
}

impl NodeEndpoints {
    /// Standard node ports on `host`.
    pub fn for_host(host: &str) -> Self {
        let host = host.trim().trim_end_matches('/');
        Self {
            rest: format!("http://{host}:{REST_PORT}"),
            rpc: format!("http://{host}:{RPC_PORT}"),
            ws: format!("ws://{host}:{WS_PORT}"),
        }
    }
}

/// SDK configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub scrypt: ScryptParams,
    pub gas_price: u64,
    pub gas_limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeEndpoints>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scrypt: ScryptParams::default(),
            gas_price: DEFAULT_GAS_PRICE,
            gas_limit: DEFAULT_GAS_LIMIT,
            node: None,
        }
    }
}

impl Config {
    /// Load from the process environment (after reading `.env` if present).
    pub fn from_env() -> Result<Self> {
        // Missing .env is fine.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Config = serde_json::from_str(s)?;
        cfg.scrypt.validate()?;
        Ok(cfg)
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let mut cfg = Config::default();

        if let Some(v) = get("ONT_SCRYPT_N") {
            cfg.scrypt.n = parse_num("ONT_SCRYPT_N", &v)?;
        }
        if let Some(v) = get("ONT_SCRYPT_R") {
            cfg.scrypt.r = parse_num("ONT_SCRYPT_R", &v)?;
        }
        if let Some(v) = get("ONT_SCRYPT_P") {
            cfg.scrypt.p = parse_num("ONT_SCRYPT_P", &v)?;
        }
        if let Some(v) = get("ONT_GAS_PRICE") {
            cfg.gas_price = parse_num("ONT_GAS_PRICE", &v)?;
        }
        if let Some(v) = get("ONT_GAS_LIMIT") {
            cfg.gas_limit = parse_num("ONT_GAS_LIMIT", &v)?;
        }
        if let Some(host) = get("ONT_NODE_HOST") {
            cfg.node = Some(NodeEndpoints::for_host(&host));
        }

        cfg.scrypt.validate()?;
        tracing::debug!(
            scrypt_n = cfg.scrypt.n,
            gas_price = cfg.gas_price,
            gas_limit = cfg.gas_limit,
            node = cfg.node.as_ref().map(|n| n.rpc.as_str()),
            "config loaded"
        );
        Ok(cfg)
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, v: &str) -> Result<T> {
    v.trim()
        .parse::<T>()
        .map_err(|_| Error::Config(format!("invalid value for {key}: {v}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.scrypt, ScryptParams { n: 4096, r: 8, p: 8, dk_len: 64 });
        assert_eq!(c.gas_price, 2500);
        assert_eq!(c.gas_limit, 20000);
        assert!(c.node.is_none());
        assert_eq!(c.scrypt.log_n(), 12);
    }

    #[test]
    fn env_overrides() {
        let c = Config::from_lookup(lookup(&[
            ("ONT_SCRYPT_N", "16384"),
            ("ONT_GAS_PRICE", "500"),
            ("ONT_GAS_LIMIT", " "),
            ("ONT_NODE_HOST", "polaris1.ont.io"),
        ]))
        .unwrap();
        assert_eq!(c.scrypt.n, 16384);
        assert_eq!(c.gas_price, 500);
        assert_eq!(c.gas_limit, DEFAULT_GAS_LIMIT);
        let node = c.node.unwrap();
        assert_eq!(node.rest, "http://polaris1.ont.io:20334");
        assert_eq!(node.rpc, "http://polaris1.ont.io:20336");
        assert_eq!(node.ws, "ws://polaris1.ont.io:20335");
    }

    #[test]
    fn bad_numbers_are_config_errors() {
        let err = Config::from_lookup(lookup(&[("ONT_GAS_PRICE", "cheap")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let err = Config::from_lookup(lookup(&[("ONT_SCRYPT_N", "1000")])).unwrap_err();
        assert!(matches!(err, Error::Keystore(_)));
    }

    #[test]
    fn scrypt_validation() {
        assert!(ScryptParams::default().validate().is_ok());
        assert!(ScryptParams::new(1, 8, 8).validate().is_err());
        assert!(ScryptParams::new(16, 0, 1).validate().is_err());
        assert!(ScryptParams { n: 16, r: 1, p: 1, dk_len: 32 }.validate().is_err());
    }

    #[test]
    fn scrypt_cost_is_bounded() {
        assert!(ScryptParams::new(MAX_SCRYPT_N, 8, 8).validate().is_ok());
        for bad in [
            ScryptParams::new(1 << 31, 1024, 8),
            ScryptParams::new(MAX_SCRYPT_N << 1, 1, 1),
            ScryptParams::new(1 << 16, 1 << 20, 1),
            ScryptParams::new(16, 64, 64),
        ] {
            assert!(matches!(bad.validate(), Err(Error::Keystore(_))), "{bad:?}");
        }
    }

    #[test]
    fn json_form() {
        let c = Config::from_json_str(r#"{"gasPrice": 0, "scrypt": {"n": 16, "r": 1, "p": 1, "dkLen": 64}}"#)
            .unwrap();
        assert_eq!(c.gas_price, 0);
        assert_eq!(c.gas_limit, DEFAULT_GAS_LIMIT);
        assert_eq!(c.scrypt.n, 16);
        let back = serde_json::to_value(&c).unwrap();
        assert_eq!(back["scrypt"]["dkLen"], 64);
        assert!(back.get("node").is_none());
    }
}
