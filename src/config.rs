use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flyq_client::{AcknowledgeMode, CacheMode, ListenerSettings};
use serde::Deserialize;

/// Settings for one broker connection.
///
/// Every field is optional: `None` (or `false` for `tls.enabled`) means the
/// broker client's own default, not zero. The same shape serves as the shared
/// baseline and as a per-key override fragment.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Comma-separated `host[:port]` list, used when `host` is unset.
    pub addresses: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub virtual_host: Option<String>,
    pub heartbeat_secs: Option<u64>,
    pub connection_timeout_ms: Option<u64>,
    pub publisher_confirms: Option<bool>,
    pub publisher_returns: Option<bool>,
    pub tls: TlsConfig,
    pub cache: CacheConfig,
}

impl fmt::Debug for BrokerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("addresses", &self.addresses)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("virtual_host", &self.virtual_host)
            .field("heartbeat_secs", &self.heartbeat_secs)
            .field("connection_timeout_ms", &self.connection_timeout_ms)
            .field("publisher_confirms", &self.publisher_confirms)
            .field("publisher_returns", &self.publisher_returns)
            .field("tls", &self.tls)
            .field("cache", &self.cache)
            .finish()
    }
}

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TlsConfig {
    pub enabled: bool,
    pub algorithm: Option<String>,
    pub key_store: Option<PathBuf>,
    pub key_store_password: Option<String>,
    pub trust_store: Option<PathBuf>,
    pub trust_store_password: Option<String>,
}

impl fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsConfig")
            .field("enabled", &self.enabled)
            .field("algorithm", &self.algorithm)
            .field("key_store", &self.key_store)
            .field("trust_store", &self.trust_store)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub channel_size: Option<usize>,
    pub channel_checkout_timeout_ms: Option<u64>,
    pub connection_mode: Option<CacheMode>,
    pub connection_size: Option<usize>,
}

/// Consumer settings shared by every dispatch factory. Not overridable per key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListenerConfig {
    pub concurrency: Option<usize>,
    pub max_concurrency: Option<usize>,
    pub prefetch: Option<u16>,
    pub acknowledge_mode: Option<AcknowledgeMode>,
}

impl ListenerConfig {
    pub fn to_settings(&self) -> ListenerSettings {
        ListenerSettings {
            concurrency: self.concurrency,
            max_concurrency: self.max_concurrency,
            prefetch: self.prefetch,
            acknowledge_mode: self.acknowledge_mode,
        }
    }
}

/// Top-level configuration: a shared baseline plus one override fragment per routing key.
///
/// An empty `multi` table means single-connection mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MultiBrokerConfig {
    pub shared: BrokerConfig,
    pub listener: ListenerConfig,
    pub multi: BTreeMap<String, BrokerConfig>,
}

impl MultiBrokerConfig {
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::read_from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("parsing multi-broker config TOML")
    }

    fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading {:?}", path.as_ref()))?;
        Self::from_toml(&raw)
    }

    pub fn is_single(&self) -> bool {
        self.multi.is_empty()
    }
}
