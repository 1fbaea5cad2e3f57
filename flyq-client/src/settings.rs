use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ClientError;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 9092;
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(60);
pub const DEFAULT_CHANNEL_CACHE_SIZE: usize = 25;
pub const DEFAULT_CONNECTION_CACHE_SIZE: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub host: String,
    pub port: u16,
}

impl Address {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Address {
            host: host.into(),
            port,
        }
    }

    /// Parses `host[:port]`, using `default_port` when the port is omitted.
    pub fn parse_with_default(raw: &str, default_port: u16) -> Result<Self, ClientError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ClientError::InvalidSettings("empty address".to_string()));
        }
        match raw.rsplit_once(':') {
            Some((host, port)) => {
                if host.is_empty() {
                    return Err(ClientError::InvalidSettings(format!(
                        "missing host in address '{raw}'"
                    )));
                }
                let port = port.parse::<u16>().map_err(|_| {
                    ClientError::InvalidSettings(format!("invalid port in address '{raw}'"))
                })?;
                Ok(Address::new(host, port))
            }
            None => Ok(Address::new(raw, default_port)),
        }
    }
}

impl FromStr for Address {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse_with_default(s, DEFAULT_PORT)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct TlsSettings {
    pub algorithm: Option<String>,
    pub key_store: Option<PathBuf>,
    pub key_store_passphrase: Option<String>,
    pub trust_store: Option<PathBuf>,
    pub trust_store_passphrase: Option<String>,
}

impl fmt::Debug for TlsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsSettings")
            .field("algorithm", &self.algorithm)
            .field("key_store", &self.key_store)
            .field("trust_store", &self.trust_store)
            .finish_non_exhaustive()
    }
}

/// Everything the client needs to open a raw connection.
/// `None` means "use the client's compiled-in default".
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub addresses: Vec<Address>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub virtual_host: Option<String>,
    pub heartbeat: Option<Duration>,
    pub connection_timeout: Option<Duration>,
    /// `Some` only when TLS is enabled.
    pub tls: Option<TlsSettings>,
}

impl ConnectionSettings {
    pub fn effective_heartbeat(&self) -> Duration {
        self.heartbeat.unwrap_or(DEFAULT_HEARTBEAT)
    }

    pub fn effective_connection_timeout(&self) -> Duration {
        self.connection_timeout.unwrap_or(DEFAULT_CONNECTION_TIMEOUT)
    }

    pub fn effective_addresses(&self) -> Vec<Address> {
        if self.addresses.is_empty() {
            vec![Address::new(DEFAULT_HOST, DEFAULT_PORT)]
        } else {
            self.addresses.clone()
        }
    }
}

// password omitted
impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("addresses", &self.addresses)
            .field("username", &self.username)
            .field("virtual_host", &self.virtual_host)
            .field("heartbeat", &self.heartbeat)
            .field("connection_timeout", &self.connection_timeout)
            .field("tls", &self.tls)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// One underlying connection, cached channels.
    #[default]
    Channel,
    /// Cached connections, each with its own channels.
    Connection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachePolicy {
    pub publisher_confirms: Option<bool>,
    pub publisher_returns: Option<bool>,
    pub channel_cache_size: Option<usize>,
    pub cache_mode: Option<CacheMode>,
    pub connection_cache_size: Option<usize>,
    pub channel_checkout_timeout: Option<Duration>,
}

impl CachePolicy {
    pub fn mode(&self) -> CacheMode {
        self.cache_mode.unwrap_or_default()
    }

    /// Structural checks only; no I/O.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.channel_cache_size == Some(0) || self.connection_cache_size == Some(0) {
            return Err(ClientError::InvalidSettings(
                "cache sizes must be at least 1".to_string(),
            ));
        }
        if self.channel_checkout_timeout.is_some() && self.mode() == CacheMode::Connection {
            return Err(ClientError::InvalidSettings(
                "channel checkout timeout requires channel cache mode".to_string(),
            ));
        }
        Ok(())
    }

    /// Upper bound on idle channels kept around for reuse.
    pub fn idle_limit(&self) -> usize {
        match self.mode() {
            CacheMode::Channel => self
                .channel_cache_size
                .unwrap_or(DEFAULT_CHANNEL_CACHE_SIZE),
            CacheMode::Connection => self
                .connection_cache_size
                .unwrap_or(DEFAULT_CONNECTION_CACHE_SIZE),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcknowledgeMode {
    #[default]
    Auto,
    Manual,
    None,
}

/// Consumer-side knobs applied to every dispatch factory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenerSettings {
    pub concurrency: Option<usize>,
    pub max_concurrency: Option<usize>,
    pub prefetch: Option<u16>,
    pub acknowledge_mode: Option<AcknowledgeMode>,
}

impl ListenerSettings {
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.unwrap_or(1).max(1)
    }
}
