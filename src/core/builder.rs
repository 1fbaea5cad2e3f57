use std::sync::Arc;
use std::time::Duration;

use flyq_client::{
    Address, BrokerClient, CachePolicy, ClientError, ConnectionSettings, TlsSettings, DEFAULT_HOST,
    DEFAULT_PORT,
};
use tracing::debug;

use crate::config::BrokerConfig;
use crate::core::error::RoutingError;

/// Turns merged configurations into cached broker connections.
pub struct ConnectionFactoryBuilder<C: BrokerClient> {
    client: Arc<C>,
}

impl<C: BrokerClient> ConnectionFactoryBuilder<C> {
    pub fn new(client: Arc<C>) -> Self {
        ConnectionFactoryBuilder { client }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// `key` only labels errors and log lines.
    pub async fn build(&self, key: &str, cfg: &BrokerConfig) -> Result<C::Connection, RoutingError> {
        let settings = resolve_settings(cfg).map_err(|reason| RoutingError::ConnectionConfig {
            key: key.to_string(),
            reason,
        })?;
        let policy = cache_policy(cfg).map_err(|reason| RoutingError::ConnectionConfig {
            key: key.to_string(),
            reason,
        })?;
        debug!("building connection '{}' with {:?}", key, settings);

        let raw = self
            .client
            .create_raw_connection(&settings)
            .await
            .map_err(|e| RoutingError::from_connection(key, e))?;

        self.client
            .wrap_with_caching(raw, &policy)
            .map_err(|e| RoutingError::from_connection(key, e))
    }
}

/// Addresses to dial: an explicit host wins, then the address list, then the client default.
pub fn resolve_addresses(cfg: &BrokerConfig) -> Result<Vec<Address>, String> {
    let port = cfg.port.unwrap_or(DEFAULT_PORT);

    let list = match (&cfg.host, &cfg.addresses) {
        (None, Some(list)) => list,
        (host, _) => {
            let host = host.as_deref().unwrap_or(DEFAULT_HOST);
            return Ok(vec![Address::new(host, port)]);
        }
    };

    let addresses = list
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| Address::parse_with_default(entry, port).map_err(|e| e.to_string()))
        .collect::<Result<Vec<_>, _>>()?;

    if addresses.is_empty() {
        return Err(format!("address list '{}' contains no addresses", list));
    }
    Ok(addresses)
}

pub fn resolve_settings(cfg: &BrokerConfig) -> Result<ConnectionSettings, String> {
    let tls = cfg.tls.enabled.then(|| TlsSettings {
        algorithm: cfg.tls.algorithm.clone(),
        key_store: cfg.tls.key_store.clone(),
        key_store_passphrase: cfg.tls.key_store_password.clone(),
        trust_store: cfg.tls.trust_store.clone(),
        trust_store_passphrase: cfg.tls.trust_store_password.clone(),
    });

    Ok(ConnectionSettings {
        addresses: resolve_addresses(cfg)?,
        username: cfg.username.clone(),
        password: cfg.password.clone(),
        virtual_host: cfg.virtual_host.clone(),
        heartbeat: cfg.heartbeat_secs.map(Duration::from_secs),
        connection_timeout: cfg.connection_timeout_ms.map(Duration::from_millis),
        tls,
    })
}

/// Caching layer settings, validated before any connection is attempted.
pub fn cache_policy(cfg: &BrokerConfig) -> Result<CachePolicy, String> {
    let policy = CachePolicy {
        publisher_confirms: cfg.publisher_confirms,
        publisher_returns: cfg.publisher_returns,
        channel_cache_size: cfg.cache.channel_size,
        cache_mode: cfg.cache.connection_mode,
        connection_cache_size: cfg.cache.connection_size,
        channel_checkout_timeout: cfg
            .cache
            .channel_checkout_timeout_ms
            .map(Duration::from_millis),
    };
    policy.validate().map_err(|e| match e {
        ClientError::InvalidSettings(reason) => reason,
        other => other.to_string(),
    })?;
    Ok(policy)
}
