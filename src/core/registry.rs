use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use flyq_client::BrokerClient;
use tracing::{debug, info, warn};

use crate::config::BrokerConfig;
use crate::core::builder::ConnectionFactoryBuilder;
use crate::core::error::RoutingError;
use crate::core::merge::{merge, Overlay};

/// Label used for the default connection in errors and logs.
pub const DEFAULT_CONNECTION: &str = "(default)";

/// Maps routing keys to connections, with a default for everything else.
///
/// Immutable once assembled, so `resolve` takes `&self` and needs no locking.
pub struct RoutingRegistry<C: BrokerClient> {
    default: Arc<C::Connection>,
    targets: HashMap<String, Arc<C::Connection>>,
}

impl<C: BrokerClient> RoutingRegistry<C> {
    /// Builds the default connection, then one connection per override.
    ///
    /// Stops at the first failure; connections built up to that point are
    /// released through the client and dropped.
    pub async fn assemble(
        builder: &ConnectionFactoryBuilder<C>,
        shared: &BrokerConfig,
        overrides: &BTreeMap<String, BrokerConfig>,
    ) -> Result<Self, RoutingError> {
        let default = Arc::new(builder.build(DEFAULT_CONNECTION, shared).await?);

        let mut targets = HashMap::with_capacity(overrides.len());
        for (key, fragment) in overrides {
            debug!(
                "connection '{}' overrides {:?}",
                key,
                fragment.explicit_fields()
            );
            let merged = merge(shared, fragment);
            if addresses_shadowed(fragment, &merged) {
                warn!(
                    "connection '{}' sets addresses but host {:?} takes precedence; the address list is ignored",
                    key, merged.host
                );
            }
            match builder.build(key, &merged).await {
                Ok(connection) => {
                    targets.insert(key.clone(), Arc::new(connection));
                }
                Err(e) => {
                    let partial = RoutingRegistry { default, targets };
                    partial.release(builder.client().as_ref());
                    return Err(e);
                }
            }
        }

        info!(
            "routing registry assembled with {} keyed connections",
            targets.len()
        );
        Ok(RoutingRegistry { default, targets })
    }

    /// Hands every connection back to the client, keyed ones first.
    pub fn release(&self, client: &C) {
        for (key, connection) in &self.targets {
            info!("releasing connection '{}'", key);
            client.release(connection);
        }
        client.release(&self.default);
    }

    /// Connection for `key`, falling back to the default when the key is
    /// absent or unknown. Never fails.
    pub fn resolve(&self, key: Option<&str>) -> &Arc<C::Connection> {
        key.and_then(|k| self.targets.get(k))
            .unwrap_or(&self.default)
    }

    /// Connection for `key` without fallback.
    pub fn get(&self, key: &str) -> Option<&Arc<C::Connection>> {
        self.targets.get(key)
    }

    pub fn default_connection(&self) -> &Arc<C::Connection> {
        &self.default
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    pub fn targets(&self) -> impl Iterator<Item = (&str, &Arc<C::Connection>)> {
        self.targets.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// True in single-connection mode, where every key resolves to the default.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// True when a fragment's address list loses to a host in the merged config.
pub(crate) fn addresses_shadowed(fragment: &BrokerConfig, merged: &BrokerConfig) -> bool {
    merged.host.is_some() && fragment.explicit_fields().contains(&"addresses")
}
