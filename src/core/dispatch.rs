use std::collections::HashMap;

use flyq_client::{BrokerClient, ListenerSettings};
use tracing::debug;

use crate::core::error::RoutingError;
use crate::core::registry::RoutingRegistry;

/// Dispatch factories by routing key. Lookups never fall back to a default.
pub struct DispatchFactories<F> {
    factories: HashMap<String, F>,
}

impl<F> DispatchFactories<F> {
    pub fn get(&self, key: &str) -> Option<&F> {
        self.factories.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// One dispatch factory per keyed connection. The default connection gets none.
pub fn register_all<C: BrokerClient>(
    client: &C,
    registry: &RoutingRegistry<C>,
    listener: &ListenerSettings,
) -> Result<DispatchFactories<C::DispatchFactory>, RoutingError> {
    let mut factories = HashMap::with_capacity(registry.len());
    for (key, connection) in registry.targets() {
        let factory = client
            .create_dispatch_factory(connection, listener)
            .map_err(|source| RoutingError::DispatchFactory {
                key: key.to_string(),
                source,
            })?;
        debug!("dispatch factory registered for '{}'", key);
        factories.insert(key.to_string(), factory);
    }
    Ok(DispatchFactories { factories })
}
