use std::sync::Arc;

use flyq_client::BrokerClient;
use tracing::info;

use crate::config::MultiBrokerConfig;
use crate::core::builder::ConnectionFactoryBuilder;
use crate::core::dispatch::{register_all, DispatchFactories};
use crate::core::error::RoutingError;
use crate::core::registry::RoutingRegistry;

/// Fully assembled routing state: every connection built and every
/// dispatch factory registered. There is no partially assembled value.
pub struct MultiBroker<C: BrokerClient> {
    client: Arc<C>,
    registry: RoutingRegistry<C>,
    dispatch: DispatchFactories<C::DispatchFactory>,
}

impl<C: BrokerClient> MultiBroker<C> {
    pub async fn assemble(client: C, config: &MultiBrokerConfig) -> Result<Self, RoutingError> {
        let builder = ConnectionFactoryBuilder::new(Arc::new(client));

        let registry = RoutingRegistry::assemble(&builder, &config.shared, &config.multi).await?;
        let dispatch = match register_all(
            builder.client().as_ref(),
            &registry,
            &config.listener.to_settings(),
        ) {
            Ok(dispatch) => dispatch,
            Err(e) => {
                registry.release(builder.client().as_ref());
                return Err(e);
            }
        };

        if registry.is_empty() {
            info!("single-connection mode");
        }

        Ok(MultiBroker {
            client: Arc::clone(builder.client()),
            registry,
            dispatch,
        })
    }

    /// See [`RoutingRegistry::resolve`].
    pub fn resolve(&self, key: Option<&str>) -> &Arc<C::Connection> {
        self.registry.resolve(key)
    }

    pub fn dispatch_factory(&self, key: &str) -> Option<&C::DispatchFactory> {
        self.dispatch.get(key)
    }

    pub fn registry(&self) -> &RoutingRegistry<C> {
        &self.registry
    }

    pub fn dispatch_factories(&self) -> &DispatchFactories<C::DispatchFactory> {
        &self.dispatch
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Releases every connection, keyed ones first.
    pub fn shutdown(self) {
        let MultiBroker {
            client,
            registry,
            dispatch,
        } = self;
        drop(dispatch);
        registry.release(client.as_ref());
    }
}
