pub mod config;
pub mod core;

pub use crate::config::{BrokerConfig, CacheConfig, ListenerConfig, MultiBrokerConfig, TlsConfig};
pub use crate::core::builder::ConnectionFactoryBuilder;
pub use crate::core::dispatch::DispatchFactories;
pub use crate::core::merge::{merge, Overlay};
pub use crate::core::registry::{RoutingRegistry, DEFAULT_CONNECTION};
pub use crate::core::{MultiBroker, RoutingError};
