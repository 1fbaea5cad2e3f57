pub mod client;
pub mod error;
pub mod listener;
pub mod settings;
pub mod tcp;

// Public re-exports for easy access
pub use client::BrokerClient;
pub use error::ClientError;
pub use listener::ListenerContainerFactory;
pub use settings::{
    AcknowledgeMode, Address, CacheMode, CachePolicy, ConnectionSettings, ListenerSettings,
    TlsSettings, DEFAULT_HOST, DEFAULT_PORT,
};
pub use tcp::{CachingConnection, Channel, TcpBrokerClient, TcpRawConnection};
