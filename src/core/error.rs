use flyq_client::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    /// Structurally invalid configuration, detected before any network I/O.
    #[error("Invalid configuration for connection '{key}': {reason}")]
    ConnectionConfig { key: String, reason: String },

    #[error("Broker client rejected connection '{key}': {source}")]
    ConnectionInit {
        key: String,
        #[source]
        source: ClientError,
    },

    #[error("Could not create dispatch factory '{key}': {source}")]
    DispatchFactory {
        key: String,
        #[source]
        source: ClientError,
    },
}

impl RoutingError {
    /// Classifies a failure raised while building a connection.
    pub(crate) fn from_connection(key: &str, err: ClientError) -> Self {
        match err {
            ClientError::InvalidSettings(reason) => RoutingError::ConnectionConfig {
                key: key.to_string(),
                reason,
            },
            source => RoutingError::ConnectionInit {
                key: key.to_string(),
                source,
            },
        }
    }

    /// Routing key of the connection that failed.
    pub fn key(&self) -> &str {
        match self {
            RoutingError::ConnectionConfig { key, .. }
            | RoutingError::ConnectionInit { key, .. }
            | RoutingError::DispatchFactory { key, .. } => key,
        }
    }
}
