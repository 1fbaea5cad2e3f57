use std::future::Future;
use std::sync::Arc;

use crate::error::ClientError;
use crate::settings::{CachePolicy, ConnectionSettings, ListenerSettings};

/// The primitives a broker client library offers for building connections
/// and the consumer machinery bound to them.
///
/// Implementations decide whether `create_raw_connection` connects eagerly or
/// lazily, but must apply the same policy to every connection they create.
pub trait BrokerClient: Send + Sync {
    type RawConnection: Send;
    type Connection: Send + Sync;
    type DispatchFactory: Send + Sync;

    fn create_raw_connection(
        &self,
        settings: &ConnectionSettings,
    ) -> impl Future<Output = Result<Self::RawConnection, ClientError>> + Send;

    fn wrap_with_caching(
        &self,
        raw: Self::RawConnection,
        policy: &CachePolicy,
    ) -> Result<Self::Connection, ClientError>;

    fn create_dispatch_factory(
        &self,
        connection: &Arc<Self::Connection>,
        listener: &ListenerSettings,
    ) -> Result<Self::DispatchFactory, ClientError>;

    /// Called once per connection at shutdown.
    fn release(&self, _connection: &Self::Connection) {}
}
