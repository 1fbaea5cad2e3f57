use std::sync::Arc;

use tracing::debug;

use crate::error::ClientError;
use crate::settings::ListenerSettings;
use crate::tcp::{CachingConnection, Channel};

/// Builds consumer channels on one specific connection.
pub struct ListenerContainerFactory {
    connection: Arc<CachingConnection>,
    listener: ListenerSettings,
}

impl ListenerContainerFactory {
    pub(crate) fn new(connection: Arc<CachingConnection>, listener: ListenerSettings) -> Self {
        ListenerContainerFactory {
            connection,
            listener,
        }
    }

    pub fn connection(&self) -> &Arc<CachingConnection> {
        &self.connection
    }

    pub fn listener(&self) -> &ListenerSettings {
        &self.listener
    }

    /// Checks out one channel per configured consumer.
    pub async fn consumer_channels(&self) -> Result<Vec<Channel>, ClientError> {
        let count = self.listener.effective_concurrency();
        let mut channels = Vec::with_capacity(count);
        for _ in 0..count {
            channels.push(self.connection.checkout().await?);
        }
        debug!(
            "opened {} consumer channels on {}",
            channels.len(),
            self.connection.address()
        );
        Ok(channels)
    }
}
