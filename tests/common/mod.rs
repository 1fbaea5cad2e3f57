#![allow(dead_code)]

use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use flyq_client::{
    Address, BrokerClient, CachePolicy, ClientError, ConnectionSettings, ListenerSettings,
};

/// In-memory broker client that records what it was asked to build.
#[derive(Default)]
pub struct MockClient {
    unreachable: HashSet<String>,
    invalid: HashSet<String>,
    reject_dispatch: HashSet<String>,
    pub attempts: Arc<AtomicUsize>,
    pub live: Arc<AtomicUsize>,
    pub releases: Arc<AtomicUsize>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unreachable_host(mut self, host: &str) -> Self {
        self.unreachable.insert(host.to_string());
        self
    }

    pub fn invalid_host(mut self, host: &str) -> Self {
        self.invalid.insert(host.to_string());
        self
    }

    pub fn rejecting_dispatch_on(mut self, host: &str) -> Self {
        self.reject_dispatch.insert(host.to_string());
        self
    }

    /// Counters that outlive the client once it is moved into assembly.
    pub fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (Arc::clone(&self.attempts), Arc::clone(&self.live))
    }

    pub fn releases(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.releases)
    }
}

pub struct MockConnection {
    pub settings: ConnectionSettings,
    pub policy: CachePolicy,
    pub released: AtomicBool,
    live: Arc<AtomicUsize>,
}

impl MockConnection {
    pub fn address(&self) -> &Address {
        &self.settings.addresses[0]
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct MockDispatchFactory {
    pub connection: Arc<MockConnection>,
    pub listener: ListenerSettings,
}

impl BrokerClient for MockClient {
    type RawConnection = ConnectionSettings;
    type Connection = MockConnection;
    type DispatchFactory = MockDispatchFactory;

    async fn create_raw_connection(
        &self,
        settings: &ConnectionSettings,
    ) -> Result<ConnectionSettings, ClientError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let addresses = settings.effective_addresses();
        let host = &addresses[0].host;
        if self.invalid.contains(host) {
            return Err(ClientError::InvalidSettings(format!("bad key store for {host}")));
        }
        if self.unreachable.contains(host) {
            return Err(ClientError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("{host} refused"),
            )));
        }
        Ok(settings.clone())
    }

    fn wrap_with_caching(
        &self,
        raw: ConnectionSettings,
        policy: &CachePolicy,
    ) -> Result<MockConnection, ClientError> {
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection {
            settings: raw,
            policy: policy.clone(),
            released: AtomicBool::new(false),
            live: Arc::clone(&self.live),
        })
    }

    fn create_dispatch_factory(
        &self,
        connection: &Arc<MockConnection>,
        listener: &ListenerSettings,
    ) -> Result<MockDispatchFactory, ClientError> {
        if self.reject_dispatch.contains(&connection.address().host) {
            return Err(ClientError::Closed);
        }
        Ok(MockDispatchFactory {
            connection: Arc::clone(connection),
            listener: listener.clone(),
        })
    }

    fn release(&self, connection: &MockConnection) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        connection.released.store(true, Ordering::SeqCst);
    }
}
