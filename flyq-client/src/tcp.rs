use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

use crate::client::BrokerClient;
use crate::error::ClientError;
use crate::listener::ListenerContainerFactory;
use crate::settings::{
    Address, CachePolicy, ConnectionSettings, ListenerSettings, TlsSettings,
};

/// Broker client over plain TCP. Connects eagerly: every raw connection
/// holds an open stream by the time `create_raw_connection` returns.
#[derive(Debug, Clone, Default)]
pub struct TcpBrokerClient;

impl TcpBrokerClient {
    pub fn new() -> Self {
        TcpBrokerClient
    }
}

pub struct TcpRawConnection {
    settings: ConnectionSettings,
    address: Address,
    stream: TcpStream,
}

impl TcpRawConnection {
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }
}

impl BrokerClient for TcpBrokerClient {
    type RawConnection = TcpRawConnection;
    type Connection = CachingConnection;
    type DispatchFactory = ListenerContainerFactory;

    async fn create_raw_connection(
        &self,
        settings: &ConnectionSettings,
    ) -> Result<TcpRawConnection, ClientError> {
        if let Some(tls) = &settings.tls {
            load_tls_context(tls)?;
            return Err(ClientError::TlsUnavailable);
        }

        let (address, stream) = open_stream(settings).await?;
        debug!(
            "raw connection established to {} (heartbeat {:?})",
            address,
            settings.effective_heartbeat()
        );
        Ok(TcpRawConnection {
            settings: settings.clone(),
            address,
            stream,
        })
    }

    fn wrap_with_caching(
        &self,
        raw: TcpRawConnection,
        policy: &CachePolicy,
    ) -> Result<CachingConnection, ClientError> {
        policy.validate()?;

        let limit = policy.idle_limit();
        let permits = policy
            .channel_checkout_timeout
            .map(|_| Arc::new(Semaphore::new(limit)));

        Ok(CachingConnection {
            settings: raw.settings,
            address: raw.address,
            policy: policy.clone(),
            idle: Mutex::new(vec![raw.stream]),
            permits,
            closed: AtomicBool::new(false),
        })
    }

    fn create_dispatch_factory(
        &self,
        connection: &Arc<CachingConnection>,
        listener: &ListenerSettings,
    ) -> Result<ListenerContainerFactory, ClientError> {
        if connection.is_closed() {
            return Err(ClientError::Closed);
        }
        if let (Some(min), Some(max)) = (listener.concurrency, listener.max_concurrency) {
            if min > max {
                return Err(ClientError::Rejected(format!(
                    "concurrency {min} exceeds max concurrency {max}"
                )));
            }
        }
        Ok(ListenerContainerFactory::new(
            Arc::clone(connection),
            listener.clone(),
        ))
    }

    fn release(&self, connection: &CachingConnection) {
        connection.close();
    }
}

/// Reads both stores the way an SSL context would, so bad paths surface
/// before any network I/O.
fn load_tls_context(tls: &TlsSettings) -> Result<(), ClientError> {
    for (label, path) in [("key store", &tls.key_store), ("trust store", &tls.trust_store)] {
        if let Some(path) = path {
            read_store(label, path)?;
        }
    }
    Ok(())
}

fn read_store(label: &str, path: &Path) -> Result<Vec<u8>, ClientError> {
    fs::read(path).map_err(|e| {
        ClientError::InvalidSettings(format!("cannot read {label} {:?}: {e}", path))
    })
}

async fn open_stream(settings: &ConnectionSettings) -> Result<(Address, TcpStream), ClientError> {
    let timeout = settings.effective_connection_timeout();
    let mut last_err = None;

    for address in settings.effective_addresses() {
        let connect = TcpStream::connect((address.host.as_str(), address.port));
        match tokio::time::timeout(timeout, connect).await {
            Ok(Ok(stream)) => {
                stream.set_nodelay(true)?;
                return Ok((address, stream));
            }
            Ok(Err(e)) => {
                warn!("could not connect to {}: {}", address, e);
                last_err = Some(ClientError::Io(e));
            }
            Err(_) => {
                warn!("connect to {} timed out after {:?}", address, timeout);
                last_err = Some(ClientError::Timeout(timeout));
            }
        }
    }

    Err(last_err.unwrap_or_else(|| ClientError::InvalidSettings("no address".to_string())))
}

/// A raw connection wrapped with a channel cache.
pub struct CachingConnection {
    settings: ConnectionSettings,
    address: Address,
    policy: CachePolicy,
    idle: Mutex<Vec<TcpStream>>,
    // present only when a checkout timeout turns the cache size into a hard limit
    permits: Option<Arc<Semaphore>>,
    closed: AtomicBool,
}

impl CachingConnection {
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn publisher_confirms(&self) -> bool {
        self.policy.publisher_confirms.unwrap_or(false)
    }

    pub fn publisher_returns(&self) -> bool {
        self.policy.publisher_returns.unwrap_or(false)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub async fn idle_channels(&self) -> usize {
        self.idle.lock().await.len()
    }

    /// Hands out a cached channel, or opens a new one.
    pub async fn checkout(&self) -> Result<Channel, ClientError> {
        if self.is_closed() {
            self.drain_idle().await;
            return Err(ClientError::Closed);
        }

        let permit = match (&self.permits, self.policy.channel_checkout_timeout) {
            (Some(permits), Some(timeout)) => Some(acquire(permits, timeout).await?),
            _ => None,
        };

        let cached = self.idle.lock().await.pop();
        let stream = match cached {
            Some(stream) => stream,
            None => {
                debug!("channel cache empty for {}, opening new channel", self.address);
                let settings = ConnectionSettings {
                    addresses: vec![self.address.clone()],
                    ..self.settings.clone()
                };
                open_stream(&settings).await?.1
            }
        };

        Ok(Channel {
            stream,
            _permit: permit,
        })
    }

    /// Returns a channel to the cache; it is dropped if the cache is full or closed.
    pub async fn checkin(&self, channel: Channel) {
        if self.is_closed() {
            drop(channel);
            self.drain_idle().await;
            return;
        }
        let mut idle = self.idle.lock().await;
        if idle.len() < self.policy.idle_limit() {
            idle.push(channel.stream);
        } else {
            debug!("channel cache full for {}, dropping channel", self.address);
        }
    }

    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(permits) = &self.permits {
            permits.close();
        }
        // If the lock is held, the next checkout or checkin drains the cache.
        if let Ok(mut idle) = self.idle.try_lock() {
            idle.clear();
        }
        debug!("connection to {} closed", self.address);
    }

    async fn drain_idle(&self) {
        let mut idle = self.idle.lock().await;
        if !idle.is_empty() {
            debug!(
                "dropping {} idle channels of closed connection to {}",
                idle.len(),
                self.address
            );
            idle.clear();
        }
    }
}

async fn acquire(
    permits: &Arc<Semaphore>,
    timeout: Duration,
) -> Result<OwnedSemaphorePermit, ClientError> {
    match tokio::time::timeout(timeout, Arc::clone(permits).acquire_owned()).await {
        Ok(Ok(permit)) => Ok(permit),
        Ok(Err(_)) => Err(ClientError::Closed),
        Err(_) => Err(ClientError::Timeout(timeout)),
    }
}

/// A checked-out stream. The wire protocol on top of it belongs to the caller.
pub struct Channel {
    stream: TcpStream,
    _permit: Option<OwnedSemaphorePermit>,
}

impl Channel {
    pub fn stream(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    pub fn peer_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.stream.peer_addr()
    }
}
