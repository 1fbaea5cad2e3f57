use flyq_client::Address;
use tokio::net::TcpListener;

/// Binds a loopback listener on an ephemeral port. Connections complete
/// through the kernel backlog, so nothing needs to call `accept`.
pub async fn loopback_broker() -> (TcpListener, Address) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind loopback listener");
    let port = listener.local_addr().expect("no local addr").port();
    (listener, Address::new("127.0.0.1", port))
}

/// An address nothing listens on.
pub async fn dead_address() -> Address {
    let (listener, address) = loopback_broker().await;
    drop(listener);
    address
}
