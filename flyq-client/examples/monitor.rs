use std::sync::Arc;
use std::time::Duration;

use flyq_client::{Address, BrokerClient, CachePolicy, ConnectionSettings, TcpBrokerClient};
use tokio::time::sleep;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("FlyQ Channel Cache Monitor");
    println!("==========================\n");

    let client = TcpBrokerClient::new();
    let settings = ConnectionSettings {
        addresses: vec![Address::new("127.0.0.1", 9092)],
        connection_timeout: Some(Duration::from_secs(2)),
        ..Default::default()
    };
    let policy = CachePolicy {
        channel_cache_size: Some(4),
        channel_checkout_timeout: Some(Duration::from_millis(500)),
        ..Default::default()
    };

    let raw = client.create_raw_connection(&settings).await?;
    let connection = Arc::new(client.wrap_with_caching(raw, &policy)?);
    println!("Connected to {}\n", connection.address());

    for round in 0..3 {
        let mut channels = Vec::new();
        for _ in 0..=round {
            channels.push(connection.checkout().await?);
        }
        println!("round {}: {} channels checked out", round, channels.len());
        for channel in channels {
            connection.checkin(channel).await;
        }
        println!("  idle channels: {}", connection.idle_channels().await);
        sleep(Duration::from_secs(1)).await;
    }

    client.release(&connection);
    Ok(())
}
