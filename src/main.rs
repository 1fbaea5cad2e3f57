use anyhow::{Context, Result};
use clap::Parser;
use flyq_client::TcpBrokerClient;
use flyq_multi::{MultiBroker, MultiBrokerConfig};
use tracing::info;

use crate::params::Params;

mod params;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .with_thread_ids(true)
        .compact()
        .init();

    let params = Params::parse();
    let config = MultiBrokerConfig::load_or_default(params.config.as_ref())?;
    info!(
        "assembling {} keyed connections plus default",
        config.multi.len()
    );

    let broker = MultiBroker::assemble(TcpBrokerClient::new(), &config)
        .await
        .context("routing assembly failed")?;

    info!(
        "default connection -> {}",
        broker.registry().default_connection().address()
    );
    for key in broker.registry().keys() {
        info!("keyed connection '{}' registered", key);
    }
    for route in &params.routes {
        let connection = broker.resolve(Some(route));
        let target = match broker.registry().get(route) {
            Some(_) => "keyed",
            None => "default",
        };
        info!(
            "route '{}' -> {} ({} connection, dispatch factory: {})",
            route,
            connection.address(),
            target,
            broker.dispatch_factories().contains(route)
        );
    }

    broker.shutdown();
    Ok(())
}
