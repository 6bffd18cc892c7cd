//! Settlement PnL feed daemon.
//!
//! Subscribes to `MarginSettled` events on the configured contract and
//! forwards the per-event margin delta to the aggregation service.

mod config;

use std::{process::exit, time::Duration};

use pnl_feed::{
    dedup::SeenCache,
    forward::PnlClient,
    listener::{DEFAULT_RECONNECT_DELAY, SettleListener},
    num::Converter,
    pipeline::Pipeline,
};
use tokio::sync::watch;
use tracing::{error, info};

use config::{DEFAULT_DECIMALS, EnvConfig};

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    // Parse environment configuration
    let env_config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse environment configuration: {}", e);
            exit(1);
        }
    };

    // Set up logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let ws_url = match env_config.ws_url() {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Invalid WebSocket URL: {}", e);
            exit(1);
        }
    };

    let contract = match env_config.contract_address() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Invalid contract address: {}", e);
            exit(1);
        }
    };

    let supabase_url = match env_config.supabase_url() {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Invalid aggregation service URL: {}", e);
            exit(1);
        }
    };

    let decimals = env_config.pnl_decimals.unwrap_or(DEFAULT_DECIMALS);

    let capacity = match env_config.dedup_capacity() {
        Ok(capacity) => capacity,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            exit(1);
        }
    };

    let reconnect_delay = env_config
        .reconnect_delay_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RECONNECT_DELAY);

    info!(
        %contract,
        decimals,
        dedup_capacity = capacity,
        reconnect_delay_secs = reconnect_delay.as_secs(),
        "starting settlement pnl feed"
    );

    let sink = PnlClient::new(&supabase_url, env_config.supabase_service_key);
    let pipeline = Pipeline::new(SeenCache::new(capacity), Converter::new(decimals), sink);
    let mut listener = SettleListener::new(ws_url, contract, reconnect_delay, pipeline);

    // One external interrupt triggers graceful teardown; the listener
    // observes the flag, drops its session and returns.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for termination signal");
            return;
        }
        info!("termination signal received, shutting down");
        let _ = shutdown_tx.send(true);
    });

    listener.run(shutdown_rx).await;
    info!("feed stopped");
}
