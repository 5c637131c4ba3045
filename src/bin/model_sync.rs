//! Demo binary: bind a local model to a websocket endpoint
//!
//! Connects with the roles derived from the configured channel tags, logs
//! channel events, and prints the model whenever it changes.

use anyhow::Result;
use modelsync::bin_common::{init_tracing, EndpointSettings};
use resocket::{HeartbeatConfig, SharedModel};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let settings = EndpointSettings::from_env();
    let model = Arc::new(SharedModel::new(settings.model_name.clone()));

    println!("Connecting to {} ...", settings.url());

    let builder = resocket::builder()
        .endpoint(&settings.uri_prefix, &settings.facility, &settings.tags)
        .model(Arc::clone(&model));
    let builder = match settings.heartbeat.as_deref() {
        Some(sentinel) => builder.heartbeat(HeartbeatConfig::new(sentinel)),
        None => builder,
    };
    let channel = builder.open().await?;

    channel.wait_connected().await?;
    println!("Connected. Press Ctrl+C to stop\n");

    let mut last = model.snapshot();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                while let Some(event) = channel.try_recv_event() {
                    info!(?event, "channel event");
                }
                let snapshot = model.snapshot();
                if snapshot != last {
                    println!("{} = {}", model.name(), serde_json::to_string(&snapshot)?);
                    last = snapshot;
                }
            }
        }
    }

    let metrics = channel.metrics();
    info!(
        sent = metrics.frames_sent,
        received = metrics.frames_received,
        reconnects = metrics.reconnect_count,
        "closing"
    );
    channel.shutdown().await;
    println!("Shutdown complete");
    Ok(())
}
