//! # ReSocket
//!
//! A resilient websocket channel for three-way model synchronization:
//! server-pushed JSON frames are merged into a local model, and (optionally)
//! local model changes are pushed back to the server.
//!
//! ## Features
//!
//! - **Automatic reconnection**: pluggable backoff strategies, bounded delays
//! - **Heartbeat liveness**: detects silently-dead connections via a sentinel
//!   message and a missed-beat threshold
//! - **Injected transport**: the websocket layer sits behind a trait, so tests
//!   run against a fake or local mock server
//! - **Echo suppression**: a re-entrancy guard keeps inbound merges from being
//!   re-published to the server
//! - **Lock-free status**: atomic connection state and metrics

pub mod traits;
pub mod core;

// Re-export all traits
pub use self::traits::*;

// Re-export core channel functionality
pub use self::core::{
    builder, channel, config, connection_state, heartbeat, model, url,
    builder::{states, ChannelBuilder},
    channel::{Channel, ChannelEvent, Metrics},
    config::ChannelConfig,
    connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState},
    heartbeat::{HeartbeatConfig, MissedBeats},
    model::SharedModel,
    url::{build_url, TagRoles},
    ws::WsTransport,
};

// Convenience function
pub use self::core::builder as channel_builder;

/// Type alias for Result with ChannelError
pub type Result<T> = std::result::Result<T, traits::ChannelError>;

/// Create a new channel builder
///
/// This is a convenience function for starting the builder pattern.
///
/// # Example
/// ```ignore
/// let model = Arc::new(SharedModel::new("dashboard"));
/// let channel = resocket::builder()
///     .endpoint("wss://example.com/ws/", "dashboard", &["subscribe-updates"])
///     .model(Arc::clone(&model))
///     .heartbeat(HeartbeatConfig::new("--heartbeat--"))
///     .open()
///     .await?;
/// channel.wait_connected().await?;
/// ```
pub fn builder() -> ChannelBuilder<builder::states::NoUrl, WsTransport> {
    ChannelBuilder::new()
}
