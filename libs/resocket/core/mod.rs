//! Core channel implementation: the reconnecting state machine, its
//! configuration and builder, the shared model container, and the
//! production websocket transport.

pub mod builder;
pub mod channel;
pub mod config;
pub mod connection_state;
pub mod heartbeat;
pub mod model;
pub mod url;
pub mod ws;

// Re-export main types
pub use self::builder::{states, ChannelBuilder};
pub use self::channel::{Channel, ChannelEvent, Metrics};
pub use self::config::ChannelConfig;
pub use self::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
pub use self::heartbeat::{HeartbeatConfig, MissedBeats};
pub use self::model::SharedModel;
pub use self::url::{build_url, TagRoles};
pub use self::ws::WsTransport;

// Re-export traits for convenience
pub use crate::traits::*;
