//! # ReSocket Traits
//!
//! Core traits and types for the ReSocket channel library:
//!
//! - **Transport / TransportConn**: the injected websocket seam
//! - **ReconnectionStrategy**: control reconnection backoff
//! - **ChannelError**: the error taxonomy

pub mod error;
pub mod reconnect;
pub mod transport;

// Re-export commonly used types
pub use self::error::{ChannelError, Result};
pub use self::reconnect::{ExponentialBackoff, LinearBackoff, NeverReconnect, ReconnectionStrategy};
pub use self::transport::{Transport, TransportConn};
