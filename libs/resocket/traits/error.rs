use thiserror::Error;

/// Main error type for resocket
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Transport-level error (handshake, socket I/O)
    #[error("transport error: {0}")]
    Transport(String),

    /// Connection closed unexpectedly
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Too many heartbeat intervals elapsed without a reply
    #[error("missed {missed} heartbeats, connection presumed dead")]
    HeartbeatTimeout { missed: u32 },

    /// Channel send error
    #[error("channel send error: {0}")]
    ChannelSend(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The channel has been closed and cannot serve the request
    #[error("channel is closed")]
    Closed,
}

/// Result type for resocket operations
pub type Result<T> = std::result::Result<T, ChannelError>;
