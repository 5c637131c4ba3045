use crate::traits::error::Result;
use async_trait::async_trait;

/// Trait for opening transport connections
///
/// The channel never constructs its websocket directly; it asks the
/// injected `Transport` for a fresh connection on every (re)connect cycle.
/// The previous connection handle is discarded wholesale, never reused.
///
/// Production code uses [`crate::core::ws::WsTransport`]; tests substitute
/// a fake that scripts open failures and frame sequences.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport
    type Conn: TransportConn;

    /// Open a new connection to the given URL
    ///
    /// # Returns
    /// * `Ok(conn)` - The transport reported the connection established
    /// * `Err(ChannelError)` - The transport failed before connecting
    async fn open(&self, url: &str) -> Result<Self::Conn>;
}

/// A single established text-frame connection
///
/// Only text frames cross this seam. Protocol-level concerns (websocket
/// ping/pong frames, close handshakes) are the implementation's business.
#[async_trait]
pub trait TransportConn: Send + 'static {
    /// Transmit one text frame
    async fn send(&mut self, frame: &str) -> Result<()>;

    /// Receive the next text frame
    ///
    /// # Returns
    /// * `Some(Ok(frame))` - A text frame arrived
    /// * `Some(Err(e))` - The transport reported an error; the connection is dead
    /// * `None` - The peer closed the connection
    async fn recv(&mut self) -> Option<Result<String>>;

    /// Close the connection; errors during close are ignored
    async fn close(&mut self);
}
