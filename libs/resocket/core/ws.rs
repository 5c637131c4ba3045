//! Production transport over tokio-tungstenite

use crate::traits::error::{ChannelError, Result};
use crate::traits::transport::{Transport, TransportConn};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::debug;

/// The default [`Transport`]: tokio-tungstenite over TCP/TLS
#[derive(Debug, Clone, Copy, Default)]
pub struct WsTransport;

/// One established websocket connection
pub struct WsConn {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    type Conn = WsConn;

    async fn open(&self, url: &str) -> Result<WsConn> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;
        Ok(WsConn { stream })
    }
}

#[async_trait]
impl TransportConn for WsConn {
    async fn send(&mut self, frame: &str) -> Result<()> {
        self.stream
            .send(Message::Text(frame.to_string()))
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String>> {
        // The channel only speaks text frames; protocol ping/pong is handled
        // by tungstenite itself and close frames end the stream.
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(data)) => {
                    debug!(len = data.len(), "ignoring binary frame");
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                Ok(Message::Close(_)) => return None,
                Err(e) => return Some(Err(ChannelError::Transport(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
