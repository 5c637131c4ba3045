//! Common test utilities for ReSocket integration tests
//!
//! Provides a mock websocket server that tests can script: push frames to
//! connected clients, echo (or withhold) heartbeat replies, and drop
//! connections to exercise the reconnect path.
#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Notify};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// A scriptable mock websocket server
pub struct MockWsServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    kick: Arc<Notify>,
    push_tx: broadcast::Sender<String>,
    connections: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<String>>>,
    heartbeat_echo: Arc<Mutex<Option<String>>>,
}

impl MockWsServer {
    /// Create and start a new mock websocket server
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let kick = Arc::new(Notify::new());
        let (push_tx, _) = broadcast::channel(64);
        let connections = Arc::new(AtomicUsize::new(0));
        let received = Arc::new(Mutex::new(Vec::new()));
        let heartbeat_echo = Arc::new(Mutex::new(None));

        {
            let shutdown = shutdown.clone();
            let kick = kick.clone();
            let push_tx = push_tx.clone();
            let connections = connections.clone();
            let received = received.clone();
            let heartbeat_echo = heartbeat_echo.clone();

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        result = listener.accept() => {
                            match result {
                                Ok((stream, _)) => {
                                    connections.fetch_add(1, Ordering::SeqCst);
                                    let shutdown = shutdown.clone();
                                    let kick = kick.clone();
                                    let push_rx = push_tx.subscribe();
                                    let received = received.clone();
                                    let heartbeat_echo = heartbeat_echo.clone();
                                    tokio::spawn(async move {
                                        Self::handle_connection(
                                            stream, shutdown, kick, push_rx, received, heartbeat_echo,
                                        )
                                        .await;
                                    });
                                }
                                Err(e) => {
                                    eprintln!("Accept error: {}", e);
                                    break;
                                }
                            }
                        }
                        _ = shutdown.notified() => {
                            break;
                        }
                    }
                }
            });
        }

        Self {
            addr,
            shutdown,
            kick,
            push_tx,
            connections,
            received,
            heartbeat_echo,
        }
    }

    async fn handle_connection(
        stream: tokio::net::TcpStream,
        shutdown: Arc<Notify>,
        kick: Arc<Notify>,
        mut push_rx: broadcast::Receiver<String>,
        received: Arc<Mutex<Vec<String>>>,
        heartbeat_echo: Arc<Mutex<Option<String>>>,
    ) {
        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let echo = heartbeat_echo.lock().clone();
                            if echo.as_deref() == Some(text.as_str()) {
                                // Answer the liveness probe
                                if write.send(Message::Text(text)).await.is_err() {
                                    break;
                                }
                            } else {
                                received.lock().push(text);
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if write.send(Message::Pong(data)).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    }
                }
                frame = push_rx.recv() => {
                    if let Ok(frame) = frame {
                        if write.send(Message::Text(frame)).await.is_err() {
                            break;
                        }
                    }
                }
                _ = kick.notified() => {
                    // Simulate an abrupt connection loss
                    break;
                }
                _ = shutdown.notified() => {
                    break;
                }
            }
        }
    }

    /// Get the websocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Push a frame to every connected client
    pub fn push(&self, frame: impl Into<String>) {
        let _ = self.push_tx.send(frame.into());
    }

    /// Sever all current connections (clients see an abrupt close)
    pub fn drop_connections(&self) {
        self.kick.notify_waiters();
    }

    /// Total connections accepted since start
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Frames received from clients, heartbeat echoes excluded
    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    /// Start answering this sentinel whenever a client sends it
    pub fn echo_heartbeat(&self, sentinel: impl Into<String>) {
        *self.heartbeat_echo.lock() = Some(sentinel.into());
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Poll `cond` until it holds or `timeout` elapses
pub async fn wait_until<F: Fn() -> bool>(cond: F, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cond()
}
