use crate::core::config::ChannelConfig;
use crate::core::connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
use crate::core::heartbeat::MissedBeats;
use crate::traits::error::{ChannelError, Result};
use crate::traits::transport::{Transport, TransportConn};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Internal command messages for channel control
#[derive(Debug)]
enum Command {
    /// Send a text frame on the current connection
    Send(String),
    /// Tear the channel down for good
    Close,
}

/// Events emitted by the channel
///
/// After the first connection, reconnection is transparent: losses and
/// recoveries are only observable here, never through
/// [`Channel::wait_connected`].
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// Connected to the server
    Connected,
    /// Disconnected from the server
    Disconnected,
    /// Reconnecting (attempt number)
    Reconnecting(usize),
    /// Error occurred
    Error(String),
}

/// Channel metrics snapshot
#[derive(Debug, Clone)]
pub struct Metrics {
    pub frames_sent: u64,
    pub frames_received: u64,
    pub frames_dropped: u64,
    pub reconnect_count: u64,
    pub connection_state: ConnectionState,
}

/// Pending-or-cached outcome of the very first connection attempt
struct FirstAttempt {
    rx: Option<oneshot::Receiver<std::result::Result<(), String>>>,
    outcome: Option<std::result::Result<(), String>>,
}

/// Handle to a running resilient socket channel
///
/// The channel owns one logical persistent connection: it connects, detects
/// loss (optionally via heartbeat), and reconnects with bounded backoff
/// until explicitly closed. Inbound JSON frames are merged into the shared
/// model when subscribed; model changes are sent outbound when publishing.
///
/// Dropping the handle tears the channel down like [`Channel::close`].
pub struct Channel {
    /// Atomic connection state
    state: Arc<AtomicConnectionState>,
    /// Atomic metrics
    metrics: Arc<AtomicMetrics>,
    /// Command channel sender
    command_tx: mpsc::UnboundedSender<Command>,
    /// Event channel receiver
    event_rx: Receiver<ChannelEvent>,
    /// First-attempt outcome, shared by all wait_connected callers
    first_attempt: tokio::sync::Mutex<FirstAttempt>,
    /// Shutdown flag - false prevents any further reconnection
    shutdown_flag: Arc<AtomicBool>,
    /// Main task handle
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

impl Channel {
    /// Spawn the channel task; called by the builder's `open()`
    pub(crate) fn spawn<T: Transport>(transport: T, config: ChannelConfig) -> Self {
        let state = Arc::new(AtomicConnectionState::new(ConnectionState::Disconnected));
        let metrics = Arc::new(AtomicMetrics::new());
        let shutdown_flag = Arc::clone(&config.shutdown_flag);

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = unbounded();
        let (first_tx, first_rx) = oneshot::channel();

        // Publisher wiring: the model pushes serialized snapshots into this
        // queue on every application-side change.
        let (publish_tx, publish_rx) = mpsc::unbounded_channel();
        if config.roles.publisher {
            if let Some(model) = config.model.as_ref() {
                model.attach_publisher(publish_tx);
            }
        }

        let task_handle = {
            let state = Arc::clone(&state);
            let metrics = Arc::clone(&metrics);
            tokio::spawn(async move {
                run_channel(
                    transport, config, state, metrics, command_rx, event_tx, publish_rx, first_tx,
                )
                .await;
            })
        };

        Self {
            state,
            metrics,
            command_tx,
            event_rx,
            first_attempt: tokio::sync::Mutex::new(FirstAttempt {
                rx: Some(first_rx),
                outcome: None,
            }),
            shutdown_flag,
            task_handle: Some(task_handle),
        }
    }

    /// Wait for the outcome of the very first connection attempt
    ///
    /// Resolves `Ok(())` once the transport first reports the connection
    /// established, `Err(..)` if the first attempt fails before ever
    /// connecting. Either way this is a one-shot observation: later
    /// disconnects and reconnects never surface here (they are reported as
    /// [`ChannelEvent`]s), and background reconnection continues even after
    /// a failed first attempt unless the strategy gives up.
    pub async fn wait_connected(&self) -> Result<()> {
        // Concurrent callers queue on the lock; the first resolves the
        // oneshot, every later one reads the cached outcome.
        let mut first = self.first_attempt.lock().await;
        if let Some(rx) = first.rx.take() {
            let outcome = match rx.await {
                Ok(outcome) => outcome,
                Err(_) => Err("channel task exited before connecting".to_string()),
            };
            first.outcome = Some(outcome);
        }

        match first.outcome.clone() {
            Some(Ok(())) => Ok(()),
            Some(Err(reason)) => Err(ChannelError::Transport(reason)),
            None => Err(ChannelError::Closed),
        }
    }

    /// Send a text frame on the current connection
    ///
    /// Policy: drop-and-log. When the channel is not currently connected the
    /// frame is dropped with a warning and counted in the metrics; there is
    /// no queuing.
    pub fn send(&self, frame: impl Into<String>) {
        if !self.state.is_connected() {
            warn!("send while not connected, dropping frame");
            self.metrics.increment_dropped();
            return;
        }
        if self.command_tx.send(Command::Send(frame.into())).is_err() {
            warn!("channel task is gone, dropping frame");
            self.metrics.increment_dropped();
        }
    }

    /// Deliberately tear the channel down
    ///
    /// Cancels heartbeat and backoff timers and closes the transport; no
    /// further reconnection occurs. A closed channel cannot be resurrected;
    /// construct a fresh one instead.
    pub fn close(&self) {
        self.shutdown_flag.store(false, Ordering::Release);
        let _ = self.command_tx.send(Command::Close);
    }

    /// Close the channel and wait for its task to finish
    pub async fn shutdown(mut self) {
        info!("shutting down channel");
        self.close();
        if let Some(handle) = self.task_handle.take() {
            let _ = handle.await;
        }
    }

    /// Get current connection state
    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Check if connected
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Get current metrics
    pub fn metrics(&self) -> Metrics {
        Metrics {
            frames_sent: self.metrics.frames_sent(),
            frames_received: self.metrics.frames_received(),
            frames_dropped: self.metrics.frames_dropped(),
            reconnect_count: self.metrics.reconnect_count(),
            connection_state: self.state.get(),
        }
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<ChannelEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receive an event (blocking)
    pub fn recv_event(&self) -> std::result::Result<ChannelEvent, crossbeam_channel::RecvError> {
        self.event_rx.recv()
    }

    /// Get a reference to the shutdown flag
    ///
    /// External code can trigger teardown by storing `false`; the flag is
    /// checked before every reconnection attempt.
    pub fn shutdown_flag(&self) -> &Arc<AtomicBool> {
        &self.shutdown_flag
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        // An abandoned handle must not leave a retry loop running forever
        self.shutdown_flag.store(false, Ordering::Release);
        let _ = self.command_tx.send(Command::Close);
    }
}

/// Main channel task: the connect / retry loop
///
/// State machine: Disconnected -> Connecting -> Connected -> Disconnected
/// (retry scheduled) -> Reconnecting -> ... until Closed via the shutdown
/// flag. Transport errors are never fatal; they always degrade to a
/// scheduled reconnect unless explicitly closed.
#[allow(clippy::too_many_arguments)]
async fn run_channel<T: Transport>(
    transport: T,
    config: ChannelConfig,
    state: Arc<AtomicConnectionState>,
    metrics: Arc<AtomicMetrics>,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: Sender<ChannelEvent>,
    mut publish_rx: mpsc::UnboundedReceiver<String>,
    first_tx: oneshot::Sender<std::result::Result<(), String>>,
) {
    let mut first_tx = Some(first_tx);
    let mut reconnect_attempt = 0usize;
    let shutdown_flag = &config.shutdown_flag;

    loop {
        if !shutdown_flag.load(Ordering::Acquire) {
            debug!("shutdown flag is false, exiting channel task");
            break;
        }

        state.set(if reconnect_attempt == 0 {
            ConnectionState::Connecting
        } else {
            ConnectionState::Reconnecting
        });

        if reconnect_attempt > 0 {
            let _ = event_tx.send(ChannelEvent::Reconnecting(reconnect_attempt));
        }

        debug!("connecting to {}", config.url);
        match transport.open(&config.url).await {
            Ok(mut conn) => {
                info!("connected to {}", config.url);
                state.set(ConnectionState::Connected);
                let _ = event_tx.send(ChannelEvent::Connected);
                if let Some(tx) = first_tx.take() {
                    let _ = tx.send(Ok(()));
                }

                // A successful connection resets the backoff to its initial value
                reconnect_attempt = 0;

                if let Err(e) =
                    message_loop(&mut conn, &config, &metrics, &mut command_rx, &mut publish_rx)
                        .await
                {
                    warn!("connection lost: {}", e);
                    let _ = event_tx.send(ChannelEvent::Error(e.to_string()));
                }
                conn.close().await;

                state.set(ConnectionState::Disconnected);
                let _ = event_tx.send(ChannelEvent::Disconnected);
            }
            Err(e) => {
                error!("failed to connect: {}", e);
                let _ = event_tx.send(ChannelEvent::Error(e.to_string()));
                if let Some(tx) = first_tx.take() {
                    let _ = tx.send(Err(e.to_string()));
                }
                state.set(ConnectionState::Disconnected);
            }
        }

        if !shutdown_flag.load(Ordering::Acquire) {
            debug!("shutdown flag set during connection, stopping reconnection");
            break;
        }

        match config.reconnect_strategy.next_delay(reconnect_attempt) {
            Some(delay) => {
                info!(
                    "reconnecting in {:?} (attempt {})",
                    delay,
                    reconnect_attempt + 1
                );
                if !sleep_unless_shutdown(delay, shutdown_flag).await {
                    debug!("shutdown flag set during reconnection delay");
                    break;
                }
                reconnect_attempt += 1;
                metrics.increment_reconnects();
            }
            None => {
                warn!("reconnection strategy exhausted, stopping");
                break;
            }
        }
    }

    state.set(ConnectionState::Closed);
    debug!("channel task exiting");
}

/// Sleep for `delay`, checking the shutdown flag every 100 ms
///
/// Returns false if shutdown was requested during the wait.
async fn sleep_unless_shutdown(delay: Duration, shutdown_flag: &Arc<AtomicBool>) -> bool {
    let check_interval = Duration::from_millis(100);
    let mut elapsed = Duration::ZERO;

    while elapsed < delay {
        if !shutdown_flag.load(Ordering::Acquire) {
            return false;
        }
        let sleep_time = std::cmp::min(check_interval, delay - elapsed);
        tokio::time::sleep(sleep_time).await;
        elapsed += sleep_time;
    }

    shutdown_flag.load(Ordering::Acquire)
}

/// Process one established connection until it drops or the channel closes
///
/// Returns `Ok(())` on deliberate close (no reconnect follows because the
/// shutdown flag is already false) and `Err(..)` on transport loss or a
/// heartbeat breach (both take the same reconnect path).
async fn message_loop<C: TransportConn>(
    conn: &mut C,
    config: &ChannelConfig,
    metrics: &Arc<AtomicMetrics>,
    command_rx: &mut mpsc::UnboundedReceiver<Command>,
    publish_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<()> {
    let shutdown_flag = &config.shutdown_flag;

    // Fresh miss streak per connection
    let missed = MissedBeats::new();
    let mut ticker = match config.heartbeat.as_ref() {
        Some(hb) => {
            let mut ticker = tokio::time::interval(hb.interval);
            // The first tick fires immediately; consume it so the first probe
            // waits a full interval. Missed ticks are skipped, not burst.
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            ticker.tick().await;
            Some(ticker)
        }
        None => None,
    };

    // Select resolves to a plain event first; sends happen afterwards, once
    // the recv future (and its borrow of the connection) is gone. Both queue
    // recv futures are cancel-safe: a frame that loses the race stays queued
    // for the next iteration instead of being dropped.
    enum LoopEvent {
        Inbound(Option<Result<String>>),
        Command(Option<Command>),
        Publish(Option<String>),
        HeartbeatDue,
        Idle,
    }

    loop {
        if !shutdown_flag.load(Ordering::Acquire) {
            debug!("shutdown flag detected in message loop, closing connection");
            return Ok(());
        }

        let event = tokio::select! {
            // Inbound frames, delivered in arrival order
            frame = conn.recv() => LoopEvent::Inbound(frame),
            // Commands from the handle
            cmd = command_rx.recv() => LoopEvent::Command(cmd),
            // Model snapshots queued by application-side mutations
            update = recv_publish(publish_rx, config.roles.publisher) => LoopEvent::Publish(update),
            // Heartbeat probes
            _ = heartbeat_tick(ticker.as_mut()) => LoopEvent::HeartbeatDue,
            // Periodic wakeup so the shutdown flag is observed without traffic
            _ = tokio::time::sleep(Duration::from_millis(100)) => LoopEvent::Idle,
        };

        match event {
            LoopEvent::Inbound(frame) => match frame {
                Some(Ok(frame)) => {
                    metrics.increment_received();
                    handle_frame(&frame, config, &missed);
                }
                Some(Err(e)) => return Err(e),
                None => return Err(ChannelError::ConnectionClosed("stream ended".into())),
            },

            LoopEvent::Command(cmd) => match cmd {
                Some(Command::Send(frame)) => {
                    conn.send(&frame).await?;
                    metrics.increment_sent();
                }
                Some(Command::Close) => {
                    info!("close requested");
                    return Ok(());
                }
                None => {
                    debug!("command channel closed");
                    return Ok(());
                }
            },

            LoopEvent::Publish(update) => {
                if let Some(json) = update {
                    debug!("publishing model update");
                    conn.send(&json).await?;
                    metrics.increment_sent();
                }
            }

            LoopEvent::HeartbeatDue => {
                if let Some(hb) = config.heartbeat.as_ref() {
                    let count = missed.tick();
                    if count > hb.max_missed {
                        warn!("missed {} heartbeats, forcing reconnect", count);
                        return Err(ChannelError::HeartbeatTimeout { missed: count });
                    }
                    conn.send(&hb.message).await?;
                    metrics.increment_sent();
                }
            }

            LoopEvent::Idle => {}
        }
    }
}

/// Route one inbound frame: heartbeat echo, then JSON merge
fn handle_frame(frame: &str, config: &ChannelConfig, missed: &MissedBeats) {
    // The sentinel is matched against the raw text before any parsing and
    // never reaches the model.
    if let Some(hb) = config.heartbeat.as_ref() {
        if frame == hb.message {
            debug!("heartbeat reply received");
            missed.beat();
            return;
        }
    }

    let fields = match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(frame) {
        Ok(fields) => fields,
        Err(e) => {
            // Malformed data is dropped, never fatal to the connection
            warn!("received frame is not a JSON object, dropping: {}", e);
            return;
        }
    };

    if config.roles.subscriber {
        if let Some(model) = config.model.as_ref() {
            model.merge(fields);
        }
    }
}

/// Await the next queued model snapshot; pends forever for non-publisher
/// channels
async fn recv_publish(rx: &mut mpsc::UnboundedReceiver<String>, enabled: bool) -> Option<String> {
    if !enabled {
        return std::future::pending().await;
    }
    rx.recv().await
}

/// Await the next heartbeat tick; pends forever when heartbeat is off
async fn heartbeat_tick(ticker: Option<&mut tokio::time::Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
