//! Lock-free connection state and metrics
//!
//! Both the channel task and its handle observe connection state; atomics
//! keep the hot path free of locks.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// The lifecycle state of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// Not connected, no retry currently scheduled
    Disconnected = 0,
    /// First connection attempt in flight
    Connecting = 1,
    /// Transport reported the connection established
    Connected = 2,
    /// Connection lost, reconnect attempt in flight
    Reconnecting = 3,
    /// Terminal: explicitly closed, no further reconnection
    Closed = 4,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Reconnecting,
            4 => ConnectionState::Closed,
            _ => ConnectionState::Disconnected,
        }
    }
}

/// Atomic wrapper around [`ConnectionState`]
pub struct AtomicConnectionState(AtomicU8);

impl AtomicConnectionState {
    pub fn new(state: ConnectionState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: ConnectionState) {
        self.0.store(state as u8, Ordering::Release);
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.get() == ConnectionState::Connected
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.get() == ConnectionState::Closed
    }
}

/// Atomic frame and reconnect counters
pub struct AtomicMetrics {
    frames_sent: AtomicU64,
    frames_received: AtomicU64,
    frames_dropped: AtomicU64,
    reconnects: AtomicU64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self {
            frames_sent: AtomicU64::new(0),
            frames_received: AtomicU64::new(0),
            frames_dropped: AtomicU64::new(0),
            reconnects: AtomicU64::new(0),
        }
    }

    pub fn increment_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reconnects(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped.load(Ordering::Relaxed)
    }

    pub fn reconnect_count(&self) -> u64 {
        self.reconnects.load(Ordering::Relaxed)
    }
}

impl Default for AtomicMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_roundtrip() {
        let state = AtomicConnectionState::new(ConnectionState::Disconnected);
        assert_eq!(state.get(), ConnectionState::Disconnected);
        assert!(!state.is_connected());

        state.set(ConnectionState::Connected);
        assert_eq!(state.get(), ConnectionState::Connected);
        assert!(state.is_connected());

        state.set(ConnectionState::Closed);
        assert!(state.is_closed());
        assert!(!state.is_connected());
    }

    #[test]
    fn test_metrics_counters() {
        let metrics = AtomicMetrics::new();
        metrics.increment_sent();
        metrics.increment_sent();
        metrics.increment_received();
        metrics.increment_dropped();
        metrics.increment_reconnects();

        assert_eq!(metrics.frames_sent(), 2);
        assert_eq!(metrics.frames_received(), 1);
        assert_eq!(metrics.frames_dropped(), 1);
        assert_eq!(metrics.reconnect_count(), 1);
    }
}
