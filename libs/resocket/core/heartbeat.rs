//! Heartbeat liveness detection
//!
//! The channel optionally exchanges a sentinel message with the server to
//! detect silently-dead connections faster than transport-level timeouts:
//!
//! ```text
//! every interval:  missed += 1
//!                  missed > max_missed ?  force-close -> reconnect path
//!                  otherwise             send sentinel frame
//! on inbound frame == sentinel:          missed = 0, frame discarded
//! ```
//!
//! The sentinel is compared by exact string equality against every inbound
//! frame's raw text, before any JSON parsing. A matching frame never reaches
//! the model.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Heartbeat policy: sentinel message, probe interval, allowed misses
///
/// With the defaults (5 s interval, 3 allowed misses) a dead connection is
/// detected on the 4th silent interval, roughly 20 s after the last reply.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// The sentinel message exchanged with the server
    pub message: String,
    /// Interval between probes
    pub interval: Duration,
    /// Number of consecutive unanswered intervals tolerated before the
    /// connection is presumed dead
    pub max_missed: u32,
}

impl HeartbeatConfig {
    /// Create a heartbeat policy with the default 5 s interval and
    /// 3 allowed misses
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            interval: Duration::from_millis(5000),
            max_missed: 3,
        }
    }

    /// Override the probe interval
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Override the allowed-miss threshold
    pub fn max_missed(mut self, max_missed: u32) -> Self {
        self.max_missed = max_missed;
        self
    }
}

/// Tracks consecutive unanswered heartbeat intervals
///
/// Uses an atomic counter for lock-free access: the channel task increments
/// on each timer fire, the inbound path resets when the sentinel arrives.
pub struct MissedBeats(AtomicU32);

impl MissedBeats {
    pub fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Record a heartbeat reply; the miss streak starts over
    pub fn beat(&self) {
        self.0.store(0, Ordering::Release);
    }

    /// Record a timer fire; returns the new consecutive-miss count
    ///
    /// The count is incremented before the caller compares it against the
    /// threshold, so with `max_missed = 3` the 4th silent fire is the breach.
    pub fn tick(&self) -> u32 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Current consecutive-miss count
    pub fn missed(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for MissedBeats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let missed = MissedBeats::new();
        assert_eq!(missed.missed(), 0);
    }

    #[test]
    fn test_ticks_accumulate() {
        let missed = MissedBeats::new();
        assert_eq!(missed.tick(), 1);
        assert_eq!(missed.tick(), 2);
        assert_eq!(missed.tick(), 3);
        assert_eq!(missed.missed(), 3);
    }

    #[test]
    fn test_beat_resets_streak() {
        let missed = MissedBeats::new();
        missed.tick();
        missed.tick();
        missed.beat();
        assert_eq!(missed.missed(), 0);
        // The streak restarts from 1 on the next silent interval
        assert_eq!(missed.tick(), 1);
    }

    #[test]
    fn test_threshold_breach_on_fourth_silent_fire() {
        let config = HeartbeatConfig::new("--heartbeat--");
        let missed = MissedBeats::new();

        // 3 allowed misses: fires 1..=3 stay under the threshold
        for _ in 0..3 {
            assert!(missed.tick() <= config.max_missed);
        }
        // The 4th silent fire exceeds it
        assert!(missed.tick() > config.max_missed);
    }

    #[test]
    fn test_config_defaults() {
        let config = HeartbeatConfig::new("--heartbeat--");
        assert_eq!(config.message, "--heartbeat--");
        assert_eq!(config.interval, Duration::from_millis(5000));
        assert_eq!(config.max_missed, 3);

        let config = config
            .interval(Duration::from_millis(100))
            .max_missed(5);
        assert_eq!(config.interval, Duration::from_millis(100));
        assert_eq!(config.max_missed, 5);
    }
}
