use std::time::Duration;

/// Trait for defining reconnection strategies
///
/// Implement this trait to control how the channel should
/// behave when reconnecting after a disconnection.
pub trait ReconnectionStrategy: Send + Sync {
    /// Get the delay before the next reconnection attempt
    ///
    /// # Arguments
    /// * `attempt` - The reconnection attempt number (0-indexed, reset to 0
    ///   after every successful connection)
    ///
    /// # Returns
    /// * `Some(duration)` - Wait this long before reconnecting
    /// * `None` - Stop reconnecting
    fn next_delay(&self, attempt: usize) -> Option<Duration>;

    /// Reset the strategy state (called after successful connection)
    fn reset(&mut self);

    /// Check if we should continue reconnecting
    ///
    /// # Arguments
    /// * `attempt` - The current reconnection attempt number
    ///
    /// # Returns
    /// * `true` - Continue reconnecting
    /// * `false` - Stop reconnecting
    fn should_reconnect(&self, attempt: usize) -> bool;
}

/// Linear backoff reconnection strategy (the default)
///
/// The delay grows by a fixed step per consecutive failure and is capped:
/// step * (attempt + 1), up to max_delay. With the default step of 1 s and
/// ceiling of 10 s, consecutive failures wait 1 s, 2 s, ... 10 s, 10 s, ...
/// A successful connection resets the attempt counter, and with it the delay.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    step: Duration,
    max_delay: Duration,
}

impl LinearBackoff {
    /// Create a new linear backoff strategy
    ///
    /// # Arguments
    /// * `step` - The delay increment per consecutive failure
    /// * `max_delay` - The ceiling for the delay between reconnects
    pub fn new(step: Duration, max_delay: Duration) -> Self {
        Self { step, max_delay }
    }
}

impl Default for LinearBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), Duration::from_millis(10_000))
    }
}

impl ReconnectionStrategy for LinearBackoff {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        let step_ms = self.step.as_millis() as u64;
        let delay = step_ms.saturating_mul(attempt as u64 + 1);
        Some(Duration::from_millis(
            delay.min(self.max_delay.as_millis() as u64),
        ))
    }

    fn reset(&mut self) {
        // No state to reset; the attempt counter lives in the channel task
    }

    fn should_reconnect(&self, _attempt: usize) -> bool {
        true
    }
}

/// Exponential backoff reconnection strategy
///
/// Delays between reconnection attempts grow exponentially:
/// initial_delay * 2^attempt, capped at max_delay
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    max_attempts: Option<usize>,
}

impl ExponentialBackoff {
    /// Create a new exponential backoff strategy
    ///
    /// # Arguments
    /// * `initial_delay` - The initial delay before first reconnect
    /// * `max_delay` - The maximum delay between reconnects
    /// * `max_attempts` - Maximum number of attempts (None = unlimited)
    pub fn new(initial_delay: Duration, max_delay: Duration, max_attempts: Option<usize>) -> Self {
        Self {
            initial_delay,
            max_delay,
            max_attempts,
        }
    }
}

impl ReconnectionStrategy for ExponentialBackoff {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        if !self.should_reconnect(attempt) {
            return None;
        }

        let factor = u32::try_from(attempt)
            .ok()
            .and_then(|a| 2u64.checked_pow(a))
            .unwrap_or(u64::MAX);
        let delay = (self.initial_delay.as_millis() as u64).saturating_mul(factor);
        let delay = Duration::from_millis(delay.min(self.max_delay.as_millis() as u64));
        Some(delay)
    }

    fn reset(&mut self) {
        // No state to reset for exponential backoff
    }

    fn should_reconnect(&self, attempt: usize) -> bool {
        self.max_attempts.map_or(true, |max| attempt < max)
    }
}

/// Never reconnect strategy
///
/// The channel will not attempt to reconnect after disconnection
#[derive(Debug, Clone)]
pub struct NeverReconnect;

impl ReconnectionStrategy for NeverReconnect {
    fn next_delay(&self, _attempt: usize) -> Option<Duration> {
        None
    }

    fn reset(&mut self) {
        // No state to reset
    }

    fn should_reconnect(&self, _attempt: usize) -> bool {
        false
    }
}
