use crate::core::heartbeat::HeartbeatConfig;
use crate::core::model::SharedModel;
use crate::core::url::TagRoles;
use crate::traits::ReconnectionStrategy;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Configuration for a channel
///
/// This struct holds everything the channel task needs to run. It is built
/// by [`crate::core::builder::ChannelBuilder`] and consumed by the task;
/// there is no process-wide configuration.
pub struct ChannelConfig {
    /// Connection URL (ws:// or wss://)
    pub(crate) url: String,

    /// Subscriber/publisher roles derived from the channel tags
    pub(crate) roles: TagRoles,

    /// The local model container, required for subscriber/publisher channels
    pub(crate) model: Option<Arc<SharedModel>>,

    /// Optional heartbeat policy; absent means no heartbeat traffic is
    /// sent or expected
    pub(crate) heartbeat: Option<HeartbeatConfig>,

    /// Reconnection strategy
    pub(crate) reconnect_strategy: Box<dyn ReconnectionStrategy>,

    /// Shutdown flag - when false, prevents reconnection attempts
    /// This allows graceful shutdown and external shutdown coordination
    pub(crate) shutdown_flag: Arc<AtomicBool>,
}

impl ChannelConfig {
    /// Get a reference to the URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Check if inbound frames are merged into the model
    pub fn is_subscriber(&self) -> bool {
        self.roles.subscriber
    }

    /// Check if local model changes are pushed outbound
    pub fn is_publisher(&self) -> bool {
        self.roles.publisher
    }

    /// Check if heartbeat is configured
    pub fn has_heartbeat(&self) -> bool {
        self.heartbeat.is_some()
    }
}
