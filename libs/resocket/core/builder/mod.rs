pub mod states;

use crate::core::channel::Channel;
use crate::core::config::ChannelConfig;
use crate::core::heartbeat::HeartbeatConfig;
use crate::core::model::SharedModel;
use crate::core::url::{build_url, TagRoles};
use crate::core::ws::WsTransport;
use crate::traits::*;
use self::states::*;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Type-state builder for [`Channel`]
///
/// This builder uses Rust's type system to enforce that the endpoint URL
/// is set before the channel can be opened. All configuration is explicit
/// and per-channel; there is no process-wide state.
pub struct ChannelBuilder<U, T>
where
    U: UrlState,
    T: Transport,
{
    _state: TypeState<U>,
    transport: T,
    url: Option<String>,
    roles: TagRoles,
    model: Option<Arc<SharedModel>>,
    heartbeat: Option<HeartbeatConfig>,
    reconnect_strategy: Option<Box<dyn ReconnectionStrategy>>,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl ChannelBuilder<NoUrl, WsTransport> {
    /// Create a new builder instance with the production websocket transport
    pub fn new() -> Self {
        Self {
            _state: TypeState::new(),
            transport: WsTransport,
            url: None,
            roles: TagRoles::default(),
            model: None,
            heartbeat: None,
            reconnect_strategy: None,
            shutdown_flag: None,
        }
    }
}

impl Default for ChannelBuilder<NoUrl, WsTransport> {
    fn default() -> Self {
        Self::new()
    }
}

// URL setting
impl<T> ChannelBuilder<NoUrl, T>
where
    T: Transport,
{
    /// Set a fully-formed connection URL
    ///
    /// Roles default to neither subscriber nor publisher; combine with
    /// [`subscriber`](ChannelBuilder::subscriber) /
    /// [`publisher`](ChannelBuilder::publisher) as needed.
    pub fn url(self, url: impl Into<String>) -> ChannelBuilder<HasUrl, T> {
        ChannelBuilder {
            _state: TypeState::new(),
            transport: self.transport,
            url: Some(url.into()),
            roles: self.roles,
            model: self.model,
            heartbeat: self.heartbeat,
            reconnect_strategy: self.reconnect_strategy,
            shutdown_flag: self.shutdown_flag,
        }
    }

    /// Build the URL from a prefix, facility, and channel tags, and derive
    /// the subscriber/publisher roles from the tags' prefixes
    ///
    /// # Example
    /// ```ignore
    /// builder.endpoint("wss://host/ws/", "room1", &["subscribe-updates"])
    /// ```
    pub fn endpoint<S: AsRef<str>>(
        self,
        prefix: &str,
        facility: &str,
        tags: &[S],
    ) -> ChannelBuilder<HasUrl, T> {
        let roles = TagRoles::classify(tags);
        let url = build_url(prefix, facility, tags);
        ChannelBuilder {
            _state: TypeState::new(),
            transport: self.transport,
            url: Some(url),
            roles,
            model: self.model,
            heartbeat: self.heartbeat,
            reconnect_strategy: self.reconnect_strategy,
            shutdown_flag: self.shutdown_flag,
        }
    }
}

// Optional configuration methods
impl<U, T> ChannelBuilder<U, T>
where
    U: UrlState,
    T: Transport,
{
    /// Substitute the transport (e.g. a scripted fake in tests)
    pub fn transport<NewT: Transport>(self, transport: NewT) -> ChannelBuilder<U, NewT> {
        ChannelBuilder {
            _state: TypeState::new(),
            transport,
            url: self.url,
            roles: self.roles,
            model: self.model,
            heartbeat: self.heartbeat,
            reconnect_strategy: self.reconnect_strategy,
            shutdown_flag: self.shutdown_flag,
        }
    }

    /// Attach the shared model this channel synchronizes
    ///
    /// Required for subscriber and publisher channels.
    pub fn model(mut self, model: Arc<SharedModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Override the subscriber role (normally derived from the tags)
    pub fn subscriber(mut self, subscriber: bool) -> Self {
        self.roles.subscriber = subscriber;
        self
    }

    /// Override the publisher role (normally derived from the tags)
    pub fn publisher(mut self, publisher: bool) -> Self {
        self.roles.publisher = publisher;
        self
    }

    /// Enable heartbeat liveness detection
    ///
    /// Without this, no heartbeat traffic is sent or expected.
    pub fn heartbeat(mut self, config: HeartbeatConfig) -> Self {
        self.heartbeat = Some(config);
        self
    }

    /// Set the reconnection strategy (default: [`LinearBackoff`])
    pub fn reconnect_strategy(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.reconnect_strategy = Some(Box::new(strategy));
        self
    }

    /// Set a custom shutdown flag for coordinated shutdown across components
    ///
    /// By default, the channel creates an internal shutdown flag. When the
    /// flag is set to `false`, the channel will not attempt reconnection
    /// and will gracefully shut down.
    pub fn shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }
}

// Open method - only available once the URL is set
impl<T> ChannelBuilder<HasUrl, T>
where
    T: Transport,
{
    /// Validate the configuration and spawn the channel task
    ///
    /// Returns immediately; use [`Channel::wait_connected`] to observe the
    /// first connection attempt's outcome.
    pub async fn open(self) -> Result<Channel> {
        let url = self.url.expect("url is set by the type-state builder");

        if (self.roles.subscriber || self.roles.publisher) && self.model.is_none() {
            return Err(ChannelError::Configuration(
                "subscriber/publisher channels require a model".into(),
            ));
        }

        let shutdown_flag = self
            .shutdown_flag
            .unwrap_or_else(|| Arc::new(AtomicBool::new(true)));

        let reconnect_strategy = self
            .reconnect_strategy
            .unwrap_or_else(|| Box::new(LinearBackoff::default()));

        let config = ChannelConfig {
            url,
            roles: self.roles,
            model: self.model,
            heartbeat: self.heartbeat,
            reconnect_strategy,
            shutdown_flag,
        };

        Ok(Channel::spawn(self.transport, config))
    }
}
