//! CLI utilities for binaries
//!
//! Handles endpoint settings from environment variables for the demo
//! executables.

/// Channel endpoint settings, read from the environment
///
/// | Variable             | Default                       |
/// |----------------------|-------------------------------|
/// | `MODELSYNC_URI`      | `ws://127.0.0.1:8000/ws/`     |
/// | `MODELSYNC_FACILITY` | `dashboard`                   |
/// | `MODELSYNC_TAGS`     | `subscribe-broadcast` (comma-separated) |
/// | `MODELSYNC_HEARTBEAT`| unset (no heartbeat)          |
/// | `MODELSYNC_MODEL`    | same as the facility           |
#[derive(Debug, Clone)]
pub struct EndpointSettings {
    /// URI prefix carrying the ws:/wss: scheme, normally ending in `/`
    pub uri_prefix: String,
    /// Facility path segment appended to the prefix
    pub facility: String,
    /// Channel tags (subscribe*/publish* prefixes derive the roles)
    pub tags: Vec<String>,
    /// Optional heartbeat sentinel message
    pub heartbeat: Option<String>,
    /// Name of the local model container
    pub model_name: String,
}

impl EndpointSettings {
    /// Load settings from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let uri_prefix = std::env::var("MODELSYNC_URI")
            .unwrap_or_else(|_| "ws://127.0.0.1:8000/ws/".to_string());
        let facility =
            std::env::var("MODELSYNC_FACILITY").unwrap_or_else(|_| "dashboard".to_string());
        let tags = std::env::var("MODELSYNC_TAGS")
            .unwrap_or_else(|_| "subscribe-broadcast".to_string())
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        let heartbeat = std::env::var("MODELSYNC_HEARTBEAT").ok();
        let model_name = std::env::var("MODELSYNC_MODEL").unwrap_or_else(|_| facility.clone());

        Self {
            uri_prefix,
            facility,
            tags,
            heartbeat,
            model_name,
        }
    }

    /// The full URL these settings resolve to
    pub fn url(&self) -> String {
        resocket::build_url(&self.uri_prefix, &self.facility, &self.tags)
    }
}
