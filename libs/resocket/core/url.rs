//! Endpoint URL construction and subscription tag classification
//!
//! A channel endpoint is named by a URI prefix (carrying the `ws:`/`wss:`
//! scheme), a facility path segment, and an ordered list of channel tags.
//! Tags double as role markers: a `subscribe*` tag makes the channel apply
//! inbound frames to the local model, a `publish*` tag makes it push local
//! changes outbound.

/// Subscriber/publisher roles derived from channel tags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagRoles {
    /// Inbound frames are merged into the local model
    pub subscriber: bool,
    /// Local model changes are sent to the server
    pub publisher: bool,
}

impl TagRoles {
    /// Classify tags by their `subscribe*` / `publish*` prefixes
    ///
    /// A channel may be both, either, or neither.
    pub fn classify<S: AsRef<str>>(tags: &[S]) -> Self {
        let mut roles = Self::default();
        for tag in tags {
            let tag = tag.as_ref();
            if tag.starts_with("subscribe") {
                roles.subscriber = true;
            } else if tag.starts_with("publish") {
                roles.publisher = true;
            }
        }
        roles
    }
}

/// Build the connection URL: `prefix` + `facility` + `?` + tags joined by `&`
///
/// The caller supplies the scheme and host in `prefix` (normally ending in
/// `/`); this function only concatenates.
pub fn build_url<S: AsRef<str>>(prefix: &str, facility: &str, tags: &[S]) -> String {
    let joined = tags
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join("&");
    format!("{}{}?{}", prefix, facility, joined)
}
