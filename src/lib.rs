//! ModelSync - three-way model synchronization over resilient websockets
//!
//! A local JSON model is kept in sync with server-pushed frames, and local
//! changes can be pushed back, over a channel that survives disconnects via
//! heartbeat liveness detection and bounded-backoff reconnection.
//!
//! ## Usage in Binaries
//!
//! ```rust,ignore
//! use modelsync::bin_common::{init_tracing, EndpointSettings};
//! use modelsync::resocket::SharedModel;
//! ```

// Re-export workspace libraries for convenience
pub use resocket;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables
    //!
    //! Environment-driven endpoint settings and tracing setup shared by
    //! the demo binaries.

    pub mod cli;
    pub mod logging;

    pub use self::cli::EndpointSettings;
    pub use self::logging::init_tracing;
}
