// Library exports for the bsync binary and its tests

/// HTTP transport implementing the bucket remote
pub mod http;
/// Logging, panic reporting and interrupt handling
pub mod process;
/// On-disk configuration
pub mod state;

pub use http::HttpRemote;
pub use state::{AppConfig, AppState, StateError};
