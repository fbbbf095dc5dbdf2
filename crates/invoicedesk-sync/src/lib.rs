//! Transport to the remote directory and classification services.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{ApiClient, Health, SyncError};
