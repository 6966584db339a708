//! # Client Tier
//!
//! Everything that runs on the uploading side, leaf first:
//!
//! - [`validation`]: rejects bad selections before any network call
//! - [`preview`]: scoped preview references for the selected images
//! - [`transport`]: configured HTTP client that normalizes every failure
//! - [`upload`]: multipart upload and health check on top of the transport
//! - [`render`]: text presentation of results and errors
//! - [`config`]: client settings
//!
//! The relay reuses [`transport`] and [`upload`] for its own backend calls.

pub mod config;
pub mod preview;
pub mod render;
pub mod transport;
pub mod upload;
pub mod validation;

pub use config::ClientConfig;
pub use transport::TransportClient;
pub use upload::UploadService;
