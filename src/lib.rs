//! Upload-and-relay pipeline for identity card OCR.
//!
//! Two images (front and back of the card) are validated on the client tier,
//! relayed through [`server`] to an external OCR backend, and the extracted
//! fields or a normalized error come back.

pub mod client;
pub mod common;
pub mod server;

pub use common::error::NormalizedError;
pub use common::messages::{ExtractionResult, ImageFile, UploadRequest};
pub use server::RelayServer;
