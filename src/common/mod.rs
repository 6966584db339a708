//! # Common Components
//!
//! Shared utilities and data structures used by both the client tier and the relay.
//!
//! ## Modules
//!
//! - [`messages`]: Upload payload, extraction result and error body wire types
//! - [`error`]: The single error-normalization table both tiers go through
//! - [`config`]: Configuration loading and environment overrides
//! - [`logging`]: Logger initialization for the binaries

pub mod config;
pub mod error;
pub mod logging;
pub mod messages;
