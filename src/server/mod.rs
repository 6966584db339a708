//! # Relay Components
//!
//! - [`relay`]: the `POST /api/upload` route and its error mapping
//! - [`server`]: listener setup
//! - [`config`]: relay and backend settings

pub mod config;
pub mod relay;
pub mod server;

pub use config::RelayConfig;
pub use server::RelayServer;
