//! # Relay Server
//!
//! Binds the listener and serves the relay router. All per-request behaviour
//! lives in [`relay`](super::relay).

use anyhow::Result;
use log::info;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::config::RelayConfig;
use super::relay::{build_router, AppState};

pub struct RelayServer {
    config: RelayConfig,
}

impl RelayServer {
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Bind the configured address and serve until the process is stopped.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.relay.listen_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let state = Arc::new(AppState::from_config(&self.config.backend)?);
        let app = build_router(state, &self.config.relay);

        let addr = listener.local_addr()?;
        info!("🌐 Relay running on http://{}", addr);
        info!("📡 Upload endpoint: http://{}/api/upload", addr);
        info!(
            "🔗 Forwarding to {} (health {}s, forward {}s)",
            self.config.backend.url,
            self.config.backend.health_timeout_secs,
            self.config.backend.forward_timeout_secs
        );
        if let Some(dir) = &self.config.relay.static_dir {
            info!("🗂️ Serving static files from {}", dir);
        }

        axum::serve(listener, app).await?;
        Ok(())
    }
}
