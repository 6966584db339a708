//! # Relay Binary Entry Point
//!
//! Serves `POST /api/upload` and forwards uploads to the OCR backend.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin relay
//! cargo run --bin relay -- --config config/relay.toml
//! BACKEND_URL=http://ocr.internal:5000 cargo run --bin relay -- --listen 0.0.0.0:3000
//! ```

use clap::Parser;

use aadhaar_relay::common::config::process_env;
use aadhaar_relay::common::logging::init_logger;
use aadhaar_relay::server::{RelayConfig, RelayServer};

/// Command-line arguments for the relay binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the relay configuration file (TOML format)
    ///
    /// Example: config/relay.toml
    #[arg(short, long)]
    config: Option<String>,

    /// Address to listen on, overriding the configuration file
    #[arg(short, long)]
    listen: Option<String>,

    /// Directory with a built front-end to serve next to the API
    #[arg(long)]
    static_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RelayConfig::from_file(path)?,
        None => RelayConfig::default(),
    };
    config.apply_env(process_env);

    if let Some(listen) = args.listen {
        config.relay.listen_addr = listen;
    }
    if let Some(dir) = args.static_dir {
        config.relay.static_dir = Some(dir);
    }

    RelayServer::new(config).run().await
}
