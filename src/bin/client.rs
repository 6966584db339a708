//! # Client Binary Entry Point
//!
//! Command-line stand-in for the upload form: picks the two images, runs the
//! validation gate, uploads them through the relay and prints the result.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin client -- --front card_front.jpg --back card_back.png
//! cargo run --bin client -- --front f.jpg --back b.jpg --relay http://localhost:3000 --copy aadhaar
//! ```
//!
//! The client will:
//! 1. Load configuration (file, then `NEXT_PUBLIC_BACKEND_URL`, then `--relay`)
//! 2. Read both files and declare their MIME types from the extension
//! 3. Validate the selection before any network call
//! 4. Acquire previews of the selection
//! 5. Upload to `{relay}/api/upload` and render the result or the error

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use aadhaar_relay::client::config::ClientConfig;
use aadhaar_relay::client::preview::{PreviewRegistry, PreviewSlot};
use aadhaar_relay::client::render::{render_error, render_result, CopyTracker, Field};
use aadhaar_relay::client::upload::RELAY_UPLOAD_PATH;
use aadhaar_relay::client::validation::{into_request, read_selection};
use aadhaar_relay::client::{TransportClient, UploadService};
use aadhaar_relay::common::config::process_env;
use aadhaar_relay::common::logging::init_logger;
use aadhaar_relay::{NormalizedError, UploadRequest};

/// Command-line arguments for the client binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image of the front of the card (JPEG or PNG, at most 5MB)
    #[arg(long)]
    front: Option<PathBuf>,

    /// Image of the back of the card (JPEG or PNG, at most 5MB)
    #[arg(long)]
    back: Option<PathBuf>,

    /// Relay origin, overriding configuration and environment
    #[arg(long)]
    relay: Option<String>,

    /// Path to the client configuration file (TOML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Print the raw result JSON instead of the rendered view
    #[arg(long)]
    json: bool,

    /// Copy one field (name, dob, aadhaar, pincode, address) to stdout
    #[arg(long)]
    copy: Option<Field>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_logger();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    config.apply_env(process_env);
    if let Some(relay) = &args.relay {
        config.target_url = relay.clone();
    }

    let request = match select(&args).await {
        Ok(request) => request,
        Err(err) => {
            eprintln!("{}", render_error(&err));
            return Ok(ExitCode::FAILURE);
        }
    };

    let registry = PreviewRegistry::new();
    let mut previews = PreviewSlot::new();
    let pair = previews.replace(registry.create_pair(&request));
    info!("🖼️ Front preview {} ({})", pair.front.url(), request.front.name);
    info!("🖼️ Back preview {} ({})", pair.back.url(), request.back.name);

    let transport = TransportClient::new(&config.target_url, Duration::from_secs(config.timeout_secs))?;
    let service = UploadService::new(transport).with_upload_path(RELAY_UPLOAD_PATH);

    info!("📤 Sending request to {}{}", config.target_url, RELAY_UPLOAD_PATH);
    let result = match service.upload_images(request).await {
        Ok(result) => result,
        Err(err) => {
            error!("❌ Upload failed: {}", err);
            eprintln!("{}", render_error(&err));
            return Ok(ExitCode::FAILURE);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render_result(&result));
    }

    if let Some(field) = args.copy {
        let mut tracker = CopyTracker::new();
        let now = Instant::now();
        match tracker.copy(&result, field, now) {
            Some(value) => {
                println!("{}", value);
                if tracker.copied_field(Instant::now()) == Some(field) {
                    eprintln!("Copied! ({})", field.label());
                }
            }
            None => eprintln!("{} has nothing to copy", field.label()),
        }
    }

    previews.clear();
    Ok(ExitCode::SUCCESS)
}

/// Read and validate both selected files.
async fn select(args: &Args) -> Result<UploadRequest, NormalizedError> {
    let front = read_selection(args.front.as_deref()).await?;
    let back = read_selection(args.back.as_deref()).await?;
    into_request(front, back)
}
