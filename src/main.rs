//! Contact Records Service
//!
//! A small REST API over a document-style record store.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser form
//!          │  JSON
//!          ▼
//!   ┌──────────────────────────────────────────────────────────┐
//!   │ http::server   trace → request id → CORS → body limit    │
//!   │      │                                                   │
//!   │      ▼                                                   │
//!   │ http::middleware   validate_record (PUT, optional POST)  │
//!   │      │                                                   │
//!   │      ▼                                                   │
//!   │ http::handlers  ──▶  store::RecordStore  ──▶  memory/file │
//!   │      │                                                   │
//!   │      ▼                                                   │
//!   │ http::envelope  { success, message, data, errors }       │
//!   └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use contact_records::config::load_config;
use contact_records::lifecycle::Shutdown;
use contact_records::observability::{logging, metrics};
use contact_records::{store, HttpServer};

#[derive(Parser)]
#[command(name = "contact-records")]
#[command(about = "REST API for contact records", long_about = None)]
struct Args {
    /// Optional TOML configuration file; environment variables (and `.env`) override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    // A `.env` file in the working directory fills in unset variables.
    dotenvy::dotenv().ok();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("contact-records v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        validate_on_create = config.records.validate_on_create,
        max_body_bytes = config.limits.max_body_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // A store that cannot be opened is logged; requests then fail individually.
    let store = store::connect_or_degrade(&config.store.uri).await;

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Server listening");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    HttpServer::new(config, store)
        .run(listener, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
