//! Packigo Server
//!
//! Serves the bookings, fleet and settings API plus the realtime channel.
//!
//! # Configuration
//!
//! Config file (default `~/.config/packigo/config.yaml`):
//!
//! ```yaml
//! port: 3000
//! bookings_file: /var/lib/packigo/bookings.json
//! public_dir: public
//! credentials_path: serviceAccountKey.json
//! database_url: https://packigo-app-default-rtdb.firebaseio.com
//! ```
//!
//! Environment variables:
//! - `PACKIGO_PORT`, `PACKIGO_BOOKINGS_FILE`, `PACKIGO_PUBLIC_DIR`,
//!   `PACKIGO_CREDENTIALS_PATH`, `PACKIGO_DATABASE_URL`: override the file
//! - `FIREBASE_SERVICE_ACCOUNT`: service account key JSON, takes precedence
//!   over the credentials file
//!
//! Without credentials the server runs in local mode: bookings go to the
//! bookings file, fleet and settings are read-only defaults.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use packigo::config::{Config, Credentials};
use packigo::server::{self, AppState};
use packigo::store::{FileStore, FirebaseStore, RecordStore, StoreSelector};

#[derive(Parser)]
#[command(name = "packigo-server")]
#[command(version)]
#[command(about = "Packigo bookings and fleet server", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Port to listen on, overrides the config
    #[arg(long, short)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "packigo=info,packigo_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config)?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let fallback = FileStore::new(&config.bookings_file);
    fallback.init().await?;
    tracing::info!("Bookings file: {}", config.bookings_file.display());

    // Decided once: a primary store exists for the whole run or not at all.
    let primary = Credentials::load(&config).and_then(|credentials| {
        match FirebaseStore::new(&credentials) {
            Ok(store) => {
                tracing::info!("Using Realtime Database at {}", credentials.database_url);
                Some(Arc::new(store) as Arc<dyn RecordStore>)
            }
            Err(e) => {
                tracing::error!("Failed to initialize Realtime Database: {}", e);
                None
            }
        }
    });
    if primary.is_none() {
        tracing::warn!("No valid credentials found, running in local mode");
    }

    let state = AppState::new(StoreSelector::new(primary, fallback));
    let app = server::router(state, Some(&config.public_dir));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
