//! barangay-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered under
//! `BARANGAY_*` environment variables, opens the SQLite store, loads the
//! resident snapshot, and serves the admin JSON API over HTTP.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use barangay_api::{ApiState, api_router};
use barangay_core::sync::{ReloadOutcome, SyncAdapter};
use barangay_media::{LocalObjectStore, UrlSigner, generate_secret};
use barangay_server::{NominatimGeocoder, ServerConfig, settings::expand_tilde};
use barangay_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Upper bound on a single reverse-geocoding request.
const GEOCODER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(author, version, about = "Barangay resident registry server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("BARANGAY"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open SQLite store and load the first snapshot.
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let adapter = Arc::new(SyncAdapter::new(Arc::new(store)));
  if let ReloadOutcome::Applied { count } = adapter
    .reload()
    .await
    .context("failed to load residents")?
  {
    tracing::info!(count, "resident snapshot loaded");
  }
  if server_cfg.live_reload {
    adapter.clone().follow();
    tracing::info!("live reload enabled");
  }

  // Media storage.
  let media_dir = expand_tilde(&server_cfg.media_dir);
  tokio::fs::create_dir_all(&media_dir)
    .await
    .with_context(|| format!("failed to create media dir {media_dir:?}"))?;
  let secret = match &server_cfg.signing_secret {
    Some(secret) => secret.clone(),
    None => {
      tracing::warn!("no signing_secret configured; signed media URLs will not survive a restart");
      generate_secret()
    }
  };
  let signer = UrlSigner::new(secret).context("failed to build media URL signer")?;
  let media = LocalObjectStore::new(media_dir, server_cfg.base_url(), signer);

  let geocoder = NominatimGeocoder::new(
    &server_cfg.geocoder_url,
    &server_cfg.geocoder_user_agent,
    GEOCODER_TIMEOUT,
  )
  .context("failed to build geocoder client")?;

  // Build application state.
  let state = ApiState {
    adapter,
    media: Arc::new(media),
    geocoder: Arc::new(geocoder),
    media_ttl: server_cfg.signed_url_ttl(),
  };

  let app = api_router(state).layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
