//! Observer server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) and
//! `OBSERVER_*` environment variables, opens the configured event store, and
//! serves the relay and stats endpoints over HTTP. On shutdown every cached
//! guild gets its end-of-session boundary.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use chrono::Utc;
use clap::Parser;
use observer_api::{PresenceCache, StatusTracker, Tracker};
use observer_core::store::EventStore;
use observer_server::{
  ServerConfig, StoreConfig,
  settings::{environment, expand_tilde},
};
use observer_store_document::DocumentStore;
use observer_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Observer presence tracker")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the resolved configuration and exit.
  #[arg(long)]
  check_config: bool,
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

  let server_cfg = ServerConfig::load(&cli.config, environment())
    .context("failed to load ServerConfig")?;

  if cli.check_config {
    println!("{}", serde_json::to_string_pretty(&server_cfg)?);
    return Ok(());
  }

  match &server_cfg.store {
    StoreConfig::Sqlite { path, busy_timeout_ms } => {
      let path = expand_tilde(path);
      let store = SqliteStore::open_with_timeout(
        &path,
        Duration::from_millis(*busy_timeout_ms),
      )
      .await
      .with_context(|| format!("failed to open store at {path:?}"))?;
      serve(store, &server_cfg).await
    }
    StoreConfig::Document { path } => {
      let path = expand_tilde(path);
      let store = DocumentStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      serve(store, &server_cfg).await
    }
  }
}

async fn serve<S>(store: S, server_cfg: &ServerConfig) -> anyhow::Result<()>
where
  S: EventStore + 'static,
{
  let tracker: Arc<Tracker<S>> = Arc::new(StatusTracker::new(
    store,
    PresenceCache::new(),
    server_cfg.guild_ids.iter().copied(),
  ));

  let app = observer_api::router(tracker.clone()).layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  tracing::info!("session starts are recorded as the relay posts ready for each guild");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  close_sessions(&tracker).await;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(error) = tokio::signal::ctrl_c().await {
    tracing::error!(%error, "failed to listen for ctrl-c");
  }
  tracing::info!("shutting down");
}

/// Record shutdown boundaries for every guild the relay announced.
async fn close_sessions<S: EventStore>(tracker: &Tracker<S>) {
  let now = Utc::now();
  for guild_id in tracker.directory().guilds().await {
    if let Err(error) = tracker.end_session(guild_id, now).await {
      tracing::error!(guild_id, %error, "failed to record session end");
    }
  }
}
