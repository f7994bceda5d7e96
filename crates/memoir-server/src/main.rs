//! Memoir server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the JSON API over HTTP.
//!
//! # Bulk import
//!
//! To load a person record from a JSON file without going through HTTP:
//!
//! ```
//! cargo run -p memoir-server --bin server -- import person.json --update
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use memoir_core::{
  import::{ImportMode, ImportRecord},
  store::BioStore as _,
};
use memoir_server::ServerConfig;
use memoir_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Memoir biography server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Load one person record from a JSON file and exit.
  Import {
    /// Path to the JSON file.
    file:   PathBuf,
    /// Update an existing person of the same name instead of appending.
    #[arg(long)]
    update: bool,
  },
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
    .add_source(config::Environment::with_prefix("MEMOIR"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  // Helper mode: run a bulk import and exit.
  if let Some(Command::Import { file, update }) = cli.command {
    return run_import(&store, &file, update).await;
  }

  let app = memoir_server::router(store);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn run_import(
  store: &SqliteStore,
  file: &Path,
  update: bool,
) -> anyhow::Result<()> {
  let json = tokio::fs::read_to_string(file)
    .await
    .with_context(|| format!("failed to read {file:?}"))?;
  let record = ImportRecord::from_json(&json)
    .with_context(|| format!("failed to parse {file:?}"))?;
  let mode = if update { ImportMode::Update } else { ImportMode::Create };

  let outcome = store.import_person(record, mode).await?;

  for label in &outcome.skipped {
    tracing::warn!(event = %label, "skipped incomplete life event");
  }
  tracing::info!(
    person_id = %outcome.person_id,
    created = outcome.created,
    events = outcome.events_created,
    "import finished"
  );
  println!("{}", serde_json::to_string_pretty(&outcome)?);
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
