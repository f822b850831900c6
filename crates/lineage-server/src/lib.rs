//! HTTP server for Lineage: configuration, the top-level router and the
//! remote sync worker.

pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use axum::Router;
use lineage_api::ApiState;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `LINEAGE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Directory of `person_<id>.png` avatars, removed when a person is.
  #[serde(default)]
  pub avatar_dir: Option<PathBuf>,
  /// Newly created persons are POSTed here when set.
  #[serde(default)]
  pub sync_url:   Option<String>,
}

/// Load configuration from `path` (which need not exist), with environment
/// variables taking precedence.
pub fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080)?
    .set_default("store_path", "~/.local/share/lineage/lineage.db")?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("LINEAGE"))
    .build()
    .context("failed to read config file")?;

  settings.try_deserialize().context("failed to deserialise ServerConfig")
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The API mounted under `/api`, with request tracing.
pub fn router(state: ApiState) -> Router {
  Router::new()
    .nest("/api", lineage_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}
