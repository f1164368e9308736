//! HTTP server for Wishify.
//!
//! Loads [`ServerConfig`], opens the SQLite store, and serves the JSON API
//! under `/api`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::{Router, routing::get};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use url::Url;
use wishify_core::{store::KeyValueStore, wishlist::Wishlist};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `WISHIFY_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Page URL that share links point at; `?list=<token>` is appended.
  pub public_url: Url,
}

impl ServerConfig {
  /// Read `path` (optional) layered under the environment, over defaults.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .set_default("store_path", "wishify.db")?
      .set_default("public_url", "http://localhost:8080/")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("WISHIFY"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The complete application: API under `/api`, a health check, and request
/// tracing.
pub fn app<S>(wishlist: Arc<Wishlist<S>>, public_url: Url) -> Router
where
  S: KeyValueStore + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", wishify_api::api_router(wishlist, public_url))
    .layer(TraceLayer::new_for_http())
}
