//! JSON REST API over an RWHOIS [`Directory`].
//!
//! Exposes an axum [`Router`] backed by any [`RecordStore`] and
//! [`Reindexer`] pair. Every route sits behind HTTP Basic auth; TLS is the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rwhois_api::api_router(directory, auth))
//! ```

pub mod auth;
pub mod error;
pub mod etag;
pub mod records;
pub mod reindex;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router, middleware,
  routing::{get, post},
};
use rwhois_core::{Directory, reindex::Reindexer, store::RecordStore};
use rwhois_store_fs::IndexerConfig;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use auth::AuthConfig;
pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `rwhois-apid.toml` and
/// `RWHOIS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  #[serde(default = "default_data_dir")]
  pub data_dir:           PathBuf,
  #[serde(default)]
  pub indexer:            IndexerConfig,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 4322 }

fn default_data_dir() -> PathBuf { PathBuf::from("/usr/local/rwhoisd/data") }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `directory`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, R>(directory: Arc<Directory<S, R>>, auth: Arc<AuthConfig>) -> Router<()>
where
  S: RecordStore + 'static,
  R: Reindexer + 'static,
{
  Router::new()
    // Records
    .route("/records", post(records::create::<S, R>))
    .route("/records/{kind}", get(records::list::<S, R>))
    .route(
      "/records/{kind}/{handle}",
      get(records::get_one::<S, R>)
        .patch(records::update_one::<S, R>)
        .delete(records::delete_one::<S, R>),
    )
    // Indexing
    .route("/reindex", post(reindex::handler::<S, R>))
    .with_state(directory)
    .layer(middleware::from_fn_with_state(auth, auth::require_auth))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests;
