//! Handler for `POST /reindex`: rebuilds every collection's index on demand
//! and returns the per-directory report.

use std::sync::Arc;

use axum::{Json, extract::State};
use rwhois_core::{
  Directory,
  reindex::{ReindexReport, Reindexer},
  store::RecordStore,
};

/// `POST /reindex`
pub async fn handler<S, R>(State(directory): State<Arc<Directory<S, R>>>) -> Json<ReindexReport>
where
  S: RecordStore,
  R: Reindexer,
{
  Json(directory.rebuild_indexes().await)
}
