//! Handlers for `/records` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/records/:kind` | Optional `?subtype=ipv4\|ipv6\|asn` for networks |
//! | `POST`   | `/records` | Body: `{"kind":"org","handle":"ORG-1",...}` |
//! | `GET`    | `/records/:kind/:handle` | 404 if not found; sets `ETag` |
//! | `PATCH`  | `/records/:kind/:handle` | Body: `{"field":"phone","value":"999"}` |
//! | `DELETE` | `/records/:kind/:handle` | 204 on success |
//!
//! Unknown network subtypes address the flat `network` collection.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use rwhois_core::{
  Directory,
  record::{Collection, Handle, NewRecord, RecordKey, RecordKind},
  reindex::{ReindexReport, Reindexer},
  store::RecordStore,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, etag::compute_etag};

#[derive(Debug, Deserialize)]
pub struct SubtypeParams {
  pub subtype: Option<String>,
}

fn collection(kind: &str, params: &SubtypeParams) -> Result<Collection, ApiError> {
  let kind = RecordKind::parse(kind)?;
  Ok(Collection::for_kind(kind, params.subtype.as_deref()))
}

fn record_key(kind: &str, handle: String, params: &SubtypeParams) -> Result<RecordKey, ApiError> {
  Ok(RecordKey::new(collection(kind, params)?, Handle::new(handle)?))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /records/:kind[?subtype=<subtype>]`
pub async fn list<S, R>(
  State(directory): State<Arc<Directory<S, R>>>,
  Path(kind): Path<String>,
  Query(params): Query<SubtypeParams>,
) -> Result<Json<Vec<Handle>>, ApiError>
where
  S: RecordStore,
  R: Reindexer,
{
  let handles = directory
    .list(collection(&kind, &params)?)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(handles))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Created {
  pub key:     RecordKey,
  pub reindex: ReindexReport,
}

/// `POST /records`. An existing record with the same key is replaced.
pub async fn create<S, R>(
  State(directory): State<Arc<Directory<S, R>>>,
  Json(record): Json<NewRecord>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  R: Reindexer,
{
  let (key, reindex) = directory.add(record).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(Created { key, reindex })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /records/:kind/:handle[?subtype=<subtype>]`
pub async fn get_one<S, R>(
  State(directory): State<Arc<Directory<S, R>>>,
  Path((kind, handle)): Path<(String, String)>,
  Query(params): Query<SubtypeParams>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: RecordStore,
  R: Reindexer,
{
  let key = record_key(&kind, handle, &params)?;
  let record = directory
    .get(&key)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("record {key} not found")))?;

  let etag = compute_etag(&record);
  let unchanged = headers
    .get(header::IF_NONE_MATCH)
    .is_some_and(|v| v.as_bytes() == etag.as_bytes());
  if unchanged {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }
  Ok(([(header::ETAG, etag)], Json(record)).into_response())
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub field: String,
  pub value: String,
}

#[derive(Debug, Serialize)]
pub struct Updated {
  /// `false` if the record had no line for the field.
  pub applied: bool,
  pub reindex: ReindexReport,
}

/// `PATCH /records/:kind/:handle[?subtype=<subtype>]`
pub async fn update_one<S, R>(
  State(directory): State<Arc<Directory<S, R>>>,
  Path((kind, handle)): Path<(String, String)>,
  Query(params): Query<SubtypeParams>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Updated>, ApiError>
where
  S: RecordStore,
  R: Reindexer,
{
  let key = record_key(&kind, handle, &params)?;
  let (outcome, reindex) = directory
    .update(&key, &body.field, &body.value)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Updated { applied: outcome.applied, reindex }))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /records/:kind/:handle[?subtype=<subtype>]`
pub async fn delete_one<S, R>(
  State(directory): State<Arc<Directory<S, R>>>,
  Path((kind, handle)): Path<(String, String)>,
  Query(params): Query<SubtypeParams>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore,
  R: Reindexer,
{
  let key = record_key(&kind, handle, &params)?;
  directory.delete(&key).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
