use std::{path::PathBuf, sync::Arc};

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rand_core::OsRng;
use rwhois_core::Directory;
use rwhois_store_fs::{ExternalIndexer, FsStore, IndexerConfig};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt as _;

use super::*;

struct Harness {
  _tmp: TempDir,
  root: PathBuf,
  app:  Router,
}

async fn harness() -> Harness {
  let tmp   = tempfile::tempdir().unwrap();
  let root  = tmp.path().to_path_buf();
  let store = FsStore::init(&root).await.unwrap();
  let indexer = ExternalIndexer::new(&root, IndexerConfig {
    program: PathBuf::from("true"),
    args:    Vec::new(),
  });

  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(b"secret", &salt)
    .unwrap()
    .to_string();
  let auth = Arc::new(AuthConfig { username: "admin".into(), password_hash: hash });

  let app = api_router(Arc::new(Directory::new(store, indexer)), auth);
  Harness { _tmp: tmp, root, app }
}

fn auth_header() -> String { format!("Basic {}", B64.encode("admin:secret")) }

async fn send(h: &Harness, method: &str, uri: &str, body: Option<Value>) -> Response {
  let mut req = Request::builder()
    .method(method)
    .uri(uri)
    .header(header::AUTHORIZATION, auth_header());
  let body = match body {
    Some(v) => {
      req = req.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  h.app.clone().oneshot(req.body(body).unwrap()).await.unwrap()
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn acme() -> Value {
  json!({
    "kind": "org",
    "handle": "ORG-1",
    "org_name": "Acme",
    "street": "1 Rd",
    "city": "Town",
    "state": "ST",
    "postal_code": "00000",
    "country_code": "US",
    "phone": "555",
    "email": "a@x.com",
  })
}

fn net(handle: &str, subtype: &str) -> Value {
  json!({
    "kind": "network",
    "handle": handle,
    "network": "192.0.2.0/24",
    "net_name": "EXAMPLE-NET",
    "org": "ORG-1",
    "tech_contact": "C-1",
    "admin_contact": "C-1",
    "subtype": subtype,
  })
}

fn field<'a>(record: &'a Value, name: &str) -> Option<&'a str> {
  record["fields"]
    .as_array()?
    .iter()
    .find(|f| f["name"] == name)
    .and_then(|f| f["value"].as_str())
}

// ── Auth ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_credentials_get_401_with_challenge() {
  let h = harness().await;
  let req = Request::builder().uri("/records/org").body(Body::empty()).unwrap();
  let resp = h.app.clone().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let challenge = resp.headers().get(header::WWW_AUTHENTICATE).unwrap();
  assert!(challenge.to_str().unwrap().starts_with("Basic"));
}

#[tokio::test]
async fn wrong_password_never_reaches_the_store() {
  let h = harness().await;
  let req = Request::builder()
    .method("POST")
    .uri("/records")
    .header(header::AUTHORIZATION, format!("Basic {}", B64.encode("admin:nope")))
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(acme().to_string()))
    .unwrap();
  let resp = h.app.clone().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(!h.root.join("org/ORG-1.txt").exists());
}

// ── Create / get ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_writes_file_and_reports_reindex() {
  let h = harness().await;
  let resp = send(&h, "POST", "/records", Some(acme())).await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let body = json_body(resp).await;
  assert_eq!(body["key"]["collection"], "org");
  assert_eq!(body["key"]["handle"], "ORG-1");
  let dirs = body["reindex"]["directories"].as_array().unwrap();
  assert_eq!(dirs.len(), 6);

  let text = std::fs::read_to_string(h.root.join("org/ORG-1.txt")).unwrap();
  assert!(text.starts_with("name: ORG-1\norg-name: Acme\n"));
}

#[tokio::test]
async fn storage_failure_is_500_and_reports_no_reindex() {
  let h = harness().await;
  // A directory in the record's place makes the write fail.
  std::fs::create_dir(h.root.join("org/ORG-1.txt")).unwrap();

  let resp = send(&h, "POST", "/records", Some(acme())).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body = json_body(resp).await;
  assert!(body["error"].as_str().unwrap().contains("ORG-1.txt"), "{body}");
  assert!(body.get("reindex").is_none());
}

#[tokio::test]
async fn get_returns_fields_in_file_order_with_etag() {
  let h = harness().await;
  send(&h, "POST", "/records", Some(acme())).await;

  let resp = send(&h, "GET", "/records/org/ORG-1", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let etag = resp.headers().get(header::ETAG).unwrap().to_str().unwrap().to_owned();
  assert!(etag.starts_with('"'));

  let record = json_body(resp).await;
  let names: Vec<&str> = record["fields"]
    .as_array()
    .unwrap()
    .iter()
    .map(|f| f["name"].as_str().unwrap())
    .collect();
  assert_eq!(names, [
    "name",
    "org-name",
    "street-address",
    "city",
    "state",
    "postal-code",
    "country-code",
    "phone",
    "email",
  ]);
  assert_eq!(field(&record, "phone"), Some("555"));
}

#[tokio::test]
async fn matching_if_none_match_yields_304() {
  let h = harness().await;
  send(&h, "POST", "/records", Some(acme())).await;

  let resp = send(&h, "GET", "/records/org/ORG-1", None).await;
  let etag = resp.headers().get(header::ETAG).unwrap().clone();

  let req = Request::builder()
    .uri("/records/org/ORG-1")
    .header(header::AUTHORIZATION, auth_header())
    .header(header::IF_NONE_MATCH, etag)
    .body(Body::empty())
    .unwrap();
  let resp = h.app.clone().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn get_missing_record_is_404() {
  let h = harness().await;
  let resp = send(&h, "GET", "/records/contact/NOBODY", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert!(json_body(resp).await["error"].is_string());
}

#[tokio::test]
async fn unknown_kind_is_400() {
  let h = harness().await;
  let resp = send(&h, "GET", "/records/person", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn path_escaping_handles_are_400() {
  let h = harness().await;
  for uri in ["/records/org/%2E%2E", "/records/org/a%2Fb"] {
    let resp = send(&h, "GET", uri, None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
  }
}

#[tokio::test]
async fn multiline_value_is_400_and_writes_nothing() {
  let h = harness().await;
  let mut body = acme();
  body["city"] = json!("Town\nphone: 0");
  let resp = send(&h, "POST", "/records", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(!h.root.join("org/ORG-1.txt").exists());
}

// ── Update ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn patch_replaces_one_field_and_changes_etag() {
  let h = harness().await;
  send(&h, "POST", "/records", Some(acme())).await;
  let before = send(&h, "GET", "/records/org/ORG-1", None).await;
  let before = before.headers().get(header::ETAG).unwrap().clone();

  let resp = send(
    &h,
    "PATCH",
    "/records/org/ORG-1",
    Some(json!({ "field": "phone", "value": "999" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["applied"], true);

  let resp = send(&h, "GET", "/records/org/ORG-1", None).await;
  assert_ne!(resp.headers().get(header::ETAG).unwrap(), &before);
  assert_eq!(field(&json_body(resp).await, "phone"), Some("999"));
}

#[tokio::test]
async fn patch_of_absent_field_is_not_applied() {
  let h = harness().await;
  send(&h, "POST", "/records", Some(acme())).await;
  let resp = send(
    &h,
    "PATCH",
    "/records/org/ORG-1",
    Some(json!({ "field": "fax", "value": "1" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["applied"], false);
}

#[tokio::test]
async fn patch_of_handle_field_is_400() {
  let h = harness().await;
  send(&h, "POST", "/records", Some(acme())).await;
  let resp = send(
    &h,
    "PATCH",
    "/records/org/ORG-1",
    Some(json!({ "field": "name", "value": "ORG-2" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_of_missing_record_is_404() {
  let h = harness().await;
  let resp = send(
    &h,
    "PATCH",
    "/records/org/ORG-404",
    Some(json!({ "field": "phone", "value": "1" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert!(!h.root.join("org/ORG-404.txt").exists());
}

// ── Delete ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_then_delete_again() {
  let h = harness().await;
  send(&h, "POST", "/records", Some(acme())).await;

  let resp = send(&h, "DELETE", "/records/org/ORG-1", None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  assert!(!h.root.join("org/ORG-1.txt").exists());

  let resp = send(&h, "DELETE", "/records/org/ORG-1", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── Networks ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn network_subtype_selects_collection() {
  let h = harness().await;
  send(&h, "POST", "/records", Some(net("NET-4", "ipv4"))).await;
  send(&h, "POST", "/records", Some(net("NET-X", "bogus"))).await;

  assert!(h.root.join("network/ipv4/NET-4.txt").exists());
  assert!(h.root.join("network/NET-X.txt").exists());

  let resp = send(&h, "GET", "/records/network?subtype=ipv4", None).await;
  assert_eq!(json_body(resp).await, json!(["NET-4"]));

  let resp = send(&h, "GET", "/records/network", None).await;
  assert_eq!(json_body(resp).await, json!(["NET-X"]));

  let resp = send(&h, "GET", "/records/network/NET-X?subtype=bogus", None).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let resp = send(&h, "GET", "/records/network/NET-4", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn network_created_is_read_only() {
  let h = harness().await;
  send(&h, "POST", "/records", Some(net("NET-4", "ipv4"))).await;
  let resp = send(
    &h,
    "PATCH",
    "/records/network/NET-4?subtype=ipv4",
    Some(json!({ "field": "created", "value": "1999-01-01" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Reindex ──────────────────────────────────────────────────────────────────

#[cfg(unix)]
#[tokio::test]
async fn reindex_reports_every_directory() {
  let h = harness().await;
  send(&h, "POST", "/records", Some(acme())).await;

  let resp = send(&h, "POST", "/reindex", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let report = json_body(resp).await;
  let dirs = report["directories"].as_array().unwrap();
  let collections: Vec<&str> =
    dirs.iter().map(|d| d["collection"].as_str().unwrap()).collect();
  assert_eq!(collections, [
    "org",
    "contact",
    "network",
    "network/ipv4",
    "network/ipv6",
    "network/asn",
  ]);
  assert_eq!(dirs[0]["outcome"], "indexed");
  assert_eq!(dirs[0]["files"], 1);
  assert_eq!(dirs[1]["outcome"], "empty");
}
