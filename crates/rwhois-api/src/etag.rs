//! ETag computation for record resources.
//!
//! The tag is a SHA-256 over the record rendered as `name: value` lines, so
//! it changes whenever any line of the file does.

use rwhois_core::record::Record;
use sha2::{Digest, Sha256};

/// Compute a quoted ETag for `record`.
pub fn compute_etag(record: &Record) -> String {
  let mut hasher = Sha256::new();
  for field in &record.fields {
    hasher.update(field.name.as_bytes());
    hasher.update(b": ");
    hasher.update(field.value.as_bytes());
    hasher.update(b"\n");
  }
  format!("\"{}\"", hex::encode(hasher.finalize()))
}
