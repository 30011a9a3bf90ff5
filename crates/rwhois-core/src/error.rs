//! Error types for `rwhois-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid handle {0:?}: must be non-empty and free of path separators, NUL and line breaks")]
  InvalidHandle(String),

  #[error("invalid value for {field}: line breaks are not allowed")]
  InvalidValue { field: String },

  #[error("unknown record kind: {0:?}")]
  UnknownKind(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
