//! Error type for `rwhois-store-fs`.

use std::path::PathBuf;

use rwhois_core::{
  record::RecordKey,
  store::{FailureKind, StoreError},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] rwhois_core::Error),

  #[error("record not found: {0}")]
  NotFound(RecordKey),

  #[error("field {field:?} of {key} cannot be updated")]
  ReadOnlyField { key: RecordKey, field: String },

  #[error("i/o error on {}: {source}", .path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed record file {}: {source}", .path.display())]
  Format {
    path:   PathBuf,
    #[source]
    source: rwhois_format::Error,
  },
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
    let path = path.into();
    move |source| Self::Io { path, source }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl StoreError for Error {
  fn failure_kind(&self) -> FailureKind {
    match self {
      Self::NotFound(_) => FailureKind::NotFound,
      Self::Core(_) | Self::ReadOnlyField { .. } => FailureKind::Invalid,
      Self::Io { .. } | Self::Format { .. } => FailureKind::Storage,
    }
  }
}
