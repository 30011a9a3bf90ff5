//! Error types for the rwhois-format codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("record file is not valid UTF-8: {0}")]
  Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
