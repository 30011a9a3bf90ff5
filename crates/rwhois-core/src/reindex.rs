//! The `Reindexer` trait and per-directory outcomes.
//!
//! A rebuild visits every directory in [`Collection::ALL`], whichever one the
//! triggering mutation touched. It never fails as a whole: problems are
//! recorded per directory so callers can log them without aborting the
//! mutation that caused the rebuild.

use std::{fmt, future::Future};

use serde::Serialize;

use crate::record::Collection;

/// What happened to one directory during a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReindexOutcome {
  /// The directory does not exist; nothing to index.
  Missing,
  /// The directory holds no record files; the indexer was not run.
  Empty,
  /// The indexer ran over `files` record files and exited successfully.
  Indexed { files: usize },
  /// The indexer could not be started or exited unsuccessfully.
  Failed { reason: String },
}

impl ReindexOutcome {
  pub fn is_failure(&self) -> bool { matches!(self, Self::Failed { .. }) }
}

impl fmt::Display for ReindexOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Missing => f.write_str("missing"),
      Self::Empty => f.write_str("empty"),
      Self::Indexed { files } => write!(f, "indexed {files} file(s)"),
      Self::Failed { reason } => write!(f, "failed: {reason}"),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryReport {
  pub collection: Collection,
  #[serde(flatten)]
  pub outcome:    ReindexOutcome,
}

/// The outcome of one full rebuild, in visiting order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReindexReport {
  pub directories: Vec<DirectoryReport>,
}

impl ReindexReport {
  pub fn push(&mut self, collection: Collection, outcome: ReindexOutcome) {
    self.directories.push(DirectoryReport { collection, outcome });
  }

  pub fn failures(&self) -> impl Iterator<Item = &DirectoryReport> {
    self.directories.iter().filter(|d| d.outcome.is_failure())
  }

  pub fn outcome(&self, collection: Collection) -> Option<&ReindexOutcome> {
    self
      .directories
      .iter()
      .find(|d| d.collection == collection)
      .map(|d| &d.outcome)
  }
}

/// Regenerates the external server's search index.
pub trait Reindexer: Send + Sync {
  /// Rebuild the index of every collection directory.
  fn rebuild(&self) -> impl Future<Output = ReindexReport> + Send + '_;
}
