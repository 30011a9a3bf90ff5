//! [`ExternalIndexer`]: runs the RWHOIS indexer binary over each collection.
//!
//! For every collection directory the indexer is invoked as
//! `program [args...] <kind>.schema ./<record file>...` with the directory as
//! its working directory. Record files carry a `./` prefix so a handle that
//! starts with `-` never reads as an option. Directories without record files are reported as
//! empty and skipped, so a failed run always means the indexer itself failed.

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
  process::Stdio,
};

use rwhois_core::{
  record::{Collection, RECORD_EXTENSION},
  reindex::{ReindexOutcome, ReindexReport, Reindexer},
  schema,
};
use serde::Deserialize;
use tokio::process::Command;

pub const DEFAULT_INDEXER: &str = "/usr/local/rwhoisd/bin/rwhois_indexer";

/// How to invoke the external indexer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
  /// Bare names are looked up on `PATH`; relative paths are resolved against
  /// the current directory when the indexer is constructed.
  pub program: PathBuf,
  /// Arguments placed before the schema file.
  pub args:    Vec<String>,
}

impl Default for IndexerConfig {
  fn default() -> Self {
    Self { program: PathBuf::from(DEFAULT_INDEXER), args: Vec::new() }
  }
}

pub struct ExternalIndexer {
  root:    PathBuf,
  config:  IndexerConfig,
  /// Serialises whole rebuilds.
  running: tokio::sync::Mutex<()>,
}

impl ExternalIndexer {
  pub fn new(root: impl Into<PathBuf>, mut config: IndexerConfig) -> Self {
    // The child runs in the collection directory, so a relative path with a
    // separator would otherwise resolve against the wrong place.
    if config.program.is_relative()
      && config.program.components().count() > 1
      && let Ok(abs) = std::path::absolute(&config.program)
    {
      config.program = abs;
    }
    Self {
      root: root.into(),
      config,
      running: tokio::sync::Mutex::new(()),
    }
  }

  pub fn config(&self) -> &IndexerConfig { &self.config }

  /// Index a single collection directory.
  pub async fn reindex(&self, collection: Collection) -> ReindexOutcome {
    let dir = self.root.join(collection.relative_dir());

    let files = match record_files(&dir).await {
      Ok(Some(files)) => files,
      Ok(None) => return ReindexOutcome::Missing,
      Err(e) => {
        return ReindexOutcome::Failed {
          reason: format!("cannot scan {}: {e}", dir.display()),
        };
      }
    };
    if files.is_empty() {
      return ReindexOutcome::Empty;
    }

    let schema_file = schema::schema_file_name(collection.kind());
    tracing::debug!(
      collection = %collection,
      files = files.len(),
      program = %self.config.program.display(),
      "running indexer"
    );

    let output = Command::new(&self.config.program)
      .args(&self.config.args)
      .arg(&schema_file)
      .args(files.iter().map(|name| format!("./{name}")))
      .current_dir(&dir)
      .stdin(Stdio::null())
      .output()
      .await;

    match output {
      Ok(out) if out.status.success() => ReindexOutcome::Indexed { files: files.len() },
      Ok(out) => {
        let stderr = String::from_utf8_lossy(&out.stderr);
        let stderr = stderr.trim();
        let reason = if stderr.is_empty() {
          format!("indexer {}", out.status)
        } else {
          format!("indexer {}: {stderr}", out.status)
        };
        ReindexOutcome::Failed { reason }
      }
      Err(e) => ReindexOutcome::Failed {
        reason: format!("cannot run {}: {e}", self.config.program.display()),
      },
    }
  }
}

impl Reindexer for ExternalIndexer {
  async fn rebuild(&self) -> ReindexReport {
    let _running = self.running.lock().await;
    let mut report = ReindexReport::default();
    for collection in Collection::ALL {
      report.push(collection, self.reindex(collection).await);
    }
    report
  }
}

/// Record file names in `dir`, sorted; `None` if `dir` does not exist.
async fn record_files(dir: &Path) -> std::io::Result<Option<Vec<String>>> {
  let mut entries = match tokio::fs::read_dir(dir).await {
    Ok(entries) => entries,
    Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
    Err(e) => return Err(e),
  };

  let mut files = Vec::new();
  while let Some(entry) = entries.next_entry().await? {
    let path = entry.path();
    let is_record = path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXTENSION)
      && entry.file_type().await?.is_file();
    if let (true, Some(name)) = (is_record, path.file_name().and_then(|n| n.to_str())) {
      files.push(name.to_owned());
    }
  }

  files.sort();
  Ok(Some(files))
}
