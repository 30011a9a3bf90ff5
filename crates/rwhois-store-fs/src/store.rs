//! [`FsStore`]: the flat-file implementation of [`RecordStore`].

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
  sync::Arc,
};

use chrono::Local;
use rwhois_core::{
  record::{
    Collection, Field, Handle, NewRecord, RECORD_EXTENSION, Record, RecordKey,
    RecordKind, format_date, validate_value,
  },
  schema,
  store::{RecordStore, UpdateOutcome},
};
use rwhois_format::RecordFile;

use crate::{
  Error, Result,
  atomic::write_atomic,
  layout::{ensure_collection, init_layout},
  lock::LockTable,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An RWHOIS record store rooted at a data directory.
///
/// Cloning is cheap; clones share the per-record lock table, so concurrent
/// mutations of the same record are serialised across all of them.
#[derive(Clone)]
pub struct FsStore {
  inner: Arc<Inner>,
}

struct Inner {
  root:  PathBuf,
  /// One async mutex per record path currently in use.
  locks: LockTable,
}

impl FsStore {
  /// Open a store at `root` without touching the filesystem. Collection
  /// directories are created lazily by `add`.
  pub fn open(root: impl Into<PathBuf>) -> Self {
    Self {
      inner: Arc::new(Inner { root: root.into(), locks: LockTable::default() }),
    }
  }

  /// Open a store at `root`, laying out every collection directory and its
  /// schema description file.
  pub async fn init(root: impl Into<PathBuf>) -> Result<Self> {
    let store = Self::open(root);
    init_layout(store.root()).await?;
    Ok(store)
  }

  pub fn root(&self) -> &Path { &self.inner.root }

  pub fn collection_dir(&self, collection: Collection) -> PathBuf {
    self.inner.root.join(collection.relative_dir())
  }

  /// Absolute path of the file backing `key`.
  pub fn path_for(&self, key: &RecordKey) -> PathBuf {
    self.inner.root.join(key.relative_path())
  }

  #[cfg(test)]
  pub(crate) fn lock_table_len(&self) -> usize { self.inner.locks.len() }

  /// Read and parse a record file; `None` if it does not exist.
  async fn read_file(path: &Path) -> Result<Option<RecordFile>> {
    match tokio::fs::read(path).await {
      Ok(bytes) => RecordFile::from_bytes(bytes)
        .map(Some)
        .map_err(|source| Error::Format { path: path.to_path_buf(), source }),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(Error::Io { path: path.to_path_buf(), source: e }),
    }
  }
}

fn today() -> String { format_date(Local::now().date_naive()) }

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for FsStore {
  type Error = Error;

  async fn add(&self, record: NewRecord) -> Result<RecordKey> {
    let key    = record.key();
    let fields = record.fields(Local::now().date_naive())?;
    let file   = RecordFile::from_fields(fields);
    let path   = self.path_for(&key);

    let _guard = self.inner.locks.lock(&path).await;
    ensure_collection(self.root(), key.collection).await?;
    write_atomic(&path, file.render().as_bytes()).await?;

    tracing::debug!(path = %path.display(), "wrote record");
    Ok(key)
  }

  async fn update<'a>(
    &'a self,
    key: &'a RecordKey,
    field: &'a str,
    value: &'a str,
  ) -> Result<UpdateOutcome> {
    let kind = key.collection.kind();
    if schema::is_read_only(kind, field) {
      return Err(Error::ReadOnlyField { key: key.clone(), field: field.to_owned() });
    }
    validate_value(field, value)?;

    let path   = self.path_for(key);
    let _guard = self.inner.locks.lock(&path).await;

    let mut file = Self::read_file(&path)
      .await?
      .ok_or_else(|| Error::NotFound(key.clone()))?;

    let applied = file.set_first(field, value);
    let stamped =
      kind == RecordKind::Network && file.set_first(schema::UPDATED_FIELD, &today());

    if applied || stamped {
      write_atomic(&path, file.render().as_bytes()).await?;
    }

    Ok(UpdateOutcome { applied })
  }

  async fn delete<'a>(&'a self, key: &'a RecordKey) -> Result<()> {
    let path   = self.path_for(key);
    let _guard = self.inner.locks.lock(&path).await;

    match tokio::fs::remove_file(&path).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(key.clone())),
      Err(e) => Err(Error::Io { path, source: e }),
    }
  }

  async fn get<'a>(&'a self, key: &'a RecordKey) -> Result<Option<Record>> {
    let path = self.path_for(key);
    let Some(file) = Self::read_file(&path).await? else {
      return Ok(None);
    };

    let fields = file
      .fields()
      .map(|(name, value)| Field { name: name.to_owned(), value: value.to_owned() })
      .collect();

    Ok(Some(Record { key: key.clone(), fields }))
  }

  async fn list(&self, collection: Collection) -> Result<Vec<Handle>> {
    let dir = self.collection_dir(collection);
    let mut entries = match tokio::fs::read_dir(&dir).await {
      Ok(entries) => entries,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(Error::Io { path: dir, source: e }),
    };

    let mut handles = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(Error::io(&dir))? {
      let path = entry.path();
      if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
        continue;
      }
      let is_file = entry.file_type().await.map_err(Error::io(&path))?.is_file();
      let handle  = path
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| Handle::new(s).ok());
      if let (true, Some(handle)) = (is_file, handle) {
        handles.push(handle);
      }
    }

    handles.sort();
    Ok(handles)
  }
}
