//! On-disk layout initialisation.
//!
//! [`init_layout`] runs from [`FsStore::init`](crate::FsStore::init): every
//! collection directory is created and given a fresh copy of its kind's
//! schema description file. [`ensure_collection`] is the lazy form used by
//! `add`, which only touches the record's own collection.

use std::path::Path;

use rwhois_core::{record::Collection, schema};
use rwhois_format::render_schema;

use crate::{Error, Result, atomic::write_atomic};

pub(crate) async fn init_layout(root: &Path) -> Result<()> {
  for collection in Collection::ALL {
    let dir = root.join(collection.relative_dir());
    tokio::fs::create_dir_all(&dir).await.map_err(Error::io(&dir))?;
    write_schema(&dir, collection).await?;
  }
  tracing::debug!(root = %root.display(), "record layout ready");
  Ok(())
}

/// Create `collection`'s directory and schema file if either is missing.
pub(crate) async fn ensure_collection(root: &Path, collection: Collection) -> Result<()> {
  let dir = root.join(collection.relative_dir());
  tokio::fs::create_dir_all(&dir).await.map_err(Error::io(&dir))?;

  let schema_path = dir.join(schema::schema_file_name(collection.kind()));
  let present = tokio::fs::try_exists(&schema_path)
    .await
    .map_err(Error::io(&schema_path))?;
  if !present {
    write_schema(&dir, collection).await?;
    tracing::debug!(dir = %dir.display(), "collection laid out");
  }
  Ok(())
}

async fn write_schema(dir: &Path, collection: Collection) -> Result<()> {
  let kind = collection.kind();
  let text = render_schema(schema::fields(kind));
  write_atomic(&dir.join(schema::schema_file_name(kind)), text.as_bytes()).await
}
