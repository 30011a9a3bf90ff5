//! Write-to-temp-then-rename, so readers never see a half-written file.

use std::path::Path;

use tokio::io::AsyncWriteExt as _;
use uuid::Uuid;

use crate::{Error, Result};

/// Replace `path` with `contents` atomically.
///
/// The temp file is hidden, lives in the same directory (so the rename stays
/// on one filesystem) and ends in `.tmp`, which the indexer never picks up.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
  let dir  = path.parent().unwrap_or_else(|| Path::new("."));
  let name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  let tmp  = dir.join(format!(".{name}.{}.tmp", Uuid::new_v4().simple()));

  let written = async {
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&tmp, path).await
  }
  .await;

  if let Err(source) = written {
    tokio::fs::remove_file(&tmp).await.ok();
    return Err(Error::Io { path: path.to_path_buf(), source });
  }
  Ok(())
}
