//! Per-path async locks whose table entries disappear with their last user.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::OwnedMutexGuard;

type Slot = Arc<tokio::sync::Mutex<()>>;

#[derive(Default)]
pub(crate) struct LockTable {
  slots: Mutex<HashMap<PathBuf, Slot>>,
}

/// Held while a record path is being read-modified-written.
pub(crate) struct PathLock<'a> {
  table: &'a LockTable,
  path:  PathBuf,
  guard: Option<OwnedMutexGuard<()>>,
}

impl LockTable {
  fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Slot>> {
    self.slots.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub(crate) async fn lock(&self, path: &Path) -> PathLock<'_> {
    // Slots are only cloned under the table lock, so a strong count of one
    // seen under that lock means nobody holds or awaits the slot.
    let slot = self.slots().entry(path.to_path_buf()).or_default().clone();
    let guard = slot.lock_owned().await;
    PathLock { table: self, path: path.to_path_buf(), guard: Some(guard) }
  }

  #[cfg(test)]
  pub(crate) fn len(&self) -> usize { self.slots().len() }
}

impl Drop for PathLock<'_> {
  fn drop(&mut self) {
    drop(self.guard.take());
    let mut slots = self.table.slots();
    if slots.get(&self.path).is_some_and(|slot| Arc::strong_count(slot) == 1) {
      slots.remove(&self.path);
    }
  }
}
