//! [`Directory`]: a record store paired with its reindex trigger.
//!
//! Every successful mutation is followed by a full rebuild. Failed mutations
//! never trigger one. Rebuild problems are logged and handed back to the
//! caller, but they never turn a successful mutation into an error.

use crate::{
  record::{Collection, Handle, NewRecord, Record, RecordKey},
  reindex::{ReindexReport, Reindexer},
  store::{RecordStore, UpdateOutcome},
};

pub struct Directory<S, R> {
  store:     S,
  reindexer: R,
}

impl<S, R> Directory<S, R>
where
  S: RecordStore,
  R: Reindexer,
{
  pub fn new(store: S, reindexer: R) -> Self { Self { store, reindexer } }

  pub fn store(&self) -> &S { &self.store }

  pub async fn add(
    &self,
    record: NewRecord,
  ) -> Result<(RecordKey, ReindexReport), S::Error> {
    let key = self.store.add(record).await?;
    tracing::info!(%key, "record written");
    let report = self.rebuild_indexes().await;
    Ok((key, report))
  }

  pub async fn update(
    &self,
    key: &RecordKey,
    field: &str,
    value: &str,
  ) -> Result<(UpdateOutcome, ReindexReport), S::Error> {
    let outcome = self.store.update(key, field, value).await?;
    if outcome.applied {
      tracing::info!(%key, field, "record updated");
    } else {
      tracing::info!(%key, field, "no such field in record, nothing replaced");
    }
    let report = self.rebuild_indexes().await;
    Ok((outcome, report))
  }

  pub async fn delete(&self, key: &RecordKey) -> Result<ReindexReport, S::Error> {
    self.store.delete(key).await?;
    tracing::info!(%key, "record deleted");
    Ok(self.rebuild_indexes().await)
  }

  pub async fn get(&self, key: &RecordKey) -> Result<Option<Record>, S::Error> {
    self.store.get(key).await
  }

  pub async fn list(&self, collection: Collection) -> Result<Vec<Handle>, S::Error> {
    self.store.list(collection).await
  }

  /// Run the reindex trigger over every collection directory.
  pub async fn rebuild_indexes(&self) -> ReindexReport {
    let report = self.reindexer.rebuild().await;
    for dir in &report.directories {
      if dir.outcome.is_failure() {
        tracing::warn!(collection = %dir.collection, outcome = %dir.outcome, "reindex failed");
      } else {
        tracing::debug!(collection = %dir.collection, outcome = %dir.outcome, "reindexed");
      }
    }
    report
  }
}
