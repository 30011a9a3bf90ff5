//! Flat-file backend for the RWHOIS record store.
//!
//! Records live as `<handle>.txt` files under one directory per collection,
//! next to a schema description file for the external indexer. All file
//! access goes through [`tokio::fs`] so the store can sit behind an async
//! server as well as the CLI.

mod atomic;
mod layout;
mod lock;
mod reindex;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use reindex::{DEFAULT_INDEXER, ExternalIndexer, IndexerConfig};
pub use store::FsStore;
