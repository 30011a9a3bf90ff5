//! Core types and trait definitions for the RWHOIS record toolkit.
//!
//! This crate is deliberately free of filesystem and HTTP code. It names the
//! three record kinds, their storage collections and schemas, and the two
//! seams every other crate plugs into: [`store::RecordStore`] and
//! [`reindex::Reindexer`].

// Trait methods spell out `+ Send` on their futures, so the advisory lint for
// `async fn` in public traits does not apply.
#![allow(async_fn_in_trait)]

pub mod directory;
pub mod error;
pub mod record;
pub mod reindex;
pub mod schema;
pub mod store;

pub use directory::Directory;
pub use error::{Error, Result};
