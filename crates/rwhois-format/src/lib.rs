//! Codec for the two flat-file formats the RWHOIS indexer consumes.
//!
//! Record files are one `field: value` pair per line in schema order, with no
//! blank lines and a trailing newline. Schema description files are one
//! `field:<padding>Label:TYPE:max-length:M|O:` line per field. Pure
//! synchronous; no filesystem access.
//!
//! # Quick start
//!
//! ```
//! use rwhois_format::RecordFile;
//!
//! let mut file = RecordFile::parse("name: ORG-1\nphone: 555\n");
//! assert!(file.set_first("phone", "999"));
//! assert_eq!(file.render(), "name: ORG-1\nphone: 999\n");
//! ```

pub mod error;
mod record;
mod schema;

pub use error::{Error, Result};
pub use record::RecordFile;
pub use schema::render_schema;
