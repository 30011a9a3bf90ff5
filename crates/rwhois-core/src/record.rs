//! Record kinds, storage collections, handles, and new-record payloads.
//!
//! A record is a flat, ordered list of `field: value` lines. Its kind fixes the
//! field list (see [`crate::schema`]); its handle fixes the file name. Network
//! resources additionally live under a subtype directory, which is never
//! stored inside the record itself.

use std::{fmt, path::PathBuf, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use strum::EnumString;

use crate::{Error, Result, schema};

/// File extension shared by every record file.
pub const RECORD_EXTENSION: &str = "txt";

// ─── Kinds ───────────────────────────────────────────────────────────────────

/// The three record kinds the directory service holds.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString,
)]
pub enum RecordKind {
  #[serde(rename = "org", alias = "organization")]
  #[strum(serialize = "org", serialize = "organization")]
  Organization,
  #[serde(rename = "contact")]
  #[strum(serialize = "contact")]
  Contact,
  #[serde(rename = "network")]
  #[strum(serialize = "network")]
  Network,
}

impl RecordKind {
  /// Directory name under the data root; also the schema file stem.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Organization => "org",
      Self::Contact => "contact",
      Self::Network => "network",
    }
  }

  /// Parse a kind, mapping failures onto [`Error::UnknownKind`].
  pub fn parse(raw: &str) -> Result<Self> {
    raw.parse().map_err(|_| Error::UnknownKind(raw.to_owned()))
  }
}

impl fmt::Display for RecordKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Storage subdirectory discriminator for network resources.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString,
  strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NetworkSubtype {
  Ipv4,
  Ipv6,
  Asn,
}

// ─── Collections ─────────────────────────────────────────────────────────────

/// One storage directory: a kind plus, for networks, an optional subtype.
///
/// `Network(None)` is the flat `network/` directory that unrecognised
/// subtypes fall back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
  Organization,
  Contact,
  Network(Option<NetworkSubtype>),
}

impl Collection {
  /// Every directory the reindex trigger visits, in visiting order.
  pub const ALL: [Self; 6] = [
    Self::Organization,
    Self::Contact,
    Self::Network(None),
    Self::Network(Some(NetworkSubtype::Ipv4)),
    Self::Network(Some(NetworkSubtype::Ipv6)),
    Self::Network(Some(NetworkSubtype::Asn)),
  ];

  /// Resolve a network collection from a raw subtype string.
  ///
  /// Anything other than `ipv4`, `ipv6` or `asn` resolves to the flat
  /// `network/` directory rather than failing.
  pub fn network(subtype: &str) -> Self {
    match subtype.parse::<NetworkSubtype>() {
      Ok(subtype) => Self::Network(Some(subtype)),
      Err(_) => {
        tracing::debug!(subtype, "unrecognised network subtype, using flat network directory");
        Self::Network(None)
      }
    }
  }

  /// Resolve the collection for `kind`. The subtype is only consulted for
  /// networks; a network without one lands in the flat directory.
  pub fn for_kind(kind: RecordKind, subtype: Option<&str>) -> Self {
    match kind {
      RecordKind::Organization => Self::Organization,
      RecordKind::Contact => Self::Contact,
      RecordKind::Network => subtype.map_or(Self::Network(None), Self::network),
    }
  }

  pub fn kind(self) -> RecordKind {
    match self {
      Self::Organization => RecordKind::Organization,
      Self::Contact => RecordKind::Contact,
      Self::Network(_) => RecordKind::Network,
    }
  }

  /// Path of this collection relative to the data root.
  pub fn relative_dir(self) -> PathBuf {
    match self {
      Self::Network(Some(subtype)) => {
        PathBuf::from(RecordKind::Network.as_str()).join(subtype.to_string())
      }
      other => PathBuf::from(other.kind().as_str()),
    }
  }
}

impl fmt::Display for Collection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Network(Some(subtype)) => write!(f, "network/{subtype}"),
      other => f.write_str(other.kind().as_str()),
    }
  }
}

impl Serialize for Collection {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

// ─── Handles ─────────────────────────────────────────────────────────────────

/// A human-assigned record identifier, used verbatim as the file stem.
///
/// Only characters that would escape the collection directory or break the
/// line-oriented file format are refused.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
  pub fn new(raw: impl Into<String>) -> Result<Self> {
    let raw = raw.into();
    let hostile = raw.is_empty()
      || raw == "."
      || raw == ".."
      || raw.contains(['/', '\\', '\0', '\n', '\r']);
    if hostile {
      return Err(Error::InvalidHandle(raw));
    }
    Ok(Self(raw))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  /// `<handle>.txt`
  pub fn file_name(&self) -> String {
    format!("{}.{RECORD_EXTENSION}", self.0)
  }
}

impl FromStr for Handle {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::new(s) }
}

impl TryFrom<String> for Handle {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::new(value) }
}

impl From<Handle> for String {
  fn from(handle: Handle) -> Self { handle.0 }
}

impl fmt::Display for Handle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Where a single record lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RecordKey {
  pub collection: Collection,
  pub handle:     Handle,
}

impl RecordKey {
  pub fn new(collection: Collection, handle: Handle) -> Self {
    Self { collection, handle }
  }

  /// `<collection dir>/<handle>.txt`, relative to the data root.
  pub fn relative_path(&self) -> PathBuf {
    self.collection.relative_dir().join(self.handle.file_name())
  }
}

impl fmt::Display for RecordKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.collection, self.handle)
  }
}

// ─── Values ──────────────────────────────────────────────────────────────────

/// Reject values that would split into more than one line on disk.
pub fn validate_value(field: &str, value: &str) -> Result<()> {
  if value.contains(['\n', '\r']) {
    return Err(Error::InvalidValue { field: field.to_owned() });
  }
  Ok(())
}

/// Format a date the way record files carry it.
pub fn format_date(date: NaiveDate) -> String {
  date.format("%Y-%m-%d").to_string()
}

// ─── New-record payloads ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
  pub handle:       Handle,
  pub org_name:     String,
  #[serde(default)]
  pub street:       String,
  #[serde(default)]
  pub city:         String,
  #[serde(default)]
  pub state:        String,
  #[serde(default)]
  pub postal_code:  String,
  #[serde(default)]
  pub country_code: String,
  #[serde(default)]
  pub phone:        String,
  pub email:        String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
  pub handle:       Handle,
  #[serde(default)]
  pub first_name:   String,
  pub last_name:    String,
  /// Display string of an organisation; not checked against stored orgs.
  #[serde(default)]
  pub organization: String,
  #[serde(default)]
  pub street:       String,
  #[serde(default)]
  pub city:         String,
  #[serde(default)]
  pub state:        String,
  #[serde(default)]
  pub postal_code:  String,
  #[serde(default)]
  pub country_code: String,
  #[serde(default)]
  pub phone:        String,
  pub email:        String,
}

/// A network block or autonomous system number.
///
/// `org`, `tech_contact` and `admin_contact` are handles of other records;
/// dangling references are legal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkResource {
  pub handle:        Handle,
  /// Address/prefix (`192.0.2.0/24`) or ASN.
  pub network:       String,
  pub net_name:      String,
  pub org:           String,
  pub tech_contact:  String,
  pub admin_contact: String,
  /// Selects the storage directory; never written into the record.
  pub subtype:       String,
}

/// Input to [`crate::store::RecordStore::add`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NewRecord {
  #[serde(rename = "org", alias = "organization")]
  Organization(Organization),
  #[serde(rename = "contact")]
  Contact(Contact),
  #[serde(rename = "network")]
  Network(NetworkResource),
}

impl NewRecord {
  pub fn kind(&self) -> RecordKind {
    match self {
      Self::Organization(_) => RecordKind::Organization,
      Self::Contact(_) => RecordKind::Contact,
      Self::Network(_) => RecordKind::Network,
    }
  }

  pub fn handle(&self) -> &Handle {
    match self {
      Self::Organization(o) => &o.handle,
      Self::Contact(c) => &c.handle,
      Self::Network(n) => &n.handle,
    }
  }

  pub fn key(&self) -> RecordKey {
    let collection = match self {
      Self::Network(n) => Collection::network(&n.subtype),
      other => Collection::for_kind(other.kind(), None),
    };
    RecordKey::new(collection, self.handle().clone())
  }

  /// The record's `(field, value)` lines in schema order.
  ///
  /// Network resources get `created` and `updated` stamped with `today`.
  pub fn fields(&self, today: NaiveDate) -> Result<Vec<(&'static str, String)>> {
    let values: Vec<String> = match self {
      Self::Organization(o) => vec![
        o.handle.to_string(),
        o.org_name.clone(),
        o.street.clone(),
        o.city.clone(),
        o.state.clone(),
        o.postal_code.clone(),
        o.country_code.clone(),
        o.phone.clone(),
        o.email.clone(),
      ],
      Self::Contact(c) => vec![
        c.handle.to_string(),
        c.first_name.clone(),
        c.last_name.clone(),
        c.organization.clone(),
        c.street.clone(),
        c.city.clone(),
        c.state.clone(),
        c.postal_code.clone(),
        c.country_code.clone(),
        c.phone.clone(),
        c.email.clone(),
      ],
      Self::Network(n) => {
        let stamp = format_date(today);
        vec![
          n.handle.to_string(),
          n.network.clone(),
          n.net_name.clone(),
          n.org.clone(),
          n.tech_contact.clone(),
          n.admin_contact.clone(),
          stamp.clone(),
          stamp,
        ]
      }
    };

    let defs = schema::fields(self.kind());
    debug_assert_eq!(defs.len(), values.len());

    defs
      .iter()
      .zip(values)
      .map(|(def, value)| {
        validate_value(def.name, &value)?;
        Ok((def.name, value))
      })
      .collect()
  }
}

// ─── Read model ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
  pub name:  String,
  pub value: String,
}

/// A record as read back from storage, fields in file order.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
  pub key:    RecordKey,
  pub fields: Vec<Field>,
}

impl Record {
  /// Value of the first field called `name`.
  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .fields
      .iter()
      .find(|f| f.name == name)
      .map(|f| f.value.as_str())
  }
}
