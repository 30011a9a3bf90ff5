//! Static per-kind field definitions.
//!
//! The registry drives two things: the field order of newly written record
//! files, and the schema description file that sits next to the records for
//! the external indexer. Mandatory flags and maximum lengths are descriptive
//! only; the store does not enforce them at mutation time.

use serde::Serialize;

use crate::record::RecordKind;

/// Field holding the record handle; first in every kind.
pub const HANDLE_FIELD: &str = "name";
/// Network creation date; written once.
pub const CREATED_FIELD: &str = "created";
/// Network modification date; refreshed on every update.
pub const UPDATED_FIELD: &str = "updated";

/// File extension of schema description files.
pub const SCHEMA_EXTENSION: &str = "schema";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
  Text,
}

impl FieldType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Text => "TEXT",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDef {
  pub name:       &'static str,
  pub label:      &'static str,
  pub ty:         FieldType,
  pub max_length: u16,
  pub mandatory:  bool,
}

const fn text(
  name: &'static str,
  label: &'static str,
  max_length: u16,
  mandatory: bool,
) -> FieldDef {
  FieldDef { name, label, ty: FieldType::Text, max_length, mandatory }
}

const M: bool = true;
const O: bool = false;

static ORGANIZATION: [FieldDef; 9] = [
  text(HANDLE_FIELD, "Handle", 64, M),
  text("org-name", "Organization Name", 128, M),
  text("street-address", "Street Address", 128, O),
  text("city", "City", 64, O),
  text("state", "State", 64, O),
  text("postal-code", "Postal Code", 16, O),
  text("country-code", "Country Code", 2, O),
  text("phone", "Phone", 32, O),
  text("email", "Email", 128, M),
];

static CONTACT: [FieldDef; 11] = [
  text(HANDLE_FIELD, "Handle", 64, M),
  text("first-name", "First Name", 64, O),
  text("last-name", "Last Name", 64, M),
  text("organization", "Organization", 128, O),
  text("street-address", "Street Address", 128, O),
  text("city", "City", 64, O),
  text("state", "State", 64, O),
  text("postal-code", "Postal Code", 16, O),
  text("country-code", "Country Code", 2, O),
  text("phone", "Phone", 32, O),
  text("email", "Email", 128, M),
];

static NETWORK: [FieldDef; 8] = [
  text(HANDLE_FIELD, "Handle", 64, M),
  text("network", "Network", 64, M),
  text("net-name", "Network Name", 128, M),
  text("org", "Organization", 64, M),
  text("tech-contact", "Tech Contact", 64, M),
  text("admin-contact", "Admin Contact", 64, M),
  text(CREATED_FIELD, "Created", 10, M),
  text(UPDATED_FIELD, "Updated", 10, M),
];

/// Ordered field list for `kind`.
pub fn fields(kind: RecordKind) -> &'static [FieldDef] {
  match kind {
    RecordKind::Organization => &ORGANIZATION,
    RecordKind::Contact => &CONTACT,
    RecordKind::Network => &NETWORK,
  }
}

pub fn field(kind: RecordKind, name: &str) -> Option<&'static FieldDef> {
  fields(kind).iter().find(|f| f.name == name)
}

/// Fields an update may not touch: the handle everywhere, and the creation
/// date of network resources.
pub fn is_read_only(kind: RecordKind, name: &str) -> bool {
  name == HANDLE_FIELD || (kind == RecordKind::Network && name == CREATED_FIELD)
}

/// Name of the schema description file for `kind`, e.g. `org.schema`.
pub fn schema_file_name(kind: RecordKind) -> String {
  format!("{}.{SCHEMA_EXTENSION}", kind.as_str())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_kind_leads_with_the_handle() {
    for kind in [RecordKind::Organization, RecordKind::Contact, RecordKind::Network] {
      let first = fields(kind)[0];
      assert_eq!(first.name, HANDLE_FIELD);
      assert!(first.mandatory);
    }
  }

  #[test]
  fn arity_matches_positional_arguments() {
    assert_eq!(fields(RecordKind::Organization).len(), 9);
    assert_eq!(fields(RecordKind::Contact).len(), 11);
    // six positional values plus the two date stamps
    assert_eq!(fields(RecordKind::Network).len(), 8);
  }

  #[test]
  fn contact_mandatory_fields() {
    let mandatory: Vec<_> = fields(RecordKind::Contact)
      .iter()
      .filter(|f| f.mandatory)
      .map(|f| f.name)
      .collect();
    assert_eq!(mandatory, ["name", "last-name", "email"]);
  }

  #[test]
  fn read_only_fields() {
    assert!(is_read_only(RecordKind::Organization, "name"));
    assert!(is_read_only(RecordKind::Network, "created"));
    assert!(!is_read_only(RecordKind::Network, "updated"));
    assert!(!is_read_only(RecordKind::Contact, "created"));
  }

  #[test]
  fn lookup_by_name() {
    let phone = field(RecordKind::Organization, "phone").unwrap();
    assert_eq!(phone.max_length, 32);
    assert!(!phone.mandatory);
    assert!(field(RecordKind::Organization, "fax").is_none());
  }

  #[test]
  fn schema_file_names() {
    assert_eq!(schema_file_name(RecordKind::Organization), "org.schema");
    assert_eq!(schema_file_name(RecordKind::Network), "network.schema");
  }
}
