//! Schema description rendering.

use rwhois_core::schema::FieldDef;

/// Column at which the label starts; longer names get a single space.
const NAME_GUTTER: usize = 16;

/// Render `defs` as a schema description file, one field per line.
pub fn render_schema(defs: &[FieldDef]) -> String {
  let mut out = String::new();
  for def in defs {
    let name  = format!("{}:", def.name);
    let width = NAME_GUTTER.max(name.len() + 1);
    let flag  = if def.mandatory { 'M' } else { 'O' };
    out.push_str(&format!(
      "{name:<width$}{}:{}:{}:{flag}:\n",
      def.label,
      def.ty.as_str(),
      def.max_length,
    ));
  }
  out
}

#[cfg(test)]
mod tests {
  use rwhois_core::{record::RecordKind, schema};

  use super::*;

  #[test]
  fn organization_schema() {
    let text = render_schema(schema::fields(RecordKind::Organization));
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 9);
    assert_eq!(lines[0], "name:           Handle:TEXT:64:M:");
    assert_eq!(lines[1], "org-name:       Organization Name:TEXT:128:M:");
    assert_eq!(lines[7], "phone:          Phone:TEXT:32:O:");
    assert!(text.ends_with('\n'));
  }

  #[test]
  fn long_names_keep_a_separator() {
    let defs = [FieldDef {
      name:       "a-very-long-field-name",
      label:      "Long",
      ty:         schema::FieldType::Text,
      max_length: 8,
      mandatory:  false,
    }];
    assert_eq!(render_schema(&defs), "a-very-long-field-name: Long:TEXT:8:O:\n");
  }

  #[test]
  fn network_schema_lists_date_stamps() {
    let text = render_schema(schema::fields(RecordKind::Network));
    assert!(text.contains("created:        Created:TEXT:10:M:\n"));
    assert!(text.contains("updated:        Updated:TEXT:10:M:\n"));
  }
}
