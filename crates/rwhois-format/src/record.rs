//! Record file parsing, single-field edits, and rendering.
//!
//! Lines are kept verbatim so that an edit touches exactly one line and every
//! other byte of the file survives a parse/render cycle.

use crate::Result;

/// An ordered list of record lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFile {
  lines: Vec<String>,
}

/// Does `line` start with `field:`?
fn matches_field(line: &str, field: &str) -> bool {
  line
    .strip_prefix(field)
    .is_some_and(|rest| rest.starts_with(':'))
}

fn format_line(field: &str, value: &str) -> String {
  format!("{field}: {value}")
}

impl RecordFile {
  /// Split `text` into lines. A trailing newline does not produce an empty
  /// final line; lines without a `:` are kept but never match a field.
  pub fn parse(text: &str) -> Self {
    let body = text.strip_suffix('\n').unwrap_or(text);
    let lines = if body.is_empty() && text.len() <= 1 {
      Vec::new()
    } else {
      body.split('\n').map(str::to_owned).collect()
    };
    Self { lines }
  }

  pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
    Ok(Self::parse(&String::from_utf8(bytes)?))
  }

  /// Build a file from `(field, value)` pairs, one line each, in order.
  pub fn from_fields<I, N, V>(fields: I) -> Self
  where
    I: IntoIterator<Item = (N, V)>,
    N: AsRef<str>,
    V: AsRef<str>,
  {
    let lines = fields
      .into_iter()
      .map(|(n, v)| format_line(n.as_ref(), v.as_ref()))
      .collect();
    Self { lines }
  }

  pub fn lines(&self) -> &[String] { &self.lines }

  pub fn len(&self) -> usize { self.lines.len() }

  pub fn is_empty(&self) -> bool { self.lines.is_empty() }

  /// `(field, value)` for every line that carries a `:`. Values have their
  /// leading whitespace trimmed.
  pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
    self.lines.iter().filter_map(|line| {
      line
        .split_once(':')
        .map(|(name, value)| (name, value.trim_start()))
    })
  }

  /// Value of the first `field:` line.
  pub fn get(&self, field: &str) -> Option<&str> {
    self
      .lines
      .iter()
      .find(|line| matches_field(line, field))
      .map(|line| line[field.len() + 1..].trim_start())
  }

  /// Replace the first `field:` line with `field: value`.
  ///
  /// Returns `false`, leaving the file untouched, when no line matches; a
  /// missing field is never appended.
  pub fn set_first(&mut self, field: &str, value: &str) -> bool {
    match self.lines.iter_mut().find(|line| matches_field(line, field)) {
      Some(line) => {
        *line = format_line(field, value);
        true
      }
      None => false,
    }
  }

  /// Lines joined by `\n`, with a trailing newline.
  pub fn render(&self) -> String {
    let mut out = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
    for line in &self.lines {
      out.push_str(line);
      out.push('\n');
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const ORG: &str = "name: ORG-1\norg-name: Acme\nphone: 555\nemail: a@x.com\n";

  #[test]
  fn parse_and_render_preserve_bytes() {
    let file = RecordFile::parse(ORG);
    assert_eq!(file.len(), 4);
    assert_eq!(file.render(), ORG);
  }

  #[test]
  fn render_adds_missing_trailing_newline() {
    let file = RecordFile::parse("name: X");
    assert_eq!(file.render(), "name: X\n");
  }

  #[test]
  fn empty_input_has_no_lines() {
    assert!(RecordFile::parse("").is_empty());
    assert!(RecordFile::parse("\n").is_empty());
  }

  #[test]
  fn set_first_changes_one_line() {
    let mut file = RecordFile::parse(ORG);
    assert!(file.set_first("phone", "999"));
    assert_eq!(
      file.render(),
      "name: ORG-1\norg-name: Acme\nphone: 999\nemail: a@x.com\n"
    );
  }

  #[test]
  fn set_first_only_touches_the_first_match() {
    let mut file = RecordFile::parse("phone: 1\nphone: 2\n");
    assert!(file.set_first("phone", "3"));
    assert_eq!(file.render(), "phone: 3\nphone: 2\n");
  }

  #[test]
  fn set_first_missing_field_is_a_noop() {
    let mut file = RecordFile::parse(ORG);
    assert!(!file.set_first("fax", "123"));
    assert_eq!(file.render(), ORG);
  }

  #[test]
  fn match_is_anchored_and_exact() {
    let mut file = RecordFile::parse("org-name: Acme\nxname: 1\nname : 2\n");
    // Neither `xname:` nor `name :` is a `name:` line.
    assert!(!file.set_first("name", "ORG-9"));
    assert_eq!(file.get("org-name"), Some("Acme"));
    assert_eq!(file.get("name"), None);
  }

  #[test]
  fn fields_trim_leading_whitespace_only() {
    let file = RecordFile::parse("city:   Town  \nno separator here\n");
    let fields: Vec<_> = file.fields().collect();
    assert_eq!(fields, [("city", "Town  ")]);
  }

  #[test]
  fn from_fields_writes_colon_space_pairs() {
    let file = RecordFile::from_fields([("name", "C-1"), ("first-name", "")]);
    assert_eq!(file.render(), "name: C-1\nfirst-name: \n");
  }

  #[test]
  fn non_utf8_is_rejected() {
    assert!(RecordFile::from_bytes(vec![0x6e, 0xff, 0x0a]).is_err());
  }
}
