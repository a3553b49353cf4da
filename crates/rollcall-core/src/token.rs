//! Token payloads and artifact keys.
//!
//! The payload is the exact data a visual code carries. Its canonical form is
//! the compact JSON object `{"name":…,"id":…}`; decoding a rendered code must
//! reproduce that string byte-for-byte.

use serde::Serialize;

use crate::{Error, Result};

/// Namespace under which every artifact is stored.
pub const ARTIFACT_PREFIX: &str = "qrcodes";

/// The data encoded into a subject's visual code.
///
/// Field order is significant: it fixes the key order of the canonical JSON.
/// Only built through [`TokenPayload::new`], never deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPayload {
  #[serde(rename = "name")]
  subject_name: String,
  #[serde(rename = "id")]
  subject_id:   String,
}

impl TokenPayload {
  /// Build a payload, rejecting empty or whitespace-only fields and subject
  /// ids that cannot name a single artifact file.
  pub fn new(
    subject_name: impl Into<String>,
    subject_id: impl Into<String>,
  ) -> Result<Self> {
    let subject_name = subject_name.into();
    let subject_id = subject_id.into();
    if subject_name.trim().is_empty() {
      return Err(Error::EmptyField("subject name"));
    }
    if subject_id.trim().is_empty() {
      return Err(Error::EmptyField("subject id"));
    }
    if subject_id.contains(['/', '\\', '\0']) {
      return Err(Error::InvalidSubjectId(subject_id));
    }
    validate_artifact_key(&artifact_key(&subject_id))?;
    Ok(Self { subject_name, subject_id })
  }

  pub fn subject_name(&self) -> &str { &self.subject_name }

  pub fn subject_id(&self) -> &str { &self.subject_id }

  /// The canonical serialisation that gets encoded into the visual code.
  pub fn canonical(&self) -> Result<String> {
    Ok(serde_json::to_string(self)?)
  }

  /// The artifact store key for this payload's rendered code.
  pub fn artifact_key(&self) -> String { artifact_key(&self.subject_id) }
}

/// Derive the artifact key for a subject: `qrcodes/<subject_id>.png`.
pub fn artifact_key(subject_id: &str) -> String {
  format!("{ARTIFACT_PREFIX}/{subject_id}.png")
}

/// Check that `key` is a safe relative path: `/`-separated, no empty, `.` or
/// `..` segments, no backslashes or NUL bytes.
pub fn validate_artifact_key(key: &str) -> Result<()> {
  let bad_segment = key
    .split('/')
    .any(|seg| seg.is_empty() || seg == "." || seg == "..");
  if key.is_empty() || bad_segment || key.contains(['\\', '\0']) {
    return Err(Error::InvalidArtifactKey(key.to_owned()));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn canonical_form_is_compact_json_with_name_first() {
    let payload = TokenPayload::new("Ada Lovelace", "S100").unwrap();
    assert_eq!(
      payload.canonical().unwrap(),
      r#"{"name":"Ada Lovelace","id":"S100"}"#
    );
  }

  #[test]
  fn canonical_form_escapes_quotes() {
    let payload = TokenPayload::new("Ada \"Countess\"", "S1").unwrap();
    assert_eq!(
      payload.canonical().unwrap(),
      r#"{"name":"Ada \"Countess\"","id":"S1"}"#
    );
  }

  #[test]
  fn empty_fields_are_rejected() {
    assert!(matches!(
      TokenPayload::new("", "S1"),
      Err(Error::EmptyField("subject name"))
    ));
    assert!(matches!(
      TokenPayload::new("Ada", "   "),
      Err(Error::EmptyField("subject id"))
    ));
  }

  #[test]
  fn path_like_subject_ids_are_rejected() {
    for id in ["/S1", "../S1", "a/b", "a\\b", "nul\0id"] {
      assert!(
        matches!(TokenPayload::new("Ada", id), Err(Error::InvalidSubjectId(_))),
        "{id:?}"
      );
    }
    assert!(TokenPayload::new("Ada", "..").is_ok());
    assert!(TokenPayload::new("Ada", "2024.S1").is_ok());
  }

  #[test]
  fn artifact_key_is_namespaced() {
    assert_eq!(artifact_key("S100"), "qrcodes/S100.png");
  }

  #[test]
  fn key_validation() {
    assert!(validate_artifact_key("qrcodes/S100.png").is_ok());
    assert!(validate_artifact_key("qrcodes/../etc/passwd").is_err());
    assert!(validate_artifact_key("/abs.png").is_err());
    assert!(validate_artifact_key("a//b").is_err());
    assert!(validate_artifact_key("a\\b").is_err());
    assert!(validate_artifact_key("").is_err());
  }
}
