//! Payload encoder for the scannable glyph.
//!
//! The payload is a compact JSON object with the keys `name`, `id`,
//! `program` and `email`, always in that order. Phone and photo are left out
//! to keep the glyph sparse enough to scan at small print sizes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Result, record::IdentityRecord};

/// The four record fields carried by the glyph. Field order here is the
/// serialised key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadFields {
  pub name:    String,
  pub id:      String,
  pub program: String,
  pub email:   String,
}

/// Canonical payload text. Derived from a snapshot, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedPayload(String);

impl EncodedPayload {
  pub fn as_str(&self) -> &str { &self.0 }

  pub fn as_bytes(&self) -> &[u8] { self.0.as_bytes() }

  /// Parse payload text read back from a scanned glyph.
  pub fn decode(text: &str) -> Result<PayloadFields> {
    Ok(serde_json::from_str(text)?)
  }
}

impl fmt::Display for EncodedPayload {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<[u8]> for EncodedPayload {
  fn as_ref(&self) -> &[u8] { self.as_bytes() }
}

/// Largest payload, in bytes, that fits a QR code at error-correction
/// level H (version 40, byte mode).
pub const MAX_PAYLOAD_BYTES: usize = 1273;

/// The payload fields borrowed from a record or a draft.
#[derive(Serialize)]
pub(crate) struct PayloadRef<'a> {
  pub(crate) name:    &'a str,
  pub(crate) id:      &'a str,
  pub(crate) program: &'a str,
  pub(crate) email:   &'a str,
}

impl PayloadRef<'_> {
  pub(crate) fn to_text(&self) -> String {
    // A struct of plain strings always serialises.
    serde_json::to_string(self).unwrap_or_default()
  }
}

/// Encode the glyph payload for `record`.
pub fn encode(record: &IdentityRecord) -> EncodedPayload {
  let fields = PayloadRef {
    name:    record.full_name(),
    id:      record.identifier(),
    program: record.program(),
    email:   record.email(),
  };
  EncodedPayload(fields.to_text())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{photo::Photo, fixtures::john_doe};

  #[test]
  fn canonical_text_for_end_to_end_record() {
    let record = john_doe().finalize().unwrap();
    assert_eq!(
      encode(&record).as_str(),
      r#"{"name":"John Doe","id":"12345678","program":"Computer Science","email":"john@university.edu"}"#
    );
  }

  #[test]
  fn encoding_is_deterministic_across_snapshots() {
    let a = john_doe().finalize().unwrap();
    let b = john_doe().finalize().unwrap();
    assert_ne!(a.snapshot_id(), b.snapshot_id());
    assert_eq!(encode(&a).as_bytes(), encode(&b).as_bytes());
    assert_eq!(encode(&a), encode(&a));
  }

  #[test]
  fn phone_and_photo_are_excluded() {
    let mut draft = john_doe();
    draft.set_photo(Some(Photo::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg")));
    let record = draft.finalize().unwrap();
    let text = encode(&record).to_string();
    assert!(!text.contains("8900"));
    assert!(!text.contains("phone"));
    assert!(!text.contains("photo"));
  }

  #[test]
  fn special_characters_are_escaped_and_decode_back() {
    let mut draft = john_doe();
    draft.set_full_name(r#"Zoë "Z" O'Brien"#);
    let record = draft.finalize().unwrap();
    let payload = encode(&record);

    let fields = EncodedPayload::decode(payload.as_str()).unwrap();
    assert_eq!(fields.name, r#"Zoë "Z" O'Brien"#);
    assert_eq!(fields.id, "12345678");
  }
}
