//! Record validator.
//!
//! [`validate`] is a pure function of the draft. It checks every field and
//! collects every failure before returning, so the entry surface can show
//! all errors at once. Validation failures are user input problems, not
//! system faults.

use std::fmt;

use thiserror::Error;

use crate::{
  draft::IdentityDraft,
  payload::{MAX_PAYLOAD_BYTES, PayloadRef},
  record::{IdentityRecord, SnapshotId, YearOfStudy},
};

/// Longest accepted value for any free-text field.
pub const MAX_FIELD_CHARS: usize = 120;

/// Largest accepted photo upload.
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// Minimum count of digits, spaces and hyphens in a phone number.
const MIN_PHONE_CHARS: usize = 10;

// ─── Error types ─────────────────────────────────────────────────────────────

/// A draft field, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
  FullName,
  Identifier,
  Program,
  YearOfStudy,
  Email,
  Phone,
  Photo,
}

impl Field {
  /// Label shown next to the input.
  pub fn label(self) -> &'static str {
    match self {
      Self::FullName => "Name",
      Self::Identifier => "Student ID",
      Self::Program => "Program",
      Self::YearOfStudy => "Year of study",
      Self::Email => "Email",
      Self::Phone => "Phone",
      Self::Photo => "Profile picture",
    }
  }
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
  Missing,
  InvalidFormat,
  OutOfRange,
  TooLong,
  TooLarge,
}

/// One rejected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{}", self.message())]
pub struct FieldError {
  pub field: Field,
  pub kind:  FieldErrorKind,
}

impl FieldError {
  /// The user-facing message for this error.
  pub fn message(&self) -> String {
    let label = self.field.label();
    match (self.field, self.kind) {
      (_, FieldErrorKind::Missing) => format!("{label} is required"),
      (Field::Photo, FieldErrorKind::InvalidFormat) => {
        format!("{label} must be a PNG, JPEG, GIF, BMP or WebP image")
      }
      (_, FieldErrorKind::InvalidFormat) => {
        format!("Invalid {} format", label.to_lowercase())
      }
      (_, FieldErrorKind::OutOfRange) => format!(
        "{label} must be between {} and {}",
        YearOfStudy::FIRST,
        YearOfStudy::LAST
      ),
      (_, FieldErrorKind::TooLong) => format!("{label} is too long"),
      (_, FieldErrorKind::TooLarge) => {
        format!("{label} must be 10MB or smaller")
      }
    }
  }
}

/// Every error found in one draft, in field order. Never empty when
/// returned from [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
  fn push(&mut self, field: Field, kind: FieldErrorKind) {
    self.0.push(FieldError { field, kind });
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = &FieldError> { self.0.iter() }

  /// The rejected fields, in form order.
  pub fn fields(&self) -> Vec<Field> {
    self.0.iter().map(|e| e.field).collect()
  }

  pub fn contains(&self, field: Field) -> bool {
    self.0.iter().any(|e| e.field == field)
  }

  /// The error recorded for `field`, if any.
  pub fn get(&self, field: Field) -> Option<&FieldError> {
    self.0.iter().find(|e| e.field == field)
  }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, error) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{error}")?;
    }
    Ok(())
  }
}

impl std::error::Error for FieldErrors {}

impl<'a> IntoIterator for &'a FieldErrors {
  type Item = &'a FieldError;
  type IntoIter = std::slice::Iter<'a, FieldError>;

  fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

// ─── Predicates ──────────────────────────────────────────────────────────────

/// `local@domain.tld`: one `@`, a dot inside the domain with text on both
/// sides, and no whitespace anywhere.
pub fn is_valid_email(value: &str) -> bool {
  if value.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = value.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.contains('@') {
    return false;
  }
  domain
    .char_indices()
    .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// An optional `+`, then at least ten digits, spaces or hyphens.
pub fn is_valid_phone(value: &str) -> bool {
  let body = value.strip_prefix('+').unwrap_or(value);
  body.chars().count() >= MIN_PHONE_CHARS
    && body
      .chars()
      .all(|c| c.is_ascii_digit() || c.is_whitespace() || c == '-')
}

fn is_blank(value: &str) -> bool { value.trim().is_empty() }

fn is_too_long(value: &str) -> bool { value.chars().count() > MAX_FIELD_CHARS }

const PAYLOAD_FIELDS: [Field; 4] =
  [Field::FullName, Field::Identifier, Field::Program, Field::Email];

/// The payload field taking the most bytes once serialised.
fn widest_payload_field(payload: &PayloadRef<'_>) -> Field {
  [
    (Field::FullName, payload.name),
    (Field::Identifier, payload.id),
    (Field::Program, payload.program),
    (Field::Email, payload.email),
  ]
  .into_iter()
  .max_by_key(|(_, value)| serde_json::to_string(value).map_or(0, |s| s.len()))
  .map_or(Field::FullName, |(field, _)| field)
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Check `draft` and, when every field passes, freeze it into a snapshot.
pub fn validate(draft: &IdentityDraft) -> Result<IdentityRecord, FieldErrors> {
  let mut errors = FieldErrors::default();

  for (field, value) in [
    (Field::FullName, &draft.full_name),
    (Field::Identifier, &draft.identifier),
    (Field::Program, &draft.program),
  ] {
    if is_blank(value) {
      errors.push(field, FieldErrorKind::Missing);
    } else if is_too_long(value.trim()) {
      errors.push(field, FieldErrorKind::TooLong);
    }
  }

  let year = if is_blank(&draft.year_of_study) {
    errors.push(Field::YearOfStudy, FieldErrorKind::Missing);
    None
  } else {
    let parsed = draft
      .year_of_study
      .trim()
      .parse::<u8>()
      .ok()
      .and_then(|n| YearOfStudy::try_from(n).ok());
    if parsed.is_none() {
      errors.push(Field::YearOfStudy, FieldErrorKind::OutOfRange);
    }
    parsed
  };

  if is_blank(&draft.email) {
    errors.push(Field::Email, FieldErrorKind::Missing);
  } else if is_too_long(&draft.email) {
    errors.push(Field::Email, FieldErrorKind::TooLong);
  } else if !is_valid_email(&draft.email) {
    errors.push(Field::Email, FieldErrorKind::InvalidFormat);
  }

  // Short fields can still add up to more than the glyph holds once
  // UTF-8 and JSON escaping are counted.
  if PAYLOAD_FIELDS.iter().all(|f| !errors.contains(*f)) {
    let payload = PayloadRef {
      name:    draft.full_name.trim(),
      id:      draft.identifier.trim(),
      program: draft.program.trim(),
      email:   &draft.email,
    };
    if payload.to_text().len() > MAX_PAYLOAD_BYTES {
      errors.push(widest_payload_field(&payload), FieldErrorKind::TooLong);
    }
  }

  if is_blank(&draft.phone) {
    errors.push(Field::Phone, FieldErrorKind::Missing);
  } else if is_too_long(&draft.phone) {
    errors.push(Field::Phone, FieldErrorKind::TooLong);
  } else if !is_valid_phone(&draft.phone) {
    errors.push(Field::Phone, FieldErrorKind::InvalidFormat);
  }

  if let Some(photo) = &draft.photo {
    if !photo.is_supported() {
      errors.push(Field::Photo, FieldErrorKind::InvalidFormat);
    } else if photo.len() > MAX_PHOTO_BYTES {
      errors.push(Field::Photo, FieldErrorKind::TooLarge);
    }
  }

  errors.0.sort_by_key(|e| e.field);

  match year {
    Some(year_of_study) if errors.is_empty() => Ok(IdentityRecord {
      snapshot_id: SnapshotId::new(),
      full_name: draft.full_name.trim().to_string(),
      identifier: draft.identifier.trim().to_string(),
      program: draft.program.trim().to_string(),
      year_of_study,
      email: draft.email.clone(),
      phone: draft.phone.clone(),
      photo: draft.photo.clone(),
    }),
    _ => Err(errors),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{photo::Photo, fixtures::john_doe};

  fn errors_for(draft: &IdentityDraft) -> FieldErrors {
    validate(draft).expect_err("draft should be rejected")
  }

  #[test]
  fn complete_draft_validates() {
    let record = validate(&john_doe()).expect("complete draft");
    assert_eq!(record.identifier(), "12345678");
    assert_eq!(record.program(), "Computer Science");
    assert_eq!(record.email(), "john@university.edu");
    assert_eq!(record.phone(), "+1 234 567 8900");
  }

  #[test]
  fn empty_draft_reports_every_required_field() {
    let errors = errors_for(&IdentityDraft::new());
    assert_eq!(
      errors.fields(),
      vec![
        Field::FullName,
        Field::Identifier,
        Field::Program,
        Field::Email,
        Field::Phone,
      ]
    );
    assert!(
      errors
        .iter()
        .all(|e| e.kind == FieldErrorKind::Missing)
    );
  }

  #[test]
  fn only_the_broken_fields_are_reported() {
    let mut draft = john_doe();
    draft.set_program("").set_phone("12345");
    let errors = errors_for(&draft);
    assert_eq!(errors.fields(), vec![Field::Program, Field::Phone]);
    assert_eq!(
      errors.get(Field::Phone).map(|e| e.kind),
      Some(FieldErrorKind::InvalidFormat)
    );
  }

  #[test]
  fn whitespace_only_name_is_missing() {
    let mut draft = john_doe();
    draft.set_full_name("   ");
    let errors = errors_for(&draft);
    assert_eq!(
      errors.get(Field::FullName).map(|e| e.kind),
      Some(FieldErrorKind::Missing)
    );
  }

  #[test]
  fn email_predicate() {
    assert!(!is_valid_email("a@b"));
    assert!(!is_valid_email("a.com"));
    assert!(!is_valid_email("a @b.com"));
    assert!(!is_valid_email("a@@b.com"));
    assert!(!is_valid_email("a@.com"));
    assert!(!is_valid_email("a@b."));
    assert!(is_valid_email("john@university.edu"));
    assert!(is_valid_email("first.last@dept.uni.ac.uk"));
  }

  #[test]
  fn malformed_email_is_invalid_format() {
    for bad in ["a@b", "a.com", "a @b.com"] {
      let mut draft = john_doe();
      draft.set_email(bad);
      let errors = errors_for(&draft);
      assert_eq!(errors.fields(), vec![Field::Email], "{bad}");
      assert_eq!(errors.to_string(), "Invalid email format");
    }
  }

  #[test]
  fn phone_predicate() {
    assert!(!is_valid_phone("12345"));
    assert!(!is_valid_phone("+1 (234) 567-8900"));
    assert!(!is_valid_phone("++1234567890"));
    assert!(is_valid_phone("+1 234 567 8900"));
    assert!(is_valid_phone("1234567890"));
    assert!(is_valid_phone("123-456-7890"));
  }

  #[test]
  fn year_outside_closed_set_is_rejected() {
    for bad in ["0", "6", "first", "-1"] {
      let mut draft = john_doe();
      draft.set_year_of_study(bad);
      let errors = errors_for(&draft);
      assert_eq!(
        errors.get(Field::YearOfStudy).map(|e| e.kind),
        Some(FieldErrorKind::OutOfRange),
        "{bad}"
      );
    }
  }

  #[test]
  fn every_year_in_range_is_accepted() {
    for year in YearOfStudy::all() {
      let mut draft = john_doe();
      draft.set_year_of_study(year.to_string());
      assert_eq!(validate(&draft).unwrap().year_of_study(), year);
    }
  }

  #[test]
  fn overlong_identifier_is_rejected() {
    let mut draft = john_doe();
    draft.set_identifier("9".repeat(MAX_FIELD_CHARS + 1));
    let errors = errors_for(&draft);
    assert_eq!(
      errors.get(Field::Identifier).map(|e| e.kind),
      Some(FieldErrorKind::TooLong)
    );
  }

  #[test]
  fn non_image_photo_is_rejected() {
    let mut draft = john_doe();
    draft.set_photo(Some(Photo::new(b"%PDF-1.5".to_vec(), "application/pdf")));
    let errors = errors_for(&draft);
    assert_eq!(errors.fields(), vec![Field::Photo]);
    assert_eq!(
      errors.to_string(),
      "Profile picture must be a PNG, JPEG, GIF, BMP or WebP image"
    );
  }

  #[test]
  fn undecodable_image_types_are_rejected() {
    let mut draft = john_doe();
    draft.set_photo(Some(Photo::new(b"<svg/>".to_vec(), "image/svg+xml")));
    assert_eq!(errors_for(&draft).fields(), vec![Field::Photo]);

    for media_type in ["image/gif", "image/bmp", "image/webp", "image/png", "image/jpeg"] {
      let mut draft = john_doe();
      draft.set_photo(Some(Photo::new(b"GIF89a".to_vec(), media_type)));
      assert!(validate(&draft).is_ok(), "{media_type}");
    }
  }

  #[test]
  fn multibyte_fields_are_capped_by_payload_bytes() {
    let mut draft = john_doe();
    draft
      .set_full_name("\u{1F600}".repeat(MAX_FIELD_CHARS))
      .set_identifier("\u{1F600}".repeat(MAX_FIELD_CHARS))
      .set_program("\u{1F600}".repeat(MAX_FIELD_CHARS));
    let errors = errors_for(&draft);
    assert_eq!(errors.len(), 1);
    let error = errors.iter().next().unwrap();
    assert_eq!(error.kind, FieldErrorKind::TooLong);
    assert!(PAYLOAD_FIELDS.contains(&error.field));
    assert_eq!(error.message(), format!("{} is too long", error.field.label()));
  }

  #[test]
  fn escaped_control_characters_count_toward_the_cap() {
    // Each U+0001 serialises as six bytes.
    let mut draft = john_doe();
    draft
      .set_identifier("\u{1}".repeat(MAX_FIELD_CHARS))
      .set_program("\u{1}".repeat(100));
    let errors = errors_for(&draft);
    assert_eq!(errors.fields(), vec![Field::Identifier]);
    assert_eq!(
      errors.get(Field::Identifier).map(|e| e.kind),
      Some(FieldErrorKind::TooLong)
    );
  }

  #[test]
  fn every_accepted_payload_fits_the_glyph() {
    let mut draft = john_doe();
    draft
      .set_full_name("\u{e9}".repeat(MAX_FIELD_CHARS))
      .set_identifier("\u{e9}".repeat(MAX_FIELD_CHARS))
      .set_program("\u{e9}".repeat(MAX_FIELD_CHARS))
      .set_email(format!("{}@uni.edu", "a".repeat(MAX_FIELD_CHARS - 8)));
    let record = validate(&draft).expect("fits");
    assert!(crate::encode(&record).as_bytes().len() <= MAX_PAYLOAD_BYTES);
  }

  #[test]
  fn overlong_phone_is_rejected() {
    let mut draft = john_doe();
    draft.set_phone("1".repeat(20_000));
    assert_eq!(
      errors_for(&draft).get(Field::Phone).map(|e| e.kind),
      Some(FieldErrorKind::TooLong)
    );
  }

  #[test]
  fn errors_stay_in_field_order() {
    let mut draft = john_doe();
    draft
      .set_full_name("\u{1F600}".repeat(MAX_FIELD_CHARS))
      .set_identifier("\u{1F600}".repeat(MAX_FIELD_CHARS))
      .set_program("\u{1F600}".repeat(MAX_FIELD_CHARS))
      .set_year_of_study("9");
    let fields = errors_for(&draft).fields();
    let mut sorted = fields.clone();
    sorted.sort();
    assert_eq!(fields, sorted);
  }

  #[test]
  fn messages_match_form_wording() {
    let errors = errors_for(&IdentityDraft::new());
    let messages: Vec<String> = errors.iter().map(FieldError::message).collect();
    assert_eq!(
      messages,
      vec![
        "Name is required",
        "Student ID is required",
        "Program is required",
        "Email is required",
        "Phone is required",
      ]
    );
  }

  #[test]
  fn free_text_fields_are_trimmed_in_the_snapshot() {
    let mut draft = john_doe();
    draft.set_full_name("  John Doe ");
    assert_eq!(validate(&draft).unwrap().full_name(), "John Doe");
  }
}
