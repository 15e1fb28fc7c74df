//! The mutable entry draft.
//!
//! The entry surface owns an [`IdentityDraft`] while the user types. It is
//! turned into an [`IdentityRecord`] exactly once, by
//! [`IdentityDraft::finalize`], which consumes it.

use thiserror::Error;

use crate::{
  photo::Photo,
  record::IdentityRecord,
  validate::{FieldErrors, validate},
};

/// Working state for one card request. Every field is raw user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityDraft {
  pub full_name:     String,
  pub identifier:    String,
  pub program:       String,
  /// Kept as text; the year picker starts at `"1"`.
  pub year_of_study: String,
  pub email:         String,
  pub phone:         String,
  pub photo:         Option<Photo>,
}

impl Default for IdentityDraft {
  fn default() -> Self {
    Self {
      full_name:     String::new(),
      identifier:    String::new(),
      program:       String::new(),
      year_of_study: "1".to_string(),
      email:         String::new(),
      phone:         String::new(),
      photo:         None,
    }
  }
}

impl IdentityDraft {
  pub fn new() -> Self { Self::default() }

  pub fn set_full_name(&mut self, value: impl Into<String>) -> &mut Self {
    self.full_name = value.into();
    self
  }

  pub fn set_identifier(&mut self, value: impl Into<String>) -> &mut Self {
    self.identifier = value.into();
    self
  }

  pub fn set_program(&mut self, value: impl Into<String>) -> &mut Self {
    self.program = value.into();
    self
  }

  pub fn set_year_of_study(&mut self, value: impl Into<String>) -> &mut Self {
    self.year_of_study = value.into();
    self
  }

  pub fn set_email(&mut self, value: impl Into<String>) -> &mut Self {
    self.email = value.into();
    self
  }

  pub fn set_phone(&mut self, value: impl Into<String>) -> &mut Self {
    self.phone = value.into();
    self
  }

  pub fn set_photo(&mut self, photo: Option<Photo>) -> &mut Self {
    self.photo = photo;
    self
  }

  /// Freeze the draft into a snapshot.
  ///
  /// On failure the untouched draft comes back alongside every field error,
  /// so the caller can show all of them and let the user keep editing.
  pub fn finalize(self) -> Result<IdentityRecord, Rejected> {
    match validate(&self) {
      Ok(record) => Ok(record),
      Err(errors) => Err(Rejected {
        draft: self,
        errors,
      }),
    }
  }
}

/// A draft that failed validation, returned to its owner.
#[derive(Debug, Error)]
#[error("{errors}")]
pub struct Rejected {
  pub draft:  IdentityDraft,
  pub errors: FieldErrors,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{fixtures::john_doe, validate::Field};

  #[test]
  fn default_year_is_first() {
    assert_eq!(IdentityDraft::new().year_of_study, "1");
  }

  #[test]
  fn finalize_produces_snapshot() {
    let record = john_doe().finalize().expect("valid draft");
    assert_eq!(record.full_name(), "John Doe");
    assert_eq!(record.year_of_study().get(), 1);
    assert!(record.photo().is_none());
  }

  #[test]
  fn rejected_draft_is_handed_back_intact() {
    let mut draft = john_doe();
    draft.set_email("not-an-email");
    let expected = draft.clone();

    let rejected = draft.finalize().unwrap_err();
    assert_eq!(rejected.draft, expected);
    assert!(rejected.errors.contains(Field::Email));
  }

  #[test]
  fn each_finalize_yields_a_new_snapshot() {
    let a = john_doe().finalize().unwrap();
    let b = john_doe().finalize().unwrap();
    assert_ne!(a.snapshot_id(), b.snapshot_id());
  }
}
