//! Core types for the idforge card pipeline.
//!
//! Holds the mutable entry draft, the frozen identity snapshot, the record
//! validator and the payload encoder. Free of imaging, PDF and async
//! dependencies; every other crate in the workspace builds on this one.

pub mod draft;
pub mod error;
pub mod payload;
pub mod photo;
pub mod record;
pub mod validate;

pub use draft::{IdentityDraft, Rejected};
pub use error::{Error, Result};
pub use payload::{EncodedPayload, MAX_PAYLOAD_BYTES, PayloadFields, encode};
pub use photo::{Photo, SUPPORTED_MEDIA_TYPES};
pub use record::{IdentityRecord, SnapshotId, YearOfStudy};
pub use validate::{Field, FieldError, FieldErrorKind, FieldErrors, validate};

// ─── Shared test fixtures ─────────────────────────────────────────────────────

/// Drafts shared by the tests of every crate in the workspace. Other crates
/// reach them through the `test-fixtures` feature on a dev-dependency.
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures {
  use crate::draft::IdentityDraft;

  /// The draft used throughout the end-to-end scenario.
  pub fn john_doe() -> IdentityDraft {
    let mut draft = IdentityDraft::new();
    draft
      .set_full_name("John Doe")
      .set_identifier("12345678")
      .set_program("Computer Science")
      .set_year_of_study("1")
      .set_email("john@university.edu")
      .set_phone("+1 234 567 8900");
    draft
  }
}
