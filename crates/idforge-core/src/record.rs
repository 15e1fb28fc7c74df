//! The frozen identity snapshot.
//!
//! An [`IdentityRecord`] only comes into existence through
//! [`crate::validate()`], so every instance satisfies the field invariants.
//! Fields are private; the snapshot is never edited in place. A new draft
//! produces a new snapshot that replaces the old one wholesale.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::photo::Photo;

// ─── Snapshot identity ───────────────────────────────────────────────────────

/// Identifies one snapshot; a rendered card records the id it was built from.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SnapshotId(Uuid);

impl SnapshotId {
  pub(crate) fn new() -> Self { Self(Uuid::new_v4()) }

  pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl fmt::Display for SnapshotId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.0, f)
  }
}

// ─── Year of study ───────────────────────────────────────────────────────────

/// Year of study, drawn from the closed set `{1, 2, 3, 4, 5}`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct YearOfStudy(u8);

impl YearOfStudy {
  pub const FIRST: Self = Self(1);
  pub const LAST: Self = Self(5);

  /// Every selectable year, in order.
  pub fn all() -> impl Iterator<Item = Self> {
    (Self::FIRST.0..=Self::LAST.0).map(Self)
  }

  pub fn get(self) -> u8 { self.0 }
}

impl TryFrom<u8> for YearOfStudy {
  type Error = u8;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    if (Self::FIRST.0..=Self::LAST.0).contains(&value) {
      Ok(Self(value))
    } else {
      Err(value)
    }
  }
}

impl From<YearOfStudy> for u8 {
  fn from(year: YearOfStudy) -> Self { year.0 }
}

impl fmt::Display for YearOfStudy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// ─── IdentityRecord ──────────────────────────────────────────────────────────

/// A validated, immutable identity snapshot.
#[derive(Debug, Clone)]
pub struct IdentityRecord {
  pub(crate) snapshot_id:   SnapshotId,
  pub(crate) full_name:     String,
  pub(crate) identifier:    String,
  pub(crate) program:       String,
  pub(crate) year_of_study: YearOfStudy,
  pub(crate) email:         String,
  pub(crate) phone:         String,
  pub(crate) photo:         Option<Photo>,
}

impl IdentityRecord {
  pub fn snapshot_id(&self) -> SnapshotId { self.snapshot_id }

  pub fn full_name(&self) -> &str { &self.full_name }

  pub fn identifier(&self) -> &str { &self.identifier }

  pub fn program(&self) -> &str { &self.program }

  pub fn year_of_study(&self) -> YearOfStudy { self.year_of_study }

  pub fn email(&self) -> &str { &self.email }

  pub fn phone(&self) -> &str { &self.phone }

  pub fn photo(&self) -> Option<&Photo> { self.photo.as_ref() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn year_accepts_only_one_through_five() {
    assert!(YearOfStudy::try_from(0).is_err());
    assert_eq!(YearOfStudy::try_from(3).unwrap().get(), 3);
    assert!(YearOfStudy::try_from(6).is_err());
  }

  #[test]
  fn all_years_are_listed_in_order() {
    let years: Vec<u8> = YearOfStudy::all().map(YearOfStudy::get).collect();
    assert_eq!(years, vec![1, 2, 3, 4, 5]);
  }

  #[test]
  fn snapshot_ids_are_unique() {
    assert_ne!(SnapshotId::new(), SnapshotId::new());
  }
}
