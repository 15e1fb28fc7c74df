//! PDF packaging for rasterized ID cards.
//!
//! A card bitmap is placed at the top-left of a single A4 portrait page,
//! scaled to the full page width with its aspect ratio preserved.

pub mod document;
pub mod error;

pub use document::{ExportedDocument, package};
pub use error::{Error, Result};

/// Millimetres per PDF point.
const MM_PER_PT: f32 = 25.4 / 72.0;

/// Physical page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFormat {
  pub width_mm:  f32,
  pub height_mm: f32,
}

impl PageFormat {
  /// ISO 216 A4, portrait.
  pub const A4: Self = Self {
    width_mm:  210.0,
    height_mm: 297.0,
  };

  pub fn width_pt(&self) -> f32 { mm_to_pt(self.width_mm) }

  pub fn height_pt(&self) -> f32 { mm_to_pt(self.height_mm) }
}

/// Where the card image sits on the page, in millimetres from the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
  pub x_mm:      f32,
  pub y_mm:      f32,
  pub width_mm:  f32,
  pub height_mm: f32,
}

impl Placement {
  /// Full page width at the page origin; height follows the bitmap's
  /// aspect ratio.
  pub fn full_width(page: PageFormat, width_px: u32, height_px: u32) -> Self {
    let width_mm = page.width_mm;
    Self {
      x_mm: 0.0,
      y_mm: 0.0,
      width_mm,
      height_mm: width_mm * height_px as f32 / width_px as f32,
    }
  }
}

pub fn mm_to_pt(mm: f32) -> f32 { mm / MM_PER_PT }

/// `<Name_With_Underscores>_id_card.pdf`: every run of whitespace in
/// `full_name` becomes a single underscore. Path separators and control
/// characters become underscores too and leading dots are dropped, so the
/// result is always a single plain file name.
pub fn file_name_for(full_name: &str) -> String {
  let mut stem = String::with_capacity(full_name.len());
  let mut in_space = false;
  for c in full_name.chars() {
    if c.is_whitespace() {
      if !in_space {
        stem.push('_');
      }
      in_space = true;
      continue;
    }
    in_space = false;
    if c == '/' || c == '\\' || c.is_control() {
      stem.push('_');
    } else {
      stem.push(c);
    }
  }
  format!("{}_id_card.pdf", stem.trim_start_matches('.'))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_name_replaces_whitespace_runs() {
    assert_eq!(file_name_for("John Doe"), "John_Doe_id_card.pdf");
    assert_eq!(
      file_name_for("Mary  Ann\tvan Dyke"),
      "Mary_Ann_van_Dyke_id_card.pdf"
    );
    assert_eq!(file_name_for(" Ada "), "_Ada__id_card.pdf");
  }

  #[test]
  fn file_name_never_leaves_the_directory() {
    assert_eq!(
      file_name_for("Anne/Marie Curie"),
      "Anne_Marie_Curie_id_card.pdf"
    );
    assert_eq!(file_name_for("./../escape"), "_.._escape_id_card.pdf");
    assert_eq!(file_name_for("a\\b"), "a_b_id_card.pdf");
    assert_eq!(file_name_for("Zo\u{eb}\u{7}"), "Zo\u{eb}__id_card.pdf");
    assert_eq!(file_name_for("..."), "_id_card.pdf");

    for name in ["./../escape", "/etc/passwd", "..\\..\\x", "\u{0}"] {
      let file = file_name_for(name);
      let mut parts = std::path::Path::new(&file).components();
      assert!(
        matches!(parts.next(), Some(std::path::Component::Normal(_))),
        "{file}"
      );
      assert!(parts.next().is_none(), "{file}");
    }
  }

  #[test]
  fn placement_preserves_aspect_ratio() {
    let p = Placement::full_width(PageFormat::A4, 800, 500);
    assert_eq!(p.width_mm, 210.0);
    assert!((p.height_mm - 131.25).abs() < 1e-4);
    assert_eq!((p.x_mm, p.y_mm), (0.0, 0.0));
  }

  #[test]
  fn a4_in_points() {
    assert!((PageFormat::A4.width_pt() - 595.276).abs() < 0.01);
    assert!((PageFormat::A4.height_pt() - 841.89).abs() < 0.01);
  }
}
