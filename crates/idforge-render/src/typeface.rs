//! Typefaces used to measure and draw card text.
//!
//! The built-in face is an 8×8 bitmap font that needs no files on disk. A
//! TrueType face can be loaded from a configured path instead. The layout
//! renderer measures with the same face the rasterizer draws with, so
//! truncation decisions hold at every scale.

use std::path::Path;

use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use rusttype::{Font, Scale, point};

use crate::{Error, Result, geometry::Color, raster::Canvas};

/// Appended to text cut short by [`Typeface::fit`].
pub const ELLIPSIS: &str = "...";

/// Font units per em for the built-in face; a glyph cell is 8 units.
const BUILTIN_UNITS_PER_EM: f32 = 12.0;

const BUILTIN_CELL: f32 = 8.0;

/// Size, weight and colour of one line of card text, in logical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
  pub size:        f32,
  pub line_height: f32,
  pub bold:        bool,
  pub color:       Color,
}

impl TextStyle {
  pub const fn new(size: f32, line_height: f32, color: Color) -> Self {
    Self {
      size,
      line_height,
      bold: false,
      color,
    }
  }

  pub const fn bold(self) -> Self { Self { bold: true, ..self } }

  /// The same style with every length multiplied by `scale`.
  pub fn scaled(self, scale: f32) -> Self {
    Self {
      size: self.size * scale,
      line_height: self.line_height * scale,
      ..self
    }
  }
}

#[derive(Default)]
pub enum Typeface {
  #[default]
  Builtin,
  TrueType(Font<'static>),
}

impl std::fmt::Debug for Typeface {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Builtin => f.write_str("Typeface::Builtin"),
      Self::TrueType(_) => f.write_str("Typeface::TrueType"),
    }
  }
}

impl Typeface {
  /// Load a TrueType/OpenType font file.
  pub fn load(path: &Path) -> Result<Self> {
    let bytes = std::fs::read(path)?;
    Font::try_from_vec(bytes)
      .map(Self::TrueType)
      .ok_or_else(|| Error::Font(path.to_path_buf()))
  }

  /// Advance width of `text` at font size `size`, in the same units as
  /// `size`.
  pub fn measure(&self, text: &str, size: f32) -> f32 {
    match self {
      Self::Builtin => {
        let unit = size / BUILTIN_UNITS_PER_EM;
        text.chars().count() as f32 * BUILTIN_CELL * unit
      }
      Self::TrueType(font) => font
        .layout(text, Scale::uniform(size), point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0),
    }
  }

  /// Return `text` unchanged if it fits `max_width`; otherwise the longest
  /// prefix that fits with [`ELLIPSIS`] appended. Never wraps.
  pub fn fit(&self, text: &str, max_width: f32, size: f32) -> String {
    if self.measure(text, size) <= max_width {
      return text.to_string();
    }

    // Every proper prefix, by byte offset; widths grow with length, so
    // the cut point is found by bisection.
    let truncated = |end: usize| format!("{}{ELLIPSIS}", text[..end].trim_end());
    let cuts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let fitting = cuts.partition_point(|&end| {
      self.measure(&truncated(end), size) <= max_width
    });
    match fitting.checked_sub(1) {
      Some(last) => truncated(cuts[last]),
      None => ELLIPSIS.to_string(),
    }
  }

  /// Draw `text` into `canvas`. `x`, `y` is the top-left of the line box;
  /// position and style are in device pixels.
  pub(crate) fn draw(
    &self,
    canvas: &mut Canvas,
    text: &str,
    (x, y): (f32, f32),
    style: TextStyle,
  ) {
    let TextStyle {
      size,
      line_height,
      bold,
      color,
    } = style;

    match self {
      Self::Builtin => draw_builtin(canvas, text, (x, y), style),
      Self::TrueType(font) => {
        let scale = Scale::uniform(size);
        let v = font.v_metrics(scale);
        let glyph_height = v.ascent - v.descent;
        let baseline = y + (line_height - glyph_height) / 2.0 + v.ascent;
        let passes = if bold { 2 } else { 1 };

        for pass in 0..passes {
          let dx = pass as f32 * size / 24.0;
          for glyph in font.layout(text, scale, point(x + dx, baseline)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
              continue;
            };
            glyph.draw(|gx, gy, coverage| {
              canvas.blend(bb.min.x + gx as i32, bb.min.y + gy as i32, color, coverage);
            });
          }
        }
      }
    }
  }
}

/// Bitmap for `c`, falling back to `?` outside Basic Latin and Latin-1.
fn builtin_bitmap(c: char) -> [u8; 8] {
  BASIC_FONTS
    .get(c)
    .or_else(|| LATIN_FONTS.get(c))
    .or_else(|| BASIC_FONTS.get('?'))
    .unwrap_or([0; 8])
}

fn draw_builtin(canvas: &mut Canvas, text: &str, (x, y): (f32, f32), style: TextStyle) {
  let TextStyle {
    size,
    line_height,
    bold,
    color,
  } = style;
  let unit = size / BUILTIN_UNITS_PER_EM;
  let top = y + (line_height - BUILTIN_CELL * unit) / 2.0;
  let widen = if bold { unit / 2.0 } else { 0.0 };

  for (i, c) in text.chars().enumerate() {
    let left = x + i as f32 * BUILTIN_CELL * unit;
    for (row, bits) in builtin_bitmap(c).iter().enumerate() {
      for col in 0..8 {
        if bits & (1 << col) == 0 {
          continue;
        }
        let x0 = left + col as f32 * unit;
        let y0 = top + row as f32 * unit;
        canvas.fill_span(x0, y0, x0 + unit + widen, y0 + unit, color);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_measure_is_monospaced() {
    let face = Typeface::Builtin;
    assert_eq!(face.measure("abcd", 12.0), 32.0);
    assert_eq!(face.measure("", 24.0), 0.0);
  }

  #[test]
  fn short_text_is_not_truncated() {
    let face = Typeface::Builtin;
    assert_eq!(face.fit("John Doe", 240.0, 24.0), "John Doe");
  }

  #[test]
  fn long_text_is_truncated_with_ellipsis() {
    let face = Typeface::Builtin;
    let name = "Maximiliana Alexandrovna Konstantinopolskaya";
    let fitted = face.fit(name, 240.0, 24.0);
    assert!(fitted.ends_with(ELLIPSIS));
    assert!(face.measure(&fitted, 24.0) <= 240.0);
    assert!(name.starts_with(fitted.trim_end_matches(ELLIPSIS)));
  }

  #[test]
  fn huge_text_keeps_the_longest_fitting_prefix() {
    let face = Typeface::Builtin;
    let text = "\u{e9}".repeat(20_000);
    let fitted = face.fit(&text, 240.0, 24.0);
    // 16 units per cell: twelve letters and the ellipsis.
    assert_eq!(fitted, format!("{}{ELLIPSIS}", "\u{e9}".repeat(12)));
  }

  #[test]
  fn truncation_drops_trailing_space_before_the_ellipsis() {
    let face = Typeface::Builtin;
    let fitted = face.fit("Ada       Lovelace", 160.0, 24.0);
    assert_eq!(fitted, format!("Ada{ELLIPSIS}"));
  }

  #[test]
  fn nothing_fits_yields_bare_ellipsis() {
    let face = Typeface::Builtin;
    assert_eq!(face.fit("Anything", 1.0, 24.0), ELLIPSIS);
  }

  #[test]
  fn unknown_characters_fall_back() {
    assert_eq!(builtin_bitmap('✓'), builtin_bitmap('?'));
    assert_ne!(builtin_bitmap('é'), builtin_bitmap('?'));
  }

  #[test]
  fn missing_font_file_is_an_error() {
    let err = Typeface::load(Path::new("/nonexistent/font.ttf")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
  }
}
