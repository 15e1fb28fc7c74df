//! Runtime settings, layered from an optional TOML file and `IDFORGE_*`
//! environment variables.

use std::path::{Path, PathBuf};

use idforge_render::{CardRenderer, DEFAULT_SCALE, Typeface, card::DEFAULT_GLYPH_SIZE};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Device pixels per logical unit when rasterizing.
  pub scale:      f32,
  /// Where exported documents are written.
  pub output_dir: PathBuf,
  /// TrueType font for card text; the built-in face when unset.
  pub font_path:  Option<PathBuf>,
  /// Logical side of the scannable glyph.
  pub glyph_size: f32,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      scale:      DEFAULT_SCALE,
      output_dir: PathBuf::from("."),
      font_path:  None,
      glyph_size: DEFAULT_GLYPH_SIZE,
    }
  }
}

impl Settings {
  /// Read `path` if it exists, then apply the environment on top.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("IDFORGE"))
      .build()?
      .try_deserialize()
  }

  /// A renderer using the configured typeface and glyph size.
  pub fn renderer(&self) -> idforge_render::Result<CardRenderer> {
    let typeface = match &self.font_path {
      Some(path) => Typeface::load(path)?,
      None => Typeface::Builtin,
    };
    Ok(CardRenderer::new(typeface).with_glyph_size(self.glyph_size))
  }
}
