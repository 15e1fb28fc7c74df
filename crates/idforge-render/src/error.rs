//! Error types for `idforge-render`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("scale must be a positive finite number, got {0}")]
  InvalidScale(f32),

  #[error("canvas of {width}x{height} px exceeds the {max} px limit")]
  CanvasTooLarge { width: u32, height: u32, max: u32 },

  #[error("photo could not be loaded: {0}")]
  Photo(#[from] image::ImageError),

  #[error("payload does not fit a scannable glyph: {0}")]
  Glyph(#[from] qrcode::types::QrError),

  #[error("not a usable TrueType font: {0:?}")]
  Font(PathBuf),

  #[error("capture failed: {0}")]
  Capture(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
