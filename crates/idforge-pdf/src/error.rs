//! Error types for `idforge-pdf`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot package an empty bitmap")]
  EmptyBitmap,

  #[error("pdf error: {0}")]
  Pdf(#[from] lopdf::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
