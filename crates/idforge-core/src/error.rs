//! Error types for `idforge-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("not a data URL: expected `data:<media>;base64,<data>`")]
  InvalidDataUrl,

  #[error("photo data is not valid base64: {0}")]
  Base64(#[from] base64::DecodeError),

  #[error("payload JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
