//! Error types for the export session.

use idforge_core::Rejected;
use thiserror::Error;

/// Why [`crate::Session::submit`] did not replace the current card.
#[derive(Debug, Error)]
pub enum SubmitError {
  #[error(transparent)]
  Rejected(#[from] Rejected),

  #[error("card could not be rendered: {0}")]
  Render(#[from] idforge_render::Error),
}

/// A failed export. Every variant leaves no file behind.
#[derive(Debug, Error)]
pub enum ExportError {
  #[error("an export is already in progress")]
  Busy,

  #[error("no card has been rendered yet")]
  NoCard,

  #[error("rasterization failed: {0}")]
  RasterizationFailed(#[from] idforge_render::Error),

  #[error("packaging failed: {0}")]
  PackagingFailed(#[from] idforge_pdf::Error),

  #[error("delivery failed: {0}")]
  DeliveryFailed(#[from] std::io::Error),
}
