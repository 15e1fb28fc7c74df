//! The software image-capture facility.

use std::{future::Future, sync::Arc};

use idforge_render::{Bitmap, Capture, Error, RenderedCard, Result, rasterize};

/// Rasterizes on tokio's blocking pool so the caller's task stays
/// responsive.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareCapture;

impl Capture for SoftwareCapture {
  fn capture(
    &self,
    card: Arc<RenderedCard>,
    scale: f32,
  ) -> impl Future<Output = Result<Bitmap>> + Send + '_ {
    async move {
      tokio::task::spawn_blocking(move || rasterize(&card, scale))
        .await
        .map_err(|e| Error::Capture(e.to_string()))?
    }
  }
}
