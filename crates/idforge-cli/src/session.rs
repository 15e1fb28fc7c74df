//! The export orchestrator.
//!
//! A [`Session`] owns the current card and the "generation in progress"
//! gate. `submit` replaces the card wholesale; `export` runs capture,
//! packaging and delivery as one linear pipeline and reduces the outcome
//! to a single [`Notice`].

use std::{fmt, path::PathBuf, sync::Arc};

use idforge_core::{IdentityDraft, SnapshotId, encode};
use idforge_pdf::package;
use idforge_render::{Capture, CardRenderer, RenderedCard};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::{
  delivery::Delivery,
  error::{ExportError, SubmitError},
};

// ─── Notices ─────────────────────────────────────────────────────────────────

/// The single user-visible outcome of an export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
  Downloaded { path: PathBuf },
  Failed,
  Busy,
  NothingToExport,
}

impl Notice {
  pub fn message(&self) -> &'static str {
    match self {
      Self::Downloaded { .. } => "ID Card downloaded successfully!",
      Self::Failed => "Failed to generate PDF. Please try again.",
      Self::Busy => "A PDF is already being generated.",
      Self::NothingToExport => "Nothing to export yet.",
    }
  }

  pub fn is_success(&self) -> bool { matches!(self, Self::Downloaded { .. }) }
}

impl fmt::Display for Notice {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.message())
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

pub struct Session<C, D> {
  renderer: CardRenderer,
  capture:  C,
  delivery: D,
  scale:    f32,
  card:     Option<Arc<RenderedCard>>,
  gate:     Semaphore,
}

impl<C: Capture, D: Delivery> Session<C, D> {
  pub fn new(renderer: CardRenderer, capture: C, delivery: D, scale: f32) -> Self {
    Self {
      renderer,
      capture,
      delivery,
      scale,
      card: None,
      gate: Semaphore::new(1),
    }
  }

  /// Validate `draft` and, on success, replace the current card with one
  /// rendered from the new snapshot. On rejection the draft comes back with
  /// every field error and the current card is kept.
  pub fn submit(&mut self, draft: IdentityDraft) -> Result<SnapshotId, SubmitError> {
    let record = draft.finalize().inspect_err(|rejected| {
      debug!(errors = %rejected.errors, "draft rejected");
    })?;
    let payload = encode(&record);
    let card = self.renderer.render(&record, &payload)?;

    let id = card.snapshot_id();
    debug!(snapshot = %id, payload_len = payload.as_str().len(), "card rendered");
    self.card = Some(Arc::new(card));
    Ok(id)
  }

  /// The card the next export will use.
  pub fn card(&self) -> Option<&RenderedCard> { self.card.as_deref() }

  pub fn scale(&self) -> f32 { self.scale }

  /// Whether an export is in flight.
  pub fn is_generating(&self) -> bool { self.gate.available_permits() == 0 }

  /// Run an export and report its outcome.
  pub async fn export(&self) -> Notice {
    match self.try_export().await {
      Ok(path) => {
        info!(path = %path.display(), "document delivered");
        Notice::Downloaded { path }
      }
      Err(ExportError::Busy) => {
        warn!("export requested while another is in progress");
        Notice::Busy
      }
      Err(ExportError::NoCard) => Notice::NothingToExport,
      Err(e) => {
        error!(error = %e, "export failed");
        Notice::Failed
      }
    }
  }

  /// Capture, package and deliver the current card. The gate is held for
  /// the whole pipeline and released on every exit path.
  pub async fn try_export(&self) -> Result<PathBuf, ExportError> {
    let _permit = self.gate.try_acquire().map_err(|_| ExportError::Busy)?;
    let card = self.card.clone().ok_or(ExportError::NoCard)?;

    let bitmap = self.capture.capture(Arc::clone(&card), self.scale).await?;
    debug!(width = bitmap.width(), height = bitmap.height(), "card captured");

    let holder = card.holder_name().to_owned();
    let document = tokio::task::spawn_blocking(move || package(&bitmap, &holder))
      .await
      .map_err(|e| idforge_pdf::Error::Io(std::io::Error::other(e)))??;
    info!(
      file = %document.file_name,
      bytes = document.bytes.len(),
      digest = %document.digest,
      "document packaged"
    );

    Ok(self.delivery.deliver(document).await?)
  }
}
