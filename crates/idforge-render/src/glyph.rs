//! Scannable glyph: a QR code of the payload text.
//!
//! Always encoded at error-correction level H so the card still scans after
//! printing, photocopying or photographing at low fidelity.

use idforge_core::EncodedPayload;
use image::{GrayImage, Luma};
use qrcode::{Color as Module, EcLevel, QrCode};

use crate::Result;

/// The decoded module matrix of a QR code, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannableGlyph {
  width:   usize,
  modules: Vec<bool>,
}

impl ScannableGlyph {
  pub const EC_LEVEL: EcLevel = EcLevel::H;

  /// Encode `payload` at the fixed correction level.
  pub fn encode(payload: &EncodedPayload) -> Result<Self> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), Self::EC_LEVEL)?;
    let modules = code
      .to_colors()
      .into_iter()
      .map(|m| m == Module::Dark)
      .collect();
    Ok(Self {
      width: code.width(),
      modules,
    })
  }

  /// Modules per side.
  pub fn width(&self) -> usize { self.width }

  /// Whether the module at column `x`, row `y` is dark.
  pub fn is_dark(&self, x: usize, y: usize) -> bool {
    x < self.width && y < self.width && self.modules[y * self.width + x]
  }

  /// Pixels per module when the glyph is fitted into a `slot_px` square.
  /// Never resamples: the result is a whole number, at least one.
  pub fn module_px(&self, slot_px: u32) -> u32 {
    (slot_px / self.width as u32).max(1)
  }

  /// Render black-on-white with `module_px` pixels per module and a light
  /// border of `quiet_modules` modules on every side.
  pub fn to_luma(&self, module_px: u32, quiet_modules: u32) -> GrayImage {
    let module_px = module_px.max(1);
    let side = (self.width as u32 + 2 * quiet_modules) * module_px;
    GrayImage::from_fn(side, side, |px, py| {
      let mx = (px / module_px).checked_sub(quiet_modules);
      let my = (py / module_px).checked_sub(quiet_modules);
      match (mx, my) {
        (Some(mx), Some(my)) if self.is_dark(mx as usize, my as usize) => Luma([0]),
        _ => Luma([255]),
      }
    })
  }
}
