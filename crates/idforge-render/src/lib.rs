//! Card layout and rasterization for idforge.
//!
//! [`CardRenderer`] turns a validated snapshot into a [`RenderedCard`], a
//! fixed-size display list carrying the scannable glyph. [`rasterize`]
//! paints that list into a [`Bitmap`] at any scale; [`Capture`] is the
//! async seam the export pipeline drives it through.

pub mod card;
pub mod error;
pub mod geometry;
pub mod glyph;
pub mod raster;
pub mod typeface;

pub use card::{CARD_HEIGHT, CARD_WIDTH, CardRenderer, Layer, RenderedCard};
pub use error::{Error, Result};
pub use geometry::{Color, Point, Rect};
pub use glyph::ScannableGlyph;
pub use raster::{Bitmap, Capture, DEFAULT_SCALE, MAX_BITMAP_SIDE, rasterize};
pub use typeface::{TextStyle, Typeface};

// ─── Shared test helpers ──────────────────────────────────────────────────────
