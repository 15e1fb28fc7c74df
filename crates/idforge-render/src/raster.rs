//! Software rasterizer for [`RenderedCard`] display lists.
//!
//! Every logical coordinate is multiplied by the scale factor; shapes are
//! sampled at pixel centres and blended source-over. The glyph is the one
//! exception: it is drawn module by module at a whole number of pixels per
//! module so its finest detail survives.

use std::{future::Future, io::Cursor, sync::Arc};

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops::FilterType};

use crate::{
  Error, Result,
  card::{CARD_HEIGHT, CARD_WIDTH, Layer, RenderedCard},
  geometry::{Color, Point, Rect},
  glyph::ScannableGlyph,
  typeface::Typeface,
};

/// Scale used when the caller has no preference.
pub const DEFAULT_SCALE: f32 = 2.0;

/// Largest bitmap side the rasterizer will allocate.
pub const MAX_BITMAP_SIDE: u32 = 8192;

// ─── Bitmap ──────────────────────────────────────────────────────────────────

/// A rasterized card.
#[derive(Debug, Clone)]
pub struct Bitmap {
  image: RgbaImage,
  scale: f32,
}

impl Bitmap {
  pub fn new(image: RgbaImage, scale: f32) -> Self { Self { image, scale } }

  pub fn width(&self) -> u32 { self.image.width() }

  pub fn height(&self) -> u32 { self.image.height() }

  /// The scale factor this bitmap was produced at.
  pub fn scale(&self) -> f32 { self.scale }

  pub fn image(&self) -> &RgbaImage { &self.image }

  pub fn into_image(self) -> RgbaImage { self.image }

  /// Encode as PNG, e.g. for a preview file.
  pub fn to_png(&self) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    self
      .image
      .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
  }
}

// ─── Capture seam ────────────────────────────────────────────────────────────

/// The image-capture facility: turns a rendered card into a bitmap.
///
/// Implementations may take noticeable wall-clock time, so the method is
/// async. A failure must be reported, never papered over with a blank
/// bitmap.
pub trait Capture: Send + Sync {
  fn capture(
    &self,
    card: Arc<RenderedCard>,
    scale: f32,
  ) -> impl Future<Output = Result<Bitmap>> + Send + '_;
}

// ─── Canvas ──────────────────────────────────────────────────────────────────

/// Device-pixel drawing surface shared with the typeface code.
pub(crate) struct Canvas {
  image: RgbaImage,
}

impl Canvas {
  fn new(width: u32, height: u32) -> Self {
    Self {
      image: RgbaImage::new(width, height),
    }
  }

  fn width(&self) -> u32 { self.image.width() }

  fn height(&self) -> u32 { self.image.height() }

  /// Source-over blend of `color` at `coverage` (0.0..=1.0).
  pub(crate) fn blend(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
      return;
    }
    let alpha = color.a as f32 / 255.0 * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
      return;
    }

    let px = self.image.get_pixel_mut(x as u32, y as u32);
    let Rgba([dr, dg, db, da]) = *px;
    let dst_a = da as f32 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    let mix = |s: u8, d: u8| {
      let v = (s as f32 * alpha + d as f32 * dst_a * (1.0 - alpha)) / out_a;
      v.round().clamp(0.0, 255.0) as u8
    };
    *px = Rgba([
      mix(color.r, dr),
      mix(color.g, dg),
      mix(color.b, db),
      (out_a * 255.0).round() as u8,
    ]);
  }

  /// Overwrite a pixel, ignoring what is underneath.
  fn put(&mut self, x: i64, y: i64, color: Color) {
    if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
      return;
    }
    self
      .image
      .put_pixel(x as u32, y as u32, Rgba([color.r, color.g, color.b, color.a]));
  }

  /// Blend every pixel whose centre lies in `[x0, x1) × [y0, y1)`.
  pub(crate) fn fill_span(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Color) {
    let (px0, px1) = ((x0 - 0.5).ceil() as i32, (x1 - 0.5).ceil() as i32);
    let (py0, py1) = ((y0 - 0.5).ceil() as i32, (y1 - 0.5).ceil() as i32);
    for y in py0..py1 {
      for x in px0..px1 {
        self.blend(x, y, color, 1.0);
      }
    }
  }

  /// Visit every pixel centre inside the device-space box, clamped to the
  /// canvas, and blend `color` at the coverage `f` returns.
  fn shade<F>(&mut self, (x0, y0, x1, y1): (f32, f32, f32, f32), color: Color, f: F)
  where
    F: Fn(f32, f32) -> f32,
  {
    let px0 = x0.floor().max(0.0) as u32;
    let py0 = y0.floor().max(0.0) as u32;
    let px1 = (x1.ceil().max(0.0) as u32).min(self.width());
    let py1 = (y1.ceil().max(0.0) as u32).min(self.height());
    for y in py0..py1 {
      for x in px0..px1 {
        let coverage = f(x as f32 + 0.5, y as f32 + 0.5);
        if coverage > 0.0 {
          self.blend(x as i32, y as i32, color, coverage);
        }
      }
    }
  }

  fn into_image(self) -> RgbaImage { self.image }
}

// ─── Rasterize ───────────────────────────────────────────────────────────────

/// Device size of a card at `scale`.
pub fn bitmap_size(scale: f32) -> Result<(u32, u32)> {
  if !scale.is_finite() || scale <= 0.0 {
    return Err(Error::InvalidScale(scale));
  }
  let width = (CARD_WIDTH * scale).ceil();
  let height = (CARD_HEIGHT * scale).ceil();
  let max = MAX_BITMAP_SIDE as f32;
  if width > max || height > max {
    return Err(Error::CanvasTooLarge {
      width: width.min(u32::MAX as f32) as u32,
      height: height.min(u32::MAX as f32) as u32,
      max: MAX_BITMAP_SIDE,
    });
  }
  Ok((width as u32, height as u32))
}

/// Paint every layer of `card` at `scale`.
pub fn rasterize(card: &RenderedCard, scale: f32) -> Result<Bitmap> {
  let (width, height) = bitmap_size(scale)?;
  let mut canvas = Canvas::new(width, height);

  for layer in card.layers() {
    paint(&mut canvas, card.typeface(), layer, scale)?;
  }

  Ok(Bitmap::new(canvas.into_image(), scale))
}

fn paint(canvas: &mut Canvas, face: &Typeface, layer: &Layer, s: f32) -> Result<()> {
  let full = (0.0, 0.0, canvas.width() as f32, canvas.height() as f32);

  match layer {
    Layer::Gradient { stops } => {
      let (w, h) = (full.2, full.3);
      for y in 0..canvas.height() {
        for x in 0..canvas.width() {
          let t = ((x as f32 + 0.5) / w + (y as f32 + 0.5) / h) / 2.0;
          canvas.blend(x as i32, y as i32, gradient_at(stops, t), 1.0);
        }
      }
    }

    Layer::SoftCircle {
      center,
      radius,
      blur,
      color,
    } => {
      let (cx, cy, r, b) = (center.x * s, center.y * s, radius * s, blur * s);
      let reach = r + b;
      canvas.shade((cx - reach, cy - reach, cx + reach, cy + reach), *color, |x, y| {
        let d = (x - cx).hypot(y - cy);
        ((r + b / 2.0 - d) / b.max(f32::EPSILON)).clamp(0.0, 1.0)
      });
    }

    Layer::Hatch {
      spacing,
      thickness,
      color,
    } => {
      let (spacing, thickness) = (spacing * s, thickness * s);
      canvas.shade(full, *color, |x, y| {
        if (x + y).rem_euclid(spacing) < thickness { 1.0 } else { 0.0 }
      });
    }

    Layer::Circle {
      center,
      radius,
      color,
    } => {
      let (cx, cy, r) = (center.x * s, center.y * s, radius * s);
      canvas.shade((cx - r, cy - r, cx + r, cy + r), *color, |x, y| {
        inside((x - cx).hypot(y - cy) <= r)
      });
    }

    Layer::Ring {
      center,
      radius,
      width,
      color,
    } => {
      let (cx, cy, r, half) = (center.x * s, center.y * s, radius * s, width * s / 2.0);
      let reach = r + half;
      canvas.shade((cx - reach, cy - reach, cx + reach, cy + reach), *color, |x, y| {
        inside(((x - cx).hypot(y - cy) - r).abs() <= half)
      });
    }

    Layer::RoundedRect {
      rect,
      radius,
      color,
    } => {
      let r = device_rect(rect, s);
      let radius = (radius * s).min(r.width / 2.0).min(r.height / 2.0);
      canvas.shade((r.x, r.y, r.right(), r.bottom()), *color, |x, y| {
        inside(in_rounded_rect(&r, radius, x, y))
      });
    }

    Layer::Polygon { points, color } => {
      let pts = device_points(points, s);
      canvas.shade(bounds(&pts, 0.0), *color, |x, y| {
        inside(in_polygon(&pts, x, y))
      });
    }

    Layer::Stroke {
      points,
      width,
      closed,
      color,
    } => {
      let pts = device_points(points, s);
      let half = width * s / 2.0;
      let mut segments: Vec<(Point, Point)> =
        pts.windows(2).map(|w| (w[0], w[1])).collect();
      if *closed && pts.len() > 2 {
        segments.push((pts[pts.len() - 1], pts[0]));
      }
      canvas.shade(bounds(&pts, half), *color, |x, y| {
        let p = Point::new(x, y);
        inside(segments.iter().any(|(a, b)| segment_distance(p, *a, *b) <= half))
      });
    }

    Layer::Photo {
      center,
      radius,
      bytes,
    } => paint_photo(canvas, *center, *radius, bytes, s)?,

    Layer::Text {
      origin,
      text,
      style,
    } => face.draw(canvas, text, (origin.x * s, origin.y * s), style.scaled(s)),

    Layer::Glyph { rect, glyph } => paint_glyph(canvas, glyph, rect, s),
  }

  Ok(())
}

/// Decode the photo, crop it to a centred square and clip it to the circle.
fn paint_photo(
  canvas: &mut Canvas,
  center: Point,
  radius: f32,
  bytes: &[u8],
  s: f32,
) -> Result<()> {
  let source = image::load_from_memory(bytes)?;
  let side = source.width().min(source.height());
  if side == 0 {
    return Err(Error::Photo(image::ImageError::Limits(
      image::error::LimitError::from_kind(image::error::LimitErrorKind::DimensionError),
    )));
  }
  let cropped = source.crop_imm(
    (source.width() - side) / 2,
    (source.height() - side) / 2,
    side,
    side,
  );

  let diameter = ((radius * 2.0 * s).round() as u32).max(1);
  let resized: DynamicImage = cropped.resize_exact(diameter, diameter, FilterType::Lanczos3);
  let pixels = resized.to_rgba8();

  let (cx, cy, r) = (center.x * s, center.y * s, radius * s);
  let left = (cx - r).round() as i32;
  let top = (cy - r).round() as i32;
  for (x, y, Rgba([pr, pg, pb, pa])) in pixels.enumerate_pixels() {
    let dx = left as f32 + x as f32 + 0.5 - cx;
    let dy = top as f32 + y as f32 + 0.5 - cy;
    if dx.hypot(dy) <= r {
      canvas.blend(
        left + x as i32,
        top + y as i32,
        Color {
          r: *pr,
          g: *pg,
          b: *pb,
          a: *pa,
        },
        1.0,
      );
    }
  }
  Ok(())
}

/// Draw the glyph at a whole number of pixels per module, centred in its
/// slot. Light modules are painted too, so the glyph never depends on what
/// is underneath.
fn paint_glyph(canvas: &mut Canvas, glyph: &ScannableGlyph, rect: &Rect, s: f32) {
  let (left, top, module) = glyph_placement(glyph, rect, s);
  let module = module as i64;

  for my in 0..glyph.width() {
    for mx in 0..glyph.width() {
      let color = if glyph.is_dark(mx, my) { Color::BLACK } else { Color::WHITE };
      let x0 = left + mx as i64 * module;
      let y0 = top + my as i64 * module;
      for y in y0..y0 + module {
        for x in x0..x0 + module {
          canvas.put(x, y, color);
        }
      }
    }
  }
}

/// Device-pixel origin and module size of the glyph drawn for `rect` at
/// `scale`: `(left, top, module_px)`.
pub fn glyph_placement(glyph: &ScannableGlyph, rect: &Rect, scale: f32) -> (i64, i64, u32) {
  let slot = device_rect(rect, scale);
  let slot_px = slot.width.floor() as u32;
  let module = glyph.module_px(slot_px);
  let total = module as i64 * glyph.width() as i64;
  let left = slot.x.round() as i64 + (slot_px as i64 - total) / 2;
  let top = slot.y.round() as i64 + (slot_px as i64 - total) / 2;
  (left, top, module)
}

// ─── Geometry helpers ────────────────────────────────────────────────────────

fn inside(hit: bool) -> f32 { if hit { 1.0 } else { 0.0 } }

fn gradient_at(stops: &[(f32, Color)], t: f32) -> Color {
  let Some(&(first_t, first)) = stops.first() else {
    return Color::BLACK;
  };
  if t <= first_t {
    return first;
  }
  for pair in stops.windows(2) {
    let ((t0, c0), (t1, c1)) = (pair[0], pair[1]);
    if t <= t1 {
      let span = (t1 - t0).max(f32::EPSILON);
      return c0.lerp(c1, (t - t0) / span);
    }
  }
  stops.last().map_or(first, |&(_, c)| c)
}

fn device_rect(rect: &Rect, s: f32) -> Rect {
  Rect::new(rect.x * s, rect.y * s, rect.width * s, rect.height * s)
}

fn device_points(points: &[Point], s: f32) -> Vec<Point> {
  points.iter().map(|p| Point::new(p.x * s, p.y * s)).collect()
}

fn bounds(points: &[Point], pad: f32) -> (f32, f32, f32, f32) {
  points.iter().fold(
    (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
    |(x0, y0, x1, y1), p| {
      (
        x0.min(p.x - pad),
        y0.min(p.y - pad),
        x1.max(p.x + pad),
        y1.max(p.y + pad),
      )
    },
  )
}

fn in_rounded_rect(r: &Rect, radius: f32, x: f32, y: f32) -> bool {
  if !r.contains(Point::new(x, y)) {
    return false;
  }
  let cx = x.clamp(r.x + radius, r.right() - radius);
  let cy = y.clamp(r.y + radius, r.bottom() - radius);
  (x - cx).hypot(y - cy) <= radius
}

/// Even-odd point-in-polygon test.
fn in_polygon(points: &[Point], x: f32, y: f32) -> bool {
  let mut hit = false;
  let n = points.len();
  for i in 0..n {
    let (a, b) = (points[i], points[(i + n - 1) % n]);
    if (a.y > y) != (b.y > y) && x < (b.x - a.x) * (y - a.y) / (b.y - a.y) + a.x {
      hit = !hit;
    }
  }
  hit
}

fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
  let (dx, dy) = (b.x - a.x, b.y - a.y);
  let len2 = dx * dx + dy * dy;
  let t = if len2 == 0.0 {
    0.0
  } else {
    (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0)
  };
  (p.x - (a.x + t * dx)).hypot(p.y - (a.y + t * dy))
}
