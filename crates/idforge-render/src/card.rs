//! Card layout renderer.
//!
//! Turns a snapshot and its payload into a [`RenderedCard`]: a fixed
//! 400×250 display list with every slot at a constant position. Content
//! never reflows; text that is too wide for its slot is truncated.

use std::sync::Arc;

use chrono::{Datelike, Local};
use idforge_core::{EncodedPayload, IdentityRecord, SnapshotId};

use crate::{
  Result,
  geometry::{Color, Point, Rect},
  glyph::ScannableGlyph,
  typeface::{TextStyle, Typeface},
};

// ─── Layout constants ────────────────────────────────────────────────────────

/// Logical canvas width.
pub const CARD_WIDTH: f32 = 400.0;
/// Logical canvas height.
pub const CARD_HEIGHT: f32 = 250.0;

/// Years added to the render-time year for the "Valid through" label.
pub const VALIDITY_YEARS: i32 = 4;

/// Logical side of the glyph when no size is configured.
pub const DEFAULT_GLYPH_SIZE: f32 = 48.0;

/// Largest side the glyph grows to on its own: one unit per module up to
/// version 10. Denser glyphs fall back to smaller modules.
pub const MAX_GLYPH_SIZE: f32 = 60.0;

const PADDING: f32 = 24.0;
const PHOTO_DIAMETER: f32 = 96.0;
const PHOTO_RING: f32 = 4.0;
const BLOCK_GAP: f32 = 16.0;
const TEXT_X: f32 = PADDING + PHOTO_DIAMETER + BLOCK_GAP;
const TEXT_WIDTH: f32 = CARD_WIDTH - PADDING - TEXT_X;
const GLYPH_PADDING: f32 = 4.0;

const NAME_STYLE: TextStyle = TextStyle::new(24.0, 32.0, Color::WHITE).bold();
const BADGE_STYLE: TextStyle = TextStyle::new(14.0, 20.0, Color::WHITE);
const BADGE_PAD_X: f32 = 8.0;
const BADGE_PAD_Y: f32 = 2.0;
const SMALL_LINE: f32 = 20.0;
const LINE_GAP: f32 = 4.0;

// ─── Display list ────────────────────────────────────────────────────────────

/// One drawing operation, in logical units, painted in list order.
#[derive(Debug, Clone)]
pub enum Layer {
  /// Full-canvas diagonal gradient from the top-left to the bottom-right.
  Gradient { stops: Vec<(f32, Color)> },
  /// A translucent disc whose edge fades over `blur` units.
  SoftCircle {
    center: Point,
    radius: f32,
    blur:   f32,
    color:  Color,
  },
  /// Diagonal security hatch across the whole canvas.
  Hatch {
    spacing:   f32,
    thickness: f32,
    color:     Color,
  },
  Circle {
    center: Point,
    radius: f32,
    color:  Color,
  },
  Ring {
    center: Point,
    radius: f32,
    width:  f32,
    color:  Color,
  },
  RoundedRect {
    rect:   Rect,
    radius: f32,
    color:  Color,
  },
  Polygon {
    points: Vec<Point>,
    color:  Color,
  },
  /// Line segments through `points`, optionally closed.
  Stroke {
    points: Vec<Point>,
    width:  f32,
    closed: bool,
    color:  Color,
  },
  /// Encoded image bytes, centre-cropped and clipped to a circle.
  Photo {
    center: Point,
    radius: f32,
    bytes:  Arc<[u8]>,
  },
  /// One line of text; `origin` is the top-left of its line box.
  Text {
    origin: Point,
    text:   String,
    style:  TextStyle,
  },
  /// The scannable glyph, fitted into `rect` without resampling.
  Glyph { rect: Rect, glyph: ScannableGlyph },
}

/// A fully composed card, keyed to the snapshot it was rendered from.
///
/// Owns everything the rasterizer needs; it is never edited, only replaced.
#[derive(Debug)]
pub struct RenderedCard {
  snapshot_id:   SnapshotId,
  holder_name:   String,
  valid_through: i32,
  layers:        Vec<Layer>,
  typeface:      Arc<Typeface>,
}

impl RenderedCard {
  pub fn snapshot_id(&self) -> SnapshotId { self.snapshot_id }

  /// Full name of the card holder, untruncated.
  pub fn holder_name(&self) -> &str { &self.holder_name }

  pub fn valid_through(&self) -> i32 { self.valid_through }

  pub fn layers(&self) -> &[Layer] { &self.layers }

  pub fn typeface(&self) -> &Typeface { &self.typeface }

  pub fn width(&self) -> f32 { CARD_WIDTH }

  pub fn height(&self) -> f32 { CARD_HEIGHT }

  /// Every text line on the card, in paint order.
  pub fn texts(&self) -> impl Iterator<Item = &str> {
    self.layers.iter().filter_map(|layer| match layer {
      Layer::Text { text, .. } => Some(text.as_str()),
      _ => None,
    })
  }

  /// The glyph layer and the slot it occupies.
  pub fn glyph(&self) -> Option<(&ScannableGlyph, Rect)> {
    self.layers.iter().find_map(|layer| match layer {
      Layer::Glyph { rect, glyph } => Some((glyph, *rect)),
      _ => None,
    })
  }

  pub fn has_photo(&self) -> bool {
    self.layers.iter().any(|l| matches!(l, Layer::Photo { .. }))
  }
}

// ─── Renderer ────────────────────────────────────────────────────────────────

/// Lays out cards with a fixed typeface and glyph size.
#[derive(Debug, Clone)]
pub struct CardRenderer {
  typeface:   Arc<Typeface>,
  glyph_size: f32,
}

impl Default for CardRenderer {
  fn default() -> Self { Self::new(Typeface::Builtin) }
}

impl CardRenderer {
  pub fn new(typeface: Typeface) -> Self {
    Self {
      typeface:   Arc::new(typeface),
      glyph_size: DEFAULT_GLYPH_SIZE,
    }
  }

  /// Override the smallest logical side of the glyph square.
  pub fn with_glyph_size(mut self, size: f32) -> Self {
    self.glyph_size = size;
    self
  }

  /// Render `record`, stamping "Valid through" from the local clock.
  pub fn render(
    &self,
    record: &IdentityRecord,
    payload: &EncodedPayload,
  ) -> Result<RenderedCard> {
    self.render_for_year(record, payload, Local::now().year())
  }

  /// Render `record` as if the current year were `year`.
  pub fn render_for_year(
    &self,
    record: &IdentityRecord,
    payload: &EncodedPayload,
    year: i32,
  ) -> Result<RenderedCard> {
    let glyph = ScannableGlyph::encode(payload)?;
    let glyph_side = self.glyph_side(&glyph);
    let valid_through = year + VALIDITY_YEARS;

    let mut layers = Vec::with_capacity(32);
    push_background(&mut layers);
    self.push_photo(&mut layers, record);
    self.push_identity_block(&mut layers, record);
    self.push_contact_block(&mut layers, record, glyph_side);
    self.push_glyph_block(&mut layers, glyph, glyph_side, valid_through);

    Ok(RenderedCard {
      snapshot_id: record.snapshot_id(),
      holder_name: record.full_name().to_string(),
      valid_through,
      layers,
      typeface: Arc::clone(&self.typeface),
    })
  }

  fn push_photo(&self, layers: &mut Vec<Layer>, record: &IdentityRecord) {
    let radius = PHOTO_DIAMETER / 2.0;
    let center = Point::new(PADDING + radius, PADDING + radius);

    match record.photo() {
      Some(photo) => layers.push(Layer::Photo {
        center,
        radius,
        bytes: photo.shared_bytes(),
      }),
      None => {
        layers.push(Layer::Circle {
          center,
          radius,
          color: Color::white(0.2),
        });
        push_cap_icon(layers, center);
      }
    }

    layers.push(Layer::Ring {
      center,
      radius: radius - PHOTO_RING / 2.0,
      width: PHOTO_RING,
      color: Color::white(0.5),
    });

    // Shield badge overlapping the photo's bottom-right.
    let badge = Point::new(center.x + 40.0, center.y + 40.0);
    layers.push(Layer::Circle {
      center: badge,
      radius: 16.0,
      color:  Color::white(0.1),
    });
    layers.push(Layer::Stroke {
      points: vec![
        Point::new(badge.x, badge.y - 8.0),
        Point::new(badge.x + 7.0, badge.y - 5.0),
        Point::new(badge.x + 7.0, badge.y + 1.0),
        Point::new(badge.x, badge.y + 8.0),
        Point::new(badge.x - 7.0, badge.y + 1.0),
        Point::new(badge.x - 7.0, badge.y - 5.0),
      ],
      width:  2.0,
      closed: true,
      color:  Color::WHITE,
    });
  }

  fn push_identity_block(&self, layers: &mut Vec<Layer>, record: &IdentityRecord) {
    let face = &self.typeface;
    let mut y = PADDING;

    layers.push(Layer::Text {
      origin: Point::new(TEXT_X, y),
      text:   face.fit(record.full_name(), TEXT_WIDTH, NAME_STYLE.size),
      style:  NAME_STYLE,
    });
    y += NAME_STYLE.line_height + LINE_GAP;

    let badge_text = face.fit(
      &format!("ID: {}", record.identifier()),
      TEXT_WIDTH - 2.0 * BADGE_PAD_X,
      BADGE_STYLE.size,
    );
    let badge_height = BADGE_STYLE.line_height + 2.0 * BADGE_PAD_Y;
    let badge_width =
      face.measure(&badge_text, BADGE_STYLE.size) + 2.0 * BADGE_PAD_X;
    layers.push(Layer::RoundedRect {
      rect:   Rect::new(TEXT_X, y, badge_width, badge_height),
      radius: badge_height / 2.0,
      color:  Color::white(0.2),
    });
    layers.push(Layer::Text {
      origin: Point::new(TEXT_X + BADGE_PAD_X, y + BADGE_PAD_Y),
      text:   badge_text,
      style:  BADGE_STYLE,
    });
    y += badge_height + LINE_GAP;

    let program_style = TextStyle::new(16.0, 24.0, Color::white(0.9));
    layers.push(Layer::Text {
      origin: Point::new(TEXT_X, y),
      text:   face.fit(record.program(), TEXT_WIDTH, program_style.size),
      style:  program_style,
    });
    y += program_style.line_height + LINE_GAP;

    layers.push(Layer::Text {
      origin: Point::new(TEXT_X, y),
      text:   format!("Year {}", record.year_of_study()),
      style:  TextStyle::new(14.0, SMALL_LINE, Color::white(0.8)),
    });
  }

  fn push_contact_block(
    &self,
    layers: &mut Vec<Layer>,
    record: &IdentityRecord,
    glyph_side: f32,
  ) {
    let style = TextStyle::new(14.0, SMALL_LINE, Color::white(0.9));
    let icon_size = 16.0;
    let text_x = PADDING + icon_size + 8.0;
    let max_width = glyph_box(glyph_side).x - BLOCK_GAP - text_x;

    let phone_y = CARD_HEIGHT - PADDING - SMALL_LINE;
    let email_y = phone_y - LINE_GAP - SMALL_LINE;

    push_mail_icon(layers, Point::new(PADDING, email_y + 2.0));
    layers.push(Layer::Text {
      origin: Point::new(text_x, email_y),
      text: self.typeface.fit(record.email(), max_width, style.size),
      style,
    });

    push_phone_icon(layers, Point::new(PADDING, phone_y + 2.0));
    layers.push(Layer::Text {
      origin: Point::new(text_x, phone_y),
      text: self.typeface.fit(record.phone(), max_width, style.size),
      style,
    });
  }

  /// Logical side of the glyph square: at least the configured size, and
  /// one unit per module so the default scale paints two pixels per module.
  fn glyph_side(&self, glyph: &ScannableGlyph) -> f32 {
    let natural = (glyph.width() as f32).min(MAX_GLYPH_SIZE);
    self.glyph_size.max(natural)
  }

  fn push_glyph_block(
    &self,
    layers: &mut Vec<Layer>,
    glyph: ScannableGlyph,
    side: f32,
    valid_through: i32,
  ) {
    let frame = glyph_box(side);
    layers.push(Layer::RoundedRect {
      rect:   frame,
      radius: 8.0,
      color:  Color::WHITE,
    });
    layers.push(Layer::Glyph {
      rect: Rect::new(
        frame.x + GLYPH_PADDING,
        frame.y + GLYPH_PADDING,
        side,
        side,
      ),
      glyph,
    });

    let style = TextStyle::new(12.0, 16.0, Color::white(0.7));
    let label = format!("Valid through {valid_through}");
    let right = CARD_WIDTH - PADDING;
    let x = right - self.typeface.measure(&label, style.size);
    layers.push(Layer::Text {
      origin: Point::new(x, frame.bottom() + LINE_GAP),
      text: label,
      style,
    });
  }
}

/// The white box around a glyph of `glyph_side`, anchored above the
/// validity label.
fn glyph_box(glyph_side: f32) -> Rect {
  let side = glyph_side + 2.0 * GLYPH_PADDING;
  let label_top = CARD_HEIGHT - PADDING - 16.0;
  Rect::new(
    CARD_WIDTH - PADDING - side,
    label_top - LINE_GAP - side,
    side,
    side,
  )
}

// ─── Decoration ──────────────────────────────────────────────────────────────

fn push_background(layers: &mut Vec<Layer>) {
  layers.push(Layer::Gradient {
    stops: vec![
      (0.0, Color::BLUE_600),
      (0.5, Color::INDIGO_600),
      (1.0, Color::PURPLE_600),
    ],
  });
  layers.push(Layer::SoftCircle {
    center: Point::new(CARD_WIDTH, 0.0),
    radius: 128.0,
    blur:   24.0,
    color:  Color::white(0.03),
  });
  layers.push(Layer::SoftCircle {
    center: Point::new(0.0, CARD_HEIGHT),
    radius: 96.0,
    blur:   24.0,
    color:  Color::white(0.03),
  });
  layers.push(Layer::Hatch {
    spacing:   6.0,
    thickness: 1.0,
    color:     Color::white(0.05),
  });
}

/// Mortarboard placeholder shown when there is no photo.
fn push_cap_icon(layers: &mut Vec<Layer>, c: Point) {
  let color = Color::white(0.7);
  layers.push(Layer::Polygon {
    points: vec![
      Point::new(c.x - 22.0, c.y - 6.0),
      Point::new(c.x, c.y - 16.0),
      Point::new(c.x + 22.0, c.y - 6.0),
      Point::new(c.x, c.y + 4.0),
    ],
    color,
  });
  layers.push(Layer::Polygon {
    points: vec![
      Point::new(c.x - 13.0, c.y),
      Point::new(c.x, c.y + 6.0),
      Point::new(c.x + 13.0, c.y),
      Point::new(c.x + 13.0, c.y + 10.0),
      Point::new(c.x, c.y + 16.0),
      Point::new(c.x - 13.0, c.y + 10.0),
    ],
    color,
  });
  layers.push(Layer::Stroke {
    points: vec![
      Point::new(c.x + 20.0, c.y - 5.0),
      Point::new(c.x + 20.0, c.y + 10.0),
    ],
    width: 2.0,
    closed: false,
    color,
  });
}

fn push_mail_icon(layers: &mut Vec<Layer>, at: Point) {
  let (l, t, r, b) = (at.x + 1.0, at.y + 3.0, at.x + 15.0, at.y + 13.0);
  layers.push(Layer::Stroke {
    points: vec![
      Point::new(l, t),
      Point::new(r, t),
      Point::new(r, b),
      Point::new(l, b),
    ],
    width:  1.5,
    closed: true,
    color:  Color::WHITE,
  });
  layers.push(Layer::Stroke {
    points: vec![
      Point::new(l, t),
      Point::new((l + r) / 2.0, t + 5.0),
      Point::new(r, t),
    ],
    width:  1.5,
    closed: false,
    color:  Color::WHITE,
  });
}

fn push_phone_icon(layers: &mut Vec<Layer>, at: Point) {
  layers.push(Layer::Stroke {
    points: vec![
      Point::new(at.x + 4.0, at.y + 1.0),
      Point::new(at.x + 12.0, at.y + 1.0),
      Point::new(at.x + 12.0, at.y + 15.0),
      Point::new(at.x + 4.0, at.y + 15.0),
    ],
    width:  1.5,
    closed: true,
    color:  Color::WHITE,
  });
  layers.push(Layer::Stroke {
    points: vec![
      Point::new(at.x + 7.0, at.y + 12.5),
      Point::new(at.x + 9.0, at.y + 12.5),
    ],
    width:  1.5,
    closed: false,
    color:  Color::WHITE,
  });
}

#[cfg(test)]
mod tests {
  use idforge_core::{IdentityDraft, Photo, encode};

  use super::*;
  use crate::test_helpers::{decode_luma, john_doe};

  fn render(draft: IdentityDraft) -> RenderedCard {
    let record = draft.finalize().expect("valid draft");
    let payload = encode(&record);
    CardRenderer::default()
      .render_for_year(&record, &payload, 2026)
      .expect("render")
  }

  #[test]
  fn shows_every_record_field() {
    let card = render(john_doe());
    let texts: Vec<&str> = card.texts().collect();
    assert_eq!(
      texts,
      vec![
        "John Doe",
        "ID: 12345678",
        "Computer Science",
        "Year 1",
        "john@university.edu",
        "+1 234 567 8900",
        "Valid through 2030",
      ]
    );
  }

  #[test]
  fn card_is_keyed_to_its_snapshot() {
    let record = john_doe().finalize().unwrap();
    let card = CardRenderer::default()
      .render(&record, &encode(&record))
      .unwrap();
    assert_eq!(card.snapshot_id(), record.snapshot_id());
    assert_eq!(card.holder_name(), "John Doe");
    assert_eq!(card.valid_through(), Local::now().year() + VALIDITY_YEARS);
  }

  #[test]
  fn missing_photo_uses_placeholder() {
    let card = render(john_doe());
    assert!(!card.has_photo());
    assert!(
      card
        .layers()
        .iter()
        .any(|l| matches!(l, Layer::Polygon { .. }))
    );
  }

  #[test]
  fn photo_is_carried_without_decoding() {
    let mut draft = john_doe();
    draft.set_photo(Some(Photo::new(vec![0xFF, 0xD8, 0xFF, 0x00], "image/jpeg")));
    let card = render(draft);
    assert!(card.has_photo());
  }

  #[test]
  fn long_name_is_truncated_not_wrapped() {
    let mut draft = john_doe();
    draft.set_full_name("Maximiliana Alexandrovna Konstantinopolskaya-Featherstonehaugh");
    let card = render(draft);
    let name = card.texts().next().unwrap();
    assert!(name.ends_with("..."));
    assert!(card.typeface().measure(name, NAME_STYLE.size) <= TEXT_WIDTH);
    assert_eq!(
      card.holder_name(),
      "Maximiliana Alexandrovna Konstantinopolskaya-Featherstonehaugh"
    );
  }

  #[test]
  fn glyph_slot_sits_bottom_right() {
    let card = render(john_doe());
    let (glyph, rect) = card.glyph().unwrap();
    let side = DEFAULT_GLYPH_SIZE.max(glyph.width() as f32);
    assert_eq!(rect, Rect::new(372.0 - side, 202.0 - side, side, side));
  }

  #[test]
  fn glyph_gets_a_unit_per_module() {
    let card = render(john_doe());
    let (glyph, rect) = card.glyph().unwrap();
    assert!(glyph.width() as f32 > DEFAULT_GLYPH_SIZE);
    assert_eq!(rect.width, glyph.width() as f32);
  }

  #[test]
  fn configured_glyph_size_is_a_floor() {
    let record = john_doe().finalize().unwrap();
    let payload = encode(&record);
    let card = CardRenderer::default()
      .with_glyph_size(72.0)
      .render_for_year(&record, &payload, 2026)
      .unwrap();
    assert_eq!(card.glyph().unwrap().1.width, 72.0);
  }

  #[test]
  fn dense_glyph_stops_growing_at_the_cap() {
    let mut draft = john_doe();
    draft
      .set_full_name("\u{e9}".repeat(120))
      .set_identifier("\u{e9}".repeat(120))
      .set_program("\u{e9}".repeat(120));
    let card = render(draft);
    let (glyph, rect) = card.glyph().unwrap();
    assert!(glyph.width() as f32 > MAX_GLYPH_SIZE);
    assert_eq!(rect.width, MAX_GLYPH_SIZE);
  }

  #[test]
  fn glyph_box_clears_the_identity_block() {
    let frame = glyph_box(MAX_GLYPH_SIZE);
    let identity_bottom = PADDING
      + NAME_STYLE.line_height
      + BADGE_STYLE.line_height
      + 2.0 * BADGE_PAD_Y
      + 24.0
      + SMALL_LINE
      + 3.0 * LINE_GAP;
    assert!(frame.y >= identity_bottom);
  }

  #[test]
  fn rendered_glyph_round_trips_payload() {
    let record = john_doe().finalize().unwrap();
    let payload = encode(&record);
    let card = CardRenderer::default()
      .render_for_year(&record, &payload, 2026)
      .unwrap();
    let (glyph, _) = card.glyph().unwrap();
    assert_eq!(decode_luma(&glyph.to_luma(3, 4)), payload.as_str());
  }

  #[test]
  fn every_layer_stays_on_the_canvas_horizontally() {
    let card = render(john_doe());
    for layer in card.layers() {
      if let Layer::Text { origin, text, style } = layer {
        let right = origin.x + card.typeface().measure(text, style.size);
        assert!(right <= CARD_WIDTH, "{text} overflows");
      }
    }
  }
}
