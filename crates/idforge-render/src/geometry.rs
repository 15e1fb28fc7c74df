//! Logical-unit geometry and colours shared by the layout and rasterizer.

/// A point in logical card units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
  pub x: f32,
  pub y: f32,
}

impl Point {
  pub const fn new(x: f32, y: f32) -> Self { Self { x, y } }
}

/// An axis-aligned rectangle in logical card units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
  pub x:      f32,
  pub y:      f32,
  pub width:  f32,
  pub height: f32,
}

impl Rect {
  pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
    Self { x, y, width, height }
  }

  pub fn right(&self) -> f32 { self.x + self.width }

  pub fn bottom(&self) -> f32 { self.y + self.height }

  pub fn contains(&self, p: Point) -> bool {
    p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
  }
}

/// Straight (non-premultiplied) RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
  pub r: u8,
  pub g: u8,
  pub b: u8,
  pub a: u8,
}

impl Color {
  pub const BLACK: Self = Self::rgb(0x00, 0x00, 0x00);
  pub const WHITE: Self = Self::rgb(0xFF, 0xFF, 0xFF);

  pub const BLUE_600: Self = Self::rgb(0x25, 0x63, 0xEB);
  pub const INDIGO_600: Self = Self::rgb(0x4F, 0x46, 0xE5);
  pub const PURPLE_600: Self = Self::rgb(0x93, 0x33, 0xEA);

  pub const fn rgb(r: u8, g: u8, b: u8) -> Self { Self { r, g, b, a: 0xFF } }

  /// White at the given opacity (0.0..=1.0).
  pub fn white(opacity: f32) -> Self {
    Self {
      a: (opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
      ..Self::WHITE
    }
  }

  /// Linear interpolation between two colours.
  pub fn lerp(self, other: Self, t: f32) -> Self {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Self {
      r: mix(self.r, other.r),
      g: mix(self.g, other.g),
      b: mix(self.b, other.b),
      a: mix(self.a, other.a),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lerp_hits_endpoints() {
    assert_eq!(Color::BLUE_600.lerp(Color::PURPLE_600, 0.0), Color::BLUE_600);
    assert_eq!(Color::BLUE_600.lerp(Color::PURPLE_600, 1.0), Color::PURPLE_600);
  }

  #[test]
  fn white_opacity_maps_to_alpha() {
    assert_eq!(Color::white(0.5).a, 128);
    assert_eq!(Color::white(2.0).a, 255);
  }

  #[test]
  fn rect_containment_is_half_open() {
    let r = Rect::new(10.0, 10.0, 5.0, 5.0);
    assert!(r.contains(Point::new(10.0, 14.9)));
    assert!(!r.contains(Point::new(15.0, 12.0)));
  }
}
