//! Single-page PDF writer built on `lopdf`.

use idforge_render::Bitmap;
use image::Rgba;
use lopdf::{
  Document, Object, Stream, StringFormat,
  content::{Content, Operation},
  dictionary,
};
use sha2::{Digest, Sha256};

use crate::{Error, PageFormat, Placement, Result, file_name_for, mm_to_pt};

const IMAGE_NAME: &str = "Im0";

/// A finished PDF, ready for delivery.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
  pub file_name: String,
  pub bytes:     Vec<u8>,
  pub placement: Placement,
  /// Lowercase hex SHA-256 of `bytes`.
  pub digest:    String,
}

/// Embed `bitmap` in a one-page A4 document named after `holder_name`.
pub fn package(bitmap: &Bitmap, holder_name: &str) -> Result<ExportedDocument> {
  let (width, height) = (bitmap.width(), bitmap.height());
  if width == 0 || height == 0 {
    return Err(Error::EmptyBitmap);
  }

  let page = PageFormat::A4;
  let placement = Placement::full_width(page, width, height);

  let mut doc = Document::with_version("1.5");
  let pages_id = doc.new_object_id();

  let mut image = Stream::new(
    dictionary! {
      "Type" => "XObject",
      "Subtype" => "Image",
      "Width" => width as i64,
      "Height" => height as i64,
      "ColorSpace" => "DeviceRGB",
      "BitsPerComponent" => 8,
    },
    flatten_rgb(bitmap),
  );
  image.compress()?;
  let image_id = doc.add_object(image);

  let page_height = page.height_pt();
  let (w, h) = (mm_to_pt(placement.width_mm), mm_to_pt(placement.height_mm));
  let x = mm_to_pt(placement.x_mm);
  let y = page_height - mm_to_pt(placement.y_mm) - h;
  let content = Content {
    operations: vec![
      Operation::new("q", vec![]),
      Operation::new("cm", vec![
        w.into(),
        0.0.into(),
        0.0.into(),
        h.into(),
        x.into(),
        y.into(),
      ]),
      Operation::new("Do", vec![IMAGE_NAME.into()]),
      Operation::new("Q", vec![]),
    ],
  };
  let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

  let page_id = doc.add_object(dictionary! {
    "Type" => "Page",
    "Parent" => pages_id,
    "MediaBox" => vec![0.0.into(), 0.0.into(), page.width_pt().into(), page_height.into()],
    "Contents" => content_id,
    "Resources" => dictionary! {
      "XObject" => dictionary! { IMAGE_NAME => image_id },
    },
  });
  doc.objects.insert(
    pages_id,
    Object::Dictionary(dictionary! {
      "Type" => "Pages",
      "Kids" => vec![page_id.into()],
      "Count" => 1,
    }),
  );

  let catalog_id = doc.add_object(dictionary! {
    "Type" => "Catalog",
    "Pages" => pages_id,
  });
  let info_id = doc.add_object(dictionary! {
    "Title" => text_string(&format!("{holder_name} ID card")),
    "Producer" => Object::string_literal("idforge"),
  });
  doc.trailer.set("Root", catalog_id);
  doc.trailer.set("Info", info_id);

  let mut bytes = Vec::new();
  doc.save_to(&mut bytes)?;
  let digest = hex::encode(Sha256::digest(&bytes));

  Ok(ExportedDocument {
    file_name: file_name_for(holder_name),
    bytes,
    placement,
    digest,
  })
}

/// A PDF text string: UTF-16BE behind a byte-order mark, so readers show
/// names outside PDFDocEncoding intact.
fn text_string(text: &str) -> Object {
  let mut bytes = vec![0xFE, 0xFF];
  bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
  Object::String(bytes, StringFormat::Hexadecimal)
}

/// Drop the alpha channel by compositing onto white.
fn flatten_rgb(bitmap: &Bitmap) -> Vec<u8> {
  let mut rgb = Vec::with_capacity(bitmap.width() as usize * bitmap.height() as usize * 3);
  for &Rgba([r, g, b, a]) in bitmap.image().pixels() {
    let alpha = a as u16;
    let over = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
    rgb.extend_from_slice(&[over(r), over(g), over(b)]);
  }
  rgb
}
