//! Profile photo attached to a draft.
//!
//! The photo is kept as the raw uploaded bytes; decoding happens only when
//! the card is rasterized, so a corrupt image surfaces as a rasterization
//! failure rather than a validation error.

use std::{path::Path, sync::Arc};

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Media type used when the bytes match no known image signature.
const OCTET_STREAM: &str = "application/octet-stream";

/// Raw image bytes plus the metadata needed to validate and embed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
  bytes:        Arc<[u8]>,
  media_type:   String,
  /// SHA-256 hex digest of `bytes`.
  content_hash: String,
}

impl Photo {
  /// Wrap `bytes` with an explicit media type.
  pub fn new(bytes: impl Into<Arc<[u8]>>, media_type: impl Into<String>) -> Self {
    let bytes: Arc<[u8]> = bytes.into();
    let content_hash = hex::encode(Sha256::digest(&bytes));
    Self {
      bytes,
      media_type: media_type.into(),
      content_hash,
    }
  }

  /// Wrap `bytes`, detecting the media type from the file signature.
  ///
  /// Unrecognised data is tagged `application/octet-stream`, which the
  /// validator then rejects.
  pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
    let bytes: Arc<[u8]> = bytes.into();
    let media_type = sniff_media_type(&bytes).unwrap_or(OCTET_STREAM);
    Self::new(bytes, media_type)
  }

  /// Read a photo from disk.
  pub fn from_file(path: &Path) -> Result<Self> {
    let bytes = std::fs::read(path)?;
    Ok(Self::from_bytes(bytes))
  }

  /// Parse a `data:<media>;base64,<data>` URL.
  pub fn from_data_url(url: &str) -> Result<Self> {
    let rest = url.strip_prefix("data:").ok_or(Error::InvalidDataUrl)?;
    let (header, data) = rest.split_once(',').ok_or(Error::InvalidDataUrl)?;
    let media_type = header
      .strip_suffix(";base64")
      .ok_or(Error::InvalidDataUrl)?;
    let bytes = B64.decode(data.trim())?;

    if media_type.is_empty() {
      return Ok(Self::from_bytes(bytes));
    }
    Ok(Self::new(bytes, media_type.to_ascii_lowercase()))
  }

  pub fn bytes(&self) -> &[u8] { &self.bytes }

  /// A cheap shared handle to the raw bytes.
  pub fn shared_bytes(&self) -> Arc<[u8]> { Arc::clone(&self.bytes) }

  pub fn media_type(&self) -> &str { &self.media_type }

  pub fn content_hash(&self) -> &str { &self.content_hash }

  pub fn len(&self) -> usize { self.bytes.len() }

  pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

  pub fn is_image(&self) -> bool { self.media_type.starts_with("image/") }

  /// Whether the rasterizer has a decoder for this media type.
  pub fn is_supported(&self) -> bool {
    SUPPORTED_MEDIA_TYPES.contains(&self.media_type.as_str())
  }
}

/// Raster formats the card renderer can decode.
pub const SUPPORTED_MEDIA_TYPES: [&str; 6] = [
  "image/png",
  "image/jpeg",
  "image/jpg",
  "image/gif",
  "image/bmp",
  "image/webp",
];

/// Identify common raster formats by their leading magic bytes.
fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
  match bytes {
    [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
    [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
    [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
    [b'B', b'M', ..] => Some("image/bmp"),
    [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => {
      Some("image/webp")
    }
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

  #[test]
  fn sniffs_png_signature() {
    let photo = Photo::from_bytes(PNG_MAGIC.to_vec());
    assert_eq!(photo.media_type(), "image/png");
    assert!(photo.is_image());
  }

  #[test]
  fn every_sniffed_format_is_supported() {
    let samples: [&[u8]; 5] = [
      PNG_MAGIC,
      &[0xFF, 0xD8, 0xFF, 0xE0],
      b"GIF89a",
      b"BM\0\0",
      b"RIFF\0\0\0\0WEBPVP8 ",
    ];
    for bytes in samples {
      let photo = Photo::from_bytes(bytes.to_vec());
      assert!(photo.is_supported(), "{}", photo.media_type());
    }
    assert!(!Photo::new(b"<svg/>".to_vec(), "image/svg+xml").is_supported());
  }

  #[test]
  fn unknown_bytes_are_not_an_image() {
    let photo = Photo::from_bytes(b"hello world".to_vec());
    assert_eq!(photo.media_type(), OCTET_STREAM);
    assert!(!photo.is_image());
  }

  #[test]
  fn parses_data_url() {
    let url = format!("data:image/png;base64,{}", B64.encode(PNG_MAGIC));
    let photo = Photo::from_data_url(&url).unwrap();
    assert_eq!(photo.media_type(), "image/png");
    assert_eq!(photo.bytes(), PNG_MAGIC);
  }

  #[test]
  fn data_url_without_base64_marker_is_rejected() {
    let err = Photo::from_data_url("data:image/png,abcd").unwrap_err();
    assert!(matches!(err, Error::InvalidDataUrl));
  }

  #[test]
  fn identical_bytes_share_a_content_hash() {
    let a = Photo::from_bytes(PNG_MAGIC.to_vec());
    let b = Photo::new(PNG_MAGIC.to_vec(), "image/png");
    assert_eq!(a.content_hash(), b.content_hash());
    assert_eq!(a.content_hash().len(), 64);
  }
}
