//! The `TextRecognizer` trait and the image type it consumes.
//!
//! OCR vendors live behind this trait (see `kiosk-ocr`). The rest of the
//! system only ever asks for "the text on this image" and feeds the answer to
//! [`crate::extract::extract_fields`].

use std::future::Future;

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};

use crate::{Error, Result};

/// A captured image, typically a photographed ID card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
  pub bytes:      Vec<u8>,
  /// MIME type, e.g. `image/jpeg`.
  pub media_type: String,
}

impl ImageInput {
  pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
    Self { bytes, media_type: media_type.into() }
  }

  /// Parse a `data:<mime>;base64,<payload>` URL as produced by a browser
  /// canvas or file reader.
  pub fn from_data_url(url: &str) -> Result<Self> {
    let rest = url
      .trim()
      .strip_prefix("data:")
      .ok_or_else(|| Error::InvalidImage("not a data URL".into()))?;
    let (meta, payload) = rest
      .split_once(',')
      .ok_or_else(|| Error::InvalidImage("data URL has no payload".into()))?;
    let media_type = meta
      .strip_suffix(";base64")
      .ok_or_else(|| Error::InvalidImage("data URL is not base64".into()))?;
    if !media_type.starts_with("image/") {
      return Err(Error::InvalidImage(format!(
        "unsupported media type {media_type:?}"
      )));
    }
    let bytes = B64
      .decode(payload)
      .map_err(|e| Error::InvalidImage(format!("bad base64 payload: {e}")))?;
    if bytes.is_empty() {
      return Err(Error::InvalidImage("image is empty".into()));
    }
    Ok(Self::new(bytes, media_type))
  }

  /// Base64 of the raw bytes, for providers that take inline content.
  pub fn to_base64(&self) -> String { B64.encode(&self.bytes) }

  /// Re-encode as a data URL.
  pub fn to_data_url(&self) -> String {
    format!("data:{};base64,{}", self.media_type, self.to_base64())
  }
}

/// Abstraction over an OCR provider.
///
/// Implementations must not retry: a failure surfaces immediately and the
/// visitor can simply take another photo.
pub trait TextRecognizer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return all text recognised in `image`, newline-delimited. An image with
  /// no text yields an empty string, not an error.
  fn recognize_text<'a>(
    &'a self,
    image: &'a ImageInput,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_png_data_url() {
    let img = ImageInput::from_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
    assert_eq!(img.media_type, "image/png");
    assert_eq!(&img.bytes[..4], b"\x89PNG");
  }

  #[test]
  fn data_url_round_trips() {
    let img = ImageInput::new(vec![1, 2, 3], "image/jpeg");
    let back = ImageInput::from_data_url(&img.to_data_url()).unwrap();
    assert_eq!(back, img);
  }

  #[test]
  fn rejects_non_data_url() {
    let err = ImageInput::from_data_url("https://example.com/id.jpg").unwrap_err();
    assert!(matches!(err, Error::InvalidImage(_)));
  }

  #[test]
  fn rejects_non_image_media_type() {
    let err = ImageInput::from_data_url("data:text/plain;base64,aGk=").unwrap_err();
    assert!(matches!(err, Error::InvalidImage(_)));
  }

  #[test]
  fn rejects_bad_base64() {
    let err = ImageInput::from_data_url("data:image/png;base64,@@@").unwrap_err();
    assert!(matches!(err, Error::InvalidImage(_)));
  }
}
