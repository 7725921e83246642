//! Error type for `kiosk-ocr`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("OCR is disabled on this kiosk")]
  Disabled,

  #[error("invalid OCR configuration: {0}")]
  Config(String),

  /// Transport failure; the request URL is stripped before it lands here.
  #[error("http error: {0}")]
  Http(reqwest::Error),

  #[error("{provider} returned HTTP {status}: {body}")]
  Provider {
    provider: &'static str,
    status:   u16,
    body:     String,
  },

  #[error("{provider} response was malformed: {reason}")]
  Malformed {
    provider: &'static str,
    reason:   String,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("tesseract failed: {0}")]
  Tesseract(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("OCR timed out after {0:?}")]
  Timeout(Duration),
}

impl From<reqwest::Error> for Error {
  fn from(e: reqwest::Error) -> Self { Self::Http(e.without_url()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
