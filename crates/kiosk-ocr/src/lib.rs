//! OCR providers for the kiosk.
//!
//! [`OcrProvider`] implements [`kiosk_core::ocr::TextRecognizer`] and is
//! chosen at startup from an [`OcrConfig`]. Vendor request shapes stay in
//! this crate; callers only ever see recognised text.

mod google;
mod openai;
mod provider;
mod tesseract;

pub mod error;

pub use error::{Error, Result};
pub use provider::{OcrConfig, OcrProvider};
