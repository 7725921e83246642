//! Core types and trait definitions for the visitor check-in kiosk.
//!
//! This crate has no HTTP or database dependencies.
//! All other crates depend on it; storage backends and OCR providers plug in
//! through [`store::VisitorStore`] and [`ocr::TextRecognizer`].

// Trait methods declare `Send` futures explicitly; impls use `async fn`.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod extract;
pub mod form;
pub mod ocr;
pub mod registrar;
pub mod store;
pub mod visitor;

pub use error::{Error, Result};
