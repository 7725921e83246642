//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use kiosk_core::form::ValidationErrors;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Validation(#[from] ValidationErrors),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("text recognition failed: {0}")]
  Ocr(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub(crate) fn ocr(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Ocr(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Validation(fields) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "error": "validation failed", "fields": fields }),
      ),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "could not save the check-in, please try again" }))
      }
      // Provider errors can carry upstream bodies; they stay in the log.
      ApiError::Ocr(e) => {
        tracing::warn!(error = %e, "text recognition failure");
        (StatusCode::BAD_GATEWAY, json!({ "error": "could not read the card, please fill in the form" }))
      }
    };
    (status, Json(body)).into_response()
  }
}
