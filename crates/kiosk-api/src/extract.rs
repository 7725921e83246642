//! Handlers for the OCR-assisted form fill.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/extract` | Body: `{"text":"..."}`; returns [`ExtractedFields`] |
//! | `POST` | `/scan` | Body: `{"image":"data:image/...;base64,..."}`; returns text + fields |
//!
//! Both only suggest values; nothing is stored.

use axum::{Json, extract::State};
use kiosk_core::{
  extract::{ExtractedFields, extract_fields},
  ocr::{ImageInput, TextRecognizer},
  store::VisitorStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

// ─── Extract ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractBody {
  #[serde(default)]
  pub text: String,
}

/// `POST /extract`
pub async fn extract(Json(body): Json<ExtractBody>) -> Json<ExtractedFields> {
  Json(extract_fields(&body.text))
}

// ─── Scan ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScanBody {
  /// The captured photo as a `data:` URL.
  pub image: String,
}

#[derive(Debug, Serialize)]
pub struct ScanResult {
  pub text:   String,
  pub fields: ExtractedFields,
}

/// `POST /scan`: run OCR on the photo, then the field extractor on the text.
pub async fn scan<S, R>(
  State(state): State<ApiState<S, R>>,
  Json(body): Json<ScanBody>,
) -> Result<Json<ScanResult>, ApiError>
where
  S: VisitorStore,
  R: TextRecognizer,
{
  let image = ImageInput::from_data_url(&body.image)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let text = state
    .recognizer
    .recognize_text(&image)
    .await
    .map_err(ApiError::ocr)?;

  let fields = extract_fields(&text);
  tracing::debug!(chars = text.len(), found_any = !fields.is_empty(), "scanned ID card");
  Ok(Json(ScanResult { text, fields }))
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::http::StatusCode;
  use kiosk_core::{
    ocr::{ImageInput, TextRecognizer},
    registrar::{DuplicatePolicy, Registrar},
  };
  use kiosk_store_sqlite::SqliteStore;
  use serde_json::json;

  use crate::{ApiState, api_router, test_support::*};

  const CARD: &str = "John Doe\nAcme Hospital\nDOB: 1990-01-01\njohn.doe@email.com\n+1 (555) 123-4567";

  #[tokio::test]
  async fn extract_returns_found_fields_only() {
    let resp = send(
      api_router(state(None).await),
      "POST",
      "/extract",
      Some(json!({ "text": "reach me at someone@example.com" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "email": "someone@example.com" }));
  }

  #[tokio::test]
  async fn extract_full_card() {
    let resp = send(api_router(state(None).await), "POST", "/extract", Some(json!({ "text": CARD }))).await;
    let body = json_body(resp).await;
    assert_eq!(body["name"], "John Doe");
    assert_eq!(body["company"], "Acme Hospital");
    assert_eq!(body["phone"], "15551234567");
    assert_eq!(body["dateOfBirth"], "1990-01-01");
  }

  #[tokio::test]
  async fn scan_runs_recognizer_then_extractor() {
    let resp = send(
      api_router(state(Some(CARD)).await),
      "POST",
      "/scan",
      Some(json!({ "image": "data:image/png;base64,iVBORw0KGgo=" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["text"], CARD);
    assert_eq!(body["fields"]["email"], "john.doe@email.com");
  }

  #[tokio::test]
  async fn scan_rejects_non_image_payload() {
    let resp = send(
      api_router(state(Some(CARD)).await),
      "POST",
      "/scan",
      Some(json!({ "image": "data:text/plain;base64,aGVsbG8=" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn scan_recognizer_failure_is_bad_gateway() {
    let resp = send(
      api_router(state(None).await),
      "POST",
      "/scan",
      Some(json!({ "image": "data:image/png;base64,iVBORw0KGgo=" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(json_body(resp).await["error"], "could not read the card, please fill in the form");
  }

  #[derive(Debug, thiserror::Error)]
  #[error("upstream rejected http://ocr.invalid/annotate?key=SUPERSECRETKEY: {body}")]
  struct UpstreamRejected {
    body: String,
  }

  struct RejectingRecognizer;

  impl TextRecognizer for RejectingRecognizer {
    type Error = UpstreamRejected;

    async fn recognize_text(&self, _: &ImageInput) -> Result<String, UpstreamRejected> {
      Err(UpstreamRejected { body: "{\"error\":\"quota exceeded for project 1234\"}".into() })
    }
  }

  #[tokio::test]
  async fn scan_failure_hides_provider_detail() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let state = ApiState::new(
      Registrar::new(Arc::new(store), DuplicatePolicy::default()),
      Arc::new(RejectingRecognizer),
    );
    let resp = send(
      api_router(state),
      "POST",
      "/scan",
      Some(json!({ "image": "data:image/png;base64,iVBORw0KGgo=" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let body = json_body(resp).await.to_string();
    assert!(!body.contains("SUPERSECRETKEY"), "{body}");
    assert!(!body.contains("quota exceeded"), "{body}");
    assert!(!body.contains("ocr.invalid"), "{body}");
  }
}
