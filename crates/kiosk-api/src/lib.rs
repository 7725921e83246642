//! JSON REST API for the visitor kiosk.
//!
//! Exposes two axum [`Router`]s backed by any
//! [`kiosk_core::store::VisitorStore`]:
//!
//! - [`api_router`]: the public kiosk surface (form options, text extraction,
//!   ID scanning, check-in);
//! - [`staff_router`]: read-only visitor log for front-desk staff.
//!
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", kiosk_api::api_router(state).merge(kiosk_api::staff_router(store)))
//! ```

pub mod checkin;
pub mod error;
pub mod extract;
pub mod options;
pub mod visitors;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use kiosk_core::{ocr::TextRecognizer, registrar::Registrar, store::VisitorStore};

pub use error::ApiError;

/// State shared by the kiosk-facing handlers.
pub struct ApiState<S, R> {
  pub registrar:  Registrar<S>,
  pub recognizer: Arc<R>,
}

impl<S, R> Clone for ApiState<S, R> {
  fn clone(&self) -> Self {
    Self {
      registrar:  self.registrar.clone(),
      recognizer: Arc::clone(&self.recognizer),
    }
  }
}

impl<S: VisitorStore, R> ApiState<S, R> {
  pub fn new(registrar: Registrar<S>, recognizer: Arc<R>) -> Self {
    Self { registrar, recognizer }
  }
}

/// Build the kiosk-facing router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, R>(state: ApiState<S, R>) -> Router<()>
where
  S: VisitorStore + 'static,
  R: TextRecognizer + 'static,
{
  Router::new()
    .route("/options", get(options::handler))
    .route("/extract", post(extract::extract))
    .route("/scan", post(extract::scan::<S, R>))
    .route("/check-in", post(checkin::handler::<S, R>))
    .with_state(state)
}

/// Build the staff router over `store`. Mount it behind authentication.
pub fn staff_router<S>(store: Arc<S>) -> Router<()>
where
  S: VisitorStore + 'static,
{
  Router::new()
    .route("/visitors", get(visitors::list::<S>))
    .route("/visitors/{id}", get(visitors::get_one::<S>))
    .with_state(store)
}

#[cfg(test)]
pub(crate) mod test_support {
  use std::sync::Arc;

  use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
  };
  use kiosk_core::{
    ocr::{ImageInput, TextRecognizer},
    registrar::{DuplicatePolicy, Registrar},
  };
  use kiosk_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use crate::ApiState;

  #[derive(Debug, thiserror::Error)]
  #[error("camera offline")]
  pub struct CameraOffline;

  /// Returns a fixed transcript, or fails when `text` is `None`.
  pub struct FixedRecognizer {
    pub text: Option<String>,
  }

  impl TextRecognizer for FixedRecognizer {
    type Error = CameraOffline;

    async fn recognize_text(&self, _: &ImageInput) -> Result<String, CameraOffline> {
      self.text.clone().ok_or(CameraOffline)
    }
  }

  pub async fn state(text: Option<&str>) -> ApiState<SqliteStore, FixedRecognizer> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    ApiState::new(
      Registrar::new(Arc::new(store), DuplicatePolicy::default()),
      Arc::new(FixedRecognizer { text: text.map(str::to_owned) }),
    )
  }

  pub async fn send(router: Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(json) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    router.oneshot(req).await.unwrap()
  }

  pub async fn json_body(resp: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }
}
