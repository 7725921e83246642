//! HTTP server assembly for the visitor kiosk.
//!
//! Reads [`ServerConfig`], wires the store, OCR provider and registrar
//! together, and mounts the kiosk and staff routers under `/api`.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use chrono::FixedOffset;
use kiosk_api::ApiState;
use kiosk_core::{
  ocr::TextRecognizer,
  registrar::{DuplicatePolicy, DuplicateWindow},
  store::VisitorStore,
};
use kiosk_ocr::OcrConfig;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_staff};

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_host() -> String { "0.0.0.0".to_string() }

fn default_port() -> u16 { 8080 }

/// Runtime server configuration, deserialised from `config.toml` and
/// `KIOSK_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  pub store_path: PathBuf,
  #[serde(default)]
  pub duplicates: DuplicatesConfig,
  #[serde(default)]
  pub ocr:        OcrConfig,
  /// Staff routes are only mounted when this is present.
  pub staff:      Option<AuthConfig>,
}

/// The `[duplicates]` section.
#[derive(Deserialize, Clone, Default)]
pub struct DuplicatesConfig {
  #[serde(default)]
  pub window:             DuplicateWindow,
  /// Kiosk local time as minutes east of UTC; decides where a day starts.
  #[serde(default)]
  pub utc_offset_minutes: i32,
}

impl DuplicatesConfig {
  pub fn policy(&self) -> Result<DuplicatePolicy, Error> {
    let utc_offset = self
      .utc_offset_minutes
      .checked_mul(60)
      .and_then(FixedOffset::east_opt)
      .ok_or_else(|| {
        Error::Config(format!(
          "duplicates.utc_offset_minutes out of range: {}",
          self.utc_offset_minutes
        ))
      })?;
    Ok(DuplicatePolicy { window: self.window, utc_offset })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
///
/// `staff` enables the `/api/visitors` routes behind Basic auth; without it
/// they are not mounted at all.
pub fn router<S, R>(state: ApiState<S, R>, staff: Option<AuthConfig>) -> Router
where
  S: VisitorStore + 'static,
  R: TextRecognizer + 'static,
{
  let store = Arc::clone(state.registrar.store());
  let mut api = kiosk_api::api_router(state);

  if let Some(auth) = staff {
    let staff_routes = kiosk_api::staff_router(store)
      .layer(middleware::from_fn_with_state(Arc::new(auth), require_staff));
    api = api.merge(staff_routes);
  }

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}
