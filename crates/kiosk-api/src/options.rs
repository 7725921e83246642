//! `GET /options`: the fixed choices the check-in form offers.

use axum::Json;
use kiosk_core::visitor::{Gender, Purpose};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FormOptions {
  pub purposes: &'static [&'static str],
  pub genders:  &'static [&'static str],
}

/// `GET /options`
pub async fn handler() -> Json<FormOptions> {
  Json(FormOptions {
    purposes: &Purpose::LABELS,
    genders:  Gender::labels(),
  })
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;

  use crate::{api_router, test_support::*};

  #[tokio::test]
  async fn lists_purposes_and_genders() {
    let resp = send(api_router(state(None).await), "GET", "/options", None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    assert_eq!(body["purposes"][0], "Meeting");
    assert_eq!(body["purposes"].as_array().unwrap().len(), 6);
    assert_eq!(
      body["genders"],
      serde_json::json!(["Male", "Female", "Other", "Prefer not to say"])
    );
  }
}
