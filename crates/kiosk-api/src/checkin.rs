//! `POST /check-in`: validate the form and register the visitor.
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | new visitor | 201 | `{"status":"created","visitor":{...}}` |
//! | already checked in | 200 | `{"status":"duplicate"}` |
//! | invalid form | 422 | `{"error":"...","fields":{...}}` |
//! | store failure | 500 | `{"error":"..."}` |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use kiosk_core::{
  form::CheckInForm,
  ocr::TextRecognizer,
  registrar::CheckInOutcome,
  store::VisitorStore,
  visitor::Visitor,
};
use serde::Serialize;

use crate::{ApiState, error::ApiError};

/// Response body; `status` tells the kiosk which screen to show.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckInResponse {
  Created { visitor: Visitor },
  Duplicate,
}

impl IntoResponse for CheckInResponse {
  fn into_response(self) -> Response {
    let status = match self {
      Self::Created { .. } => StatusCode::CREATED,
      Self::Duplicate => StatusCode::OK,
    };
    (status, Json(self)).into_response()
  }
}

/// `POST /check-in`
pub async fn handler<S, R>(
  State(state): State<ApiState<S, R>>,
  Json(form): Json<CheckInForm>,
) -> Result<CheckInResponse, ApiError>
where
  S: VisitorStore,
  R: TextRecognizer,
{
  let visitor = form.validate()?;

  let outcome = state
    .registrar
    .check_in(visitor)
    .await
    .map_err(ApiError::store)?;

  Ok(match outcome {
    CheckInOutcome::Created(visitor) => {
      tracing::info!(visitor_id = %visitor.visitor_id, "visitor checked in");
      CheckInResponse::Created { visitor }
    }
    CheckInOutcome::Duplicate(existing) => {
      tracing::info!(visitor_id = %existing.visitor_id, "duplicate check-in ignored");
      CheckInResponse::Duplicate
    }
  })
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;
  use kiosk_core::store::{VisitorQuery, VisitorStore as _};
  use kiosk_store_sqlite::SqliteStore;
  use serde_json::{Value, json};

  use crate::{api_router, test_support::*};

  fn form() -> Value {
    json!({
      "name":        "John Doe",
      "company":     "Acme Hospital",
      "email":       "john.doe@email.com",
      "purpose":     "Meeting",
      "phone":       "15551234567",
      "dateOfBirth": "1990-01-01",
      "gender":      "Male"
    })
  }

  #[tokio::test]
  async fn first_submission_is_created() {
    let resp = send(api_router(state(None).await), "POST", "/check-in", Some(form())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = json_body(resp).await;
    assert_eq!(body["status"], "created");
    assert_eq!(body["visitor"]["name"], "John Doe");
    assert_eq!(body["visitor"]["gender"], "Male");
    assert!(body["visitor"]["visitorId"].is_string());
    assert!(body["visitor"]["createdAt"].is_string());
  }

  #[tokio::test]
  async fn repeat_submission_is_duplicate() {
    let st = state(None).await;

    let first = send(api_router(st.clone()), "POST", "/check-in", Some(form())).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let mut again = form();
    again["purpose"] = json!("Delivery");
    again["email"] = json!("  JOHN.DOE@email.com ");
    let second = send(api_router(st.clone()), "POST", "/check-in", Some(again)).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(json_body(second).await, json!({ "status": "duplicate" }));

    let stored = st.registrar.store().list_visitors(&VisitorQuery::default()).await.unwrap();
    assert_eq!(stored.len(), 1);
  }

  #[tokio::test]
  async fn invalid_form_lists_field_errors() {
    let mut bad = form();
    bad["email"] = json!("not-an-email");
    bad["name"] = json!("   ");
    bad["gender"] = json!("robot");

    let st = state(None).await;
    let resp = send(api_router(st.clone()), "POST", "/check-in", Some(bad)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(resp).await;
    assert!(body["error"].is_string());
    assert_eq!(body["fields"]["name"], "is required");
    assert_eq!(body["fields"]["email"], "must be a valid email address");
    assert!(body["fields"]["gender"].is_string());
    assert!(body["fields"].get("company").is_none());

    let stored = st.registrar.store().list_visitors(&VisitorQuery::default()).await.unwrap();
    assert!(stored.is_empty());
  }

  #[tokio::test]
  async fn optional_fields_may_be_omitted() {
    let mut minimal = form();
    minimal.as_object_mut().unwrap().remove("dateOfBirth");
    minimal.as_object_mut().unwrap().remove("gender");

    let resp = send(api_router(state(None).await), "POST", "/check-in", Some(minimal)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_body(resp).await;
    assert!(body["visitor"]["dateOfBirth"].is_null());
  }

  #[tokio::test]
  async fn store_failure_is_server_error() {
    let st = state(None).await;
    SqliteStore::clone(st.registrar.store()).close().await.unwrap();

    let resp = send(api_router(st), "POST", "/check-in", Some(form())).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(resp).await["error"].is_string());
  }
}
