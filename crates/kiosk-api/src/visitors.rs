//! Handlers for the staff-only `/visitors` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/visitors` | Optional `?from`, `?until` (RFC 3339), `?limit`, `?offset`; newest first |
//! | `GET`  | `/visitors/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use kiosk_core::{
  store::{VisitorQuery, VisitorStore},
  visitor::Visitor,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// Hard cap on a single page.
const MAX_LIMIT: usize = 500;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub from:   Option<DateTime<Utc>>,
  pub until:  Option<DateTime<Utc>>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

impl ListParams {
  fn into_query(self) -> Result<VisitorQuery, ApiError> {
    if let (Some(from), Some(until)) = (self.from, self.until)
      && from > until
    {
      return Err(ApiError::BadRequest("`from` must not be after `until`".into()));
    }
    Ok(VisitorQuery {
      from:   self.from,
      until:  self.until,
      limit:  self.limit.map(|l| l.min(MAX_LIMIT)),
      offset: self.offset,
    })
  }
}

/// `GET /visitors[?from=...][&until=...][&limit=...][&offset=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Visitor>>, ApiError>
where
  S: VisitorStore,
{
  let query = params.into_query()?;
  let visitors = store.list_visitors(&query).await.map_err(ApiError::store)?;
  Ok(Json(visitors))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /visitors/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Visitor>, ApiError>
where
  S: VisitorStore,
{
  let visitor = store
    .get_visitor(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("visitor {id} not found")))?;
  Ok(Json(visitor))
}
