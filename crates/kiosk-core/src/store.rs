//! The `VisitorStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `kiosk-store-sqlite`).
//! Higher layers (`kiosk-api`, `kiosk-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::visitor::{DuplicateKey, NewVisitor, Visitor};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`VisitorStore::list_visitors`].
#[derive(Debug, Clone, Default)]
pub struct VisitorQuery {
  /// Only visitors created at or after this instant.
  pub from:   Option<DateTime<Utc>>,
  /// Only visitors created strictly before this instant.
  pub until:  Option<DateTime<Utc>>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// Result of [`VisitorStore::insert_unless_matching`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
  /// No match existed; this is the freshly stored record.
  Inserted(Visitor),
  /// The earliest matching record; nothing was written.
  Existing(Visitor),
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a visitor store backend.
///
/// Visitors are append-only: there is no update or delete.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait VisitorStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All visitors whose [`DuplicateKey`] equals `key`, oldest first.
  ///
  /// `since` restricts the search to records created at or after that
  /// instant; `None` searches all time.
  fn find_matching<'a>(
    &'a self,
    key: &'a DuplicateKey,
    since: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<Vec<Visitor>, Self::Error>> + Send + 'a;

  /// Persist a new visitor unconditionally. `visitor_id` and `created_at`
  /// are assigned by the store.
  fn insert(
    &self,
    visitor: NewVisitor,
  ) -> impl Future<Output = Result<Visitor, Self::Error>> + Send + '_;

  /// Insert `visitor` only if [`find_matching`](Self::find_matching) with the
  /// same key and `since` would return nothing.
  ///
  /// Implementations must make the check and the write atomic: two
  /// concurrent calls with the same key never both insert.
  fn insert_unless_matching(
    &self,
    visitor: NewVisitor,
    since: Option<DateTime<Utc>>,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  /// Retrieve a visitor by UUID. Returns `None` if not found.
  fn get_visitor(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Visitor>, Self::Error>> + Send + '_;

  /// List visitors matching `query`, newest first.
  fn list_visitors<'a>(
    &'a self,
    query: &'a VisitorQuery,
  ) -> impl Future<Output = Result<Vec<Visitor>, Self::Error>> + Send + 'a;
}
