//! The check-in registrar: new visitor or duplicate?
//!
//! A submission is a duplicate when a stored visitor has the same
//! [`DuplicateKey`](crate::visitor::DuplicateKey) inside the configured
//! [`DuplicatePolicy`] window. Duplicates are a normal outcome, not an error;
//! only store faults surface as `Err`.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset as _, TimeZone as _, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  store::{InsertOutcome, VisitorStore},
  visitor::{NewVisitor, Visitor},
};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// How far back the duplicate check looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateWindow {
  /// Only visitors checked in since local midnight.
  #[default]
  SameDay,
  /// Any visitor ever recorded.
  AnyTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicatePolicy {
  pub window:     DuplicateWindow,
  /// Offset of the kiosk's local time; decides where "today" starts.
  pub utc_offset: FixedOffset,
}

impl Default for DuplicatePolicy {
  fn default() -> Self {
    Self { window: DuplicateWindow::default(), utc_offset: Utc.fix() }
  }
}

impl DuplicatePolicy {
  /// Earliest `created_at` that still counts as a duplicate at `now`, or
  /// `None` when the window is unbounded.
  pub fn window_start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match self.window {
      DuplicateWindow::AnyTime => None,
      DuplicateWindow::SameDay => {
        let midnight = now
          .with_timezone(&self.utc_offset)
          .date_naive()
          .and_hms_opt(0, 0, 0)?;
        self
          .utc_offset
          .from_local_datetime(&midnight)
          .single()
          .map(|dt| dt.with_timezone(&Utc))
      }
    }
  }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInOutcome {
  /// A new record was stored.
  Created(Visitor),
  /// A matching record already existed; nothing was written.
  Duplicate(Visitor),
}

impl CheckInOutcome {
  pub fn is_created(&self) -> bool { matches!(self, Self::Created(_)) }

  pub fn visitor(&self) -> &Visitor {
    match self {
      Self::Created(v) | Self::Duplicate(v) => v,
    }
  }
}

// ─── Registrar ───────────────────────────────────────────────────────────────

pub struct Registrar<S> {
  store:  Arc<S>,
  policy: DuplicatePolicy,
}

impl<S> Clone for Registrar<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), policy: self.policy }
  }
}

impl<S: VisitorStore> Registrar<S> {
  pub fn new(store: Arc<S>, policy: DuplicatePolicy) -> Self {
    Self { store, policy }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn policy(&self) -> &DuplicatePolicy { &self.policy }

  /// Record `visitor` unless it duplicates an earlier check-in.
  ///
  /// `visitor` must already be validated (see
  /// [`CheckInForm::validate`](crate::form::CheckInForm::validate)).
  pub async fn check_in(&self, visitor: NewVisitor) -> Result<CheckInOutcome, S::Error> {
    self.check_in_at(visitor, Utc::now()).await
  }

  /// As [`check_in`](Self::check_in), evaluating the duplicate window at
  /// `now`.
  pub async fn check_in_at(
    &self,
    visitor: NewVisitor,
    now: DateTime<Utc>,
  ) -> Result<CheckInOutcome, S::Error> {
    let since = self.policy.window_start(now);
    let outcome = match self.store.insert_unless_matching(visitor, since).await? {
      InsertOutcome::Inserted(v) => CheckInOutcome::Created(v),
      InsertOutcome::Existing(v) => CheckInOutcome::Duplicate(v),
    };
    Ok(outcome)
  }
}
