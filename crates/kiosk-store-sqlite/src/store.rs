//! [`SqliteStore`], the SQLite implementation of [`VisitorStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use kiosk_core::{
  store::{InsertOutcome, VisitorQuery, VisitorStore},
  visitor::{DuplicateKey, NewVisitor, Visitor},
};

use crate::{
  Result,
  encode::{RawVisitor, encode_dt, encode_uuid, key_columns, now},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A visitor store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every call
/// runs on the same connection thread, one at a time.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection. Later calls on any clone fail.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row helpers (run on the connection thread) ──────────────────────────────

fn select_matching(
  conn: &rusqlite::Connection,
  key: &[String; 3],
  since: Option<&str>,
) -> rusqlite::Result<Vec<RawVisitor>> {
  let sql = format!(
    "SELECT {} FROM visitors
     WHERE name_key = ?1 AND company_key = ?2 AND email_key = ?3
       AND (?4 IS NULL OR created_at >= ?4)
     ORDER BY created_at ASC, visitor_id ASC",
    RawVisitor::COLUMNS
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(
      rusqlite::params![key[0], key[1], key[2], since],
      RawVisitor::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn insert_row(
  conn: &rusqlite::Connection,
  row: &RawVisitor,
  key: &[String; 3],
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO visitors (
       visitor_id, name, company, email, purpose, phone,
       date_of_birth, gender, name_key, company_key, email_key, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    rusqlite::params![
      row.visitor_id,
      row.name,
      row.company,
      row.email,
      row.purpose,
      row.phone,
      row.date_of_birth,
      row.gender,
      key[0],
      key[1],
      key[2],
      row.created_at,
    ],
  )?;
  Ok(())
}

fn stamp(visitor: NewVisitor) -> Visitor { visitor.into_visitor(Uuid::new_v4(), now()) }

// ─── VisitorStore impl ───────────────────────────────────────────────────────

impl VisitorStore for SqliteStore {
  type Error = crate::Error;

  async fn find_matching(
    &self,
    key: &DuplicateKey,
    since: Option<DateTime<Utc>>,
  ) -> Result<Vec<Visitor>> {
    let key_cols  = key_columns(key);
    let since_str = since.map(encode_dt);

    let raws: Vec<RawVisitor> = self
      .conn
      .call(move |conn| Ok(select_matching(conn, &key_cols, since_str.as_deref())?))
      .await?;

    raws.into_iter().map(RawVisitor::into_visitor).collect()
  }

  async fn insert(&self, visitor: NewVisitor) -> Result<Visitor> {
    let key_cols = key_columns(&visitor.duplicate_key());
    let visitor  = stamp(visitor);
    let row      = RawVisitor::from_visitor(&visitor);

    self
      .conn
      .call(move |conn| {
        insert_row(conn, &row, &key_cols)?;
        Ok(())
      })
      .await?;

    Ok(visitor)
  }

  async fn insert_unless_matching(
    &self,
    visitor: NewVisitor,
    since: Option<DateTime<Utc>>,
  ) -> Result<InsertOutcome> {
    let key_cols  = key_columns(&visitor.duplicate_key());
    let since_str = since.map(encode_dt);
    let visitor   = stamp(visitor);
    let row       = RawVisitor::from_visitor(&visitor);

    // Check and write share one IMMEDIATE transaction, so the write lock is
    // held from the duplicate lookup until commit.
    let existing: Option<RawVisitor> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let found = select_matching(&tx, &key_cols, since_str.as_deref())?
          .into_iter()
          .next();
        if found.is_none() {
          insert_row(&tx, &row, &key_cols)?;
        }
        tx.commit()?;
        Ok(found)
      })
      .await?;

    match existing {
      Some(raw) => Ok(InsertOutcome::Existing(raw.into_visitor()?)),
      None => Ok(InsertOutcome::Inserted(visitor)),
    }
  }

  async fn get_visitor(&self, id: Uuid) -> Result<Option<Visitor>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawVisitor> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM visitors WHERE visitor_id = ?1",
          RawVisitor::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawVisitor::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVisitor::into_visitor).transpose()
  }

  async fn list_visitors(&self, query: &VisitorQuery) -> Result<Vec<Visitor>> {
    let from_str   = query.from.map(encode_dt);
    let until_str  = query.until.map(encode_dt);
    let limit_val  = query.limit.unwrap_or(100) as i64;
    let offset_val = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawVisitor> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM visitors
           WHERE (?1 IS NULL OR created_at >= ?1)
             AND (?2 IS NULL OR created_at <  ?2)
           ORDER BY created_at DESC, visitor_id ASC
           LIMIT ?3 OFFSET ?4",
          RawVisitor::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![from_str, until_str, limit_val, offset_val],
            RawVisitor::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisitor::into_visitor).collect()
  }
}
