//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that lexical order equals chronological order in SQL comparisons.
//! UUIDs are stored as hyphenated lowercase strings.

use std::str::FromStr as _;

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use kiosk_core::visitor::{DuplicateKey, Gender, Purpose, Visitor};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Gender ───────────────────────────────────────────────────────────────────

pub fn encode_gender(g: Option<Gender>) -> Option<String> {
  g.map(|g| g.as_ref().to_owned())
}

pub fn decode_gender(s: Option<&str>) -> Result<Option<Gender>> {
  s.map(|s| {
    Gender::from_str(s).map_err(|_| kiosk_core::Error::UnknownGender(s.to_owned()))
  })
  .transpose()
  .map_err(Error::Core)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read from, or about to be written to, a `visitors` row.
pub struct RawVisitor {
  pub visitor_id:    String,
  pub name:          String,
  pub company:       String,
  pub email:         String,
  pub purpose:       String,
  pub phone:         String,
  pub date_of_birth: Option<String>,
  pub gender:        Option<String>,
  pub created_at:    String,
}

impl RawVisitor {
  /// Column list matching [`RawVisitor::from_row`].
  pub const COLUMNS: &'static str =
    "visitor_id, name, company, email, purpose, phone, date_of_birth, gender, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      visitor_id:    row.get(0)?,
      name:          row.get(1)?,
      company:       row.get(2)?,
      email:         row.get(3)?,
      purpose:       row.get(4)?,
      phone:         row.get(5)?,
      date_of_birth: row.get(6)?,
      gender:        row.get(7)?,
      created_at:    row.get(8)?,
    })
  }

  pub fn from_visitor(v: &Visitor) -> Self {
    Self {
      visitor_id:    encode_uuid(v.visitor_id),
      name:          v.name.clone(),
      company:       v.company.clone(),
      email:         v.email.clone(),
      purpose:       v.purpose.to_string(),
      phone:         v.phone.clone(),
      date_of_birth: v.date_of_birth.clone(),
      gender:        encode_gender(v.gender),
      created_at:    encode_dt(v.created_at),
    }
  }

  pub fn into_visitor(self) -> Result<Visitor> {
    Ok(Visitor {
      visitor_id:    decode_uuid(&self.visitor_id)?,
      gender:        decode_gender(self.gender.as_deref())?,
      created_at:    decode_dt(&self.created_at)?,
      purpose:       Purpose::from(self.purpose),
      name:          self.name,
      company:       self.company,
      email:         self.email,
      phone:         self.phone,
      date_of_birth: self.date_of_birth,
    })
  }
}

/// The normalised key columns, in `name_key, company_key, email_key` order.
pub fn key_columns(key: &DuplicateKey) -> [String; 3] {
  [key.name.clone(), key.company.clone(), key.email.clone()]
}
