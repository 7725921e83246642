//! Visitor types: the record produced by a single kiosk check-in.
//!
//! A visitor record is written once and never updated. The store assigns the
//! identity and the `created_at` timestamp; everything else comes from the
//! validated check-in form.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantNames};
use uuid::Uuid;

// ─── Gender ──────────────────────────────────────────────────────────────────

/// Self-declared gender; the form offers exactly these options.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  VariantNames,
)]
#[strum(ascii_case_insensitive)]
pub enum Gender {
  Male,
  Female,
  Other,
  #[serde(rename = "Prefer not to say")]
  #[strum(serialize = "Prefer not to say")]
  PreferNotToSay,
}

impl Gender {
  /// Labels shown in the form's gender picker, in display order.
  pub fn labels() -> &'static [&'static str] { Self::VARIANTS }
}

// ─── Purpose ─────────────────────────────────────────────────────────────────

/// Reason for the visit. The kiosk offers a fixed set of labels; anything
/// else is kept verbatim as [`Purpose::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Purpose {
  Meeting,
  Interview,
  Delivery,
  Maintenance,
  Event,
  Personal,
  Other(String),
}

impl Purpose {
  /// Labels shown in the form's purpose picker, in display order.
  pub const LABELS: [&'static str; 6] = [
    "Meeting",
    "Interview",
    "Delivery",
    "Maintenance",
    "Event",
    "Personal",
  ];

  pub fn as_str(&self) -> &str {
    match self {
      Self::Meeting => "Meeting",
      Self::Interview => "Interview",
      Self::Delivery => "Delivery",
      Self::Maintenance => "Maintenance",
      Self::Event => "Event",
      Self::Personal => "Personal",
      Self::Other(s) => s,
    }
  }
}

impl From<String> for Purpose {
  fn from(s: String) -> Self {
    let trimmed = s.trim();
    match trimmed.to_ascii_lowercase().as_str() {
      "meeting" => Self::Meeting,
      "interview" => Self::Interview,
      "delivery" => Self::Delivery,
      "maintenance" => Self::Maintenance,
      "event" => Self::Event,
      "personal" => Self::Personal,
      _ => Self::Other(trimmed.to_owned()),
    }
  }
}

impl From<&str> for Purpose {
  fn from(s: &str) -> Self { Self::from(s.to_owned()) }
}

impl From<Purpose> for String {
  fn from(p: Purpose) -> Self { p.as_str().to_owned() }
}

impl fmt::Display for Purpose {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Duplicate key ───────────────────────────────────────────────────────────

/// The normalised (name, company, email) triple that decides whether two
/// check-ins are the same visitor.
///
/// Each part is trimmed, runs of whitespace collapse to one space, and the
/// result is lowercased. Purpose, phone, date of birth and gender never take
/// part in the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateKey {
  pub name:    String,
  pub company: String,
  pub email:   String,
}

impl DuplicateKey {
  pub fn new(name: &str, company: &str, email: &str) -> Self {
    Self {
      name:    normalize(name),
      company: normalize(company),
      email:   normalize(email),
    }
  }
}

fn normalize(s: &str) -> String {
  s.split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

// ─── Visitor ─────────────────────────────────────────────────────────────────

/// A stored check-in. Once written, no field is ever updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
  pub visitor_id:    Uuid,
  pub name:          String,
  pub company:       String,
  pub email:         String,
  pub purpose:       Purpose,
  pub phone:         String,
  pub date_of_birth: Option<String>,
  pub gender:        Option<Gender>,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at:    DateTime<Utc>,
}

impl Visitor {
  pub fn duplicate_key(&self) -> DuplicateKey {
    DuplicateKey::new(&self.name, &self.company, &self.email)
  }
}

// ─── NewVisitor ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::VisitorStore::insert`], produced by
/// [`crate::form::CheckInForm::validate`].
///
/// `visitor_id` and `created_at` are always set by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVisitor {
  pub name:          String,
  pub company:       String,
  pub email:         String,
  pub purpose:       Purpose,
  pub phone:         String,
  pub date_of_birth: Option<String>,
  pub gender:        Option<Gender>,
}

impl NewVisitor {
  pub fn duplicate_key(&self) -> DuplicateKey {
    DuplicateKey::new(&self.name, &self.company, &self.email)
  }

  /// Attach store-assigned identity and timestamp.
  pub fn into_visitor(self, visitor_id: Uuid, created_at: DateTime<Utc>) -> Visitor {
    Visitor {
      visitor_id,
      name: self.name,
      company: self.company,
      email: self.email,
      purpose: self.purpose,
      phone: self.phone,
      date_of_birth: self.date_of_birth,
      gender: self.gender,
      created_at,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr as _;

  use super::*;

  #[test]
  fn duplicate_key_ignores_case_and_spacing() {
    let a = DuplicateKey::new("John  Doe ", "Acme", "John@Example.com");
    let b = DuplicateKey::new("john doe", " ACME", "john@example.com");
    assert_eq!(a, b);
  }

  #[test]
  fn duplicate_key_distinguishes_companies() {
    let a = DuplicateKey::new("John Doe", "Acme", "john@example.com");
    let b = DuplicateKey::new("John Doe", "Globex", "john@example.com");
    assert_ne!(a, b);
  }

  #[test]
  fn purpose_matches_labels_case_insensitively() {
    assert_eq!(Purpose::from(" interview "), Purpose::Interview);
    assert_eq!(
      Purpose::from("Fixing the lift"),
      Purpose::Other("Fixing the lift".into())
    );
  }

  #[test]
  fn purpose_serialises_as_plain_string() {
    let json = serde_json::to_string(&Purpose::Delivery).unwrap();
    assert_eq!(json, "\"Delivery\"");
    let back: Purpose = serde_json::from_str("\"Audit\"").unwrap();
    assert_eq!(back, Purpose::Other("Audit".into()));
  }

  #[test]
  fn gender_parses_display_labels() {
    assert_eq!(Gender::from_str("female").unwrap(), Gender::Female);
    assert_eq!(
      Gender::from_str("Prefer not to say").unwrap(),
      Gender::PreferNotToSay
    );
    assert_eq!(Gender::PreferNotToSay.to_string(), "Prefer not to say");
    assert!(Gender::from_str("robot").is_err());
  }

  #[test]
  fn gender_variant_names_follow_labels() {
    assert_eq!(
      Gender::VARIANTS,
      &["Male", "Female", "Other", "Prefer not to say"]
    );
  }
}
