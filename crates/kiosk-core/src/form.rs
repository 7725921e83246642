//! The check-in form and its validation.
//!
//! A [`CheckInForm`] is the raw, per-submission form state exactly as the
//! kiosk sent it. [`CheckInForm::validate`] is a pure function that either
//! produces a [`NewVisitor`] ready for the registrar or reports every field
//! problem at once.

use std::{collections::BTreeMap, fmt, str::FromStr as _};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::VariantNames as _;

use crate::visitor::{Gender, NewVisitor, Purpose};

/// Upper bound on any single form field, in characters.
pub const MAX_FIELD_LEN: usize = 200;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Whether `s` has the basic `local@domain.tld` shape.
pub fn is_valid_email(s: &str) -> bool { EMAIL_RE.is_match(s) }

// ─── Form ────────────────────────────────────────────────────────────────────

/// Raw form values. Missing fields deserialise as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckInForm {
  pub name:          String,
  pub company:       String,
  pub email:         String,
  pub purpose:       String,
  pub phone:         String,
  pub date_of_birth: String,
  pub gender:        String,
}

impl CheckInForm {
  /// Check presence, shape and length of every field.
  ///
  /// All values are trimmed. An empty date of birth or gender means "not
  /// given". No I/O happens here; duplicates are the registrar's concern.
  pub fn validate(&self) -> Result<NewVisitor, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = required(&mut errors, "name", &self.name);
    let company = required(&mut errors, "company", &self.company);
    let email = required(&mut errors, "email", &self.email);
    let purpose = required(&mut errors, "purpose", &self.purpose);
    let phone = required(&mut errors, "phone", &self.phone);
    let date_of_birth = optional(&mut errors, "dateOfBirth", &self.date_of_birth);
    let gender_raw = optional(&mut errors, "gender", &self.gender);

    if !email.is_empty() && !is_valid_email(&email) {
      errors.add("email", "must be a valid email address");
    }

    let gender = match gender_raw {
      Some(raw) => match Gender::from_str(&raw) {
        Ok(g) => Some(g),
        Err(_) => {
          errors.add(
            "gender",
            format!("must be one of: {}", Gender::VARIANTS.join(", ")),
          );
          None
        }
      },
      None => None,
    };

    if !errors.is_empty() {
      return Err(errors);
    }

    Ok(NewVisitor {
      name,
      company,
      email,
      purpose: Purpose::from(purpose),
      phone,
      date_of_birth,
      gender,
    })
  }
}

fn check_len(errors: &mut ValidationErrors, field: &'static str, value: &str) {
  if value.chars().count() > MAX_FIELD_LEN {
    errors.add(field, format!("must be at most {MAX_FIELD_LEN} characters"));
  }
}

fn required(errors: &mut ValidationErrors, field: &'static str, raw: &str) -> String {
  let value = raw.trim();
  if value.is_empty() {
    errors.add(field, "is required");
  }
  check_len(errors, field, value);
  value.to_owned()
}

fn optional(
  errors: &mut ValidationErrors,
  field: &'static str,
  raw: &str,
) -> Option<String> {
  let value = raw.trim();
  check_len(errors, field, value);
  (!value.is_empty()).then(|| value.to_owned())
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Field-level validation failures, keyed by the form's field name.
///
/// Only the first problem per field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
  fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
  pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
    self.fields.entry(field).or_insert_with(|| message.into());
  }

  pub fn is_empty(&self) -> bool { self.fields.is_empty() }

  pub fn get(&self, field: &str) -> Option<&str> {
    self.fields.get(field).map(String::as_str)
  }

  pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
    self.fields.iter().map(|(k, v)| (*k, v.as_str()))
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("validation failed")?;
    for (i, (field, message)) in self.fields.iter().enumerate() {
      let sep = if i == 0 { ": " } else { ", " };
      write!(f, "{sep}{field} {message}")?;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
  use super::*;

  fn complete() -> CheckInForm {
    CheckInForm {
      name:          " Jane Roe ".into(),
      company:       "Globex".into(),
      email:         "jane@globex.com".into(),
      purpose:       "meeting".into(),
      phone:         "555 0100".into(),
      date_of_birth: String::new(),
      gender:        String::new(),
    }
  }

  #[test]
  fn complete_form_is_trimmed_and_accepted() {
    let v = complete().validate().unwrap();
    assert_eq!(v.name, "Jane Roe");
    assert_eq!(v.purpose, Purpose::Meeting);
    assert_eq!(v.date_of_birth, None);
    assert_eq!(v.gender, None);
  }

  #[test]
  fn empty_form_reports_every_required_field() {
    let errs = CheckInForm::default().validate().unwrap_err();
    for field in ["name", "company", "email", "purpose", "phone"] {
      assert_eq!(errs.get(field), Some("is required"), "{field}");
    }
    assert_eq!(errs.get("gender"), None);
  }

  #[test]
  fn malformed_email_is_rejected() {
    let form = CheckInForm { email: "jane.globex.com".into(), ..complete() };
    let errs = form.validate().unwrap_err();
    assert_eq!(errs.get("email"), Some("must be a valid email address"));
  }

  #[test]
  fn whitespace_only_field_counts_as_missing() {
    let form = CheckInForm { company: "   ".into(), ..complete() };
    let errs = form.validate().unwrap_err();
    assert_eq!(errs.get("company"), Some("is required"));
  }

  #[test]
  fn gender_must_be_a_known_option() {
    let form = CheckInForm { gender: "unknown".into(), ..complete() };
    let errs = form.validate().unwrap_err();
    assert!(errs.get("gender").unwrap().starts_with("must be one of"));

    let form = CheckInForm { gender: "prefer not to say".into(), ..complete() };
    assert_eq!(form.validate().unwrap().gender, Some(Gender::PreferNotToSay));
  }

  #[test]
  fn overlong_field_is_rejected() {
    let form = CheckInForm { name: "x".repeat(MAX_FIELD_LEN + 1), ..complete() };
    let errs = form.validate().unwrap_err();
    assert!(errs.get("name").unwrap().contains("at most"));
  }

  #[test]
  fn free_text_purpose_is_kept() {
    let form = CheckInForm { purpose: "Fire drill audit".into(), ..complete() };
    assert_eq!(
      form.validate().unwrap().purpose,
      Purpose::Other("Fire drill audit".into())
    );
  }

  #[test]
  fn display_lists_fields() {
    let mut errs = ValidationErrors::default();
    errs.add("email", "is required");
    errs.add("name", "is required");
    assert_eq!(
      errs.to_string(),
      "validation failed: email is required, name is required"
    );
  }
}
