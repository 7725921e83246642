//! Field extraction from OCR text.
//!
//! [`extract_fields`] turns the free-form text recognised on an ID card into
//! suggested form values. It is a best-effort heuristic: it never fails, never
//! guesses beyond its rules, and the kiosk always shows the result to the
//! visitor for confirmation before anything is submitted.
//!
//! Extraction runs an ordered list of [`Rule`]s top to bottom. A rule only
//! runs while its field is still empty, and inside a rule the first matching
//! line wins. Later, possibly better, candidates are never reconsidered.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}")
    .expect("email pattern compiles")
});

/// Applied to a line, or the text after a phone label, with all whitespace
/// removed.
static PHONE_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^\+?[0-9().\-]{7,}$").expect("phone pattern compiles"));

static PHONE_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)\b(?:phone|tel|mobile|cell)\b\.?").expect("phone label pattern compiles")
});

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(
    r"\b(?:\d{4}[/.\-]\d{1,2}[/.\-]\d{1,2}|\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4})\b",
  )
  .expect("date pattern compiles")
});

static DOB_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)\b(?:d\.\s?o\.\s?b\b\.?|dob\b|date\s+of\s+birth\b)")
    .expect("dob label pattern compiles")
});

static COMPANY_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)\b(?:hospital|clinic|labs|inc|ltd|corporation|llc)\b")
    .expect("company pattern compiles")
});

static STRICT_NAME_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^\p{Lu}\p{Ll}+(?:\s+\p{Lu}\p{Ll}+)+$").expect("name pattern compiles")
});

static NAME_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^\p{L}[\p{L}.'\-]*$").expect("name token pattern compiles")
});

/// Minimum digit count for a line to be considered a phone number.
const MIN_PHONE_DIGITS: usize = 7;

// ─── Output ──────────────────────────────────────────────────────────────────

/// Suggested form values. Every field is optional; absence is never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub company:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub date_of_birth: Option<String>,
}

impl ExtractedFields {
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.company.is_none()
      && self.email.is_none()
      && self.phone.is_none()
      && self.date_of_birth.is_none()
  }

  fn slot(&mut self, field: Field) -> &mut Option<String> {
    match field {
      Field::Name => &mut self.name,
      Field::Company => &mut self.company,
      Field::Email => &mut self.email,
      Field::Phone => &mut self.phone,
      Field::DateOfBirth => &mut self.date_of_birth,
    }
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  Name,
  Company,
  Email,
  Phone,
  DateOfBirth,
}

/// One extraction step: the field it fills and how to find a value, given the
/// candidate lines and whatever earlier rules already found.
struct Rule {
  field: Field,
  apply: fn(&[&str], &ExtractedFields) -> Option<String>,
}

/// Evaluation order matters: the name rules consult the company already found.
const RULES: &[Rule] = &[
  Rule { field: Field::Email, apply: email_token },
  Rule { field: Field::Phone, apply: phone_line },
  Rule { field: Field::Phone, apply: labelled_phone },
  Rule { field: Field::DateOfBirth, apply: labelled_date },
  Rule { field: Field::DateOfBirth, apply: date_after_label },
  Rule { field: Field::DateOfBirth, apply: bare_date },
  Rule { field: Field::Company, apply: company_line },
  Rule { field: Field::Name, apply: capitalised_name },
  Rule { field: Field::Name, apply: loose_name },
];

/// Extract suggested visitor fields from recognised ID-card text.
pub fn extract_fields(text: &str) -> ExtractedFields {
  let lines: Vec<&str> = text
    .lines()
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .collect();

  let mut out = ExtractedFields::default();
  for rule in RULES {
    if out.slot(rule.field).is_some() {
      continue;
    }
    if let Some(value) = (rule.apply)(&lines, &out) {
      *out.slot(rule.field) = Some(value);
    }
  }
  out
}

// ─── Line predicates ─────────────────────────────────────────────────────────

fn is_email_shaped(line: &str) -> bool { EMAIL_RE.is_match(line) }

fn is_date_shaped(line: &str) -> bool { DATE_RE.is_match(line) }

/// A date followed by other digits must not fuse into one long number, so the
/// date check runs on the line as written as well as on the compacted form.
fn is_phone_shaped(line: &str) -> bool {
  let compact: String = line.split_whitespace().collect();
  PHONE_RE.is_match(&compact)
    && compact.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS
    && !is_date_shaped(line)
    && !is_date_shaped(&compact)
}

fn has_dob_label(line: &str) -> bool { DOB_LABEL_RE.is_match(line) }

fn has_company_keyword(line: &str) -> bool { COMPANY_RE.is_match(line) }

/// Lines that can never be a person's name.
fn is_name_excluded(line: &str, company: Option<&str>) -> bool {
  company == Some(line)
    || is_email_shaped(line)
    || is_phone_shaped(line)
    || has_dob_label(line)
}

// ─── Extractors ──────────────────────────────────────────────────────────────

fn email_token(lines: &[&str], _: &ExtractedFields) -> Option<String> {
  lines
    .iter()
    .find_map(|l| EMAIL_RE.find(l))
    .map(|m| m.as_str().to_owned())
}

fn digits(s: &str) -> String { s.chars().filter(char::is_ascii_digit).collect() }

fn phone_line(lines: &[&str], _: &ExtractedFields) -> Option<String> {
  lines.iter().find(|l| is_phone_shaped(l)).map(|l| digits(l))
}

/// `Phone: +1 555 123 4567`, `Tel. 555-1234567` and the like.
fn labelled_phone(lines: &[&str], _: &ExtractedFields) -> Option<String> {
  lines.iter().find_map(|l| {
    let label = PHONE_LABEL_RE.find(l)?;
    let rest = l[label.end()..]
      .trim_start_matches(|c: char| c == ':' || c == '#' || c.is_whitespace());
    is_phone_shaped(rest).then(|| digits(rest))
  })
}

fn labelled_date(lines: &[&str], _: &ExtractedFields) -> Option<String> {
  lines.iter().find_map(|l| {
    let label = DOB_LABEL_RE.find(l)?;
    DATE_RE
      .find(&l[label.end()..])
      .map(|m| m.as_str().to_owned())
  })
}

fn date_after_label(lines: &[&str], _: &ExtractedFields) -> Option<String> {
  lines.windows(2).find_map(|pair| {
    if !has_dob_label(pair[0]) {
      return None;
    }
    DATE_RE.find(pair[1]).map(|m| m.as_str().to_owned())
  })
}

fn bare_date(lines: &[&str], _: &ExtractedFields) -> Option<String> {
  lines
    .iter()
    .find_map(|l| DATE_RE.find(l))
    .map(|m| m.as_str().to_owned())
}

fn company_line(lines: &[&str], _: &ExtractedFields) -> Option<String> {
  lines
    .iter()
    .find(|l| has_company_keyword(l))
    .map(|l| (*l).to_owned())
}

fn capitalised_name(lines: &[&str], found: &ExtractedFields) -> Option<String> {
  let company = found.company.as_deref();
  lines
    .iter()
    .find(|l| {
      STRICT_NAME_RE.is_match(l) && !is_name_excluded(l, company) && !has_company_keyword(l)
    })
    .map(|l| (*l).to_owned())
}

fn loose_name(lines: &[&str], found: &ExtractedFields) -> Option<String> {
  let company = found.company.as_deref();
  lines.iter().find_map(|l| {
    if is_name_excluded(l, company) || has_company_keyword(l) {
      return None;
    }
    let tokens: Vec<&str> = l.split_whitespace().collect();
    if tokens.len() < 2 || !tokens.iter().all(|t| NAME_TOKEN_RE.is_match(t)) {
      return None;
    }
    Some(
      tokens
        .iter()
        .map(|t| title_case(t))
        .collect::<Vec<_>>()
        .join(" "),
    )
  })
}

fn title_case(token: &str) -> String {
  let mut chars = token.chars();
  match chars.next() {
    Some(first) => first
      .to_uppercase()
      .chain(chars.flat_map(char::to_lowercase))
      .collect(),
    None => String::new(),
  }
}
