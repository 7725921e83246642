//! Error types for `kiosk-core`.

use thiserror::Error;

use crate::form::ValidationErrors;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationErrors),

  #[error("unknown gender: {0:?}")]
  UnknownGender(String),

  #[error("invalid image: {0}")]
  InvalidImage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
