//! HTTP Basic-auth verifier and the middleware guarding staff routes.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use serde::Deserialize;

use crate::error::Error;

/// Staff credentials, the `[staff]` section of the config.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Decode the `user:password` pair of a `Basic` authorization header.
///
/// Only the first `:` separates the two, so passwords may contain colons.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, encoded) = value.split_once(' ')?;
  if !scheme.eq_ignore_ascii_case("basic") {
    return None;
  }
  let decoded = String::from_utf8(B64.decode(encoded.trim()).ok()?).ok()?;
  let (user, password) = decoded.split_once(':')?;
  Some((user.to_owned(), password.to_owned()))
}

/// Check the request's Basic credentials against the configured staff login.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Error> {
  let Some((user, password)) = basic_credentials(headers) else {
    return Err(Error::Unauthorized);
  };
  if user != config.username {
    return Err(Error::Unauthorized);
  }
  match PasswordHash::new(&config.password_hash) {
    Ok(hash) if Argon2::default().verify_password(password.as_bytes(), &hash).is_ok() => Ok(()),
    Ok(_) => Err(Error::Unauthorized),
    Err(e) => {
      tracing::error!(error = %e, "staff password_hash is not a valid PHC string");
      Err(Error::Unauthorized)
    }
  }
}

/// Middleware: reject the request with 401 unless it carries valid staff
/// credentials.
pub async fn require_staff(
  State(auth): State<Arc<AuthConfig>>,
  req: Request,
  next: Next,
) -> Result<Response, Error> {
  if let Err(e) = verify_auth(req.headers(), &auth) {
    tracing::warn!(path = %req.uri().path(), "staff authentication failed");
    return Err(e);
  }
  Ok(next.run(req).await)
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use axum::http::HeaderValue;

  pub(crate) fn make_config(password: &str) -> AuthConfig {
    use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
    use rand_core::OsRng;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AuthConfig {
      username:      "frontdesk".to_string(),
      password_hash: hash,
    }
  }

  pub(crate) fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  fn headers(auth: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
    h
  }

  #[test]
  fn correct_credentials() {
    let config = make_config("secret");
    assert!(verify_auth(&headers(&basic("frontdesk", "secret")), &config).is_ok());
  }

  #[test]
  fn wrong_password() {
    let config = make_config("secret");
    let result = verify_auth(&headers(&basic("frontdesk", "wrong")), &config);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn wrong_username() {
    let config = make_config("secret");
    let result = verify_auth(&headers(&basic("visitor", "secret")), &config);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn missing_header() {
    let config = make_config("secret");
    assert!(matches!(verify_auth(&HeaderMap::new(), &config), Err(Error::Unauthorized)));
  }

  #[test]
  fn invalid_base64() {
    let config = make_config("secret");
    let result = verify_auth(&headers("Basic !!!not-base64!!!"), &config);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn password_may_contain_colons() {
    let config = make_config("s3:cr:et");
    assert!(verify_auth(&headers(&basic("frontdesk", "s3:cr:et")), &config).is_ok());
    let result = verify_auth(&headers(&basic("frontdesk", "s3")), &config);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn scheme_is_case_insensitive() {
    let config = make_config("secret");
    let lower = basic("frontdesk", "secret").replacen("Basic", "basic", 1);
    assert!(verify_auth(&headers(&lower), &config).is_ok());
  }

  #[test]
  fn other_schemes_are_rejected() {
    let config = make_config("secret");
    let result = verify_auth(&headers("Bearer frontdesk:secret"), &config);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn malformed_stored_hash_rejects() {
    let config = AuthConfig {
      username:      "frontdesk".into(),
      password_hash: "plaintext".into(),
    };
    let result = verify_auth(&headers(&basic("frontdesk", "plaintext")), &config);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }
}
