//! HTTP Basic-auth extractor that opens an operator session.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rollcall_core::store::{ArtifactStore, RecordStore};
use rollcall_service::OperatorSession;

use crate::{AppState, error::ApiError};

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// A signed-in session for the operator who sent the request.
pub struct Operator(pub OperatorSession);

/// Verify Basic credentials and return the operator's name.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<String, ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  if username != config.username {
    return Err(ApiError::Unauthorized);
  }

  let parsed_hash =
    PasswordHash::new(&config.password_hash).map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(username.to_owned())
}

impl<R, A> FromRequestParts<AppState<R, A>> for Operator
where
  R: RecordStore + 'static,
  A: ArtifactStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<R, A>,
  ) -> Result<Self, Self::Rejection> {
    match verify_auth(&parts.headers, &state.auth) {
      Ok(name) => Ok(Operator(OperatorSession::signed_in(name))),
      Err(e) => {
        tracing::debug!(uri = %parts.uri, "rejected credentials");
        Err(e)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::HeaderValue;
  use rand_core::OsRng;

  fn config(password: &str) -> AuthConfig {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AuthConfig { username: "ops".to_string(), password_hash: hash }
  }

  fn headers(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  #[test]
  fn correct_credentials() {
    let config = config("secret");
    let name = verify_auth(&headers(&basic("ops", "secret")), &config).unwrap();
    assert_eq!(name, "ops");
  }

  #[test]
  fn wrong_password() {
    let config = config("secret");
    assert!(matches!(
      verify_auth(&headers(&basic("ops", "wrong")), &config),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn wrong_username() {
    let config = config("secret");
    assert!(matches!(
      verify_auth(&headers(&basic("admin", "secret")), &config),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn missing_header() {
    let config = config("secret");
    assert!(matches!(
      verify_auth(&HeaderMap::new(), &config),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn invalid_base64() {
    let config = config("secret");
    assert!(matches!(
      verify_auth(&headers("Basic !!!not-base64!!!"), &config),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn malformed_stored_hash() {
    let config = AuthConfig {
      username:      "ops".to_string(),
      password_hash: "plaintext".to_string(),
    };
    assert!(matches!(
      verify_auth(&headers(&basic("ops", "plaintext")), &config),
      Err(ApiError::Unauthorized)
    ));
  }
}
