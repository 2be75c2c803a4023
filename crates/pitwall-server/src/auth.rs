//! HTTP Basic-auth middleware for the REST surface.
//!
//! Credentials are a single (username, argon2 PHC hash) pair from the
//! server configuration — enough for a small community deployment sitting
//! behind its own reverse proxy. The WebSocket subscription route is
//! mounted outside this layer.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

fn unauthorized() -> Response {
  let mut res = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
  res.headers_mut().insert(
    header::WWW_AUTHENTICATE,
    HeaderValue::from_static("Basic realm=\"pitwall\""),
  );
  res
}

/// Verify credentials directly from headers.
pub fn verify_auth(
  headers: &HeaderMap,
  config: &AuthConfig,
) -> Result<(), Response> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or_else(unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| unauthorized())?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| unauthorized())?;

  let (username, password) = creds.split_once(':').ok_or_else(unauthorized)?;

  if username != config.username {
    return Err(unauthorized());
  }

  let parsed_hash =
    PasswordHash::new(&config.password_hash).map_err(|_| unauthorized())?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| unauthorized())?;

  Ok(())
}

/// Middleware rejecting unauthenticated requests with 401.
pub async fn require_auth(
  State(config): State<Arc<AuthConfig>>,
  request: Request,
  next: Next,
) -> Response {
  match verify_auth(request.headers(), &config) {
    Ok(()) => next.run(request).await,
    Err(rejection) => rejection,
  }
}
