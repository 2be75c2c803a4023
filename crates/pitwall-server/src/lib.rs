//! Configuration and router assembly for the Pitwall server.
//!
//! The binary in `main.rs` loads a [`ServerConfig`], opens the SQLite
//! store, and serves the router built here: the REST API (optionally
//! behind Basic auth) merged with the WebSocket subscription route.

pub mod auth;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use pitwall_api::{ApiState, api_router, ws_router};
use pitwall_core::store::{IdentityResolver, PlanStore, RegistrationStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// with `PITWALL_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Basic-auth credentials for the REST surface; leave both unset to run
  /// the API open (e.g. behind a trusted reverse proxy).
  #[serde(default)]
  pub auth_username:      Option<String>,
  #[serde(default)]
  pub auth_password_hash: Option<String>,
}

impl ServerConfig {
  pub fn auth(&self) -> Option<AuthConfig> {
    match (&self.auth_username, &self.auth_password_hash) {
      (Some(username), Some(password_hash)) => Some(AuthConfig {
        username:      username.clone(),
        password_hash: password_hash.clone(),
      }),
      _ => None,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full server router: REST endpoints (wrapped in Basic auth when
/// configured) merged with the realtime subscription route.
pub fn router<S>(state: ApiState<S>, auth: Option<AuthConfig>) -> Router
where
  S: PlanStore + RegistrationStore + IdentityResolver + 'static,
{
  let rest = api_router(state.clone());
  let rest = match auth {
    Some(config) => rest.layer(middleware::from_fn_with_state(
      Arc::new(config),
      auth::require_auth,
    )),
    None => rest,
  };

  Router::new()
    .merge(rest)
    .merge(ws_router(state))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use pitwall_realtime::RoomRegistry;
  use pitwall_store_sqlite::SqliteStore;
  use rand_core::OsRng;
  use tower::ServiceExt as _;

  async fn make_state() -> ApiState<SqliteStore> {
    ApiState {
      store: Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      rooms: Arc::new(RoomRegistry::new()),
    }
  }

  fn make_auth(password: &str) -> AuthConfig {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AuthConfig { username: "user".into(), password_hash: hash }
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  #[tokio::test]
  async fn rest_requires_auth_when_configured() {
    let app = router(make_state().await, Some(make_auth("secret")));

    let resp = app
      .oneshot(
        Request::builder()
          .method("GET")
          .uri("/registrations?event_id=1&team_id=2")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn rest_accepts_valid_credentials() {
    let app = router(make_state().await, Some(make_auth("secret")));

    let resp = app
      .oneshot(
        Request::builder()
          .method("GET")
          .uri("/registrations?event_id=1&team_id=2")
          .header(header::AUTHORIZATION, basic("user", "secret"))
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn rest_is_open_without_auth_config() {
    let app = router(make_state().await, None);

    let resp = app
      .oneshot(
        Request::builder()
          .method("GET")
          .uri("/registrations?event_id=1&team_id=2")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn config_without_credentials_yields_no_auth() {
    let config = ServerConfig {
      host:               "127.0.0.1".into(),
      port:               8080,
      store_path:         PathBuf::from(":memory:"),
      auth_username:      Some("user".into()),
      auth_password_hash: None,
    };
    assert!(config.auth().is_none());
  }
}
