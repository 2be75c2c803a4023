//! JSON REST + WebSocket API for Pitwall.
//!
//! Exposes an axum [`Router`] backed by any store implementing the
//! [`pitwall_core`] traits, plus a [`RoomRegistry`] for realtime fan-out.
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", pitwall_api::api_router(state.clone()))
//! ```

pub mod error;
pub mod plans;
pub mod registrations;
pub mod roster;
pub mod ws;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use pitwall_core::store::{IdentityResolver, PlanStore, RegistrationStore};
use pitwall_realtime::RoomRegistry;

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers: the persistence backend and
/// the realtime registry. The registry is transient fan-out state only —
/// the store stays the single source of truth for roster content.
pub struct ApiState<S> {
  pub store: Arc<S>,
  pub rooms: Arc<RoomRegistry>,
}

// Manual impl: `S` itself need not be `Clone` behind the `Arc`.
impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), rooms: self.rooms.clone() }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: PlanStore + RegistrationStore + IdentityResolver + 'static,
{
  Router::new()
    // Race plans (reconcile on create and on fetch)
    .route("/race-plans", post(plans::create::<S>))
    .route("/race-plans/{id}", get(plans::get_one::<S>))
    .route("/race-plans/{id}/roster", get(roster::list::<S>))
    // Roster mutations
    .route("/driver-roster", post(roster::create::<S>))
    .route(
      "/driver-roster/{id}",
      put(roster::update::<S>).delete(roster::delete::<S>),
    )
    // Registrations
    .route(
      "/registrations",
      get(registrations::list::<S>).post(registrations::create::<S>),
    )
    .route("/registrations/{id}", delete(registrations::cancel::<S>))
    .with_state(state)
}

/// Build the realtime subscription router (`/ws/race-plan/{id}`).
///
/// Kept separate from [`api_router`] so a server can mount it outside any
/// auth layer wrapping the REST surface — browsers cannot attach
/// credentials to a WebSocket upgrade.
pub fn ws_router<S>(state: ApiState<S>) -> Router<()>
where
  S: PlanStore + 'static,
{
  Router::new()
    .route("/ws/race-plan/{id}", get(ws::subscribe::<S>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use pitwall_core::plan::NewRacePlan;
  use pitwall_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
  use tower::ServiceExt as _;

  async fn make_state() -> ApiState<SqliteStore> {
    ApiState {
      store: Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      rooms: Arc::new(RoomRegistry::new()),
    }
  }

  async fn request(
    state: ApiState<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    api_router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn make_plan(state: &ApiState<SqliteStore>, team: i64, event: i64) -> i64 {
    state
      .store
      .create_plan(NewRacePlan { team_id: team, event_id: event })
      .await
      .unwrap()
      .id
  }

  async fn watch_plan(
    state: &ApiState<SqliteStore>,
    plan_id: i64,
  ) -> UnboundedReceiver<String> {
    let (tx, rx) = unbounded_channel();
    state.rooms.join(plan_id, tx).await;
    rx
  }

  fn next_event(rx: &mut UnboundedReceiver<String>) -> Value {
    serde_json::from_str(&rx.try_recv().expect("an event was broadcast"))
      .unwrap()
  }

  // ── Mutations broadcast to the plan's room ──────────────────────────────

  #[tokio::test]
  async fn create_then_delete_reaches_every_subscriber() {
    let state = make_state().await;
    let plan_id = make_plan(&state, 2, 1).await;
    let mut a = watch_plan(&state, plan_id).await;
    let mut b = watch_plan(&state, plan_id).await;

    let resp = request(
      state.clone(),
      "POST",
      "/driver-roster",
      Some(json!({ "race_plan_id": plan_id, "name": "Alice" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let entry = json_body(resp).await;
    let entry_id = entry["id"].as_i64().unwrap();
    assert_eq!(entry["race_plan_id"].as_i64(), Some(plan_id));

    for rx in [&mut a, &mut b] {
      let event = next_event(rx);
      assert_eq!(event["type"], "driver_added");
      assert_eq!(event["data"]["name"], "Alice");
    }

    let resp = request(
      state.clone(),
      "DELETE",
      &format!("/driver-roster/{entry_id}"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["driver_id"].as_i64(), Some(entry_id));

    for rx in [&mut a, &mut b] {
      let event = next_event(rx);
      assert_eq!(event["type"], "driver_deleted");
      assert_eq!(event["data"]["driver_id"].as_i64(), Some(entry_id));
    }
  }

  #[tokio::test]
  async fn update_broadcasts_the_full_updated_entry() {
    let state = make_state().await;
    let plan_id = make_plan(&state, 2, 1).await;

    let resp = request(
      state.clone(),
      "POST",
      "/driver-roster",
      Some(json!({ "race_plan_id": plan_id, "name": "Alice", "user_id": 10 })),
    )
    .await;
    let entry_id = json_body(resp).await["id"].as_i64().unwrap();

    // Subscribe after creation so only the update arrives.
    let mut rx = watch_plan(&state, plan_id).await;

    let resp = request(
      state.clone(),
      "PUT",
      &format!("/driver-roster/{entry_id}"),
      Some(json!({
        "race_plan_id": plan_id,
        "name": "Alice",
        "user_id": 10,
        "stints": 3,
        "fair_share": true
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["stints"].as_i64(), Some(3));

    let event = next_event(&mut rx);
    assert_eq!(event["type"], "driver_updated");
    assert_eq!(event["data"]["stints"].as_i64(), Some(3));
    assert_eq!(event["data"]["fair_share"], Value::Bool(true));
  }

  // ── Error responses carry no broadcast side effect ──────────────────────

  #[tokio::test]
  async fn empty_name_is_rejected_without_broadcast() {
    let state = make_state().await;
    let plan_id = make_plan(&state, 2, 1).await;
    let mut rx = watch_plan(&state, plan_id).await;

    let resp = request(
      state.clone(),
      "POST",
      "/driver-roster",
      Some(json!({ "race_plan_id": plan_id, "name": "   " })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test]
  async fn create_for_unknown_plan_is_404() {
    let state = make_state().await;
    let resp = request(
      state,
      "POST",
      "/driver-roster",
      Some(json!({ "race_plan_id": 404, "name": "Alice" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn duplicate_driver_is_409_and_broadcast_once() {
    let state = make_state().await;
    let plan_id = make_plan(&state, 2, 1).await;
    let mut rx = watch_plan(&state, plan_id).await;

    let body = json!({ "race_plan_id": plan_id, "name": "Alice", "user_id": 10 });
    let first =
      request(state.clone(), "POST", "/driver-roster", Some(body.clone())).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second =
      request(state.clone(), "POST", "/driver-roster", Some(body)).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err(), "conflict must not broadcast");
  }

  #[tokio::test]
  async fn mutating_unknown_entries_is_404() {
    let state = make_state().await;
    let plan_id = make_plan(&state, 2, 1).await;
    let mut rx = watch_plan(&state, plan_id).await;

    let resp = request(
      state.clone(),
      "PUT",
      "/driver-roster/999",
      Some(json!({ "race_plan_id": plan_id, "name": "Ghost" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp =
      request(state.clone(), "DELETE", "/driver-roster/999", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    assert!(rx.try_recv().is_err());
  }

  // ── Race plans reconcile on create and fetch ────────────────────────────

  #[tokio::test]
  async fn creating_a_plan_seeds_the_roster_from_registrations() {
    let state = make_state().await;
    for (user, name) in [(10, "Alice"), (11, "Bob")] {
      state.store.upsert_user(user, name).await.unwrap();
      let resp = request(
        state.clone(),
        "POST",
        "/registrations",
        Some(json!({
          "event_id": 1,
          "user_id": user,
          "team_id": 2,
          "time_slot": "2026-03-14T19:00:00Z",
          "car_id": 77
        })),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = request(
      state.clone(),
      "POST",
      "/race-plans",
      Some(json!({ "team_id": 2, "event_id": 1 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let plan = json_body(resp).await;
    let roster = plan["roster"].as_array().unwrap();
    assert_eq!(roster.len(), 2);
    let names: Vec<&str> =
      roster.iter().map(|e| e["name"].as_str().unwrap()).collect();
    assert!(names.contains(&"Alice") && names.contains(&"Bob"));
  }

  #[tokio::test]
  async fn fetching_a_plan_picks_up_new_registrations() {
    let state = make_state().await;
    let plan_id = make_plan(&state, 2, 1).await;

    let resp = request(
      state.clone(),
      "GET",
      &format!("/race-plans/{plan_id}"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(json_body(resp).await["roster"].as_array().unwrap().is_empty());

    // A driver registers between fetches; no display name is cached yet.
    request(
      state.clone(),
      "POST",
      "/registrations",
      Some(json!({
        "event_id": 1,
        "user_id": 42,
        "team_id": 2,
        "time_slot": "2026-03-14T19:00:00Z",
        "car_id": 77
      })),
    )
    .await;

    let resp = request(
      state.clone(),
      "GET",
      &format!("/race-plans/{plan_id}"),
      None,
    )
    .await;
    let roster = json_body(resp).await;
    let roster = roster["roster"].as_array().unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0]["name"], "Driver 42");
    assert_eq!(roster[0]["user_id"].as_i64(), Some(42));
  }

  #[tokio::test]
  async fn fetching_an_unknown_plan_is_404() {
    let state = make_state().await;
    let resp = request(state, "GET", "/race-plans/404", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Registrations ───────────────────────────────────────────────────────

  #[tokio::test]
  async fn registration_lifecycle() {
    let state = make_state().await;
    let body = json!({
      "event_id": 1,
      "user_id": 10,
      "team_id": 2,
      "time_slot": "2026-03-14T19:00:00Z",
      "car_id": 77
    });

    let resp =
      request(state.clone(), "POST", "/registrations", Some(body.clone())).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let reg_id = json_body(resp).await["id"].as_i64().unwrap();

    let resp =
      request(state.clone(), "POST", "/registrations", Some(body)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = request(
      state.clone(),
      "GET",
      "/registrations?event_id=1&team_id=2",
      None,
    )
    .await;
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 1);

    let resp = request(
      state.clone(),
      "DELETE",
      &format!("/registrations/{reg_id}"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = request(
      state.clone(),
      "DELETE",
      &format!("/registrations/{reg_id}"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
