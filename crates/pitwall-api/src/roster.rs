//! Handlers for `/driver-roster` — the roster mutation endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/driver-roster` | Body: [`NewEntryBody`]; 201 + entry, broadcasts `driver_added` |
//! | `PUT`    | `/driver-roster/:id` | Body: [`EntryBody`]; broadcasts `driver_updated` |
//! | `DELETE` | `/driver-roster/:id` | Broadcasts `driver_deleted` with `{driver_id}` |
//! | `GET`    | `/race-plans/:id/roster` | Raw roster read, no reconcile |
//!
//! Every mutation persists first and broadcasts only after the persist
//! succeeded; an error response never has a broadcast side effect.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use pitwall_core::{
  EntryId, PlanId, UserId,
  roster::{NewRosterEntry, RosterEntry},
  store::PlanStore,
};
use pitwall_realtime::PlanEvent;

use crate::{ApiState, error::ApiError};

// ─── Bodies ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /driver-roster`.
#[derive(Debug, Deserialize)]
pub struct NewEntryBody {
  pub race_plan_id: PlanId,
  pub name:         String,
  pub user_id:      Option<UserId>,
  pub color:        Option<String>,
  pub preference:   Option<String>,
  pub stints:       Option<i64>,
  pub fair_share:   Option<bool>,
  pub gmt_offset:   Option<i64>,
  pub i_rating:     Option<f64>,
  pub lap_time:     Option<f64>,
  pub factor:       Option<i64>,
}

impl From<NewEntryBody> for NewRosterEntry {
  fn from(b: NewEntryBody) -> Self {
    NewRosterEntry {
      race_plan_id: b.race_plan_id,
      user_id:      b.user_id,
      name:         b.name,
      color:        b.color,
      preference:   b.preference,
      stints:       b.stints,
      fair_share:   b.fair_share,
      gmt_offset:   b.gmt_offset,
      i_rating:     b.i_rating,
      lap_time:     b.lap_time,
      factor:       b.factor,
    }
  }
}

/// JSON body accepted by `PUT /driver-roster/:id` — the full wire entry.
/// The `race_plan_id` a client echoes back is ignored; entries never move
/// between plans.
#[derive(Debug, Deserialize)]
pub struct EntryBody {
  pub race_plan_id: PlanId,
  pub name:         String,
  pub user_id:      Option<UserId>,
  pub color:        Option<String>,
  pub preference:   Option<String>,
  pub stints:       Option<i64>,
  pub fair_share:   Option<bool>,
  pub gmt_offset:   Option<i64>,
  pub i_rating:     Option<f64>,
  pub lap_time:     Option<f64>,
  pub factor:       Option<i64>,
}

fn require_name(name: &str) -> Result<(), ApiError> {
  if name.trim().is_empty() {
    return Err(ApiError::BadRequest("driver name must not be empty".into()));
  }
  Ok(())
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /driver-roster` — returns 201 + the stored entry.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewEntryBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlanStore + 'static,
{
  require_name(&body.name)?;

  state
    .store
    .get_plan(body.race_plan_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("race plan {} not found", body.race_plan_id))
    })?;

  let entry = state
    .store
    .create_entry(NewRosterEntry::from(body))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::Conflict("driver is already on this roster".into())
    })?;

  state
    .rooms
    .broadcast(entry.race_plan_id, &PlanEvent::DriverAdded(entry.clone()))
    .await;

  Ok((StatusCode::CREATED, Json(entry)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /driver-roster/:id` — persists new field values and broadcasts the
/// full updated entry.
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<EntryId>,
  Json(body): Json<EntryBody>,
) -> Result<Json<RosterEntry>, ApiError>
where
  S: PlanStore + 'static,
{
  require_name(&body.name)?;

  let entry = RosterEntry {
    id,
    race_plan_id: body.race_plan_id,
    user_id:      body.user_id,
    name:         body.name,
    color:        body.color,
    preference:   body.preference,
    stints:       body.stints,
    fair_share:   body.fair_share,
    gmt_offset:   body.gmt_offset,
    i_rating:     body.i_rating,
    lap_time:     body.lap_time,
    factor:       body.factor,
  };

  let stored = state
    .store
    .update_entry(entry)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("roster entry {id} not found")))?;

  state
    .rooms
    .broadcast(stored.race_plan_id, &PlanEvent::DriverUpdated(stored.clone()))
    .await;

  Ok(Json(stored))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /driver-roster/:id` — removes the entry permanently and
/// broadcasts `{driver_id}` to the plan the entry belonged to.
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<EntryId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlanStore + 'static,
{
  let race_plan_id = state
    .store
    .delete_entry(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("roster entry {id} not found")))?;

  state
    .rooms
    .broadcast(race_plan_id, &PlanEvent::DriverDeleted { driver_id: id })
    .await;

  Ok(Json(json!({ "status": "deleted", "driver_id": id })))
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /race-plans/:id/roster` — the raw stored roster, no reconcile.
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Path(plan_id): Path<PlanId>,
) -> Result<Json<Vec<RosterEntry>>, ApiError>
where
  S: PlanStore + 'static,
{
  state
    .store
    .get_plan(plan_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("race plan {plan_id} not found")))?;

  let entries = state
    .store
    .list_entries(plan_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(entries))
}
