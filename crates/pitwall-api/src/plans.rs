//! Handlers for `/race-plans` endpoints.
//!
//! Creating or fetching a plan runs the roster reconciler, so the response
//! always carries the canonical roster — this is the "client polls the
//! canonical state whenever the plan is loaded" half of the realtime
//! contract.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Serialize;

use pitwall_core::{
  EventId, PlanId, TeamId,
  plan::{NewRacePlan, RacePlan},
  reconcile::reconcile,
  roster::RosterEntry,
  store::{IdentityResolver, PlanStore, RegistrationStore},
};

use crate::{ApiState, error::ApiError};

/// A race plan together with its reconciled roster.
#[derive(Debug, Serialize)]
pub struct PlanResponse {
  pub id:       PlanId,
  pub team_id:  TeamId,
  pub event_id: EventId,
  pub roster:   Vec<RosterEntry>,
}

impl PlanResponse {
  fn new(plan: RacePlan, roster: Vec<RosterEntry>) -> Self {
    Self {
      id: plan.id,
      team_id: plan.team_id,
      event_id: plan.event_id,
      roster,
    }
  }
}

/// `POST /race-plans` — body: `{"team_id": …, "event_id": …}`.
/// Returns 201 + the plan with its roster seeded from registrations.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewRacePlan>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlanStore + RegistrationStore + IdentityResolver + 'static,
{
  let plan = state
    .store
    .create_plan(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let store = state.store.as_ref();
  let roster = reconcile(store, store, store, &plan).await?;

  Ok((StatusCode::CREATED, Json(PlanResponse::new(plan, roster))))
}

/// `GET /race-plans/:id` — reconciles on fetch; 404 if the plan is unknown.
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<PlanId>,
) -> Result<Json<PlanResponse>, ApiError>
where
  S: PlanStore + RegistrationStore + IdentityResolver + 'static,
{
  let plan = state
    .store
    .get_plan(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("race plan {id} not found")))?;

  let store = state.store.as_ref();
  let roster = reconcile(store, store, store, &plan).await?;

  Ok(Json(PlanResponse::new(plan, roster)))
}
