//! Handlers for `/registrations` endpoints.
//!
//! Registrations are the reconciler's system of record; these endpoints are
//! the sign-up surface that feeds it. Cancelling a registration never
//! touches rosters — the reconciler only ever adds.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use pitwall_core::{
  EventId, RegistrationId, TeamId,
  registration::{NewRegistration, Registration},
  store::RegistrationStore,
};

use crate::{ApiState, error::ApiError};

/// `POST /registrations` — returns 201 + the stored registration.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewRegistration>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistrationStore + 'static,
{
  let registration = state
    .store
    .record_registration(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::Conflict(
        "user is already registered for this event and team".into(),
      )
    })?;

  Ok((StatusCode::CREATED, Json(registration)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub event_id: EventId,
  pub team_id:  TeamId,
}

/// `GET /registrations?event_id=<id>&team_id=<id>`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Registration>>, ApiError>
where
  S: RegistrationStore + 'static,
{
  let registrations = state
    .store
    .registrations_for(params.event_id, params.team_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(registrations))
}

/// `DELETE /registrations/:id`
pub async fn cancel<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<RegistrationId>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RegistrationStore + 'static,
{
  let cancelled = state
    .store
    .cancel_registration(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  if !cancelled {
    return Err(ApiError::NotFound(format!("registration {id} not found")));
  }
  Ok(Json(json!({ "status": "cancelled", "registration_id": id })))
}
