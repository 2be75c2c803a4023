//! Event registrations — the system of record for team membership.
//!
//! A registration is a confirmed commitment of a user, on a team, to an
//! event time slot and car. Registrations are written by the sign-up flow
//! and read by the reconciler; rosters are derived from them, never the
//! other way around.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CarId, EventId, RegistrationId, TeamId, UserId};

/// A confirmed event registration.
///
/// At most one registration exists per `(event_id, user_id, team_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
  pub id:            RegistrationId,
  pub event_id:      EventId,
  pub user_id:       UserId,
  pub team_id:       TeamId,
  pub time_slot:     DateTime<Utc>,
  pub car_id:        CarId,
  /// Server-assigned timestamp; never changes after creation.
  pub registered_at: DateTime<Utc>,
}

/// Input to [`crate::store::RegistrationStore::record_registration`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRegistration {
  pub event_id:  EventId,
  pub user_id:   UserId,
  pub team_id:   TeamId,
  pub time_slot: DateTime<Utc>,
  pub car_id:    CarId,
}
