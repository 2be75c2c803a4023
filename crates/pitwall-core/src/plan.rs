//! Race plan — a team's scheduling record for one event.
//!
//! The plan row itself is a thin envelope; everything interesting lives in
//! its roster entries. The `(team_id, event_id)` pair anchors
//! reconciliation against the registration store.

use serde::{Deserialize, Serialize};

use crate::{EventId, PlanId, TeamId};

/// A team's driver-assignment record for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RacePlan {
  pub id:       PlanId,
  pub team_id:  TeamId,
  pub event_id: EventId,
}

/// Input to [`crate::store::PlanStore::create_plan`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NewRacePlan {
  pub team_id:  TeamId,
  pub event_id: EventId,
}
