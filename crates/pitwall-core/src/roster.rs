//! Roster entry types — one driver's row within a race plan's roster.
//!
//! Entries come into existence two ways: explicitly (an organizer adds a
//! driver, possibly a placeholder with no linked user) or implicitly (the
//! reconciler derives them from confirmed event registrations). Either way
//! the entry is a working document afterwards: the optional scheduling and
//! performance fields are filled in by hand and must survive reconciliation
//! untouched.

use serde::{Deserialize, Serialize};

use crate::{EntryId, PlanId, UserId};

// ─── RosterEntry ─────────────────────────────────────────────────────────────

/// One driver's row within a race plan's roster.
///
/// `race_plan_id` is immutable after creation; updates never move an entry
/// between plans. Within one plan at most one entry may carry a given
/// non-null `user_id`; placeholder entries (`user_id = None`) are
/// unconstrained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
  pub id:           EntryId,
  pub race_plan_id: PlanId,
  /// Link to an upstream identity; `None` for manually-added placeholders.
  pub user_id:      Option<UserId>,
  pub name:         String,
  pub color:        Option<String>,
  pub preference:   Option<String>,
  pub stints:       Option<i64>,
  pub fair_share:   Option<bool>,
  pub gmt_offset:   Option<i64>,
  pub i_rating:     Option<f64>,
  pub lap_time:     Option<f64>,
  pub factor:       Option<i64>,
}

// ─── NewRosterEntry ──────────────────────────────────────────────────────────

/// Input to [`crate::store::PlanStore::create_entry`].
/// The `id` is always assigned by the store; it is not accepted from callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRosterEntry {
  pub race_plan_id: PlanId,
  pub user_id:      Option<UserId>,
  pub name:         String,
  pub color:        Option<String>,
  pub preference:   Option<String>,
  pub stints:       Option<i64>,
  pub fair_share:   Option<bool>,
  pub gmt_offset:   Option<i64>,
  pub i_rating:     Option<f64>,
  pub lap_time:     Option<f64>,
  pub factor:       Option<i64>,
}

impl NewRosterEntry {
  /// A bare entry as the reconciler creates it: name, plan, and user link
  /// set, every optional field unset.
  pub fn from_registration(
    race_plan_id: PlanId,
    user_id: UserId,
    name: String,
  ) -> Self {
    Self {
      race_plan_id,
      user_id: Some(user_id),
      name,
      color: None,
      preference: None,
      stints: None,
      fair_share: None,
      gmt_offset: None,
      i_rating: None,
      lap_time: None,
      factor: None,
    }
  }

  /// A manually-added placeholder driver with no linked user.
  pub fn placeholder(race_plan_id: PlanId, name: impl Into<String>) -> Self {
    Self {
      race_plan_id,
      user_id: None,
      name: name.into(),
      color: None,
      preference: None,
      stints: None,
      fair_share: None,
      gmt_offset: None,
      i_rating: None,
      lap_time: None,
      factor: None,
    }
  }
}
