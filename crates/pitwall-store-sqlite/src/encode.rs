//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Everything else in this
//! store maps to native SQLite column types.

use chrono::{DateTime, Utc};
use pitwall_core::registration::Registration;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `registrations` row.
pub struct RawRegistration {
  pub id:            i64,
  pub event_id:      i64,
  pub user_id:       i64,
  pub team_id:       i64,
  pub time_slot:     String,
  pub car_id:        i64,
  pub registered_at: String,
}

impl RawRegistration {
  pub fn into_registration(self) -> Result<Registration> {
    Ok(Registration {
      id:            self.id,
      event_id:      self.event_id,
      user_id:       self.user_id,
      team_id:       self.team_id,
      time_slot:     decode_dt(&self.time_slot)?,
      car_id:        self.car_id,
      registered_at: decode_dt(&self.registered_at)?,
    })
  }
}
