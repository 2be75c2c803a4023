//! [`SqliteStore`] — the SQLite implementation of the core store traits.

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use pitwall_core::{
  EntryId, EventId, PlanId, RegistrationId, TeamId, UserId,
  plan::{NewRacePlan, RacePlan},
  registration::{NewRegistration, Registration},
  roster::{NewRosterEntry, RosterEntry},
  store::{IdentityResolver, PlanStore, RegistrationStore},
};

use crate::{
  Error, Result,
  encode::{RawRegistration, encode_dt},
  schema::SCHEMA,
};

const ENTRY_COLUMNS: &str = "id, race_plan_id, user_id, name, color, \
   preference, stints, fair_share, gmt_offset, i_rating, lap_time, factor";

const REGISTRATION_COLUMNS: &str =
  "id, event_id, user_id, team_id, time_slot, car_id, registered_at";

// ─── Row mappers ─────────────────────────────────────────────────────────────

fn entry_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RosterEntry> {
  Ok(RosterEntry {
    id:           row.get(0)?,
    race_plan_id: row.get(1)?,
    user_id:      row.get(2)?,
    name:         row.get(3)?,
    color:        row.get(4)?,
    preference:   row.get(5)?,
    stints:       row.get(6)?,
    fair_share:   row.get(7)?,
    gmt_offset:   row.get(8)?,
    i_rating:     row.get(9)?,
    lap_time:     row.get(10)?,
    factor:       row.get(11)?,
  })
}

fn registration_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRegistration> {
  Ok(RawRegistration {
    id:            row.get(0)?,
    event_id:      row.get(1)?,
    user_id:       row.get(2)?,
    team_id:       row.get(3)?,
    time_slot:     row.get(4)?,
    car_id:        row.get(5)?,
    registered_at: row.get(6)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Pitwall store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn =
      tokio_rusqlite::Connection::open(path.as_ref().to_path_buf()).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert or refresh a cached display name.
  ///
  /// Called by the (out-of-scope) profile sync layer whenever it refreshes
  /// upstream member data.
  pub async fn upsert_user(
    &self,
    user_id: UserId,
    display_name: impl Into<String>,
  ) -> Result<()> {
    let display_name = display_name.into();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, display_name) VALUES (?1, ?2)
           ON CONFLICT (user_id) DO UPDATE SET display_name = excluded.display_name",
          rusqlite::params![user_id, display_name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── PlanStore impl ──────────────────────────────────────────────────────────

impl PlanStore for SqliteStore {
  type Error = Error;

  async fn create_plan(&self, input: NewRacePlan) -> Result<RacePlan> {
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO race_plans (team_id, event_id) VALUES (?1, ?2)",
          rusqlite::params![input.team_id, input.event_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(RacePlan { id, team_id: input.team_id, event_id: input.event_id })
  }

  async fn get_plan(&self, id: PlanId) -> Result<Option<RacePlan>> {
    let plan = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, team_id, event_id FROM race_plans WHERE id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(RacePlan {
                  id:       row.get(0)?,
                  team_id:  row.get(1)?,
                  event_id: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(plan)
  }

  async fn create_entry(
    &self,
    input: NewRosterEntry,
  ) -> Result<Option<RosterEntry>> {
    let entry = self
      .conn
      .call(move |conn| {
        // OR IGNORE swallows exactly the (race_plan_id, user_id) uniqueness
        // conflict; a zero change count means another writer holds the slot.
        let changed = conn.execute(
          "INSERT OR IGNORE INTO roster_entries
             (race_plan_id, user_id, name, color, preference, stints,
              fair_share, gmt_offset, i_rating, lap_time, factor)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            input.race_plan_id,
            input.user_id,
            input.name,
            input.color,
            input.preference,
            input.stints,
            input.fair_share,
            input.gmt_offset,
            input.i_rating,
            input.lap_time,
            input.factor,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }

        let sql =
          format!("SELECT {ENTRY_COLUMNS} FROM roster_entries WHERE id = ?1");
        let entry = conn.query_row(
          &sql,
          rusqlite::params![conn.last_insert_rowid()],
          entry_row,
        )?;
        Ok(Some(entry))
      })
      .await?;
    Ok(entry)
  }

  async fn get_entry(&self, id: EntryId) -> Result<Option<RosterEntry>> {
    let entry = self
      .conn
      .call(move |conn| {
        let sql =
          format!("SELECT {ENTRY_COLUMNS} FROM roster_entries WHERE id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], entry_row)
            .optional()?,
        )
      })
      .await?;
    Ok(entry)
  }

  async fn update_entry(&self, entry: RosterEntry) -> Result<Option<RosterEntry>> {
    let updated = self
      .conn
      .call(move |conn| {
        // race_plan_id is immutable: it is deliberately absent from the SET
        // list, and the stored value is what the read-back returns.
        let changed = conn.execute(
          "UPDATE roster_entries
           SET user_id = ?2, name = ?3, color = ?4, preference = ?5,
               stints = ?6, fair_share = ?7, gmt_offset = ?8, i_rating = ?9,
               lap_time = ?10, factor = ?11
           WHERE id = ?1",
          rusqlite::params![
            entry.id,
            entry.user_id,
            entry.name,
            entry.color,
            entry.preference,
            entry.stints,
            entry.fair_share,
            entry.gmt_offset,
            entry.i_rating,
            entry.lap_time,
            entry.factor,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }

        let sql =
          format!("SELECT {ENTRY_COLUMNS} FROM roster_entries WHERE id = ?1");
        let stored =
          conn.query_row(&sql, rusqlite::params![entry.id], entry_row)?;
        Ok(Some(stored))
      })
      .await?;
    Ok(updated)
  }

  async fn delete_entry(&self, id: EntryId) -> Result<Option<PlanId>> {
    let plan_id = self
      .conn
      .call(move |conn| {
        // Resolve the owning plan before the row is gone; the caller needs
        // it to address the deletion broadcast.
        let plan_id: Option<PlanId> = conn
          .query_row(
            "SELECT race_plan_id FROM roster_entries WHERE id = ?1",
            rusqlite::params![id],
            |row| row.get(0),
          )
          .optional()?;

        let Some(plan_id) = plan_id else {
          return Ok(None);
        };
        conn.execute(
          "DELETE FROM roster_entries WHERE id = ?1",
          rusqlite::params![id],
        )?;
        Ok(Some(plan_id))
      })
      .await?;
    Ok(plan_id)
  }

  async fn list_entries(&self, plan_id: PlanId) -> Result<Vec<RosterEntry>> {
    let entries = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {ENTRY_COLUMNS} FROM roster_entries
           WHERE race_plan_id = ?1 ORDER BY id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![plan_id], entry_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(entries)
  }
}

// ─── RegistrationStore impl ──────────────────────────────────────────────────

impl RegistrationStore for SqliteStore {
  type Error = Error;

  async fn record_registration(
    &self,
    input: NewRegistration,
  ) -> Result<Option<Registration>> {
    let registered_at = Utc::now();
    let time_slot_str = encode_dt(input.time_slot);
    let registered_at_str = encode_dt(registered_at);

    let id = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT OR IGNORE INTO registrations
             (event_id, user_id, team_id, time_slot, car_id, registered_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            input.event_id,
            input.user_id,
            input.team_id,
            time_slot_str,
            input.car_id,
            registered_at_str,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(Some(conn.last_insert_rowid()))
      })
      .await?;

    Ok(id.map(|id| Registration {
      id,
      event_id: input.event_id,
      user_id: input.user_id,
      team_id: input.team_id,
      time_slot: input.time_slot,
      car_id: input.car_id,
      registered_at,
    }))
  }

  async fn registrations_for(
    &self,
    event_id: EventId,
    team_id: TeamId,
  ) -> Result<Vec<Registration>> {
    let raws = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {REGISTRATION_COLUMNS} FROM registrations
           WHERE event_id = ?1 AND team_id = ?2
           ORDER BY registered_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![event_id, team_id], registration_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawRegistration::into_registration)
      .collect()
  }

  async fn cancel_registration(&self, id: RegistrationId) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM registrations WHERE id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}

// ─── IdentityResolver impl ───────────────────────────────────────────────────

impl IdentityResolver for SqliteStore {
  type Error = Error;

  async fn display_name(&self, user_id: UserId) -> Result<Option<String>> {
    let name = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT display_name FROM users WHERE user_id = ?1",
              rusqlite::params![user_id],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(name)
  }

  async fn display_names<'a>(
    &'a self,
    user_ids: &'a [UserId],
  ) -> Result<HashMap<UserId, String>> {
    if user_ids.is_empty() {
      return Ok(HashMap::new());
    }
    let ids = user_ids.to_vec();

    let pairs: Vec<(UserId, String)> = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
          "SELECT user_id, display_name FROM users WHERE user_id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids.iter()), |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(pairs.into_iter().collect())
  }
}
