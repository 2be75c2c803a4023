//! The store traits and their contracts.
//!
//! [`PlanStore`] is implemented by storage backends (e.g.
//! `pitwall-store-sqlite`). [`RegistrationStore`] and [`IdentityResolver`]
//! are the two external collaborators the reconciler consumes; the SQLite
//! backend implements them too, but higher layers depend only on the
//! abstractions.

use std::{collections::HashMap, future::Future};

use crate::{
  EntryId, EventId, PlanId, RegistrationId, TeamId, UserId,
  plan::{NewRacePlan, RacePlan},
  registration::{NewRegistration, Registration},
  roster::{NewRosterEntry, RosterEntry},
};

// ─── PlanStore ───────────────────────────────────────────────────────────────

/// Abstraction over race-plan and roster-entry persistence.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PlanStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Race plans ────────────────────────────────────────────────────────

  /// Create and persist a new race plan for a (team, event) pair.
  fn create_plan(
    &self,
    input: NewRacePlan,
  ) -> impl Future<Output = Result<RacePlan, Self::Error>> + Send + '_;

  /// Retrieve a race plan by id. Returns `None` if not found.
  fn get_plan(
    &self,
    id: PlanId,
  ) -> impl Future<Output = Result<Option<RacePlan>, Self::Error>> + Send + '_;

  // ── Roster entries ────────────────────────────────────────────────────

  /// Create a roster entry, assigning its id.
  ///
  /// Returns `None` — without writing anything — when the entry carries a
  /// `user_id` already present in the plan's roster. That uniqueness is
  /// enforced at the storage layer, so two concurrent callers racing to add
  /// the same driver resolve to one insert and one `None`.
  fn create_entry(
    &self,
    input: NewRosterEntry,
  ) -> impl Future<Output = Result<Option<RosterEntry>, Self::Error>> + Send + '_;

  /// Retrieve a roster entry by id. Returns `None` if not found.
  fn get_entry(
    &self,
    id: EntryId,
  ) -> impl Future<Output = Result<Option<RosterEntry>, Self::Error>> + Send + '_;

  /// Persist new field values for an existing entry, keyed by `entry.id`.
  ///
  /// The stored `race_plan_id` is authoritative and is never changed by an
  /// update. Returns the stored entry after the write, or `None` if the id
  /// does not exist.
  fn update_entry(
    &self,
    entry: RosterEntry,
  ) -> impl Future<Output = Result<Option<RosterEntry>, Self::Error>> + Send + '_;

  /// Delete an entry permanently.
  ///
  /// Returns the owning `race_plan_id` (resolved before the row is gone —
  /// callers need it to address the deletion broadcast), or `None` if the
  /// id does not exist.
  fn delete_entry(
    &self,
    id: EntryId,
  ) -> impl Future<Output = Result<Option<PlanId>, Self::Error>> + Send + '_;

  /// All entries for a race plan, ordered by id.
  fn list_entries(
    &self,
    plan_id: PlanId,
  ) -> impl Future<Output = Result<Vec<RosterEntry>, Self::Error>> + Send + '_;
}

// ─── RegistrationStore ───────────────────────────────────────────────────────

/// Read/write access to confirmed event registrations.
///
/// The reconciler only reads; the sign-up endpoints write.
pub trait RegistrationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Record a confirmed registration.
  ///
  /// Returns `None` when a registration for the same
  /// `(event_id, user_id, team_id)` already exists.
  fn record_registration(
    &self,
    input: NewRegistration,
  ) -> impl Future<Output = Result<Option<Registration>, Self::Error>> + Send + '_;

  /// All confirmed registrations for an (event, team) pair.
  fn registrations_for(
    &self,
    event_id: EventId,
    team_id: TeamId,
  ) -> impl Future<Output = Result<Vec<Registration>, Self::Error>> + Send + '_;

  /// Cancel a registration. Returns `false` if the id does not exist.
  /// Cancelling never touches rosters — the reconciler only ever adds.
  fn cancel_registration(
    &self,
    id: RegistrationId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── IdentityResolver ────────────────────────────────────────────────────────

/// Maps upstream user identifiers to display names.
///
/// Backed by the profile cache the (out-of-scope) OAuth sync layer keeps
/// warm; a `None`/missing name is an expected state, not an error.
pub trait IdentityResolver: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The display name for one user, if known.
  fn display_name(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  /// Resolve a batch of users in one call. Unknown users are simply absent
  /// from the returned map.
  fn display_names<'a>(
    &'a self,
    user_ids: &'a [UserId],
  ) -> impl Future<Output = Result<HashMap<UserId, String>, Self::Error>> + Send + 'a;
}
