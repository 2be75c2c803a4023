//! The roster reconciler.
//!
//! Registrations are the system of record for "who is on the team for this
//! event"; the roster is a working document organizers annotate
//! independently. Reconciliation guarantees every confirmed registration is
//! represented by exactly one roster entry, creating missing ones and
//! leaving everything already present completely untouched. Re-running it
//! with unchanged registrations is a no-op.

use std::collections::HashSet;

use crate::{
  Error, Result, UserId,
  plan::RacePlan,
  roster::{NewRosterEntry, RosterEntry},
  store::{IdentityResolver, PlanStore, RegistrationStore},
};

/// Bring `plan`'s roster up to date with its confirmed registrations and
/// return the full roster afterwards.
///
/// Entry creation is per-registration, not transactional across the batch:
/// a failure partway through leaves the entries already created in place,
/// and a retry picks up where it stopped.
pub async fn reconcile<P, R, I>(
  plans: &P,
  registrations: &R,
  identities: &I,
  plan: &RacePlan,
) -> Result<Vec<RosterEntry>>
where
  P: PlanStore,
  R: RegistrationStore,
  I: IdentityResolver,
{
  let confirmed = registrations
    .registrations_for(plan.event_id, plan.team_id)
    .await
    .map_err(Error::upstream)?;

  let existing = plans.list_entries(plan.id).await.map_err(Error::store)?;

  // Placeholder entries (no user link) never count as "present".
  let mut present: HashSet<UserId> =
    existing.iter().filter_map(|e| e.user_id).collect();

  let mut missing: Vec<UserId> = Vec::new();
  for reg in &confirmed {
    if present.insert(reg.user_id) {
      missing.push(reg.user_id);
    }
  }

  if missing.is_empty() {
    return Ok(existing);
  }

  // One batch lookup for the whole run, not a round-trip per driver.
  let names = identities
    .display_names(&missing)
    .await
    .map_err(Error::upstream)?;

  for user_id in missing {
    let name = names
      .get(&user_id)
      .cloned()
      .unwrap_or_else(|| format!("Driver {user_id}"));

    // `None` means a concurrent reconcile inserted this driver between our
    // read and this write; the roster already holds the entry.
    let _ = plans
      .create_entry(NewRosterEntry::from_registration(plan.id, user_id, name))
      .await
      .map_err(Error::store)?;
  }

  plans.list_entries(plan.id).await.map_err(Error::store)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
