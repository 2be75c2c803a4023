//! The tagged envelope pushed to race-plan observers.

use pitwall_core::{EntryId, roster::RosterEntry};
use serde::{Deserialize, Serialize};

/// A roster change, as delivered over the wire:
/// `{"type": "driver_added" | "driver_updated" | "driver_deleted", "data": …}`.
///
/// Additions and updates carry the full entry; deletions carry only the
/// deleted entry's id, since the row is gone by the time the event is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PlanEvent {
  DriverAdded(RosterEntry),
  DriverUpdated(RosterEntry),
  DriverDeleted { driver_id: EntryId },
}
