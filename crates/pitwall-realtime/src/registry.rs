//! [`RoomRegistry`] — live subscriber bookkeeping and broadcast dispatch.
//!
//! Rooms are keyed by race-plan id and exist only while they have
//! subscribers: created lazily on the first join, deleted on the last
//! leave. The registry is transient fan-out state — it is rebuilt empty on
//! restart, which is correct because connections do not survive a restart
//! either.

use std::collections::HashMap;

use tokio::sync::{Mutex, mpsc::UnboundedSender};
use uuid::Uuid;

use pitwall_core::PlanId;

use crate::event::PlanEvent;

/// Identifies one live connection within the registry.
pub type ConnectionId = Uuid;

// ─── Registry ────────────────────────────────────────────────────────────────

/// The mapping from race-plan id to its set of live subscribers.
///
/// Each subscriber is represented by the sending half of its connection
/// task's channel. Sends are non-blocking pushes, so the whole delivery
/// loop runs under the registry lock without suspending — that is what
/// makes per-connection delivery order match broadcast call order.
#[derive(Default)]
pub struct RoomRegistry {
  rooms: Mutex<HashMap<PlanId, HashMap<ConnectionId, UnboundedSender<String>>>>,
}

impl RoomRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a subscriber under `plan_id`'s room, creating the room if
  /// absent. The returned id is the handle for [`RoomRegistry::leave`].
  ///
  /// A connection belongs to exactly one room; observing a different plan
  /// requires a new connection.
  pub async fn join(
    &self,
    plan_id: PlanId,
    sender: UnboundedSender<String>,
  ) -> ConnectionId {
    let id = Uuid::new_v4();
    let mut rooms = self.rooms.lock().await;
    let room = rooms.entry(plan_id).or_default();
    room.insert(id, sender);
    tracing::info!(plan_id, subscribers = room.len(), "joined race-plan room");
    id
  }

  /// Remove a subscriber, deleting the room if it becomes empty.
  ///
  /// Idempotent: leaving twice, or leaving a connection that never joined,
  /// is a no-op.
  pub async fn leave(&self, plan_id: PlanId, connection: ConnectionId) {
    let mut rooms = self.rooms.lock().await;
    let Some(room) = rooms.get_mut(&plan_id) else {
      return;
    };
    if room.remove(&connection).is_none() {
      return;
    }
    if room.is_empty() {
      rooms.remove(&plan_id);
    }
    tracing::info!(plan_id, "left race-plan room");
  }

  /// Deliver `event` to every subscriber of `plan_id`'s room.
  ///
  /// An empty or absent room is a silent no-op. A failed delivery never
  /// aborts the rest of the room; the unreachable subscriber is evicted
  /// (an implicit leave). No retry — a dropped message is not redelivered.
  pub async fn broadcast(&self, plan_id: PlanId, event: &PlanEvent) {
    self.broadcast_except(plan_id, event, None).await;
  }

  /// [`RoomRegistry::broadcast`], optionally skipping one subscriber
  /// (sender echo suppression).
  pub async fn broadcast_except(
    &self,
    plan_id: PlanId,
    event: &PlanEvent,
    skip: Option<ConnectionId>,
  ) {
    let payload = match serde_json::to_string(event) {
      Ok(p) => p,
      Err(e) => {
        tracing::error!(plan_id, error = %e, "failed to encode broadcast event");
        return;
      }
    };

    let mut rooms = self.rooms.lock().await;
    let Some(room) = rooms.get_mut(&plan_id) else {
      return;
    };

    // Deliver over a snapshot of the membership and apply evictions after
    // the loop, so a connection dropping mid-broadcast cannot disturb
    // iteration.
    let members: Vec<(ConnectionId, UnboundedSender<String>)> =
      room.iter().map(|(id, tx)| (*id, tx.clone())).collect();

    let mut dropped = Vec::new();
    for (id, tx) in members {
      if Some(id) == skip {
        continue;
      }
      if tx.send(payload.clone()).is_err() {
        dropped.push(id);
      }
    }

    for id in &dropped {
      room.remove(id);
      tracing::warn!(plan_id, connection = %id, "evicted unreachable subscriber");
    }
    if room.is_empty() {
      rooms.remove(&plan_id);
    }
  }

  /// Number of live subscribers in `plan_id`'s room (0 if absent).
  pub async fn room_size(&self, plan_id: PlanId) -> usize {
    self.rooms.lock().await.get(&plan_id).map_or(0, HashMap::len)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
