//! The realtime subscription endpoint.
//!
//! `GET /ws/race-plan/:id` upgrades to a WebSocket and joins the plan's
//! room. The server pushes [`pitwall_realtime::PlanEvent`] envelopes in
//! broadcast order; messages from the client are diagnostic/heartbeat only
//! and never affect server state. Disconnection — whether noticed on the
//! read path or as a failed send — converges on leaving the room.

use std::sync::Arc;

use axum::{
  extract::{
    Path, State, WebSocketUpgrade,
    ws::{Message, WebSocket},
  },
  response::IntoResponse,
};
use tokio::sync::mpsc;

use pitwall_core::{PlanId, store::PlanStore};
use pitwall_realtime::RoomRegistry;

use crate::ApiState;

/// `GET /ws/race-plan/:id`
pub async fn subscribe<S>(
  State(state): State<ApiState<S>>,
  Path(race_plan_id): Path<PlanId>,
  upgrade: WebSocketUpgrade,
) -> impl IntoResponse
where
  S: PlanStore + 'static,
{
  upgrade
    .on_upgrade(move |socket| run_subscriber(socket, state.rooms, race_plan_id))
}

async fn run_subscriber(
  mut socket: WebSocket,
  rooms: Arc<RoomRegistry>,
  plan_id: PlanId,
) {
  let (tx, mut rx) = mpsc::unbounded_channel::<String>();
  let connection = rooms.join(plan_id, tx).await;

  loop {
    tokio::select! {
      delivery = rx.recv() => match delivery {
        Some(payload) => {
          if socket.send(Message::Text(payload.into())).await.is_err() {
            break;
          }
        }
        // Channel closed: the registry evicted this connection after a
        // failed delivery.
        None => break,
      },
      incoming = socket.recv() => match incoming {
        Some(Ok(message)) => {
          tracing::debug!(plan_id, ?message, "client message");
        }
        Some(Err(e)) => {
          tracing::debug!(plan_id, error = %e, "websocket read failed");
          break;
        }
        None => break,
      },
    }
  }

  rooms.leave(plan_id, connection).await;
  tracing::info!(plan_id, "subscriber disconnected");
}
