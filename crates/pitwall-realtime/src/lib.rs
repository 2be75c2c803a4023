//! Room-based realtime fan-out for race-plan rosters.
//!
//! Every client viewing a race plan subscribes to that plan's "room"; the
//! mutation endpoints broadcast each roster change into the room so all
//! observers converge on the latest state. Delivery is best effort — the
//! store remains the single source of truth, and a client that misses a
//! message re-reads the canonical roster the next time it loads the plan.
//!
//! The registry is an injectable value, constructed once at process start
//! and shared by reference; tests build isolated instances.

pub mod event;
pub mod registry;

pub use event::PlanEvent;
pub use registry::{ConnectionId, RoomRegistry};
