//! Core types and trait definitions for the Pitwall race-plan store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod plan;
pub mod reconcile;
pub mod registration;
pub mod roster;
pub mod store;

pub use error::{Error, Result};

/// Row id of a race plan.
pub type PlanId = i64;
/// Row id of a roster entry.
pub type EntryId = i64;
/// Row id of an event registration.
pub type RegistrationId = i64;
/// A user's identifier in the upstream racing service.
pub type UserId = i64;
/// A team's identifier in the upstream racing service.
pub type TeamId = i64;
/// An event's identifier.
pub type EventId = i64;
/// A car's identifier in the upstream racing service.
pub type CarId = i64;
