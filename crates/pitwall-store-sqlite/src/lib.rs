//! SQLite backend for the Pitwall race-plan store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. One `SqliteStore` implements all
//! three core traits: [`pitwall_core::store::PlanStore`],
//! [`pitwall_core::store::RegistrationStore`] and
//! [`pitwall_core::store::IdentityResolver`].

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
