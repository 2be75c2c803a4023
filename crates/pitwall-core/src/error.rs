//! Error types for `pitwall-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The Registration Store or Identity Resolver could not be reached.
  #[error("upstream unavailable: {0}")]
  Upstream(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The roster/plan store failed.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn upstream(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Upstream(Box::new(e))
  }

  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
