//! Error types for `wishify-core`.

use thiserror::Error;

use crate::access::Action;

#[derive(Debug, Error)]
pub enum Error {
  #[error("item name must not be empty")]
  EmptyName,

  #[error("price must be a non-negative number, got {0}")]
  InvalidPrice(f64),

  #[error("reserver name must not be empty")]
  EmptyReserverName,

  #[error("invalid share token: {0:?}")]
  InvalidShareToken(String),

  #[error("{action} is not permitted: {reason}")]
  NotPermitted {
    action: Action,
    reason: &'static str,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error from a [`KeyValueStore`](crate::store::KeyValueStore).
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
