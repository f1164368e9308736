//! The `KeyValueStore` capability and an in-memory implementation.
//!
//! All durable state lives behind this trait: one string value per key.
//! Backends (e.g. `wishify-store-sqlite`) implement it; the item store,
//! category registry, and share-token bookkeeping depend only on it.

use std::{
  collections::HashMap,
  convert::Infallible,
  future::Future,
  sync::{Mutex, PoisonError},
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Durable string-to-string mapping.
///
/// Implementations need not be transactional; callers serialise their own
/// read-modify-write cycles.
pub trait KeyValueStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value at `key`. Returns `None` if nothing was ever written.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Write `value` at `key`, replacing any previous value.
  fn set<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── Memory backend ──────────────────────────────────────────────────────────

/// A process-local store; contents vanish on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl KeyValueStore for MemoryStore {
  type Error = Infallible;

  async fn get(&self, key: &str) -> Result<Option<String>, Infallible> {
    let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(entries.get(key).cloned())
  }

  async fn set(&self, key: &str, value: String) -> Result<(), Infallible> {
    let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    entries.insert(key.to_owned(), value);
    Ok(())
  }
}
