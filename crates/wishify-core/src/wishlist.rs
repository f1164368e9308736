//! [`Wishlist`] — the persistent item store and category registry.
//!
//! Each partition's items live as one JSON array under the partition's
//! storage key. Every mutation reads the whole collection, changes it, and
//! writes it back. Those cycles are serialised per storage key so concurrent
//! requests against the same list cannot lose each other's writes; separate
//! processes sharing one backend are not coordinated.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
  Error, Result,
  category::{Category, default_categories},
  item::{ItemDraft, ReserverName, WishlistItem},
  share::{Partition, ShareToken},
  store::KeyValueStore,
};

/// Storage key of the shared category registry.
pub const CATEGORIES_KEY: &str = "wishlist-categories";

/// Storage key of the owner's share token.
pub const SHARE_ID_KEY: &str = "wishlist-share-id";

// ─── Key locks ───────────────────────────────────────────────────────────────

/// One async mutex per storage key, created on first use and dropped once no
/// task holds or waits on it.
#[derive(Default)]
struct KeyLocks {
  locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyLocks {
  fn map(&self) -> MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
    self.locks.lock().unwrap_or_else(PoisonError::into_inner)
  }

  async fn acquire(&self, key: &str) -> KeyGuard<'_> {
    // Built before waiting so a cancelled waiter still prunes the entry.
    let mut held = KeyGuard {
      locks: self,
      key:   key.to_owned(),
      guard: None,
    };
    let lock = self.map().entry(key.to_owned()).or_default().clone();
    held.guard = Some(lock.lock_owned().await);
    held
  }

  #[cfg(test)]
  fn len(&self) -> usize { self.map().len() }
}

/// Holds a key's lock; removes the key's entry on drop if nobody else wants it.
struct KeyGuard<'a> {
  locks: &'a KeyLocks,
  key:   String,
  guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
  fn drop(&mut self) {
    // Release first so our own handle no longer counts.
    self.guard.take();
    let mut map = self.locks.map();
    // Clones are only made under the map lock, so a count of one means no
    // holder and no waiter.
    if map.get(&self.key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
      map.remove(&self.key);
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Wishlist items, categories, and the share token over a [`KeyValueStore`].
pub struct Wishlist<S> {
  kv:    S,
  locks: KeyLocks,
}

impl<S: KeyValueStore> Wishlist<S> {
  pub fn new(kv: S) -> Self {
    Self {
      kv,
      locks: KeyLocks::default(),
    }
  }

  /// The underlying key-value backend.
  pub fn backend(&self) -> &S { &self.kv }

  // ── Items: reads ──────────────────────────────────────────────────────────

  /// Every item in `partition`, in insertion order. Missing or unreadable
  /// data yields an empty list.
  pub async fn list(&self, partition: &Partition) -> Result<Vec<WishlistItem>> {
    self.load_or_empty(&partition.storage_key()).await
  }

  /// The item with `id`, if present.
  pub async fn get(&self, partition: &Partition, id: Uuid) -> Result<Option<WishlistItem>> {
    let items = self.list(partition).await?;
    Ok(items.into_iter().find(|i| i.id == id))
  }

  // ── Items: writes ─────────────────────────────────────────────────────────

  /// Store a new item built from `draft` and return it.
  pub async fn create(&self, partition: &Partition, draft: ItemDraft) -> Result<WishlistItem> {
    let key = partition.storage_key();
    let _guard = self.locks.acquire(&key).await;

    let mut items: Vec<WishlistItem> = self.load_or_empty(&key).await?;
    let mut id = Uuid::new_v4();
    while items.iter().any(|i| i.id == id) {
      id = Uuid::new_v4();
    }

    let item = WishlistItem::from_draft(id, Utc::now(), draft);
    items.push(item.clone());
    self.save(&key, &items).await?;

    tracing::debug!(%id, %key, "created wishlist item");
    Ok(item)
  }

  /// Replace the stored item whose id matches `item.id`. The stored id and
  /// `date_added` win over whatever `item` carries. No-op if absent.
  pub async fn update(&self, partition: &Partition, mut item: WishlistItem) -> Result<()> {
    item.normalize_reservation();
    self
      .modify(partition, item.id, allow, move |stored| {
        item.date_added = stored.date_added;
        *stored = item;
      })
      .await
  }

  /// Apply `draft` to the item with `id` via [`WishlistItem::revise`].
  ///
  /// `check` sees the stored item (or `None`) under the partition lock; an
  /// error from it aborts the edit and is returned.
  pub async fn revise_if(
    &self,
    partition: &Partition,
    id: Uuid,
    draft: ItemDraft,
    check: impl FnOnce(Option<&WishlistItem>) -> Result<()>,
  ) -> Result<()> {
    self
      .modify(partition, id, check, move |stored| *stored = stored.revise(draft))
      .await
  }

  /// Remove the item with `id`. No-op if absent.
  pub async fn delete(&self, partition: &Partition, id: Uuid) -> Result<()> {
    self.delete_if(partition, id, allow).await
  }

  /// [`delete`](Self::delete), gated on `check` run under the partition lock.
  pub async fn delete_if(
    &self,
    partition: &Partition,
    id: Uuid,
    check: impl FnOnce(Option<&WishlistItem>) -> Result<()>,
  ) -> Result<()> {
    self
      .with_items(partition, |items| {
        let pos = items.iter().position(|i| i.id == id);
        check(pos.map(|p| &items[p]))?;
        let Some(pos) = pos else {
          tracing::debug!(%id, "delete: no such item");
          return Ok(false);
        };
        items.remove(pos);
        Ok(true)
      })
      .await
  }

  /// Mark the item with `id` as reserved by `by`. No-op if absent.
  pub async fn reserve(&self, partition: &Partition, id: Uuid, by: &ReserverName) -> Result<()> {
    self.reserve_if(partition, id, by, allow).await
  }

  /// [`reserve`](Self::reserve), gated on `check` run under the partition
  /// lock. Two callers racing for one item are decided here, not by whoever
  /// read the item first.
  pub async fn reserve_if(
    &self,
    partition: &Partition,
    id: Uuid,
    by: &ReserverName,
    check: impl FnOnce(Option<&WishlistItem>) -> Result<()>,
  ) -> Result<()> {
    self.modify(partition, id, check, |item| item.reserve(by)).await
  }

  /// Clear the reservation on the item with `id`. No-op if absent.
  pub async fn unreserve(&self, partition: &Partition, id: Uuid) -> Result<()> {
    self
      .modify(partition, id, allow, WishlistItem::clear_reservation)
      .await
  }

  // ── Categories ────────────────────────────────────────────────────────────

  /// The category registry, seeded with the defaults on first use.
  pub async fn categories(&self) -> Result<Vec<Category>> {
    self.categories_or_seed(default_categories()).await
  }

  /// The category registry, seeding `defaults` only if nothing usable is
  /// stored yet. An existing set is returned as-is, however stale.
  pub async fn categories_or_seed(&self, defaults: Vec<Category>) -> Result<Vec<Category>> {
    let _guard = self.locks.acquire(CATEGORIES_KEY).await;

    if let Some(existing) = self.load::<Vec<Category>>(CATEGORIES_KEY).await? {
      return Ok(existing);
    }

    tracing::info!(count = defaults.len(), "seeding default categories");
    self.save(CATEGORIES_KEY, &defaults).await?;
    Ok(defaults)
  }

  // ── Share token ───────────────────────────────────────────────────────────

  /// The owner's share token, generated and persisted on first call.
  pub async fn ensure_share_token(&self) -> Result<ShareToken> {
    let _guard = self.locks.acquire(SHARE_ID_KEY).await;

    let stored = self.kv.get(SHARE_ID_KEY).await.map_err(Error::store)?;
    if let Some(raw) = stored {
      match ShareToken::parse(&raw) {
        Ok(token) => return Ok(token),
        Err(e) => tracing::warn!(error = %e, "discarding unreadable share token"),
      }
    }

    let token = ShareToken::generate();
    self
      .kv
      .set(SHARE_ID_KEY, token.as_str().to_owned())
      .await
      .map_err(Error::store)?;
    tracing::info!("generated share token");
    Ok(token)
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  /// Run `f` over the partition's items under its lock; persist if it
  /// returns `Ok(true)`.
  async fn with_items(
    &self,
    partition: &Partition,
    f: impl FnOnce(&mut Vec<WishlistItem>) -> Result<bool>,
  ) -> Result<()> {
    let key = partition.storage_key();
    let _guard = self.locks.acquire(&key).await;

    let mut items: Vec<WishlistItem> = self.load_or_empty(&key).await?;
    if f(&mut items)? {
      self.save(&key, &items).await?;
    }
    Ok(())
  }

  /// Check, then apply `f` to the item with `id`, all under the partition
  /// lock. Missing ids are passed to `check` as `None` and otherwise ignored.
  async fn modify(
    &self,
    partition: &Partition,
    id: Uuid,
    check: impl FnOnce(Option<&WishlistItem>) -> Result<()>,
    f: impl FnOnce(&mut WishlistItem),
  ) -> Result<()> {
    self
      .with_items(partition, |items| {
        let item = items.iter_mut().find(|i| i.id == id);
        check(item.as_deref())?;
        let Some(item) = item else {
          tracing::debug!(%id, "no such item; ignoring");
          return Ok(false);
        };
        f(item);
        Ok(true)
      })
      .await
  }

  /// Decode the JSON at `key`. `Ok(None)` when absent or malformed.
  async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
    let Some(raw) = self.kv.get(key).await.map_err(Error::store)? else {
      return Ok(None);
    };
    match serde_json::from_str(&raw) {
      Ok(value) => Ok(Some(value)),
      Err(e) => {
        tracing::warn!(key, error = %e, "ignoring malformed stored payload");
        Ok(None)
      }
    }
  }

  async fn load_or_empty<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
    Ok(self.load(key).await?.unwrap_or_default())
  }

  async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    self.kv.set(key, json).await.map_err(Error::store)
  }

  #[cfg(test)]
  pub(crate) fn lock_entries(&self) -> usize { self.locks.len() }
}

/// A `check` that admits everything.
fn allow(_: Option<&WishlistItem>) -> Result<()> { Ok(()) }
