//! Integration tests for `SqliteStore` against in-memory and on-disk databases.

use wishify_core::{
  item::{ItemDraft, Priority, ReserverName},
  share::{Partition, ShareToken},
  store::KeyValueStore,
  wishlist::Wishlist,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn lamp() -> ItemDraft {
  ItemDraft {
    name:          "Desk lamp".into(),
    description:   "Warm light, brass".into(),
    price:         45.5,
    purchase_link: "https://shop.example/lamp".into(),
    category:      "home".into(),
    priority:      Priority::Medium,
    ..Default::default()
  }
}

// ─── Raw key-value ───────────────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_key_returns_none() {
  let s = store().await;
  assert!(s.get("nothing-here").await.unwrap().is_none());
}

#[tokio::test]
async fn set_then_get() {
  let s = store().await;
  s.set("k", "v1".into()).await.unwrap();
  assert_eq!(s.get("k").await.unwrap().as_deref(), Some("v1"));
}

#[tokio::test]
async fn set_overwrites() {
  let s = store().await;
  s.set("k", "v1".into()).await.unwrap();
  s.set("k", "v2".into()).await.unwrap();
  assert_eq!(s.get("k").await.unwrap().as_deref(), Some("v2"));
  assert_eq!(s.keys().await.unwrap(), ["k"]);
}

// ─── Through the wishlist ────────────────────────────────────────────────────

#[tokio::test]
async fn wishlist_layout_in_sqlite() {
  let w = Wishlist::new(store().await);
  let shared = Partition::shared(ShareToken::parse("abc123").unwrap());

  w.create(&Partition::owner(), lamp()).await.unwrap();
  w.create(&shared, lamp()).await.unwrap();
  w.categories().await.unwrap();
  w.ensure_share_token().await.unwrap();

  assert_eq!(
    w.backend().keys().await.unwrap(),
    [
      "wishlist-categories",
      "wishlist-items",
      "wishlist-items-abc123",
      "wishlist-share-id",
    ]
  );
}

#[tokio::test]
async fn reservation_round_trip() {
  let w = Wishlist::new(store().await);
  let p = Partition::shared(ShareToken::parse("guest").unwrap());
  let item = w.create(&p, lamp()).await.unwrap();

  w.reserve(&p, item.id, &ReserverName::parse("Alice").unwrap())
    .await
    .unwrap();
  let stored = w.get(&p, item.id).await.unwrap().unwrap();
  assert_eq!(stored.reserved_by.as_deref(), Some("Alice"));

  w.unreserve(&p, item.id).await.unwrap();
  let stored = w.get(&p, item.id).await.unwrap().unwrap();
  assert!(!stored.reserved);
  assert!(stored.reserved_by.is_none());
}

#[tokio::test]
async fn survives_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("wishify.db");

  let (item, token) = {
    let w = Wishlist::new(SqliteStore::open(&path).await.unwrap());
    let item = w.create(&Partition::owner(), lamp()).await.unwrap();
    let token = w.ensure_share_token().await.unwrap();
    (item, token)
  };

  let w = Wishlist::new(SqliteStore::open(&path).await.unwrap());
  assert_eq!(w.list(&Partition::owner()).await.unwrap(), vec![item]);
  assert_eq!(w.ensure_share_token().await.unwrap(), token);
}
