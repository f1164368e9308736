//! JSON REST API for Wishify.
//!
//! Exposes an axum [`Router`] backed by a [`Wishlist`] over any
//! [`KeyValueStore`]. Every route takes an optional `?list=<token>` query
//! parameter; its presence selects the shared view of that token's list.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", wishify_api::api_router(wishlist, share_base))
//! ```

pub mod categories;
pub mod error;
pub mod items;
pub mod share;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use url::Url;
use wishify_core::{share::ShareScope, store::KeyValueStore, wishlist::Wishlist};

pub use error::ApiError;

// ─── State ────────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub wishlist:   Arc<Wishlist<S>>,
  /// Page URL that share links are built from.
  pub share_base: Arc<Url>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      wishlist:   self.wishlist.clone(),
      share_base: self.share_base.clone(),
    }
  }
}

/// The `?list=<token>` parameter accepted by every route.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeParams {
  pub list: Option<String>,
}

impl ScopeParams {
  pub fn resolve(&self) -> Result<ShareScope, ApiError> {
    Ok(ShareScope::from_token(self.list.as_deref())?)
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(wishlist: Arc<Wishlist<S>>, share_base: Url) -> Router<()>
where
  S: KeyValueStore + 'static,
{
  let state = ApiState {
    wishlist,
    share_base: Arc::new(share_base),
  };

  Router::new()
    // Items
    .route("/items", get(items::list::<S>).post(items::create::<S>))
    .route(
      "/items/{id}",
      get(items::get_one::<S>)
        .put(items::update::<S>)
        .delete(items::delete::<S>),
    )
    .route("/items/{id}/reserve", post(items::reserve::<S>))
    .route("/items/{id}/unreserve", post(items::unreserve::<S>))
    // Categories
    .route("/categories", get(categories::list::<S>))
    // Sharing
    .route("/scope", get(share::scope))
    .route("/share", post(share::create_link::<S>))
    .with_state(state)
}
