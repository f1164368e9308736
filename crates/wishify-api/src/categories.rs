//! Handler for `GET /categories`.
//!
//! The registry is global: the same categories back every list.

use axum::{Json, extract::State};
use wishify_core::{category::Category, store::KeyValueStore};

use crate::{ApiState, error::ApiError};

/// `GET /categories` — seeds the defaults on first call.
pub async fn list<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<Category>>, ApiError>
where
  S: KeyValueStore,
{
  Ok(Json(state.wishlist.categories().await?))
}
