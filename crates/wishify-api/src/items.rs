//! Handlers for `/items` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/items` | Optional `category`, `search`, `sort`; derived list |
//! | `GET`    | `/items/:id` | 404 if not found |
//! | `POST`   | `/items` | Body: [`ItemDraft`]; returns 201 + stored item |
//! | `PUT`    | `/items/:id` | Body: [`ItemDraft`]; 204 |
//! | `DELETE` | `/items/:id` | 204 |
//! | `POST`   | `/items/:id/reserve` | Body: `{"name":"..."}`; 204 |
//! | `POST`   | `/items/:id/unreserve` | 204 |
//!
//! Writes against an id that does not exist succeed without effect. Access
//! checks run against the stored item inside the write, so two requests
//! racing for one item cannot both pass.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use wishify_core::{
  access::{Action, authorize},
  derive::{ListQuery, SortOption, derive},
  item::{ItemDraft, ReserverName, WishlistItem},
  store::KeyValueStore,
};

use crate::{ApiState, ScopeParams, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub list:     Option<String>,
  /// Keep only items in this category id.
  pub category: Option<String>,
  /// Case-insensitive match over name and description.
  pub search:   Option<String>,
  #[serde(default)]
  pub sort:     SortOption,
}

/// `GET /items[?list=..][&category=..][&search=..][&sort=..]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<WishlistItem>>, ApiError>
where
  S: KeyValueStore,
{
  let scope = ScopeParams { list: params.list }.resolve()?;
  let items = state.wishlist.list(&scope.partition()).await?;

  let query = ListQuery {
    category: params.category.filter(|c| !c.is_empty()),
    search:   params.search,
    sort:     params.sort,
  };
  Ok(Json(derive(&items, &query)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /items/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Query(scope): Query<ScopeParams>,
) -> Result<Json<WishlistItem>, ApiError>
where
  S: KeyValueStore,
{
  let scope = scope.resolve()?;
  let item = state
    .wishlist
    .get(&scope.partition(), id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("item {id} not found")))?;
  Ok(Json(item))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /items` — returns 201 + the stored [`WishlistItem`].
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Query(scope): Query<ScopeParams>,
  Json(draft): Json<ItemDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KeyValueStore,
{
  let scope = scope.resolve()?;
  authorize(&scope, Action::Create, None)?;
  draft.validate()?;

  let item = state.wishlist.create(&scope.partition(), draft).await?;
  tracing::info!(id = %item.id, name = %item.name, "item added");
  Ok((StatusCode::CREATED, Json(item)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /items/:id` — replaces the editable fields; the reservation is kept.
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Query(scope): Query<ScopeParams>,
  Json(draft): Json<ItemDraft>,
) -> Result<StatusCode, ApiError>
where
  S: KeyValueStore,
{
  let scope = scope.resolve()?;
  draft.validate()?;

  state
    .wishlist
    .revise_if(&scope.partition(), id, draft, |current| {
      authorize(&scope, Action::Edit, current)
    })
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /items/:id`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Query(scope): Query<ScopeParams>,
) -> Result<StatusCode, ApiError>
where
  S: KeyValueStore,
{
  let scope = scope.resolve()?;

  state
    .wishlist
    .delete_if(&scope.partition(), id, |current| {
      authorize(&scope, Action::Delete, current)
    })
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Reservations ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReserveBody {
  pub name: String,
}

/// `POST /items/:id/reserve` — body: `{"name":"..."}`.
pub async fn reserve<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Query(scope): Query<ScopeParams>,
  Json(body): Json<ReserveBody>,
) -> Result<StatusCode, ApiError>
where
  S: KeyValueStore,
{
  let scope = scope.resolve()?;
  let name = ReserverName::parse(&body.name)?;

  state
    .wishlist
    .reserve_if(&scope.partition(), id, &name, |current| {
      authorize(&scope, Action::Reserve, current)
    })
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /items/:id/unreserve` — silent; the reserver is not notified.
pub async fn unreserve<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Query(scope): Query<ScopeParams>,
) -> Result<StatusCode, ApiError>
where
  S: KeyValueStore,
{
  let scope = scope.resolve()?;
  authorize(&scope, Action::ClearReservation, None)?;

  state.wishlist.unreserve(&scope.partition(), id).await?;
  Ok(StatusCode::NO_CONTENT)
}
