//! Handlers for `/scope` and `/share`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/scope` | Who the caller is, given `?list=` |
//! | `POST` | `/share` | Owner only; returns the stable share link |

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Serialize;
use wishify_core::{
  access::{Action, authorize},
  share::{ShareToken, share_link},
  store::KeyValueStore,
};

use crate::{ApiState, ScopeParams, error::ApiError};

// ─── Scope ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ScopeResponse {
  pub shared: bool,
  pub token:  Option<ShareToken>,
  pub title:  &'static str,
}

/// `GET /scope[?list=<token>]`
pub async fn scope(Query(params): Query<ScopeParams>) -> Result<Json<ScopeResponse>, ApiError> {
  let scope = params.resolve()?;
  Ok(Json(ScopeResponse {
    shared: scope.is_shared(),
    token:  scope.token().cloned(),
    title:  scope.title(),
  }))
}

// ─── Share link ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ShareResponse {
  pub token: ShareToken,
  pub link:  String,
}

/// `POST /share` — the same token on every call.
pub async fn create_link<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ScopeParams>,
) -> Result<Json<ShareResponse>, ApiError>
where
  S: KeyValueStore,
{
  let scope = params.resolve()?;
  authorize(&scope, Action::Share, None)?;

  let token = state.wishlist.ensure_share_token().await?;
  let link = share_link(&state.share_base, &token).to_string();
  Ok(Json(ShareResponse { token, link }))
}
