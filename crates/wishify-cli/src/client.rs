//! Async HTTP client wrapping the Wishify JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use wishify_core::{
  category::Category,
  derive::ListQuery,
  item::{ItemDraft, WishlistItem},
  share::{ShareScope, ShareToken},
};

/// Connection settings for the Wishify API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub scope:    ShareScope,
}

/// Body of `POST /api/share`.
#[derive(Debug, Deserialize)]
pub struct ShareLink {
  pub token: ShareToken,
  pub link:  String,
}

/// Async HTTP client for the Wishify JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  pub fn scope(&self) -> &ShareScope { &self.config.scope }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  /// Attach `?list=<token>` when acting on a shared list.
  fn scoped(&self, req: RequestBuilder) -> RequestBuilder {
    match self.config.scope.token() {
      Some(token) => req.query(&[("list", token.as_str())]),
      None => req,
    }
  }

  /// Turn a non-2xx response into an error carrying the server's message.
  async fn check(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = resp
      .json::<serde_json::Value>()
      .await
      .ok()
      .and_then(|v| v["error"].as_str().map(str::to_owned))
      .unwrap_or_else(|| status.to_string());
    Err(anyhow!("{what} → {status}: {message}"))
  }

  // ── Items ─────────────────────────────────────────────────────────────────

  /// `GET /api/items`
  pub async fn list_items(&self, query: &ListQuery) -> Result<Vec<WishlistItem>> {
    let mut params = vec![("sort", query.sort.to_string())];
    if let Some(c) = &query.category {
      params.push(("category", c.clone()));
    }
    if let Some(s) = &query.search {
      params.push(("search", s.clone()));
    }

    let resp = self
      .scoped(self.client.get(self.url("/items")))
      .query(&params)
      .send()
      .await
      .context("GET /items failed")?;
    Self::check(resp, "GET /items")
      .await?
      .json()
      .await
      .context("deserialising items")
  }

  /// `GET /api/items/:id`
  pub async fn get_item(&self, id: Uuid) -> Result<WishlistItem> {
    let resp = self
      .scoped(self.client.get(self.url(&format!("/items/{id}"))))
      .send()
      .await
      .context("GET /items/:id failed")?;
    Self::check(resp, "GET /items/:id")
      .await?
      .json()
      .await
      .context("deserialising item")
  }

  /// `POST /api/items`
  pub async fn create_item(&self, draft: &ItemDraft) -> Result<WishlistItem> {
    let resp = self
      .scoped(self.client.post(self.url("/items")))
      .json(draft)
      .send()
      .await
      .context("POST /items failed")?;
    Self::check(resp, "POST /items")
      .await?
      .json()
      .await
      .context("deserialising created item")
  }

  /// `PUT /api/items/:id`
  pub async fn update_item(&self, id: Uuid, draft: &ItemDraft) -> Result<()> {
    let resp = self
      .scoped(self.client.put(self.url(&format!("/items/{id}"))))
      .json(draft)
      .send()
      .await
      .context("PUT /items/:id failed")?;
    Self::check(resp, "PUT /items/:id").await?;
    Ok(())
  }

  /// `DELETE /api/items/:id`
  pub async fn delete_item(&self, id: Uuid) -> Result<()> {
    let resp = self
      .scoped(self.client.delete(self.url(&format!("/items/{id}"))))
      .send()
      .await
      .context("DELETE /items/:id failed")?;
    Self::check(resp, "DELETE /items/:id").await?;
    Ok(())
  }

  /// `POST /api/items/:id/reserve`
  pub async fn reserve(&self, id: Uuid, name: &str) -> Result<()> {
    let resp = self
      .scoped(self.client.post(self.url(&format!("/items/{id}/reserve"))))
      .json(&json!({ "name": name }))
      .send()
      .await
      .context("POST /items/:id/reserve failed")?;
    Self::check(resp, "POST /items/:id/reserve").await?;
    Ok(())
  }

  /// `POST /api/items/:id/unreserve`
  pub async fn unreserve(&self, id: Uuid) -> Result<()> {
    let resp = self
      .scoped(self.client.post(self.url(&format!("/items/{id}/unreserve"))))
      .send()
      .await
      .context("POST /items/:id/unreserve failed")?;
    Self::check(resp, "POST /items/:id/unreserve").await?;
    Ok(())
  }

  // ── Categories & sharing ──────────────────────────────────────────────────

  /// `GET /api/categories`
  pub async fn categories(&self) -> Result<Vec<Category>> {
    let resp = self
      .client
      .get(self.url("/categories"))
      .send()
      .await
      .context("GET /categories failed")?;
    Self::check(resp, "GET /categories")
      .await?
      .json()
      .await
      .context("deserialising categories")
  }

  /// `POST /api/share`
  pub async fn share(&self) -> Result<ShareLink> {
    let resp = self
      .scoped(self.client.post(self.url("/share")))
      .send()
      .await
      .context("POST /share failed")?;
    Self::check(resp, "POST /share")
      .await?
      .json()
      .await
      .context("deserialising share link")
  }
}
