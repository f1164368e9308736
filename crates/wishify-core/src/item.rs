//! Wishlist items — the unit stored in every partition.
//!
//! Field names serialise in camelCase so that a persisted collection is a
//! plain JSON array of item objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Priority ────────────────────────────────────────────────────────────────

/// How much the owner wants an item.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Priority {
  Low,
  #[default]
  Medium,
  High,
}

impl Priority {
  /// Sort rank; lower ranks come first when sorting by priority.
  pub fn rank(self) -> u8 {
    match self {
      Priority::High => 0,
      Priority::Medium => 1,
      Priority::Low => 2,
    }
  }
}

// ─── Item ────────────────────────────────────────────────────────────────────

/// A single desired gift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
  pub id:            Uuid,
  pub name:          String,
  #[serde(default)]
  pub description:   String,
  pub price:         f64,
  #[serde(default)]
  pub image_url:     String,
  #[serde(default)]
  pub purchase_link: String,
  /// Category id; may name a category that does not exist.
  #[serde(default)]
  pub category:      String,
  #[serde(default)]
  pub priority:      Priority,
  #[serde(default)]
  pub reserved:      bool,
  /// Only meaningful while `reserved` is true.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reserved_by:   Option<String>,
  pub date_added:    DateTime<Utc>,
}

impl WishlistItem {
  /// Build a fresh, unreserved item from a draft.
  pub fn from_draft(id: Uuid, date_added: DateTime<Utc>, draft: ItemDraft) -> Self {
    Self {
      id,
      name: draft.name,
      description: draft.description,
      price: draft.price,
      image_url: draft.image_url,
      purchase_link: draft.purchase_link,
      category: draft.category,
      priority: draft.priority,
      reserved: false,
      reserved_by: None,
      date_added,
    }
  }

  /// Apply an edit form to this item. Identity, creation time, and the
  /// reservation are carried over untouched.
  pub fn revise(&self, draft: ItemDraft) -> Self {
    Self {
      reserved: self.reserved,
      reserved_by: self.reserved_by.clone(),
      ..Self::from_draft(self.id, self.date_added, draft)
    }
  }

  /// Mark the item reserved by `by`.
  pub fn reserve(&mut self, by: &ReserverName) {
    self.reserved = true;
    self.reserved_by = Some(by.as_str().to_owned());
  }

  /// Clear both reservation fields together.
  pub fn clear_reservation(&mut self) {
    self.reserved = false;
    self.reserved_by = None;
  }

  /// Drop a dangling `reserved_by` left on an unreserved item.
  pub(crate) fn normalize_reservation(&mut self) {
    if !self.reserved {
      self.reserved_by = None;
    }
  }

  /// Case-insensitive substring match over name and description.
  /// `needle` must already be lowercase.
  pub fn matches_lowercase(&self, needle: &str) -> bool {
    self.name.to_lowercase().contains(needle)
      || self.description.to_lowercase().contains(needle)
  }
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// The caller-supplied part of an item, as submitted by the add/edit form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
  pub name:          String,
  #[serde(default)]
  pub description:   String,
  pub price:         f64,
  #[serde(default)]
  pub image_url:     String,
  #[serde(default)]
  pub purchase_link: String,
  #[serde(default)]
  pub category:      String,
  #[serde(default)]
  pub priority:      Priority,
}

impl ItemDraft {
  /// Reject drafts the form would not have submitted.
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::EmptyName);
    }
    if !self.price.is_finite() || self.price < 0.0 {
      return Err(Error::InvalidPrice(self.price));
    }
    Ok(())
  }
}

impl From<&WishlistItem> for ItemDraft {
  fn from(item: &WishlistItem) -> Self {
    Self {
      name:          item.name.clone(),
      description:   item.description.clone(),
      price:         item.price,
      image_url:     item.image_url.clone(),
      purchase_link: item.purchase_link.clone(),
      category:      item.category.clone(),
      priority:      item.priority,
    }
  }
}

// ─── Reserver ────────────────────────────────────────────────────────────────

/// Display name of whoever reserves an item. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserverName(String);

impl ReserverName {
  pub fn parse(raw: &str) -> Result<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return Err(Error::EmptyReserverName);
    }
    Ok(Self(trimmed.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}
