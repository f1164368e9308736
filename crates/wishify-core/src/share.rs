//! Share scope — which list a session is looking at, and as whom.
//!
//! The `list` query parameter of the current URL is the only signal: present
//! means a shared (reserving) view of that token's partition, absent means the
//! owner's own list.

use std::fmt;

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Query parameter carrying the share token.
pub const SHARE_PARAM: &str = "list";

/// Storage key of the owner's collection; shared partitions append `-<token>`.
pub const ITEMS_KEY: &str = "wishlist-items";

const TOKEN_LEN: usize = 10;
const MAX_TOKEN_LEN: usize = 64;

/// URL-safe 64-symbol alphabet, so `byte & 63` indexes it without bias.
const ALPHABET: &[u8; 64] =
  b"useandom-26T198340PX75pxJACKVERYMINDBUSHWOLF_GQZbfghjklqvwyzrict";

// ─── Token ───────────────────────────────────────────────────────────────────

/// Opaque identifier embedded in a share link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShareToken(String);

impl ShareToken {
  pub fn parse(raw: &str) -> Result<Self> {
    let valid = !raw.is_empty()
      && raw.len() <= MAX_TOKEN_LEN
      && raw
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if !valid {
      return Err(Error::InvalidShareToken(raw.to_owned()));
    }
    Ok(Self(raw.to_owned()))
  }

  /// A fresh random token drawn from the OS RNG.
  pub fn generate() -> Self {
    let mut bytes = [0u8; TOKEN_LEN];
    OsRng.fill_bytes(&mut bytes);
    let token = bytes
      .iter()
      .map(|b| char::from(ALPHABET[usize::from(b & 63)]))
      .collect();
    Self(token)
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ShareToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for ShareToken {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<ShareToken> for String {
  fn from(t: ShareToken) -> Self { t.0 }
}

// ─── Partition ───────────────────────────────────────────────────────────────

/// Storage scope of one distinct wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition(Option<ShareToken>);

impl Partition {
  pub fn owner() -> Self { Self(None) }

  pub fn shared(token: ShareToken) -> Self { Self(Some(token)) }

  pub fn storage_key(&self) -> String {
    match &self.0 {
      Some(token) => format!("{ITEMS_KEY}-{token}"),
      None => ITEMS_KEY.to_owned(),
    }
  }
}

// ─── Scope ───────────────────────────────────────────────────────────────────

/// Whether the session is the owner or a viewer of a shared link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareScope {
  Owner,
  Shared(ShareToken),
}

impl ShareScope {
  /// Resolve from the raw `list` parameter. Presence alone selects the
  /// shared view, so a present but blank value is an invalid token rather
  /// than the owner's list.
  pub fn from_token(raw: Option<&str>) -> Result<Self> {
    match raw {
      Some(t) => Ok(Self::Shared(ShareToken::parse(t.trim())?)),
      None => Ok(Self::Owner),
    }
  }

  /// Resolve from a full page URL.
  pub fn from_url(url: &Url) -> Result<Self> {
    let token = url
      .query_pairs()
      .find(|(k, _)| k == SHARE_PARAM)
      .map(|(_, v)| v.into_owned());
    Self::from_token(token.as_deref())
  }

  pub fn is_shared(&self) -> bool { matches!(self, Self::Shared(_)) }

  pub fn token(&self) -> Option<&ShareToken> {
    match self {
      Self::Shared(t) => Some(t),
      Self::Owner => None,
    }
  }

  pub fn partition(&self) -> Partition { Partition(self.token().cloned()) }

  pub fn title(&self) -> &'static str {
    if self.is_shared() { "Shared Wishlist" } else { "My Wishlist" }
  }
}

/// `base` with its `list` parameter set to `token`; other parameters are kept.
pub fn share_link(base: &Url, token: &ShareToken) -> Url {
  let kept: Vec<(String, String)> = base
    .query_pairs()
    .filter(|(k, _)| k != SHARE_PARAM)
    .map(|(k, v)| (k.into_owned(), v.into_owned()))
    .collect();

  let mut link = base.clone();
  link.set_query(None);
  {
    let mut pairs = link.query_pairs_mut();
    for (k, v) in &kept {
      pairs.append_pair(k, v);
    }
    pairs.append_pair(SHARE_PARAM, token.as_str());
  }
  link
}
