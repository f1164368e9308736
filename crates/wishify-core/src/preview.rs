//! Link-preview image for the add/edit form.
//!
//! When a purchase link is entered and the image field is empty, an image is
//! looked up from the link in the background. The user may type an image URL
//! while that lookup is in flight; the lookup result is applied only if the
//! field is still empty when it lands. A failed lookup leaves the field empty
//! and never blocks submitting the item.

use std::{
  future::Future,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

/// Status text shown when a lookup fails.
pub const FETCH_FAILED: &str = "Could not fetch image from URL";

/// Finds a preview image for a purchase link.
pub trait PreviewFetcher: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// `Ok(None)` when the page was reachable but advertises no image.
  fn fetch_image<'a>(
    &'a self,
    purchase_link: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;
}

// ─── Field ───────────────────────────────────────────────────────────────────

/// The image URL input, shared between user edits and an in-flight lookup.
///
/// Cloning yields another handle to the same field.
#[derive(Debug, Clone, Default)]
pub struct ImageField(Arc<Mutex<String>>);

impl ImageField {
  pub fn new(initial: impl Into<String>) -> Self { Self(Arc::new(Mutex::new(initial.into()))) }

  fn lock(&self) -> MutexGuard<'_, String> { self.0.lock().unwrap_or_else(PoisonError::into_inner) }

  pub fn get(&self) -> String { self.lock().clone() }

  pub fn is_empty(&self) -> bool { self.lock().trim().is_empty() }

  /// An explicit user edit; always wins.
  pub fn set(&self, value: impl Into<String>) { *self.lock() = value.into(); }

  /// Store `url` only if the field is still empty. Returns whether it did.
  pub fn fill_if_empty(&self, url: &str) -> bool {
    let mut value = self.lock();
    if !value.trim().is_empty() {
      return false;
    }
    *value = url.to_owned();
    true
  }
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

/// Outcome of [`fill_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewStatus {
  /// The lookup found an image and the field took it.
  Applied(String),
  /// No lookup was needed, or the user filled the field first.
  Skipped,
  /// The page has no preview image.
  NotFound,
  /// The lookup failed; the message is suitable for display.
  Failed(&'static str),
}

impl PreviewStatus {
  /// Message for the form's status line, if any.
  pub fn message(&self) -> Option<&'static str> {
    match self {
      PreviewStatus::Failed(msg) => Some(msg),
      _ => None,
    }
  }
}

/// Look up a preview image for `purchase_link` and apply it to `field`
/// unless the field was filled in the meantime.
pub async fn fill_image<F: PreviewFetcher>(
  field: &ImageField,
  fetcher: &F,
  purchase_link: &str,
) -> PreviewStatus {
  let link = purchase_link.trim();
  if link.is_empty() || !field.is_empty() {
    return PreviewStatus::Skipped;
  }

  match fetcher.fetch_image(link).await {
    Ok(Some(url)) if field.fill_if_empty(&url) => PreviewStatus::Applied(url),
    Ok(Some(_)) => {
      tracing::debug!(link, "image field edited during lookup; dropping result");
      PreviewStatus::Skipped
    }
    Ok(None) => PreviewStatus::NotFound,
    Err(e) => {
      tracing::warn!(link, error = %e, "preview image lookup failed");
      PreviewStatus::Failed(FETCH_FAILED)
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{io, sync::Mutex as StdMutex};

  use tokio::sync::oneshot;

  use super::*;

  /// Resolves with whatever the test sends through the channel.
  struct GatedFetcher {
    gate: StdMutex<Option<oneshot::Receiver<Result<Option<String>, io::Error>>>>,
  }

  impl GatedFetcher {
    fn new() -> (Self, oneshot::Sender<Result<Option<String>, io::Error>>) {
      let (tx, rx) = oneshot::channel();
      (Self { gate: StdMutex::new(Some(rx)) }, tx)
    }
  }

  impl PreviewFetcher for GatedFetcher {
    type Error = io::Error;

    async fn fetch_image(&self, _link: &str) -> Result<Option<String>, io::Error> {
      let rx = self.gate.lock().unwrap().take().expect("fetched once");
      rx.await.unwrap_or_else(|_| Err(io::Error::other("gate dropped")))
    }
  }

  struct Fixed(Option<&'static str>);

  impl PreviewFetcher for Fixed {
    type Error = io::Error;

    async fn fetch_image(&self, _link: &str) -> Result<Option<String>, io::Error> {
      Ok(self.0.map(str::to_owned))
    }
  }

  #[tokio::test]
  async fn applies_result_to_empty_field() {
    let field = ImageField::default();
    let status = fill_image(&field, &Fixed(Some("https://cdn.example/a.jpg")), "https://shop.example/a").await;
    assert_eq!(status, PreviewStatus::Applied("https://cdn.example/a.jpg".into()));
    assert_eq!(field.get(), "https://cdn.example/a.jpg");
  }

  #[tokio::test]
  async fn user_edit_during_lookup_wins() {
    let field = ImageField::default();
    let (fetcher, gate) = GatedFetcher::new();

    let lookup = {
      let field = field.clone();
      tokio::spawn(async move { fill_image(&field, &fetcher, "https://shop.example/a").await })
    };
    tokio::task::yield_now().await;

    field.set("https://mine.example/typed.png");
    gate.send(Ok(Some("https://cdn.example/late.jpg".into()))).unwrap();

    assert_eq!(lookup.await.unwrap(), PreviewStatus::Skipped);
    assert_eq!(field.get(), "https://mine.example/typed.png");
  }

  #[tokio::test]
  async fn failure_leaves_field_empty_with_message() {
    let field = ImageField::default();
    let (fetcher, gate) = GatedFetcher::new();
    gate.send(Err(io::Error::other("blocked by CORS"))).unwrap();

    let status = fill_image(&field, &fetcher, "https://shop.example/a").await;
    assert_eq!(status, PreviewStatus::Failed(FETCH_FAILED));
    assert_eq!(status.message(), Some("Could not fetch image from URL"));
    assert!(field.is_empty());
  }

  #[tokio::test]
  async fn skips_when_field_already_set_or_link_empty() {
    let field = ImageField::new("https://mine.example/x.png");
    let fetcher = Fixed(Some("https://cdn.example/other.jpg"));
    assert_eq!(fill_image(&field, &fetcher, "https://shop.example/a").await, PreviewStatus::Skipped);
    assert_eq!(field.get(), "https://mine.example/x.png");

    let empty = ImageField::default();
    assert_eq!(fill_image(&empty, &fetcher, "  ").await, PreviewStatus::Skipped);
    assert!(empty.is_empty());
  }

  #[tokio::test]
  async fn page_without_image() {
    let field = ImageField::default();
    assert_eq!(fill_image(&field, &Fixed(None), "https://shop.example/a").await, PreviewStatus::NotFound);
    assert!(field.is_empty());
  }
}
