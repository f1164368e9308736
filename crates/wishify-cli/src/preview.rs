//! Preview-image lookup over HTTP.
//!
//! Fetches the purchase page and reads its `og:image` meta tag. Relative image
//! paths are resolved against the final (post-redirect) page URL.

use std::{sync::LazyLock, time::Duration};

use regex::Regex;
use reqwest::Client;
use url::Url;
use wishify_core::preview::PreviewFetcher;

static META_TAG: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("meta tag pattern"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?is)([a-z][a-z0-9:_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
    .expect("attribute pattern")
});

/// Upper bound on how much of a purchase page is read.
const MAX_PAGE_BYTES: usize = 512 * 1024;

#[derive(Clone)]
pub struct HttpPreviewFetcher {
  client: Client,
}

impl HttpPreviewFetcher {
  pub fn new(timeout: Duration) -> reqwest::Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client })
  }
}

impl PreviewFetcher for HttpPreviewFetcher {
  type Error = reqwest::Error;

  async fn fetch_image(&self, purchase_link: &str) -> Result<Option<String>, Self::Error> {
    let resp = self
      .client
      .get(purchase_link)
      .send()
      .await?
      .error_for_status()?;
    let page = resp.url().clone();
    let html = read_capped(resp, MAX_PAGE_BYTES).await?;
    Ok(extract_og_image(&html).and_then(|raw| resolve(&page, &raw)))
  }
}

/// Read at most `limit` bytes of the body. Meta tags live in `<head>`, so a
/// truncated page still carries them.
async fn read_capped(mut resp: reqwest::Response, limit: usize) -> reqwest::Result<String> {
  let mut body = Vec::new();
  while body.len() < limit {
    let Some(chunk) = resp.chunk().await? else {
      break;
    };
    let room = limit - body.len();
    body.extend_from_slice(&chunk[..chunk.len().min(room)]);
  }
  Ok(String::from_utf8_lossy(&body).into_owned())
}

/// The `content` of the first `og:image` meta tag in `html`.
///
/// Attributes may appear in any order, and `name="og:image"` is accepted
/// alongside `property="og:image"`.
pub fn extract_og_image(html: &str) -> Option<String> {
  META_TAG.find_iter(html).find_map(|tag| {
    let mut is_og_image = false;
    let mut content = None;
    for cap in ATTRIBUTE.captures_iter(tag.as_str()) {
      let value = cap
        .get(2)
        .or_else(|| cap.get(3))
        .or_else(|| cap.get(4))
        .map_or("", |m| m.as_str());
      match cap[1].to_ascii_lowercase().as_str() {
        "property" | "name" if value.trim().eq_ignore_ascii_case("og:image") => {
          is_og_image = true;
        }
        "content" => content = Some(value.trim()),
        _ => {}
      }
    }
    content
      .filter(|c| is_og_image && !c.is_empty())
      .map(unescape)
  })
}

fn resolve(page: &Url, raw: &str) -> Option<String> {
  page.join(raw).ok().map(String::from)
}

fn unescape(raw: &str) -> String {
  raw
    .replace("&quot;", "\"")
    .replace("&#39;", "'")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
  use axum::{Router, routing::get};
  use tokio::net::TcpListener;
  use wishify_core::preview::{ImageField, PreviewStatus, fill_image};

  use super::*;

  #[test]
  fn property_before_content() {
    let html = r#"<head><meta property="og:image" content="https://cdn.example/a.jpg"></head>"#;
    assert_eq!(extract_og_image(html).as_deref(), Some("https://cdn.example/a.jpg"));
  }

  #[test]
  fn content_before_property_and_single_quotes() {
    let html = "<META content='https://cdn.example/b.png' PROPERTY='og:image' />";
    assert_eq!(extract_og_image(html).as_deref(), Some("https://cdn.example/b.png"));
  }

  #[test]
  fn name_attribute_is_accepted() {
    let html = r#"<meta name="og:image" content="/img/c.png">"#;
    assert_eq!(extract_og_image(html).as_deref(), Some("/img/c.png"));
  }

  #[test]
  fn other_meta_tags_are_ignored() {
    let html = r#"
      <meta property="og:title" content="Headphones">
      <meta property="og:image:width" content="640">
      <meta charset="utf-8">
    "#;
    assert_eq!(extract_og_image(html), None);
    assert_eq!(extract_og_image(r#"<meta property="og:image" content="">"#), None);
  }

  #[test]
  fn entities_are_decoded() {
    let html = r#"<meta property="og:image" content="https://cdn.example/i?w=1&amp;h=2">"#;
    assert_eq!(extract_og_image(html).as_deref(), Some("https://cdn.example/i?w=1&h=2"));
  }

  #[test]
  fn relative_paths_resolve_against_page() {
    let page = Url::parse("https://shop.example/p/headphones").unwrap();
    assert_eq!(resolve(&page, "/img/x.jpg").as_deref(), Some("https://shop.example/img/x.jpg"));
    assert_eq!(
      resolve(&page, "https://cdn.example/y.jpg").as_deref(),
      Some("https://cdn.example/y.jpg")
    );
  }

  async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
  }

  #[tokio::test]
  async fn fetches_and_fills_empty_field() {
    let base = serve(Router::new().route(
      "/product",
      get(|| async {
        axum::response::Html(r#"<html><head><meta property="og:image" content="/pic.jpg"></head></html>"#)
      }),
    ))
    .await;

    let fetcher = HttpPreviewFetcher::new(Duration::from_secs(5)).unwrap();
    let field = ImageField::default();
    let status = fill_image(&field, &fetcher, &format!("{base}/product")).await;

    let expected = format!("{base}/pic.jpg");
    assert_eq!(status, PreviewStatus::Applied(expected.clone()));
    assert_eq!(field.get(), expected);
  }

  #[tokio::test]
  async fn oversized_pages_are_cut_off() {
    let head = r#"<html><head><meta property="og:image" content="/head.jpg"></head><body>"#;
    let padding = "x".repeat(MAX_PAGE_BYTES);
    let early = format!("{head}{padding}</body></html>");
    let late = format!("<html><body>{padding}<meta property=\"og:image\" content=\"/tail.jpg\"></body></html>");
    let base = serve(
      Router::new()
        .route("/early", get(move || async move { axum::response::Html(early) }))
        .route("/late", get(move || async move { axum::response::Html(late) })),
    )
    .await;

    let fetcher = HttpPreviewFetcher::new(Duration::from_secs(5)).unwrap();
    let found = fetcher.fetch_image(&format!("{base}/early")).await.unwrap();
    assert_eq!(found, Some(format!("{base}/head.jpg")));

    let missed = fetcher.fetch_image(&format!("{base}/late")).await.unwrap();
    assert_eq!(missed, None, "tag past the cap is not read");
  }

  #[tokio::test]
  async fn failed_fetch_leaves_field_empty() {
    let base = serve(Router::new()).await;

    let fetcher = HttpPreviewFetcher::new(Duration::from_secs(5)).unwrap();
    let field = ImageField::default();
    let status = fill_image(&field, &fetcher, &format!("{base}/missing")).await;

    assert_eq!(status.message(), Some("Could not fetch image from URL"));
    assert!(field.is_empty());
  }
}
