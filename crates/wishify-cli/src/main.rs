//! `wishify` — command-line client for a Wishify server.
//!
//! # Usage
//!
//! ```
//! wishify add --name Headphones --price 99.99 --category electronics \
//!   --link https://shop.example/headphones
//! wishify list --sort price-desc
//! wishify share
//! wishify --list 'http://localhost:8080/?list=k3J_x9aQ2b' reserve <ID> --name Alice
//! ```

mod client;
mod preview;
mod render;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use preview::HttpPreviewFetcher;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use url::Url;
use uuid::Uuid;
use wishify_core::{
  access::{Action, authorize},
  derive::{ListQuery, SortOption},
  item::{ItemDraft, Priority, ReserverName},
  preview::{ImageField, PreviewStatus, fill_image},
  share::ShareScope,
};

const DEFAULT_URL: &str = "http://localhost:8080";
const PREVIEW_TIMEOUT: Duration = Duration::from_secs(10);

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "wishify", about = "Manage a Wishify wishlist from the terminal")]
struct Args {
  /// Path to a TOML config file (url, list, name).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the wishify server (default: http://localhost:8080).
  #[arg(long, env = "WISHIFY_URL")]
  url: Option<String>,

  /// Act on a shared list: a share token or a full share link.
  #[arg(long, env = "WISHIFY_LIST")]
  list: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Show the list, optionally filtered and sorted.
  List {
    /// Only items in this category id.
    #[arg(long)]
    category: Option<String>,
    /// Case-insensitive text to look for in names and descriptions.
    #[arg(long)]
    search:   Option<String>,
    /// dateAdded, price-asc, price-desc or priority.
    #[arg(long, default_value_t)]
    sort:     SortOption,
  },
  /// Show every field of one item.
  Show { id: Uuid },
  /// Add an item to your list.
  Add(AddArgs),
  /// Change fields of an item. Reserved items cannot be edited.
  Edit {
    id:     Uuid,
    #[command(flatten)]
    fields: EditArgs,
  },
  /// Remove an item. Reserved items cannot be removed.
  Delete { id: Uuid },
  /// Reserve an item on a shared list.
  Reserve {
    id:   Uuid,
    /// Your name, shown to other viewers.
    #[arg(long)]
    name: Option<String>,
  },
  /// Clear a reservation on your own list.
  Unreserve { id: Uuid },
  /// Print the share link for your list.
  Share,
  /// List the available categories.
  Categories,
}

#[derive(ClapArgs, Debug)]
struct AddArgs {
  #[arg(long)]
  name:        String,
  #[arg(long)]
  price:       f64,
  #[arg(long, default_value = "")]
  description: String,
  #[arg(long, default_value = "other")]
  category:    String,
  #[arg(long, default_value_t)]
  priority:    Priority,
  /// Where to buy it; its preview image is used when --image is not given.
  #[arg(long, default_value = "")]
  link:        String,
  #[arg(long, default_value = "")]
  image:       String,
}

#[derive(ClapArgs, Debug)]
struct EditArgs {
  #[arg(long)]
  name:        Option<String>,
  #[arg(long)]
  price:       Option<f64>,
  #[arg(long)]
  description: Option<String>,
  #[arg(long)]
  category:    Option<String>,
  #[arg(long)]
  priority:    Option<Priority>,
  #[arg(long)]
  link:        Option<String>,
  /// Pass an empty value to clear the image.
  #[arg(long)]
  image:       Option<String>,
}

impl EditArgs {
  fn apply(self, draft: &mut ItemDraft) {
    if let Some(v) = self.name {
      draft.name = v;
    }
    if let Some(v) = self.price {
      draft.price = v;
    }
    if let Some(v) = self.description {
      draft.description = v;
    }
    if let Some(v) = self.category {
      draft.category = v;
    }
    if let Some(v) = self.priority {
      draft.priority = v;
    }
    if let Some(v) = self.link {
      draft.purchase_link = v;
    }
    if let Some(v) = self.image {
      draft.image_url = v;
    }
  }
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  url:  String,
  /// Share token or link to use when `--list` is not given.
  #[serde(default)]
  list: String,
  /// Default reserver name for `reserve`.
  #[serde(default)]
  name: String,
}

fn non_empty(s: &str) -> Option<String> { (!s.trim().is_empty()).then(|| s.to_string()) }

/// Resolve `--list`: either a bare token or a link carrying `?list=`.
fn parse_scope(raw: Option<&str>) -> Result<ShareScope> {
  let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
    return Ok(ShareScope::Owner);
  };
  let scope = match Url::parse(raw) {
    Ok(url) if matches!(url.scheme(), "http" | "https") => ShareScope::from_url(&url)?,
    _ => ShareScope::from_token(Some(raw))?,
  };
  Ok(scope)
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let list = args.list.or_else(|| non_empty(&file_cfg.list));
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| non_empty(&file_cfg.url))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
    scope:    parse_scope(list.as_deref())?,
  };
  tracing::debug!(?api_config, "resolved client config");

  let client = ApiClient::new(api_config)?;
  run(&client, args.command, &file_cfg).await
}

async fn run(client: &ApiClient, command: Command, file_cfg: &ConfigFile) -> Result<()> {
  match command {
    Command::List { category, search, sort } => {
      let query = ListQuery {
        category: category.filter(|c| !c.is_empty()),
        search,
        sort,
      };
      let items = client.list_items(&query).await?;
      let categories = client.categories().await?;
      print!("{}", render::item_table(&items, &categories, client.scope(), sort));
    }

    Command::Show { id } => {
      let item = client.get_item(id).await?;
      let categories = client.categories().await?;
      print!("{}", render::item_detail(&item, &categories));
    }

    Command::Add(add) => {
      authorize(client.scope(), Action::Create, None)?;
      let mut draft = ItemDraft {
        name:          add.name,
        description:   add.description,
        price:         add.price,
        image_url:     String::new(),
        purchase_link: add.link,
        category:      add.category,
        priority:      add.priority,
      };
      draft.validate()?;
      draft.image_url = preview_image(&add.image, &draft.purchase_link).await?;

      let item = client.create_item(&draft).await?;
      println!("Added {} ({})", item.name, item.id);
    }

    Command::Edit { id, fields } => {
      let current = client.get_item(id).await?;
      authorize(client.scope(), Action::Edit, Some(&current))?;

      let mut draft = ItemDraft::from(&current);
      fields.apply(&mut draft);
      draft.validate()?;
      if draft.purchase_link != current.purchase_link {
        draft.image_url = preview_image(&draft.image_url, &draft.purchase_link).await?;
      }

      client.update_item(id, &draft).await?;
      println!("Updated {}", draft.name);
    }

    Command::Delete { id } => {
      client.delete_item(id).await?;
      println!("Deleted {id}");
    }

    Command::Reserve { id, name } => {
      let raw = name.or_else(|| non_empty(&file_cfg.name)).unwrap_or_default();
      let name = ReserverName::parse(&raw)?;
      client.reserve(id, name.as_str()).await?;
      println!("Reserved for {}", name.as_str());
    }

    Command::Unreserve { id } => {
      client.unreserve(id).await?;
      println!("Reservation cleared");
    }

    Command::Share => {
      let link = client.share().await?;
      println!("{}", link.link);
      tracing::debug!(token = %link.token, "share token");
    }

    Command::Categories => {
      print!("{}", render::category_table(&client.categories().await?));
    }
  }
  Ok(())
}

/// The image URL to submit: `current` when set, otherwise the link's preview
/// image. A failed lookup is reported but never stops the submit.
async fn preview_image(current: &str, link: &str) -> Result<String> {
  let field = ImageField::new(current);
  let fetcher = HttpPreviewFetcher::new(PREVIEW_TIMEOUT).context("building preview client")?;
  match fill_image(&field, &fetcher, link).await {
    PreviewStatus::Applied(url) => eprintln!("Using preview image {url}"),
    status => {
      if let Some(msg) = status.message() {
        eprintln!("{msg}");
      }
    }
  }
  Ok(field.get())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scope_from_token_or_link() {
    assert_eq!(parse_scope(None).unwrap(), ShareScope::Owner);
    assert_eq!(parse_scope(Some("  ")).unwrap(), ShareScope::Owner);

    let scope = parse_scope(Some("k3J_x9aQ2b")).unwrap();
    assert_eq!(scope.token().unwrap().as_str(), "k3J_x9aQ2b");

    let scope = parse_scope(Some("https://wish.example/?list=abc-123&x=1")).unwrap();
    assert_eq!(scope.token().unwrap().as_str(), "abc-123");

    assert_eq!(parse_scope(Some("https://wish.example/")).unwrap(), ShareScope::Owner);
    assert!(parse_scope(Some("not a token")).is_err());
  }

  #[test]
  fn config_file_fields_are_optional() {
    let cfg: ConfigFile = toml::from_str("url = \"http://wish.local\"").unwrap();
    assert_eq!(cfg.url, "http://wish.local");
    assert!(cfg.list.is_empty());
    assert_eq!(non_empty(&cfg.name), None);
  }

  #[test]
  fn edit_only_touches_given_fields() {
    let mut draft = ItemDraft {
      name: "Lamp".into(),
      price: 40.0,
      category: "home".into(),
      ..Default::default()
    };
    let args = Args::parse_from(["wishify", "edit", &Uuid::nil().to_string(), "--price", "35", "--image", ""]);
    let Command::Edit { fields, .. } = args.command else {
      panic!("expected edit");
    };
    fields.apply(&mut draft);

    assert_eq!(draft.name, "Lamp");
    assert_eq!(draft.price, 35.0);
    assert_eq!(draft.category, "home");
    assert_eq!(draft.image_url, "");
  }

  #[test]
  fn add_parses_sort_and_priority_values() {
    let args = Args::parse_from(["wishify", "add", "--name", "Pen", "--price", "2", "--priority", "HIGH"]);
    let Command::Add(add) = args.command else {
      panic!("expected add");
    };
    assert_eq!(add.priority, Priority::High);
    assert_eq!(add.category, "other");

    let args = Args::parse_from(["wishify", "list", "--sort", "price-asc"]);
    assert!(matches!(args.command, Command::List { sort: SortOption::PriceAsc, .. }));
  }
}
