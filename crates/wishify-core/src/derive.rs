//! The list derivation pipeline: filter by category, filter by search term,
//! then sort. Pure; the input slice is never touched.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::item::WishlistItem;

/// Display order of a derived list.
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
  EnumIter,
)]
pub enum SortOption {
  /// Newest first.
  #[default]
  #[serde(rename = "dateAdded")]
  #[strum(serialize = "dateAdded")]
  DateAdded,
  #[serde(rename = "price-asc")]
  #[strum(serialize = "price-asc")]
  PriceAsc,
  #[serde(rename = "price-desc")]
  #[strum(serialize = "price-desc")]
  PriceDesc,
  /// High, then medium, then low; insertion order within a group.
  #[serde(rename = "priority")]
  #[strum(serialize = "priority")]
  Priority,
}

impl SortOption {
  pub fn label(self) -> &'static str {
    match self {
      SortOption::DateAdded => "Newest First",
      SortOption::PriceAsc => "Price: Low to High",
      SortOption::PriceDesc => "Price: High to Low",
      SortOption::Priority => "Priority",
    }
  }
}

/// Filter and sort parameters for [`derive`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
  /// Keep only items in this category.
  pub category: Option<String>,
  /// Case-insensitive substring over name and description. Empty means no
  /// filter.
  pub search:   Option<String>,
  #[serde(default)]
  pub sort:     SortOption,
}

/// The sequence to display for `items` under `query`.
pub fn derive(items: &[WishlistItem], query: &ListQuery) -> Vec<WishlistItem> {
  let needle = query
    .search
    .as_deref()
    .filter(|s| !s.is_empty())
    .map(str::to_lowercase);

  let mut out: Vec<WishlistItem> = items
    .iter()
    .filter(|i| query.category.as_deref().is_none_or(|c| i.category == c))
    .filter(|i| needle.as_deref().is_none_or(|n| i.matches_lowercase(n)))
    .cloned()
    .collect();

  // `sort_by` is stable, which the priority ordering relies on.
  match query.sort {
    SortOption::DateAdded => out.sort_by(|a, b| b.date_added.cmp(&a.date_added)),
    SortOption::PriceAsc => out.sort_by(|a, b| a.price.total_cmp(&b.price)),
    SortOption::PriceDesc => out.sort_by(|a, b| b.price.total_cmp(&a.price)),
    SortOption::Priority => out.sort_by_key(|i| i.priority.rank()),
  }
  out
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone, Utc};
  use strum::IntoEnumIterator as _;
  use uuid::Uuid;

  use super::*;
  use crate::item::{ItemDraft, Priority};

  fn item(name: &str, category: &str, price: f64, priority: Priority, age_days: i64) -> WishlistItem {
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    WishlistItem::from_draft(
      Uuid::new_v4(),
      base - Duration::days(age_days),
      ItemDraft {
        name: name.into(),
        description: format!("{name} description"),
        price,
        category: category.into(),
        priority,
        ..Default::default()
      },
    )
  }

  fn names(items: &[WishlistItem]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
  }

  #[test]
  fn priority_sort_is_stable() {
    let items = vec![
      item("A", "x", 1.0, Priority::Low, 0),
      item("B", "x", 1.0, Priority::High, 0),
      item("C", "x", 1.0, Priority::Low, 0),
      item("D", "x", 1.0, Priority::High, 0),
    ];
    let q = ListQuery { sort: SortOption::Priority, ..Default::default() };
    assert_eq!(names(&derive(&items, &q)), ["B", "D", "A", "C"]);
  }

  #[test]
  fn priority_groups_in_rank_order() {
    let items = vec![
      item("low", "x", 1.0, Priority::Low, 0),
      item("medium", "x", 1.0, Priority::Medium, 0),
      item("high", "x", 1.0, Priority::High, 0),
    ];
    let q = ListQuery { sort: SortOption::Priority, ..Default::default() };
    assert_eq!(names(&derive(&items, &q)), ["high", "medium", "low"]);
  }

  #[test]
  fn category_then_search_compose() {
    let mut hobbit = item("The Hobbit", "books", 15.0, Priority::Medium, 10);
    hobbit.description = "by J.R.R. TOLKIEN".into();
    let silmarillion = item("Tolkien: The Silmarillion", "books", 20.0, Priority::Low, 2);
    let poster = item("Tolkien poster", "home", 5.0, Priority::Low, 1);
    let dune = item("Dune", "books", 12.0, Priority::High, 0);

    let items = vec![hobbit, silmarillion, poster, dune];
    let q = ListQuery {
      category: Some("books".into()),
      search:   Some("tolkien".into()),
      sort:     SortOption::DateAdded,
    };
    assert_eq!(
      names(&derive(&items, &q)),
      ["Tolkien: The Silmarillion", "The Hobbit"]
    );
  }

  #[test]
  fn price_sorts() {
    let items = vec![
      item("mid", "x", 50.0, Priority::Low, 0),
      item("cheap", "x", 5.0, Priority::Low, 0),
      item("dear", "x", 500.0, Priority::Low, 0),
    ];
    let asc = ListQuery { sort: SortOption::PriceAsc, ..Default::default() };
    let desc = ListQuery { sort: SortOption::PriceDesc, ..Default::default() };
    assert_eq!(names(&derive(&items, &asc)), ["cheap", "mid", "dear"]);
    assert_eq!(names(&derive(&items, &desc)), ["dear", "mid", "cheap"]);
  }

  #[test]
  fn empty_search_keeps_everything() {
    let items = vec![item("a", "x", 1.0, Priority::Low, 1), item("b", "y", 1.0, Priority::Low, 0)];
    let q = ListQuery { search: Some(String::new()), ..Default::default() };
    assert_eq!(names(&derive(&items, &q)), ["b", "a"]);
  }

  #[test]
  fn idempotent_and_leaves_input_alone() {
    let items = vec![
      item("a", "x", 3.0, Priority::Low, 3),
      item("b", "x", 1.0, Priority::High, 1),
      item("c", "y", 2.0, Priority::Medium, 2),
    ];
    let snapshot = items.clone();
    for sort in SortOption::iter() {
      let q = ListQuery { sort, ..Default::default() };
      let once = derive(&items, &q);
      let twice = derive(&once, &q);
      assert_eq!(once, twice, "{sort}");
      assert_eq!(items, snapshot);
    }
  }

  #[test]
  fn sort_option_strings() {
    assert_eq!("price-asc".parse::<SortOption>().unwrap(), SortOption::PriceAsc);
    assert_eq!(SortOption::DateAdded.to_string(), "dateAdded");
    assert_eq!(
      serde_json::to_string(&SortOption::PriceDesc).unwrap(),
      "\"price-desc\""
    );
    assert!("newest".parse::<SortOption>().is_err());
  }
}
