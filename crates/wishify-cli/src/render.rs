//! Plain-text rendering of items and categories.

use wishify_core::{
  category::{Category, find_category},
  derive::SortOption,
  item::WishlistItem,
  share::ShareScope,
};

/// `1234.5` → `$1,234.50`.
pub fn format_price(price: f64) -> String {
  let cents = (price * 100.0).round() as u64;
  let whole = (cents / 100).to_string();

  let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
  for (i, ch) in whole.chars().enumerate() {
    if i > 0 && (whole.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(ch);
  }
  format!("${grouped}.{:02}", cents % 100)
}

/// Display name of a category id; unknown ids are shown as-is.
fn category_name<'a>(categories: &'a [Category], id: &'a str) -> &'a str {
  find_category(categories, id).map_or(id, |c| c.name.as_str())
}

/// One line per item, in the order given.
pub fn item_table(
  items: &[WishlistItem],
  categories: &[Category],
  scope: &ShareScope,
  sort: SortOption,
) -> String {
  let mut out = format!("{} ({} items, {})\n", scope.title(), items.len(), sort.label());
  if items.is_empty() {
    out.push_str("  nothing here yet\n");
    return out;
  }

  for item in items {
    let status = match (&item.reserved, &item.reserved_by) {
      (false, _) => String::new(),
      (true, Some(by)) => format!("  [reserved by {by}]"),
      (true, None) => "  [reserved]".to_string(),
    };
    out.push_str(&format!(
      "  {}  {:<32} {:>12}  {:<12} {:<6}{}\n",
      item.id,
      item.name,
      format_price(item.price),
      category_name(categories, &item.category),
      item.priority,
      status,
    ));
  }
  out
}

/// Every field of a single item.
pub fn item_detail(item: &WishlistItem, categories: &[Category]) -> String {
  let mut lines = vec![
    item.name.clone(),
    format!("  id:        {}", item.id),
    format!("  price:     {}", format_price(item.price)),
    format!("  category:  {}", category_name(categories, &item.category)),
    format!("  priority:  {}", item.priority),
    format!("  added:     {}", item.date_added.format("%Y-%m-%d %H:%M")),
  ];
  let optional = [
    ("about", &item.description),
    ("link", &item.purchase_link),
    ("image", &item.image_url),
  ];
  for (label, value) in optional {
    if !value.is_empty() {
      lines.push(format!("  {:<11}{value}", format!("{label}:")));
    }
  }
  if item.reserved {
    let by = item.reserved_by.as_deref().unwrap_or("someone");
    lines.push(format!("  reserved:  yes, by {by}"));
  }

  let mut out = lines.join("\n");
  out.push('\n');
  out
}

pub fn category_table(categories: &[Category]) -> String {
  categories
    .iter()
    .map(|c| format!("  {:<12} {:<12} {}\n", c.id, c.name, c.color))
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;
  use wishify_core::{category::default_categories, item::ItemDraft};

  use super::*;

  fn item(name: &str, category: &str) -> WishlistItem {
    let draft = ItemDraft {
      name: name.into(),
      price: 12.5,
      category: category.into(),
      ..Default::default()
    };
    WishlistItem::from_draft(Uuid::new_v4(), Utc::now(), draft)
  }

  #[test]
  fn prices_are_grouped_with_two_decimals() {
    assert_eq!(format_price(0.0), "$0.00");
    assert_eq!(format_price(99.99), "$99.99");
    assert_eq!(format_price(1234.5), "$1,234.50");
    assert_eq!(format_price(1_000_000.0), "$1,000,000.00");
  }

  #[test]
  fn unknown_category_falls_back_to_id() {
    let cats = default_categories();
    let table = item_table(&[item("Lamp", "garden")], &cats, &ShareScope::Owner, SortOption::default());
    assert!(table.contains("garden"));

    let table = item_table(&[item("Novel", "books")], &cats, &ShareScope::Owner, SortOption::default());
    assert!(table.contains("Books"));
  }

  #[test]
  fn reservation_is_shown() {
    let mut lamp = item("Lamp", "home");
    lamp.reserved = true;
    lamp.reserved_by = Some("Alice".into());
    let scope = ShareScope::from_token(Some("abc")).unwrap();

    let table = item_table(&[lamp.clone()], &default_categories(), &scope, SortOption::PriceAsc);
    assert!(table.starts_with("Shared Wishlist (1 items, Price: Low to High)"));
    assert!(table.contains("[reserved by Alice]"));
    assert!(item_detail(&lamp, &[]).contains("reserved:  yes, by Alice"));
  }

  #[test]
  fn detail_lists_only_filled_fields() {
    let mut lamp = item("Lamp", "home");
    lamp.purchase_link = "https://shop.example/lamp".into();
    let detail = item_detail(&lamp, &default_categories());

    assert!(detail.starts_with("Lamp\n"));
    assert!(detail.contains("  category:  Home\n"));
    assert!(detail.contains("  link:      https://shop.example/lamp\n"));
    assert!(!detail.contains("about:"));
    assert!(!detail.contains("image:"));
    assert!(!detail.contains("reserved:"));
  }

  #[test]
  fn empty_list_says_so() {
    let table = item_table(&[], &[], &ShareScope::Owner, SortOption::Priority);
    assert!(table.contains("nothing here yet"));
  }
}
