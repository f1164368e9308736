//! Display taxonomy for items.
//!
//! Categories are not user-creatable. The default set is written to storage
//! the first time the registry is read and persisted verbatim from then on.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub id:    String,
  pub name:  String,
  /// CSS hex colour, e.g. `#3B82F6`.
  pub color: String,
}

impl Category {
  pub fn new(id: &str, name: &str, color: &str) -> Self {
    Self {
      id:    id.to_owned(),
      name:  name.to_owned(),
      color: color.to_owned(),
    }
  }
}

/// `(id, name, color)` of the seeded set.
const DEFAULTS: &[(&str, &str, &str)] = &[
  ("electronics", "Electronics", "#3B82F6"),
  ("clothing", "Clothing", "#F97316"),
  ("books", "Books", "#14B8A6"),
  ("home", "Home", "#8B5CF6"),
  ("beauty", "Beauty", "#EC4899"),
  ("other", "Other", "#6B7280"),
];

/// The categories seeded into an empty registry.
pub fn default_categories() -> Vec<Category> {
  DEFAULTS
    .iter()
    .map(|(id, name, color)| Category::new(id, name, color))
    .collect()
}

/// Look up a category by id. Items may reference ids that no longer exist.
pub fn find_category<'a>(categories: &'a [Category], id: &str) -> Option<&'a Category> {
  categories.iter().find(|c| c.id == id)
}
