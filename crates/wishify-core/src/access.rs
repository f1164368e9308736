//! What each side of a share link may do.
//!
//! The owner curates the list and can clear reservations; a viewer of a
//! shared link can only reserve. Reserved items are frozen for everyone
//! except through an explicit clear. Actions against an item that does not
//! exist are always allowed here and become no-ops in the store.

use strum::Display;

use crate::{Error, Result, item::WishlistItem, share::ShareScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
  Create,
  Edit,
  Delete,
  Reserve,
  ClearReservation,
  Share,
}

/// Check that `scope` may perform `action` on `target`.
pub fn authorize(scope: &ShareScope, action: Action, target: Option<&WishlistItem>) -> Result<()> {
  let reserved = target.is_some_and(|i| i.reserved);
  let deny = |reason: &'static str| -> Result<()> { Err(Error::NotPermitted { action, reason }) };

  match action {
    Action::Reserve if !scope.is_shared() => deny("reserve from a shared link"),
    _ if action != Action::Reserve && scope.is_shared() => deny("only the list owner can do this"),
    Action::Edit | Action::Delete if reserved => deny("item is reserved"),
    Action::Reserve if reserved => deny("item is already reserved"),
    _ => Ok(()),
  }
}
