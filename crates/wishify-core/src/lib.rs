//! Core types and trait definitions for Wishify.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Persistence goes through the [`store::KeyValueStore`] capability; every
//! other crate in the workspace depends on this one.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod category;
pub mod derive;
pub mod error;
pub mod item;
pub mod preview;
pub mod share;
pub mod store;
pub mod wishlist;

pub use error::{Error, Result};
