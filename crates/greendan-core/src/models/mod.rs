//! Data models shared by the list and detail screens.

pub mod item;

pub use item::{BookmarkIcon, Item};
