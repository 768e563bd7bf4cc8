//! Bookmark state shared between the collection list and the detail screen.
//!
//! The collection owns a `BookmarkStore` keyed by item id. A `DetailView`
//! subscribes to the one entry it shows, flips its local flag immediately on
//! toggle, and dispatches a `BookmarkUpdate` back to the store exactly once.
//! List rows always render from the store.

pub mod detail;
pub mod store;
pub mod sync;

pub use detail::DetailView;
pub use store::{BookmarkError, BookmarkStore, BookmarkUpdate, Entry};
pub use sync::toggle;
