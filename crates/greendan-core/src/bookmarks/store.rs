use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

use crate::models::Item;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookmarkError {
    #[error("Unknown item: {0}")]
    UnknownItem(String),
}

/// Message dispatched by a detail view when its toggle fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkUpdate {
    pub id: String,
    pub bookmarked: bool,
}

/// One item as held by the store, with the number of updates applied to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub item: Item,
    pub revision: u64,
}

#[derive(Default)]
struct Inner {
    /// Display order of the collection
    order: Vec<String>,
    entries: HashMap<String, watch::Sender<Entry>>,
}

/// The collection's items keyed by id. Single source of truth for bookmark
/// flags: list rows read from it and detail views subscribe to one entry.
///
/// Clone is cheap and every clone shares the same items.
#[derive(Clone, Default)]
pub struct BookmarkStore {
    inner: Arc<RwLock<Inner>>,
}

impl BookmarkStore {
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        let store = Self::default();
        for item in items {
            store.insert(item);
        }
        store
    }

    /// Add an item, or replace the item with the same id in place
    pub fn insert(&self, item: Item) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(sender) = inner.entries.get(&item.id) {
            sender.send_modify(|entry| {
                entry.item = item;
                entry.revision += 1;
            });
            return;
        }
        let id = item.id.clone();
        let (sender, _) = watch::channel(Entry { item, revision: 0 });
        inner.order.push(id.clone());
        inner.entries.insert(id, sender);
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all items in display order
    pub fn items(&self) -> Vec<Item> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .order
            .iter()
            .filter_map(|id| inner.entries.get(id))
            .map(|sender| sender.borrow().item.clone())
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Item> {
        self.entry(id).map(|entry| entry.item)
    }

    pub fn entry(&self, id: &str) -> Option<Entry> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.entries.get(id).map(|sender| sender.borrow().clone())
    }

    /// Follow changes to one item
    pub fn subscribe(&self, id: &str) -> Result<watch::Receiver<Entry>, BookmarkError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .entries
            .get(id)
            .map(|sender| sender.subscribe())
            .ok_or_else(|| BookmarkError::UnknownItem(id.to_string()))
    }

    /// Apply a bookmark update. Every dispatch counts as one revision, even
    /// when the flag already had the requested value.
    pub fn dispatch(&self, update: BookmarkUpdate) -> Result<(), BookmarkError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let sender = inner
            .entries
            .get(&update.id)
            .ok_or_else(|| BookmarkError::UnknownItem(update.id.clone()))?;

        sender.send_modify(|entry| {
            entry.item.bookmarked = update.bookmarked;
            entry.revision += 1;
        });
        debug!(id = %update.id, bookmarked = update.bookmarked, "Bookmark updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BookmarkStore {
        BookmarkStore::new([
            Item::new("41", "Moss"),
            Item::new("42", "Fern"),
            Item::new("43", "Ivy").with_bookmarked(true),
        ])
    }

    #[test]
    fn test_items_keep_insertion_order() {
        let ids: Vec<String> = sample().items().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, ["41", "42", "43"]);
    }

    #[test]
    fn test_dispatch_updates_collection_copy() {
        let store = sample();
        store
            .dispatch(BookmarkUpdate {
                id: "42".into(),
                bookmarked: true,
            })
            .unwrap();

        let entry = store.entry("42").unwrap();
        assert!(entry.item.bookmarked);
        assert_eq!(entry.revision, 1);
        assert_eq!(store.items().iter().filter(|i| i.bookmarked).count(), 2);
    }

    #[test]
    fn test_dispatch_unknown_item() {
        let store = sample();
        let err = store
            .dispatch(BookmarkUpdate {
                id: "99".into(),
                bookmarked: true,
            })
            .unwrap_err();
        assert_eq!(err, BookmarkError::UnknownItem("99".into()));
        assert!(store.subscribe("99").is_err());
    }

    #[test]
    fn test_insert_existing_id_replaces_in_place() {
        let store = sample();
        store.insert(Item::new("41", "Moss, revised").with_bookmarked(true));
        assert_eq!(store.len(), 3);
        assert_eq!(store.items()[0].title, "Moss, revised");
        assert_eq!(store.entry("41").unwrap().revision, 1);
    }

    #[test]
    fn test_clones_share_items() {
        let store = sample();
        let other = store.clone();
        other
            .dispatch(BookmarkUpdate {
                id: "41".into(),
                bookmarked: true,
            })
            .unwrap();
        assert!(store.get("41").unwrap().bookmarked);
    }

    #[test]
    fn test_subscriber_sees_dispatch() {
        let store = sample();
        let mut rx = store.subscribe("43").unwrap();
        assert!(!rx.has_changed().unwrap());

        store
            .dispatch(BookmarkUpdate {
                id: "43".into(),
                bookmarked: false,
            })
            .unwrap();

        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().item.bookmarked);
    }
}
