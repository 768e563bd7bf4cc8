use tokio::sync::watch;

use crate::models::{BookmarkIcon, Item};

use super::store::{BookmarkError, BookmarkStore, Entry};
use super::sync::toggle;

/// State behind the detail screen for one item.
///
/// Holds a local copy of the item so the toggle can update immediately, and
/// a subscription to the store entry so the copy is re-synchronized when the
/// collection changes it.
pub struct DetailView {
    store: BookmarkStore,
    rx: watch::Receiver<Entry>,
    item: Item,
}

impl DetailView {
    /// Open the detail screen for `id`, starting from the collection's copy
    pub fn open(store: &BookmarkStore, id: &str) -> Result<Self, BookmarkError> {
        let mut rx = store.subscribe(id)?;
        let item = rx.borrow_and_update().item.clone();
        Ok(Self {
            store: store.clone(),
            rx,
            item,
        })
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn is_bookmarked(&self) -> bool {
        self.item.bookmarked
    }

    pub fn icon(&self) -> BookmarkIcon {
        self.item.bookmark_icon()
    }

    /// Pick up changes the collection made since this view last looked.
    /// Returns true when the local copy changed.
    pub fn refresh(&mut self) -> bool {
        match self.rx.has_changed() {
            Ok(true) => {
                let latest = self.rx.borrow_and_update().item.clone();
                let changed = latest != self.item;
                self.item = latest;
                changed
            }
            _ => false,
        }
    }

    /// Flip the bookmark locally, then push the new value to the collection.
    pub fn toggle(&mut self) -> Result<bool, BookmarkError> {
        self.refresh();

        let id = self.item.id.clone();
        let previous = self.item.bookmarked;
        let mut dispatched = Ok(());

        let bookmarked = toggle(&id, previous, |update| {
            self.item.bookmarked = update.bookmarked;
            dispatched = self.store.dispatch(update);
        });

        if let Err(e) = dispatched {
            self.item.bookmarked = previous;
            return Err(e);
        }

        // Our own update is already reflected locally
        self.rx.borrow_and_update();
        Ok(bookmarked)
    }
}
