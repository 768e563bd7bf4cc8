//! List and detail screens sharing one bookmark store.

use greendan_core::bookmarks::{BookmarkStore, BookmarkUpdate, DetailView};
use greendan_core::models::{BookmarkIcon, Item};

fn magazine() -> BookmarkStore {
    BookmarkStore::new([
        Item::new("41", "Spring planting")
            .with_image("planting.png")
            .with_explanation("What to sow in March")
            .with_datetime("2024-03-01"),
        Item::new("42", "Composting basics")
            .with_image("compost.png")
            .with_explanation("Turning scraps into soil")
            .with_datetime("2024-03-08"),
        Item::new("43", "Rain barrels")
            .with_image("barrel.png")
            .with_explanation("Collecting runoff")
            .with_datetime("2024-03-15")
            .with_bookmarked(true),
    ])
}

fn list_icons(store: &BookmarkStore) -> Vec<(String, &'static str)> {
    store
        .items()
        .into_iter()
        .map(|item| (item.id.clone(), item.bookmark_icon().name()))
        .collect()
}

#[test]
fn single_toggle_updates_detail_and_collection_once() {
    let store = magazine();
    let mut watcher = store.subscribe("42").unwrap();

    let mut detail = DetailView::open(&store, "42").unwrap();
    assert!(!detail.is_bookmarked());

    assert!(detail.toggle().unwrap());

    assert!(detail.is_bookmarked());
    let entry = store.entry("42").unwrap();
    assert!(entry.item.bookmarked);
    assert_eq!(entry.revision, 1, "collection updated exactly once");

    assert!(watcher.has_changed().unwrap());
    assert!(watcher.borrow_and_update().item.bookmarked);
    assert!(!watcher.has_changed().unwrap());
}

#[test]
fn list_renders_from_the_collection_after_toggle() {
    let store = magazine();
    assert_eq!(
        list_icons(&store),
        vec![
            ("41".to_string(), "bookmark-border"),
            ("42".to_string(), "bookmark-border"),
            ("43".to_string(), "bookmark"),
        ]
    );

    DetailView::open(&store, "41").unwrap().toggle().unwrap();
    DetailView::open(&store, "43").unwrap().toggle().unwrap();

    assert_eq!(
        list_icons(&store),
        vec![
            ("41".to_string(), "bookmark"),
            ("42".to_string(), "bookmark-border"),
            ("43".to_string(), "bookmark-border"),
        ]
    );
}

#[test]
fn double_toggle_returns_to_original_and_stays_in_sync() {
    let store = magazine();
    let mut detail = DetailView::open(&store, "43").unwrap();
    let original = detail.is_bookmarked();

    let after_first = detail.toggle().unwrap();
    assert_eq!(store.get("43").unwrap().bookmarked, after_first);

    let after_second = detail.toggle().unwrap();
    assert_eq!(after_second, original);
    assert_eq!(store.get("43").unwrap().bookmarked, original);
    assert_eq!(detail.icon(), BookmarkIcon::Bookmark);
}

#[test]
fn reentering_detail_shows_external_change() {
    let store = magazine();
    let detail = DetailView::open(&store, "42").unwrap();
    assert!(!detail.is_bookmarked());
    drop(detail);

    // Changed from somewhere else while the detail screen was closed
    store
        .dispatch(BookmarkUpdate {
            id: "42".into(),
            bookmarked: true,
        })
        .unwrap();

    let detail = DetailView::open(&store, "42").unwrap();
    assert!(detail.is_bookmarked());
    assert_eq!(detail.item().explanation, "Turning scraps into soil");
}

#[test]
fn open_detail_resyncs_when_collection_changes() {
    let store = magazine();
    let mut detail = DetailView::open(&store, "41").unwrap();

    store
        .dispatch(BookmarkUpdate {
            id: "41".into(),
            bookmarked: true,
        })
        .unwrap();

    assert!(detail.refresh());
    assert!(detail.is_bookmarked());
    assert!(!detail.refresh(), "nothing new the second time");
}
