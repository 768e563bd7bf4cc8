use super::store::BookmarkUpdate;

/// Flip a bookmark flag and hand the new state to `on_update`.
///
/// The new value is computed first; `on_update` is then called exactly once
/// with it. No network is involved.
pub fn toggle<F>(item_id: &str, current: bool, on_update: F) -> bool
where
    F: FnOnce(BookmarkUpdate),
{
    let bookmarked = !current;
    on_update(BookmarkUpdate {
        id: item_id.to_string(),
        bookmarked,
    });
    bookmarked
}
