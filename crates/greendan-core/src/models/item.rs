use serde::{Deserialize, Serialize};

/// A magazine entry as shown in the collection list and the detail screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Item {
    pub id: String,
    pub title: String,
    /// Image reference, resolved by the presentation layer
    pub image: String,
    pub explanation: String,
    pub datetime: String,
    #[serde(default)]
    pub bookmarked: bool,
}

impl Item {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image: String::new(),
            explanation: String::new(),
            datetime: String::new(),
            bookmarked: false,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn with_datetime(mut self, datetime: impl Into<String>) -> Self {
        self.datetime = datetime.into();
        self
    }

    pub fn with_bookmarked(mut self, bookmarked: bool) -> Self {
        self.bookmarked = bookmarked;
        self
    }

    pub fn bookmark_icon(&self) -> BookmarkIcon {
        BookmarkIcon::for_state(self.bookmarked)
    }

    /// Date line as shown under the image
    pub fn date_display(&self) -> String {
        if self.datetime.is_empty() {
            "Date: unknown".to_string()
        } else {
            format!("Date: {}", self.datetime)
        }
    }
}

/// Icon shown next to an item for its bookmark state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum BookmarkIcon {
    Bookmark,
    BookmarkBorder,
}

impl BookmarkIcon {
    pub fn for_state(bookmarked: bool) -> Self {
        if bookmarked {
            BookmarkIcon::Bookmark
        } else {
            BookmarkIcon::BookmarkBorder
        }
    }

    /// Material icon name
    pub fn name(&self) -> &'static str {
        match self {
            BookmarkIcon::Bookmark => "bookmark",
            BookmarkIcon::BookmarkBorder => "bookmark-border",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_defaults_unbookmarked_when_flag_missing() {
        let json = r#"{"id":"7","title":"Moss","image":"moss.png","explanation":"Green","datetime":"2024-05-01"}"#;
        let item: Item = serde_json::from_str(json).expect("item json should parse");
        assert!(!item.bookmarked);
        assert_eq!(item.bookmark_icon(), BookmarkIcon::BookmarkBorder);
    }

    #[test]
    fn test_bookmark_icon_names() {
        assert_eq!(BookmarkIcon::for_state(true).name(), "bookmark");
        assert_eq!(BookmarkIcon::for_state(false).name(), "bookmark-border");
    }

    #[test]
    fn test_date_display() {
        let item = Item::new("1", "Fern").with_datetime("2024-05-01");
        assert_eq!(item.date_display(), "Date: 2024-05-01");
        assert_eq!(Item::new("2", "Ivy").date_display(), "Date: unknown");
    }
}
