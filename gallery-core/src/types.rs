//! Domain types for gallery items.
//!
//! Draft and published stores both serialize [`Item`] as camelCase JSON.
//! Defaulting rules for absent fields live here and nowhere else.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Category applied to items that do not name one.
pub const DEFAULT_CATEGORY: &str = "Character";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable identity of an item. Assigned by the remote store on insert;
/// draft-assigned ids are placeholders until the first deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Free-text tag. Empty or missing values collapse to [`DEFAULT_CATEGORY`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Category {
    fn default() -> Self {
        Self(DEFAULT_CATEGORY.to_owned())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        if s.trim().is_empty() {
            Self::default()
        } else {
            Self(s)
        }
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<Option<String>> for Category {
    fn from(s: Option<String>) -> Self {
        s.map(Self::from).unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::from(raw))
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Every field an editor can change. Identity and rank are not editable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFields {
    pub title: String,
    pub creator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_content: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl ItemFields {
    /// Fields with only the required strings set.
    pub fn new(title: impl Into<String>, creator: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            creator: creator.into(),
            cover_image_ref: None,
            audio_ref: None,
            description: None,
            rich_content: None,
            category: Category::default(),
            year: None,
        }
    }
}

/// A content card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    #[serde(flatten)]
    pub fields: ItemFields,
    /// 1-based presentation rank. `0` means unranked (draft items).
    #[serde(default)]
    pub display_order: u32,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, fields: ItemFields) -> Self {
        Self {
            id: id.into(),
            fields,
            display_order: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.fields.title
    }
}

/// Partial update merged into [`ItemFields`].
///
/// `None` leaves a field untouched. For optional fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub cover_image_ref: Option<Option<String>>,
    pub audio_ref: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub rich_content: Option<Option<String>>,
    pub category: Option<Category>,
    pub year: Option<Option<i32>>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, fields: &mut ItemFields) {
        if let Some(title) = &self.title {
            fields.title = title.clone();
        }
        if let Some(creator) = &self.creator {
            fields.creator = creator.clone();
        }
        if let Some(cover) = &self.cover_image_ref {
            fields.cover_image_ref = cover.clone();
        }
        if let Some(audio) = &self.audio_ref {
            fields.audio_ref = audio.clone();
        }
        if let Some(description) = &self.description {
            fields.description = description.clone();
        }
        if let Some(content) = &self.rich_content {
            fields.rich_content = content.clone();
        }
        if let Some(category) = &self.category {
            fields.category = category.clone();
        }
        if let Some(year) = self.year {
            fields.year = year;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::missing(None, DEFAULT_CATEGORY)]
    #[case::empty(Some(""), DEFAULT_CATEGORY)]
    #[case::blank(Some("   "), DEFAULT_CATEGORY)]
    #[case::given(Some("Story"), "Story")]
    fn category_defaults_when_missing_or_empty(#[case] raw: Option<&str>, #[case] expected: &str) {
        assert_eq!(Category::from(raw.map(str::to_owned)).as_str(), expected);
    }

    #[test]
    fn default_category_is_character() {
        assert_eq!(Category::default().as_str(), DEFAULT_CATEGORY);
    }

    #[test]
    fn item_deserializes_with_defaults() {
        let item: Item =
            serde_json::from_str(r#"{"id":3,"title":"Fox","creator":"Little Crack"}"#).unwrap();
        assert_eq!(item.id, ItemId(3));
        assert_eq!(item.fields.category.as_str(), DEFAULT_CATEGORY);
        assert_eq!(item.display_order, 0);
        assert!(item.fields.cover_image_ref.is_none());
    }

    #[test]
    fn null_category_collapses_to_default() {
        let item: Item = serde_json::from_str(
            r#"{"id":1,"title":"a","creator":"b","category":null,"displayOrder":2}"#,
        )
        .unwrap();
        assert_eq!(item.fields.category, Category::default());
        assert_eq!(item.display_order, 2);
    }

    #[test]
    fn item_serializes_camel_case() {
        let mut fields = ItemFields::new("Bear", "Little Crack");
        fields.cover_image_ref = Some("https://cdn/bear.png".into());
        let json = serde_json::to_string(&Item::new(7, fields)).unwrap();
        assert!(json.contains("\"coverImageRef\""));
        assert!(json.contains("\"displayOrder\":0"));
        assert!(!json.contains("audioRef"), "absent optionals are skipped");
    }

    #[test]
    fn patch_sets_and_clears() {
        let mut fields = ItemFields::new("Cat", "Little Crack");
        fields.description = Some("old".into());
        let patch = ItemPatch {
            title: Some("Cat II".into()),
            description: Some(None),
            year: Some(Some(2025)),
            ..Default::default()
        };
        patch.apply(&mut fields);
        assert_eq!(fields.title, "Cat II");
        assert_eq!(fields.creator, "Little Crack");
        assert!(fields.description.is_none());
        assert_eq!(fields.year, Some(2025));
    }

    #[test]
    fn empty_patch_is_noop() {
        let patch = ItemPatch::default();
        assert!(patch.is_empty());
        let mut fields = ItemFields::new("Deer", "x");
        let before = fields.clone();
        patch.apply(&mut fields);
        assert_eq!(fields, before);
    }
}
