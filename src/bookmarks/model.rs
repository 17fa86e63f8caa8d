use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub owner: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of a create request. Required fields are optional here so that a
/// missing title or url surfaces as a validation failure, not a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookmark {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

/// Attributes handed to the store for a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub owner: String,
}

pub const MISSING_TITLE_OR_URL: &str = "Please provide title and url";

impl CreateBookmark {
    pub fn into_new(self, owner: &str) -> Result<NewBookmark, &'static str> {
        let title = self.title.filter(|t| !t.is_empty());
        let url = self.url.filter(|u| !u.is_empty());

        match (title, url) {
            (Some(title), Some(url)) => Ok(NewBookmark {
                title,
                url,
                tags: self.tags.unwrap_or_default(),
                is_favorite: self.is_favorite.unwrap_or(false),
                owner: owner.to_string(),
            }),
            _ => Err(MISSING_TITLE_OR_URL),
        }
    }
}

/// A field of a partial update: either left out of the payload or given a value.
///
/// Use with `#[serde(default)]` so a missing key deserializes to `Absent`. A key
/// that is present always yields `Present`, even for `""` or `[]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Present(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Patch::Present)
    }
}

impl<T> Patch<T> {
    /// Overwrites `target` if a value was supplied; reports whether it changed.
    pub fn apply_to(self, target: &mut T) -> bool
    where
        T: PartialEq,
    {
        match self {
            Patch::Present(value) if *target != value => {
                *target = value;
                true
            }
            _ => false,
        }
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Present(value)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookmark {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub url: Patch<String>,
    #[serde(default)]
    pub tags: Patch<Vec<String>>,
    #[serde(default)]
    pub is_favorite: Patch<bool>,
}

impl UpdateBookmark {
    /// Merges the supplied fields into `bookmark`; returns whether anything changed.
    pub fn merge_into(self, bookmark: &mut Bookmark) -> bool {
        let mut changed = false;
        changed |= self.title.apply_to(&mut bookmark.title);
        changed |= self.url.apply_to(&mut bookmark.url);
        changed |= self.tags.apply_to(&mut bookmark.tags);
        changed |= self.is_favorite.apply_to(&mut bookmark.is_favorite);
        changed
    }
}

/// Filters and paging for listing a caller's bookmarks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub tag: Option<String>,
    pub favorite: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 100;

impl Default for ListFilter {
    fn default() -> Self {
        ListFilter {
            tag: None,
            favorite: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub tag: Option<String>,
    pub favorite: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListParams {
    pub fn into_filter(self) -> ListFilter {
        ListFilter {
            tag: self.tag.filter(|t| !t.is_empty()),
            favorite: self.favorite,
            limit: self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: self.offset.unwrap_or(0).max(0),
        }
    }
}
