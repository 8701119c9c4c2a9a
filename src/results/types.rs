//! Result type definitions
//!
//! One record type per search category. Fields are private: the only way to
//! assign one is through a setter, and every setter runs the field's
//! normalizer (see [`super::normalize`]).

use super::normalize::{normalize_field, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Search category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Text,
    Images,
    News,
    Videos,
    Books,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Images => "images",
            Self::News => "news",
            Self::Videos => "videos",
            Self::Books => "books",
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Self::Text,
            Self::Images,
            Self::News,
            Self::Videos,
            Self::Books,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "images" => Ok(Self::Images),
            "news" => Ok(Self::News),
            "videos" => Ok(Self::Videos),
            "books" => Ok(Self::Books),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// Declares a result record whose string fields are only assignable
/// through normalizing setters.
macro_rules! result_record {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($field:ident / $setter:ident),+ $(,)?
        }
        $(maps { $($map:ident / $map_setter:ident),+ $(,)? })?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
        pub struct $name {
            $($field: String,)+
            $($($map: BTreeMap<String, String>,)+)?
        }

        impl $name {
            /// Field names in declaration order
            pub const FIELDS: &'static [&'static str] = &[$(stringify!($field)),+];

            pub fn new() -> Self {
                Self::default()
            }

            $(
                pub fn $field(&self) -> &str {
                    &self.$field
                }

                pub fn $setter(&mut self, value: impl Into<FieldValue>) -> &mut Self {
                    self.$field = normalize_field(stringify!($field), value.into());
                    self
                }
            )+

            $($(
                pub fn $map(&self) -> &BTreeMap<String, String> {
                    &self.$map
                }

                pub fn $map_setter(&mut self, value: BTreeMap<String, String>) -> &mut Self {
                    self.$map = value;
                    self
                }
            )+)?

            /// Read a string field by name
            pub fn get(&self, field: &str) -> Option<&str> {
                match field {
                    $(stringify!($field) => Some(&self.$field),)+
                    _ => None,
                }
            }

            /// Assign a string field by name. Returns `false` for unknown fields.
            pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> bool {
                match field {
                    $(stringify!($field) => {
                        self.$setter(value);
                        true
                    })+
                    _ => false,
                }
            }
        }
    };
}

result_record! {
    /// Text (web) search result
    TextResult {
        title / set_title,
        href / set_href,
        body / set_body,
    }
}

result_record! {
    /// Image search result
    ImagesResult {
        title / set_title,
        image / set_image,
        thumbnail / set_thumbnail,
        url / set_url,
        height / set_height,
        width / set_width,
        source / set_source,
    }
}

result_record! {
    /// News search result
    NewsResult {
        date / set_date,
        title / set_title,
        body / set_body,
        url / set_url,
        image / set_image,
        source / set_source,
    }
}

result_record! {
    /// Video search result
    VideosResult {
        title / set_title,
        content / set_content,
        description / set_description,
        duration / set_duration,
        embed_html / set_embed_html,
        embed_url / set_embed_url,
        image_token / set_image_token,
        provider / set_provider,
        published / set_published,
        publisher / set_publisher,
        uploader / set_uploader,
    }
    maps {
        images / set_images,
        statistics / set_statistics,
    }
}

result_record! {
    /// Book search result
    BooksResult {
        title / set_title,
        author / set_author,
        publisher / set_publisher,
        info / set_info,
        url / set_url,
        thumbnail / set_thumbnail,
    }
}

/// A single search result of any category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchResult {
    Text(TextResult),
    Images(ImagesResult),
    News(NewsResult),
    Videos(VideosResult),
    Books(BooksResult),
}

impl SearchResult {
    /// Empty record of the type produced by `category`
    pub fn empty(category: Category) -> Self {
        match category {
            Category::Text => Self::Text(TextResult::new()),
            Category::Images => Self::Images(ImagesResult::new()),
            Category::News => Self::News(NewsResult::new()),
            Category::Videos => Self::Videos(VideosResult::new()),
            Category::Books => Self::Books(BooksResult::new()),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Text(_) => Category::Text,
            Self::Images(_) => Category::Images,
            Self::News(_) => Category::News,
            Self::Videos(_) => Category::Videos,
            Self::Books(_) => Category::Books,
        }
    }

    /// String field names defined for this record's type
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Text(_) => TextResult::FIELDS,
            Self::Images(_) => ImagesResult::FIELDS,
            Self::News(_) => NewsResult::FIELDS,
            Self::Videos(_) => VideosResult::FIELDS,
            Self::Books(_) => BooksResult::FIELDS,
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        match self {
            Self::Text(r) => r.get(field),
            Self::Images(r) => r.get(field),
            Self::News(r) => r.get(field),
            Self::Videos(r) => r.get(field),
            Self::Books(r) => r.get(field),
        }
    }

    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> bool {
        match self {
            Self::Text(r) => r.set(field, value),
            Self::Images(r) => r.set(field, value),
            Self::News(r) => r.set(field, value),
            Self::Videos(r) => r.set(field, value),
            Self::Books(r) => r.set(field, value),
        }
    }

    pub fn title(&self) -> &str {
        self.get("title").unwrap_or_default()
    }

    /// The descriptive text of the record: `body`, falling back to `description`
    pub fn body(&self) -> &str {
        self.get("body")
            .or_else(|| self.get("description"))
            .unwrap_or_default()
    }

    /// The first non-empty link-like field
    pub fn link(&self) -> &str {
        ["href", "url", "embed_url", "image"]
            .iter()
            .filter_map(|f| self.get(f))
            .find(|v| !v.is_empty())
            .unwrap_or_default()
    }
}

impl From<TextResult> for SearchResult {
    fn from(r: TextResult) -> Self {
        Self::Text(r)
    }
}

impl From<ImagesResult> for SearchResult {
    fn from(r: ImagesResult) -> Self {
        Self::Images(r)
    }
}

impl From<NewsResult> for SearchResult {
    fn from(r: NewsResult) -> Self {
        Self::News(r)
    }
}

impl From<VideosResult> for SearchResult {
    fn from(r: VideosResult) -> Self {
        Self::Videos(r)
    }
}

impl From<BooksResult> for SearchResult {
    fn from(r: BooksResult) -> Self {
        Self::Books(r)
    }
}
