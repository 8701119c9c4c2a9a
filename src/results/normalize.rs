//! Field normalization applied whenever a result field is assigned
//!
//! Adapters hand over raw provider text (markup fragments, escaped entities,
//! percent-encoded links, epoch timestamps). Every assignment goes through
//! [`normalize_field`], keyed by the field name, so records look the same no
//! matter which provider produced them.

use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde_json::Value;
use unicode_general_category::{get_general_category, GeneralCategory};
use unicode_normalization::UnicodeNormalization;

static STRIP_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("valid tag regex"));

/// A raw value handed to a result setter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text as scraped or decoded from JSON
    Text(String),
    /// Integer value, e.g. a Unix timestamp in seconds
    Epoch(i64),
}

impl FieldValue {
    /// Empty strings and zero are "falsy" and always normalize to `""`
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Epoch(n) => *n == 0,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Epoch(n) => n.to_string(),
        }
    }

    /// Convert a JSON value from a provider payload
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Text(String::new()),
            Value::String(s) => Self::Text(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Epoch(i),
                None => Self::Text(n.to_string()),
            },
            Value::Bool(b) => Self::Text(b.to_string()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Epoch(value)
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        Self::from_json(value)
    }
}

/// Normalize `value` according to the rule registered for `field`
pub fn normalize_field(field: &str, value: FieldValue) -> String {
    if value.is_empty() {
        return String::new();
    }
    match field {
        "title" | "body" => normalize_text(&value.into_string()),
        "href" | "url" | "thumbnail" | "image" => normalize_url(&value.into_string()),
        "date" => normalize_date(value),
        _ => value.into_string(),
    }
}

/// Clean scraped text.
///
/// Strips tags, unescapes HTML entities, applies NFC, drops every
/// category "C" character (`\n` and `\t` included) and collapses the
/// remaining whitespace.
pub fn normalize_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let stripped = STRIP_TAGS.replace_all(raw, "");
    let unescaped = unescape_html(&stripped);
    let cleaned: String = unescaped.nfc().filter(|c| !is_other_category(*c)).collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Percent-decode a link and turn literal spaces into `+`
pub fn normalize_url(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let decoded = urlencoding::decode_binary(raw.as_bytes());
    String::from_utf8_lossy(&decoded).replace(' ', "+")
}

/// Render epoch seconds as ISO-8601 UTC; strings pass through untouched
pub fn normalize_date(value: FieldValue) -> String {
    match value {
        FieldValue::Epoch(secs) => DateTime::from_timestamp(secs, 0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| secs.to_string()),
        FieldValue::Text(s) => s,
    }
}

fn unescape_html(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    // Re-escape stray '<' so the parser treats it as text
    let escaped = text.replace('<', "&lt;");
    let fragment = Html::parse_fragment(&escaped);
    fragment.root_element().text().collect()
}

/// Unicode general category "C": control, format, surrogate, private use
/// and unassigned code points
fn is_other_category(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
    )
}
