//! Search query and related data models

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Safe search level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    On,
    #[default]
    Moderate,
    Off,
}

impl SafeSearch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Moderate => "moderate",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for SafeSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafeSearch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" | "strict" => Ok(Self::On),
            "moderate" => Ok(Self::Moderate),
            "off" => Ok(Self::Off),
            other => Err(format!("invalid safesearch value: {}", other)),
        }
    }
}

/// Time range filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "d")]
    Day,
    #[serde(rename = "w")]
    Week,
    #[serde(rename = "m")]
    Month,
    #[serde(rename = "y")]
    Year,
}

impl TimeRange {
    /// Single-letter code (`d`, `w`, `m`, `y`)
    pub fn code(&self) -> &'static str {
        match self {
            Self::Day => "d",
            Self::Week => "w",
            Self::Month => "m",
            Self::Year => "y",
        }
    }

    pub fn word(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "day" => Ok(Self::Day),
            "w" | "week" => Ok(Self::Week),
            "m" | "month" => Ok(Self::Month),
            "y" | "year" => Ok(Self::Year),
            other => Err(format!("invalid time limit: {}", other)),
        }
    }
}

/// Complete search request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The search query string
    pub query: String,
    /// Region code, `country-lang` (e.g. `us-en`)
    pub region: String,
    pub safesearch: SafeSearch,
    pub time_limit: Option<TimeRange>,
    /// Page number (1-indexed)
    pub page: u32,
    /// Comma-delimited engine names, or `auto`/`all`
    pub backend: String,
    /// Result budget; `None` means unbounded
    pub max_results: Option<usize>,
    /// Category-specific options passed through to engines
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

impl SearchQuery {
    /// Create a query with default parameters
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            region: "us-en".to_string(),
            safesearch: SafeSearch::Moderate,
            time_limit: None,
            page: 1,
            backend: "auto".to_string(),
            max_results: Some(10),
            extra: HashMap::new(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_safesearch(mut self, safesearch: SafeSearch) -> Self {
        self.safesearch = safesearch;
        self
    }

    pub fn with_time_limit(mut self, time_limit: TimeRange) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    /// Set page number (minimum 1)
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = backend.into();
        self
    }

    /// Set the result budget; 0 means unbounded
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = (max_results > 0).then_some(max_results);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Check if query is empty
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let q = SearchQuery::new("hello");
        assert_eq!(q.region, "us-en");
        assert_eq!(q.safesearch, SafeSearch::Moderate);
        assert_eq!(q.page, 1);
        assert_eq!(q.backend, "auto");
        assert_eq!(q.max_results, Some(10));
    }

    #[test]
    fn test_builder() {
        let q = SearchQuery::new("test")
            .with_region("de-de")
            .with_safesearch(SafeSearch::Off)
            .with_page(0)
            .with_max_results(0)
            .with_time_limit(TimeRange::Week)
            .with_extra("size", "Large");

        assert_eq!(q.region, "de-de");
        assert_eq!(q.page, 1);
        assert_eq!(q.max_results, None);
        assert_eq!(q.time_limit.map(|t| t.code()), Some("w"));
        assert_eq!(q.extra.get("size").map(String::as_str), Some("Large"));
    }

    #[test]
    fn test_empty() {
        assert!(SearchQuery::new("").is_empty());
        assert!(SearchQuery::new("   ").is_empty());
        assert!(!SearchQuery::new("x").is_empty());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("ON".parse::<SafeSearch>().unwrap(), SafeSearch::On);
        assert!("maybe".parse::<SafeSearch>().is_err());
        assert_eq!("month".parse::<TimeRange>().unwrap(), TimeRange::Month);
        assert_eq!("y".parse::<TimeRange>().unwrap(), TimeRange::Year);
        assert!("decade".parse::<TimeRange>().is_err());
    }
}
