//! Cross-provider deduplication with frequency ranking

use super::types::SearchResult;
use crate::error::SearchError;
use std::collections::HashMap;
use tracing::debug;

/// Fields that may carry the dedup identity; each record type is scanned
/// in its own field order
pub const DEFAULT_KEY_FIELDS: &[&str] = &["href", "image", "url", "embed_url"];

#[derive(Debug, Clone)]
struct Entry {
    result: SearchResult,
    count: usize,
}

/// Deduplicates result batches from several providers.
///
/// Records sharing an aggregation key collapse into one entry that counts
/// how many times the key was seen; the copy with the longest body wins.
#[derive(Debug, Clone)]
pub struct Aggregator {
    key_fields: Vec<String>,
    index: HashMap<String, usize>,
    entries: Vec<Entry>,
}

impl Aggregator {
    /// Create an aggregator keyed on `key_fields` (must not be empty)
    pub fn new(key_fields: &[&str]) -> Result<Self, SearchError> {
        if key_fields.is_empty() {
            return Err(SearchError::Configuration(
                "at least one aggregation key field must be provided".to_string(),
            ));
        }
        Ok(Self {
            key_fields: key_fields.iter().map(|f| f.to_string()).collect(),
            index: HashMap::new(),
            entries: Vec::new(),
        })
    }

    /// Compute the aggregation key: the first non-empty key field, scanned in
    /// the record type's own field order.
    ///
    /// `Ok(None)` means the record's type defines key fields but all of them
    /// are empty.
    fn key(&self, result: &SearchResult) -> Result<Option<String>, SearchError> {
        let mut defined = false;
        for &field in result.fields() {
            if !self.key_fields.iter().any(|k| k == field) {
                continue;
            }
            defined = true;
            if let Some(value) = result.get(field).filter(|v| !v.is_empty()) {
                return Ok(Some(value.to_string()));
            }
        }
        if defined {
            Ok(None)
        } else {
            Err(SearchError::Configuration(format!(
                "{} result has none of the key fields {:?}",
                result.category(),
                self.key_fields
            )))
        }
    }

    /// Register one occurrence of `result`
    pub fn append(&mut self, result: SearchResult) -> Result<(), SearchError> {
        let Some(key) = self.key(&result)? else {
            debug!("Dropping {} result without a link", result.category());
            return Ok(());
        };

        match self.index.get(&key) {
            Some(&pos) => {
                let entry = &mut self.entries[pos];
                entry.count += 1;
                // Prefer the richer copy, keep the accumulated count
                if result.body().chars().count() > entry.result.body().chars().count() {
                    entry.result = result;
                }
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(Entry { result, count: 1 });
            }
        }
        Ok(())
    }

    /// Register every result of a batch
    pub fn extend(
        &mut self,
        results: impl IntoIterator<Item = SearchResult>,
    ) -> Result<(), SearchError> {
        for result in results {
            self.append(result)?;
        }
        Ok(())
    }

    /// Number of distinct keys seen so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Occurrence count for a key, if it was seen
    pub fn count(&self, key: &str) -> Option<usize> {
        self.index.get(key).map(|&pos| self.entries[pos].count)
    }

    /// Results, most frequent first
    pub fn extract(self) -> Vec<SearchResult> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries.into_iter().map(|e| e.result).collect()
    }
}
