//! Tiered lexical ranking of aggregated results

use super::types::SearchResult;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static TOKEN_SPLITTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("valid splitter regex"));

/// Relevance bucket, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// wikipedia.org results, always first
    Encyclopedia,
    /// Query token in both title and body
    Strong,
    /// Query token in the title only
    Title,
    /// Query token in the body only
    Body,
    /// No query token anywhere
    Weak,
}

/// Reorders results into [`Tier`]s without sorting inside a tier
#[derive(Debug, Clone)]
pub struct Ranker {
    min_token_length: usize,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Ranker {
    pub fn new(min_token_length: usize) -> Self {
        Self { min_token_length }
    }

    /// Lowercased query words at least `min_token_length` characters long
    pub fn tokens(&self, query: &str) -> HashSet<String> {
        TOKEN_SPLITTER
            .split(&query.to_lowercase())
            .filter(|t| t.chars().count() >= self.min_token_length)
            .map(str::to_string)
            .collect()
    }

    /// Tier for one result, or `None` if it should be dropped
    pub fn classify(&self, result: &SearchResult, tokens: &HashSet<String>) -> Option<Tier> {
        let title = result.title();

        // Wikimedia category pages are noise
        if title.contains("Category:") && title.contains("Wikimedia") {
            return None;
        }
        if result.link().contains("wikipedia.org") {
            return Some(Tier::Encyclopedia);
        }

        let hit_title = has_any_token(title, tokens);
        let hit_body = has_any_token(result.body(), tokens);

        Some(match (hit_title, hit_body) {
            (true, true) => Tier::Strong,
            (true, false) => Tier::Title,
            (false, true) => Tier::Body,
            (false, false) => Tier::Weak,
        })
    }

    /// Rank `results` for `query`
    pub fn rank(&self, results: Vec<SearchResult>, query: &str) -> Vec<SearchResult> {
        let tokens = self.tokens(query);
        let mut tiered: Vec<(Tier, SearchResult)> = results
            .into_iter()
            .filter_map(|r| self.classify(&r, &tokens).map(|tier| (tier, r)))
            .collect();

        // Stable: input order survives within a tier
        tiered.sort_by_key(|(tier, _)| *tier);
        tiered.into_iter().map(|(_, r)| r).collect()
    }
}

fn has_any_token(text: &str, tokens: &HashSet<String>) -> bool {
    let lower = text.to_lowercase();
    tokens.iter().any(|t| lower.contains(t.as_str()))
}
