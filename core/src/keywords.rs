//! Free-text keyword mining.
//!
//! Callers depend only on `KeywordSummarizer`, so a stronger tokenizer or a
//! stop-word filter can replace the frequency count without touching them.

use crate::{config::RootCauseConfig, stats::{LabelCount, Tally}};

pub trait KeywordSummarizer {
    /// Rank the notable tokens of `texts`, most frequent first.
    fn summarize(&self, texts: &[&str]) -> Vec<LabelCount>;
}

/// Lower-cased whitespace tokens longer than `min_token_len` characters,
/// counted and cut to the `top_n` most frequent (ties by first appearance).
#[derive(Debug, Clone)]
pub struct FrequencySummarizer {
    pub min_token_len: usize,
    pub top_n:         usize,
}

impl FrequencySummarizer {
    pub fn from_config(config: &RootCauseConfig) -> Self {
        Self { min_token_len: config.min_token_len, top_n: config.top_tokens }
    }
}

impl Default for FrequencySummarizer {
    fn default() -> Self {
        Self::from_config(&RootCauseConfig::default())
    }
}

impl KeywordSummarizer for FrequencySummarizer {
    fn summarize(&self, texts: &[&str]) -> Vec<LabelCount> {
        let tally: Tally<String> = texts
            .iter()
            .flat_map(|t| t.split_whitespace())
            .map(str::to_lowercase)
            .filter(|w| w.chars().count() > self.min_token_len)
            .collect();
        tally.top_labels(self.top_n)
    }
}
