//! Keyword extraction
//!
//! Computes frequency-ranked single words and multi-word phrases per
//! document, excluding English and Portuguese stop words. The resulting
//! table feeds keyword boosts during relevance scoring.

mod stopwords;

use crate::error::{CellitoError, Result};
use ahash::{HashSet, HashSetExt};
use indexmap::IndexMap;
use regex::Regex;

/// Number of keyword entries kept per document
const MAX_KEYWORDS: usize = 20;

/// Weight multiplier for multi-word phrases
const PHRASE_BOOST: u32 = 2;

/// Tokens at or below this length are discarded
const MIN_TOKEN_CHARS: usize = 2;

/// Extracts the weighted keyword table of a document.
pub struct KeywordExtractor {
    cleanup_re: Regex,
    stop_words: HashSet<&'static str>,
}

impl KeywordExtractor {
    pub fn new() -> Result<Self> {
        // Keep ASCII alphanumerics and accented Latin letters; everything
        // else becomes a space.
        let cleanup_re = Regex::new(r"[^a-z0-9áàâãäéèêëíìîïóòôõöúùûüç\s]")
            .map_err(|e| CellitoError::Pattern(format!("keyword cleanup pattern: {e}")))?;

        let mut stop_words = HashSet::new();
        stop_words.extend(stopwords::ENGLISH);
        stop_words.extend(stopwords::PORTUGUESE);

        Ok(Self {
            cleanup_re,
            stop_words,
        })
    }

    /// Extract the top keywords of `text` as an ordered `word/phrase →
    /// weight` table, weight descending.
    ///
    /// Unigrams appearing more than once keep their raw frequency;
    /// bigrams and trigrams appearing more than once are boosted to twice
    /// their frequency. Only the top [`MAX_KEYWORDS`] entries are kept.
    pub fn extract(&self, text: &str) -> IndexMap<String, u32> {
        let lowered = text.to_lowercase();
        let cleaned = self.cleanup_re.replace_all(&lowered, " ");
        let tokens: Vec<&str> = cleaned
            .split_whitespace()
            .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
            .filter(|token| !token.chars().all(|c| c.is_ascii_digit()))
            .filter(|token| !self.stop_words.contains(*token))
            .collect();

        // Insertion-ordered tables keep ties deterministic after sorting.
        let mut unigrams: IndexMap<&str, u32> = IndexMap::new();
        for token in &tokens {
            *unigrams.entry(*token).or_insert(0) += 1;
        }

        let mut phrases: IndexMap<String, u32> = IndexMap::new();
        for pair in tokens.windows(2) {
            *phrases.entry(pair.join(" ")).or_insert(0) += 1;
        }
        for triple in tokens.windows(3) {
            *phrases.entry(triple.join(" ")).or_insert(0) += 1;
        }

        let mut weighted: Vec<(String, u32)> = Vec::new();
        for (word, count) in &unigrams {
            if *count > 1 {
                weighted.push((word.to_string(), *count));
            }
        }
        for (phrase, count) in &phrases {
            if *count > 1 {
                weighted.push((phrase.clone(), count * PHRASE_BOOST));
            }
        }

        weighted.sort_by(|a, b| b.1.cmp(&a.1));
        weighted.into_iter().take(MAX_KEYWORDS).collect()
    }
}
