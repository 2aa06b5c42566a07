//! Relevance scoring
//!
//! Scores a (query, chunk, document) triple from exact and partial term
//! overlap, keyword-table boosts, and chunk-shape bonuses. Exact word
//! matches also satisfy the partial-containment checks, in both the term
//! loop and the keyword scan; that overlap is part of the scoring curve
//! and is pinned by tests. Do not deduplicate it.

use crate::chunking::Chunk;
use crate::processing::ProcessedDocument;

/// Bonus when the chunk contains the whole query verbatim
const FULL_QUERY_BONUS: u32 = 100;

/// Bonus per exactly-matching chunk token
const EXACT_WORD_BONUS: u32 = 15;

/// Bonus per chunk token with substring containment either direction
const PARTIAL_WORD_BONUS: u32 = 8;

/// Keyword-table weight for an exact entry
const KEYWORD_EXACT_WEIGHT: u32 = 10;

/// Keyword-table weight per containment match during the table scan
const KEYWORD_PARTIAL_WEIGHT: u32 = 5;

/// Bonus each for a capitalized start and a punctuated end
const SHAPE_BONUS: u32 = 2;

/// Query tokens at or below this length are ignored
const MIN_QUERY_TOKEN_CHARS: usize = 2;

/// Score a chunk against a query in the context of its document.
///
/// The result is an unbounded non-negative integer; scores below the search
/// threshold are discarded by the orchestrator, not here.
pub fn score_chunk(query: &str, chunk: &Chunk, document: &ProcessedDocument) -> u32 {
    let query_lower = query.trim().to_lowercase();
    if query_lower.is_empty() {
        return 0;
    }

    let chunk_lower = chunk.text.to_lowercase();
    let mut score: u32 = 0;

    if chunk_lower.contains(&query_lower) {
        score += FULL_QUERY_BONUS;
    }

    let query_words: Vec<&str> = query_lower
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_QUERY_TOKEN_CHARS)
        .collect();
    let chunk_tokens: Vec<&str> = chunk_lower.split_whitespace().collect();

    for word in &query_words {
        for token in &chunk_tokens {
            if token == word {
                score += EXACT_WORD_BONUS;
            }
            // An exact token also passes this check and is counted again.
            if token.contains(*word) || word.contains(*token) {
                score += PARTIAL_WORD_BONUS;
            }
        }

        if let Some(frequency) = document.keywords.get(*word) {
            score += KEYWORD_EXACT_WEIGHT * frequency;
        }
        for (keyword, frequency) in &document.keywords {
            // The exact entry matches here as well and contributes twice.
            if keyword.contains(*word) || word.contains(keyword.as_str()) {
                score += KEYWORD_PARTIAL_WEIGHT * frequency;
            }
        }
    }

    if chunk.starts_with_capital {
        score += SHAPE_BONUS;
    }
    if chunk.ends_with_punctuation {
        score += SHAPE_BONUS;
    }

    score
}
