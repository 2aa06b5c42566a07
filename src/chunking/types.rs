// Shared types for the chunking pipeline
use serde::{Deserialize, Serialize};

/// Strategy that produced a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Sentence-greedy accumulation with sentence overlap
    Smart,
    /// Word-bucket splitting with neutral quality scores
    Fallback,
}

/// A bounded contiguous slice of a document's text, the unit of retrieval.
/// Immutable once created; owned by the document that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub text: String,

    /// Character count of `text`
    pub size: usize,

    /// Sentences (smart) or words (fallback) folded into this chunk
    pub element_count: usize,

    #[serde(rename = "type")]
    pub strategy: ChunkStrategy,

    /// Character offset of the chunk's first element in the source text
    pub start_index: usize,

    pub starts_with_capital: bool,
    pub ends_with_punctuation: bool,
    pub has_questions: bool,
    pub word_count: usize,

    /// Structural completeness estimate, 0-100
    pub completeness: u8,

    /// Readability estimate, 0-100
    pub readability: u8,
}
