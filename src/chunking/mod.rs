//! Text chunking
//!
//! Splits normalized article text into overlapping, metadata-tagged segments
//! sized for retrieval. The primary strategy accumulates whole sentences
//! greedily; a word-bucket fallback handles text the sentence pass cannot.

mod quality;
mod types;

pub use types::{Chunk, ChunkStrategy};

use serde::{Deserialize, Serialize};

/// Inputs longer than this are truncated before chunking
const MAX_TEXT_CHARS: usize = 100_000;

/// Safety cap on emitted smart chunks
const MAX_SMART_CHUNKS: usize = 1000;

/// Safety cap on emitted fallback chunks
const MAX_FALLBACK_CHUNKS: usize = 500;

/// Sentence fragments at or below this length are discarded
const MIN_SENTENCE_CHARS: usize = 10;

/// Minimum joined length for a fallback bucket to become a chunk
const MIN_FALLBACK_CHARS: usize = 50;

/// Chunking parameters. All sizes are character counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingOptions {
    /// Soft target size; a buffer past this is emitted once it is large enough
    pub chunk_size: usize,

    /// Nominal overlap size; the smart strategy derives its actual overlap
    /// from sentence counts
    pub overlap: usize,

    /// Buffers below this size keep accumulating instead of being emitted
    pub min_chunk_size: usize,

    /// Hard ceiling; a buffer is emitted before crossing it
    pub max_chunk_size: usize,

    pub strategy: ChunkStrategy,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            overlap: 150,
            min_chunk_size: 100,
            max_chunk_size: 1200,
            strategy: ChunkStrategy::Smart,
        }
    }
}

/// A sentence with its position in the source text
struct Sentence<'a> {
    text: &'a str,
    /// Character offset of the sentence start in the source text
    offset: usize,
    /// Character count of `text`
    chars: usize,
}

/// Split text into chunks according to `options`.
///
/// Empty or whitespace-only input yields no chunks. Oversized input is
/// truncated to the first [`MAX_TEXT_CHARS`] characters with a warning.
pub fn chunk_text(text: &str, options: &ChunkingOptions) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let text = truncate_chars(text, MAX_TEXT_CHARS);

    match options.strategy {
        ChunkStrategy::Smart => smart_chunks(text, options),
        ChunkStrategy::Fallback => fallback_chunks(text, options),
    }
}

/// Truncate to at most `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => {
            tracing::warn!(
                "input of {} chars truncated to {} before chunking",
                text.chars().count(),
                max
            );
            &text[..byte_index]
        }
        None => text,
    }
}

/// Sentence-greedy accumulation with sentence-count-derived overlap.
fn smart_chunks(text: &str, options: &ChunkingOptions) -> Vec<Chunk> {
    let sentences = split_sentences(text);

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut buffer: Vec<&Sentence<'_>> = Vec::new();
    let mut buffer_chars = 0usize;

    for sentence in &sentences {
        if chunks.len() >= MAX_SMART_CHUNKS {
            tracing::warn!(
                "chunk limit of {} reached, remaining sentences dropped",
                MAX_SMART_CHUNKS
            );
            buffer.clear();
            break;
        }

        let candidate = if buffer.is_empty() {
            sentence.chars
        } else {
            buffer_chars + 1 + sentence.chars
        };

        if !buffer.is_empty() && candidate > options.max_chunk_size {
            // Hard ceiling: emit regardless of min_chunk_size, no overlap.
            chunks.push(build_chunk(&buffer));
            buffer.clear();
            buffer.push(sentence);
            buffer_chars = sentence.chars;
        } else if !buffer.is_empty()
            && candidate > options.chunk_size
            && buffer_chars >= options.min_chunk_size
        {
            chunks.push(build_chunk(&buffer));

            // Seed the next buffer with a small sentence overlap so context
            // carries across chunk boundaries.
            let overlap_count = ((buffer.len() as f64 * 0.3).floor() as usize).min(2);
            let tail: Vec<&Sentence<'_>> = buffer[buffer.len() - overlap_count..].to_vec();
            buffer = tail;
            buffer.push(sentence);
            buffer_chars = joined_chars(&buffer);
        } else {
            buffer.push(sentence);
            buffer_chars = candidate;
        }
    }

    if !buffer.is_empty() && buffer_chars >= options.min_chunk_size {
        chunks.push(build_chunk(&buffer));
    }

    // A document shorter than min_chunk_size still deserves one chunk,
    // otherwise valid short articles become unretrievable.
    if chunks.is_empty() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            let leading = text.chars().take_while(|c| c.is_whitespace()).count();
            chunks.push(make_chunk(
                trimmed.to_string(),
                leading,
                sentences.len().max(1),
                ChunkStrategy::Smart,
            ));
        }
    }

    chunks
}

/// Character count of the buffer once joined with single spaces.
fn joined_chars(buffer: &[&Sentence<'_>]) -> usize {
    let text_chars: usize = buffer.iter().map(|s| s.chars).sum();
    text_chars + buffer.len().saturating_sub(1)
}

fn build_chunk(buffer: &[&Sentence<'_>]) -> Chunk {
    let text = buffer
        .iter()
        .map(|s| s.text)
        .collect::<Vec<_>>()
        .join(" ");
    make_chunk(text, buffer[0].offset, buffer.len(), ChunkStrategy::Smart)
}

fn make_chunk(
    text: String,
    start_index: usize,
    element_count: usize,
    strategy: ChunkStrategy,
) -> Chunk {
    let size = text.chars().count();
    let starts_with_capital = text.chars().next().is_some_and(|c| c.is_uppercase());
    let ends_with_punctuation = matches!(text.chars().last(), Some('.' | '!' | '?'));
    let has_questions = text.contains('?');
    let word_count = text.split_whitespace().count();

    let (completeness, readability) = match strategy {
        ChunkStrategy::Smart => (
            quality::completeness_score(&text),
            quality::readability_score(&text),
        ),
        ChunkStrategy::Fallback => (50, 50),
    };

    Chunk {
        text,
        size,
        element_count,
        strategy,
        start_index,
        starts_with_capital,
        ends_with_punctuation,
        has_questions,
        word_count,
        completeness,
        readability,
    }
}

/// Split text into sentences at `.`, `!`, `?` or `…` followed by whitespace
/// (or end of text), discarding fragments of [`MIN_SENTENCE_CHARS`] or fewer.
fn split_sentences(text: &str) -> Vec<Sentence<'_>> {
    let mut sentences = Vec::new();
    let mut piece_start_byte = 0usize;
    let mut piece_start_char = 0usize;
    let mut char_pos = 0usize;

    let mut iter = text.char_indices().peekable();
    while let Some((byte_index, ch)) = iter.next() {
        char_pos += 1;
        if matches!(ch, '.' | '!' | '?' | '…') {
            let at_boundary = iter
                .peek()
                .map_or(true, |&(_, next)| next.is_whitespace());
            if at_boundary {
                let end_byte = byte_index + ch.len_utf8();
                push_sentence(
                    &mut sentences,
                    text,
                    piece_start_byte,
                    end_byte,
                    piece_start_char,
                );
                piece_start_byte = end_byte;
                piece_start_char = char_pos;
            }
        }
    }

    if piece_start_byte < text.len() {
        push_sentence(
            &mut sentences,
            text,
            piece_start_byte,
            text.len(),
            piece_start_char,
        );
    }

    sentences
}

fn push_sentence<'a>(
    sentences: &mut Vec<Sentence<'a>>,
    text: &'a str,
    start_byte: usize,
    end_byte: usize,
    start_char: usize,
) {
    let raw = &text[start_byte..end_byte];
    let trimmed = raw.trim();
    let chars = trimmed.chars().count();
    if chars <= MIN_SENTENCE_CHARS {
        return;
    }

    let leading = raw.chars().take_while(|c| c.is_whitespace()).count();
    sentences.push(Sentence {
        text: trimmed,
        offset: start_char + leading,
        chars,
    });
}

/// Word-bucket fallback: groups whitespace-delimited words into fixed-size
/// buckets and emits a chunk per bucket large enough to be useful.
fn fallback_chunks(text: &str, options: &ChunkingOptions) -> Vec<Chunk> {
    let words = split_words_with_offsets(text);
    let per_bucket = (options.chunk_size / 6).max(1);

    let mut chunks = Vec::new();
    for bucket in words.chunks(per_bucket) {
        if chunks.len() >= MAX_FALLBACK_CHUNKS {
            tracing::warn!(
                "fallback chunk limit of {} reached, remaining words dropped",
                MAX_FALLBACK_CHUNKS
            );
            break;
        }

        let joined = bucket
            .iter()
            .map(|(_, word)| *word)
            .collect::<Vec<_>>()
            .join(" ");
        if joined.chars().count() > MIN_FALLBACK_CHARS {
            chunks.push(make_chunk(
                joined,
                bucket[0].0,
                bucket.len(),
                ChunkStrategy::Fallback,
            ));
        }
    }

    chunks
}

/// Whitespace-delimited words paired with their character offsets.
fn split_words_with_offsets(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start_byte: Option<usize> = None;
    let mut start_char = 0usize;
    let mut char_pos = 0usize;

    for (byte_index, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(begin) = start_byte.take() {
                words.push((start_char, &text[begin..byte_index]));
            }
        } else if start_byte.is_none() {
            start_byte = Some(byte_index);
            start_char = char_pos;
        }
        char_pos += 1;
    }
    if let Some(begin) = start_byte {
        words.push((start_char, &text[begin..]));
    }

    words
}
