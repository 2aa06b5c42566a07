//! Document processing
//!
//! Orchestrates normalization, chunking and keyword extraction per document.
//! Each document is processed in isolation behind a deadline: a malformed,
//! empty or slow document is recorded as a failure and never aborts the
//! batch.

use crate::chunking::{self, Chunk, ChunkingOptions};
use crate::config::ProcessingConfig;
use crate::error::Result;
use crate::keywords::KeywordExtractor;
use crate::normalize::TextNormalizer;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Raw document supplied by an external content provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    pub file_name: String,

    /// Stored content: markup text or serialized content blocks
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub article_slug: Option<String>,

    #[serde(default)]
    pub category: Option<String>,
}

/// A document that survived the full processing pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedDocument {
    pub id: Uuid,
    pub file_name: String,
    pub article_slug: Option<String>,
    pub category: Option<String>,

    /// Retrieval chunks, never empty
    pub chunks: Vec<Chunk>,
    pub total_chunks: usize,

    /// Weighted keyword table, weight descending
    pub keywords: IndexMap<String, u32>,

    /// Character count of the normalized source text
    pub original_text_length: usize,

    /// Rounded mean of chunk sizes
    pub average_chunk_size: usize,

    /// Rounded mean of chunk completeness scores, 0-100
    pub quality_score: u8,

    pub processed_at: DateTime<Utc>,
}

/// Record of a skipped document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingFailure {
    pub index: usize,
    pub file_name: String,
    pub reason: String,

    /// A failure on the batch's final document ends the run silently from
    /// the caller's perspective, so it is flagged for diagnostics.
    #[serde(default)]
    pub is_last: bool,
}

/// Outcome of a batch run; failures never abort the batch
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub processed: Vec<ProcessedDocument>,
    pub failures: Vec<ProcessingFailure>,
}

/// Runs documents through normalize → chunk → keywords with per-document
/// timeout and error isolation.
pub struct DocumentProcessor {
    normalizer: TextNormalizer,
    extractor: KeywordExtractor,
    chunking: ChunkingOptions,
    min_document_chars: usize,
    document_timeout: Duration,
    yield_every: usize,
    yield_pause: Duration,
}

impl DocumentProcessor {
    pub fn new(chunking: ChunkingOptions, processing: &ProcessingConfig) -> Result<Self> {
        Ok(Self {
            normalizer: TextNormalizer::new()?,
            extractor: KeywordExtractor::new()?,
            chunking,
            min_document_chars: processing.min_document_chars,
            document_timeout: Duration::from_secs(processing.document_timeout_secs),
            yield_every: processing.yield_every,
            yield_pause: Duration::from_millis(processing.yield_pause_ms),
        })
    }

    /// Process a batch of documents sequentially, pausing periodically so a
    /// cooperative host stays responsive.
    pub async fn process_batch(&self, documents: &[RawDocument]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for (index, document) in documents.iter().enumerate() {
            if index > 0 && index % self.yield_every == 0 {
                tokio::time::sleep(self.yield_pause).await;
            }

            match self.process_document(document).await {
                Ok(processed) => {
                    tracing::debug!(
                        "processed {} ({} chunks, {} keywords)",
                        processed.file_name,
                        processed.total_chunks,
                        processed.keywords.len()
                    );
                    outcome.processed.push(processed);
                }
                Err(reason) => {
                    tracing::warn!(
                        "skipping document {} ({}): {}",
                        index,
                        document.file_name,
                        reason
                    );
                    outcome.failures.push(ProcessingFailure {
                        index,
                        file_name: document.file_name.clone(),
                        reason,
                        is_last: false,
                    });
                }
            }
        }

        if let Some(failure) = outcome.failures.last_mut() {
            if failure.index + 1 == documents.len() {
                failure.is_last = true;
            }
        }

        outcome
    }

    /// Process a single document. Failures are reported as data, matching
    /// the record kept per skipped document.
    async fn process_document(
        &self,
        document: &RawDocument,
    ) -> std::result::Result<ProcessedDocument, String> {
        let raw_chars = document.text.chars().count();
        if raw_chars < self.min_document_chars {
            return Err(format!(
                "text too short ({} chars, minimum {})",
                raw_chars, self.min_document_chars
            ));
        }

        let text = self.normalizer.normalize(&document.text);

        // Chunk on the blocking pool, raced against the per-document
        // deadline. A panic inside chunking surfaces as a join error and is
        // recorded like any other failure.
        let options = self.chunking.clone();
        let chunk_input = text.clone();
        let chunked = tokio::time::timeout(
            self.document_timeout,
            tokio::task::spawn_blocking(move || chunking::chunk_text(&chunk_input, &options)),
        )
        .await;

        let chunks = match chunked {
            Err(_) => {
                return Err(format!(
                    "chunking timed out after {}s",
                    self.document_timeout.as_secs()
                ))
            }
            Ok(Err(join_error)) => return Err(format!("chunking failed: {join_error}")),
            Ok(Ok(chunks)) => chunks,
        };

        if chunks.is_empty() {
            return Err("chunking produced no usable chunks".to_string());
        }

        let keywords = self.extractor.extract(&text);

        let total_chunks = chunks.len();
        let size_sum: usize = chunks.iter().map(|c| c.size).sum();
        let average_chunk_size = (size_sum as f64 / total_chunks as f64).round() as usize;
        let completeness_sum: u32 = chunks.iter().map(|c| c.completeness as u32).sum();
        let quality_score = (completeness_sum as f64 / total_chunks as f64).round() as u8;

        Ok(ProcessedDocument {
            id: Uuid::new_v4(),
            file_name: document.file_name.clone(),
            article_slug: document.article_slug.clone(),
            category: document.category.clone(),
            chunks,
            total_chunks,
            keywords,
            original_text_length: text.chars().count(),
            average_chunk_size,
            quality_score,
            processed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> DocumentProcessor {
        DocumentProcessor::new(ChunkingOptions::default(), &ProcessingConfig::default()).unwrap()
    }

    fn document(file_name: &str, text: &str) -> RawDocument {
        RawDocument {
            file_name: file_name.to_string(),
            text: text.to_string(),
            article_slug: None,
            category: None,
        }
    }

    fn long_article() -> String {
        "Expense reports are submitted through the finance portal each month. \
         Every report needs an itemized receipt attached before approval. \
         Approval flows through the department head and then finance. "
            .repeat(8)
    }

    #[tokio::test]
    async fn test_batch_processes_valid_documents() {
        let documents = vec![
            document("expenses.txt", &long_article()),
            document("travel.txt", &long_article()),
        ];

        let outcome = processor().process_batch(&documents).await;

        assert_eq!(outcome.processed.len(), 2);
        assert!(outcome.failures.is_empty());
        for doc in &outcome.processed {
            assert!(!doc.chunks.is_empty());
            assert_eq!(doc.total_chunks, doc.chunks.len());
            assert!(doc.average_chunk_size > 0);
            assert!(doc.original_text_length > 0);
        }
    }

    #[tokio::test]
    async fn test_short_document_skipped_with_record() {
        let documents = vec![
            document("good.txt", &long_article()),
            document("empty.txt", ""),
            document("also-good.txt", &long_article()),
        ];

        let outcome = processor().process_batch(&documents).await;

        assert_eq!(outcome.processed.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        let failure = &outcome.failures[0];
        assert_eq!(failure.index, 1);
        assert_eq!(failure.file_name, "empty.txt");
        assert!(!failure.is_last);
    }

    #[tokio::test]
    async fn test_failure_on_final_document_flagged() {
        let documents = vec![
            document("good.txt", &long_article()),
            document("broken.txt", "too short"),
        ];

        let outcome = processor().process_batch(&documents).await;

        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].is_last);
    }

    #[tokio::test]
    async fn test_keywords_derived_from_full_text() {
        let documents = vec![document("expenses.txt", &long_article())];
        let outcome = processor().process_batch(&documents).await;

        let doc = &outcome.processed[0];
        assert!(!doc.keywords.is_empty());
        assert!(doc.keywords.len() <= 20);
        // "receipt" repeats in every paragraph copy of the fixture.
        assert!(doc.keywords.keys().any(|k| k.contains("receipt")));
    }

    #[tokio::test]
    async fn test_structured_content_normalized_before_chunking() {
        let body = long_article();
        let raw = format!(r#"{{"title": "Expense guide", "content": "{}"}}"#, body.trim());
        let documents = vec![document("guide.json", &raw)];

        let outcome = processor().process_batch(&documents).await;

        assert_eq!(outcome.processed.len(), 1);
        let doc = &outcome.processed[0];
        assert!(doc.chunks[0].text.starts_with("Expense guide"));
    }

    #[tokio::test]
    async fn test_quality_score_is_mean_completeness() {
        let documents = vec![document("expenses.txt", &long_article())];
        let outcome = processor().process_batch(&documents).await;

        let doc = &outcome.processed[0];
        let mean = doc
            .chunks
            .iter()
            .map(|c| c.completeness as u32)
            .sum::<u32>() as f64
            / doc.chunks.len() as f64;
        assert_eq!(doc.quality_score, mean.round() as u8);
    }
}
