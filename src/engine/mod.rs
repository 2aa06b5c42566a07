//! Search orchestration and corpus lifecycle
//!
//! `RagEngine` owns the processed corpus, search history and status. It is
//! constructed once per application session and passed by handle to
//! consumers; status changes are observable through a watch channel at the
//! boundary only.

use crate::chunking::Chunk;
use crate::config::{Config, SearchConfig};
use crate::error::{CellitoError, Result};
use crate::processing::{DocumentProcessor, ProcessedDocument, RawDocument};
use crate::scoring::score_chunk;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    /// No corpus loaded
    Uninitialized,
    /// A corpus build is in flight
    Initializing,
    /// Corpus loaded, searches will run
    Ready,
    /// The last initialization failed; the message is kept for display
    Error,
}

/// Snapshot of corpus health for display
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    pub total_articles: usize,
    pub total_chunks: usize,
    pub is_ready: bool,
    pub from_cache: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub processing_errors: usize,
    pub average_chunk_size: Option<usize>,
    pub average_quality: Option<u8>,
}

/// Where a matched chunk came from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSource {
    pub file_name: String,
    pub article_slug: Option<String>,
    pub category: Option<String>,
    pub total_chunks: usize,
}

/// A chunk matched against a query; produced and consumed within one search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevantChunk {
    pub chunk: Chunk,
    pub score: u32,
    pub source: ChunkSource,
    pub chunk_index: usize,
    pub doc_index: usize,
}

/// Outcome of a full search call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub success: bool,
    pub query: String,
    pub context: Option<String>,
    pub relevant_chunks: Vec<RelevantChunk>,
    pub relevant_articles: Vec<String>,
    pub total_chunks_found: usize,
    pub searched_articles: usize,
    pub avg_score: Option<u32>,
    pub timestamp: DateTime<Utc>,
    pub message: Option<String>,
}

impl SearchResult {
    fn failure(query: &str, message: &str, searched_articles: usize) -> Self {
        Self {
            success: false,
            query: query.to_string(),
            context: None,
            relevant_chunks: Vec::new(),
            relevant_articles: Vec::new(),
            total_chunks_found: 0,
            searched_articles,
            avg_score: None,
            timestamp: Utc::now(),
            message: Some(message.to_string()),
        }
    }
}

/// Options for a single search call
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum number of chunks returned
    pub max_chunks: usize,
    /// Record the result in the engine's search history
    pub save_to_history: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_chunks: 5,
            save_to_history: true,
        }
    }
}

/// In-memory retrieval engine over a corpus of processed documents.
pub struct RagEngine {
    processor: DocumentProcessor,
    search_config: SearchConfig,
    corpus: Vec<ProcessedDocument>,
    state: EngineState,
    status: EngineStatus,
    history: Vec<SearchResult>,
    last_result: Option<SearchResult>,
    status_tx: watch::Sender<EngineStatus>,
}

impl RagEngine {
    pub fn new(config: Config) -> Result<Self> {
        let processor = DocumentProcessor::new(config.chunking.clone(), &config.processing)?;
        let status = EngineStatus::default();
        let (status_tx, _) = watch::channel(status.clone());

        Ok(Self {
            processor,
            search_config: config.search,
            corpus: Vec::new(),
            state: EngineState::Uninitialized,
            status,
            history: Vec::new(),
            last_result: None,
            status_tx,
        })
    }

    /// Subscribe to status changes. Intended for UI boundaries; the core
    /// itself never reacts to its own notifications.
    pub fn subscribe(&self) -> watch::Receiver<EngineStatus> {
        self.status_tx.subscribe()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn status(&self) -> &EngineStatus {
        &self.status
    }

    pub fn corpus(&self) -> &[ProcessedDocument] {
        &self.corpus
    }

    pub fn history(&self) -> &[SearchResult] {
        &self.history
    }

    pub fn last_result(&self) -> Option<&SearchResult> {
        self.last_result.as_ref()
    }

    fn set_status(&mut self, state: EngineState, status: EngineStatus) {
        self.state = state;
        self.status = status;
        self.status_tx.send_replace(self.status.clone());
    }

    /// Build the corpus from raw documents.
    ///
    /// Returns `Err` only on reentrant invocation while a build is already
    /// in flight. Processing failures are surfaced through the returned
    /// status, never as errors.
    pub async fn initialize(&mut self, documents: Vec<RawDocument>) -> Result<EngineStatus> {
        if self.state == EngineState::Initializing {
            return Err(CellitoError::InitializationInProgress);
        }

        self.set_status(EngineState::Initializing, EngineStatus::default());
        tracing::info!("initializing corpus from {} documents", documents.len());

        if documents.is_empty() {
            return Ok(self.fail_initialization("no documents supplied", 0));
        }

        let outcome = self.processor.process_batch(&documents).await;

        if outcome.processed.is_empty() {
            return Ok(self.fail_initialization(
                "no documents could be processed",
                outcome.failures.len(),
            ));
        }

        let total_articles = outcome.processed.len();
        let total_chunks: usize = outcome.processed.iter().map(|d| d.total_chunks).sum();
        let size_sum: usize = outcome
            .processed
            .iter()
            .map(|d| d.average_chunk_size)
            .sum();
        let quality_sum: u32 = outcome
            .processed
            .iter()
            .map(|d| d.quality_score as u32)
            .sum();

        self.corpus = outcome.processed;
        self.set_status(
            EngineState::Ready,
            EngineStatus {
                total_articles,
                total_chunks,
                is_ready: true,
                from_cache: false,
                last_updated: Some(Utc::now()),
                error: None,
                processing_errors: outcome.failures.len(),
                average_chunk_size: Some(
                    (size_sum as f64 / total_articles as f64).round() as usize
                ),
                average_quality: Some((quality_sum as f64 / total_articles as f64).round() as u8),
            },
        );

        tracing::info!(
            "corpus ready: {} articles, {} chunks, {} failures",
            total_articles,
            total_chunks,
            self.status.processing_errors
        );

        Ok(self.status.clone())
    }

    fn fail_initialization(&mut self, message: &str, processing_errors: usize) -> EngineStatus {
        tracing::error!("initialization failed: {}", message);
        self.corpus.clear();
        self.set_status(
            EngineState::Error,
            EngineStatus {
                error: Some(message.to_string()),
                processing_errors,
                ..EngineStatus::default()
            },
        );
        self.status.clone()
    }

    /// Adopt an externally cached corpus without reprocessing.
    pub fn restore(&mut self, corpus: Vec<ProcessedDocument>) -> EngineStatus {
        let total_articles = corpus.len();
        let total_chunks: usize = corpus.iter().map(|d| d.total_chunks).sum();
        tracing::info!(
            "restoring cached corpus: {} articles, {} chunks",
            total_articles,
            total_chunks
        );

        self.corpus = corpus;
        self.set_status(
            EngineState::Ready,
            EngineStatus {
                total_articles,
                total_chunks,
                is_ready: true,
                from_cache: true,
                last_updated: Some(Utc::now()),
                ..EngineStatus::default()
            },
        );
        self.status.clone()
    }

    /// Clear corpus, history and status, returning to the uninitialized
    /// state.
    pub fn reset(&mut self) {
        self.corpus.clear();
        self.history.clear();
        self.last_result = None;
        self.set_status(EngineState::Uninitialized, EngineStatus::default());
        tracing::info!("engine state reset");
    }

    /// Rank the corpus's chunks against a query.
    ///
    /// Matches below the configured score threshold are dropped; the rest
    /// are sorted by score descending and truncated to `max_chunks`.
    pub fn find_relevant_chunks(&self, query: &str, max_chunks: usize) -> Vec<RelevantChunk> {
        let mut matches: Vec<RelevantChunk> = Vec::new();

        for (doc_index, document) in self.corpus.iter().enumerate() {
            for (chunk_index, chunk) in document.chunks.iter().enumerate() {
                let score = score_chunk(query, chunk, document);
                if score > 0 {
                    matches.push(RelevantChunk {
                        chunk: chunk.clone(),
                        score,
                        source: ChunkSource {
                            file_name: document.file_name.clone(),
                            article_slug: document.article_slug.clone(),
                            category: document.category.clone(),
                            total_chunks: document.total_chunks,
                        },
                        chunk_index,
                        doc_index,
                    });
                }
            }
        }

        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches.retain(|m| m.score >= self.search_config.min_score);
        matches.truncate(max_chunks);
        matches
    }

    /// Full search: rank chunks, assemble the grounding context, record the
    /// result.
    pub fn search(&mut self, query: &str, options: &SearchOptions) -> SearchResult {
        if self.corpus.is_empty() {
            tracing::warn!("search before initialization: {:?}", query);
            let result =
                SearchResult::failure(query, "knowledge base is not initialized", 0);
            if options.save_to_history {
                self.push_history(result.clone());
            }
            return result;
        }

        let matches = self.find_relevant_chunks(query, options.max_chunks);

        if matches.is_empty() {
            tracing::debug!("no relevant chunks for {:?}", query);
            let result = SearchResult::failure(
                query,
                "no relevant content found for this query",
                self.corpus.len(),
            );
            if options.save_to_history {
                self.push_history(result.clone());
            }
            return result;
        }

        let context = build_context(&matches);
        let mut relevant_articles: Vec<String> = Vec::new();
        for matched in &matches {
            if !relevant_articles.contains(&matched.source.file_name) {
                relevant_articles.push(matched.source.file_name.clone());
            }
        }
        let score_sum: u32 = matches.iter().map(|m| m.score).sum();
        let avg_score = (score_sum as f64 / matches.len() as f64).round() as u32;

        let result = SearchResult {
            success: true,
            query: query.to_string(),
            context: Some(context),
            total_chunks_found: matches.len(),
            relevant_chunks: matches,
            relevant_articles,
            searched_articles: self.corpus.len(),
            avg_score: Some(avg_score),
            timestamp: Utc::now(),
            message: None,
        };

        self.last_result = Some(result.clone());
        if options.save_to_history {
            self.push_history(result.clone());
        }

        result
    }

    fn push_history(&mut self, result: SearchResult) {
        self.history.insert(0, result);
        self.history.truncate(self.search_config.history_limit);
    }
}

/// Assemble the human-readable context block: matches grouped by source
/// document in rank order, each chunk annotated with its position and score.
fn build_context(matches: &[RelevantChunk]) -> String {
    let mut order: Vec<&str> = Vec::new();
    for matched in matches {
        if !order.contains(&matched.source.file_name.as_str()) {
            order.push(&matched.source.file_name);
        }
    }

    let mut sections: Vec<String> = Vec::new();
    for file_name in order {
        let mut section = format!("Source: {file_name}\n");
        for matched in matches.iter().filter(|m| m.source.file_name == file_name) {
            section.push_str(&format!(
                "\n[Chunk {} of {} | score {}]\n{}\n",
                matched.chunk_index + 1,
                matched.source.total_chunks,
                matched.score,
                matched.chunk.text
            ));
        }
        sections.push(section);
    }

    sections.join("\n---\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(file_name: &str, text: &str) -> RawDocument {
        RawDocument {
            file_name: file_name.to_string(),
            text: text.to_string(),
            article_slug: None,
            category: None,
        }
    }

    fn policy_corpus() -> Vec<RawDocument> {
        vec![
            document(
                "policy.txt",
                "Refunds are processed within 30 days. Contact support for help. Refunds require a receipt.",
            ),
            document(
                "parking.txt",
                "Parking spaces are assigned through the facilities portal every quarter without exceptions.",
            ),
        ]
    }

    async fn ready_engine() -> RagEngine {
        let mut engine = RagEngine::new(Config::default()).unwrap();
        let status = engine.initialize(policy_corpus()).await.unwrap();
        assert!(status.is_ready);
        engine
    }

    #[tokio::test]
    async fn test_initialize_builds_corpus() {
        let engine = ready_engine().await;
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.status().total_articles, 2);
        assert!(engine.status().total_chunks >= 2);
        assert!(engine.status().error.is_none());
        assert!(!engine.status().from_cache);
    }

    #[tokio::test]
    async fn test_initialize_with_no_documents_fails_via_status() {
        let mut engine = RagEngine::new(Config::default()).unwrap();
        let status = engine.initialize(Vec::new()).await.unwrap();
        assert!(!status.is_ready);
        assert!(status.error.is_some());
        assert_eq!(engine.state(), EngineState::Error);
    }

    #[tokio::test]
    async fn test_initialize_with_only_bad_documents_fails_via_status() {
        let mut engine = RagEngine::new(Config::default()).unwrap();
        let status = engine
            .initialize(vec![document("a.txt", ""), document("b.txt", "short")])
            .await
            .unwrap();
        assert!(!status.is_ready);
        assert_eq!(status.processing_errors, 2);
        assert_eq!(engine.state(), EngineState::Error);
    }

    #[tokio::test]
    async fn test_search_end_to_end() {
        let mut engine = ready_engine().await;
        let result = engine.search("refund", &SearchOptions::default());

        assert!(result.success);
        assert!(result.total_chunks_found >= 1);
        assert_eq!(result.relevant_articles, vec!["policy.txt".to_string()]);
        assert!(result.avg_score.unwrap() > 0);

        let context = result.context.unwrap();
        assert!(context.contains("Source: policy.txt"));
        assert!(context.contains("Refunds"));
        assert!(context.contains("score"));
    }

    #[tokio::test]
    async fn test_search_threshold_and_ordering() {
        let engine = ready_engine().await;
        let matches = engine.find_relevant_chunks("refund receipt", 10);

        assert!(!matches.is_empty());
        for matched in &matches {
            assert!(matched.score >= 5);
        }
        for pair in matches.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_search_respects_max_chunks() {
        let engine = ready_engine().await;
        let matches = engine.find_relevant_chunks("portal support refunds parking", 1);
        assert!(matches.len() <= 1);
    }

    #[tokio::test]
    async fn test_search_before_initialization() {
        let mut engine = RagEngine::new(Config::default()).unwrap();
        let result = engine.search("refund", &SearchOptions::default());

        assert!(!result.success);
        assert!(result.message.unwrap().contains("not initialized"));
        assert_eq!(engine.history().len(), 1);
    }

    #[tokio::test]
    async fn test_search_with_no_matches() {
        let mut engine = ready_engine().await;
        let result = engine.search("zzzzqqqq", &SearchOptions::default());

        assert!(!result.success);
        assert!(result.message.unwrap().contains("no relevant content"));
        assert_eq!(result.searched_articles, 2);
    }

    #[tokio::test]
    async fn test_history_cap_newest_first() {
        let mut engine = ready_engine().await;
        for i in 0..60 {
            engine.search(&format!("refund {i}"), &SearchOptions::default());
        }

        assert_eq!(engine.history().len(), 50);
        assert_eq!(engine.history()[0].query, "refund 59");
    }

    #[tokio::test]
    async fn test_search_without_history() {
        let mut engine = ready_engine().await;
        let options = SearchOptions {
            save_to_history: false,
            ..SearchOptions::default()
        };
        engine.search("refund", &options);
        assert!(engine.history().is_empty());
        assert!(engine.last_result().is_some());
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let mut engine = ready_engine().await;
        engine.search("refund", &SearchOptions::default());

        engine.reset();

        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert!(!engine.status().is_ready);
        assert!(engine.corpus().is_empty());
        assert!(engine.history().is_empty());
        assert!(engine.last_result().is_none());
    }

    #[tokio::test]
    async fn test_reinitialization_replaces_corpus() {
        let mut engine = ready_engine().await;
        let first_total = engine.status().total_articles;

        let status = engine
            .initialize(vec![document(
                "only.txt",
                "Security badges must be worn visibly at all times inside every company building.",
            )])
            .await
            .unwrap();

        assert_eq!(first_total, 2);
        assert_eq!(status.total_articles, 1);
        assert_eq!(engine.corpus().len(), 1);
    }

    #[tokio::test]
    async fn test_restore_marks_from_cache() {
        let mut engine = ready_engine().await;
        let cached: Vec<_> = engine.corpus().to_vec();

        let mut fresh = RagEngine::new(Config::default()).unwrap();
        let status = fresh.restore(cached);

        assert!(status.is_ready);
        assert!(status.from_cache);
        assert_eq!(status.total_articles, 2);
        let result = fresh.search("refund", &SearchOptions::default());
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_status_subscription() {
        let mut engine = RagEngine::new(Config::default()).unwrap();
        let mut receiver = engine.subscribe();

        engine.initialize(policy_corpus()).await.unwrap();

        assert!(receiver.has_changed().unwrap());
        let status = receiver.borrow_and_update().clone();
        assert!(status.is_ready);
    }

    #[tokio::test]
    async fn test_context_groups_by_document() {
        let mut engine = RagEngine::new(Config::default()).unwrap();
        engine
            .initialize(vec![
                document(
                    "refunds-a.txt",
                    "Refunds are processed within 30 days. A refund needs a receipt attached always.",
                ),
                document(
                    "refunds-b.txt",
                    "Our refund desk handles every refund request within two business days at most.",
                ),
            ])
            .await
            .unwrap();

        let result = engine.search("refund", &SearchOptions::default());
        assert!(result.success);
        let context = result.context.unwrap();
        assert!(context.contains("Source: refunds-a.txt"));
        assert!(context.contains("Source: refunds-b.txt"));
        assert!(context.contains("---"));
    }
}
