//! Integration test: document processing pipeline
//!
//! Exercises normalization, chunking and keyword extraction together with
//! realistic article data.

use cellito::chunking::{chunk_text, ChunkStrategy, ChunkingOptions};
use cellito::config::ProcessingConfig;
use cellito::processing::{DocumentProcessor, RawDocument};

fn document(file_name: &str, text: &str) -> RawDocument {
    RawDocument {
        file_name: file_name.to_string(),
        text: text.to_string(),
        article_slug: Some(file_name.trim_end_matches(".txt").to_string()),
        category: Some("handbook".to_string()),
    }
}

fn handbook_text() -> String {
    let mut text = String::new();
    for i in 0..40 {
        text.push_str(&format!(
            "Handbook section {i} describes the expense reimbursement workflow in detail. \
             Receipts must be itemized and attached before the approval deadline. \
             The department head reviews every submission within five business days. "
        ));
    }
    text
}

fn processor() -> DocumentProcessor {
    DocumentProcessor::new(ChunkingOptions::default(), &ProcessingConfig::default()).unwrap()
}

#[test]
fn test_chunk_coverage_invariant() {
    let text = handbook_text();
    let chunks = chunk_text(&text, &ChunkingOptions::default());

    assert!(!chunks.is_empty());
    let combined: String = chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    // Every sentence of the input survives into some chunk (overlap may
    // duplicate sentences, never drop them).
    for sentence in text.split(". ") {
        let sentence = sentence.trim().trim_end_matches('.');
        if sentence.chars().count() > 10 {
            assert!(
                combined.contains(sentence),
                "sentence lost during chunking: {sentence:?}"
            );
        }
    }

    for chunk in &chunks {
        assert!(!chunk.text.is_empty());
        assert_eq!(chunk.size, chunk.text.chars().count());
    }
}

#[test]
fn test_chunk_bounds() {
    let options = ChunkingOptions::default();
    let chunks = chunk_text(&handbook_text(), &options);

    // Sentence accumulation emits before crossing the hard ceiling, so no
    // multi-sentence chunk can exceed it.
    for chunk in &chunks {
        assert!(chunk.size <= options.max_chunk_size);
    }
}

#[test]
fn test_single_oversized_sentence_exceeds_ceiling() {
    // Boundary case: one sentence longer than max_chunk_size cannot be
    // split by the sentence strategy and is emitted whole.
    let giant = format!("{}.", "word ".repeat(300).trim_end());
    let options = ChunkingOptions::default();
    let chunks = chunk_text(&giant, &options);

    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].size > options.max_chunk_size);
    assert_eq!(chunks[0].strategy, ChunkStrategy::Smart);
}

#[tokio::test]
async fn test_batch_isolation_with_malformed_document() {
    let text = handbook_text();
    let documents = vec![
        document("benefits.txt", &text),
        document("expenses.txt", &text),
        document("broken.txt", ""),
        document("travel.txt", &text),
        document("parking.txt", &text),
    ];

    let outcome = processor().process_batch(&documents).await;

    assert_eq!(outcome.processed.len(), 4);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].index, 2);
    assert_eq!(outcome.failures[0].file_name, "broken.txt");
    assert!(!outcome.failures[0].is_last);
}

#[tokio::test]
async fn test_metadata_carried_through_processing() {
    let documents = vec![document("benefits.txt", &handbook_text())];
    let outcome = processor().process_batch(&documents).await;

    let doc = &outcome.processed[0];
    assert_eq!(doc.article_slug.as_deref(), Some("benefits"));
    assert_eq!(doc.category.as_deref(), Some("handbook"));
    assert_eq!(doc.total_chunks, doc.chunks.len());
    assert!(doc.quality_score <= 100);
}

#[tokio::test]
async fn test_structured_article_flattened() {
    let raw = format!(
        r#"{{"title": "Reimbursement guide", "content": [{{"text": "{}"}}]}}"#,
        handbook_text().trim()
    );
    let documents = vec![document("guide.json", &raw)];

    let outcome = processor().process_batch(&documents).await;

    assert_eq!(outcome.processed.len(), 1);
    let doc = &outcome.processed[0];
    assert!(doc.chunks[0].text.starts_with("Reimbursement guide"));
    // Markup and block structure must not leak into chunk text.
    for chunk in &doc.chunks {
        assert!(!chunk.text.contains('{'));
        assert!(!chunk.text.contains("\"text\""));
    }
}

#[tokio::test]
async fn test_keyword_tables_independent_of_batch_order() {
    let text_a = handbook_text();
    let text_b = format!(
        "Vacation requests are filed through the portal. {}",
        handbook_text()
    );

    let forward = processor()
        .process_batch(&[document("a.txt", &text_a), document("b.txt", &text_b)])
        .await;
    let reverse = processor()
        .process_batch(&[document("b.txt", &text_b), document("a.txt", &text_a)])
        .await;

    let forward_a = &forward.processed[0];
    let reverse_a = &reverse.processed[1];
    assert_eq!(forward_a.keywords, reverse_a.keywords);
    assert!(forward_a.keywords.len() <= 20);
    for weight in forward_a.keywords.values() {
        assert!(*weight >= 2);
    }
}
