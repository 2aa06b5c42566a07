//! Cellito - Retrieval core for the intranet knowledge assistant
//!
//! An in-memory retrieval-augmented-generation pipeline: normalizes stored
//! article content, chunks it into retrieval-sized segments, extracts
//! keywords, scores chunk relevance against free-text queries, and assembles
//! a grounding context block for answer generation.

pub mod chunking;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod keywords;
pub mod normalize;
pub mod processing;
pub mod scoring;

pub use error::{CellitoError, Result};
