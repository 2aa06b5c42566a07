use crate::config::Config;
use crate::error::{CellitoError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_chunking(config, &mut errors);
        Self::validate_processing(config, &mut errors);
        Self::validate_search(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CellitoError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_chunking(config: &Config, errors: &mut Vec<ValidationError>) {
        let chunking = &config.chunking;

        if chunking.chunk_size == 0 {
            errors.push(ValidationError::new(
                "chunking.chunk_size",
                "Chunk size must be greater than 0",
            ));
        }

        if chunking.min_chunk_size == 0 {
            errors.push(ValidationError::new(
                "chunking.min_chunk_size",
                "Minimum chunk size must be greater than 0",
            ));
        }

        if chunking.min_chunk_size >= chunking.max_chunk_size {
            errors.push(ValidationError::new(
                "chunking.min_chunk_size",
                format!(
                    "Minimum chunk size {} must be below maximum {}",
                    chunking.min_chunk_size, chunking.max_chunk_size
                ),
            ));
        }

        if chunking.chunk_size > chunking.max_chunk_size {
            errors.push(ValidationError::new(
                "chunking.chunk_size",
                format!(
                    "Chunk size {} must not exceed maximum {}",
                    chunking.chunk_size, chunking.max_chunk_size
                ),
            ));
        }

        if chunking.overlap >= chunking.chunk_size {
            errors.push(ValidationError::new(
                "chunking.overlap",
                format!(
                    "Overlap {} must be below chunk size {}",
                    chunking.overlap, chunking.chunk_size
                ),
            ));
        }
    }

    fn validate_processing(config: &Config, errors: &mut Vec<ValidationError>) {
        let processing = &config.processing;

        if processing.min_document_chars == 0 {
            errors.push(ValidationError::new(
                "processing.min_document_chars",
                "Minimum document length must be greater than 0",
            ));
        }

        if processing.document_timeout_secs == 0 {
            errors.push(ValidationError::new(
                "processing.document_timeout_secs",
                "Document timeout must be greater than 0",
            ));
        }

        if processing.yield_every == 0 {
            errors.push(ValidationError::new(
                "processing.yield_every",
                "Yield interval must be greater than 0",
            ));
        }
    }

    fn validate_search(config: &Config, errors: &mut Vec<ValidationError>) {
        let search = &config.search;

        if search.max_chunks == 0 {
            errors.push(ValidationError::new(
                "search.max_chunks",
                "Maximum chunk count must be greater than 0",
            ));
        }

        if search.history_limit == 0 {
            errors.push(ValidationError::new(
                "search.history_limit",
                "History limit must be greater than 0",
            ));
        }
    }
}
