use std::path::{Path, PathBuf};

use cellito::cli::{Cli, Commands, ConfigAction};
use cellito::config::Config;
use cellito::engine::{RagEngine, SearchOptions};
use cellito::error::{CellitoError, Result};
use cellito::processing::RawDocument;

fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Handle commands
    match cli.command {
        Commands::Process { documents, json } => {
            cmd_process(cli.config, &documents, json)?;
        }
        Commands::Search {
            query,
            documents,
            limit,
            json,
        } => {
            cmd_search(cli.config, &query, &documents, limit, json)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cellito=info"));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn cmd_process(config_path: Option<PathBuf>, documents_path: &Path, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let documents = load_documents(documents_path)?;

    let mut engine = RagEngine::new(config)?;
    let runtime = build_runtime()?;
    let status = runtime.block_on(engine.initialize(documents))?;

    if json {
        let output = serde_json::to_string_pretty(&status).map_err(|e| CellitoError::Json {
            source: e,
            context: "Failed to serialize status".to_string(),
        })?;
        println!("{}", output);
        return Ok(());
    }

    if status.is_ready {
        println!("✓ Corpus ready");
        println!("  Articles: {}", status.total_articles);
        println!("  Chunks: {}", status.total_chunks);
        if let Some(size) = status.average_chunk_size {
            println!("  Average chunk size: {} chars", size);
        }
        if let Some(quality) = status.average_quality {
            println!("  Average quality: {}", quality);
        }
        if status.processing_errors > 0 {
            println!("  Skipped documents: {}", status.processing_errors);
        }
    } else {
        println!(
            "✗ Processing failed: {}",
            status.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}

fn cmd_search(
    config_path: Option<PathBuf>,
    query: &str,
    documents_path: &Path,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let documents = load_documents(documents_path)?;

    let max_chunks = limit.unwrap_or(config.search.max_chunks);
    let mut engine = RagEngine::new(config)?;
    let runtime = build_runtime()?;
    let status = runtime.block_on(engine.initialize(documents))?;

    if !status.is_ready {
        println!(
            "✗ Could not build corpus: {}",
            status.error.as_deref().unwrap_or("unknown error")
        );
        return Ok(());
    }

    let options = SearchOptions {
        max_chunks,
        save_to_history: false,
    };
    let result = engine.search(query, &options);

    if json {
        let output = serde_json::to_string_pretty(&result).map_err(|e| CellitoError::Json {
            source: e,
            context: "Failed to serialize search result".to_string(),
        })?;
        println!("{}", output);
        return Ok(());
    }

    if !result.success {
        println!(
            "No results: {}",
            result.message.as_deref().unwrap_or("unknown reason")
        );
        return Ok(());
    }

    if let Some(context) = &result.context {
        println!("{}", context);
    }
    println!();
    println!(
        "Found {} chunks across {} articles (average score {})",
        result.total_chunks_found,
        result.relevant_articles.len(),
        result.avg_score.unwrap_or(0)
    );
    println!("Sources: {}", result.relevant_articles.join(", "));

    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let json = serde_json::to_string_pretty(&config).map_err(|e| CellitoError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;
            println!("{}", json);
        }
        ConfigAction::Validate { file } => {
            let path = match file {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = Config::default_path()?;

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| CellitoError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            let config = Config::default();
            config.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'cellito config init' to create one."
        );
        return Ok(Config::default());
    }

    Config::load(&path)
}

fn load_documents(path: &Path) -> Result<Vec<RawDocument>> {
    let content = std::fs::read_to_string(path).map_err(|e| CellitoError::Io {
        source: e,
        context: format!("Failed to read documents file: {}", path.display()),
    })?;

    serde_json::from_str(&content).map_err(|e| CellitoError::Json {
        source: e,
        context: format!("Failed to parse documents file: {}", path.display()),
    })
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| CellitoError::Io {
        source: e,
        context: "Failed to create tokio runtime".to_string(),
    })
}
