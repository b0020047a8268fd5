//! `sieve`: pick the slices of a web project that fit a request's token budget.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        reason = "Test allows"
    )
)]

use std::fs;
use std::io::{Write as _, stderr, stdout};
use std::path::Path;

use anyhow::{Context as _, Result};
use clap::Parser as _;
use sieve_context::{Chunker, ContextOptimizer};
use sieve_core::{OptimizeOptions, OptimizerConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

mod cli;
mod project;

use cli::{Cli, Commands, OutputFormat};
use project::load_project;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "sieve=info".into()))
        .with(fmt::layer().with_writer(stderr))
        .init();

    let cli = Cli::parse();
    let config = OptimizerConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Select {
            query,
            project,
            max_tokens,
            complexity,
            embeddings,
            format,
            max_file_bytes,
        } => {
            let options = OptimizeOptions {
                max_tokens,
                use_embeddings: embeddings,
                complexity,
            };
            handle_select(config, &query, &project, options, format, max_file_bytes).await?;
        }
        Commands::Chunk { file } => handle_chunk(&config, &file)?,
        Commands::Config { write } => handle_config(&config, write.as_deref())?,
    }

    Ok(())
}

async fn handle_select(
    config: OptimizerConfig,
    query: &str,
    project: &Path,
    options: OptimizeOptions,
    format: OutputFormat,
    max_file_bytes: u64,
) -> Result<()> {
    let files = load_project(project, max_file_bytes)?;
    info!("Loaded {} files from {}", files.len(), project.display());

    let optimizer: ContextOptimizer = ContextOptimizer::try_from(config)?;
    let context = optimizer.optimize(query, &files, options).await;

    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&context)?,
        OutputFormat::Text => context.render(),
    };
    write_stdout(&output)
}

fn handle_chunk(config: &OptimizerConfig, file: &Path) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let chunker = Chunker::new(config.chunking.clone());
    let chunks = chunker.chunk_file(&file.to_string_lossy(), &content);
    info!("Split {} into {} chunks", file.display(), chunks.len());
    write_stdout(&serde_json::to_string_pretty(&chunks)?)
}

fn handle_config(config: &OptimizerConfig, write: Option<&Path>) -> Result<()> {
    if let Some(path) = write {
        config.save_to_file(path)?;
        info!("Configuration written to {}", path.display());
        return Ok(());
    }
    write_stdout(&toml::to_string_pretty(config)?)
}

fn write_stdout(text: &str) -> Result<()> {
    let mut handle = stdout().lock();
    handle.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        handle.write_all(b"\n")?;
    }
    handle.flush()?;
    Ok(())
}
