use clap::{Parser, Subcommand, ValueEnum};
use sieve_core::Complexity;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sieve")]
#[command(about = "Select the project context that fits a token budget", long_about = None)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Select the files or chunks relevant to a request")]
    Select {
        #[arg(help = "The request the context is built for")]
        query: String,

        #[arg(short, long, default_value = ".", help = "Project root directory")]
        project: PathBuf,

        #[arg(long, default_value_t = 8_000, help = "Token budget for the context")]
        max_tokens: usize,

        #[arg(
            short,
            long,
            default_value = "moderate",
            help = "Request complexity: trivial, simple, moderate or complex"
        )]
        complexity: Complexity,

        #[arg(long, help = "Blend embedding similarity into file scores")]
        embeddings: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json, help = "Output format")]
        format: OutputFormat,

        #[arg(long, default_value_t = 1_048_576, help = "Skip files larger than this many bytes")]
        max_file_bytes: u64,
    },

    #[command(about = "Show how one file is split into chunks")]
    Chunk {
        #[arg(help = "File to split")]
        file: PathBuf,
    },

    #[command(about = "Show the effective configuration")]
    Config {
        #[arg(long, help = "Write the configuration to this path instead of stdout")]
        write: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// The context as JSON
    Json,
    /// The context rendered as prompt text
    Text,
}
