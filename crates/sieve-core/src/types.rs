use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Project snapshot handed to the optimizer: path to raw text.
///
/// Ordered so every pass over the project is deterministic.
pub type ProjectFiles = BTreeMap<String, String>;

/// Estimate the downstream token cost of `text` as `ceil(chars / 4)`.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Structural category of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    /// A function or top-level binding
    Function,
    /// A class declaration
    Class,
    /// A UI component declaration
    Component,
    /// A structural or fixed-size block
    Block,
    /// The whole file
    Full,
}

/// A contiguous slice of one source file tagged with an importance score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Identifier unique within one chunking call (`path#index`)
    pub id: String,
    /// Path of the file the chunk was cut from
    pub file_path: String,
    /// Chunk text
    pub content: String,
    /// First line covered (1-indexed)
    pub start_line: usize,
    /// Last line covered (1-indexed, inclusive)
    pub end_line: usize,
    /// Structural category
    pub kind: ChunkKind,
    /// Importance in `0..=100`
    pub importance: u8,
    /// Module specifiers imported by the file
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    /// Names exported by the file
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
}

/// A relevance record for one project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredFile {
    /// Project-relative path
    pub path: String,
    /// Raw file text
    pub content: String,
    /// Relevance score (unbounded lexical, fused after embedding re-scoring)
    pub score: f64,
}

impl ScoredFile {
    /// Create a new scored file
    pub fn new(path: impl Into<String>, content: impl Into<String>, score: f64) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            score,
        }
    }

    /// Estimated token cost of the whole file
    pub fn tokens(&self) -> usize {
        estimate_tokens(&self.content)
    }
}

/// How the final context is represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Selected files returned whole
    #[default]
    Full,
    /// Greedily chosen chunks of the selected files
    Chunked,
    /// Degenerate best effort: nothing fit whole or chunked
    Filtered,
}

impl fmt::Display for Strategy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Full => "full",
            Self::Chunked => "chunked",
            Self::Filtered => "filtered",
        })
    }
}

/// Caller hint controlling how many files and how much budget selection may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// One-line tweaks
    Trivial,
    /// Small, focused edits
    Simple,
    /// Multi-file changes
    #[default]
    Moderate,
    /// Architecture-level work
    Complex,
}

impl FromStr for Complexity {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "trivial" => Ok(Self::Trivial),
            "simple" => Ok(Self::Simple),
            "moderate" => Ok(Self::Moderate),
            "complex" => Ok(Self::Complex),
            other => Err(Error::Config(format!("unknown complexity tier: {other}"))),
        }
    }
}

/// Per-call options for `optimize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeOptions {
    /// Hard token budget for the returned context
    pub max_tokens: usize,
    /// Whether to re-score the top candidates with embeddings
    pub use_embeddings: bool,
    /// Complexity tier of the request
    pub complexity: Complexity,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            max_tokens: 8_000,
            use_embeddings: false,
            complexity: Complexity::default(),
        }
    }
}

/// The bounded context payload handed to the downstream agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizedContext {
    /// Selected files, most relevant first
    ///
    /// In a `chunked` context these records carry path and score only, with
    /// empty `content`; the selected text is in `chunks`.
    pub relevant_files: Vec<ScoredFile>,
    /// Accepted chunks when the strategy is `chunked`
    pub chunks: Vec<Chunk>,
    /// Token estimate of the representation actually returned
    pub total_tokens: usize,
    /// Representation tag
    pub strategy: Strategy,
}

impl OptimizedContext {
    /// Whether nothing was selected
    pub fn is_empty(&self) -> bool {
        self.relevant_files.is_empty() && self.chunks.is_empty()
    }

    /// Render the payload as prompt text, one header per file or chunk.
    pub fn render(&self) -> String {
        if self.strategy == Strategy::Chunked {
            self.chunks
                .iter()
                .map(|chunk| {
                    format!(
                        "// File: {} (lines {}-{})\n{}\n",
                        chunk.file_path, chunk.start_line, chunk.end_line, chunk.content
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            self.relevant_files
                .iter()
                .map(|file| format!("// File: {}\n{}\n", file.path, file.content))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}
