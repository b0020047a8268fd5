//! Heuristic chunking of web project sources into scored, line-addressed slices.
//!
//! Boundaries come from regular expressions rather than a parser, so
//! unconventional formatting (declarations that do not start a line, nested
//! components) is missed and falls back to coarser chunks.

mod declarations;
mod generic;
mod markup;
mod reconstruct;
mod stylesheet;
mod symbols;

use std::path::Path;

use regex::Regex;
use sieve_core::{Chunk, ChunkKind, ChunkingConfig};

pub use reconstruct::reconstruct;
pub use symbols::{extract_exports, extract_imports};

/// Identifier fragments that mark an architecturally significant declaration.
const SIGNIFICANT_NAMES: &[&str] = &["App", "Main", "Index", "Layout", "Route", "Provider"];

/// Importance given to a file that fits in one chunk.
pub const FULL_IMPORTANCE: u8 = 100;
/// Importance of a small markup file kept whole.
pub const MARKUP_FULL_IMPORTANCE: u8 = 90;
/// Importance of a structural markup section.
pub const MARKUP_SECTION_IMPORTANCE: u8 = 70;
/// Importance of a fixed-size window.
pub const GENERIC_IMPORTANCE: u8 = 50;

/// Compile a built-in pattern.
pub(crate) fn compile_pattern(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => panic!("Built-in pattern {pattern:?} is invalid: {err}"),
    }
}

/// Source family, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFamily {
    Component,
    Script,
    Stylesheet,
    Markup,
    Other,
}

impl FileFamily {
    fn of(path: &str) -> Self {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("tsx" | "jsx") => Self::Component,
            Some("ts" | "js") => Self::Script,
            Some("css" | "scss") => Self::Stylesheet,
            Some("html") => Self::Markup,
            _ => Self::Other,
        }
    }
}

/// A byte range of the file with its category and declared name.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    pub start: usize,
    pub end: usize,
    pub kind: ChunkKind,
    pub name: String,
}

/// A boundary found by a pattern: byte offset, kind and declared name.
pub(crate) type Boundary = (usize, ChunkKind, String);

/// Turn match offsets into contiguous segments covering the whole file.
///
/// Boundaries snap to the start of their line, the first segment absorbs any
/// preamble (imports, doctype) and boundaries sharing a line collapse into one.
pub(crate) fn segments_from_boundaries(content: &str, boundaries: Vec<Boundary>) -> Vec<Segment> {
    let mut starts = Vec::<Boundary>::with_capacity(boundaries.len());
    for (offset, kind, name) in boundaries {
        let line_start = content[..offset].rfind('\n').map_or(0, |newline| newline + 1);
        let line_start = if starts.is_empty() { 0 } else { line_start };
        if starts.last().is_some_and(|(previous, _, _)| *previous >= line_start) {
            continue;
        }
        starts.push((line_start, kind, name));
    }

    let ends: Vec<usize> = starts
        .iter()
        .skip(1)
        .map(|(start, _, _)| *start)
        .chain([content.len()])
        .collect();

    starts
        .into_iter()
        .zip(ends)
        .map(|((start, kind, name), end)| Segment {
            start,
            end,
            kind,
            name,
        })
        .collect()
}

/// 1-indexed line of the byte at `offset`.
fn line_at(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}

/// Line range covered by `content[start..end]`; a trailing newline does not open a new line.
pub(crate) fn line_range(content: &str, start: usize, end: usize) -> (usize, usize) {
    let start_line = line_at(content, start);
    let slice = &content[start..end];
    let mut newlines = slice.matches('\n').count();
    if newlines > 0 && slice.ends_with('\n') {
        newlines -= 1;
    }
    (start_line, start_line + newlines)
}

/// Importance of a declaration-based chunk.
fn declaration_importance(name: &str, text: &str, import_count: usize) -> u8 {
    let mut importance = 50_usize;
    if SIGNIFICANT_NAMES.iter().any(|token| name.contains(token)) {
        importance += 20;
    }
    if symbols::has_export(text) {
        importance += 15;
    }
    if text.chars().count() > 800 {
        importance += 10;
    }
    importance += (import_count * 3).min(15);
    importance.min(usize::from(FULL_IMPORTANCE)) as u8
}

/// Splits files into chunks according to their type.
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    /// Create a chunker with the given thresholds
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use
    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Split one file into chunks.
    ///
    /// Always returns at least one chunk. Imports and exports are extracted
    /// once per file and attached to every chunk.
    pub fn chunk_file(&self, path: &str, content: &str) -> Vec<Chunk> {
        let char_count = content.chars().count();
        let imports = extract_imports(content);
        let exports = extract_exports(content);
        let builder = ChunkBuilder {
            path,
            content,
            imports: &imports,
            exports: &exports,
        };

        if char_count <= self.config.max_chunk_size {
            return vec![builder.whole(0, FULL_IMPORTANCE)];
        }

        let segments = match FileFamily::of(path) {
            FileFamily::Component => declarations::component_segments(content),
            FileFamily::Script => declarations::script_segments(content),
            FileFamily::Stylesheet => {
                stylesheet::rule_segments(content, self.config.min_css_selectors)
            }
            FileFamily::Markup => {
                if char_count <= self.config.max_chunk_size * self.config.html_full_factor {
                    return vec![builder.whole(0, MARKUP_FULL_IMPORTANCE)];
                }
                return markup::section_segments(content).map_or_else(
                    || self.windows(&builder),
                    |sections| builder.build_all(sections, |_, _| MARKUP_SECTION_IMPORTANCE),
                );
            }
            FileFamily::Other => None,
        };

        match segments {
            Some(found) => builder.build_all(found, |segment, text| {
                declaration_importance(&segment.name, text, imports.len())
            }),
            None => self.windows(&builder),
        }
    }

    fn windows(&self, builder: &ChunkBuilder<'_>) -> Vec<Chunk> {
        let windows = generic::window_segments(
            builder.content,
            self.config.max_chunk_size,
            self.config.chunk_overlap,
        );
        builder.build_all(windows, |_, _| GENERIC_IMPORTANCE)
    }
}

/// Split one file with the default thresholds.
pub fn chunk_file(path: &str, content: &str) -> Vec<Chunk> {
    Chunker::default().chunk_file(path, content)
}

/// Per-file state shared by every chunk of that file.
struct ChunkBuilder<'file> {
    path: &'file str,
    content: &'file str,
    imports: &'file [String],
    exports: &'file [String],
}

impl ChunkBuilder<'_> {
    fn whole(&self, index: usize, importance: u8) -> Chunk {
        let segment = Segment {
            start: 0,
            end: self.content.len(),
            kind: ChunkKind::Full,
            name: String::new(),
        };
        self.build(index, &segment, importance)
    }

    fn build_all(
        &self,
        segments: Vec<Segment>,
        importance: impl Fn(&Segment, &str) -> u8,
    ) -> Vec<Chunk> {
        segments
            .into_iter()
            .enumerate()
            .map(|(index, segment)| {
                let text = &self.content[segment.start..segment.end];
                self.build(index, &segment, importance(&segment, text))
            })
            .collect()
    }

    fn build(&self, index: usize, segment: &Segment, importance: u8) -> Chunk {
        let (start_line, end_line) = line_range(self.content, segment.start, segment.end);
        Chunk {
            id: format!("{}#{index}", self.path),
            file_path: self.path.to_owned(),
            content: self.content[segment.start..segment.end].to_owned(),
            start_line,
            end_line,
            kind: segment.kind,
            importance,
            imports: self.imports.to_vec(),
            exports: self.exports.to_vec(),
        }
    }
}
