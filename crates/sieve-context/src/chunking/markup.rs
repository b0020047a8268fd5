//! Structural section boundaries for HTML documents.

use std::sync::LazyLock;

use regex::Regex;
use sieve_core::ChunkKind;

use super::{Boundary, Segment, compile_pattern, segments_from_boundaries};

static STRUCTURAL_TAG: LazyLock<Regex> =
    LazyLock::new(|| compile_pattern(r"(?i)<(header|nav|main|section|footer)\b"));

/// Segments starting at each structural tag, or `None` if the document has none.
pub fn section_segments(content: &str) -> Option<Vec<Segment>> {
    let boundaries: Vec<Boundary> = STRUCTURAL_TAG
        .captures_iter(content)
        .filter_map(|captures| {
            let tag = captures.get(0)?;
            let name = captures.get(1)?.as_str().to_ascii_lowercase();
            Some((tag.start(), ChunkKind::Block, name))
        })
        .collect();
    (!boundaries.is_empty()).then(|| segments_from_boundaries(content, boundaries))
}
