//! Rule boundaries for stylesheets.

use std::sync::LazyLock;

use regex::Regex;
use sieve_core::ChunkKind;

use super::{Boundary, Segment, compile_pattern, segments_from_boundaries};

/// A selector or at-rule that opens a block at the start of a line.
static TOP_LEVEL_RULE: LazyLock<Regex> =
    LazyLock::new(|| compile_pattern(r"(?m)^([^\s{}/][^{};\n]*?)\s*\{"));

/// Segments starting at each top-level rule, or `None` when fewer than
/// `min_selectors` rules are found.
pub fn rule_segments(content: &str, min_selectors: usize) -> Option<Vec<Segment>> {
    let boundaries: Vec<Boundary> = TOP_LEVEL_RULE
        .captures_iter(content)
        .filter_map(|captures| {
            let rule = captures.get(0)?;
            let selector = captures.get(1)?.as_str().trim().to_owned();
            Some((rule.start(), ChunkKind::Block, selector))
        })
        .collect();

    if boundaries.len() < min_selectors.max(1) {
        return None;
    }
    Some(segments_from_boundaries(content, boundaries))
}
