//! Declaration boundaries for component and script sources.

use std::sync::LazyLock;

use regex::Regex;
use sieve_core::ChunkKind;

use super::{Boundary, Segment, compile_pattern, segments_from_boundaries};

/// Top-level capitalized declarations, optionally exported.
static COMPONENT_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(
        r"(?m)^(?:export\s+(?:default\s+)?)?(?:function|const|class)\s+([A-Z][A-Za-z0-9_]*)",
    )
});

/// Top-level functions, bindings and classes, optionally exported or async.
static SCRIPT_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(
        r"(?m)^(?:export\s+(?:default\s+)?)?(?:async\s+)?(function|const|class)\s+([A-Za-z_$][\w$]*)",
    )
});

/// Segments starting at each top-level component declaration, or `None` if there are none.
pub fn component_segments(content: &str) -> Option<Vec<Segment>> {
    let boundaries: Vec<Boundary> = COMPONENT_DECLARATION
        .captures_iter(content)
        .filter_map(|captures| {
            let declaration = captures.get(0)?;
            let name = captures.get(1)?.as_str().to_owned();
            Some((declaration.start(), ChunkKind::Component, name))
        })
        .collect();
    (!boundaries.is_empty()).then(|| segments_from_boundaries(content, boundaries))
}

/// Segments starting at each top-level script declaration, or `None` if there are none.
pub fn script_segments(content: &str) -> Option<Vec<Segment>> {
    let boundaries: Vec<Boundary> = SCRIPT_DECLARATION
        .captures_iter(content)
        .filter_map(|captures| {
            let declaration = captures.get(0)?;
            let kind = if captures.get(1)?.as_str() == "class" {
                ChunkKind::Class
            } else {
                ChunkKind::Function
            };
            let name = captures.get(2)?.as_str().to_owned();
            Some((declaration.start(), kind, name))
        })
        .collect();
    (!boundaries.is_empty()).then(|| segments_from_boundaries(content, boundaries))
}
