//! Fixed-size overlapping windows for anything without recognizable structure.

use sieve_core::ChunkKind;

use super::Segment;

/// Windows of `max_chars` characters, each starting `max_chars - overlap`
/// characters after the previous one, until the end of the text is covered.
pub fn window_segments(content: &str, max_chars: usize, overlap: usize) -> Vec<Segment> {
    let mut offsets: Vec<usize> = content.char_indices().map(|(offset, _)| offset).collect();
    let char_count = offsets.len();
    offsets.push(content.len());

    let window = max_chars.max(1);
    let stride = window.saturating_sub(overlap).max(1);
    let mut segments = Vec::default();
    let mut start = 0;

    loop {
        let end = (start + window).min(char_count);
        segments.push(Segment {
            start: offsets[start],
            end: offsets[end],
            kind: ChunkKind::Block,
            name: format!("block {}", segments.len() + 1),
        });
        if end >= char_count {
            break;
        }
        start += stride;
    }

    segments
}
