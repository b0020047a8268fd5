//! Reassembling file text from chunks.

use sieve_core::Chunk;

/// Concatenate chunks in line order.
///
/// When a chunk starts on or before the last line already emitted, the
/// overlapping line count is trimmed from its start. Non-overlapping chunk
/// sets round-trip exactly; overlapping fixed-size windows round-trip only
/// approximately because windows may cut lines in the middle.
pub fn reconstruct(chunks: &[Chunk]) -> String {
    let mut ordered: Vec<&Chunk> = chunks.iter().collect();
    ordered.sort_by_key(|chunk| (chunk.start_line, chunk.end_line));

    let mut text = String::default();
    let mut last_line: Option<usize> = None;

    for chunk in ordered {
        match last_line {
            Some(emitted) if chunk.start_line <= emitted => {
                let overlap = emitted - chunk.start_line + 1;
                text.extend(chunk.content.split_inclusive('\n').skip(overlap));
            }
            _ => text.push_str(&chunk.content),
        }
        last_line = Some(last_line.map_or(chunk.end_line, |emitted| emitted.max(chunk.end_line)));
    }

    text
}
