//! Chunking behavior on realistic web project files.

#![cfg(test)]

use sieve_context::chunking::{
    Chunker, FULL_IMPORTANCE, GENERIC_IMPORTANCE, MARKUP_FULL_IMPORTANCE,
};
use sieve_context::{chunk_file, reconstruct};
use sieve_core::{ChunkKind, ChunkingConfig};

/// A component body of roughly `chars` characters.
fn component(name: &str, chars: usize) -> String {
    let mut body = format!("export function {name}() {{\n  const items = [];\n");
    while body.len() < chars {
        body.push_str("  items.push(<li className=\"entry\">An entry in the list</li>);\n");
    }
    body.push_str("  return <ul>{items}</ul>;\n}\n\n");
    body
}

/// A stylesheet with one rule per selector, each `declarations` lines long.
fn stylesheet(selectors: &[&str], declarations: usize) -> String {
    selectors
        .iter()
        .map(|selector| {
            format!(
                "{selector} {{\n{}}}\n\n",
                "  color: #333333;\n".repeat(declarations)
            )
        })
        .collect()
}

fn app_source() -> String {
    let mut source = String::from("import React from 'react';\nimport './styles.css';\n\n");
    source.push_str(&component("Header", 2_400));
    source.push_str(&component("App", 2_400));
    source
}

#[test]
fn test_small_file_is_one_full_chunk() {
    let content = "body { margin: 0; }\n";
    let chunks = chunk_file("styles.css", content);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].kind, ChunkKind::Full);
    assert_eq!(chunks[0].importance, FULL_IMPORTANCE);
    assert_eq!(reconstruct(&chunks), content);
}

#[test]
fn test_empty_file_still_yields_a_chunk() {
    let chunks = chunk_file("empty.ts", "");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].kind, ChunkKind::Full);
}

#[test]
fn test_app_with_two_components() {
    let source = app_source();
    assert!((4_500..6_000).contains(&source.len()));

    let chunks = chunk_file("App.tsx", &source);
    assert_eq!(chunks.len(), 2);
    for chunk in &chunks {
        assert_eq!(chunk.kind, ChunkKind::Component);
        assert!(chunk.importance >= 50);
        assert_eq!(chunk.imports, vec!["react", "./styles.css"]);
    }
    assert!(chunks[1].importance > chunks[0].importance);
    assert_eq!(reconstruct(&chunks), source);
}

#[test]
fn test_script_declarations() {
    let mut source = String::from("const API = '/api';\n\n");
    source.push_str(&"// filler line for the api client module\n".repeat(30));
    source.push_str("class Client {\n  constructor() {}\n}\n\n");
    source.push_str(&"// more filler for the helpers section here\n".repeat(30));
    source.push_str("export async function fetchItems() {\n  return fetch(API);\n}\n");

    let chunks = chunk_file("api.js", &source);
    let kinds: Vec<ChunkKind> = chunks.iter().map(|chunk| chunk.kind).collect();
    assert_eq!(
        kinds,
        vec![ChunkKind::Function, ChunkKind::Class, ChunkKind::Function]
    );
    assert_eq!(chunks[2].exports, vec!["fetchItems"]);
    assert_eq!(reconstruct(&chunks), source);
}

#[test]
fn test_unknown_extension_uses_overlapping_windows() {
    let chunker = Chunker::new(ChunkingConfig {
        max_chunk_size: 100,
        chunk_overlap: 20,
        ..ChunkingConfig::default()
    });
    let content = "line of plain notes\n".repeat(15);
    let chunks = chunker.chunk_file("NOTES.md", &content);

    assert!(chunks.len() > 1);
    for (chunk, next) in chunks.iter().zip(chunks.iter().skip(1)) {
        assert_eq!(chunk.kind, ChunkKind::Block);
        assert_eq!(chunk.importance, GENERIC_IMPORTANCE);
        assert!(next.start_line <= chunk.end_line);
    }
}

#[test]
fn test_large_markup_splits_into_sections() {
    let filler = "<p>Some paragraph text for the landing page layout.</p>\n".repeat(30);
    let html = format!(
        "<!DOCTYPE html>\n<html>\n<body>\n<header>\n{filler}</header>\n<main>\n{filler}</main>\n<footer>\n{filler}</footer>\n</body>\n</html>\n"
    );
    assert!(html.len() > 4_000);

    let chunks = chunk_file("index.html", &html);
    assert_eq!(chunks.len(), 3);
    assert!(chunks.iter().all(|chunk| chunk.kind == ChunkKind::Block));
    assert!(chunks.iter().all(|chunk| chunk.importance == 70));
    assert_eq!(reconstruct(&chunks), html);
}

#[test]
fn test_medium_markup_stays_whole() {
    let html = "<p>Welcome to the landing page of the product.</p>\n".repeat(60);
    assert!((2_001..=4_000).contains(&html.len()));

    let chunks = chunk_file("index.html", &html);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].kind, ChunkKind::Full);
    assert_eq!(chunks[0].importance, MARKUP_FULL_IMPORTANCE);
    assert_eq!(chunks[0].content, html);
}

#[test]
fn test_stylesheet_splits_at_rules() {
    let css = stylesheet(&[".header", ".nav", ".footer", ".card"], 40);
    assert!(css.len() > 2_000);

    let chunks = chunk_file("styles.css", &css);
    assert_eq!(chunks.len(), 4);
    assert!(chunks[0].content.starts_with(".header {"));
    assert!(chunks[3].content.starts_with(".card {"));
    assert!(chunks.iter().all(|chunk| chunk.kind == ChunkKind::Block));
    for (chunk, next) in chunks.iter().zip(chunks.iter().skip(1)) {
        assert_eq!(next.start_line, chunk.end_line + 1);
    }
    assert_eq!(reconstruct(&chunks), css);
}

#[test]
fn test_stylesheet_with_few_rules_uses_windows() {
    let css = stylesheet(&[".header", ".footer"], 70);
    assert!(css.len() > 2_000);

    let chunks = chunk_file("styles.scss", &css);
    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|chunk| chunk.importance == GENERIC_IMPORTANCE));
    assert!(chunks[1].start_line <= chunks[0].end_line);
}
