//! End-to-end selection over a small web project.

#![cfg(test)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sieve_context::embedding::{
    ConfiguredBackend, Embedding, EmbeddingBackend, EmbeddingProvider, OfflineBackend,
};
use sieve_context::optimizer::ContextOptimizer;
use sieve_core::{
    CacheConfig, Complexity, Error, OptimizeOptions, OptimizerConfig, ProjectFiles, Result,
    Strategy, estimate_tokens,
};
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

/// Backend whose round trip outlasts any reasonable test.
struct StalledBackend;

impl EmbeddingBackend for StalledBackend {
    fn name(&self) -> &'static str {
        "stalled"
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Embedding>> {
        sleep(Duration::from_secs(30)).await;
        Ok(texts.iter().map(|_| vec![1.0]).collect())
    }
}

const CRITICAL: &[&str] = &["index.html", "App.tsx", "main.tsx", "styles.css", "script.js"];
const ALL_TIERS: [Complexity; 4] = [
    Complexity::Trivial,
    Complexity::Simple,
    Complexity::Moderate,
    Complexity::Complex,
];

fn project() -> ProjectFiles {
    let mut files = ProjectFiles::new();
    let mut add = |path: &str, content: String| {
        files.insert(path.to_owned(), content);
    };
    add(
        "index.html",
        "<!DOCTYPE html>\n<html><body><div id=\"root\"></div></body></html>\n".to_owned(),
    );
    add(
        "src/main.tsx",
        "import App from './App';\ncreateRoot(document.getElementById('root')).render(<App />);\n"
            .to_owned(),
    );
    add(
        "src/App.tsx",
        "import Header from './components/Header';\nexport default function App() {\n  return <Header />;\n}\n"
            .to_owned(),
    );
    add(
        "src/components/Header.tsx",
        format!(
            "export function Header() {{\n{}  return <nav className=\"header\" />;\n}}\n",
            "  // navigation header links\n".repeat(20)
        ),
    );
    add(
        "src/components/Footer.tsx",
        "export function Footer() {\n  return <footer>Contact us</footer>;\n}\n".to_owned(),
    );
    add(
        "src/components/PricingTable.tsx",
        "export function PricingTable() {\n  const prices = { monthly: 10, yearly: 100 };\n  return <table />;\n}\n"
            .to_owned(),
    );
    add("src/styles.css", ".header { display: flex; }\n".to_owned());
    add(
        "node_modules/react/index.js",
        "module.exports = require('./react.production.js'); // pricing header navigation\n"
            .to_owned(),
    );
    add("package.json", "{ \"name\": \"landing\" }\n".to_owned());
    add("README.md", "# Landing page\n".to_owned());
    files
}

fn options(complexity: Complexity) -> OptimizeOptions {
    OptimizeOptions {
        complexity,
        ..OptimizeOptions::default()
    }
}

fn is_critical(path: &str) -> bool {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| CRITICAL.contains(&name))
}

fn paths(context: &sieve_core::OptimizedContext) -> Vec<&str> {
    context
        .relevant_files
        .iter()
        .map(|file| file.path.as_str())
        .collect()
}

#[tokio::test]
async fn test_trivial_tier_only_grows_through_critical_files() {
    let optimizer = ContextOptimizer::<OfflineBackend>::default();
    let context = optimizer
        .optimize("make the header sticky", &project(), options(Complexity::Trivial))
        .await;

    let selected = paths(&context);
    assert!(!selected.is_empty());
    assert!(selected.iter().skip(2).all(|path| is_critical(path)));
    assert_eq!(context.strategy, Strategy::Full);
}

#[tokio::test]
async fn test_named_file_selected_under_every_tier() {
    let optimizer = ContextOptimizer::<OfflineBackend>::default();
    let files = project();
    for complexity in ALL_TIERS {
        let context = optimizer
            .optimize(
                "Update PricingTable.tsx to show yearly prices",
                &files,
                options(complexity),
            )
            .await;
        assert!(
            paths(&context).contains(&"src/components/PricingTable.tsx"),
            "missing under {complexity:?}"
        );
    }
}

#[tokio::test]
async fn test_vendored_files_never_selected() {
    let optimizer = ContextOptimizer::<OfflineBackend>::default();
    let files = project();
    for use_embeddings in [false, true] {
        for complexity in ALL_TIERS {
            let context = optimizer
                .optimize(
                    "node_modules/react/index.js pricing header navigation",
                    &files,
                    OptimizeOptions {
                        use_embeddings,
                        complexity,
                        ..OptimizeOptions::default()
                    },
                )
                .await;
            assert!(
                paths(&context)
                    .iter()
                    .all(|path| !path.starts_with("node_modules/"))
            );
        }
    }
}

#[tokio::test]
async fn test_output_is_deterministic() {
    let optimizer = ContextOptimizer::<OfflineBackend>::default();
    let files = project();
    let query = "add a yearly toggle to the pricing table and header";

    let first = optimizer.optimize(query, &files, options(Complexity::Moderate)).await;
    let second = optimizer.optimize(query, &files, options(Complexity::Moderate)).await;

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(first.render(), second.render());
}

#[tokio::test]
async fn test_total_tokens_match_returned_files() {
    let optimizer = ContextOptimizer::<OfflineBackend>::default();
    let context = optimizer
        .optimize("header navigation", &project(), options(Complexity::Complex))
        .await;

    let expected: usize = context
        .relevant_files
        .iter()
        .map(|file| estimate_tokens(&file.content))
        .sum();
    assert_eq!(context.strategy, Strategy::Full);
    assert_eq!(context.total_tokens, expected);
    assert!(context.chunks.is_empty());
}

#[tokio::test]
async fn test_empty_project() {
    let optimizer = ContextOptimizer::<OfflineBackend>::default();
    let context = optimizer
        .optimize("anything", &ProjectFiles::new(), OptimizeOptions::default())
        .await;
    assert!(context.is_empty());
    assert_eq!(context.total_tokens, 0);
    assert_eq!(context.strategy, Strategy::Full);
}

#[tokio::test]
async fn test_oversized_selection_is_chunked() {
    let mut source = String::from("import React from 'react';\n\n");
    for name in ["Header", "App"] {
        source.push_str(&format!("export function {name}() {{\n"));
        source.push_str(&"  // render the list of navigation entries\n".repeat(55));
        source.push_str("  return null;\n}\n\n");
    }
    let tokens = estimate_tokens(&source);
    let max_tokens = tokens * 10 / 9;

    let mut files = ProjectFiles::new();
    files.insert("src/App.tsx".to_owned(), source);
    let optimizer = ContextOptimizer::<OfflineBackend>::default();
    let context = optimizer
        .optimize(
            "update the header",
            &files,
            OptimizeOptions {
                max_tokens,
                use_embeddings: false,
                complexity: Complexity::Complex,
            },
        )
        .await;

    assert_eq!(context.strategy, Strategy::Chunked);
    assert!(!context.chunks.is_empty());
    assert_eq!(paths(&context), vec!["src/App.tsx"]);
    assert!(
        context
            .relevant_files
            .iter()
            .all(|file| file.content.is_empty())
    );
    let chunk_tokens: usize = context
        .chunks
        .iter()
        .map(|chunk| estimate_tokens(&chunk.content))
        .sum();
    assert_eq!(context.total_tokens, chunk_tokens);
    assert!(context.total_tokens as f64 <= max_tokens as f64 * 0.9);
    assert!(
        context
            .chunks
            .windows(2)
            .all(|pair| pair[0].importance >= pair[1].importance)
    );
    assert!(context.render().starts_with("// File: src/App.tsx (lines "));
}

#[tokio::test]
async fn test_unchunkable_selection_is_filtered() {
    let mut files = ProjectFiles::new();
    files.insert("notes.txt".to_owned(), "x".repeat(2_000));
    let optimizer = ContextOptimizer::<OfflineBackend>::default();
    let context = optimizer
        .optimize(
            "notes",
            &files,
            OptimizeOptions {
                max_tokens: 520,
                use_embeddings: false,
                complexity: Complexity::Complex,
            },
        )
        .await;

    assert_eq!(context.strategy, Strategy::Filtered);
    assert!(context.chunks.is_empty());
    assert_eq!(context.total_tokens, 500);
    assert!(context.total_tokens <= 520);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let optimizer = ContextOptimizer::<OfflineBackend>::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = optimizer
        .optimize_with_cancel("header", &project(), OptimizeOptions::default(), &cancel)
        .await;
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[tokio::test]
async fn test_cancel_interrupts_pending_embedding_call() {
    let provider = EmbeddingProvider::new(StalledBackend, &CacheConfig::default(), 128);
    let optimizer = ContextOptimizer::new(OptimizerConfig::default(), Arc::new(provider));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let result = optimizer
        .optimize_with_cancel(
            "header navigation",
            &project(),
            OptimizeOptions {
                use_embeddings: true,
                ..OptimizeOptions::default()
            },
            &cancel,
        )
        .await;

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_embeddings_keep_named_file_on_top() {
    let optimizer = ContextOptimizer::<OfflineBackend>::default();
    let context = optimizer
        .optimize(
            "Footer.tsx contact link",
            &project(),
            OptimizeOptions {
                use_embeddings: true,
                ..options(Complexity::Simple)
            },
        )
        .await;
    assert_eq!(paths(&context).first(), Some(&"src/components/Footer.tsx"));
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = OptimizerConfig::default();
    config.chunking.chunk_overlap = config.chunking.max_chunk_size;
    assert!(matches!(
        ContextOptimizer::<ConfiguredBackend>::try_from(config),
        Err(Error::Config(_))
    ));

    let optimizer = ContextOptimizer::<ConfiguredBackend>::try_from(OptimizerConfig::default()).unwrap();
    assert_eq!(optimizer.config(), &OptimizerConfig::default());
    assert!(!optimizer.provider().backend().is_enabled());
}
