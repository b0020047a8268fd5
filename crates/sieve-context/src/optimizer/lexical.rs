//! Keyword and path heuristics that score a file against a query.

use std::path::Path;

/// Bonus when the query names the file.
const NAMED_BONUS: f64 = 50.0;
/// Bonus per keyword found in the path.
const PATH_KEYWORD_BONUS: f64 = 10.0;
/// Bonus per keyword found in the content.
const CONTENT_KEYWORD_BONUS: f64 = 2.0;
/// Bonus for entry points and other structural files.
const CRITICAL_NAME_BONUS: f64 = 25.0;
/// Bonus for source files of the web stack.
const SOURCE_EXTENSION_BONUS: f64 = 10.0;
/// Config files scoring below this are halved.
const CONFIG_PENALTY_THRESHOLD: f64 = 30.0;

const CRITICAL_NAMES: &[&str] = &["index", "app", "main", "layout", "config", "route"];
const SOURCE_EXTENSIONS: &[&str] = &["tsx", "ts", "jsx", "js", "html", "css"];
const IGNORED_SEGMENTS: &[&str] = &["node_modules", "dist", "build", ".git"];

/// Whether any directory or file name in `path` is vendored or generated output.
pub fn is_ignored(path: &str) -> bool {
    path.split(['/', '\\'])
        .any(|segment| IGNORED_SEGMENTS.contains(&segment))
}

/// Scores files against one query.
///
/// The query and keywords are lowercased once; matching is case-insensitive.
pub struct LexicalScorer<'query> {
    query: String,
    keywords: &'query [String],
}

impl<'query> LexicalScorer<'query> {
    /// Create a scorer for `query` and its extracted keywords
    pub fn new(query: &str, keywords: &'query [String]) -> Self {
        Self {
            query: query.to_lowercase(),
            keywords,
        }
    }

    /// Relevance of one file; zero for ignored paths.
    pub fn score(&self, path: &str, content: &str) -> f64 {
        if is_ignored(path) {
            return 0.0;
        }

        let path_lower = path.to_lowercase();
        let file = Path::new(&path_lower);
        let file_name = file.file_name().and_then(|name| name.to_str()).unwrap_or(path_lower.as_str());
        let extension = file.extension().and_then(|ext| ext.to_str()).unwrap_or_default();

        let mut score = 0.0;
        if self.query.contains(&path_lower) || self.query.contains(file_name) {
            score += NAMED_BONUS;
        }

        let content_lower = content.to_lowercase();
        for keyword in self.keywords {
            if path_lower.contains(keyword.as_str()) {
                score += PATH_KEYWORD_BONUS;
            }
            if content_lower.contains(keyword.as_str()) {
                score += CONTENT_KEYWORD_BONUS;
            }
        }

        if CRITICAL_NAMES.iter().any(|name| path_lower.contains(name)) {
            score += CRITICAL_NAME_BONUS;
        }
        if SOURCE_EXTENSIONS.contains(&extension) {
            score += SOURCE_EXTENSION_BONUS;
        }

        let looks_like_config = file_name.contains("config") || extension == "json";
        if looks_like_config && score < CONFIG_PENALTY_THRESHOLD {
            score /= 2.0;
        }
        score
    }
}
