//! Import and export name extraction.

use std::sync::LazyLock;

use regex::Regex;

use super::compile_pattern;

static ES_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(r#"(?m)^\s*import\s+(?:[^'";]*?\s+from\s+)?['"]([^'"]+)['"]"#)
});

static REQUIRE_CALL: LazyLock<Regex> =
    LazyLock::new(|| compile_pattern(r#"\brequire\(\s*['"]([^'"]+)['"]\s*\)"#));

static CSS_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| compile_pattern(r#"@import\s+(?:url\(\s*)?['"]?([^'")\s;]+)"#));

static DECLARED_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(
        r"(?m)^\s*export\s+(?:default\s+)?(?:async\s+)?(?:function\*?|const|let|var|class|interface|type|enum)\s+([A-Za-z_$][\w$]*)",
    )
});

static DEFAULT_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    compile_pattern(r"(?m)^\s*export\s+default\s+([A-Za-z_$][\w$]*)\s*;?\s*$")
});

static EXPORT_LIST: LazyLock<Regex> =
    LazyLock::new(|| compile_pattern(r"\bexport\s*\{([^}]*)\}"));

static ANY_EXPORT: LazyLock<Regex> = LazyLock::new(|| compile_pattern(r"\bexport\s"));

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !name.is_empty() && !names.iter().any(|existing| existing == name) {
        names.push(name.to_owned());
    }
}

fn collect_group(pattern: &Regex, content: &str, names: &mut Vec<String>) {
    for captures in pattern.captures_iter(content) {
        if let Some(name) = captures.get(1) {
            push_unique(names, name.as_str().trim());
        }
    }
}

/// Module specifiers imported by the file (ES imports, `require` calls, CSS `@import`).
pub fn extract_imports(content: &str) -> Vec<String> {
    let mut imports = Vec::default();
    collect_group(&ES_IMPORT, content, &mut imports);
    collect_group(&REQUIRE_CALL, content, &mut imports);
    collect_group(&CSS_IMPORT, content, &mut imports);
    imports
}

/// Names the file exports (declarations, `export default name`, export lists).
pub fn extract_exports(content: &str) -> Vec<String> {
    let mut exports = Vec::default();
    collect_group(&DECLARED_EXPORT, content, &mut exports);
    collect_group(&DEFAULT_EXPORT, content, &mut exports);
    for captures in EXPORT_LIST.captures_iter(content) {
        let Some(list) = captures.get(1) else {
            continue;
        };
        for item in list.as_str().split(',') {
            // `local as exported` exports the alias
            let exported = item.rsplit(" as ").next().unwrap_or(item);
            push_unique(&mut exports, exported.trim());
        }
    }
    exports
}

/// Whether the text contains an export statement.
pub fn has_export(text: &str) -> bool {
    ANY_EXPORT.is_match(text)
}
