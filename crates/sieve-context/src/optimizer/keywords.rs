//! Query keyword extraction.

/// Common English words that carry no signal about which files matter.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "have", "his", "how", "its", "may", "new", "now", "see", "way",
    "who", "did", "get", "let", "put", "say", "she", "too", "use", "this", "that", "with",
    "from", "they", "will", "would", "there", "their", "what", "about", "which", "when",
    "make", "like", "into", "than", "then", "them", "these", "some", "could", "should",
    "other", "just", "also", "only", "very", "been", "were", "does", "please", "want", "need",
    "where", "while", "each", "more", "most", "such", "your", "yours",
];

/// Lowercased, deduplicated keywords of `query`, in order of first appearance.
///
/// Characters other than letters, digits and `_` separate words. Stop words
/// and words of two characters or fewer are dropped; at most `limit` survive.
pub fn extract_keywords(query: &str, limit: usize) -> Vec<String> {
    let normalized: String = query
        .to_lowercase()
        .chars()
        .map(|character| {
            if character.is_alphanumeric() || character == '_' || character.is_whitespace() {
                character
            } else {
                ' '
            }
        })
        .collect();

    let mut keywords = Vec::<String>::new();
    for word in normalized.split_whitespace() {
        if keywords.len() >= limit {
            break;
        }
        if word.chars().count() <= 2 || STOP_WORDS.contains(&word) {
            continue;
        }
        if !keywords.iter().any(|existing| existing == word) {
            keywords.push(word.to_owned());
        }
    }
    keywords
}
