use unicode_normalization::UnicodeNormalization;

/// Decompose compatibility characters and drop whatever is left outside ASCII,
/// so "Zürich" becomes "Zurich" and "東京" becomes "".
pub fn normalize_ascii(s: &str) -> String {
    s.nfkd().filter(char::is_ascii).collect()
}

/// First character upper-cased, the rest lower-cased.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Keep at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
