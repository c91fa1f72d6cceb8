use unicode_segmentation::UnicodeSegmentation;

/// Words of a summary in reading order, punctuation dropped.
pub fn summary_words(text: &str) -> Vec<&str> {
    text.unicode_words().collect()
}

/// Lowercased word form used when lining model words up with summary words.
pub fn normalize_word(word: &str) -> String {
    word.unicode_words().collect::<Vec<_>>().join(" ").to_lowercase()
}
