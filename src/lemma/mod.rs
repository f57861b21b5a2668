//! Lemma extraction from HTML documents

use crate::morph::Analyzer;
use crate::parse::visible_text;
use std::collections::HashMap;

/// Tokens shorter than this are ignored
pub const MIN_WORD_CHARS: usize = 3;

/// Turns documents and queries into lemma counts
#[derive(Clone, Default)]
pub struct LemmaExtractor {
    analyzer: Analyzer,
}

impl LemmaExtractor {
    pub fn new(analyzer: Analyzer) -> Self {
        Self { analyzer }
    }

    /// Count lemmas in the visible text of an HTML document
    pub fn extract(&self, html: &str) -> HashMap<String, u32> {
        if html.trim().is_empty() {
            return HashMap::new();
        }
        self.count_text(&visible_text(html))
    }

    /// Count lemmas in plain text
    pub fn count_text(&self, text: &str) -> HashMap<String, u32> {
        let mut counts = HashMap::new();
        for word in words(text) {
            for lemma in self.analyzer.lemmas(&word) {
                *counts.entry(lemma).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Split text into candidate words: trimmed, lower-cased, long enough, digit-free
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| token.chars().count() >= MIN_WORD_CHARS)
        .filter(|token| !token.chars().any(|c| c.is_numeric()))
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_filtering() {
        let found: Vec<String> = words("The cat, «Кошки»! 2024 ab x1y rust-lang ...").collect();
        assert_eq!(found, vec!["the", "cat", "кошки", "rust-lang"]);
    }

    #[test]
    fn test_extract_counts_inflections_together() {
        let extractor = LemmaExtractor::default();
        let html = "<html><body><p>Кошка и кошки. Rust rust!</p><script>кошка</script></body></html>";
        let lemmas = extractor.extract(html);

        let stems: Vec<(&String, &u32)> = lemmas.iter().filter(|(l, _)| l.starts_with("кош")).collect();
        assert_eq!(stems.len(), 1);
        assert_eq!(*stems[0].1, 2);
        assert_eq!(lemmas.get("rust"), Some(&2));
        // "и" is too short and a conjunction anyway
        assert_eq!(lemmas.len(), 2);
    }

    #[test]
    fn test_functional_words_not_counted() {
        let extractor = LemmaExtractor::default();
        let lemmas = extractor.extract("<p>через или неужели</p>");
        assert!(lemmas.is_empty());
    }

    #[test]
    fn test_empty_content() {
        let extractor = LemmaExtractor::default();
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("<html><body></body></html>").is_empty());
    }

    #[test]
    fn test_mixed_script_dropped() {
        let extractor = LemmaExtractor::default();
        assert!(extractor.count_text("приветworld").is_empty());
    }
}
