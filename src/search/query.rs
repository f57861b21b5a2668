//! Query parsing into lemma sets

use crate::lemma::{words, MIN_WORD_CHARS};
use crate::morph::Analyzer;
use std::collections::HashSet;

/// Turns free-text queries into lemma sets
#[derive(Clone, Default)]
pub struct QueryProcessor {
    analyzer: Analyzer,
}

impl QueryProcessor {
    pub fn new(analyzer: Analyzer) -> Self {
        Self { analyzer }
    }

    /// Distinct lemmas of the query; empty when nothing meaningful remains
    pub fn process(&self, query: &str) -> HashSet<String> {
        words(query)
            .flat_map(|word| self.analyzer.lemmas(&word))
            .filter(|lemma| lemma.chars().count() >= MIN_WORD_CHARS)
            .collect()
    }

    /// Words of the query as typed, used to locate and highlight snippets
    pub fn keywords(&self, query: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        words(query).filter(|w| seen.insert(w.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_dedupes_inflections() {
        let processor = QueryProcessor::default();
        let lemmas = processor.process("Кошки КОШКА кошку");
        assert_eq!(lemmas.len(), 1);
    }

    #[test]
    fn test_process_drops_noise() {
        let processor = QueryProcessor::default();
        assert!(processor.process("").is_empty());
        assert!(processor.process("   ").is_empty());
        assert!(processor.process("и в на 42 ab").is_empty());
        assert!(processor.process("через или").is_empty());
    }

    #[test]
    fn test_process_lowercases_latin() {
        let processor = QueryProcessor::default();
        let lemmas = processor.process("Rust RUST cargo");
        assert_eq!(lemmas.len(), 2);
        assert!(lemmas.contains("rust"));
        assert!(lemmas.contains("cargo"));
    }

    #[test]
    fn test_process_keeps_short_stem_words() {
        let processor = QueryProcessor::default();
        assert!(processor.process("имя").contains("имя"));
        assert!(processor.process("Яма").contains("яма"));
    }

    #[test]
    fn test_keywords_keep_order() {
        let processor = QueryProcessor::default();
        assert_eq!(
            processor.keywords("Rust, cargo rust 2024"),
            vec!["rust".to_string(), "cargo".to_string()]
        );
    }
}
