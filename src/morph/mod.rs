//! Morphological analysis
//!
//! Words are routed by script:
//! - Cyrillic words go through [`RussianMorphology`], which rejects malformed
//!   input and tags closed-class words by part of speech
//! - Latin words are their own base form ([`PassThroughMorphology`])
//! - Mixed-script and letterless tokens yield nothing

mod lexicon;
mod russian;

pub use russian::RussianMorphology;

use crate::error::Result;
use std::sync::Arc;
use tracing::trace;

/// Coarse part-of-speech tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Preposition,
    Conjunction,
    Particle,
    Interjection,
    Significant,
}

impl PartOfSpeech {
    /// Functional words carry no search value
    pub fn is_functional(self) -> bool {
        !matches!(self, PartOfSpeech::Significant)
    }
}

/// A base form produced by analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordForm {
    pub base: String,
    pub part_of_speech: PartOfSpeech,
}

impl WordForm {
    pub fn significant(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            part_of_speech: PartOfSpeech::Significant,
        }
    }
}

/// Language-specific word normalizer
pub trait Morphology: Send + Sync {
    /// Base forms of a word; errors when the word is not well formed
    fn normalize(&self, word: &str) -> Result<Vec<WordForm>>;
}

/// Morphology for scripts without an analyzer: the word is its own lemma
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThroughMorphology;

impl Morphology for PassThroughMorphology {
    fn normalize(&self, word: &str) -> Result<Vec<WordForm>> {
        Ok(vec![WordForm::significant(word)])
    }
}

/// Alphabet of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Cyrillic,
    Latin,
    Other,
}

impl Script {
    /// Classify a token by the letters it contains
    pub fn detect(word: &str) -> Self {
        let mut cyrillic = false;
        let mut latin = false;
        for c in word.chars() {
            if is_cyrillic(c) {
                cyrillic = true;
            } else if c.is_ascii_alphabetic() {
                latin = true;
            }
        }

        match (cyrillic, latin) {
            (true, false) => Script::Cyrillic,
            (false, true) => Script::Latin,
            _ => Script::Other,
        }
    }
}

pub(crate) fn is_cyrillic(c: char) -> bool {
    matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}

/// Routes words to the morphology of their script
#[derive(Clone)]
pub struct Analyzer {
    cyrillic: Arc<dyn Morphology>,
    latin: Arc<dyn Morphology>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self::with_morphologies(
            Arc::new(RussianMorphology::new()),
            Arc::new(PassThroughMorphology),
        )
    }

    pub fn with_morphologies(cyrillic: Arc<dyn Morphology>, latin: Arc<dyn Morphology>) -> Self {
        Self { cyrillic, latin }
    }

    /// Significant lemmas of a word; analysis failures yield none
    pub fn lemmas(&self, word: &str) -> Vec<String> {
        let morphology = match Script::detect(word) {
            Script::Cyrillic => &self.cyrillic,
            Script::Latin => &self.latin,
            Script::Other => return Vec::new(),
        };

        match morphology.normalize(word) {
            Ok(forms) => forms
                .into_iter()
                .filter(|f| !f.part_of_speech.is_functional())
                .map(|f| f.base)
                .collect(),
            Err(e) => {
                trace!("Skipping word '{}': {}", word, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct Failing;

    impl Morphology for Failing {
        fn normalize(&self, word: &str) -> Result<Vec<WordForm>> {
            Err(Error::Morphology(format!("cannot analyze {}", word)))
        }
    }

    #[test]
    fn test_script_detection() {
        assert_eq!(Script::detect("кошка"), Script::Cyrillic);
        assert_eq!(Script::detect("Ёлка"), Script::Cyrillic);
        assert_eq!(Script::detect("rust"), Script::Latin);
        assert_eq!(Script::detect("e-mail"), Script::Latin);
        assert_eq!(Script::detect("кошkа"), Script::Other);
        assert_eq!(Script::detect("---"), Script::Other);
    }

    #[test]
    fn test_latin_passes_through() {
        let analyzer = Analyzer::new();
        assert_eq!(analyzer.lemmas("rust"), vec!["rust".to_string()]);
        assert!(analyzer.lemmas("кошkа").is_empty());
    }

    #[test]
    fn test_functional_words_are_dropped() {
        let analyzer = Analyzer::new();
        assert!(analyzer.lemmas("или").is_empty());
        assert!(analyzer.lemmas("через").is_empty());
        assert_eq!(analyzer.lemmas("кошки").len(), 1);
    }

    #[test]
    fn test_failures_are_skipped() {
        let analyzer = Analyzer::with_morphologies(Arc::new(Failing), Arc::new(PassThroughMorphology));
        assert!(analyzer.lemmas("кошка").is_empty());
        assert_eq!(analyzer.lemmas("cat"), vec!["cat".to_string()]);
    }
}
