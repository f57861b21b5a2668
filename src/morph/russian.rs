//! Russian morphology backed by the Snowball stemmer

use super::lexicon::closed_class;
use super::{is_cyrillic, Morphology, PartOfSpeech, WordForm};
use crate::error::{Error, Result};
use crate::lemma::MIN_WORD_CHARS;
use rust_stemmers::{Algorithm, Stemmer};

/// Russian analyzer: closed-class lookup, then Snowball stemming
pub struct RussianMorphology {
    stemmer: Stemmer,
}

impl Default for RussianMorphology {
    fn default() -> Self {
        Self::new()
    }
}

impl RussianMorphology {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::Russian),
        }
    }

    /// A word is well formed when it is Cyrillic letters joined by single inner hyphens
    fn is_well_formed(word: &str) -> bool {
        !word.is_empty()
            && word
                .split('-')
                .all(|part| !part.is_empty() && part.chars().all(is_cyrillic))
    }
}

impl Morphology for RussianMorphology {
    fn normalize(&self, word: &str) -> Result<Vec<WordForm>> {
        if !Self::is_well_formed(word) {
            return Err(Error::Morphology(format!("not a Russian word: {}", word)));
        }

        let lower = word.to_lowercase().replace('ё', "е");

        if let Some(part_of_speech) = closed_class(&lower) {
            return Ok(vec![WordForm {
                base: lower,
                part_of_speech,
            }]);
        }

        // Short stems would fall under the lemma length floor
        let stem = self.stemmer.stem(&lower).into_owned();
        let base = if stem.chars().count() < MIN_WORD_CHARS {
            lower
        } else {
            stem
        };
        Ok(vec![WordForm {
            base,
            part_of_speech: PartOfSpeech::Significant,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(word: &str) -> String {
        let forms = RussianMorphology::new().normalize(word).unwrap();
        assert_eq!(forms.len(), 1);
        forms[0].base.clone()
    }

    #[test]
    fn test_inflections_share_a_base() {
        assert_eq!(base("кошка"), base("кошки"));
        assert_eq!(base("кошка"), base("Кошку"));
        assert_eq!(base("бегает"), base("бегают"));
    }

    #[test]
    fn test_short_stem_keeps_the_word() {
        assert_eq!(base("имя"), "имя");
        assert_eq!(base("Яма"), "яма");
        assert!(base("кошками").chars().count() >= MIN_WORD_CHARS);
    }

    #[test]
    fn test_yo_is_folded() {
        assert_eq!(base("ёлка"), base("елка"));
    }

    #[test]
    fn test_closed_class_is_tagged() {
        let forms = RussianMorphology::new().normalize("через").unwrap();
        assert_eq!(forms[0].part_of_speech, PartOfSpeech::Preposition);
        assert!(forms[0].part_of_speech.is_functional());
    }

    #[test]
    fn test_malformed_words_are_rejected() {
        let morph = RussianMorphology::new();
        assert!(morph.normalize("кошка!").is_err());
        assert!(morph.normalize("-кошка").is_err());
        assert!(morph.normalize("кошkа").is_err());
        assert!(morph.normalize("").is_err());
        assert!(morph.normalize("кто-то").is_ok());
    }
}
