/// Lexicon interface — word selection by context, plus an in-memory word bank.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use std::sync::RwLock;
use thiserror::Error;
use tracing::debug;

use crate::schema::context::LexicalContext;
use crate::schema::dictata::{Dictata, Lexeme};
use crate::schema::lexica::LexicalType;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// The dictionary service the renderer consults.
///
/// Implementations are shared across concurrently rendering threads.
/// Rendering only reads; `verify_lexeme` is for callers teaching new words
/// between renders.
pub trait Lexicon: Send + Sync {
    /// Pick the word of `word_type` best fitting `context`.
    fn get_word(&self, context: &LexicalContext, word_type: LexicalType) -> Option<Dictata>;

    /// Look up the sense a written phrase stands for.
    fn find_dictata(
        &self,
        phrase: &str,
        word_type: LexicalType,
        context: &LexicalContext,
    ) -> Option<Dictata>;

    /// Make sure the lexicon knows `dictata`, recording it if it is new.
    fn verify_lexeme(&self, dictata: &Dictata);
}

/// A word bank held in memory, grouped by lexeme in insertion order.
///
/// Selection is deterministic for a given seed: candidates are scored
/// against the context and ties are broken by a `StdRng` seeded per call.
#[derive(Debug, Default)]
pub struct MemoryLexicon {
    lexemes: RwLock<Vec<Lexeme>>,
    seed: u64,
}

impl MemoryLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn from_words(words: Vec<Dictata>) -> Self {
        let lexicon = Self::new();
        for word in words {
            lexicon.insert(word);
        }
        lexicon
    }

    /// Load a word list from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Self, LexiconError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a word list (a RON sequence of `Dictata`).
    pub fn parse_ron(input: &str) -> Result<Self, LexiconError> {
        let words: Vec<Dictata> = ron::from_str(input)?;
        Ok(Self::from_words(words))
    }

    /// Add a sense, creating its lexeme if needed. Returns true if added.
    pub fn insert(&self, dictata: Dictata) -> bool {
        let mut lexemes = self.lexemes.write().unwrap_or_else(|e| e.into_inner());
        let key = dictata.lexeme_name().to_string();
        match lexemes.iter_mut().find(|l| l.name == key) {
            Some(lexeme) => lexeme.add_form(dictata),
            None => {
                let mut lexeme = Lexeme::new(key);
                lexeme.add_form(dictata);
                lexemes.push(lexeme);
                true
            }
        }
    }

    pub fn lexeme(&self, name: &str) -> Option<Lexeme> {
        let lexemes = self.lexemes.read().unwrap_or_else(|e| e.into_inner());
        lexemes.iter().find(|l| l.name == name).cloned()
    }

    /// Number of word senses held.
    pub fn len(&self) -> usize {
        let lexemes = self.lexemes.read().unwrap_or_else(|e| e.into_inner());
        lexemes.iter().map(|l| l.dictata.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn same_language(dictata: &Dictata, context: &LexicalContext) -> bool {
    match (&dictata.language, &context.language) {
        (Some(word_lang), Some(ctx_lang)) => word_lang == ctx_lang,
        _ => true,
    }
}

/// How well a sense fits a context. `None` if it cannot be used at all.
fn fitness(dictata: &Dictata, context: &LexicalContext) -> Option<i32> {
    if !context.semantics.iter().all(|tag| dictata.semantics.contains(tag)) {
        return None;
    }

    let mut score = 0;
    score += match dictata.tense {
        Some(tense) if tense == context.tense => 4,
        Some(_) => -4,
        None => 0,
    };
    score += match dictata.perspective {
        Some(perspective) if perspective == context.perspective => 4,
        Some(_) => -4,
        None => 0,
    };
    score += if dictata.plural == context.plural { 2 } else { -2 };
    score -= (dictata.elegance - context.elegance).abs();
    score -= (dictata.severity - context.severity).abs();
    score -= (dictata.quality - context.quality).abs();

    Some(score)
}

impl Lexicon for MemoryLexicon {
    fn get_word(&self, context: &LexicalContext, word_type: LexicalType) -> Option<Dictata> {
        let lexemes = self.lexemes.read().unwrap_or_else(|e| e.into_inner());

        let scored: Vec<(i32, &Dictata)> = lexemes
            .iter()
            .flat_map(|l| l.dictata.iter())
            .filter(|d| d.word_type == word_type && same_language(d, context))
            .filter_map(|d| fitness(d, context).map(|score| (score, d)))
            .collect();

        let best = scored.iter().map(|(score, _)| *score).max()?;
        let tied: Vec<&Dictata> = scored
            .iter()
            .filter(|(score, _)| *score == best)
            .map(|(_, d)| *d)
            .collect();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let chosen = tied.choose(&mut rng).map(|d| (*d).clone());
        debug!(?word_type, candidates = tied.len(), chosen = ?chosen.as_ref().map(|d| &d.name), "lexicon selection");
        chosen
    }

    fn find_dictata(
        &self,
        phrase: &str,
        word_type: LexicalType,
        context: &LexicalContext,
    ) -> Option<Dictata> {
        let lexemes = self.lexemes.read().unwrap_or_else(|e| e.into_inner());
        let mut same_word = lexemes
            .iter()
            .flat_map(|l| l.dictata.iter())
            .filter(|d| d.is_word(phrase) && same_language(d, context));

        let first = same_word.next()?;
        if first.word_type == word_type {
            return Some(first.clone());
        }
        same_word
            .find(|d| d.word_type == word_type)
            .or(Some(first))
            .cloned()
    }

    fn verify_lexeme(&self, dictata: &Dictata) {
        if self.insert(dictata.clone()) {
            debug!(word = %dictata.name, lexeme = %dictata.lexeme_name(), "lexicon learned word");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::context::{Perspective, Tense};

    fn bank() -> MemoryLexicon {
        MemoryLexicon::from_words(vec![
            Dictata::new("is", LexicalType::Verb)
                .with_lexeme("be")
                .with_semantic("existential")
                .with_tense(Tense::Present),
            Dictata::new("was", LexicalType::Verb)
                .with_lexeme("be")
                .with_semantic("existential")
                .with_tense(Tense::Past),
            Dictata::new("flickers", LexicalType::Verb),
            Dictata::new("you", LexicalType::Pronoun).with_perspective(Perspective::SecondPerson),
            Dictata::new("they", LexicalType::Pronoun).with_perspective(Perspective::ThirdPerson),
        ])
    }

    #[test]
    fn groups_by_lexeme() {
        let lexicon = bank();
        assert_eq!(lexicon.len(), 5);
        let be = lexicon.lexeme("be").unwrap();
        assert_eq!(be.dictata.len(), 2);
        assert!(lexicon.lexeme("flickers").is_some());
    }

    #[test]
    fn get_word_requires_semantics() {
        let lexicon = bank();
        let ctx = LexicalContext::new().with_semantic("existential");
        let word = lexicon.get_word(&ctx, LexicalType::Verb).unwrap();
        assert_eq!(word.name, "is");

        let ctx = ctx.with_tense(Tense::Past);
        assert_eq!(lexicon.get_word(&ctx, LexicalType::Verb).unwrap().name, "was");

        let ctx = LexicalContext::new().with_semantic("metallic");
        assert!(lexicon.get_word(&ctx, LexicalType::Verb).is_none());
    }

    #[test]
    fn get_word_prefers_matching_perspective() {
        let lexicon = bank();
        let ctx = LexicalContext::new().with_perspective(Perspective::SecondPerson);
        assert_eq!(lexicon.get_word(&ctx, LexicalType::Pronoun).unwrap().name, "you");
    }

    #[test]
    fn get_word_is_deterministic_per_seed() {
        let words = || {
            (0..6)
                .map(|i| Dictata::new(format!("word{i}"), LexicalType::Adjective))
                .collect::<Vec<_>>()
        };
        let a = MemoryLexicon::from_words(words()).with_seed(9);
        let b = MemoryLexicon::from_words(words()).with_seed(9);
        let ctx = LexicalContext::new();
        assert_eq!(
            a.get_word(&ctx, LexicalType::Adjective),
            b.get_word(&ctx, LexicalType::Adjective)
        );
    }

    #[test]
    fn language_filter() {
        let mut elvish = Dictata::new("na", LexicalType::Verb).with_semantic("existential");
        elvish.language = Some("elvish".to_string());
        let lexicon = MemoryLexicon::from_words(vec![elvish]);

        let ctx = LexicalContext::in_language("english").with_semantic("existential");
        assert!(lexicon.get_word(&ctx, LexicalType::Verb).is_none());

        let ctx = LexicalContext::in_language("elvish").with_semantic("existential");
        assert_eq!(lexicon.get_word(&ctx, LexicalType::Verb).unwrap().name, "na");
    }

    #[test]
    fn find_dictata_prefers_requested_type() {
        let lexicon = MemoryLexicon::from_words(vec![
            Dictata::new("light", LexicalType::Adjective),
            Dictata::new("light", LexicalType::Noun),
        ]);
        let ctx = LexicalContext::new();
        assert_eq!(
            lexicon.find_dictata("light", LexicalType::Noun, &ctx).unwrap().word_type,
            LexicalType::Noun
        );
        assert_eq!(
            lexicon.find_dictata("LIGHT", LexicalType::Verb, &ctx).unwrap().word_type,
            LexicalType::Adjective
        );
        assert!(lexicon.find_dictata("dark", LexicalType::Noun, &ctx).is_none());
    }

    #[test]
    fn verify_lexeme_records_once() {
        let lexicon = MemoryLexicon::new();
        let word = Dictata::new("hums", LexicalType::Verb);
        lexicon.verify_lexeme(&word);
        lexicon.verify_lexeme(&word);
        assert_eq!(lexicon.len(), 1);
    }

    #[test]
    fn parse_word_list() {
        let input = r#"[
            Dictata(name: "is", word_type: Verb, lexeme: "be", semantics: ["existential"], tense: Some(Present)),
            Dictata(name: "the", word_type: Article, semantics: ["definite"]),
        ]"#;
        let lexicon = MemoryLexicon::parse_ron(input).unwrap();
        assert_eq!(lexicon.len(), 2);
        let ctx = LexicalContext::new().with_semantic("definite");
        assert_eq!(lexicon.get_word(&ctx, LexicalType::Article).unwrap().name, "the");
    }
}
