/// Dictionary entries: single word senses (`Dictata`) and the word families
/// (`Lexeme`) that group them.
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::context::{Perspective, Tense};
use super::lexica::{Lexica, LexicalType};

/// One sense of one word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dictata {
    pub name: String,
    pub word_type: LexicalType,
    /// Word family this sense belongs to. Empty means the family is named
    /// after the word itself.
    #[serde(default)]
    pub lexeme: String,
    #[serde(default)]
    pub semantics: FxHashSet<String>,
    #[serde(default)]
    pub elegance: i32,
    #[serde(default)]
    pub severity: i32,
    #[serde(default)]
    pub quality: i32,
    #[serde(default)]
    pub tense: Option<Tense>,
    #[serde(default)]
    pub perspective: Option<Perspective>,
    #[serde(default)]
    pub plural: bool,
    #[serde(default)]
    pub possessive: bool,
    #[serde(default)]
    pub determinant: bool,
    #[serde(default)]
    pub language: Option<String>,
}

impl Dictata {
    pub fn new(name: impl Into<String>, word_type: LexicalType) -> Self {
        Self {
            name: name.into(),
            word_type,
            lexeme: String::new(),
            semantics: FxHashSet::default(),
            elegance: 0,
            severity: 0,
            quality: 0,
            tense: None,
            perspective: None,
            plural: false,
            possessive: false,
            determinant: false,
            language: None,
        }
    }

    /// Build a sense describing exactly what a phrase node says about itself.
    pub fn from_lexica(lex: &Lexica) -> Self {
        let ctx = &lex.context;
        Self {
            name: lex.phrase.clone(),
            word_type: lex.word_type,
            lexeme: String::new(),
            semantics: ctx.semantics.clone(),
            elegance: ctx.elegance,
            severity: ctx.severity,
            quality: ctx.quality,
            tense: Some(ctx.tense),
            perspective: Some(ctx.perspective),
            plural: ctx.plural,
            possessive: ctx.possessive,
            determinant: ctx.determinant,
            language: ctx.language.clone(),
        }
    }

    pub fn with_semantic(mut self, tag: impl Into<String>) -> Self {
        self.semantics.insert(tag.into());
        self
    }

    pub fn with_tense(mut self, tense: Tense) -> Self {
        self.tense = Some(tense);
        self
    }

    pub fn with_perspective(mut self, perspective: Perspective) -> Self {
        self.perspective = Some(perspective);
        self
    }

    pub fn with_lexeme(mut self, lexeme: impl Into<String>) -> Self {
        self.lexeme = lexeme.into();
        self
    }

    /// The word family key.
    pub fn lexeme_name(&self) -> &str {
        if self.lexeme.is_empty() {
            &self.name
        } else {
            &self.lexeme
        }
    }

    /// Case-insensitive identity comparison against a word name.
    pub fn is_word(&self, word: &str) -> bool {
        self.name.eq_ignore_ascii_case(word)
    }
}

/// A word family: every sense sharing one lexeme key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lexeme {
    pub name: String,
    pub dictata: Vec<Dictata>,
}

impl Lexeme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dictata: Vec::new(),
        }
    }

    /// Add a sense unless the same form is already present. A spelling may
    /// appear more than once when tense, perspective or number differ
    /// ("are" for the second person and for plurals). Returns true if the
    /// sense was added.
    pub fn add_form(&mut self, dictata: Dictata) -> bool {
        let exists = self.dictata.iter().any(|d| {
            d.is_word(&dictata.name)
                && d.word_type == dictata.word_type
                && d.tense == dictata.tense
                && d.perspective == dictata.perspective
                && d.plural == dictata.plural
        });
        if !exists {
            self.dictata.push(dictata);
        }
        !exists
    }
}
