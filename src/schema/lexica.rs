/// Lexica — the recursive phrase node every description is built from.
use serde::{Deserialize, Serialize};

use super::context::LexicalContext;
use super::dictata::Dictata;
use crate::core::lexicon::Lexicon;

/// The grammatical role a phrase plays relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrammaticalRole {
    Subject,
    Verb,
    DirectObject,
    IndirectObject,
    Descriptive,
    ConjunctiveAdverb,
    Interjection,
    None,
}

/// The part of speech of a phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LexicalType {
    Noun,
    ProperNoun,
    Pronoun,
    Verb,
    Adjective,
    Adverb,
    Article,
    Conjunction,
    Preposition,
    Interjection,
    None,
}

impl LexicalType {
    /// Nouns, proper nouns and pronouns: the heads adjectives sit in front of.
    pub fn is_nominal(&self) -> bool {
        matches!(self, Self::Noun | Self::ProperNoun | Self::Pronoun)
    }
}

/// A phrase node: one word with a role, a type, its own context and the
/// phrases that modify it.
///
/// Modifiers behave as an insertion-ordered set keyed on value-equivalence
/// (see [`Lexica::equivalent`]). Trees are plain values; `clone()` is a deep
/// copy, and every render entry point clones before mutating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexica {
    pub role: GrammaticalRole,
    pub word_type: LexicalType,
    pub phrase: String,
    #[serde(default)]
    modifiers: Vec<Lexica>,
    #[serde(default)]
    pub context: LexicalContext,
}

impl Lexica {
    pub fn new(
        word_type: LexicalType,
        role: GrammaticalRole,
        phrase: impl Into<String>,
        context: LexicalContext,
    ) -> Self {
        Self {
            role,
            word_type,
            phrase: phrase.into(),
            modifiers: Vec::new(),
            context,
        }
    }

    /// A node with a default context.
    pub fn word(word_type: LexicalType, role: GrammaticalRole, phrase: impl Into<String>) -> Self {
        Self::new(word_type, role, phrase, LexicalContext::default())
    }

    pub fn modifiers(&self) -> &[Lexica] {
        &self.modifiers
    }

    /// Copy of this node without any modifiers.
    pub fn bare(&self) -> Self {
        Self {
            role: self.role,
            word_type: self.word_type,
            phrase: self.phrase.clone(),
            modifiers: Vec::new(),
            context: self.context.clone(),
        }
    }

    /// Value-equivalence: role, type, phrase and the salient context fields.
    pub fn equivalent(&self, other: &Lexica) -> bool {
        self.role == other.role
            && self.word_type == other.word_type
            && self.phrase == other.phrase
            && self.context.salient() == other.context.salient()
    }

    /// Attach `modifier` unless an equivalent one is already present.
    ///
    /// Returns `self` when `passthru` is false, so siblings can keep being
    /// added to the same node, or the attached modifier when `passthru` is
    /// true, to keep building down the new branch. A modifier equivalent to
    /// the receiver itself is refused.
    pub fn try_modify(&mut self, modifier: Lexica, passthru: bool) -> &mut Lexica {
        if modifier.equivalent(self) {
            return self;
        }

        let index = match self.modifiers.iter().position(|m| m.equivalent(&modifier)) {
            Some(existing) => existing,
            None => {
                self.modifiers.push(modifier);
                self.modifiers.len() - 1
            }
        };

        if passthru {
            &mut self.modifiers[index]
        } else {
            self
        }
    }

    /// Wrap a raw word in a node sharing a copy of this node's context and
    /// attach it.
    pub fn try_modify_word(
        &mut self,
        word_type: LexicalType,
        role: GrammaticalRole,
        phrase: impl Into<String>,
        passthru: bool,
    ) -> &mut Lexica {
        let modifier = Lexica::new(word_type, role, phrase, self.context.clone());
        self.try_modify(modifier, passthru)
    }

    /// Attach every modifier in `modifiers`.
    pub fn try_modify_all<I>(&mut self, modifiers: I) -> &mut Lexica
    where
        I: IntoIterator<Item = Lexica>,
    {
        for modifier in modifiers {
            self.try_modify(modifier, false);
        }
        self
    }

    /// Attach raw `(type, role, phrase)` words, each wrapped with a copy of
    /// this node's context.
    pub fn try_modify_words<I, S>(&mut self, words: I) -> &mut Lexica
    where
        I: IntoIterator<Item = (LexicalType, GrammaticalRole, S)>,
        S: Into<String>,
    {
        for (word_type, role, phrase) in words {
            self.try_modify_word(word_type, role, phrase, false);
        }
        self
    }

    /// Returns true if any direct modifier plays `role`.
    pub fn has_modifier_role(&self, role: GrammaticalRole) -> bool {
        self.modifiers.iter().any(|m| m.role == role)
    }

    /// Detach and return the direct modifiers matching `predicate`, keeping
    /// their relative order.
    pub fn take_modifiers<F>(&mut self, mut predicate: F) -> Vec<Lexica>
    where
        F: FnMut(&Lexica) -> bool,
    {
        let (taken, kept): (Vec<Lexica>, Vec<Lexica>) = std::mem::take(&mut self.modifiers)
            .into_iter()
            .partition(|m| predicate(m));
        self.modifiers = kept;
        taken
    }

    /// Detach every modifier.
    pub fn clear_modifiers(&mut self) -> Vec<Lexica> {
        std::mem::take(&mut self.modifiers)
    }

    /// Resolve the dictionary sense this node stands for.
    ///
    /// A phrase the lexicon does not know gets a sense built from the node
    /// itself. The lexicon is only read.
    pub fn get_dictata(&self, lexicon: &dyn Lexicon) -> Option<Dictata> {
        if self.phrase.is_empty() {
            return None;
        }

        lexicon
            .find_dictata(&self.phrase, self.word_type, &self.context)
            .or_else(|| Some(Dictata::from_lexica(self)))
    }

    /// Like `get_dictata`, but an unknown phrase is recorded through
    /// `verify_lexeme`. Never called while rendering.
    pub fn learn_dictata(&self, lexicon: &dyn Lexicon) -> Option<Dictata> {
        if self.phrase.is_empty() {
            return None;
        }

        if let Some(found) = lexicon.find_dictata(&self.phrase, self.word_type, &self.context) {
            return Some(found);
        }

        let dictata = Dictata::from_lexica(self);
        lexicon.verify_lexeme(&dictata);
        Some(dictata)
    }
}
