/// Lexical context — the grammatical parameters a phrase node is rendered under.
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::entity::{ObserverId, Pronouns};

/// Grammatical tense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tense {
    Past,
    #[default]
    Present,
    Future,
}

/// Narrative person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Perspective {
    FirstPerson,
    SecondPerson,
    #[default]
    ThirdPerson,
}

/// Spatial relation a phrase carries relative to its head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Position {
    #[default]
    None,
    Around,
    On,
    Attached,
    Inside,
    Near,
    Far,
    PartOf,
}

/// The bag of grammatical parameters attached to every `Lexica`.
///
/// A context belongs to exactly one node. Nodes created from a parent
/// (see `Lexica::try_modify_word`) receive a clone, never a shared instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexicalContext {
    #[serde(default)]
    pub tense: Tense,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub perspective: Perspective,
    #[serde(default)]
    pub determinant: bool,
    #[serde(default)]
    pub plural: bool,
    #[serde(default)]
    pub possessive: bool,
    #[serde(default)]
    pub semantics: FxHashSet<String>,
    #[serde(default)]
    pub severity: i32,
    #[serde(default)]
    pub elegance: i32,
    #[serde(default)]
    pub quality: i32,
    /// Key of the language pack this phrase renders in.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub observer: Option<ObserverId>,
    #[serde(default)]
    pub gender_form: Option<Pronouns>,
}

impl LexicalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context bound to a language pack.
    pub fn in_language(language: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            ..Self::default()
        }
    }

    pub fn with_tense(mut self, tense: Tense) -> Self {
        self.tense = tense;
        self
    }

    pub fn with_perspective(mut self, perspective: Perspective) -> Self {
        self.perspective = perspective;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_determinant(mut self, determinant: bool) -> Self {
        self.determinant = determinant;
        self
    }

    pub fn with_plural(mut self, plural: bool) -> Self {
        self.plural = plural;
        self
    }

    pub fn with_possessive(mut self, possessive: bool) -> Self {
        self.possessive = possessive;
        self
    }

    pub fn with_semantic(mut self, tag: impl Into<String>) -> Self {
        self.semantics.insert(tag.into());
        self
    }

    pub fn with_elegance(mut self, elegance: i32) -> Self {
        self.elegance = elegance;
        self
    }

    pub fn with_gender_form(mut self, pronouns: Pronouns) -> Self {
        self.gender_form = Some(pronouns);
        self
    }

    /// Returns true if this context carries the given semantic tag.
    pub fn has_semantic(&self, tag: &str) -> bool {
        self.semantics.contains(tag)
    }

    /// Copy the caller's narrative voice onto this context: language,
    /// tense, perspective and the three tone ratings.
    pub fn adopt_voice(&mut self, other: &LexicalContext) {
        self.language = other.language.clone();
        self.tense = other.tense;
        self.perspective = other.perspective;
        self.elegance = other.elegance;
        self.severity = other.severity;
        self.quality = other.quality;
    }

    /// The fields that take part in phrase value-equivalence.
    pub(crate) fn salient(&self) -> (Tense, Perspective, Position, bool, bool, bool) {
        (
            self.tense,
            self.perspective,
            self.position,
            self.determinant,
            self.plural,
            self.possessive,
        )
    }
}
