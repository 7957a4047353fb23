/// Grammar rules — word transformation rules, contractions, and the language
/// packs that bundle them.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::sentence::SentenceType;
use crate::schema::context::{Perspective, Tense};
use crate::schema::dictata::Dictata;
use crate::schema::lexica::{GrammaticalRole, Lexica, LexicalType};

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("language pack has no name")]
    Unnamed,
}

/// Split a pipe-delimited alternatives list, dropping empty entries.
fn alternatives(list: &str) -> impl Iterator<Item = &str> {
    list.split('|').map(str::trim).filter(|alt| !alt.is_empty())
}

fn has_alternatives(list: &str) -> bool {
    alternatives(list).next().is_some()
}

fn pipe_count(list: &str) -> i32 {
    list.matches('|').count() as i32
}

/// A declarative grammar transformation.
///
/// The `from_*`, `tense`, `perspective`, `when_*` and `specific_word` fields
/// decide whether the rule applies to a phrase; the remaining fields are the
/// changes it makes. `None` in a predicate field is a wildcard. `None` in an
/// output field means the rule leaves that property to other rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordRule {
    pub from_type: Option<LexicalType>,
    pub from_role: Option<GrammaticalRole>,
    /// Pipe-delimited semantic tags.
    pub from_semantics: String,
    /// Pipe-delimited prefixes, any of which may start the phrase.
    pub from_begins_with: String,
    /// Pipe-delimited suffixes, any of which may end the phrase.
    pub from_ends_with: String,
    pub tense: Option<Tense>,
    pub perspective: Option<Perspective>,
    pub when_plural: bool,
    pub when_possessive: bool,
    pub when_positional: bool,
    /// When set, the rule applies to this one word regardless of role or type.
    pub specific_word: Option<String>,

    pub add_prefix: Option<String>,
    pub add_suffix: Option<String>,
    pub needs_article: Option<bool>,
    pub modification_order: Option<i16>,
    pub alters_sentence: Option<SentenceType>,
    pub listable: Option<bool>,
}

impl WordRule {
    fn specific_word(&self) -> Option<&str> {
        self.specific_word.as_deref().filter(|w| !w.is_empty())
    }

    /// Whether this rule applies to `lex`. `dictata` is the resolved sense of
    /// `lex`, consulted only by rules bound to a specific word.
    pub fn matches(&self, lex: &Lexica, dictata: Option<&Dictata>) -> bool {
        let phrase = lex.phrase.to_lowercase();
        let ctx = &lex.context;

        if has_alternatives(&self.from_begins_with)
            && !alternatives(&self.from_begins_with)
                .any(|alt| phrase.starts_with(&alt.to_lowercase()))
        {
            return false;
        }

        if has_alternatives(&self.from_ends_with)
            && !alternatives(&self.from_ends_with).any(|alt| phrase.ends_with(&alt.to_lowercase()))
        {
            return false;
        }

        if self.tense.is_some_and(|tense| tense != ctx.tense) {
            return false;
        }
        if self
            .perspective
            .is_some_and(|perspective| perspective != ctx.perspective)
        {
            return false;
        }
        if self.when_plural && !ctx.plural {
            return false;
        }
        if self.when_possessive && !ctx.possessive {
            return false;
        }

        match self.specific_word() {
            Some(word) => dictata.is_some_and(|d| d.is_word(word)),
            None => {
                self.from_role.map_or(true, |role| role == lex.role)
                    && self.from_type.map_or(true, |t| t == lex.word_type)
            }
        }
    }

    /// How constrained this rule is. Higher scores win when several rules
    /// match the same phrase.
    pub fn specificity(&self) -> i32 {
        let mut score = 0;

        if has_alternatives(&self.from_semantics) {
            score += 3 * pipe_count(&self.from_semantics) + 1;
        }
        if has_alternatives(&self.from_ends_with) {
            score += pipe_count(&self.from_ends_with) + 3;
        }
        if has_alternatives(&self.from_begins_with) {
            score += pipe_count(&self.from_begins_with) + 3;
        }
        if self.specific_word().is_some() {
            score += 99;
        }
        if self.tense.is_some() {
            score += 2;
        }
        if self.perspective.is_some() {
            score += 2;
        }
        if self.from_type.is_some() {
            score += 3;
        }
        if self.from_role.is_some() {
            score += 2;
        }
        if self.when_plural {
            score += 2;
        }
        if self.when_possessive {
            score += 2;
        }
        if self.when_positional {
            score += 6;
        }

        score
    }
}

/// Two words that collapse into a third when they appear side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractionRule {
    pub first: String,
    pub second: String,
    pub contraction: String,
}

impl ContractionRule {
    /// Order-independent, case-insensitive pair test.
    pub fn collapses(&self, a: &str, b: &str) -> bool {
        let (first, second) = (self.first.as_str(), self.second.as_str());
        (first.eq_ignore_ascii_case(a) && second.eq_ignore_ascii_case(b))
            || (first.eq_ignore_ascii_case(b) && second.eq_ignore_ascii_case(a))
    }
}

/// The combined output of every rule that applied to one phrase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordShape {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub needs_article: Option<bool>,
    pub modification_order: Option<i16>,
    pub alters_sentence: Option<SentenceType>,
    pub listable: Option<bool>,
}

impl WordShape {
    /// Take every property `rule` sets that no earlier rule has set.
    fn absorb(&mut self, rule: &WordRule) {
        if self.prefix.is_none() {
            self.prefix = rule.add_prefix.clone();
        }
        if self.suffix.is_none() {
            self.suffix = rule.add_suffix.clone();
        }
        if self.needs_article.is_none() {
            self.needs_article = rule.needs_article;
        }
        if self.modification_order.is_none() {
            self.modification_order = rule.modification_order;
        }
        if self.alters_sentence.is_none() {
            self.alters_sentence = rule.alters_sentence;
        }
        if self.listable.is_none() {
            self.listable = rule.listable;
        }
    }

    /// The phrase with prefix and suffix attached.
    pub fn inflect(&self, phrase: &str) -> String {
        format!(
            "{}{}{}",
            self.prefix.as_deref().unwrap_or(""),
            phrase,
            self.suffix.as_deref().unwrap_or("")
        )
    }

    pub fn needs_article(&self) -> bool {
        self.needs_article.unwrap_or(false)
    }

    pub fn is_listable(&self) -> bool {
        self.listable.unwrap_or(false)
    }
}

/// A language pack: the word rules and contractions for one language.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename = "Language")]
pub struct Language {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<WordRule>,
    #[serde(default)]
    pub contractions: Vec<ContractionRule>,
}

impl Language {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            contractions: Vec::new(),
        }
    }

    /// Load a language pack from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Language, GrammarError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a language pack from a RON string.
    pub fn parse_ron(input: &str) -> Result<Language, GrammarError> {
        let language: Language = ron::from_str(input)?;
        if language.name.trim().is_empty() {
            return Err(GrammarError::Unnamed);
        }
        Ok(language)
    }

    /// Whether this pack carries any word rules at all.
    pub fn has_rules(&self) -> bool {
        !self.rules.is_empty()
    }

    /// Merge another pack's tables into this one. Rules are appended, so on
    /// equal specificity the rules already present keep precedence.
    pub fn merge(&mut self, other: Language) {
        self.rules.extend(other.rules);
        self.contractions.extend(other.contractions);
    }

    /// Every rule matching `lex`, most specific first. Equal scores keep
    /// table order.
    pub fn matching_rules(&self, lex: &Lexica, dictata: Option<&Dictata>) -> Vec<&WordRule> {
        let mut matched: Vec<&WordRule> = self
            .rules
            .iter()
            .filter(|rule| rule.matches(lex, dictata))
            .collect();
        // sort_by_key is stable
        matched.sort_by_key(|rule| std::cmp::Reverse(rule.specificity()));
        matched
    }

    /// Resolve the combined shape of every rule applying to `lex`. The most
    /// specific rule to set a property wins it.
    pub fn shape_for(&self, lex: &Lexica, dictata: Option<&Dictata>) -> WordShape {
        let mut shape = WordShape::default();
        for rule in self.matching_rules(lex, dictata) {
            shape.absorb(rule);
        }
        shape
    }

    /// Find the contraction for an adjacent word pair.
    pub fn contraction_for(&self, a: &str, b: &str) -> Option<&ContractionRule> {
        self.contractions.iter().find(|rule| rule.collapses(a, b))
    }

    /// Collapse adjacent pairs in `words` left to right.
    pub fn contract(&self, words: Vec<String>) -> Vec<String> {
        if self.contractions.is_empty() {
            return words;
        }

        let mut out: Vec<String> = Vec::with_capacity(words.len());
        for word in words {
            let collapsed = out
                .last()
                .and_then(|prev| self.contraction_for(prev, &word))
                .map(|rule| rule.contraction.clone());
            match collapsed {
                Some(contraction) => {
                    out.pop();
                    out.push(contraction);
                }
                None => out.push(word),
            }
        }
        out
    }
}
