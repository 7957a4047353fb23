/// Obscura — the generic phrase substituted when detection saturates.
///
/// A subject the perceiver cannot make out (too faint or too intense) loses
/// its description and becomes a short verb phrase such as "see shadows" or
/// "hear loud sounds".
use crate::schema::context::LexicalContext;
use crate::schema::event::SensoryType;
use crate::schema::lexica::{GrammaticalRole, Lexica, LexicalType};

/// Elegance of the coarser obscured phrasings.
const CRUDE: i32 = -5;

/// One row of the obscura table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObscuraEntry {
    pub verb: &'static str,
    pub noun: &'static str,
    pub noun_elegance: i32,
    pub adjective: Option<&'static str>,
    pub adjective_elegance: i32,
    /// The adjective qualifies the verb rather than the noun.
    pub adjective_on_verb: bool,
}

impl ObscuraEntry {
    const fn new(verb: &'static str, noun: &'static str, adjective: Option<&'static str>) -> Self {
        Self {
            verb,
            noun,
            noun_elegance: 0,
            adjective,
            adjective_elegance: 0,
            adjective_on_verb: false,
        }
    }
}

/// The canned phrase for `channel`. `over` selects the saturating-high
/// column (positive strength); otherwise the too-faint column.
pub fn obscura_entry(channel: SensoryType, over: bool) -> ObscuraEntry {
    match (channel, over) {
        (SensoryType::Audible, false) => ObscuraEntry::new("hear", "sounds", Some("soft")),
        (SensoryType::Audible, true) => ObscuraEntry::new("hear", "sounds", Some("loud")),
        (SensoryType::Olefactory, false) => ObscuraEntry::new("smell", "something", Some("subtle")),
        (SensoryType::Olefactory, true) => {
            ObscuraEntry::new("smell", "something", Some("pungent"))
        }
        (SensoryType::Psychic, false) => ObscuraEntry::new("sense", "presence", Some("vague")),
        (SensoryType::Psychic, true) => {
            ObscuraEntry::new("sense", "presence", Some("disturbing"))
        }
        (SensoryType::Tactile, false) => ObscuraEntry {
            adjective_on_verb: true,
            ..ObscuraEntry::new("brushes", "skin", Some("lightly"))
        },
        (SensoryType::Tactile, true) => ObscuraEntry {
            noun_elegance: CRUDE,
            ..ObscuraEntry::new("rubs", "you", None)
        },
        (SensoryType::Taste, false) => ObscuraEntry::new("taste", "something", Some("subtle")),
        (SensoryType::Taste, true) => ObscuraEntry {
            adjective_elegance: CRUDE,
            ..ObscuraEntry::new("taste", "something", Some("offensive"))
        },
        (SensoryType::Visible, false) => ObscuraEntry::new("see", "shadows", None),
        (SensoryType::Visible, true) => ObscuraEntry::new("see", "lights", Some("blinding")),
    }
}

/// Replace `subject` in place with the obscured phrase for `channel`.
///
/// The subject's modifiers are discarded and it becomes a Verb-role verb
/// carrying one noun object and, where the table has one, one adjective.
/// Only language, observer, gender form and tone ratings survive from the
/// original context.
pub fn obscure(subject: &mut Lexica, channel: SensoryType, over: bool) {
    let entry = obscura_entry(channel, over);

    let original = &subject.context;
    let base = LexicalContext {
        language: original.language.clone(),
        observer: original.observer,
        gender_form: original.gender_form,
        elegance: original.elegance,
        severity: original.severity,
        quality: original.quality,
        ..LexicalContext::default()
    };

    subject.clear_modifiers();
    subject.role = GrammaticalRole::Verb;
    subject.word_type = LexicalType::Verb;
    subject.phrase = entry.verb.to_string();
    subject.context = base.clone();

    let mut noun_ctx = base.clone();
    noun_ctx.elegance += entry.noun_elegance;
    let noun = Lexica::new(
        LexicalType::Noun,
        GrammaticalRole::DirectObject,
        entry.noun,
        noun_ctx,
    );

    let adjective = entry.adjective.map(|word| {
        let mut adj_ctx = base.clone();
        adj_ctx.elegance += entry.adjective_elegance;
        Lexica::new(LexicalType::Adjective, GrammaticalRole::Descriptive, word, adj_ctx)
    });

    match adjective {
        Some(adjective) if entry.adjective_on_verb => {
            subject.try_modify(noun, false).try_modify(adjective, false);
        }
        Some(adjective) => {
            subject.try_modify(noun, true).try_modify(adjective, false);
        }
        None => {
            subject.try_modify(noun, false);
        }
    }
}
