/// Sentences and phrase text production.
///
/// A `Sentence` is a clause-sized phrase tree coming out of the assembler.
/// `PhraseWriter` turns it into words by shaping every node with its
/// language's word rules, placing modifiers around their heads, and
/// collapsing contractions.
use serde::{Deserialize, Serialize};

use crate::core::grammar::Language;
use crate::core::lexicon::Lexicon;
use crate::schema::event::SensoryType;
use crate::schema::lexica::{GrammaticalRole, Lexica, LexicalType};

/// Fallback definite article when the lexicon has none.
const DEFAULT_ARTICLE: &str = "the";

/// The kind of sentence a clause renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SentenceType {
    /// A clause that continues into the following sentence.
    Partial,
    #[default]
    Statement,
    Question,
    Exclamation,
}

impl SentenceType {
    /// Terminal punctuation.
    pub fn terminal(&self) -> &'static str {
        match self {
            Self::Partial => "",
            Self::Statement => ".",
            Self::Question => "?",
            Self::Exclamation => "!",
        }
    }
}

/// One clause produced by the assembler.
#[derive(Debug, Clone)]
pub struct Sentence {
    pub sentence_type: SentenceType,
    pub subject: Lexica,
    pub sensory_type: SensoryType,
    /// Detection strength of the event this clause came from.
    pub strength: i16,
}

impl Sentence {
    pub fn new(
        sentence_type: SentenceType,
        subject: Lexica,
        sensory_type: SensoryType,
        strength: i16,
    ) -> Self {
        Self {
            sentence_type,
            subject,
            sensory_type,
            strength,
        }
    }
}

/// Rendered clause text plus the sentence type after rule overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSentence {
    pub text: String,
    pub sentence_type: SentenceType,
}

impl RenderedSentence {
    /// Capitalized text with the terminal mark of its type.
    pub fn punctuate(&self) -> String {
        format!("{}{}", capitalize(&self.text), self.sentence_type.terminal())
    }
}

/// Join rendered clauses into prose. Partial clauses run into the next
/// clause with a comma.
pub fn compose_prose(sentences: &[RenderedSentence]) -> String {
    let mut prose = String::new();
    let mut open_clause = false;

    for (i, sentence) in sentences.iter().enumerate() {
        if sentence.text.is_empty() {
            continue;
        }
        if !prose.is_empty() {
            prose.push(' ');
        }

        if open_clause {
            prose.push_str(&sentence.text);
        } else {
            prose.push_str(&capitalize(&sentence.text));
        }

        open_clause = sentence.sentence_type == SentenceType::Partial;
        if open_clause {
            let has_more = sentences[i + 1..].iter().any(|s| !s.text.is_empty());
            prose.push_str(if has_more { "," } else { "." });
        } else {
            prose.push_str(sentence.sentence_type.terminal());
        }
    }

    prose
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A realized subtree, as seen by its parent.
struct Realized {
    words: Vec<String>,
    order: i16,
    listable: bool,
    word_type: LexicalType,
}

/// Produces text for phrase trees in one language.
pub struct PhraseWriter<'a> {
    language: &'a Language,
    lexicon: &'a dyn Lexicon,
    needs_dictata: bool,
}

impl<'a> PhraseWriter<'a> {
    pub fn new(language: &'a Language, lexicon: &'a dyn Lexicon) -> Self {
        // Dictata are only consulted by word-bound rules, so skip the
        // lexicon round trip when the pack has none.
        let needs_dictata = language
            .rules
            .iter()
            .any(|rule| rule.specific_word.as_deref().is_some_and(|w| !w.is_empty()));
        Self {
            language,
            lexicon,
            needs_dictata,
        }
    }

    /// Render one clause.
    pub fn write(&self, sentence: &Sentence) -> RenderedSentence {
        let mut altered = None;
        let realized = self.realize(&sentence.subject, None, &mut altered);
        let words = self.language.contract(realized.words);

        RenderedSentence {
            text: words.join(" "),
            sentence_type: altered.unwrap_or(sentence.sentence_type),
        }
    }

    /// Render a bare phrase tree without sentence bookkeeping.
    pub fn write_phrase(&self, lex: &Lexica) -> String {
        let mut altered = None;
        let realized = self.realize(lex, None, &mut altered);
        self.language.contract(realized.words).join(" ")
    }

    fn realize(
        &self,
        lex: &Lexica,
        head_type: Option<LexicalType>,
        altered: &mut Option<SentenceType>,
    ) -> Realized {
        let dictata = if self.needs_dictata {
            lex.get_dictata(self.lexicon)
        } else {
            None
        };
        let shape = self.language.shape_for(lex, dictata.as_ref());
        if altered.is_none() {
            *altered = shape.alters_sentence;
        }

        let mut before: Vec<Realized> = Vec::new();
        let mut after: Vec<Realized> = Vec::new();
        for modifier in lex.modifiers() {
            let child = self.realize(modifier, Some(lex.word_type), altered);
            if child.order < 0 {
                before.push(child);
            } else {
                after.push(child);
            }
        }
        before.sort_by_key(|child| child.order);
        after.sort_by_key(|child| child.order);

        let mut words = Vec::new();
        if shape.needs_article()
            && lex.context.determinant
            && !lex
                .modifiers()
                .iter()
                .any(|m| m.word_type == LexicalType::Article)
        {
            words.push(self.article_for(lex));
        }
        words.extend(join_listed(before));
        if !lex.phrase.is_empty() {
            words.push(shape.inflect(&lex.phrase));
        }
        words.extend(join_listed(after));

        Realized {
            words,
            order: shape
                .modification_order
                .unwrap_or_else(|| default_order(lex, head_type)),
            listable: shape.is_listable(),
            word_type: lex.word_type,
        }
    }

    fn article_for(&self, lex: &Lexica) -> String {
        let mut ctx = lex.context.clone();
        ctx.semantics.clear();
        ctx.semantics.insert("definite".to_string());
        self.lexicon
            .get_word(&ctx, LexicalType::Article)
            .map(|d| d.name)
            .unwrap_or_else(|| DEFAULT_ARTICLE.to_string())
    }
}

/// Where a modifier sits relative to its head when no rule says otherwise.
fn default_order(lex: &Lexica, head_type: Option<LexicalType>) -> i16 {
    let nominal_head = head_type.is_some_and(|t| t.is_nominal());
    match lex.word_type {
        LexicalType::Article => -2,
        LexicalType::Adjective if nominal_head => -1,
        _ if lex.role == GrammaticalRole::DirectObject => 1,
        _ => 2,
    }
}

/// Flatten sibling subtrees into words, joining runs of listable siblings of
/// one type as "a, b and c".
fn join_listed(children: Vec<Realized>) -> Vec<String> {
    let mut words = Vec::new();
    let mut run: Vec<String> = Vec::new();
    let mut run_type: Option<LexicalType> = None;

    for child in children {
        if child.listable && (run.is_empty() || run_type == Some(child.word_type)) {
            run_type = Some(child.word_type);
            run.push(child.words.join(" "));
            continue;
        }

        flush_run(&mut run, &mut words);
        if child.listable {
            run_type = Some(child.word_type);
            run.push(child.words.join(" "));
        } else {
            run_type = None;
            words.extend(child.words);
        }
    }
    flush_run(&mut run, &mut words);

    words
}

fn flush_run(run: &mut Vec<String>, words: &mut Vec<String>) {
    match run.len() {
        0 => {}
        1 => words.push(run.remove(0)),
        _ => {
            let last = run.pop().unwrap_or_default();
            words.push(format!("{} and {}", run.join(", "), last));
            run.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grammar::{ContractionRule, WordRule};
    use crate::core::lexicon::MemoryLexicon;
    use crate::schema::context::{LexicalContext, Tense};
    use crate::schema::dictata::Dictata;

    fn english() -> Language {
        Language {
            name: "english".to_string(),
            rules: vec![
                WordRule {
                    from_type: Some(LexicalType::Noun),
                    needs_article: Some(true),
                    ..WordRule::default()
                },
                WordRule {
                    from_type: Some(LexicalType::Adjective),
                    listable: Some(true),
                    ..WordRule::default()
                },
                WordRule {
                    from_type: Some(LexicalType::Noun),
                    when_plural: true,
                    add_suffix: Some("s".to_string()),
                    ..WordRule::default()
                },
            ],
            contractions: vec![ContractionRule {
                first: "it".to_string(),
                second: "is".to_string(),
                contraction: "it's".to_string(),
            }],
        }
    }

    fn ctx() -> LexicalContext {
        LexicalContext::in_language("english")
    }

    fn statement(subject: Lexica) -> Sentence {
        Sentence::new(SentenceType::Statement, subject, SensoryType::Visible, 0)
    }

    #[test]
    fn verb_with_object() {
        let language = Language::new("bare");
        let lexicon = MemoryLexicon::new();
        let writer = PhraseWriter::new(&language, &lexicon);

        let mut see = Lexica::new(LexicalType::Verb, GrammaticalRole::Verb, "see", ctx());
        see.try_modify_word(LexicalType::Noun, GrammaticalRole::DirectObject, "shadows", false);

        let rendered = writer.write(&statement(see));
        assert_eq!(rendered.text, "see shadows");
        assert_eq!(rendered.sentence_type, SentenceType::Statement);
        assert_eq!(rendered.punctuate(), "See shadows.");
    }

    #[test]
    fn adjectives_precede_nominal_heads_and_follow_verbs() {
        let language = Language::new("bare");
        let lexicon = MemoryLexicon::new();
        let writer = PhraseWriter::new(&language, &lexicon);

        let mut hear = Lexica::new(LexicalType::Verb, GrammaticalRole::Verb, "hear", ctx());
        hear.try_modify_word(LexicalType::Noun, GrammaticalRole::DirectObject, "sounds", true)
            .try_modify_word(LexicalType::Adjective, GrammaticalRole::Descriptive, "soft", false);
        assert_eq!(writer.write_phrase(&hear), "hear soft sounds");

        let mut is = Lexica::new(LexicalType::Verb, GrammaticalRole::Verb, "is", ctx());
        is.try_modify_word(LexicalType::Adjective, GrammaticalRole::Descriptive, "humming", false);
        assert_eq!(writer.write_phrase(&is), "is humming");
    }

    #[test]
    fn determinant_nouns_get_an_article() {
        let language = english();
        let lexicon = MemoryLexicon::new();
        let writer = PhraseWriter::new(&language, &lexicon);

        let mut lamp = Lexica::new(
            LexicalType::Noun,
            GrammaticalRole::Subject,
            "lamp",
            ctx().with_determinant(true),
        );
        lamp.try_modify_word(LexicalType::Verb, GrammaticalRole::Verb, "flickers", false);
        assert_eq!(writer.write_phrase(&lamp), "the lamp flickers");

        let plain = Lexica::new(LexicalType::Noun, GrammaticalRole::Subject, "lamp", ctx());
        assert_eq!(writer.write_phrase(&plain), "lamp");
    }

    #[test]
    fn article_comes_from_lexicon_when_known() {
        let language = english();
        let lexicon = MemoryLexicon::from_words(vec![
            Dictata::new("ye", LexicalType::Article).with_semantic("definite"),
        ]);
        let writer = PhraseWriter::new(&language, &lexicon);

        let lamp = Lexica::new(
            LexicalType::Noun,
            GrammaticalRole::Subject,
            "lamp",
            ctx().with_determinant(true),
        );
        assert_eq!(writer.write_phrase(&lamp), "ye lamp");
    }

    #[test]
    fn listable_siblings_are_joined() {
        let language = english();
        let lexicon = MemoryLexicon::new();
        let writer = PhraseWriter::new(&language, &lexicon);

        let mut rope = Lexica::new(LexicalType::Noun, GrammaticalRole::Subject, "rope", ctx());
        rope.try_modify_words([
            (LexicalType::Adjective, GrammaticalRole::Descriptive, "long"),
            (LexicalType::Adjective, GrammaticalRole::Descriptive, "frayed"),
            (LexicalType::Adjective, GrammaticalRole::Descriptive, "damp"),
        ]);
        assert_eq!(writer.write_phrase(&rope), "long, frayed and damp rope");
    }

    #[test]
    fn modification_order_rule_moves_modifier() {
        let mut language = Language::new("test");
        language.rules.push(WordRule {
            specific_word: Some("aplenty".to_string()),
            modification_order: Some(3),
            ..WordRule::default()
        });
        let lexicon = MemoryLexicon::new();
        let writer = PhraseWriter::new(&language, &lexicon);

        let mut coins = Lexica::new(LexicalType::Noun, GrammaticalRole::Subject, "coins", ctx());
        coins.try_modify_word(LexicalType::Adjective, GrammaticalRole::Descriptive, "aplenty", false);
        coins.try_modify_word(LexicalType::Adjective, GrammaticalRole::Descriptive, "gold", false);
        assert_eq!(writer.write_phrase(&coins), "gold coins aplenty");
    }

    #[test]
    fn rules_inflect_and_contractions_collapse() {
        let language = english();
        let lexicon = MemoryLexicon::new();
        let writer = PhraseWriter::new(&language, &lexicon);

        let mut it = Lexica::new(LexicalType::Pronoun, GrammaticalRole::Subject, "it", ctx());
        it.try_modify_word(LexicalType::Verb, GrammaticalRole::Verb, "is", true)
            .try_modify(
                Lexica::new(
                    LexicalType::Noun,
                    GrammaticalRole::DirectObject,
                    "coin",
                    ctx().with_plural(true),
                ),
                false,
            );
        assert_eq!(writer.write_phrase(&it), "it's coins");
    }

    #[test]
    fn alters_sentence_overrides_type() {
        let mut language = Language::new("test");
        language.rules.push(WordRule {
            specific_word: Some("whether".to_string()),
            alters_sentence: Some(SentenceType::Question),
            ..WordRule::default()
        });
        let lexicon = MemoryLexicon::new();
        let writer = PhraseWriter::new(&language, &lexicon);

        let mut wonder = Lexica::new(LexicalType::Verb, GrammaticalRole::Verb, "wonder", ctx());
        wonder.try_modify_word(LexicalType::Conjunction, GrammaticalRole::Descriptive, "whether", false);

        let rendered = writer.write(&statement(wonder));
        assert_eq!(rendered.sentence_type, SentenceType::Question);
        assert_eq!(rendered.punctuate(), "Wonder whether?");
    }

    #[test]
    fn past_tense_verbs_keep_specific_forms() {
        let mut language = Language::new("test");
        language.rules.push(WordRule {
            from_type: Some(LexicalType::Verb),
            tense: Some(Tense::Past),
            add_suffix: Some("ed".to_string()),
            ..WordRule::default()
        });
        language.rules.push(WordRule {
            specific_word: Some("was".to_string()),
            add_suffix: Some(String::new()),
            ..WordRule::default()
        });
        let lexicon = MemoryLexicon::new();
        let writer = PhraseWriter::new(&language, &lexicon);

        let past = ctx().with_tense(Tense::Past);
        let mut bell = Lexica::new(LexicalType::Noun, GrammaticalRole::Subject, "bell", past.clone());
        bell.try_modify(
            Lexica::new(LexicalType::Verb, GrammaticalRole::Verb, "was", past.clone()),
            true,
        )
        .try_modify_word(LexicalType::Adjective, GrammaticalRole::Descriptive, "ringing", false);
        assert_eq!(writer.write_phrase(&bell), "bell was ringing");

        let toll = Lexica::new(LexicalType::Verb, GrammaticalRole::Verb, "toll", past);
        assert_eq!(writer.write_phrase(&toll), "tolled");
    }

    #[test]
    fn prose_joins_partial_clauses() {
        let sentences = vec![
            RenderedSentence {
                text: "the lamp is lit".to_string(),
                sentence_type: SentenceType::Partial,
            },
            RenderedSentence {
                text: "a moth circles".to_string(),
                sentence_type: SentenceType::Statement,
            },
            RenderedSentence {
                text: "see shadows".to_string(),
                sentence_type: SentenceType::Exclamation,
            },
        ];
        assert_eq!(
            compose_prose(&sentences),
            "The lamp is lit, a moth circles. See shadows!"
        );

        let lone = vec![RenderedSentence {
            text: "the lamp is lit".to_string(),
            sentence_type: SentenceType::Partial,
        }];
        assert_eq!(compose_prose(&lone), "The lamp is lit.");
        assert_eq!(compose_prose(&[]), "");
    }
}
