/// The rendering pipeline: SensoryEvent → Sentences → text.
///
/// Wires together language resolution, subject extraction, existential
/// verb repair, obscura substitution and phrase text production.
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::core::config::{ConfigError, RenderConfig};
use crate::core::grammar::{GrammarError, Language};
use crate::core::language::LanguageRegistry;
use crate::core::lexicon::{Lexicon, LexiconError, MemoryLexicon};
use crate::core::obscura::obscure;
use crate::core::perception::PerceptionModel;
use crate::core::sentence::{compose_prose, PhraseWriter, RenderedSentence, Sentence, SentenceType};
use crate::schema::context::{LexicalContext, Perspective, Position, Tense};
use crate::schema::event::SensoryEvent;
use crate::schema::lexica::{GrammaticalRole, Lexica, LexicalType};

/// Semantic tag the lexicon uses to mark verbs of being.
pub const EXISTENTIAL: &str = "existential";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),
    #[error("lexicon error: {0}")]
    Lexicon(#[from] LexiconError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("base language '{0}' is not loaded")]
    MissingBaseLanguage(String),
}

/// The top-level renderer. Built via `Narrator::builder()`.
///
/// Language packs, the lexicon and the configuration are read-only after
/// construction; every render method takes `&self` and works on its own
/// copy of the event, so one narrator can serve many threads.
pub struct Narrator {
    languages: Arc<LanguageRegistry>,
    lexicon: Arc<dyn Lexicon>,
    config: RenderConfig,
    perception: PerceptionModel,
}

/// Builder for constructing a `Narrator`.
pub struct NarratorBuilder {
    languages_dir: Option<String>,
    lexicon_path: Option<String>,
    config_path: Option<String>,
    seed: u64,
    /// Directly provided languages (for testing without files).
    languages: Option<LanguageRegistry>,
    /// Directly provided lexicon (for testing without files).
    lexicon: Option<Arc<dyn Lexicon>>,
    /// Directly provided config (for testing without files).
    config: Option<RenderConfig>,
}

impl Narrator {
    pub fn builder() -> NarratorBuilder {
        NarratorBuilder {
            languages_dir: None,
            lexicon_path: None,
            config_path: None,
            seed: 0,
            languages: None,
            lexicon: None,
            config: None,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn perception(&self) -> &PerceptionModel {
        &self.perception
    }

    pub fn lexicon(&self) -> &dyn Lexicon {
        self.lexicon.as_ref()
    }

    pub fn languages(&self) -> &LanguageRegistry {
        &self.languages
    }

    /// Break an event into ordered sentences.
    ///
    /// The event is never mutated: the tree is cloned first and all repair
    /// work happens on the copy. `overriding` supplies the caller's
    /// narrative voice (language, tense, perspective, tone); it is only
    /// read. With `anonymize`, the root's name is replaced by a pronoun.
    pub fn unpack(
        &self,
        event: &SensoryEvent,
        overriding: Option<&LexicalContext>,
        anonymize: bool,
    ) -> Result<Vec<Sentence>, PipelineError> {
        let mut root = event.event.clone();
        if root.phrase.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(voice) = overriding {
            root.context.adopt_voice(voice);
        }

        let language = self.resolve_language(root.context.language.as_deref())?;
        root.context.language = Some(language.name.clone());

        if anonymize {
            self.anonymize(&mut root);
        }

        // Subject-role modifiers of the root become clauses of their own.
        let detached = root.take_modifiers(|m| m.role == GrammaticalRole::Subject);
        let mut subjects = Vec::with_capacity(detached.len() + 1);
        subjects.push(root);
        for mut subject in detached {
            if subject.context.language.is_none() {
                subject.context.language = Some(language.name.clone());
            }
            subjects.push(subject);
        }

        let mut sentences = Vec::new();
        for mut subject in subjects {
            let nested = flatten_subjects(&mut subject);
            self.complete(&mut subject);

            if subject.has_modifier_role(GrammaticalRole::Verb) {
                sentences.push(self.sentence(SentenceType::Partial, subject, event));
            } else {
                if event.is_saturated() && nested.is_empty() {
                    debug!(channel = ?event.sensory_type, strength = event.strength, "obscuring subject");
                    obscure(&mut subject, event.sensory_type, event.is_over());
                }
                sentences.push(self.sentence(SentenceType::Statement, subject, event));
            }

            for inner in nested {
                sentences.push(self.sentence(SentenceType::Statement, inner, event));
            }
        }

        Ok(sentences)
    }

    /// Render one sentence in its subject's language.
    pub fn write(&self, sentence: &Sentence) -> Result<RenderedSentence, PipelineError> {
        let language = self.resolve_language(sentence.subject.context.language.as_deref())?;
        Ok(PhraseWriter::new(language, self.lexicon.as_ref()).write(sentence))
    }

    /// Unpack and render every sentence of an event as bare clause text.
    pub fn make_sentences(
        &self,
        event: &SensoryEvent,
        overriding: Option<&LexicalContext>,
        anonymize: bool,
    ) -> Result<Vec<String>, PipelineError> {
        Ok(self
            .render(event, overriding, anonymize)?
            .into_iter()
            .map(|rendered| rendered.text)
            .filter(|text| !text.is_empty())
            .collect())
    }

    /// Unpack and render an event as punctuated prose.
    pub fn describe_event(
        &self,
        event: &SensoryEvent,
        overriding: Option<&LexicalContext>,
        anonymize: bool,
    ) -> Result<String, PipelineError> {
        Ok(compose_prose(&self.render(event, overriding, anonymize)?))
    }

    fn render(
        &self,
        event: &SensoryEvent,
        overriding: Option<&LexicalContext>,
        anonymize: bool,
    ) -> Result<Vec<RenderedSentence>, PipelineError> {
        self.unpack(event, overriding, anonymize)?
            .iter()
            .map(|sentence| self.write(sentence))
            .collect()
    }

    fn sentence(&self, sentence_type: SentenceType, subject: Lexica, event: &SensoryEvent) -> Sentence {
        Sentence::new(sentence_type, subject, event.sensory_type, event.strength)
    }

    fn resolve_language(&self, requested: Option<&str>) -> Result<&Language, PipelineError> {
        self.languages
            .resolve(requested, &self.config.base_language)
            .ok_or_else(|| PipelineError::MissingBaseLanguage(self.config.base_language.clone()))
    }

    /// Replace the root's name with a pronoun.
    fn anonymize(&self, root: &mut Lexica) {
        let pronoun_ctx = LexicalContext {
            position: Position::None,
            tense: Tense::Present,
            determinant: false,
            semantics: Default::default(),
            perspective: Perspective::SecondPerson,
            ..root.context.clone()
        };

        let pronoun = match self.lexicon.get_word(&pronoun_ctx, LexicalType::Pronoun) {
            Some(word) => word.name,
            None => {
                let fallback = root.context.gender_form.unwrap_or_default().subject();
                debug!(fallback, "no pronoun in lexicon, using gender form");
                fallback.to_string()
            }
        };

        root.phrase = pronoun;
        root.word_type = LexicalType::Pronoun;
        root.context = pronoun_ctx;
    }

    /// Give a verbless subject that still carries a description an
    /// existential verb, and move the description under it.
    fn complete(&self, subject: &mut Lexica) {
        if subject.modifiers().is_empty() || subject.has_modifier_role(GrammaticalRole::Verb) {
            return;
        }

        let mut verb_ctx = subject.context.clone();
        verb_ctx.semantics.clear();
        verb_ctx.semantics.insert(EXISTENTIAL.to_string());
        verb_ctx.position = Position::None;
        verb_ctx.determinant = false;
        verb_ctx.possessive = false;

        let Some(word) = self.lexicon.get_word(&verb_ctx, LexicalType::Verb) else {
            debug!(subject = %subject.phrase, "no existential verb in lexicon, leaving subject as is");
            return;
        };

        let mut verb = Lexica::new(LexicalType::Verb, GrammaticalRole::Verb, word.name, verb_ctx);
        verb.try_modify_all(subject.clear_modifiers());
        subject.try_modify(verb, false);
    }
}

/// Detach every Subject-role modifier below `subject`, depth first, so each
/// can become its own sentence.
fn flatten_subjects(subject: &mut Lexica) -> Vec<Lexica> {
    let mut flattened = Vec::new();
    for mut inner in subject.take_modifiers(|m| m.role == GrammaticalRole::Subject) {
        let deeper = flatten_subjects(&mut inner);
        flattened.push(inner);
        flattened.extend(deeper);
    }
    flattened
}

impl NarratorBuilder {
    pub fn languages_dir(mut self, path: &str) -> Self {
        self.languages_dir = Some(path.to_string());
        self
    }

    pub fn lexicon_path(mut self, path: &str) -> Self {
        self.lexicon_path = Some(path.to_string());
        self
    }

    pub fn config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    /// Seed for the built-in lexicon's tie-breaking.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Provide languages directly (for testing without files).
    pub fn with_languages(mut self, languages: LanguageRegistry) -> Self {
        self.languages = Some(languages);
        self
    }

    /// Provide a lexicon implementation directly.
    pub fn with_lexicon(mut self, lexicon: Arc<dyn Lexicon>) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    /// Provide the config directly (for testing without files).
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<Narrator, PipelineError> {
        let config = match (self.config, &self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => RenderConfig::load_from_ron(Path::new(path))?,
            (None, None) => RenderConfig::default(),
        };

        let mut languages = self.languages.unwrap_or_default();
        if let Some(ref dir) = self.languages_dir {
            if Path::new(dir).exists() {
                languages.load_dir(Path::new(dir))?;
            }
        }

        let lexicon: Arc<dyn Lexicon> = match (self.lexicon, &self.lexicon_path) {
            (Some(lexicon), _) => lexicon,
            (None, Some(path)) => {
                Arc::new(MemoryLexicon::load_from_ron(Path::new(path))?.with_seed(self.seed))
            }
            (None, None) => Arc::new(MemoryLexicon::new().with_seed(self.seed)),
        };

        let perception = PerceptionModel::new(config.baseline_emission);

        Ok(Narrator {
            languages: Arc::new(languages),
            lexicon,
            config,
            perception,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::dictata::Dictata;
    use crate::schema::entity::Pronouns;
    use crate::schema::event::SensoryType;

    fn build_test_narrator() -> Narrator {
        let language_ron = r#"Language(
            name: "english",
            rules: [
                WordRule(from_type: Some(Noun), needs_article: Some(true)),
                WordRule(from_type: Some(ProperNoun), needs_article: Some(false)),
                WordRule(from_type: Some(Adjective), listable: Some(true)),
            ],
        )"#;
        let mut languages = LanguageRegistry::new();
        languages.register(Language::parse_ron(language_ron).unwrap());

        let lexicon = MemoryLexicon::from_words(vec![
            Dictata::new("is", LexicalType::Verb)
                .with_lexeme("be")
                .with_semantic(EXISTENTIAL)
                .with_tense(Tense::Present),
            Dictata::new("was", LexicalType::Verb)
                .with_lexeme("be")
                .with_semantic(EXISTENTIAL)
                .with_tense(Tense::Past),
            Dictata::new("you", LexicalType::Pronoun).with_perspective(Perspective::SecondPerson),
        ]);

        Narrator::builder()
            .seed(42)
            .with_languages(languages)
            .with_lexicon(Arc::new(lexicon))
            .build()
            .unwrap()
    }

    fn lantern() -> Lexica {
        Lexica::new(
            LexicalType::Noun,
            GrammaticalRole::Subject,
            "lantern",
            LexicalContext::in_language("english").with_determinant(true),
        )
    }

    fn event(root: Lexica, strength: i16, channel: SensoryType) -> SensoryEvent {
        SensoryEvent::new(root, strength, channel)
    }

    #[test]
    fn empty_phrase_unpacks_to_nothing() {
        let narrator = build_test_narrator();
        let root = Lexica::word(LexicalType::Noun, GrammaticalRole::Subject, "");
        let sentences = narrator
            .unpack(&event(root, 0, SensoryType::Visible), None, false)
            .unwrap();
        assert!(sentences.is_empty());
    }

    #[test]
    fn bare_subject_is_a_statement() {
        let narrator = build_test_narrator();
        let sentences = narrator
            .unpack(&event(lantern(), 0, SensoryType::Visible), None, false)
            .unwrap();
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].sentence_type, SentenceType::Statement);
        assert_eq!(narrator.write(&sentences[0]).unwrap().text, "the lantern");
    }

    #[test]
    fn described_subject_gets_existential_verb() {
        let narrator = build_test_narrator();
        let mut root = lantern();
        root.try_modify_word(LexicalType::Adjective, GrammaticalRole::Descriptive, "dim", false);
        root.try_modify_word(LexicalType::Adjective, GrammaticalRole::Descriptive, "swaying", false);

        let sentences = narrator
            .unpack(&event(root, 0, SensoryType::Visible), None, false)
            .unwrap();
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].sentence_type, SentenceType::Partial);

        let subject = &sentences[0].subject;
        assert_eq!(subject.modifiers().len(), 1);
        let verb = &subject.modifiers()[0];
        assert_eq!(verb.role, GrammaticalRole::Verb);
        assert_eq!(verb.phrase, "is");
        let moved: Vec<&str> = verb.modifiers().iter().map(|m| m.phrase.as_str()).collect();
        assert_eq!(moved, vec!["dim", "swaying"]);

        assert_eq!(
            narrator.write(&sentences[0]).unwrap().text,
            "the lantern is dim and swaying"
        );
    }

    #[test]
    fn existing_verb_is_kept() {
        let narrator = build_test_narrator();
        let mut root = lantern();
        root.try_modify_word(LexicalType::Verb, GrammaticalRole::Verb, "sways", false);
        root.try_modify_word(LexicalType::Adjective, GrammaticalRole::Descriptive, "dim", false);

        let sentences = narrator
            .unpack(&event(root, 0, SensoryType::Visible), None, false)
            .unwrap();
        assert_eq!(sentences[0].subject.modifiers().len(), 2);
        assert_eq!(
            narrator.write(&sentences[0]).unwrap().text,
            "the dim lantern sways"
        );
    }

    #[test]
    fn subject_modifiers_become_clauses_in_order() {
        let narrator = build_test_narrator();
        let mut root = lantern();
        root.try_modify_word(LexicalType::Verb, GrammaticalRole::Verb, "sways", false);
        root.try_modify_word(LexicalType::Noun, GrammaticalRole::Subject, "moth", true)
            .try_modify_word(LexicalType::Verb, GrammaticalRole::Verb, "circles", false);
        root.try_modify_word(LexicalType::Noun, GrammaticalRole::Subject, "shadow", false);

        let template = root.clone();
        let sentences = narrator
            .unpack(&event(root, 0, SensoryType::Visible), None, false)
            .unwrap();

        let texts: Vec<String> = sentences
            .iter()
            .map(|s| narrator.write(s).unwrap().text)
            .collect();
        assert_eq!(texts, vec!["the lantern sways", "the moth circles", "the shadow"]);
        assert_eq!(sentences[0].sentence_type, SentenceType::Partial);
        assert_eq!(sentences[1].sentence_type, SentenceType::Partial);
        assert_eq!(sentences[2].sentence_type, SentenceType::Statement);

        // The caller's tree is untouched.
        assert_eq!(template.modifiers().len(), 3);
    }

    #[test]
    fn nested_subjects_are_flattened() {
        let narrator = build_test_narrator();
        let mut root = lantern();
        {
            let moth = root.try_modify_word(LexicalType::Noun, GrammaticalRole::Subject, "moth", true);
            moth.try_modify_word(LexicalType::Verb, GrammaticalRole::Verb, "circles", false);
            moth.try_modify_word(LexicalType::Noun, GrammaticalRole::Subject, "wing", true)
                .try_modify_word(LexicalType::Verb, GrammaticalRole::Verb, "beats", false);
        }

        let sentences = narrator
            .unpack(&event(root, 0, SensoryType::Visible), None, false)
            .unwrap();
        let texts: Vec<String> = sentences
            .iter()
            .map(|s| narrator.write(s).unwrap().text)
            .collect();
        assert_eq!(texts, vec!["the lantern", "the moth circles", "the wing beats"]);
        assert_eq!(sentences[2].sentence_type, SentenceType::Statement);
    }

    #[test]
    fn saturated_bare_subject_is_obscured() {
        let narrator = build_test_narrator();
        let sentences = narrator
            .unpack(&event(lantern(), -100, SensoryType::Visible), None, false)
            .unwrap();
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].sentence_type, SentenceType::Statement);
        assert_eq!(sentences[0].strength, -100);
        assert_eq!(narrator.write(&sentences[0]).unwrap().text, "see shadows");

        let sentences = narrator
            .unpack(&event(lantern(), 100, SensoryType::Audible), None, false)
            .unwrap();
        assert_eq!(narrator.write(&sentences[0]).unwrap().text, "hear loud sounds");
    }

    #[test]
    fn unsaturated_subject_is_not_obscured() {
        let narrator = build_test_narrator();
        let sentences = narrator
            .unpack(&event(lantern(), -99, SensoryType::Visible), None, false)
            .unwrap();
        assert_eq!(narrator.write(&sentences[0]).unwrap().text, "the lantern");
        assert_eq!(sentences[0].strength, -99);
    }

    #[test]
    fn overriding_context_does_not_leak() {
        let narrator = build_test_narrator();
        let mut root = lantern();
        root.try_modify_word(LexicalType::Adjective, GrammaticalRole::Descriptive, "dim", false);
        let original = event(root, 0, SensoryType::Visible);

        let voice = LexicalContext::in_language("english").with_tense(Tense::Past);
        let lines = narrator.make_sentences(&original, Some(&voice), false).unwrap();
        assert_eq!(lines, vec!["the lantern was dim"]);

        // Neither the event nor the voice was touched.
        assert_eq!(original.event.context.tense, Tense::Present);
        assert_eq!(original.event.modifiers().len(), 1);
        assert_eq!(voice.tense, Tense::Past);
        assert!(voice.semantics.is_empty());

        // A later render without a voice is back in the present.
        let lines = narrator.make_sentences(&original, None, false).unwrap();
        assert_eq!(lines, vec!["the lantern is dim"]);
    }

    #[test]
    fn unknown_language_falls_back_to_base() {
        let narrator = build_test_narrator();
        let root = Lexica::new(
            LexicalType::Noun,
            GrammaticalRole::Subject,
            "lantern",
            LexicalContext::in_language("orcish").with_determinant(true),
        );
        let sentences = narrator
            .unpack(&event(root, 0, SensoryType::Visible), None, false)
            .unwrap();
        assert_eq!(sentences[0].subject.context.language.as_deref(), Some("english"));
        assert_eq!(narrator.write(&sentences[0]).unwrap().text, "the lantern");
    }

    #[test]
    fn missing_base_language_is_an_error() {
        let narrator = Narrator::builder()
            .with_config(RenderConfig {
                base_language: "gnomish".to_string(),
                ..RenderConfig::default()
            })
            .build()
            .unwrap();
        let result = narrator.unpack(&event(lantern(), 0, SensoryType::Visible), None, false);
        assert!(matches!(result, Err(PipelineError::MissingBaseLanguage(ref l)) if l == "gnomish"));
    }

    #[test]
    fn anonymize_uses_second_person_pronoun() {
        let narrator = build_test_narrator();
        let mut root = Lexica::new(
            LexicalType::ProperNoun,
            GrammaticalRole::Subject,
            "Aldric",
            LexicalContext::in_language("english")
                .with_tense(Tense::Past)
                .with_semantic("noble"),
        );
        root.try_modify_word(LexicalType::Verb, GrammaticalRole::Verb, "waves", false);

        let lines = narrator
            .make_sentences(&event(root, 0, SensoryType::Visible), None, true)
            .unwrap();
        assert_eq!(lines, vec!["you waves"]);
    }

    #[test]
    fn anonymize_falls_back_to_gender_form() {
        let narrator = Narrator::builder()
            .with_languages(build_test_narrator().languages().clone())
            .build()
            .unwrap();
        let root = Lexica::new(
            LexicalType::ProperNoun,
            GrammaticalRole::Subject,
            "Mira",
            LexicalContext::in_language("english").with_gender_form(Pronouns::SheHer),
        );
        let lines = narrator
            .make_sentences(&event(root, 0, SensoryType::Visible), None, true)
            .unwrap();
        assert_eq!(lines, vec!["she"]);
    }

    #[test]
    fn describe_event_produces_prose() {
        let narrator = build_test_narrator();
        let mut root = lantern();
        root.try_modify_word(LexicalType::Adjective, GrammaticalRole::Descriptive, "dim", false);
        root.try_modify_word(LexicalType::Noun, GrammaticalRole::Subject, "moth", true)
            .try_modify_word(LexicalType::Verb, GrammaticalRole::Verb, "circles", false);

        let prose = narrator
            .describe_event(&event(root, 0, SensoryType::Visible), None, false)
            .unwrap();
        assert_eq!(prose, "The lantern is dim, the moth circles.");
    }

    #[test]
    fn builder_loads_shipped_data() {
        let narrator = Narrator::builder()
            .languages_dir("language_data")
            .lexicon_path("language_data/english/lexicon.ron")
            .config_path("language_data/config.ron")
            .build()
            .unwrap();
        assert!(narrator.languages().get("english").is_some());
        assert_eq!(narrator.config().base_language, "english");
        assert_eq!(narrator.perception().baseline_emission, 30.0);
    }
}
