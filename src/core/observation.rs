/// Observation — what a viewer notices about an entity.
///
/// Scales each stored descriptive against the viewer's senses and renders
/// the result. Rendering failures never reach the caller; they are logged
/// and the affected descriptive is simply left out.
use tracing::warn;

use crate::core::perception::{Perceiver, Surroundings};
use crate::core::pipeline::Narrator;
use crate::schema::context::LexicalContext;
use crate::schema::entity::{Descriptive, Entity};
use crate::schema::event::SensoryEvent;
use crate::schema::lexica::{GrammaticalRole, Lexica, LexicalType};

/// The event a viewer actually receives from one descriptive: a copy of the
/// stored template with its strength recomputed for this viewer.
pub fn perceive(
    narrator: &Narrator,
    descriptive: &Descriptive,
    viewer: &dyn Perceiver,
    surroundings: &Surroundings,
) -> SensoryEvent {
    let mut event = descriptive.event.clone();
    let strength = narrator.perception().strength_for(
        event.sensory_type,
        viewer,
        surroundings,
        descriptive.modifier,
    );
    event.set_strength(strength);
    event
}

/// The phrase tree for `entity` as the subject of a perceived detail.
///
/// The detail is attached only when the viewer can make it out; a
/// saturated event keeps a bare subject so it renders as an obscura.
pub fn subject_for(entity: &Entity, perceived: &SensoryEvent) -> SensoryEvent {
    let detail = &perceived.event;
    let context = LexicalContext {
        language: detail.context.language.clone(),
        tense: detail.context.tense,
        determinant: !entity.proper_name,
        gender_form: Some(entity.pronouns),
        ..LexicalContext::default()
    };
    let word_type = if entity.proper_name {
        LexicalType::ProperNoun
    } else {
        LexicalType::Noun
    };

    let mut root = Lexica::new(word_type, GrammaticalRole::Subject, entity.name.as_str(), context);
    if !perceived.is_saturated() && !detail.phrase.is_empty() {
        root.try_modify(detail.clone(), false);
    }
    SensoryEvent::new(root, perceived.strength, perceived.sensory_type)
}

/// Describe every descriptive of `entity` the way `viewer` perceives it,
/// one line of prose per descriptive.
pub fn describe_entity(
    narrator: &Narrator,
    entity: &Entity,
    viewer: &dyn Perceiver,
    surroundings: &Surroundings,
    overriding: Option<&LexicalContext>,
) -> Vec<String> {
    let anonymize = narrator.config().anonymize;
    entity
        .descriptives
        .iter()
        .filter_map(|descriptive| {
            let perceived = perceive(narrator, descriptive, viewer, surroundings);
            let event = subject_for(entity, &perceived);
            match narrator.describe_event(&event, overriding, anonymize) {
                Ok(line) if !line.is_empty() => Some(line),
                Ok(_) => None,
                Err(e) => {
                    warn!(entity = %entity.name, channel = ?perceived.sensory_type, error = %e, "failed to describe entity");
                    None
                }
            }
        })
        .collect()
}
