use serde::{Deserialize, Serialize};

use super::event::{SensoryEvent, SensoryType};

/// Newtype wrapper for entity IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Newtype wrapper for the ID of whoever is perceiving a phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObserverId(pub u64);

/// Gender form of an entity, used when a phrase has to fall back to a
/// pronoun instead of a proper name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pronouns {
    /// she/her/her
    SheHer,
    /// he/him/his
    HeHim,
    /// they/them/their
    #[default]
    TheyThem,
    /// it/it/its
    ItIts,
}

impl Pronouns {
    /// Nominative/subject form: "she", "he", "they", "it".
    pub fn subject(&self) -> &'static str {
        match self {
            Self::SheHer => "she",
            Self::HeHim => "he",
            Self::TheyThem => "they",
            Self::ItIts => "it",
        }
    }
}

/// A stored descriptive element: a perceivable detail plus the offset it
/// applies to the viewer's receptive band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptive {
    pub event: SensoryEvent,
    #[serde(default)]
    pub modifier: i16,
}

impl Descriptive {
    pub fn new(event: SensoryEvent) -> Self {
        Self { event, modifier: 0 }
    }

    pub fn with_modifier(mut self, modifier: i16) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn sensory_type(&self) -> SensoryType {
        self.event.sensory_type
    }
}

/// Anything in the world that can be perceived and described.
///
/// Entities own their descriptive templates. Rendering never mutates
/// them; every render pass works on clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub proper_name: bool,
    #[serde(default)]
    pub pronouns: Pronouns,
    #[serde(default)]
    pub descriptives: Vec<Descriptive>,
}

impl Entity {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            proper_name: false,
            pronouns: Pronouns::default(),
            descriptives: Vec::new(),
        }
    }

    pub fn with_descriptive(mut self, descriptive: Descriptive) -> Self {
        self.descriptives.push(descriptive);
        self
    }

    /// Descriptives on one channel, in authoring order.
    pub fn descriptives_on(&self, channel: SensoryType) -> impl Iterator<Item = &Descriptive> {
        self.descriptives
            .iter()
            .filter(move |d| d.sensory_type() == channel)
    }
}
