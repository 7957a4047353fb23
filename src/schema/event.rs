use serde::{Deserialize, Serialize};

use super::lexica::Lexica;

/// Lowest signed detection strength: far below the perceptible floor.
pub const MIN_STRENGTH: i16 = -100;
/// Highest signed detection strength: fully saturating the perceiver.
pub const MAX_STRENGTH: i16 = 100;

/// The perceptual channel an event is carried on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensoryType {
    Visible,
    Audible,
    Olefactory,
    Psychic,
    Tactile,
    Taste,
}

impl SensoryType {
    /// Every channel, in a stable order.
    pub const ALL: [SensoryType; 6] = [
        Self::Visible,
        Self::Audible,
        Self::Olefactory,
        Self::Psychic,
        Self::Tactile,
        Self::Taste,
    ];

    /// Returns the tag string for this channel (e.g., "sense:audible").
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Visible => "sense:visible",
            Self::Audible => "sense:audible",
            Self::Olefactory => "sense:olefactory",
            Self::Psychic => "sense:psychic",
            Self::Tactile => "sense:tactile",
            Self::Taste => "sense:taste",
        }
    }
}

/// A perceivable occurrence: a phrase tree, the channel it travels on and
/// how strongly the current perceiver detects it.
///
/// Negative strength means the event sits below the perceiver's floor,
/// positive means it saturates their ceiling, zero is cleanly perceived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensoryEvent {
    pub event: Lexica,
    pub strength: i16,
    pub sensory_type: SensoryType,
}

impl SensoryEvent {
    pub fn new(event: Lexica, strength: i16, sensory_type: SensoryType) -> Self {
        Self {
            event,
            strength: strength.clamp(MIN_STRENGTH, MAX_STRENGTH),
            sensory_type,
        }
    }

    pub fn set_strength(&mut self, strength: i16) {
        self.strength = strength.clamp(MIN_STRENGTH, MAX_STRENGTH);
    }

    /// Detection is pinned to either end of the scale.
    pub fn is_saturated(&self) -> bool {
        self.strength.abs() == MAX_STRENGTH
    }

    /// Positive strength: too intense rather than too faint.
    pub fn is_over(&self) -> bool {
        self.strength > 0
    }
}
