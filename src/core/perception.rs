/// Perceptual delta calculation: how strongly a viewer detects something
/// on each sensory channel.
use serde::{Deserialize, Serialize};

use crate::schema::event::{SensoryType, MAX_STRENGTH, MIN_STRENGTH};

/// Emission used for every channel except sight until entities carry
/// their own per-channel emission values.
pub const BASELINE_EMISSION: f64 = 30.0;

/// The band of stimulus a viewer can perceive on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseRange {
    pub low: i16,
    pub high: i16,
}

impl SenseRange {
    pub fn new(low: i16, high: i16) -> Self {
        Self { low, high }
    }

    pub fn midpoint(&self) -> f64 {
        (f64::from(self.low) + f64::from(self.high)) / 2.0
    }
}

/// The viewer-capability interface: one receptive band per channel.
pub trait Perceiver {
    fn visual_range(&self) -> SenseRange;
    fn auditory_range(&self) -> SenseRange;
    fn olefactory_range(&self) -> SenseRange;
    fn psychic_range(&self) -> SenseRange;
    fn tactile_range(&self) -> SenseRange;
    fn taste_range(&self) -> SenseRange;

    /// The band for `channel`.
    fn range_for(&self, channel: SensoryType) -> SenseRange {
        match channel {
            SensoryType::Visible => self.visual_range(),
            SensoryType::Audible => self.auditory_range(),
            SensoryType::Olefactory => self.olefactory_range(),
            SensoryType::Psychic => self.psychic_range(),
            SensoryType::Tactile => self.tactile_range(),
            SensoryType::Taste => self.taste_range(),
        }
    }
}

/// A fixed set of receptive bands, e.g. for a species template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseProfile {
    pub visual: SenseRange,
    pub auditory: SenseRange,
    pub olefactory: SenseRange,
    pub psychic: SenseRange,
    pub tactile: SenseRange,
    pub taste: SenseRange,
}

impl Default for SenseProfile {
    fn default() -> Self {
        Self {
            visual: SenseRange::new(10, 90),
            auditory: SenseRange::new(1, 100),
            olefactory: SenseRange::new(10, 80),
            psychic: SenseRange::new(60, 100),
            tactile: SenseRange::new(1, 100),
            taste: SenseRange::new(10, 80),
        }
    }
}

impl SenseProfile {
    /// Replace the band for one channel.
    pub fn with_range(mut self, channel: SensoryType, range: SenseRange) -> Self {
        match channel {
            SensoryType::Visible => self.visual = range,
            SensoryType::Audible => self.auditory = range,
            SensoryType::Olefactory => self.olefactory = range,
            SensoryType::Psychic => self.psychic = range,
            SensoryType::Tactile => self.tactile = range,
            SensoryType::Taste => self.taste = range,
        }
        self
    }
}

impl Perceiver for SenseProfile {
    fn visual_range(&self) -> SenseRange {
        self.visual
    }
    fn auditory_range(&self) -> SenseRange {
        self.auditory
    }
    fn olefactory_range(&self) -> SenseRange {
        self.olefactory
    }
    fn psychic_range(&self) -> SenseRange {
        self.psychic
    }
    fn tactile_range(&self) -> SenseRange {
        self.tactile
    }
    fn taste_range(&self) -> SenseRange {
        self.taste
    }
}

/// Where a perceived thing is: the part of the environment that feeds
/// emission.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Surroundings {
    /// Ambient light level of the location.
    pub luminosity: f64,
}

/// Signed detection strength for one emission against one receptive band.
///
/// Negative: below the floor (too faint), down to -100. Positive: above the
/// ceiling (too intense), up to 100. Zero: cleanly perceptible. `modifier`
/// widens (positive) or narrows (negative) the band on both ends.
pub fn perceptual_delta(emission: f64, range: SenseRange, modifier: i16) -> i16 {
    let modifier = f64::from(modifier);
    let low_delta = emission - (f64::from(range.low) - modifier);
    let high_delta = (f64::from(range.high) + modifier) - emission;

    if low_delta < 0.0 {
        low_delta.max(f64::from(MIN_STRENGTH)) as i16
    } else if high_delta < 0.0 {
        high_delta.abs().min(f64::from(MAX_STRENGTH)) as i16
    } else {
        0
    }
}

/// Per-channel emission model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptionModel {
    pub baseline_emission: f64,
}

impl Default for PerceptionModel {
    fn default() -> Self {
        Self {
            baseline_emission: BASELINE_EMISSION,
        }
    }
}

impl PerceptionModel {
    pub fn new(baseline_emission: f64) -> Self {
        Self { baseline_emission }
    }

    /// What a thing emits on `channel`. Sight is governed by the light of
    /// the surroundings, not by the thing itself.
    pub fn emission(&self, channel: SensoryType, surroundings: &Surroundings) -> f64 {
        match channel {
            SensoryType::Visible => surroundings.luminosity,
            _ => self.baseline_emission,
        }
    }

    /// Detection strength of a `channel` emission for `viewer`, querying
    /// the viewer's band once.
    pub fn strength_for(
        &self,
        channel: SensoryType,
        viewer: &dyn Perceiver,
        surroundings: &Surroundings,
        modifier: i16,
    ) -> i16 {
        perceptual_delta(
            self.emission(channel, surroundings),
            viewer.range_for(channel),
            modifier,
        )
    }
}
