//! Sensory Narrative — perception-scaled phrase rendering for text worlds.
//!
//! Turns structured descriptions of things in a virtual world into short
//! natural-language sentences, tuned to how well the observer can perceive
//! them: a lantern in a dark room is "the lantern is dim", one the viewer
//! cannot make out at all becomes "see shadows". Word shapes, placement
//! and contractions come from data-driven language packs in RON.

pub mod core;
pub mod schema;
