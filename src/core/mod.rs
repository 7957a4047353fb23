pub mod config;
pub mod grammar;
pub mod language;
pub mod lexicon;
pub mod obscura;
pub mod observation;
pub mod perception;
pub mod pipeline;
pub mod sentence;
