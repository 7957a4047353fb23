/// Language registry — the loaded language packs, keyed by name.
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::core::grammar::{GrammarError, Language};

/// Registry of every loaded language pack.
///
/// Built once at startup and then only read, so a single registry can be
/// shared (behind an `Arc`) by every rendering thread.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    languages: HashMap<String, Language>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self {
            languages: HashMap::new(),
        }
    }

    /// Register a pack. A pack with a name already present is merged into
    /// the existing one.
    pub fn register(&mut self, language: Language) {
        match self.languages.get_mut(&language.name) {
            Some(existing) => existing.merge(language),
            None => {
                self.languages.insert(language.name.clone(), language);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Language> {
        self.languages.get(name)
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    /// The pack to render `requested` in: the requested pack if it exists
    /// and has word rules, otherwise the base pack.
    pub fn resolve(&self, requested: Option<&str>, base: &str) -> Option<&Language> {
        if let Some(language) = requested.and_then(|name| self.get(name)) {
            if language.has_rules() {
                return Some(language);
            }
        }
        debug!(requested = ?requested, base, "falling back to base language");
        self.get(base)
    }

    /// Load a single language pack file.
    pub fn load_from_ron(&mut self, path: &Path) -> Result<(), GrammarError> {
        let language = Language::load_from_ron(path)?;
        info!(language = %language.name, rules = language.rules.len(), path = %path.display(), "loaded language pack");
        self.register(language);
        Ok(())
    }

    /// Load every `language.ron` found directly in `dir` or one level below
    /// it (`<dir>/<language>/language.ron`).
    pub fn load_dir(&mut self, dir: &Path) -> Result<(), GrammarError> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                let pack = path.join("language.ron");
                if pack.exists() {
                    self.load_from_ron(&pack)?;
                }
            } else if path.file_name().and_then(|s| s.to_str()) == Some("language.ron") {
                self.load_from_ron(&path)?;
            }
        }
        Ok(())
    }
}
