/// Rule Linter — validates language pack word rules and contractions.
///
/// Usage: rule_linter <language_dir> [--lexicon <file>]

use sensory_narrative::core::grammar::{Language, WordRule};
use sensory_narrative::core::language::LanguageRegistry;
use sensory_narrative::core::lexicon::{Lexicon, MemoryLexicon};
use sensory_narrative::core::pipeline::EXISTENTIAL;
use sensory_narrative::schema::context::LexicalContext;
use sensory_narrative::schema::lexica::LexicalType;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: rule_linter <language_dir> [--lexicon <file>]");
        process::exit(0);
    }

    let language_dir = &args[1];
    let mut lexicon_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--lexicon" && i + 1 < args.len() {
            i += 1;
            lexicon_path = Some(args[i].clone());
        }
        i += 1;
    }

    let mut registry = LanguageRegistry::new();
    let path = Path::new(language_dir);

    let loaded = if path.is_file() {
        registry.load_from_ron(path)
    } else if path.is_dir() {
        registry.load_dir(path)
    } else {
        eprintln!("ERROR: Path '{}' does not exist", language_dir);
        process::exit(1);
    };
    if let Err(e) = loaded {
        eprintln!("ERROR: Failed to load language pack: {}", e);
        process::exit(1);
    }

    let lexicon = match lexicon_path {
        Some(ref path) => match MemoryLexicon::load_from_ron(Path::new(path)) {
            Ok(lexicon) => Some(lexicon),
            Err(e) => {
                eprintln!("ERROR: Failed to load lexicon: {}", e);
                process::exit(1);
            }
        },
        None => None,
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let mut names: Vec<&str> = registry.names().collect();
    names.sort_unstable();
    for name in names {
        if let Some(language) = registry.get(name) {
            println!(
                "Loaded '{}': {} rules, {} contractions",
                name,
                language.rules.len(),
                language.contractions.len()
            );
            lint_language(language, &mut errors, &mut warnings);
            if let Some(ref lexicon) = lexicon {
                lint_lexicon(language, lexicon, &mut warnings);
            }
        }
    }

    // Print report
    println!("\n=== Rule Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

/// The rule with every output cleared, leaving only what it matches on.
fn predicate_of(rule: &WordRule) -> WordRule {
    WordRule {
        add_prefix: None,
        add_suffix: None,
        needs_article: None,
        modification_order: None,
        alters_sentence: None,
        listable: None,
        ..rule.clone()
    }
}

fn sets_nothing(rule: &WordRule) -> bool {
    rule.add_prefix.is_none()
        && rule.add_suffix.is_none()
        && rule.needs_article.is_none()
        && rule.modification_order.is_none()
        && rule.alters_sentence.is_none()
        && rule.listable.is_none()
}

/// Output properties set by both rules to different values.
fn conflicting_outputs(a: &WordRule, b: &WordRule) -> Vec<&'static str> {
    let mut conflicts = Vec::new();
    if a.add_prefix.is_some() && b.add_prefix.is_some() && a.add_prefix != b.add_prefix {
        conflicts.push("add_prefix");
    }
    if a.add_suffix.is_some() && b.add_suffix.is_some() && a.add_suffix != b.add_suffix {
        conflicts.push("add_suffix");
    }
    if a.needs_article.is_some() && b.needs_article.is_some() && a.needs_article != b.needs_article {
        conflicts.push("needs_article");
    }
    if a.modification_order.is_some()
        && b.modification_order.is_some()
        && a.modification_order != b.modification_order
    {
        conflicts.push("modification_order");
    }
    if a.alters_sentence.is_some() && b.alters_sentence.is_some() && a.alters_sentence != b.alters_sentence {
        conflicts.push("alters_sentence");
    }
    if a.listable.is_some() && b.listable.is_some() && a.listable != b.listable {
        conflicts.push("listable");
    }
    conflicts
}

fn has_empty_alternative(list: &str) -> bool {
    !list.is_empty() && list.split('|').any(|alt| alt.trim().is_empty())
}

fn lint_language(language: &Language, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    let name = &language.name;

    for (index, rule) in language.rules.iter().enumerate() {
        for (field, list) in [
            ("from_semantics", &rule.from_semantics),
            ("from_begins_with", &rule.from_begins_with),
            ("from_ends_with", &rule.from_ends_with),
        ] {
            if has_empty_alternative(list) {
                errors.push(format!(
                    "'{}' rule #{} has an empty alternative in {} ('{}')",
                    name, index, field, list
                ));
            }
        }

        if sets_nothing(rule) {
            warnings.push(format!("'{}' rule #{} changes nothing", name, index));
        }

        if rule.when_positional {
            warnings.push(format!(
                "'{}' rule #{} sets when_positional, which only raises its specificity",
                name, index
            ));
        }
    }

    // Rules matching the same phrases at the same specificity: the earlier
    // one always wins, so a later conflicting value is dead.
    for (i, first) in language.rules.iter().enumerate() {
        for (j, later) in language.rules.iter().enumerate().skip(i + 1) {
            if first == later {
                warnings.push(format!("'{}' rule #{} duplicates rule #{}", name, j, i));
                continue;
            }
            if predicate_of(first) != predicate_of(later) {
                continue;
            }
            for property in conflicting_outputs(first, later) {
                warnings.push(format!(
                    "'{}' rule #{} never wins {}: rule #{} matches the same phrases first",
                    name, j, property, i
                ));
            }
        }
    }

    for (index, rule) in language.contractions.iter().enumerate() {
        if rule.first.trim().is_empty() || rule.second.trim().is_empty() {
            errors.push(format!("'{}' contraction #{} has an empty word", name, index));
        }
        if rule.contraction.trim().is_empty() {
            errors.push(format!(
                "'{}' contraction #{} ({} + {}) collapses to nothing",
                name, index, rule.first, rule.second
            ));
        }
        if rule.contraction.eq_ignore_ascii_case(&rule.first)
            || rule.contraction.eq_ignore_ascii_case(&rule.second)
        {
            warnings.push(format!(
                "'{}' contraction #{} ({} + {}) collapses to one of its own words",
                name, index, rule.first, rule.second
            ));
        }
    }
}

fn lint_lexicon(language: &Language, lexicon: &MemoryLexicon, warnings: &mut Vec<String>) {
    let ctx = LexicalContext::in_language(language.name.as_str()).with_semantic(EXISTENTIAL);
    if lexicon.get_word(&ctx, LexicalType::Verb).is_none() {
        warnings.push(format!(
            "Lexicon has no '{}' verb for '{}'; described subjects will render without a verb",
            EXISTENTIAL, language.name
        ));
    }

    let plain = LexicalContext::in_language(language.name.as_str());
    for rule in &language.rules {
        if let Some(word) = rule.specific_word.as_deref().filter(|w| !w.is_empty()) {
            // find_dictata falls back to any type sharing the spelling
            let known = lexicon.find_dictata(word, LexicalType::Verb, &plain).is_some();
            if !known {
                warnings.push(format!(
                    "'{}' rule for specific word '{}' names a word missing from the lexicon",
                    language.name, word
                ));
            }
        }
    }
}
