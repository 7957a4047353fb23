/// Preview — interactive rendering shell for testing language packs.
///
/// Usage: preview --languages <dir> [--lexicon <file>] [--config <file>] [--seed <n>]
///
/// Commands:
///   entity <name> <channel> <strength> <word...>  — add a descriptive to an entity
///   proper <name>                                 — mark an entity's name as proper
///   range <channel> <low> <high>                  — set the viewer's band
///   light <n>                                     — set ambient luminosity
///   modifier <n>                                  — band offset for new descriptives
///   tense <past|present|future>                   — narrative tense
///   lang <name>                                   — narrative language
///   anon                                          — toggle anonymized subjects
///   look                                          — describe every entity
///   help                                          — list commands
///   quit                                          — exit
///
/// Set RUST_LOG=debug to watch fallbacks and lexicon selection.

use sensory_narrative::core::observation::{perceive, subject_for};
use sensory_narrative::core::perception::{SenseProfile, SenseRange, Surroundings};
use sensory_narrative::core::pipeline::Narrator;
use sensory_narrative::schema::context::{LexicalContext, Tense};
use sensory_narrative::schema::entity::{Descriptive, Entity, EntityId};
use sensory_narrative::schema::event::{SensoryEvent, SensoryType};
use sensory_narrative::schema::lexica::{GrammaticalRole, Lexica, LexicalType};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut languages_dir = None;
    let mut lexicon_path = None;
    let mut config_path = None;
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--languages" if i + 1 < args.len() => {
                i += 1;
                languages_dir = Some(args[i].clone());
            }
            "--lexicon" if i + 1 < args.len() => {
                i += 1;
                lexicon_path = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut builder = Narrator::builder().seed(seed);
    if let Some(ref dir) = languages_dir {
        builder = builder.languages_dir(dir);
    }
    if let Some(ref path) = lexicon_path {
        builder = builder.lexicon_path(path);
    }
    if let Some(ref path) = config_path {
        builder = builder.config_path(path);
    }
    let narrator = match builder.build() {
        Ok(narrator) => narrator,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let mut names: Vec<&str> = narrator.languages().names().collect();
    names.sort_unstable();
    println!("Languages: {}", names.join(", "));
    println!("Base language: {}", narrator.config().base_language);
    println!("Seed: {}", seed);
    println!("Type 'help' for commands.\n");

    // Session state
    let mut entities: Vec<Entity> = Vec::new();
    let mut viewer = SenseProfile::default();
    let mut surroundings = Surroundings { luminosity: 50.0 };
    let mut modifier: i16 = 0;
    let mut voice = LexicalContext::in_language(narrator.config().base_language.as_str());
    let mut anonymize = false;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "entity" => {
                if parts.len() < 5 {
                    println!("Usage: entity <name> <channel> <strength> <word...>");
                    println!("  channel: visible, audible, olefactory, psychic, tactile, taste");
                    continue;
                }
                let Some(channel) = parse_channel(parts[2]) else {
                    println!("Unknown channel: {}", parts[2]);
                    continue;
                };
                let Ok(strength) = parts[3].parse::<i16>() else {
                    println!("Strength must be a number: {}", parts[3]);
                    continue;
                };
                let detail = Lexica::new(
                    LexicalType::Adjective,
                    GrammaticalRole::Descriptive,
                    parts[4..].join(" "),
                    LexicalContext::default(),
                );
                let descriptive =
                    Descriptive::new(SensoryEvent::new(detail, strength, channel)).with_modifier(modifier);

                match entities.iter_mut().find(|e| e.name == parts[1]) {
                    Some(entity) => entity.descriptives.push(descriptive),
                    None => {
                        let id = EntityId(entities.len() as u64 + 1);
                        entities.push(Entity::new(id, parts[1]).with_descriptive(descriptive));
                    }
                }
                println!("Described {} on {}", parts[1], channel.tag());
            }
            "proper" => {
                if parts.len() < 2 {
                    println!("Usage: proper <name>");
                    continue;
                }
                match entities.iter_mut().find(|e| e.name == parts[1]) {
                    Some(entity) => {
                        entity.proper_name = !entity.proper_name;
                        println!("{} proper name: {}", entity.name, entity.proper_name);
                    }
                    None => println!("No entity named {}", parts[1]),
                }
            }
            "range" => {
                if parts.len() < 4 {
                    println!("Usage: range <channel> <low> <high>");
                    continue;
                }
                let Some(channel) = parse_channel(parts[1]) else {
                    println!("Unknown channel: {}", parts[1]);
                    continue;
                };
                match (parts[2].parse::<i16>(), parts[3].parse::<i16>()) {
                    (Ok(low), Ok(high)) => {
                        viewer = viewer.with_range(channel, SenseRange::new(low, high));
                        println!("Viewer {} band: {}..{}", channel.tag(), low, high);
                    }
                    _ => println!("Band bounds must be numbers"),
                }
            }
            "light" => match parts.get(1).and_then(|s| s.parse::<f64>().ok()) {
                Some(luminosity) => {
                    surroundings.luminosity = luminosity;
                    println!("Luminosity: {}", luminosity);
                }
                None => println!("Usage: light <n>"),
            },
            "modifier" => match parts.get(1).and_then(|s| s.parse::<i16>().ok()) {
                Some(n) => {
                    modifier = n;
                    println!("Modifier for new descriptives: {}", n);
                }
                None => println!("Usage: modifier <n>"),
            },
            "tense" => match parts.get(1).and_then(|s| parse_tense(s)) {
                Some(tense) => {
                    voice.tense = tense;
                    println!("Tense: {:?}", tense);
                }
                None => println!("Usage: tense <past|present|future>"),
            },
            "lang" => match parts.get(1) {
                Some(name) => {
                    voice.language = Some(name.to_string());
                    if narrator.languages().get(name).is_none() {
                        println!("'{}' is not loaded; rendering will fall back", name);
                    }
                    println!("Language: {}", name);
                }
                None => println!("Usage: lang <name>"),
            },
            "anon" => {
                anonymize = !anonymize;
                println!("Anonymize: {}", anonymize);
            }
            "look" => {
                if entities.is_empty() {
                    println!("Nothing here. Add one with 'entity'.");
                    continue;
                }
                for entity in &entities {
                    println!("{}:", entity.name);
                    for descriptive in &entity.descriptives {
                        let perceived = perceive(&narrator, descriptive, &viewer, &surroundings);
                        let event = subject_for(entity, &perceived);
                        match narrator.describe_event(&event, Some(&voice), anonymize) {
                            Ok(prose) => println!("  [{:>4}] {}", perceived.strength, prose),
                            Err(e) => println!("  ERROR: {}", e),
                        }
                    }
                }
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for commands.", cmd);
            }
        }
    }
}

fn print_usage() {
    println!("Usage: preview --languages <dir> [--lexicon <file>] [--config <file>] [--seed <n>]");
    println!();
    println!("Options:");
    println!("  --languages <dir>  Directory of language packs (<lang>/language.ron)");
    println!("  --lexicon <file>   Word list in RON");
    println!("  --config <file>    Render config in RON");
    println!("  --seed <n>         Seed for lexicon tie-breaking (default: 42)");
}

fn print_help() {
    println!("Commands:");
    println!("  entity <name> <channel> <strength> <word...>  Add a descriptive");
    println!("  proper <name>                                 Toggle proper name");
    println!("  range <channel> <low> <high>                  Set the viewer's band");
    println!("  light <n>                                     Set ambient luminosity");
    println!("  modifier <n>                                  Band offset for new descriptives");
    println!("  tense <past|present|future>                   Narrative tense");
    println!("  lang <name>                                   Narrative language");
    println!("  anon                                          Toggle anonymized subjects");
    println!("  look                                          Describe every entity");
    println!("  help                                          Show this help");
    println!("  quit                                          Exit");
}

fn parse_channel(s: &str) -> Option<SensoryType> {
    SensoryType::ALL
        .into_iter()
        .find(|channel| {
            let tag = channel.tag();
            tag.eq_ignore_ascii_case(s) || tag.trim_start_matches("sense:").eq_ignore_ascii_case(s)
        })
}

fn parse_tense(s: &str) -> Option<Tense> {
    match s.to_lowercase().as_str() {
        "past" => Some(Tense::Past),
        "present" => Some(Tense::Present),
        "future" => Some(Tense::Future),
        _ => None,
    }
}
