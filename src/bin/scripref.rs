//! Command-line interface for scripref
//! Parses, formats and checks scripture references using project settings.
//!
//! Usage:
//!   scripref [--config `<file>`] parse `<text>` [--context `<context>`]
//!       Show the best parse and its canonical form
//!   scripref [--config `<file>`] check `<path>` [--context `<context>`] [--book `<code>`]
//!       Check each line of a file as one verse
//!
//! Set `RUST_LOG=scripref=debug` to see which schemes were built and tried.

use clap::{Arg, ArgMatches, Command};
use scripref::scripture::{
    Loader, ProjectSettings, ScriptureReferenceChecker, TextContext, VerseLocation, VersePart,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let context_arg = Arg::new("context")
        .long("context")
        .short('c')
        .help("Text context: main-text, introduction or note-or-reference")
        .default_value("note-or-reference");

    let matches = Command::new("scripref")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for parsing and checking scripture references")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("Project settings file layered over the defaults"),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a reference and print the result as JSON")
                .arg(
                    Arg::new("text")
                        .help("Reference text, e.g. 'Mat 1:2–3:4'")
                        .required(true)
                        .index(1),
                )
                .arg(context_arg.clone()),
        )
        .subcommand(
            Command::new("check")
                .about("Check every line of a file, printing diagnostics as JSON lines")
                .arg(
                    Arg::new("path")
                        .help("Path to a text file, one verse per line")
                        .required(true)
                        .index(1),
                )
                .arg(context_arg)
                .arg(
                    Arg::new("book")
                        .long("book")
                        .short('b')
                        .help("Book code reported in diagnostic locations")
                        .default_value("UNK"),
                ),
        )
        .get_matches();

    // Handle subcommands
    match matches.subcommand() {
        Some(("parse", parse_matches)) => {
            let checker = build_checker(parse_matches);
            let text = parse_matches.get_one::<String>("text").unwrap();
            handle_parse_command(&checker, text, context(parse_matches));
        }
        Some(("check", check_matches)) => {
            let checker = build_checker(check_matches);
            let path = check_matches.get_one::<String>("path").unwrap();
            let book = check_matches.get_one::<String>("book").unwrap();
            handle_check_command(&checker, path, book, context(check_matches));
        }
        _ => unreachable!(),
    }
}

/// `--config` is global, so it is read from the subcommand's matches.
fn build_checker(matches: &ArgMatches) -> ScriptureReferenceChecker {
    let settings = load_settings(matches.get_one::<String>("config"));
    ScriptureReferenceChecker::new(&settings).unwrap_or_else(|e| {
        eprintln!("Invalid settings: {}", e);
        std::process::exit(1);
    })
}

fn load_settings(path: Option<&String>) -> ProjectSettings {
    let loader = match path {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new(),
    };
    loader.build().unwrap_or_else(|e| {
        eprintln!("Error loading settings: {}", e);
        std::process::exit(1);
    })
}

fn context(matches: &ArgMatches) -> TextContext {
    let value = matches.get_one::<String>("context").unwrap();
    value.parse().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    })
}

/// Handle the parse command
fn handle_parse_command(checker: &ScriptureReferenceChecker, text: &str, context: TextContext) {
    let builder = checker.builder();
    let Some(wrapper) = builder.try_parse_scripture_reference(text) else {
        eprintln!("No reference could be parsed from '{}'", text);
        std::process::exit(1);
    };

    let output = json!({
        "standard": builder.format_standard_reference(context, &wrapper),
        "scheme": wrapper.scheme,
        "score": wrapper.score,
        "opening_tag": wrapper.opening_tag,
        "closing_tag": wrapper.closing_tag,
        "reference": wrapper.reference,
    });
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle the check command
fn handle_check_command(
    checker: &ScriptureReferenceChecker,
    path: &str,
    book: &str,
    context: TextContext,
) {
    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    });

    let mut results = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let verse = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let part = VersePart::new(VerseLocation::new(book, 1, verse), context, line);
        checker.check_text(&part, &mut results);
    }

    for item in &results {
        match serde_json::to_string(item) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Serialization error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
