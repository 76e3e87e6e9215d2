//! Integration tests for reference classification.

use rstest::rstest;
use scripref::scripture::{
    load_defaults, CheckResultItem, CheckType, ProjectSettings, ScriptureReferenceChecker,
    ScriptureReferenceErrorType, TextContext, VerseLocation, VersePart,
};

fn checker_with(adjust: impl FnOnce(&mut ProjectSettings)) -> ScriptureReferenceChecker {
    let mut settings = load_defaults().expect("defaults to deserialize");
    adjust(&mut settings);
    ScriptureReferenceChecker::new(&settings).expect("checker to build")
}

fn check(
    checker: &ScriptureReferenceChecker,
    context: TextContext,
    text: &str,
) -> Vec<CheckResultItem> {
    let part = VersePart::new(VerseLocation::new("GEN", 1, 1), context, text);
    let mut results = Vec::new();
    checker.check_text(&part, &mut results);
    results
}

fn error_types(results: &[CheckResultItem]) -> Vec<ScriptureReferenceErrorType> {
    results.iter().map(|item| item.error_type).collect()
}

/// Treat the whole verse text as one candidate span.
fn whole_text_checker() -> ScriptureReferenceChecker {
    checker_with(|settings| settings.target_references = vec!["^.+$".into()])
}

#[rstest]
#[case("Mat 1:2", vec![])]
#[case("Mat 1: 2", vec![ScriptureReferenceErrorType::LooseFormatting])]
#[case("Mat abc:2", vec![ScriptureReferenceErrorType::MalformedTag])]
#[case("Xyz 1:2", vec![ScriptureReferenceErrorType::BadReference])]
#[case("Matthew 1:2", vec![ScriptureReferenceErrorType::IncorrectNameStyle])]
#[case("Mat 1.2", vec![ScriptureReferenceErrorType::BadReference])]
fn test_classification(#[case] text: &str, #[case] expected: Vec<ScriptureReferenceErrorType>) {
    let results = check(&whole_text_checker(), TextContext::NoteOrReference, text);
    assert_eq!(error_types(&results), expected);
}

#[test]
fn test_clean_reference_has_no_diagnostics() {
    let checker = checker_with(|_| {});
    let results = check(
        &checker,
        TextContext::NoteOrReference,
        "See \\xt Mat 1:2–3:4; Luk 5:6\\xt* for more.",
    );
    assert!(results.is_empty(), "unexpected diagnostics: {:?}", results);
}

#[test]
fn test_loose_formatting_carries_suggestion() {
    let checker = checker_with(|_| {});
    let results = check(&checker, TextContext::NoteOrReference, "Cf. \\xt Mat 1: 2\\xt*.");

    assert_eq!(results.len(), 1);
    let item = &results[0];
    assert_eq!(item.error_type, ScriptureReferenceErrorType::LooseFormatting);
    assert_eq!(item.error_code(), 0);
    assert_eq!(item.check_type, CheckType::ScriptureReference);
    assert_eq!(item.matched_text, "\\xt Mat 1: 2\\xt*");
    assert_eq!(item.match_start, 4);
    assert_eq!(item.suggestion.as_deref(), Some("\\xt Mat 1:2\\xt*"));
    assert_eq!(item.message, "Loosely formatted reference at position 4.");
    assert_eq!(item.verse_part.location, VerseLocation::new("GEN", 1, 1));
}

#[test]
fn test_malformed_reference() {
    let checker = checker_with(|_| {});
    let results = check(&checker, TextContext::NoteOrReference, "\\xt Mat abc:2\\xt*");

    assert_eq!(error_types(&results), vec![ScriptureReferenceErrorType::MalformedTag]);
    assert_eq!(results[0].match_start, 0);
    assert_eq!(results[0].suggestion, None);
}

#[test]
fn test_unknown_books_are_named() {
    let checker = checker_with(|_| {});
    let results = check(
        &checker,
        TextContext::NoteOrReference,
        "\\xt Xyz 1:2; Mat 3:4; Abc 5:6\\xt*",
    );

    assert_eq!(error_types(&results), vec![ScriptureReferenceErrorType::BadReference]);
    assert_eq!(results[0].message, "Unknown book name at position 0: Xyz, Abc.");
}

#[test]
fn test_name_style_for_other_context() {
    let checker = checker_with(|_| {});
    let results = check(&checker, TextContext::NoteOrReference, "\\xt Matthew 5:3\\xt*");

    assert_eq!(
        error_types(&results),
        vec![ScriptureReferenceErrorType::IncorrectNameStyle]
    );
    assert_eq!(results[0].suggestion.as_deref(), Some("\\xt Mat 5:3\\xt*"));
}

#[test]
fn test_offsets_count_characters() {
    let checker = checker_with(|_| {});
    let results = check(&checker, TextContext::NoteOrReference, "Véase \\xt Mat 1: 2\\xt*");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].match_start, 6);
}

#[test]
fn test_each_span_is_checked_once() {
    let checker = checker_with(|settings| {
        let pattern = settings.target_references[0].clone();
        settings.target_references.push(pattern);
    });
    let results = check(&checker, TextContext::NoteOrReference, "\\xt Mat 1: 2\\xt*");
    assert_eq!(results.len(), 1);
}

#[test]
fn test_every_span_is_independent() {
    let checker = checker_with(|_| {});
    let results = check(
        &checker,
        TextContext::NoteOrReference,
        "\\xt Mat abc\\xt* and \\xt Luk 1:2\\xt* and \\xt Rom 3: 4\\xt*",
    );

    assert_eq!(
        error_types(&results),
        vec![
            ScriptureReferenceErrorType::MalformedTag,
            ScriptureReferenceErrorType::LooseFormatting
        ]
    );
    assert_eq!(results[1].matched_text, "\\xt Rom 3: 4\\xt*");
}

#[test]
fn test_results_are_appended() {
    let checker = whole_text_checker();
    let mut results = Vec::new();
    for (verse, text) in ["Mat 1: 2", "Mat 1:2", "Mat abc:2"].into_iter().enumerate() {
        let part = VersePart::new(
            VerseLocation::new("GEN", 1, verse as u32 + 1),
            TextContext::NoteOrReference,
            text,
        );
        checker.check_text(&part, &mut results);
    }

    let locations: Vec<u32> = results.iter().map(|item| item.verse_part.location.verse).collect();
    assert_eq!(locations, vec![1, 3]);
}

#[test]
fn test_numbered_book_after_shared_separator_is_clean() {
    let checker = checker_with(|settings| {
        settings.target_references = vec!["^.+$".into()];
        settings.separators.verse_sequence = vec![", ".into(), ";".into()];
    });
    let results = check(&checker, TextContext::NoteOrReference, "Mat 1:2; 1Co 3:4");
    assert!(results.is_empty(), "unexpected diagnostics: {:?}", results);
}

#[test]
fn test_multi_word_short_names() {
    let checker = checker_with(|_| {});
    let text = "\\xt 1 Samuel 3:4; Song of Songs 2:1\\xt*";

    assert!(check(&checker, TextContext::MainText, text).is_empty());

    let results = check(&checker, TextContext::NoteOrReference, text);
    assert_eq!(
        error_types(&results),
        vec![ScriptureReferenceErrorType::IncorrectNameStyle]
    );
    assert_eq!(
        results[0].suggestion.as_deref(),
        Some("\\xt 1Sa 3:4; Sng 2:1\\xt*")
    );
}
