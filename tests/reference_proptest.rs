//! Property-based tests for canonical reference text
//!
//! Any reference already in canonical form must parse and render back to the
//! exact same text:
//! - verse ranges use `-`, verse lists use `, `
//! - chapter and verse are joined with `:`
//! - chapter ranges use `–`, chapter and book lists use `; `

use proptest::prelude::*;
use scripref::scripture::{load_defaults, ScriptureReferenceBuilder, TextContext};

/// Abbreviations from the default book list
fn book_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["Gen", "Mat", "Luk", "Rom", "1Co", "Rev"])
}

/// A single verse or an ascending verse range
fn verse_range_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u32..60).prop_map(|verse| verse.to_string()),
        (1u32..60, 1u32..10).prop_map(|(from, extra)| format!("{}-{}", from, from + extra)),
    ]
}

fn verse_list_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(verse_range_strategy(), 1..4).prop_map(|verses| verses.join(", "))
}

fn chapter_strategy() -> impl Strategy<Value = String> {
    (1u32..150, verse_list_strategy())
        .prop_map(|(chapter, verses)| format!("{}:{}", chapter, verses))
}

/// A single chapter, or a paired range across chapters
fn chapter_range_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        chapter_strategy(),
        (chapter_strategy(), chapter_strategy()).prop_map(|(from, to)| format!("{}–{}", from, to)),
    ]
}

fn book_reference_strategy() -> impl Strategy<Value = String> {
    (
        book_strategy(),
        prop::collection::vec(chapter_range_strategy(), 1..3),
    )
        .prop_map(|(book, ranges)| format!("{} {}", book, ranges.join("; ")))
}

/// Generate canonical references, optionally wrapped in cross-reference tags
fn reference_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(book_reference_strategy(), 1..4),
        any::<bool>(),
    )
        .prop_map(|(books, tagged)| {
            let body = books.join("; ");
            if tagged {
                format!("\\xt {}\\xt*", body)
            } else {
                body
            }
        })
}

fn builder() -> ScriptureReferenceBuilder {
    let settings = load_defaults().expect("defaults to deserialize");
    ScriptureReferenceBuilder::new(&settings).expect("builder to build")
}

proptest! {
    #[test]
    fn test_canonical_references_round_trip(text in reference_strategy()) {
        let builder = builder();
        let wrapper = builder.try_parse_scripture_reference(&text);
        prop_assert!(wrapper.is_some(), "failed to parse: {}", text);

        let context = TextContext::NoteOrReference;
        let formatted = builder.format_standard_reference(context, &wrapper.unwrap());
        prop_assert_eq!(formatted, text);
    }

    #[test]
    fn test_parsing_never_panics(text in "[A-Za-z0-9:;,.–— \\-\\\\*]{0,40}") {
        let builder = builder();
        let _ = builder.try_parse_scripture_reference(&text);
    }
}
