//! Canonical rendering of parsed references.
//!
//! Output always uses the project's preferred separator at each level (the
//! first configured token, spelled as configured) regardless of what the input
//! used, and book names in the style preferred for the surrounding text.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ast::{
    BookVerseReference, ChapterRange, ScriptureReference, ScriptureReferenceWrapper, VerseRange,
};
use super::books::{BookNameType, BookNames};
use super::separators::{SeparatorConfig, SeparatorLevel, STANDARD_SEPARATORS};

/// The kind of text a reference appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextContext {
    MainText,
    Introduction,
    /// Footnotes and cross references
    NoteOrReference,
}

impl TextContext {
    pub const ALL: [TextContext; 3] = [
        TextContext::MainText,
        TextContext::Introduction,
        TextContext::NoteOrReference,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TextContext::MainText => "main-text",
            TextContext::Introduction => "introduction",
            TextContext::NoteOrReference => "note-or-reference",
        }
    }
}

impl fmt::Display for TextContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextContext::ALL
            .into_iter()
            .find(|context| context.as_str() == s)
            .ok_or_else(|| format!("unknown text context '{}'", s))
    }
}

/// Preferred book name style per text context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameTypeSettings {
    pub main_text: BookNameType,
    pub introduction: BookNameType,
    pub note_or_reference: BookNameType,
}

impl NameTypeSettings {
    pub fn for_context(&self, context: TextContext) -> BookNameType {
        match context {
            TextContext::MainText => self.main_text,
            TextContext::Introduction => self.introduction,
            TextContext::NoteOrReference => self.note_or_reference,
        }
    }
}

impl Default for NameTypeSettings {
    fn default() -> Self {
        Self {
            main_text: BookNameType::Short,
            introduction: BookNameType::Short,
            note_or_reference: BookNameType::Abbreviation,
        }
    }
}

/// Renders references in the project's canonical form.
#[derive(Debug, Clone)]
pub struct ReferenceFormatter {
    separators: SeparatorConfig,
    fallback: SeparatorConfig,
    books: Arc<BookNames>,
    name_types: NameTypeSettings,
    paired_tags: HashSet<String>,
}

impl ReferenceFormatter {
    /// `separators` should be the project's literal (non-normalized) set.
    /// Levels left empty by the project render with the standard separator.
    pub fn new(
        separators: SeparatorConfig,
        books: Arc<BookNames>,
        name_types: NameTypeSettings,
        paired_tags: impl IntoIterator<Item = String>,
    ) -> Self {
        let paired_tags = paired_tags
            .into_iter()
            .map(|tag| tag.trim().trim_start_matches('\\').trim_end_matches('*').to_string())
            .filter(|tag| !tag.is_empty())
            .collect();
        Self {
            separators,
            fallback: SeparatorConfig::new(&STANDARD_SEPARATORS, false),
            books,
            name_types,
            paired_tags,
        }
    }

    pub fn format_standard_reference(
        &self,
        context: TextContext,
        wrapper: &ScriptureReferenceWrapper,
    ) -> String {
        let (opening_tag, closing_tag) = self.tags_to_render(wrapper);
        let mut out = String::new();
        if let Some(tag) = opening_tag {
            out.push_str(&tag);
            out.push(' ');
        }
        out.push_str(&self.format_reference(context, &wrapper.reference));
        if let Some(tag) = closing_tag {
            out.push_str(&tag);
        }
        out
    }

    pub fn format_reference(&self, context: TextContext, reference: &ScriptureReference) -> String {
        let name_type = self.name_types.for_context(context);
        reference
            .book_references
            .iter()
            .map(|book_ref| self.format_book_reference(name_type, book_ref))
            .collect::<Vec<_>>()
            .join(self.preferred(SeparatorLevel::BookSequence))
    }

    fn format_book_reference(
        &self,
        name_type: BookNameType,
        book_ref: &BookVerseReference,
    ) -> String {
        let ranges = book_ref
            .chapter_ranges
            .iter()
            .map(|range| self.format_chapter_range(range))
            .collect::<Vec<_>>()
            .join(self.preferred(SeparatorLevel::ChapterSequence));

        match &book_ref.book {
            None => ranges,
            Some(name) => {
                let rendered = match &name.book {
                    Some(book) => self.books.display_name(book, name_type),
                    None => name.name_text.clone(),
                };
                format!("{} {}", rendered, ranges)
            }
        }
    }

    fn format_chapter_range(&self, range: &ChapterRange) -> String {
        let mut out = self.format_chapter_side(range.from_chapter, &range.from_verse_ranges);
        if let Some(to_verses) = &range.to_verse_ranges {
            out.push_str(self.preferred(SeparatorLevel::BookOrChapterRange));
            out.push_str(&self.format_chapter_side(range.to_chapter, to_verses));
        }
        out
    }

    fn format_chapter_side(&self, chapter: Option<u32>, verses: &[VerseRange]) -> String {
        let verses = verses
            .iter()
            .map(|verse| self.format_verse_range(verse))
            .collect::<Vec<_>>()
            .join(self.preferred(SeparatorLevel::VerseSequence));
        match chapter {
            Some(chapter) => format!(
                "{}{}{}",
                chapter,
                self.preferred(SeparatorLevel::ChapterAndVerse),
                verses
            ),
            None => verses,
        }
    }

    fn format_verse_range(&self, verse: &VerseRange) -> String {
        if verse.is_singleton() {
            verse.from_verse.to_string()
        } else {
            format!(
                "{}{}{}",
                verse.from_verse,
                self.preferred(SeparatorLevel::VerseRange),
                verse.to_verse
            )
        }
    }

    fn preferred(&self, level: SeparatorLevel) -> &str {
        self.separators
            .preferred(level)
            .or_else(|| self.fallback.preferred(level))
            .unwrap_or_default()
    }

    /// Tags to render, with the missing side of a paired tag family filled in.
    fn tags_to_render(
        &self,
        wrapper: &ScriptureReferenceWrapper,
    ) -> (Option<String>, Option<String>) {
        let opening = wrapper.opening_tag.clone();
        let closing = wrapper.closing_tag.clone();
        match (opening, closing) {
            (Some(opening), None) => {
                let marker = opening.trim_start_matches('\\');
                let closing = self
                    .paired_tags
                    .contains(marker)
                    .then(|| format!("\\{}*", marker));
                (Some(opening), closing)
            }
            (None, Some(closing)) => {
                let marker = closing.trim_start_matches('\\').trim_end_matches('*');
                let opening = self
                    .paired_tags
                    .contains(marker)
                    .then(|| format!("\\{}", marker));
                (opening, Some(closing))
            }
            tags => tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripture::ast::{
        BookReferenceName, LocalReferenceMode, ParserScheme, SeparatorScheme,
    };
    use crate::scripture::books::{BookId, BookNameEntry};

    fn formatter() -> ReferenceFormatter {
        let books = BookNames::new([BookNameEntry {
            code: "MAT".into(),
            abbreviation: Some("Mat".into()),
            short_name: Some("Matthew".into()),
            long_name: Some("The Gospel of Matthew".into()),
        }])
        .unwrap();
        ReferenceFormatter::new(
            SeparatorConfig::standard(),
            Arc::new(books),
            NameTypeSettings::default(),
            vec!["xt".to_string(), "\\f".to_string()],
        )
    }

    fn wrapper(opening: Option<&str>, closing: Option<&str>) -> ScriptureReferenceWrapper {
        let reference = ScriptureReference::new(vec![BookVerseReference::new(
            BookReferenceName::new("mat", Some(BookId::new("MAT"))),
            vec![
                ChapterRange::merge(
                    ChapterRange::singleton(Some(1), vec![VerseRange::singleton(2)]),
                    ChapterRange::singleton(Some(3), vec![VerseRange::singleton(4)]),
                ),
                ChapterRange::singleton(
                    Some(5),
                    vec![VerseRange::new(6, 7), VerseRange::singleton(9)],
                ),
            ],
        )]);
        ScriptureReferenceWrapper::new(
            opening.map(str::to_string),
            reference,
            closing.map(str::to_string),
            ParserScheme {
                separators: SeparatorScheme::Standard,
                mode: LocalReferenceMode::ChapterRangeSequence,
            },
        )
    }

    #[test]
    fn test_name_style_follows_context() {
        let formatter = formatter();
        insta::assert_snapshot!(
            formatter.format_standard_reference(TextContext::NoteOrReference, &wrapper(None, None)),
            @"Mat 1:2–3:4; 5:6-7, 9"
        );
        insta::assert_snapshot!(
            formatter.format_standard_reference(TextContext::MainText, &wrapper(None, None)),
            @"Matthew 1:2–3:4; 5:6-7, 9"
        );
    }

    #[test]
    fn test_missing_side_of_paired_tag_is_synthesized() {
        let formatter = formatter();
        let context = TextContext::NoteOrReference;
        assert_eq!(
            formatter.format_standard_reference(context, &wrapper(Some("\\xt"), None)),
            "\\xt Mat 1:2–3:4; 5:6-7, 9\\xt*"
        );
        assert_eq!(
            formatter.format_standard_reference(context, &wrapper(None, Some("\\f*"))),
            "\\f Mat 1:2–3:4; 5:6-7, 9\\f*"
        );
    }

    #[test]
    fn test_unpaired_tag_is_left_alone() {
        let formatter = formatter();
        let unpaired = wrapper(Some("\\w"), None);
        assert_eq!(
            formatter.format_standard_reference(TextContext::NoteOrReference, &unpaired),
            "\\w Mat 1:2–3:4; 5:6-7, 9"
        );
    }

    #[test]
    fn test_text_context_round_trips_through_str() {
        for context in TextContext::ALL {
            assert_eq!(context.as_str().parse::<TextContext>(), Ok(context));
        }
        assert!("footer".parse::<TextContext>().is_err());
    }
}
