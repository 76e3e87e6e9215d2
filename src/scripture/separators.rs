//! Separator configuration for the six structural levels of a reference.
//!
//! A project declares which tokens separate books, chapters and verses. The
//! same token may be declared at several levels; [`SeparatorConfig`] reports
//! such collisions and, when normalizing, masks a token at every level below
//! the highest-priority level that declares it.
//!
//! Priority, highest first: chapter sequence, book/chapter range, chapter and
//! verse, verse sequence, verse range. Book sequence separators never nest
//! inside another level and are passed through untouched.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Structural levels a separator can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SeparatorLevel {
    BookSequence,
    ChapterSequence,
    BookOrChapterRange,
    ChapterAndVerse,
    VerseSequence,
    VerseRange,
}

impl SeparatorLevel {
    /// Nested levels, in duplicate-masking priority order.
    pub const NESTED: [SeparatorLevel; 5] = [
        SeparatorLevel::ChapterSequence,
        SeparatorLevel::BookOrChapterRange,
        SeparatorLevel::ChapterAndVerse,
        SeparatorLevel::VerseSequence,
        SeparatorLevel::VerseRange,
    ];

    pub fn is_chapter_level(self) -> bool {
        matches!(
            self,
            SeparatorLevel::ChapterSequence
                | SeparatorLevel::BookOrChapterRange
                | SeparatorLevel::ChapterAndVerse
        )
    }

    pub fn is_verse_level(self) -> bool {
        matches!(
            self,
            SeparatorLevel::VerseSequence | SeparatorLevel::VerseRange
        )
    }
}

/// Raw separator lists as they come from project settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeparatorSettings {
    pub book_sequence: Vec<String>,
    pub chapter_sequence: Vec<String>,
    pub book_or_chapter_range: Vec<String>,
    pub chapter_and_verse: Vec<String>,
    pub verse_sequence: Vec<String>,
    pub verse_range: Vec<String>,
}

impl SeparatorSettings {
    pub fn level(&self, level: SeparatorLevel) -> &[String] {
        match level {
            SeparatorLevel::BookSequence => &self.book_sequence,
            SeparatorLevel::ChapterSequence => &self.chapter_sequence,
            SeparatorLevel::BookOrChapterRange => &self.book_or_chapter_range,
            SeparatorLevel::ChapterAndVerse => &self.chapter_and_verse,
            SeparatorLevel::VerseSequence => &self.verse_sequence,
            SeparatorLevel::VerseRange => &self.verse_range,
        }
    }
}

fn strings(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

/// Common publishing conventions, used as the fallback scheme for every project.
pub static STANDARD_SEPARATORS: Lazy<SeparatorSettings> = Lazy::new(|| SeparatorSettings {
    book_sequence: strings(&["; "]),
    chapter_sequence: strings(&["; "]),
    book_or_chapter_range: strings(&["–", "—"]),
    chapter_and_verse: strings(&[":", "."]),
    verse_sequence: strings(&[", "]),
    verse_range: strings(&["-"]),
});

/// A configured separator. Rendering uses the raw spelling (which may carry a
/// trailing space); matching uses the trimmed token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Separator {
    raw: String,
}

impl Separator {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn token(&self) -> &str {
        self.raw.trim()
    }

    fn key(&self) -> String {
        self.token().to_lowercase()
    }
}

/// Filtered separator lists for one grammar instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparatorConfig {
    book_sequence: Vec<Separator>,
    chapter_sequence: Vec<Separator>,
    book_or_chapter_range: Vec<Separator>,
    chapter_and_verse: Vec<Separator>,
    verse_sequence: Vec<Separator>,
    verse_range: Vec<Separator>,
    is_normalized: bool,
    is_any_duplicates: bool,
}

impl SeparatorConfig {
    pub fn new(settings: &SeparatorSettings, normalize: bool) -> Self {
        let mut seen = HashSet::new();
        let mut any_duplicates = false;
        let mut next_level = |level: SeparatorLevel| {
            let (tokens, found) = filter_level(settings.level(level), normalize, &mut seen);
            any_duplicates |= found;
            tokens
        };

        // Order of these calls is the masking priority.
        let chapter_sequence = next_level(SeparatorLevel::ChapterSequence);
        let book_or_chapter_range = next_level(SeparatorLevel::BookOrChapterRange);
        let chapter_and_verse = next_level(SeparatorLevel::ChapterAndVerse);
        let verse_sequence = next_level(SeparatorLevel::VerseSequence);
        let verse_range = next_level(SeparatorLevel::VerseRange);

        let book_sequence = settings
            .book_sequence
            .iter()
            .filter(|raw| !raw.trim().is_empty())
            .map(Separator::new)
            .collect();

        Self {
            book_sequence,
            chapter_sequence,
            book_or_chapter_range,
            chapter_and_verse,
            verse_sequence,
            verse_range,
            is_normalized: normalize,
            is_any_duplicates: any_duplicates,
        }
    }

    pub fn standard() -> Self {
        Self::new(&STANDARD_SEPARATORS, false)
    }

    pub fn level(&self, level: SeparatorLevel) -> &[Separator] {
        match level {
            SeparatorLevel::BookSequence => &self.book_sequence,
            SeparatorLevel::ChapterSequence => &self.chapter_sequence,
            SeparatorLevel::BookOrChapterRange => &self.book_or_chapter_range,
            SeparatorLevel::ChapterAndVerse => &self.chapter_and_verse,
            SeparatorLevel::VerseSequence => &self.verse_sequence,
            SeparatorLevel::VerseRange => &self.verse_range,
        }
    }

    /// The canonical spelling for a level, if the level has any token.
    pub fn preferred(&self, level: SeparatorLevel) -> Option<&str> {
        self.level(level).first().map(Separator::raw)
    }

    /// Every level has at least one token.
    pub fn is_usable(&self) -> bool {
        std::iter::once(SeparatorLevel::BookSequence)
            .chain(SeparatorLevel::NESTED)
            .all(|level| !self.level(level).is_empty())
    }

    pub fn is_any_duplicates(&self) -> bool {
        self.is_any_duplicates
    }

    pub fn is_normalized(&self) -> bool {
        self.is_normalized
    }
}

/// Filter one level against the tokens claimed by higher-priority levels.
///
/// Returns the retained tokens and whether any duplicate was found, then adds
/// this level's tokens to `seen`.
fn filter_level(
    raw: &[String],
    normalize: bool,
    seen: &mut HashSet<String>,
) -> (Vec<Separator>, bool) {
    let mut found_duplicate = false;
    let mut level_keys = HashSet::new();
    let mut retained = Vec::new();

    for separator in raw.iter().map(Separator::new) {
        let key = separator.key();
        if key.is_empty() || !level_keys.insert(key.clone()) {
            continue;
        }
        if seen.contains(&key) {
            found_duplicate = true;
            if normalize {
                continue;
            }
        }
        retained.push(separator);
    }

    seen.extend(level_keys);
    (retained, found_duplicate)
}
