//! Value types produced by the reference grammar.
//!
//! Everything here is an immutable value: equality and hashing are structural,
//! and a fresh tree is built for every parse attempt.

use serde::Serialize;

use super::books::BookId;
use super::error::ReferenceError;

/// A single verse (`5`) or a span of verses (`5-7`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VerseRange {
    pub from_verse: u32,
    pub to_verse: u32,
}

impl VerseRange {
    pub fn new(from_verse: u32, to_verse: u32) -> Self {
        Self {
            from_verse,
            to_verse,
        }
    }

    pub fn singleton(verse: u32) -> Self {
        Self::new(verse, verse)
    }

    pub fn is_singleton(&self) -> bool {
        self.from_verse == self.to_verse
    }
}

/// A book or chapter range such as `1:2,4` or `1:2–3:4`.
///
/// The "to" side only exists for ranges spanning chapters. A range without a
/// chapter is a bare verse list inside a local reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ChapterRange {
    pub from_chapter: Option<u32>,
    pub from_verse_ranges: Vec<VerseRange>,
    pub to_chapter: Option<u32>,
    pub to_verse_ranges: Option<Vec<VerseRange>>,
}

impl ChapterRange {
    /// Build a range from either or both sides.
    ///
    /// With only the "to" side supplied the range collapses into a singleton
    /// built from that side.
    pub fn try_new(
        from_chapter: Option<u32>,
        from_verse_ranges: Option<Vec<VerseRange>>,
        to_chapter: Option<u32>,
        to_verse_ranges: Option<Vec<VerseRange>>,
    ) -> Result<Self, ReferenceError> {
        match (from_verse_ranges, to_verse_ranges) {
            (None, None) => Err(ReferenceError::MissingVerseRanges),
            (Some(from), None) => Ok(Self::singleton(from_chapter, from)),
            (None, Some(to)) => Ok(Self::singleton(to_chapter, to)),
            (Some(from), Some(to)) => Ok(Self {
                from_chapter,
                from_verse_ranges: from,
                to_chapter,
                to_verse_ranges: Some(to),
            }),
        }
    }

    pub fn singleton(chapter: Option<u32>, verse_ranges: Vec<VerseRange>) -> Self {
        Self {
            from_chapter: chapter,
            from_verse_ranges: verse_ranges,
            to_chapter: None,
            to_verse_ranges: None,
        }
    }

    /// Verses with no chapter, as in a local `5,6`.
    pub fn verses_only(verse_ranges: Vec<VerseRange>) -> Self {
        Self::singleton(None, verse_ranges)
    }

    /// Merge two singleton ranges into one range spanning from `from` to `to`.
    pub fn merge(from: ChapterRange, to: ChapterRange) -> Self {
        Self {
            from_chapter: from.from_chapter,
            from_verse_ranges: from.from_verse_ranges,
            to_chapter: to.from_chapter,
            to_verse_ranges: Some(to.from_verse_ranges),
        }
    }

    pub fn is_singleton(&self) -> bool {
        self.to_verse_ranges.is_none()
    }

    fn chapter_count(&self) -> usize {
        self.from_chapter.iter().chain(self.to_chapter.iter()).count()
    }

    fn verse_count(&self) -> usize {
        self.from_verse_ranges.len() + self.to_verse_ranges.as_ref().map_or(0, Vec::len)
    }
}

/// The book name as written, plus the book it resolved to, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BookReferenceName {
    pub name_text: String,
    pub book: Option<BookId>,
}

impl BookReferenceName {
    pub fn new(name_text: impl Into<String>, book: Option<BookId>) -> Self {
        Self {
            name_text: name_text.into(),
            book,
        }
    }

    pub fn is_known_book(&self) -> bool {
        self.book.is_some()
    }
}

/// Chapter ranges within one book. Without a book name the reference is local.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BookVerseReference {
    pub book: Option<BookReferenceName>,
    pub chapter_ranges: Vec<ChapterRange>,
}

impl BookVerseReference {
    pub fn new(book: BookReferenceName, chapter_ranges: Vec<ChapterRange>) -> Self {
        Self {
            book: Some(book),
            chapter_ranges,
        }
    }

    pub fn local(chapter_ranges: Vec<ChapterRange>) -> Self {
        Self {
            book: None,
            chapter_ranges,
        }
    }

    pub fn is_local(&self) -> bool {
        self.book.is_none()
    }
}

/// A full reference: one or more book sequence entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScriptureReference {
    pub book_references: Vec<BookVerseReference>,
}

impl ScriptureReference {
    pub fn new(book_references: Vec<BookVerseReference>) -> Self {
        Self { book_references }
    }

    pub fn book_count(&self) -> usize {
        self.book_references.iter().filter(|r| !r.is_local()).count()
    }

    pub fn chapter_count(&self) -> usize {
        self.chapter_ranges().map(ChapterRange::chapter_count).sum()
    }

    pub fn verse_count(&self) -> usize {
        self.chapter_ranges().map(ChapterRange::verse_count).sum()
    }

    /// Book names (known or not) in order of appearance.
    pub fn book_names(&self) -> impl Iterator<Item = &BookReferenceName> {
        self.book_references.iter().filter_map(|r| r.book.as_ref())
    }

    /// Names that did not resolve to a book.
    pub fn unknown_book_names(&self) -> impl Iterator<Item = &BookReferenceName> {
        self.book_names().filter(|name| !name.is_known_book())
    }

    fn chapter_ranges(&self) -> impl Iterator<Item = &ChapterRange> {
        self.book_references
            .iter()
            .flat_map(|r| r.chapter_ranges.iter())
    }
}

/// How a local reference (one without a book name) is read first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LocalReferenceMode {
    ChapterRangeSequence,
    VerseRangeSequence,
}

impl LocalReferenceMode {
    pub const ALL: [LocalReferenceMode; 2] = [
        LocalReferenceMode::ChapterRangeSequence,
        LocalReferenceMode::VerseRangeSequence,
    ];
}

/// Which separator set a grammar was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SeparatorScheme {
    /// The project's separators as configured.
    Project,
    /// The project's separators with cross-level duplicates removed.
    Normalized,
    /// Common publishing conventions, independent of the project.
    Standard,
}

/// A grammar identity: separator set plus local-reference mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ParserScheme {
    pub separators: SeparatorScheme,
    pub mode: LocalReferenceMode,
}

/// A parsed reference with the markup tags around it and the parse quality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScriptureReferenceWrapper {
    pub opening_tag: Option<String>,
    pub reference: ScriptureReference,
    pub closing_tag: Option<String>,
    pub scheme: ParserScheme,
    pub score: u64,
}

impl ScriptureReferenceWrapper {
    pub fn new(
        opening_tag: Option<String>,
        reference: ScriptureReference,
        closing_tag: Option<String>,
        scheme: ParserScheme,
    ) -> Self {
        let score = score_reference(&reference);
        Self {
            opening_tag,
            reference,
            closing_tag,
            scheme,
            score,
        }
    }
}

const SCORE_FIELD_BITS: u32 = 20;
const SCORE_FIELD_MAX: u64 = (1 << SCORE_FIELD_BITS) - 1;

/// Score a parse so that more books beat more chapters beat more verses.
///
/// Each count occupies its own 20-bit field, saturating, so a lower-precedence
/// count can never outweigh a higher one.
pub fn score_reference(reference: &ScriptureReference) -> u64 {
    let field = |count: usize| (count as u64).min(SCORE_FIELD_MAX);
    (field(reference.book_count()) << (2 * SCORE_FIELD_BITS))
        | (field(reference.chapter_count()) << SCORE_FIELD_BITS)
        | field(reference.verse_count())
}
