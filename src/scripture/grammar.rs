//! Reference grammar built from chumsky combinators.
//!
//! Every rule is parameterized by a [`SeparatorConfig`], so the same rule set
//! yields a different concrete grammar per separator scheme. Rules backtrack on
//! failure: `or` retries the alternative from the same position, and repeated
//! items that fail half-way are rewound.
//!
//! Grammar, whitespace skipped after every token:
//!
//! ```text
//! int               := digits, not the start of a book name, no letter after
//! verse             := int verse-range-sep int | int
//! verse-seq         := verse (verse-seq-sep verse)* verse-seq-sep?
//! chapter-range     := singleton range-sep singleton | singleton
//! singleton         := int chapter-verse-sep verse-seq
//! chapter-seq       := chapter-range (chapter-seq-sep chapter-range)*
//! book-name         := multi-word dictionary name
//!                    | [letters digits]+   (at least one letter)
//! non-local         := book-name chapter-seq book-seq-sep?
//! local             := chapter-seq | verse-seq   (order set by the mode)
//! reference         := non-local+ | local
//! wrapped           := open reference close | reference close
//!                    | open reference | reference
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chumsky::prelude::*;

use super::ast::{
    BookReferenceName, BookVerseReference, ChapterRange, LocalReferenceMode, ParserScheme,
    ScriptureReference, ScriptureReferenceWrapper, VerseRange,
};
use super::books::BookNames;
use super::separators::{Separator, SeparatorConfig, SeparatorLevel};

/// Type alias for parser error
pub type ParserError = Simple<char>;

/// Type alias for a reusable grammar rule
type Rule<T> = BoxedParser<'static, char, T, ParserError>;

/// Output of the wrapped-reference rule: opening tag, reference, closing tag
type Wrapped = (Option<String>, ScriptureReference, Option<String>);

static NEXT_GRAMMAR_ID: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    /// Assembled parsers of this thread, keyed by grammar id.
    static ASSEMBLED: RefCell<HashMap<usize, Rule<Wrapped>>> = RefCell::new(HashMap::new());
}

/// One concrete grammar: a separator scheme plus a local-reference mode.
///
/// chumsky's boxed parsers are not thread-safe, so the grammar itself holds
/// only its tables. The combinator graph is assembled the first time a thread
/// parses with it and reused by that thread afterwards. Clones share the id,
/// and so the assembled parser.
#[derive(Debug, Clone)]
pub struct ReferenceGrammar {
    id: usize,
    separators: SeparatorConfig,
    books: Arc<BookNames>,
    scheme: ParserScheme,
}

impl ReferenceGrammar {
    pub fn new(separators: SeparatorConfig, books: Arc<BookNames>, scheme: ParserScheme) -> Self {
        Self {
            id: NEXT_GRAMMAR_ID.fetch_add(1, Ordering::Relaxed),
            separators,
            books,
            scheme,
        }
    }

    pub fn scheme(&self) -> ParserScheme {
        self.scheme
    }

    pub fn separators(&self) -> &SeparatorConfig {
        &self.separators
    }

    /// Parse the whole of `text` as a (possibly tagged) reference.
    pub fn parse(&self, text: &str) -> Result<ScriptureReferenceWrapper, Vec<ParserError>> {
        self.assembled()
            .parse(text)
            .map(|(opening_tag, reference, closing_tag)| {
                ScriptureReferenceWrapper::new(opening_tag, reference, closing_tag, self.scheme)
            })
    }

    fn assembled(&self) -> Rule<Wrapped> {
        ASSEMBLED.with(|assembled| {
            assembled
                .borrow_mut()
                .entry(self.id)
                .or_insert_with(|| {
                    let rules = Rules::new(&self.separators, &self.books, self.scheme.mode);
                    rules.wrapped_reference()
                })
                .clone()
        })
    }
}

/// Skip whitespace after a token
fn lexeme<O>(
    parser: impl Parser<char, O, Error = ParserError> + Clone,
) -> impl Parser<char, O, Error = ParserError> + Clone {
    parser.then_ignore(text::whitespace())
}

fn chars_match(found: char, expected: char) -> bool {
    found == expected || found.to_lowercase().eq(expected.to_lowercase())
}

/// Match a literal word ignoring case, yielding the text as written
fn word(token: &str) -> Rule<String> {
    let start: Rule<String> = empty().to(String::new()).boxed();
    token.chars().fold(start, |parser, expected| {
        parser
            .then(filter(move |found: &char| chars_match(*found, expected)))
            .map(|(mut written, found)| {
                written.push(found);
                written
            })
            .boxed()
    })
}

/// Match a literal token, ignoring case
fn keyword(token: &str) -> Rule<()> {
    word(token).ignored().boxed()
}

/// Succeed without consuming anything, unless `parser` would match here
fn not_at<O: 'static>(parser: Rule<O>, label: &'static str) -> Rule<()> {
    parser
        .rewind()
        .or_not()
        .try_map(move |found, span: Range<usize>| match found {
            Some(_) => Err(Simple::custom(span, format!("unexpected {}", label))),
            None => Ok(()),
        })
        .boxed()
}

fn never<O: 'static>() -> Rule<O> {
    filter(|_: &char| false)
        .try_map(|_, span: Range<usize>| Err(Simple::custom(span, "no alternatives")))
        .boxed()
}

/// Any separator of one level. Longer tokens are tried first so that `--`
/// wins over `-` when both are configured.
fn separator(separators: &SeparatorConfig, level: SeparatorLevel) -> Rule<()> {
    let mut tokens: Vec<&str> = separators.level(level).iter().map(Separator::token).collect();
    tokens.sort_by_key(|token| std::cmp::Reverse(token.chars().count()));

    let any_token = tokens
        .into_iter()
        .map(keyword)
        .reduce(|first, second| first.or(second).boxed())
        .unwrap_or_else(never);

    lexeme(any_token).boxed()
}

/// A dictionary spelling, words separated by any run of whitespace
fn phrase(spelling: &str) -> Rule<String> {
    let mut words = spelling.split_whitespace();
    let first = words.next().map(word).unwrap_or_else(never);
    words.fold(first, |parser, next| {
        parser
            .then_ignore(filter(|c: &char| c.is_whitespace()).repeated().at_least(1))
            .then(word(next))
            .map(|(written, next)| format!("{} {}", written, next))
            .boxed()
    })
}

/// The longest of `spellings` found here, ending at a word boundary
fn dictionary_name<'s>(spellings: impl Iterator<Item = &'s str>) -> Rule<String> {
    let mut spellings: Vec<&str> = spellings.collect();
    spellings.sort_by_key(|spelling| std::cmp::Reverse(spelling.chars().count()));

    let boundary = not_at(filter(|c: &char| c.is_alphanumeric()).boxed(), "letter or digit");
    spellings
        .into_iter()
        .map(phrase)
        .reduce(|first, second| first.or(second).boxed())
        .unwrap_or_else(never)
        .then_ignore(boundary)
        .boxed()
}

/// Unsigned decimal number, leading zeros allowed. Digits that begin a book
/// name (`1Co`, `1 John`) or run into letters are not a number.
fn number(numbered_books: Rule<String>) -> Rule<u32> {
    let digits = filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .collect::<String>()
        .try_map(|digits: String, span: Range<usize>| {
            digits
                .parse::<u32>()
                .map_err(|e| Simple::custom(span, e.to_string()))
        });
    let letter = filter(|c: &char| c.is_alphabetic()).boxed();

    lexeme(
        not_at(numbered_books, "book name")
            .ignore_then(digits)
            .then_ignore(not_at(letter, "letter after number")),
    )
    .boxed()
}

/// `item (sep item)*`, optionally followed by one dangling `sep`
fn sequence<T: 'static>(
    item: Rule<T>,
    separator: Rule<()>,
    allow_trailing: bool,
) -> Rule<Vec<T>> {
    let items = item
        .clone()
        .then(separator.clone().ignore_then(item).repeated())
        .map(|(first, rest)| {
            let mut all = Vec::with_capacity(rest.len() + 1);
            all.push(first);
            all.extend(rest);
            all
        });

    if allow_trailing {
        items.then_ignore(separator.or_not()).boxed()
    } else {
        items.boxed()
    }
}

/// `\xt`: a backslash and a run of non-whitespace
fn opening_tag() -> Rule<String> {
    lexeme(
        just('\\')
            .ignore_then(
                filter(|c: &char| !c.is_whitespace())
                    .repeated()
                    .at_least(1)
                    .collect::<String>(),
            )
            .map(|marker| format!("\\{}", marker)),
    )
    .boxed()
}

/// `\xt*`: a backslash, a run without whitespace or `*`, then `*`
fn closing_tag() -> Rule<String> {
    lexeme(
        just('\\')
            .ignore_then(
                filter(|c: &char| !c.is_whitespace() && *c != '*')
                    .repeated()
                    .at_least(1)
                    .collect::<String>(),
            )
            .then_ignore(just('*'))
            .map(|marker| format!("\\{}*", marker)),
    )
    .boxed()
}

/// The rules of one grammar, sharing its separators and dictionary.
struct Rules<'a> {
    separators: &'a SeparatorConfig,
    books: &'a Arc<BookNames>,
    mode: LocalReferenceMode,
    number: Rule<u32>,
}

impl<'a> Rules<'a> {
    fn new(
        separators: &'a SeparatorConfig,
        books: &'a Arc<BookNames>,
        mode: LocalReferenceMode,
    ) -> Self {
        let numbered_books = dictionary_name(
            books
                .spellings()
                .filter(|spelling| spelling.starts_with(|c: char| c.is_ascii_digit())),
        );
        Self {
            separators,
            books,
            mode,
            number: number(numbered_books),
        }
    }

    fn separator(&self, level: SeparatorLevel) -> Rule<()> {
        separator(self.separators, level)
    }

    /// A paired verse range (`2-4`), else a single verse (`2`)
    fn verse_range(&self) -> Rule<VerseRange> {
        let paired = self
            .number
            .clone()
            .then_ignore(self.separator(SeparatorLevel::VerseRange))
            .then(self.number.clone())
            .map(|(from, to)| VerseRange::new(from, to));
        let singleton = self.number.clone().map(VerseRange::singleton);

        paired.or(singleton).boxed()
    }

    fn verse_range_sequence(&self) -> Rule<Vec<VerseRange>> {
        sequence(
            self.verse_range(),
            self.separator(SeparatorLevel::VerseSequence),
            true,
        )
    }

    /// `1:2,4` as a singleton, or `1:2–3:4` merged into one range record
    fn chapter_range(&self) -> Rule<ChapterRange> {
        let singleton = self
            .number
            .clone()
            .then_ignore(self.separator(SeparatorLevel::ChapterAndVerse))
            .then(self.verse_range_sequence())
            .map(|(chapter, verses)| ChapterRange::singleton(Some(chapter), verses))
            .boxed();

        let paired = singleton
            .clone()
            .then_ignore(self.separator(SeparatorLevel::BookOrChapterRange))
            .then(singleton.clone())
            .map(|(from, to)| ChapterRange::merge(from, to));

        paired.or(singleton).boxed()
    }

    fn chapter_range_sequence(&self) -> Rule<Vec<ChapterRange>> {
        sequence(
            self.chapter_range(),
            self.separator(SeparatorLevel::ChapterSequence),
            false,
        )
    }

    /// A multi-word dictionary name (`1 Samuel`), else a run of letters and
    /// digits with at least one letter. Names missing from the dictionary
    /// still parse, with no resolved book.
    fn book_name(&self) -> Rule<BookReferenceName> {
        let multi_word =
            dictionary_name(self.books.spellings().filter(|spelling| spelling.contains(' ')));
        let single_word = filter(|c: &char| c.is_alphanumeric())
            .repeated()
            .at_least(1)
            .collect::<String>()
            .try_map(|name: String, span: Range<usize>| {
                if name.chars().any(char::is_alphabetic) {
                    Ok(name)
                } else {
                    Err(Simple::custom(span, "book name without letters"))
                }
            });

        let books = Arc::clone(self.books);
        lexeme(multi_word.or(single_word))
            .map(move |name| {
                let book = books.resolve(&name);
                BookReferenceName::new(name, book)
            })
            .boxed()
    }

    /// A reference with no book name, read as chapters or as bare verses
    fn local_reference(&self) -> Rule<BookVerseReference> {
        let by_chapter = self
            .chapter_range_sequence()
            .map(BookVerseReference::local);
        let by_verse = self
            .verse_range_sequence()
            .map(|verses| BookVerseReference::local(vec![ChapterRange::verses_only(verses)]));

        match self.mode {
            LocalReferenceMode::ChapterRangeSequence => by_chapter.or(by_verse).boxed(),
            LocalReferenceMode::VerseRangeSequence => by_verse.or(by_chapter).boxed(),
        }
    }

    fn non_local_reference(&self) -> Rule<BookVerseReference> {
        self.book_name()
            .then(self.chapter_range_sequence())
            .then_ignore(self.separator(SeparatorLevel::BookSequence).or_not())
            .map(|(name, ranges)| BookVerseReference::new(name, ranges))
            .boxed()
    }

    fn scripture_reference(&self) -> Rule<ScriptureReference> {
        let books_sequence = self.non_local_reference().repeated().at_least(1);
        let local = self.local_reference().map(|reference| vec![reference]);

        books_sequence
            .or(local)
            .map(ScriptureReference::new)
            .boxed()
    }

    /// The full input: a reference with optional tags, alternatives in priority
    /// order. Each alternative must reach the end of input to win.
    fn wrapped_reference(&self) -> Rule<Wrapped> {
        let reference = self.scripture_reference();

        let both_tags = opening_tag()
            .then(reference.clone())
            .then(closing_tag())
            .map(|((opening, reference), closing)| (Some(opening), reference, Some(closing)));
        let closing_only = reference
            .clone()
            .then(closing_tag())
            .map(|(reference, closing)| (None, reference, Some(closing)));
        let opening_only = opening_tag()
            .then(reference.clone())
            .map(|(opening, reference)| (Some(opening), reference, None));
        let untagged = reference.map(|reference| (None, reference, None));

        text::whitespace()
            .ignore_then(choice((
                both_tags.then_ignore(end()),
                closing_only.then_ignore(end()),
                opening_only.then_ignore(end()),
                untagged.then_ignore(end()),
            )))
            .boxed()
    }
}
