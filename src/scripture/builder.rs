//! Multi-scheme reference builder.
//!
//! Project separator sets are not unambiguous in general: one token may be
//! declared at several levels. Instead of a single permissive grammar the
//! builder keeps several grammars that are each unambiguous on their own:
//!
//! - the project's separators as configured,
//! - the project's separators normalized (only built when duplicates exist),
//! - the standard publishing separators, always present as a fallback.
//!
//! Each is built twice, once per [`LocalReferenceMode`]. A parse picks the mode
//! from the input, runs every grammar of that mode and keeps the successful
//! result with the highest score (books, then chapters, then verses).

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace};

use super::ast::{LocalReferenceMode, ParserScheme, ScriptureReferenceWrapper, SeparatorScheme};
use super::books::BookNames;
use super::config::ProjectSettings;
use super::error::ConfigError;
use super::formatter::{ReferenceFormatter, TextContext};
use super::grammar::ReferenceGrammar;
use super::separators::{SeparatorConfig, SeparatorLevel, SeparatorSettings};

/// Parses references with every applicable scheme and renders them canonically.
///
/// Immutable after construction and safe to share between threads.
#[derive(Debug, Clone)]
pub struct ScriptureReferenceBuilder {
    chapter_mode_grammars: Vec<ReferenceGrammar>,
    verse_mode_grammars: Vec<ReferenceGrammar>,
    chapter_tokens: Vec<String>,
    verse_tokens: Vec<String>,
    formatter: ReferenceFormatter,
}

impl ScriptureReferenceBuilder {
    pub fn new(settings: &ProjectSettings) -> Result<Self, ConfigError> {
        let books = Arc::new(BookNames::new(settings.books.iter().cloned())?);
        let literal = SeparatorConfig::new(&settings.separators, false);
        let formatter = ReferenceFormatter::new(
            literal.clone(),
            Arc::clone(&books),
            settings.name_types,
            settings.paired_tags.iter().cloned(),
        );
        Ok(Self::with_formatter(&settings.separators, books, formatter))
    }

    /// Build from separator settings and a dictionary, rendering with `formatter`.
    pub fn with_formatter(
        separators: &SeparatorSettings,
        books: Arc<BookNames>,
        formatter: ReferenceFormatter,
    ) -> Self {
        let literal = SeparatorConfig::new(separators, false);
        let normalized = literal
            .is_any_duplicates()
            .then(|| SeparatorConfig::new(separators, true));

        let build_mode = |mode: LocalReferenceMode| {
            let mut grammars = Vec::new();
            let mut add = |config: &SeparatorConfig, scheme: SeparatorScheme| {
                if config.is_usable() {
                    debug!(?scheme, ?mode, "built reference grammar");
                    grammars.push(ReferenceGrammar::new(
                        config.clone(),
                        Arc::clone(&books),
                        ParserScheme {
                            separators: scheme,
                            mode,
                        },
                    ));
                } else {
                    debug!(?scheme, ?mode, "separator set unusable, scheme skipped");
                }
            };
            add(&literal, SeparatorScheme::Project);
            if let Some(normalized) = &normalized {
                add(normalized, SeparatorScheme::Normalized);
            }
            add(&SeparatorConfig::standard(), SeparatorScheme::Standard);
            grammars
        };

        Self {
            chapter_mode_grammars: build_mode(LocalReferenceMode::ChapterRangeSequence),
            verse_mode_grammars: build_mode(LocalReferenceMode::VerseRangeSequence),
            chapter_tokens: level_tokens(separators, SeparatorLevel::is_chapter_level),
            verse_tokens: level_tokens(separators, SeparatorLevel::is_verse_level),
            formatter,
        }
    }

    /// Grammars run for `mode`, in order.
    pub fn grammars(&self, mode: LocalReferenceMode) -> &[ReferenceGrammar] {
        match mode {
            LocalReferenceMode::ChapterRangeSequence => &self.chapter_mode_grammars,
            LocalReferenceMode::VerseRangeSequence => &self.verse_mode_grammars,
        }
    }

    pub fn schemes(&self, mode: LocalReferenceMode) -> Vec<ParserScheme> {
        self.grammars(mode).iter().map(ReferenceGrammar::scheme).collect()
    }

    pub fn formatter(&self) -> &ReferenceFormatter {
        &self.formatter
    }

    /// Pick the local-reference mode from whichever separator kind comes first.
    pub fn select_mode(&self, text: &str) -> LocalReferenceMode {
        let lowered = text.to_lowercase();
        let chapter_index = earliest_index(&lowered, &self.chapter_tokens);
        let verse_index = earliest_index(&lowered, &self.verse_tokens);

        match (chapter_index, verse_index) {
            (None, Some(_)) => LocalReferenceMode::VerseRangeSequence,
            (Some(chapter), Some(verse)) if verse < chapter => {
                LocalReferenceMode::VerseRangeSequence
            }
            _ => LocalReferenceMode::ChapterRangeSequence,
        }
    }

    /// Parse `text` with every scheme for its mode and keep the best result.
    pub fn try_parse_scripture_reference(&self, text: &str) -> Option<ScriptureReferenceWrapper> {
        let mode = self.select_mode(text);
        let mut best: Option<ScriptureReferenceWrapper> = None;

        for grammar in self.grammars(mode) {
            match grammar.parse(text) {
                Ok(wrapper) => {
                    trace!(
                        scheme = ?wrapper.scheme,
                        score = wrapper.score,
                        text,
                        "reference parsed"
                    );
                    if best.as_ref().map_or(true, |kept| wrapper.score > kept.score) {
                        best = Some(wrapper);
                    }
                }
                Err(errors) => {
                    trace!(
                        scheme = ?grammar.scheme(),
                        errors = errors.len(),
                        text,
                        "reference rejected"
                    );
                }
            }
        }

        best
    }

    pub fn format_standard_reference(
        &self,
        context: TextContext,
        wrapper: &ScriptureReferenceWrapper,
    ) -> String {
        self.formatter.format_standard_reference(context, wrapper)
    }
}

/// Trimmed, lower-cased, de-duplicated tokens of the selected levels.
fn level_tokens(settings: &SeparatorSettings, include: fn(SeparatorLevel) -> bool) -> Vec<String> {
    let mut seen = HashSet::new();
    SeparatorLevel::NESTED
        .into_iter()
        .filter(|level| include(*level))
        .flat_map(|level| settings.level(level).iter())
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty() && seen.insert(token.clone()))
        .collect()
}

fn earliest_index(text: &str, tokens: &[String]) -> Option<usize> {
    tokens.iter().filter_map(|token| text.find(token.as_str())).min()
}
