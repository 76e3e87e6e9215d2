//! Validation pass over verse text.
//!
//! Candidate spans come from the project's target-reference patterns. Each span
//! is parsed, re-rendered canonically and compared with what was written; the
//! difference is classified into a [`ScriptureReferenceErrorType`].

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::builder::ScriptureReferenceBuilder;
use super::config::ProjectSettings;
use super::error::ConfigError;
use super::formatter::TextContext;

/// Kinds of reference problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScriptureReferenceErrorType {
    LooseFormatting,
    IncorrectNameStyle,
    TagShouldNotExist,
    MissingTag,
    IncorrectTag,
    MalformedTag,
    BadReference,
}

impl ScriptureReferenceErrorType {
    /// Stable sub-type code reported with each diagnostic.
    pub fn code(self) -> u8 {
        match self {
            ScriptureReferenceErrorType::LooseFormatting => 0,
            ScriptureReferenceErrorType::IncorrectNameStyle => 1,
            ScriptureReferenceErrorType::TagShouldNotExist => 2,
            ScriptureReferenceErrorType::MissingTag => 3,
            ScriptureReferenceErrorType::IncorrectTag => 4,
            ScriptureReferenceErrorType::MalformedTag => 5,
            ScriptureReferenceErrorType::BadReference => 6,
        }
    }
}

/// The check a diagnostic came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CheckType {
    ScriptureReference,
}

/// Book, chapter and verse a piece of text belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VerseLocation {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
}

impl VerseLocation {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse,
        }
    }
}

impl fmt::Display for VerseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}

/// A run of verse text in a single context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VersePart {
    pub location: VerseLocation,
    pub context: TextContext,
    pub text: String,
}

impl VersePart {
    pub fn new(location: VerseLocation, context: TextContext, text: impl Into<String>) -> Self {
        Self {
            location,
            context,
            text: text.into(),
        }
    }
}

/// One reported problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResultItem {
    pub verse_part: VersePart,
    pub message: String,
    pub matched_text: String,
    /// Character offset of the match within the verse part text.
    pub match_start: usize,
    pub suggestion: Option<String>,
    pub check_type: CheckType,
    pub error_type: ScriptureReferenceErrorType,
}

impl CheckResultItem {
    pub fn error_code(&self) -> u8 {
        self.error_type.code()
    }
}

/// A span found by a target pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CandidateSpan<'a> {
    location: &'a VerseLocation,
    context: TextContext,
    start: usize,
    text: &'a str,
}

/// Finds and classifies references in verse text.
#[derive(Debug, Clone)]
pub struct ScriptureReferenceChecker {
    builder: ScriptureReferenceBuilder,
    target_patterns: Vec<Regex>,
}

impl ScriptureReferenceChecker {
    pub fn new(settings: &ProjectSettings) -> Result<Self, ConfigError> {
        let builder = ScriptureReferenceBuilder::new(settings)?;
        Self::with_builder(builder, &settings.target_references)
    }

    pub fn with_builder(
        builder: ScriptureReferenceBuilder,
        patterns: &[String],
    ) -> Result<Self, ConfigError> {
        let target_patterns = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            builder,
            target_patterns,
        })
    }

    pub fn builder(&self) -> &ScriptureReferenceBuilder {
        &self.builder
    }

    /// Check every candidate span in `part`, appending diagnostics to `results`.
    pub fn check_text(&self, part: &VersePart, results: &mut Vec<CheckResultItem>) {
        let mut checked = HashSet::new();

        for pattern in &self.target_patterns {
            for found in pattern.find_iter(&part.text) {
                let span = CandidateSpan {
                    location: &part.location,
                    context: part.context,
                    start: part.text[..found.start()].chars().count(),
                    text: found.as_str(),
                };
                if checked.insert(span.clone()) {
                    self.check_span(part, &span, results);
                }
            }
        }
    }

    fn check_span(
        &self,
        part: &VersePart,
        span: &CandidateSpan<'_>,
        results: &mut Vec<CheckResultItem>,
    ) {
        let mut report = |error_type: ScriptureReferenceErrorType,
                          message: String,
                          suggestion: Option<String>| {
            debug!(
                location = %part.location,
                ?error_type,
                matched = span.text,
                "reference diagnostic"
            );
            results.push(CheckResultItem {
                verse_part: part.clone(),
                message,
                matched_text: span.text.to_string(),
                match_start: span.start,
                suggestion,
                check_type: CheckType::ScriptureReference,
                error_type,
            });
        };

        let Some(wrapper) = self.builder.try_parse_scripture_reference(span.text) else {
            report(
                ScriptureReferenceErrorType::MalformedTag,
                format!("Malformed reference at position {}.", span.start),
                None,
            );
            return;
        };

        let unknown: Vec<&str> = wrapper
            .reference
            .unknown_book_names()
            .map(|name| name.name_text.as_str())
            .collect();
        if !unknown.is_empty() {
            report(
                ScriptureReferenceErrorType::BadReference,
                format!(
                    "Unknown book name at position {}: {}.",
                    span.start,
                    unknown.join(", ")
                ),
                None,
            );
        }

        let standard = self.builder.format_standard_reference(span.context, &wrapper);
        if standard == span.text {
            return;
        }

        if without_whitespace(&standard) == without_whitespace(span.text) {
            report(
                ScriptureReferenceErrorType::LooseFormatting,
                format!("Loosely formatted reference at position {}.", span.start),
                Some(standard),
            );
            return;
        }

        let styled_for_other_context = TextContext::ALL
            .into_iter()
            .filter(|context| *context != span.context)
            .any(|context| self.builder.format_standard_reference(context, &wrapper) == span.text);
        if styled_for_other_context {
            report(
                ScriptureReferenceErrorType::IncorrectNameStyle,
                format!("Incorrect book name style at position {}.", span.start),
                Some(standard),
            );
        } else {
            report(
                ScriptureReferenceErrorType::BadReference,
                format!("Incorrectly formatted reference at position {}.", span.start),
                Some(standard),
            );
        }
    }
}

fn without_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
