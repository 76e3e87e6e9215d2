//! Scripture reference engine.
//!
//! Components, leaves first:
//!
//! - [`separators`]: per-level separator sets with duplicate detection
//! - [`grammar`]: chumsky reference grammar parameterized by separators
//! - [`builder`]: runs several grammars and keeps the best-scoring parse
//! - [`formatter`]: canonical rendering for a text context
//! - [`checker`]: finds references in verse text and classifies problems
//!
//! [`config`] loads the project settings all of them are built from.

pub mod ast;
pub mod books;
pub mod builder;
pub mod checker;
pub mod config;
pub mod error;
pub mod formatter;
pub mod grammar;
pub mod separators;

pub use ast::{
    BookReferenceName, BookVerseReference, ChapterRange, LocalReferenceMode, ParserScheme,
    ScriptureReference, ScriptureReferenceWrapper, SeparatorScheme, VerseRange,
};
pub use books::{BookId, BookNameEntry, BookNameType, BookNames};
pub use builder::ScriptureReferenceBuilder;
pub use checker::{
    CheckResultItem, CheckType, ScriptureReferenceChecker, ScriptureReferenceErrorType,
    VerseLocation, VersePart,
};
pub use config::{load_defaults, Loader, ProjectSettings};
pub use error::{ConfigError, ReferenceError};
pub use formatter::{NameTypeSettings, ReferenceFormatter, TextContext};
pub use separators::{SeparatorConfig, SeparatorLevel, SeparatorSettings};
