//! Error types for the scripture reference engine.
//!
//! Data-quality problems in checked text never surface here: they become
//! diagnostics. These errors cover setup mistakes only.

use thiserror::Error;

/// Fatal problems with project settings, raised while loading or building.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid target reference pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("book entry `{0}` has an empty code")]
    EmptyBookCode(String),
}

/// Violations of reference value invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("a chapter range needs at least one verse range side")]
    MissingVerseRanges,
}
