//! Project settings consumed by the engine.
//!
//! `defaults/scripture.default.toml` is embedded so that every consumer starts
//! from the same separators, book list and name styles. Project files and
//! single-key overrides are layered on top via [`Loader`] before deserializing
//! into [`ProjectSettings`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

use super::books::BookNameEntry;
use super::error::ConfigError;
use super::formatter::NameTypeSettings;
use super::separators::SeparatorSettings;

const DEFAULT_TOML: &str = include_str!("../../defaults/scripture.default.toml");

/// Everything the reference engine reads from a project.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSettings {
    pub separators: SeparatorSettings,
    pub name_types: NameTypeSettings,
    /// Regular expressions selecting candidate reference spans in verse text.
    pub target_references: Vec<String>,
    /// Tag markers (without backslash) that always come as an open/close pair.
    #[serde(default)]
    pub paired_tags: Vec<String>,
    pub books: Vec<BookNameEntry>,
}

/// Helper for layering project settings over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a settings file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional settings file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer settings held in memory, e.g. a project's stored configuration.
    pub fn with_toml(mut self, toml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(toml, FileFormat::Toml));
        self
    }

    /// Apply a single key/value override.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting settings.
    pub fn build(self) -> Result<ProjectSettings, ConfigError> {
        Ok(self.builder.build()?.try_deserialize()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ProjectSettings, ConfigError> {
    Loader::new().build()
}
