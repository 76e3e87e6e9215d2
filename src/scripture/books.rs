//! Book name dictionary.
//!
//! Maps every recognized spelling of a book (code, abbreviation, short name,
//! long name) case-insensitively to a canonical [`BookId`], and renders a
//! book's name in a requested style.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Canonical identity of a book, its upper-case code (e.g. `MAT`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BookId(String);

impl BookId {
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_uppercase())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name styles a book can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookNameType {
    Abbreviation,
    Short,
    Long,
}

impl BookNameType {
    /// Styles to try, most preferred first, when this style is requested.
    pub fn fallback_chain(self) -> [BookNameType; 3] {
        use BookNameType::*;
        match self {
            Abbreviation => [Abbreviation, Short, Long],
            Short => [Short, Abbreviation, Long],
            Long => [Long, Short, Abbreviation],
        }
    }
}

/// One book as it appears in project settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookNameEntry {
    pub code: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub long_name: Option<String>,
}

impl BookNameEntry {
    pub fn name(&self, name_type: BookNameType) -> Option<&str> {
        let name = match name_type {
            BookNameType::Abbreviation => self.abbreviation.as_deref(),
            BookNameType::Short => self.short_name.as_deref(),
            BookNameType::Long => self.long_name.as_deref(),
        };
        name.map(str::trim).filter(|n| !n.is_empty())
    }

    fn spellings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.code.as_str())
            .chain(self.abbreviation.as_deref())
            .chain(self.short_name.as_deref())
            .chain(self.long_name.as_deref())
    }
}

/// Case-insensitive lookup from any spelling to a book.
#[derive(Debug, Clone, Default)]
pub struct BookNames {
    entries: HashMap<BookId, BookNameEntry>,
    lookup: HashMap<String, BookId>,
}

impl BookNames {
    /// Build the dictionary. Earlier entries win when two books share a spelling.
    pub fn new(entries: impl IntoIterator<Item = BookNameEntry>) -> Result<Self, ConfigError> {
        let mut names = Self::default();
        for entry in entries {
            if entry.code.trim().is_empty() {
                let label = entry.spellings().collect::<Vec<_>>().join("/");
                return Err(ConfigError::EmptyBookCode(label));
            }
            let id = BookId::new(&entry.code);
            for spelling in entry.spellings() {
                let key = normalize_key(spelling);
                if !key.is_empty() {
                    names.lookup.entry(key).or_insert_with(|| id.clone());
                }
            }
            names.entries.entry(id).or_insert(entry);
        }
        Ok(names)
    }

    pub fn resolve(&self, name: &str) -> Option<BookId> {
        self.lookup.get(&normalize_key(name)).cloned()
    }

    /// Every recognized spelling, lower-cased with single spaces between words.
    pub fn spellings(&self) -> impl Iterator<Item = &str> {
        self.lookup.keys().map(String::as_str)
    }

    pub fn entry(&self, book: &BookId) -> Option<&BookNameEntry> {
        self.entries.get(book)
    }

    /// The name of `book` in the preferred style, falling back through the
    /// other styles and finally to the book code.
    pub fn display_name(&self, book: &BookId, preferred: BookNameType) -> String {
        self.entry(book)
            .and_then(|entry| {
                preferred
                    .fallback_chain()
                    .into_iter()
                    .find_map(|name_type| entry.name(name_type))
            })
            .map(str::to_string)
            .unwrap_or_else(|| book.code().to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matthew() -> BookNameEntry {
        BookNameEntry {
            code: "MAT".into(),
            abbreviation: Some("Mat".into()),
            short_name: Some("Matthew".into()),
            long_name: Some("The Gospel of Matthew".into()),
        }
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let names = BookNames::new([matthew()]).unwrap();
        assert_eq!(names.resolve("mat"), Some(BookId::new("MAT")));
        assert_eq!(names.resolve("MATTHEW"), Some(BookId::new("MAT")));
        assert_eq!(names.resolve("Luk"), None);
    }

    #[test]
    fn test_multi_word_names_ignore_spacing() {
        let names = BookNames::new([BookNameEntry {
            code: "1SA".into(),
            abbreviation: Some("1Sa".into()),
            short_name: Some("1 Samuel".into()),
            long_name: None,
        }])
        .unwrap();
        assert_eq!(names.resolve("1  SAMUEL"), Some(BookId::new("1SA")));
        assert!(names.spellings().any(|spelling| spelling == "1 samuel"));
    }

    #[test]
    fn test_display_name_falls_back() {
        let mut entry = matthew();
        entry.abbreviation = None;
        let names = BookNames::new([entry]).unwrap();
        let id = BookId::new("MAT");
        assert_eq!(names.display_name(&id, BookNameType::Abbreviation), "Matthew");
        assert_eq!(
            names.display_name(&id, BookNameType::Long),
            "The Gospel of Matthew"
        );
        assert_eq!(names.display_name(&BookId::new("XYZ"), BookNameType::Short), "XYZ");
    }

    #[test]
    fn test_empty_code_is_rejected() {
        let mut entry = matthew();
        entry.code = " ".into();
        assert!(matches!(
            BookNames::new([entry]),
            Err(ConfigError::EmptyBookCode(_))
        ));
    }
}
