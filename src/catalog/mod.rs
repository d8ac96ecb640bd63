//! Catalog of known discord.js error identifiers.
//!
//! The catalog maps an identifier (an error code such as
//! `InteractionAlreadyReplied` or an API error such as `Missing Permissions`)
//! to the library's own description of it. It is built offline by the
//! passes in [`extract`] or hand-curated, shipped as a JSON artifact, and
//! never mutated while analyzing.

pub mod extract;
mod remediation;

pub use remediation::remediation_for;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

static BUILTIN_JSON: &str = include_str!("../../data/error_catalog.json");

static BUILTIN: Lazy<ErrorCatalog> = Lazy::new(|| {
    ErrorCatalog::from_json(BUILTIN_JSON).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "embedded error catalog is invalid, using empty catalog");
        ErrorCatalog::new()
    })
});

/// Errors that can occur while loading or saving a catalog artifact.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("reading catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("parsing catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A known error identifier and its description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCatalogEntry {
    pub code: String,
    #[serde(default)]
    pub message: String,
    /// Which extraction pass or file produced this entry.
    #[serde(default)]
    pub source: String,
}

impl ErrorCatalogEntry {
    pub fn new(code: impl Into<String>, message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct IndexedEntry {
    entry: ErrorCatalogEntry,
    matcher: Regex,
}

/// Insertion-ordered catalog, unique by `code`.
#[derive(Debug, Clone, Default)]
pub struct ErrorCatalog {
    entries: Vec<IndexedEntry>,
    index: HashMap<String, usize>,
}

impl ErrorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The hand-curated catalog embedded at compile time.
    pub fn builtin() -> &'static ErrorCatalog {
        &BUILTIN
    }

    /// Build a catalog from entries; later duplicates overwrite earlier ones.
    pub fn from_entries<I: IntoIterator<Item = ErrorCatalogEntry>>(entries: I) -> Self {
        let mut catalog = Self::new();
        catalog.merge(entries);
        catalog
    }

    /// Parse a catalog from its JSON artifact (an array of entries).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<ErrorCatalogEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }

    /// Load a catalog artifact from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Serialize the catalog as a JSON artifact.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let entries: Vec<&ErrorCatalogEntry> = self.entries().collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    /// Insert or overwrite an entry. Overwrites keep the original position.
    pub fn insert(&mut self, entry: ErrorCatalogEntry) {
        if entry.code.trim().is_empty() {
            return;
        }
        let matcher = match identifier_matcher(&entry.code) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(code = %entry.code, error = %e, "skipping unmatchable catalog code");
                return;
            }
        };

        match self.index.get(&entry.code) {
            Some(&idx) => self.entries[idx] = IndexedEntry { entry, matcher },
            None => {
                self.index.insert(entry.code.clone(), self.entries.len());
                self.entries.push(IndexedEntry { entry, matcher });
            }
        }
    }

    /// Merge entries in order, last write wins.
    pub fn merge<I: IntoIterator<Item = ErrorCatalogEntry>>(&mut self, entries: I) {
        for entry in entries {
            self.insert(entry);
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, code: &str) -> Option<&ErrorCatalogEntry> {
        self.index.get(code).map(|&idx| &self.entries[idx].entry)
    }

    /// Every entry whose code appears in `text` as a whole word, ignoring case.
    ///
    /// Results follow catalog order. A code that only appears inside a longer
    /// identifier (`Foo` inside `FooBar`) does not match.
    pub fn find_identifiers_in(&self, text: &str) -> Vec<&ErrorCatalogEntry> {
        if text.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|e| e.matcher.is_match(text))
            .map(|e| &e.entry)
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ErrorCatalogEntry> {
        self.entries.iter().map(|e| &e.entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Case-insensitive whole-word matcher for a catalog code.
fn identifier_matcher(code: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"(?i)(?:^|[^\w$]){}(?:[^\w$]|$)",
        regex::escape(code)
    ))
}
