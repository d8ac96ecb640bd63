//! Static facts about the discord.js API surface.
//!
//! The table is produced offline by introspecting the library's type
//! declarations and shipped as a JSON artifact:
//!
//! ```json
//! {
//!   "version": "14.14.1",
//!   "gatewayIntents": ["Guilds", "GuildMessages", "MessageContent"],
//!   "builderMethods": { "ButtonBuilder": ["setCustomId", "setStyle"] },
//!   "componentBuilders": ["ButtonBuilder", "StringSelectMenuBuilder"]
//! }
//! ```
//!
//! Missing or `null` fields fall back to empty defaults so a partial
//! artifact never fails the analyzer.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

/// Category name for gateway intent flags.
pub const GATEWAY_INTENTS: &str = "gatewayIntents";
/// Category name for interactive component builders.
pub const COMPONENT_BUILDERS: &str = "componentBuilders";

static BUILTIN_JSON: &str = include_str!("../data/metadata.json");

static BUILTIN: Lazy<MetadataTable> = Lazy::new(|| {
    MetadataTable::from_json(BUILTIN_JSON).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "embedded metadata artifact is invalid, using empty table");
        MetadataTable::default()
    })
});

/// Errors that can occur while loading a metadata artifact.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("reading metadata artifact {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("parsing metadata artifact: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Raw artifact shape. Every field is optional so malformed input degrades.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    gateway_intents: Option<Vec<String>>,
    #[serde(default)]
    builder_methods: Option<BTreeMap<String, Option<Vec<String>>>>,
    #[serde(default)]
    component_builders: Option<Vec<String>>,
}

/// Recognized values and builder methods for the installed library version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataTable {
    pub version: Option<String>,
    pub gateway_intents: BTreeSet<String>,
    pub builder_methods: BTreeMap<String, BTreeSet<String>>,
    pub component_builders: BTreeSet<String>,
}

impl MetadataTable {
    /// The table embedded at compile time.
    pub fn builtin() -> &'static MetadataTable {
        &BUILTIN
    }

    /// Parse a table from its JSON artifact.
    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        let raw: RawMetadata = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw))
    }

    /// Load a table from a JSON artifact on disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MetadataError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Load a table from disk, falling back to the embedded one on failure.
    pub fn load_or_builtin<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to embedded metadata");
                Self::builtin().clone()
            }
        }
    }

    fn from_raw(raw: RawMetadata) -> Self {
        let builder_methods = raw
            .builder_methods
            .unwrap_or_default()
            .into_iter()
            .map(|(builder, methods)| (builder, methods.unwrap_or_default().into_iter().collect()))
            .collect();

        Self {
            version: raw.version,
            gateway_intents: raw.gateway_intents.unwrap_or_default().into_iter().collect(),
            builder_methods,
            component_builders: raw
                .component_builders
                .unwrap_or_default()
                .into_iter()
                .collect(),
        }
    }

    /// All recognized values for a category, if the category is known.
    pub fn recognized_values(&self, category: &str) -> Option<&BTreeSet<String>> {
        match category {
            GATEWAY_INTENTS => Some(&self.gateway_intents),
            COMPONENT_BUILDERS => Some(&self.component_builders),
            _ => None,
        }
    }

    /// Check whether `value` is a recognized member of `category`.
    pub fn is_recognized_value(&self, category: &str, value: &str) -> bool {
        self.recognized_values(category)
            .map(|set| set.contains(value))
            .unwrap_or(false)
    }

    /// Whether a warning about `value` should be suppressed.
    ///
    /// An empty set means "unknown", which never suppresses. A non-empty set
    /// that lacks the value means the installed version has no such flag.
    pub fn suppresses(&self, category: &str, value: &str) -> bool {
        match self.recognized_values(category) {
            Some(set) if !set.is_empty() => !set.contains(value),
            _ => false,
        }
    }

    /// Known methods of a builder; empty when the builder is unknown.
    pub fn methods_for(&self, builder: &str) -> BTreeSet<String> {
        self.builder_methods.get(builder).cloned().unwrap_or_default()
    }

    /// Builders considered interactive message components.
    pub fn component_builders(&self) -> &BTreeSet<String> {
        &self.component_builders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_table_loads() {
        let table = MetadataTable::builtin();
        assert!(table.version.is_some());
        assert!(table.is_recognized_value(GATEWAY_INTENTS, "MessageContent"));
        assert!(table.component_builders().contains("ButtonBuilder"));
        assert!(table.methods_for("ButtonBuilder").contains("setStyle"));
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let table = MetadataTable::from_json(r#"{"version": null}"#).unwrap();
        assert_eq!(table.version, None);
        assert!(table.gateway_intents.is_empty());
        assert!(table.methods_for("ButtonBuilder").is_empty());
        assert!(!table.is_recognized_value(GATEWAY_INTENTS, "Guilds"));
    }

    #[test]
    fn test_null_fields_default_to_empty() {
        let json = r#"{"gatewayIntents": null, "builderMethods": {"ButtonBuilder": null}}"#;
        let table = MetadataTable::from_json(json).unwrap();
        assert!(table.gateway_intents.is_empty());
        assert!(table.methods_for("ButtonBuilder").is_empty());
    }

    #[test]
    fn test_unknown_category_is_never_recognized() {
        let table = MetadataTable::builtin();
        assert!(!table.is_recognized_value("partials", "Channel"));
        assert!(!table.suppresses("partials", "Channel"));
    }

    #[test]
    fn test_suppresses() {
        let empty = MetadataTable::default();
        assert!(!empty.suppresses(GATEWAY_INTENTS, "MessageContent"));

        let table =
            MetadataTable::from_json(r#"{"gatewayIntents": ["Guilds", "GuildMessages"]}"#).unwrap();
        assert!(table.suppresses(GATEWAY_INTENTS, "MessageContent"));
        assert!(!table.suppresses(GATEWAY_INTENTS, "Guilds"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"version": "14.0.0", "componentBuilders": ["ButtonBuilder"]}}"#).unwrap();

        let table = MetadataTable::load(file.path()).unwrap();
        assert_eq!(table.version.as_deref(), Some("14.0.0"));
        assert!(table.is_recognized_value(COMPONENT_BUILDERS, "ButtonBuilder"));
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let err = MetadataTable::load("/nonexistent/metadata.json").unwrap_err();
        assert!(matches!(err, MetadataError::Io { .. }));

        let table = MetadataTable::load_or_builtin("/nonexistent/metadata.json");
        assert_eq!(&table, MetadataTable::builtin());
    }
}
