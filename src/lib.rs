//! Botcheck - static analysis for discord.js bots.
//!
//! Botcheck scans bot source text for mistakes that discord.js only reports
//! at runtime, or never: missing gateway intents, builders without their
//! required fields, components outside action rows, known error codes and
//! v13 leftovers.
//!
//! # Architecture
//!
//! - `detect`: the `Detector` trait, the rule families and the `Analyzer`
//!   that runs them in registration order and deduplicates the output
//! - `catalog`: known error identifiers, with offline extraction passes
//! - `metadata`: recognized intents, builder methods and component builders
//! - `docs`: attaches example code to diagnostics, locally or remotely
//! - `config`: YAML config and the enable flag
//! - `report`: output formatting (text, JSON)
//!
//! # Example
//!
//! ```
//! use botcheck::{analyze_code, Analyzer, Config};
//!
//! let config = Config { enabled: Some(true), ..Default::default() };
//! let analyzer = Analyzer::from_config(&config);
//! let diagnostics = analyze_code(analyzer.as_ref(), "const client = new Client({});");
//! assert_eq!(diagnostics[0].message, "Client is created without intents");
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod detect;
pub mod docs;
pub mod logging;
pub mod metadata;
pub mod report;

pub use catalog::{ErrorCatalog, ErrorCatalogEntry};
pub use config::Config;
pub use detect::{
    analyze_code, AnalysisResult, Analyzer, Detector, Diagnostic, DiagnosticKind, Severity,
};
pub use docs::{enrich, examples_for, DocEntry, DocExamples, DocsSource};
pub use metadata::MetadataTable;
pub use report::LintReport;
