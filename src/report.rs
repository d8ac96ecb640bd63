//! Output formatting for lint results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for editors and CI

use colored::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::detect::{AnalysisResult, Diagnostic, DiagnosticKind, Severity};

/// Diagnostics for one analyzed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub file: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Whole-run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintReport {
    pub version: String,
    pub path: String,
    pub enabled: bool,
    pub files_scanned: usize,
    pub errors: usize,
    pub warnings: usize,
    pub files: Vec<FileReport>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl LintReport {
    /// Build a report from per-file results. Files without diagnostics are
    /// counted but not listed.
    pub fn new(path: &str, enabled: bool, results: Vec<(String, AnalysisResult)>) -> Self {
        let files_scanned = results.len();
        let mut errors = 0;
        let mut warnings = 0;
        let mut files = Vec::new();

        for (file, result) in results {
            errors += result.count(DiagnosticKind::Error);
            warnings += result.count(DiagnosticKind::Warning);
            if !result.diagnostics.is_empty() {
                files.push(FileReport {
                    file,
                    diagnostics: result.diagnostics,
                });
            }
        }

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            path: path.to_string(),
            enabled,
            files_scanned,
            errors,
            warnings,
            files,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn total(&self) -> usize {
        self.files.iter().map(|f| f.diagnostics.len()).sum()
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// Write the report as pretty-printed JSON.
pub fn write_json(report: &LintReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write the report in pretty (human-readable) format.
pub fn write_pretty(report: &LintReport, show_details: bool) {
    println!();
    print!("  ");
    print!("{}", "botcheck".cyan().bold());
    println!(" v{}", report.version);
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{} ({} files)", report.path, report.files_scanned);
    println!();

    if !report.enabled {
        println!(
            "  {}",
            "Analyzer disabled (set enabled: true or BOTCHECK_ANALYZER=1)".yellow()
        );
        println!();
        return;
    }

    for file in &report.files {
        write_file(file, show_details);
    }

    write_summary(report);
    println!();
}

fn write_file(file: &FileReport, show_details: bool) {
    println!("  {}", file.file.blue().bold());
    println!();

    for d in &file.diagnostics {
        write_kind_tag(d.kind);
        if let Some(line) = d.line {
            print!("{}", format!("{:>5}", format!(":{}", line)).dimmed());
        } else {
            print!("{}", "     ".dimmed());
        }
        print!("  {}", d.message);
        if let Some(severity) = d.severity {
            print!("  ");
            write_severity(severity);
        }
        println!();

        if show_details {
            if let Some(details) = &d.details {
                for line in details.lines() {
                    println!("              {}", line.dimmed());
                }
            }
            if let Some(link) = &d.doc_link {
                println!("              {}", link.underline());
            }
        }
    }
    println!();
}

fn write_kind_tag(kind: DiagnosticKind) {
    match kind {
        DiagnosticKind::Error => print!("    {} ", "ERROR".red()),
        DiagnosticKind::Warning => print!("    {} ", "WARN ".yellow()),
        DiagnosticKind::Info => print!("    {} ", "INFO ".blue()),
        DiagnosticKind::Suggestion => print!("    {} ", "HINT ".green()),
    }
}

fn write_severity(severity: Severity) {
    let label = format!("[{}]", severity);
    match severity {
        Severity::Critical => print!("{}", label.red().bold()),
        Severity::High => print!("{}", label.red()),
        Severity::Medium => print!("{}", label.yellow()),
        Severity::Low => print!("{}", label.dimmed()),
    }
}

fn write_summary(report: &LintReport) {
    if report.has_errors() {
        print!("  {}", "✗ FAIL".red());
    } else {
        print!("  {}", "✓ PASS".green());
    }
    println!(
        "  {} errors, {} warnings, {} total",
        report.errors,
        report.warnings,
        report.total()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<(String, AnalysisResult)> {
        vec![
            (
                "bot/index.js".to_string(),
                AnalysisResult::new(vec![
                    Diagnostic::error("Client is created without intents").at_line(Some(2)),
                    Diagnostic::warning("Missing MessageContent intent"),
                ]),
            ),
            ("bot/clean.js".to_string(), AnalysisResult::empty()),
        ]
    }

    #[test]
    fn test_report_counts() {
        let report = LintReport::new("bot", true, results());
        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.errors, 1);
        assert_eq!(report.warnings, 1);
        assert_eq!(report.total(), 2);
        assert!(report.has_errors());
    }

    #[test]
    fn test_report_json_shape() {
        let report = LintReport::new("bot", true, results());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["filesScanned"], 2);
        assert_eq!(value["files"][0]["file"], "bot/index.js");
        let first = &value["files"][0]["diagnostics"][0];
        assert_eq!(first["kind"], "error");
        assert_eq!(first["line"], 2);
        assert!(first.get("codeSnippet").is_none());
        assert!(value["timestamp"].is_string());
    }
}
