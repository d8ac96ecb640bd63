//! Build-time extraction of catalog entries from an installed discord.js tree.
//!
//! Two passes feed the catalog:
//!
//! 1. The library's error-message table (`src/errors/Messages.js`), parsed
//!    literally: `[DjsErrorCodes.TokenInvalid]: 'An invalid token was provided.'`
//! 2. A scan of every source file for `throw new X(ErrorCodes.Code)`,
//!    `throw new TypeError('literal')` and `if (!param) throw` guards.
//!    A literal throw is keyed by the `TypeError: literal` line Node prints
//!    for it, so two throws of one class stay distinct and a bare class name
//!    never becomes a catalog code.
//!
//! [`build_catalog`] inserts pass 2 first so the richer messages from the
//! table overwrite synthesized ones. A missing library yields empty passes.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{ErrorCatalog, ErrorCatalogEntry};

/// Locations of the message table relative to the library root.
const MESSAGE_TABLE_PATHS: &[&str] = &["src/errors/Messages.js", "src/errors/messages.js"];

const SOURCE_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "ts"];

lazy_static! {
    static ref MESSAGE_ENTRY: Regex = Regex::new(
        r#"\[\s*(?:DjsErrorCodes|ErrorCodes)\.(\w+)\s*\]\s*:\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)"|(?:\([^)]*\)|\w+)\s*=>\s*`([^`]*)`)"#
    ).unwrap();

    static ref THROW_CODE: Regex = Regex::new(
        r"throw\s+new\s+\w+\(\s*(?:DjsErrorCodes|ErrorCodes)\.(\w+)"
    ).unwrap();

    static ref THROW_LITERAL: Regex = Regex::new(
        r#"throw\s+new\s+(\w*Error)\(\s*['"`]([^'"`\n]+)['"`]"#
    ).unwrap();

    static ref GUARD: Regex = Regex::new(
        r"if\s*\(\s*!\s*([A-Za-z_$][\w$]*)\s*\)\s*\{?\s*throw\b"
    ).unwrap();
}

/// Pass 1: parse the error-message table under `library_root`.
pub fn extract_message_table<P: AsRef<Path>>(library_root: P) -> Vec<ErrorCatalogEntry> {
    let root = library_root.as_ref();
    let Some(path) = MESSAGE_TABLE_PATHS
        .iter()
        .map(|rel| root.join(rel))
        .find(|p| p.is_file())
    else {
        tracing::debug!(root = %root.display(), "no error message table found");
        return Vec::new();
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => parse_message_table(&content),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "cannot read message table");
            Vec::new()
        }
    }
}

/// Parse message-table source text.
pub fn parse_message_table(content: &str) -> Vec<ErrorCatalogEntry> {
    MESSAGE_ENTRY
        .captures_iter(content)
        .map(|caps| {
            let code = caps[1].to_string();
            let message = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| normalize_template(m.as_str()))
                .unwrap_or_default();
            ErrorCatalogEntry::new(code, message, "messages")
        })
        .collect()
}

/// Pass 2: scan every source file under `library_root` for thrown errors.
pub fn extract_thrown_errors<P: AsRef<Path>>(library_root: P) -> Vec<ErrorCatalogEntry> {
    let root = library_root.as_ref();
    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "library root not found");
        return Vec::new();
    }

    let mut entries = Vec::new();
    for path in source_files(root) {
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        let rel = path
            .strip_prefix(root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|_| path.to_string_lossy().to_string());
        entries.extend(parse_thrown_errors(&content, &rel));
    }
    entries
}

/// Extract thrown-error entries from one source file's text.
pub fn parse_thrown_errors(content: &str, file: &str) -> Vec<ErrorCatalogEntry> {
    let source = format!("throw:{}", file);
    let mut entries = Vec::new();

    for caps in THROW_CODE.captures_iter(content) {
        entries.push(ErrorCatalogEntry::new(&caps[1], "", source.clone()));
    }

    for caps in THROW_LITERAL.captures_iter(content) {
        if let Some(code) = literal_throw_code(&caps[1], &caps[2]) {
            entries.push(ErrorCatalogEntry::new(code, caps[2].trim(), source.clone()));
        }
    }

    let guard_source = format!("guard:{}", file);
    for caps in GUARD.captures_iter(content) {
        let param = &caps[1];
        entries.push(ErrorCatalogEntry::new(
            format!("{}Missing", capitalize(param.trim_start_matches('$'))),
            format!("`{}` is required but was not provided.", param),
            guard_source.clone(),
        ));
    }

    entries
}

/// Run both passes and merge them; message-table entries win.
pub fn build_catalog<P: AsRef<Path>>(library_root: P) -> ErrorCatalog {
    let root = library_root.as_ref();
    let thrown = extract_thrown_errors(root);
    let messages = extract_message_table(root);
    tracing::debug!(
        thrown = thrown.len(),
        messages = messages.len(),
        "extracted catalog entries"
    );

    let mut catalog = ErrorCatalog::new();
    catalog.merge(thrown);
    catalog.merge(messages);
    catalog
}

fn source_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            !(e.file_type().is_dir() && e.depth() > 0 && (name == "node_modules" || name.starts_with('.')))
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| SOURCE_EXTENSIONS.contains(&e))
                .unwrap_or(false)
        })
        .collect()
}

/// Replace `${expr}` placeholders with `{n}` so messages read as templates.
fn normalize_template(message: &str) -> String {
    lazy_static! {
        static ref PLACEHOLDER: Regex = Regex::new(r"\$\{[^}]*\}").unwrap();
    }
    let mut n = 0;
    PLACEHOLDER
        .replace_all(message, |_: &regex::Captures| {
            let s = format!("{{{}}}", n);
            n += 1;
            s
        })
        .into_owned()
}

/// Code for `throw new Class('message')`: the first line of the stack trace.
/// Interpolated template messages have no stable text and are skipped.
fn literal_throw_code(class: &str, message: &str) -> Option<String> {
    let message = message.trim();
    if class.is_empty() || message.is_empty() || message.contains("${") {
        return None;
    }
    Some(format!("{}: {}", class, message))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
