//! Command-line interface for botcheck.

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::catalog::{extract, ErrorCatalog};
use crate::config::{self, Config};
use crate::detect::{AnalysisResult, Analyzer};
use crate::docs::{DocsSource, RemoteDocs};
use crate::metadata::MetadataTable;
use crate::report::{self, LintReport};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default config file names to search for.
const DEFAULT_CONFIG_NAMES: &[&str] = &["botcheck.yaml", ".botcheck.yaml"];

/// Extensions of bot source files.
const SOURCE_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "tsx"];

/// Static analysis for discord.js bots.
///
/// Botcheck flags missing gateway intents, incomplete component builders,
/// known discord.js errors and common v14 mistakes.
#[derive(Parser)]
#[command(name = "botcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by BOTCHECK_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze bot source files
    #[command(visible_alias = "check")]
    Lint(LintArgs),
    /// Build an error catalog artifact from an installed discord.js tree
    Catalog(CatalogArgs),
    /// List the detectors in execution order
    Detectors,
}

/// Arguments for the lint command.
#[derive(Parser)]
pub struct LintArgs {
    /// Path to check (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Run the analyzer even if the config and environment leave it off
    #[arg(long)]
    pub enable: bool,

    /// Attach documentation examples to the diagnostics
    #[arg(long)]
    pub docs: bool,

    /// Print details and documentation links under each diagnostic
    #[arg(long)]
    pub details: bool,
}

/// Arguments for the catalog command.
#[derive(Parser)]
pub struct CatalogArgs {
    /// Root of the discord.js package (e.g. node_modules/discord.js)
    pub library_root: PathBuf,

    /// Output file path
    #[arg(short, long, default_value = "error-catalog.json")]
    pub output: PathBuf,
}

/// Find a config file next to the linted path, then in the current directory.
pub fn discover_config(root: &Path) -> Option<PathBuf> {
    let dirs = [root.to_path_buf(), PathBuf::from(".")];
    for dir in dirs.iter() {
        for name in DEFAULT_CONFIG_NAMES {
            let path = dir.join(name);
            if path.is_file() {
                return Some(path);
            }
        }
    }
    None
}

/// Collect bot source files under `root`.
pub fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let filter = config.path_filter()?;
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !(name.starts_with('.') || name == "node_modules" || name == "dist" || name == "build")
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !SOURCE_EXTENSIONS.contains(&ext) || path.to_string_lossy().ends_with(".d.ts") {
            continue;
        }
        let rel = path.strip_prefix(root).unwrap_or(path);
        if filter.is_excluded(rel) {
            debug!(file = %rel.display(), "excluded by config");
            continue;
        }
        files.push(path.to_path_buf());
    }

    Ok(files)
}

fn display_path(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_string_lossy().to_string(),
        _ => path.to_string_lossy().to_string(),
    }
}

fn docs_source(config: &Config) -> anyhow::Result<DocsSource> {
    Ok(match &config.docs_endpoint {
        Some(endpoint) => DocsSource::Remote(RemoteDocs::new(
            endpoint.clone(),
            Duration::from_millis(config.docs_timeout_ms()),
        )?),
        None => DocsSource::Local,
    })
}

/// Attach documentation examples to every file's diagnostics.
///
/// Enrichment never fails the lint: a source or runtime that cannot be set up
/// is logged and the diagnostics are reported as they are.
pub fn enrich_results(config: &Config, results: &mut [(String, AnalysisResult)]) -> usize {
    let source = match docs_source(config) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "docs source unavailable, skipping enrichment");
            return 0;
        }
    };
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            warn!(error = %e, "cannot start async runtime, skipping enrichment");
            return 0;
        }
    };

    runtime.block_on(async {
        let mut updated = 0;
        for (_, result) in results.iter_mut() {
            updated += source.enrich(&mut result.diagnostics).await;
        }
        updated
    })
}

/// Analyze every file, in parallel. Unreadable files are skipped.
pub fn analyze_files(
    analyzer: Option<&Analyzer>,
    files: &[PathBuf],
    root: &Path,
) -> Vec<(String, AnalysisResult)> {
    files
        .par_iter()
        .filter_map(|file| match std::fs::read_to_string(file) {
            Ok(code) => {
                let result = match analyzer {
                    Some(a) => a.analyze(&code),
                    None => AnalysisResult::empty(),
                };
                Some((display_path(file, root), result))
            }
            Err(e) => {
                warn!(file = %file.display(), error = %e, "skipping unreadable file");
                None
            }
        })
        .collect()
}

/// Run the lint command.
pub fn run_lint(args: &LintArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    // Resolve path
    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };
    let root = if abs_path.is_dir() {
        abs_path.clone()
    } else {
        abs_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| abs_path.clone())
    };

    // Load config if one is given or found
    let config_path = args.config.clone().or_else(|| discover_config(&root));
    let mut config = match &config_path {
        Some(path) => match Config::parse_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error parsing config {:?}: {}", path, e);
                return Ok(EXIT_ERROR);
            }
        },
        None => Config::default(),
    };

    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid config: {}", e);
        return Ok(EXIT_ERROR);
    }

    if args.enable {
        config.enabled = Some(true);
    }

    let files = if abs_path.is_dir() {
        collect_files(&abs_path, &config)?
    } else {
        vec![abs_path.clone()]
    };
    debug!(files = files.len(), config = ?config_path, "collected files");

    let analyzer = Analyzer::from_config(&config);
    let enabled = analyzer.is_some();
    let mut results = analyze_files(analyzer.as_ref(), &files, &root);
    results.sort_by(|a, b| a.0.cmp(&b.0));

    if args.docs && enabled {
        enrich_results(&config, &mut results);
    }

    let report = LintReport::new(&args.path.to_string_lossy(), enabled, results);

    match args.format.as_str() {
        "json" => report::write_json(&report)?,
        _ => report::write_pretty(&report, args.details),
    }

    if report.has_errors() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the catalog command.
pub fn run_catalog(args: &CatalogArgs) -> anyhow::Result<i32> {
    if !args.library_root.is_dir() {
        eprintln!("Error: {:?} is not a directory", args.library_root);
        return Ok(EXIT_ERROR);
    }

    let catalog = extract::build_catalog(&args.library_root);
    if catalog.is_empty() {
        eprintln!(
            "Warning: no error definitions found under {:?}",
            args.library_root
        );
    }

    std::fs::write(&args.output, catalog.to_json()?)?;
    println!(
        "Wrote {} entries to {}",
        catalog.len(),
        args.output.display()
    );
    Ok(EXIT_SUCCESS)
}

/// Run the detectors command.
pub fn run_detectors() -> anyhow::Result<i32> {
    let analyzer = Analyzer::with_default_detectors(
        Arc::new(ErrorCatalog::builtin().clone()),
        Arc::new(MetadataTable::builtin().clone()),
    );
    for name in analyzer.detector_names() {
        println!("{}", name);
    }
    Ok(EXIT_SUCCESS)
}
