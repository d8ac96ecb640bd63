//! Analyzer that orchestrates all detectors.

use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::ErrorCatalog;
use crate::config::Config;
use crate::metadata::MetadataTable;

use super::{
    AnalysisResult, BestPracticesDetector, BuildersDetector, Detector, Diagnostic,
    IntentsDetector, KnownErrorsDetector,
};

/// Names of the detectors registered by [`Analyzer::with_default_detectors`].
pub const DEFAULT_DETECTORS: &[&str] = &[
    IntentsDetector::NAME,
    BuildersDetector::NAME,
    KnownErrorsDetector::NAME,
    BestPracticesDetector::NAME,
];

/// Runs registered detectors over source text and merges their findings.
///
/// Detectors run in registration order. Re-registering a name replaces the
/// detector in its original slot.
#[derive(Default)]
pub struct Analyzer {
    detectors: Vec<(String, Box<dyn Detector>)>,
    index: HashMap<String, usize>,
}

impl Analyzer {
    /// Create an analyzer with no detectors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with the standard rule set.
    pub fn with_default_detectors(catalog: Arc<ErrorCatalog>, metadata: Arc<MetadataTable>) -> Self {
        let mut analyzer = Self::new();
        analyzer.register(IntentsDetector::new(Arc::clone(&metadata)));
        analyzer.register(BuildersDetector::new(Arc::clone(&metadata)));
        analyzer.register(KnownErrorsDetector::new(catalog));
        analyzer.register(BestPracticesDetector::new(metadata));
        analyzer
    }

    /// Build the analyzer described by `config`.
    ///
    /// Returns `None` when the pipeline is disabled; no detector is
    /// constructed in that case.
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.is_enabled() {
            debug!("analyzer disabled");
            return None;
        }

        let mut catalog = ErrorCatalog::builtin().clone();
        if let Some(path) = &config.catalog_path {
            match ErrorCatalog::load(config.resolve_path(path)) {
                Ok(extra) => catalog.merge(extra.entries().cloned()),
                Err(e) => warn!(error = %e, "ignoring catalog artifact"),
            }
        }

        let metadata = match &config.metadata_path {
            Some(path) => MetadataTable::load_or_builtin(config.resolve_path(path)),
            None => MetadataTable::builtin().clone(),
        };

        let mut analyzer = Self::with_default_detectors(Arc::new(catalog), Arc::new(metadata));
        for name in &config.disabled_detectors {
            analyzer.unregister(name);
        }
        Some(analyzer)
    }

    /// Register a detector, replacing any detector with the same name.
    pub fn register<D: Detector + 'static>(&mut self, detector: D) {
        let name = detector.name().to_string();
        match self.index.get(&name) {
            Some(&idx) => self.detectors[idx] = (name, Box::new(detector)),
            None => {
                self.index.insert(name.clone(), self.detectors.len());
                self.detectors.push((name, Box::new(detector)));
            }
        }
    }

    /// Remove a detector by name. Returns whether one was removed.
    pub fn unregister(&mut self, name: &str) -> bool {
        let Some(idx) = self.index.remove(name) else {
            return false;
        };
        self.detectors.remove(idx);
        for slot in self.index.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        true
    }

    /// Registered detector names in execution order.
    pub fn detector_names(&self) -> Vec<&str> {
        self.detectors.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Run every detector against `code`.
    ///
    /// A detector that fails or panics is logged and contributes nothing;
    /// the remaining detectors are unaffected. The merged list is
    /// deduplicated on `(message, line)`, keeping the first occurrence.
    pub fn analyze(&self, code: &str) -> AnalysisResult {
        let mut collected = Vec::new();

        for (name, detector) in &self.detectors {
            match panic::catch_unwind(AssertUnwindSafe(|| detector.detect(code))) {
                Ok(Ok(diagnostics)) => collected.extend(diagnostics),
                Ok(Err(e)) => warn!(detector = %name, error = %e, "detector failed"),
                Err(payload) => {
                    warn!(detector = %name, error = %panic_message(&payload), "detector panicked")
                }
            }
        }

        AnalysisResult::new(dedup(collected))
    }
}

/// Analyze `code` with an optional analyzer.
///
/// `None` means the pipeline is disabled and always yields an empty list.
pub fn analyze_code(analyzer: Option<&Analyzer>, code: &str) -> Vec<Diagnostic> {
    match analyzer {
        Some(a) => a.analyze(code).diagnostics,
        None => Vec::new(),
    }
}

/// Order-preserving deduplication on [`Diagnostic::key`].
pub fn dedup(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut seen = HashSet::new();
    diagnostics
        .into_iter()
        .filter(|d| seen.insert(d.key()))
        .collect()
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{DiagnosticKind, FnDetector};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fixed(name: &str, messages: &'static [(&'static str, Option<usize>)]) -> impl Detector {
        FnDetector::new(name, move |_code: &str| -> anyhow::Result<Vec<Diagnostic>> {
            Ok(messages
                .iter()
                .map(|(m, line)| Diagnostic::warning(*m).at_line(*line))
                .collect())
        })
    }

    #[test]
    fn test_empty_analyzer_returns_nothing() {
        let analyzer = Analyzer::new();
        assert!(analyzer.analyze("new Client({})").diagnostics.is_empty());
    }

    #[test]
    fn test_registration_order_is_output_order() {
        let mut analyzer = Analyzer::new();
        analyzer.register(fixed("b", &[("from b", None)]));
        analyzer.register(fixed("a", &[("from a", None), ("also a", Some(2))]));

        let messages: Vec<_> = analyzer
            .analyze("")
            .diagnostics
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(messages, vec!["from b", "from a", "also a"]);
    }

    #[test]
    fn test_reregister_replaces_in_place() {
        let mut analyzer = Analyzer::new();
        analyzer.register(fixed("first", &[("old", None)]));
        analyzer.register(fixed("second", &[("second", None)]));
        analyzer.register(fixed("first", &[("new", None)]));

        assert_eq!(analyzer.detector_names(), vec!["first", "second"]);
        let messages: Vec<_> = analyzer
            .analyze("")
            .diagnostics
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(messages, vec!["new", "second"]);
    }

    #[test]
    fn test_unregister() {
        let mut analyzer = Analyzer::new();
        analyzer.register(fixed("a", &[("a", None)]));
        analyzer.register(fixed("b", &[("b", None)]));
        analyzer.register(fixed("c", &[("c", None)]));

        assert!(analyzer.unregister("a"));
        assert!(!analyzer.unregister("a"));
        assert_eq!(analyzer.detector_names(), vec!["b", "c"]);

        // Index stays consistent after removal.
        analyzer.register(fixed("c", &[("c2", None)]));
        assert_eq!(analyzer.detector_names(), vec!["b", "c"]);
        assert_eq!(analyzer.analyze("").diagnostics[1].message, "c2");
    }

    #[test]
    fn test_dedup_keeps_first_and_respects_line() {
        let mut analyzer = Analyzer::new();
        analyzer.register(fixed(
            "a",
            &[("same", Some(1)), ("same", Some(2)), ("whole", None)],
        ));
        analyzer.register(FnDetector::new("b", |_code: &str| -> anyhow::Result<Vec<Diagnostic>> {
            Ok(vec![
                Diagnostic::error("same").at_line(Some(1)),
                Diagnostic::error("whole").at_line(Some(0)),
            ])
        }));

        let result = analyzer.analyze("");
        assert_eq!(result.diagnostics.len(), 3);
        assert!(result
            .diagnostics
            .iter()
            .all(|d| d.kind == DiagnosticKind::Warning));
    }

    #[test]
    fn test_failing_detector_is_isolated() {
        let mut baseline = Analyzer::new();
        baseline.register(fixed("ok", &[("fine", Some(3))]));
        let expected = baseline.analyze("code").diagnostics;

        let mut analyzer = Analyzer::new();
        analyzer.register(FnDetector::new("broken", |_code: &str| -> anyhow::Result<Vec<Diagnostic>> {
            anyhow::bail!("rule exploded")
        }));
        analyzer.register(fixed("ok", &[("fine", Some(3))]));
        analyzer.register(FnDetector::new("panicky", |_code: &str| -> anyhow::Result<Vec<Diagnostic>> {
            panic!("rule panicked")
        }));

        assert_eq!(analyzer.analyze("code").diagnostics, expected);
    }

    #[test]
    fn test_analyze_code_disabled_runs_nothing() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let mut analyzer = Analyzer::new();
        analyzer.register(FnDetector::new("counting", |_code: &str| -> anyhow::Result<Vec<Diagnostic>> {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Diagnostic::info("called")])
        }));

        assert!(analyze_code(None, "new Client({})").is_empty());
        assert!(analyze_code(None, "").is_empty());
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);

        assert_eq!(analyze_code(Some(&analyzer), "x").len(), 1);
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_config_respects_flag_and_disabled_detectors() {
        let disabled = Config {
            enabled: Some(false),
            ..Default::default()
        };
        assert!(Analyzer::from_config(&disabled).is_none());

        let config = Config {
            enabled: Some(true),
            disabled_detectors: vec!["best-practices".to_string()],
            ..Default::default()
        };
        let analyzer = Analyzer::from_config(&config).unwrap();
        assert_eq!(
            analyzer.detector_names(),
            vec!["intents", "builders", "known-errors"]
        );
    }

    #[test]
    fn test_default_detector_names() {
        let analyzer = Analyzer::with_default_detectors(
            Arc::new(ErrorCatalog::builtin().clone()),
            Arc::new(MetadataTable::builtin().clone()),
        );
        assert_eq!(analyzer.detector_names(), DEFAULT_DETECTORS.to_vec());
    }
}
