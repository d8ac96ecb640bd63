//! Core trait for detection rules.

use super::Diagnostic;

/// A named, stateless rule unit.
///
/// Each detector receives the full source text and returns zero or more
/// diagnostics. Implementations must not keep per-call state: the same
/// instance is shared across threads and requests.
///
/// Returning `Err` (or panicking) is isolated by the [`Analyzer`]: the
/// failure is logged and the detector contributes nothing for that call.
///
/// [`Analyzer`]: super::Analyzer
pub trait Detector: Send + Sync {
    /// Unique name within one analyzer.
    fn name(&self) -> &str;

    /// Scan `code` and return findings in the order they should be shown.
    fn detect(&self, code: &str) -> anyhow::Result<Vec<Diagnostic>>;
}

/// Adapter turning a closure into a [`Detector`].
pub struct FnDetector<F> {
    name: String,
    func: F,
}

impl<F> FnDetector<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<Diagnostic>> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Detector for FnDetector<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<Diagnostic>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, code: &str) -> anyhow::Result<Vec<Diagnostic>> {
        (self.func)(code)
    }
}
