//! Detection of common mistakes in discord.js bot code.

mod analyzer;
mod best_practices;
mod builders;
mod intents;
mod known_errors;
pub mod lines;
mod traits;
mod types;

pub use analyzer::{analyze_code, dedup, Analyzer, DEFAULT_DETECTORS};
pub use best_practices::BestPracticesDetector;
pub use builders::BuildersDetector;
pub use intents::IntentsDetector;
pub use known_errors::{details_for, KnownErrorsDetector};
pub use traits::{Detector, FnDetector};
pub use types::{AnalysisResult, Diagnostic, DiagnosticKind, Severity};
