//! Known error signatures.
//!
//! Pasted code often carries the error the author is fighting, either as a
//! code check (`error.code === 'InteractionAlreadyReplied'`) or as a stack
//! trace in a comment. Every catalog identifier found in the text becomes one
//! error diagnostic explaining the cause and the fix.

use std::sync::Arc;

use crate::catalog::{remediation_for, ErrorCatalog, ErrorCatalogEntry};

use super::lines::find_line_ignore_case;
use super::{Detector, Diagnostic, Severity};

const ERRORS_DOCS: &str = "https://discord.js.org/docs/packages/discord.js/main/DiscordjsErrorCodes:Enum";

/// Flags identifiers from the error catalog.
pub struct KnownErrorsDetector {
    catalog: Arc<ErrorCatalog>,
}

impl KnownErrorsDetector {
    pub const NAME: &'static str = "known-errors";

    pub fn new(catalog: Arc<ErrorCatalog>) -> Self {
        Self { catalog }
    }
}

/// Details for a catalog entry: curated text, then the library's own
/// message, then a pointer to the documentation.
pub fn details_for(entry: &ErrorCatalogEntry) -> String {
    if let Some(text) = remediation_for(&entry.code) {
        return text.to_string();
    }
    if !entry.message.trim().is_empty() {
        return format!(
            "discord.js reports `{}` as: \"{}\"\n\nFind where this error is raised and check the values passed at that point.",
            entry.code, entry.message
        );
    }
    format!(
        "`{}` is a known discord.js error. Check the documentation for its cause and fix.",
        entry.code
    )
}

impl Detector for KnownErrorsDetector {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn detect(&self, code: &str) -> anyhow::Result<Vec<Diagnostic>> {
        let diagnostics = self
            .catalog
            .find_identifiers_in(code)
            .into_iter()
            .map(|entry| {
                Diagnostic::error(format!("Known error: {}", entry.code))
                    .with_severity(Severity::High)
                    .at_line(find_line_ignore_case(code, &entry.code))
                    .with_details(details_for(entry))
                    .with_doc_link(ERRORS_DOCS)
            })
            .collect();
        Ok(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ErrorCatalogEntry;
    use crate::detect::DiagnosticKind;

    fn detector() -> KnownErrorsDetector {
        KnownErrorsDetector::new(Arc::new(ErrorCatalog::builtin().clone()))
    }

    #[test]
    fn test_curated_remediation() {
        let code = "if (err.code === 'InteractionAlreadyReplied') {\n  return;\n}";
        let diags = detector().detect(code).unwrap();

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::Error);
        assert_eq!(diags[0].message, "Known error: InteractionAlreadyReplied");
        assert_eq!(diags[0].line, Some(1));
        assert_eq!(
            diags[0].details.as_deref(),
            remediation_for("InteractionAlreadyReplied")
        );
    }

    #[test]
    fn test_fallback_to_catalog_message() {
        let entry = ErrorCatalogEntry::new("ButtonLabel", "A button label must be a string", "test");
        let details = details_for(&entry);
        assert!(details.contains("A button label must be a string"));
        assert!(details.contains("ButtonLabel"));
    }

    #[test]
    fn test_fallback_to_documentation() {
        let entry = ErrorCatalogEntry::new("SomethingOdd", "", "test");
        assert!(details_for(&entry).contains("Check the documentation"));
    }

    #[test]
    fn test_api_error_in_stack_trace() {
        let code = "// DiscordAPIError[50013]: Missing Permissions\nawait member.ban();";
        let diags = detector().detect(code).unwrap();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Known error: Missing Permissions");
        assert_eq!(diags[0].line, Some(1));
    }

    #[test]
    fn test_partial_identifier_does_not_match() {
        let code = "const TokenInvalidHandler = () => {};";
        assert!(detector().detect(code).unwrap().is_empty());
    }

    #[test]
    fn test_empty_catalog_is_silent() {
        let det = KnownErrorsDetector::new(Arc::new(ErrorCatalog::new()));
        assert!(det.detect("InteractionAlreadyReplied").unwrap().is_empty());
    }

    #[test]
    fn test_details_are_stable() {
        let a = detector().detect("InteractionAlreadyReplied").unwrap();
        let b = detector().detect("InteractionAlreadyReplied").unwrap();
        assert_eq!(a, b);
    }
}
