//! Remote documentation lookup.
//!
//! A docs service accepts the concatenated diagnostic text and returns the
//! same keyed example map the local catalog produces:
//!
//! ```text
//! POST {endpoint}  {"text": "..."}
//! 200              {"modal-builder": {"title": ..., "codeSnippet": ..., ...}}
//! ```
//!
//! Any failure leaves the diagnostics as they were.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::{diagnostics_text, enrich, examples_for, DocExamples};
use crate::detect::Diagnostic;

/// Errors that can occur during a docs lookup.
#[derive(Error, Debug)]
pub enum DocsError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("docs service returned HTTP {0}")]
    Status(u16),
    #[error("invalid docs response: {0}")]
    Parse(String),
    #[error("invalid docs endpoint {0:?}")]
    Endpoint(String),
}

#[derive(Serialize)]
struct LookupRequest<'a> {
    text: &'a str,
}

/// Client for a remote docs service.
pub struct RemoteDocs {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl RemoteDocs {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, DocsError> {
        let endpoint = endpoint.into();
        if reqwest::Url::parse(&endpoint).is_err() {
            return Err(DocsError::Endpoint(endpoint));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("botcheck/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Look up examples for the given diagnostic text.
    pub async fn fetch(&self, text: &str) -> Result<DocExamples, DocsError> {
        let response = self
            .http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&LookupRequest { text })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DocsError::Timeout
                } else {
                    DocsError::Network(e)
                }
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(DocsError::Status(status));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| DocsError::Parse(e.to_string()))
    }
}

/// Where examples come from.
pub enum DocsSource {
    /// The built-in example catalog.
    Local,
    Remote(RemoteDocs),
}

impl DocsSource {
    pub async fn examples_for(&self, text: &str) -> Result<DocExamples, DocsError> {
        match self {
            DocsSource::Local => Ok(examples_for(text)),
            DocsSource::Remote(remote) => remote.fetch(text).await,
        }
    }

    /// Attach examples to diagnostics lacking one.
    ///
    /// Lookup errors are logged and reported as zero updates.
    pub async fn enrich(&self, diagnostics: &mut [Diagnostic]) -> usize {
        if diagnostics.is_empty() {
            return 0;
        }

        let text = diagnostics_text(diagnostics);
        match self.examples_for(&text).await {
            Ok(examples) => {
                let updated = enrich(diagnostics, &examples);
                debug!(examples = examples.len(), updated, "docs enrichment applied");
                updated
            }
            Err(e) => {
                warn!(error = %e, "docs lookup failed, diagnostics left unchanged");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_source() {
        let source = DocsSource::Local;
        let mut diags = vec![Diagnostic::warning("ModalBuilder is missing setTitle()")];
        assert_eq!(source.enrich(&mut diags).await, 1);
        assert!(diags[0].code_snippet.as_deref().unwrap().contains("showModal"));
    }

    #[tokio::test]
    async fn test_unreachable_service_leaves_diagnostics() {
        let remote = RemoteDocs::new("http://127.0.0.1:9/docs", Duration::from_millis(500)).unwrap();
        let source = DocsSource::Remote(remote);

        let mut diags = vec![
            Diagnostic::warning("ModalBuilder is missing setTitle()").at_line(Some(3)),
            Diagnostic::error("Known error: TokenInvalid"),
        ];
        let before = diags.clone();

        assert_eq!(source.enrich(&mut diags).await, 0);
        assert_eq!(diags, before);
    }

    #[tokio::test]
    async fn test_empty_input_skips_lookup() {
        let remote = RemoteDocs::new("http://127.0.0.1:9/docs", Duration::from_millis(500)).unwrap();
        let mut diags: Vec<Diagnostic> = Vec::new();
        assert_eq!(DocsSource::Remote(remote).enrich(&mut diags).await, 0);
    }

    #[test]
    fn test_rejects_unparseable_endpoint() {
        let err = RemoteDocs::new("http://", Duration::from_millis(500)).err().unwrap();
        assert!(matches!(err, DocsError::Endpoint(_)));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(DocsError::Status(503).to_string(), "docs service returned HTTP 503");
        assert_eq!(DocsError::Timeout.to_string(), "request timed out");
    }
}
