//! Logging setup.
//!
//! Logs go to stderr so JSON reports on stdout stay parseable. The filter is
//! read from `BOTCHECK_LOG` using the usual `EnvFilter` syntax.

use anyhow::Result;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "BOTCHECK_LOG";

/// Filter used when `BOTCHECK_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "botcheck=debug"
    } else {
        "warn"
    }
}

/// Initialize the global subscriber.
pub fn init(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time(),
    );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "warn");
        assert_eq!(default_directive(true), "botcheck=debug");
        assert!(EnvFilter::try_new(default_directive(true)).is_ok());
    }
}
