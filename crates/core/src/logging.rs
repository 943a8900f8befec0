//! Subscriber installation for EATGate processes.
//!
//! The output format and default filter come from the `[logging]` section of
//! the deployment configuration. `RUST_LOG`, when set and valid, takes
//! precedence over the configured directive. Authorization failures are
//! logged at `warn`, registry and emergency-mode changes at `info`, accepted
//! tokens and sub-call dispatch at `debug`.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{CoreError, Result};

/// Directive used when neither `RUST_LOG` nor the configuration sets one.
pub const DEFAULT_DIRECTIVE: &str = "info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines for local runs.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// Filter directive, e.g. `"eatgate_multicall=debug,info"`.
    #[serde(default)]
    pub directive: Option<String>,
}

impl LoggingConfig {
    /// Build the filter, preferring `RUST_LOG` over the configured directive.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        let directive = self.directive.as_deref().unwrap_or(DEFAULT_DIRECTIVE);
        EnvFilter::try_new(directive)
            .map_err(|e| CoreError::Logging(format!("invalid directive {directive:?}: {e}")))
    }
}

/// Install the global subscriber described by `config`.
///
/// Fails when the directive does not parse or when a global subscriber is
/// already installed in this process.
///
/// # Example
/// ```no_run
/// use eatgate_core::logging::{self, LogFormat, LoggingConfig};
///
/// let config = LoggingConfig { format: LogFormat::Json, directive: None };
/// logging::init(&config).expect("subscriber");
/// tracing::info!(chain_id = 1, "Gate started");
/// ```
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(true))
            .try_init(),
    };
    installed.map_err(|e| CoreError::Logging(e.to_string()))
}

/// Install a test-writer subscriber. A second call in the same process is a
/// no-op.
pub fn init_for_tests() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer())
        .try_init();
}
