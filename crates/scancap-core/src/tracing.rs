//! Log output for hosts embedding the negotiation engine.
//!
//! Library code only emits `tracing` events. A host that wants them
//! printed calls [`init_tracing`] once at startup.
//!
//! ```ignore
//! use scancap_core::tracing::{init_tracing, TracingConfig};
//!
//! // every transport round trip, with file/line
//! init_tracing(TracingConfig::verbose().with_transport_calls(true))?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Target prefix shared by every scancap crate.
const TARGET_PREFIX: &str = "scancap";

/// Failure to install the log subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("invalid log filter directive: {0}")]
    BadDirective(#[from] tracing_subscriber::filter::ParseError),
}

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    Pretty,
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

/// Subscriber settings.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for scancap targets when neither `directive` nor `RUST_LOG`
    /// is set.
    pub level: Level,
    pub format: TracingOutputFormat,
    /// Print source file and line of each event.
    pub source_locations: bool,
    /// Emit span open/close events.
    pub span_events: bool,
    /// Raise the transport crate to TRACE so each device call is logged.
    pub transport_calls: bool,
    /// Full filter directive; replaces `level` and `RUST_LOG`.
    pub directive: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingOutputFormat::Compact,
            source_locations: false,
            span_events: false,
            transport_calls: false,
            directive: None,
        }
    }
}

impl TracingConfig {
    /// DEBUG level with source locations.
    #[must_use]
    pub fn verbose() -> Self {
        Self {
            level: Level::DEBUG,
            source_locations: true,
            ..Self::default()
        }
    }

    /// JSON lines with span events, for log collectors.
    #[must_use]
    pub fn structured() -> Self {
        Self {
            format: TracingOutputFormat::Json,
            source_locations: true,
            span_events: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_transport_calls(mut self, enabled: bool) -> Self {
        self.transport_calls = enabled;
        self
    }

    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    /// The directive used when no explicit one is configured.
    pub fn default_directive(&self) -> String {
        let mut directive = format!("{}={}", TARGET_PREFIX, self.level);
        if self.transport_calls {
            directive.push_str(",scancap_transport=trace");
        }
        directive
    }

    /// Resolves the filter: explicit directive first, then `RUST_LOG`, then
    /// [`default_directive`](Self::default_directive).
    pub fn build_filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref directive) = self.directive {
            return Ok(EnvFilter::try_new(directive)?);
        }
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => Ok(EnvFilter::try_new(self.default_directive())?),
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// Fails if a subscriber is already installed or the directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.build_filter()?;

    let spans = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let base = fmt::layer()
        .with_file(config.source_locations)
        .with_line_number(config.source_locations)
        .with_span_events(spans);
    let output = match config.format {
        TracingOutputFormat::Pretty => base.pretty().boxed(),
        TracingOutputFormat::Compact => base.compact().boxed(),
        TracingOutputFormat::Json => base.json().boxed(),
    };

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry().with(filter).with(output),
    )?;
    Ok(())
}
