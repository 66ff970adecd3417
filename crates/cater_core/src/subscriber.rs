//! Provides [`TracingConfig`], which installs the global `tracing` subscriber
//! that renders the spans and events emitted while services run.
//!
//! # Example
//!
//! ```no_run
//! use cater_core::{TracingConfig, TracingFormat};
//! use tracing::Level;
//!
//! // Development: pretty output with span enter/exit
//! TracingConfig::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Pretty)
//!     .with_span_events(true)
//!     .init();
//! ```
//!
//! # Environment
//!
//! [`TracingConfig::from_env`] reads:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `CATER_LOG` | Filter directives, e.g. `cater_service=debug,info` |
//! | `CATER_LOG_FORMAT` | `pretty`, `compact` or `json` |

use core::fmt;
use core::str::FromStr;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Variable holding filter directives.
pub const FILTER_VAR: &str = "CATER_LOG";

/// Variable selecting the output format.
pub const FORMAT_VAR: &str = "CATER_LOG_FORMAT";

// ─────────────────────────────────────────────────────────────────────────────
// TracingError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while configuring or installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    /// The filter directives could not be parsed.
    #[error("invalid log filter '{filter}': {source}")]
    InvalidFilter {
        /// The rejected directives.
        filter: String,
        /// Parser error.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// The format name is not one of `pretty`, `compact` or `json`.
    #[error("unknown log format '{0}' (expected pretty, compact or json)")]
    UnknownFormat(String),

    /// A global subscriber is already installed.
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[source] TryInitError),
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

impl TracingFormat {
    /// Returns the lowercase name accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for TracingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TracingFormat {
    type Err = TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(TracingError::UnknownFormat(s.to_owned())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Subscriber configuration.
///
/// Without a filter, everything at `level` or above is shown. A filter
/// replaces the level entirely:
///
/// ```
/// use cater_core::TracingConfig;
///
/// TracingConfig::new()
///     .with_env_filter("cater_service=trace,warn")
/// # ;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Maximum log level.
    level: Level,
    /// Output format.
    format: TracingFormat,
    /// Filter directives (e.g., "`cater_service=debug,warn`").
    env_filter: Option<String>,
    /// Whether to include span events (enter/exit).
    span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from [`FILTER_VAR`] and [`FORMAT_VAR`].
    ///
    /// Unset or empty variables keep the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`TracingError::UnknownFormat`] if [`FORMAT_VAR`] names an
    /// unsupported format.
    pub fn from_env() -> Result<Self, TracingError> {
        Self::from_vars(
            std::env::var(FILTER_VAR).ok(),
            std::env::var(FORMAT_VAR).ok(),
        )
    }

    fn from_vars(filter: Option<String>, format: Option<String>) -> Result<Self, TracingError> {
        let mut config = Self::default();
        if let Some(filter) = filter.filter(|filter| !filter.trim().is_empty()) {
            config = config.with_env_filter(filter);
        }
        if let Some(format) = format.filter(|format| !format.trim().is_empty()) {
            config = config.with_format(format.parse()?);
        }
        Ok(config)
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets filter directives.
    ///
    /// Format: `target=level,target=level,...`
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// The configured maximum level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// The configured output format.
    #[must_use]
    pub fn format(&self) -> TracingFormat {
        self.format
    }

    fn filter(&self) -> Result<EnvFilter, TracingError> {
        match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).map_err(|source| TracingError::InvalidFilter {
                    filter: filter.clone(),
                    source,
                })
            }
            None => Ok(EnvFilter::new(self.level.as_str())),
        }
    }

    fn fmt_span(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        }
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`TracingError::InvalidFilter`] for unparsable directives and
    /// [`TracingError::AlreadyInstalled`] if a subscriber is already set.
    pub fn try_init(&self) -> Result<(), TracingError> {
        let env_filter = self.filter()?;
        let span_events = self.fmt_span();

        match self.format {
            TracingFormat::Pretty => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Compact => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_span_events(span_events),
                )
                .try_init(),
            TracingFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_span_events(span_events),
                )
                .try_init(),
        }
        .map_err(TracingError::AlreadyInstalled)?;

        tracing::debug!(
            level = %self.level,
            format = %self.format,
            filter = self.env_filter.as_deref(),
            "tracing initialized"
        );
        Ok(())
    }

    /// Installs the global subscriber, ignoring failures.
    ///
    /// An invalid filter falls back to the configured level; an already
    /// installed subscriber is left in place.
    pub fn init(&self) {
        match self.try_init() {
            Err(TracingError::InvalidFilter { filter, .. }) => {
                let fallback = Self {
                    env_filter: None,
                    ..self.clone()
                };
                fallback.try_init().ok();
                tracing::warn!(filter = %filter, "ignoring invalid log filter");
            }
            Ok(()) | Err(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_format_default_is_pretty() {
        assert_eq!(TracingFormat::default(), TracingFormat::Pretty);
    }

    #[test]
    fn tracing_format_parses_names() {
        assert_eq!("json".parse::<TracingFormat>().unwrap(), TracingFormat::Json);
        assert_eq!(" Compact ".parse::<TracingFormat>().unwrap(), TracingFormat::Compact);
        assert!(matches!(
            "xml".parse::<TracingFormat>(),
            Err(TracingError::UnknownFormat(name)) if name == "xml"
        ));
    }

    #[test]
    fn tracing_config_default_level_is_info() {
        let config = TracingConfig::default();
        assert_eq!(config.level(), Level::INFO);
        assert_eq!(config.format(), TracingFormat::Pretty);
        assert!(!config.span_events);
    }

    #[test]
    fn tracing_config_builders() {
        let config = TracingConfig::new()
            .with_level(Level::DEBUG)
            .with_format(TracingFormat::Json)
            .with_env_filter("cater_service=trace")
            .with_span_events(true);

        assert_eq!(config.level(), Level::DEBUG);
        assert_eq!(config.format(), TracingFormat::Json);
        assert_eq!(config.env_filter.as_deref(), Some("cater_service=trace"));
        assert_eq!(config.fmt_span(), FmtSpan::ENTER | FmtSpan::EXIT);
    }

    #[test]
    fn tracing_config_from_vars() {
        let config =
            TracingConfig::from_vars(Some("debug".into()), Some("compact".into())).unwrap();
        assert_eq!(config.env_filter.as_deref(), Some("debug"));
        assert_eq!(config.format(), TracingFormat::Compact);

        let blank = TracingConfig::from_vars(Some("  ".into()), None).unwrap();
        assert_eq!(blank, TracingConfig::default());

        assert!(TracingConfig::from_vars(None, Some("yaml".into())).is_err());
    }

    #[test]
    fn invalid_filter_is_reported() {
        let config = TracingConfig::new().with_env_filter("cater_service=loud");
        assert!(matches!(
            config.filter(),
            Err(TracingError::InvalidFilter { filter, .. }) if filter == "cater_service=loud"
        ));
    }

    #[test]
    fn second_install_is_rejected() {
        let config = TracingConfig::new().with_format(TracingFormat::Compact);
        config.init();
        assert!(matches!(
            config.try_init(),
            Err(TracingError::AlreadyInstalled(_))
        ));
    }
}
