//! Tracing setup for the manipulator
//!
//! Library code only emits `tracing` events and spans. A binary installs a
//! subscriber once through [`init_logging`]; everything is written to stderr
//! so reports on stdout can be piped.
//!
//! ```rust,no_run
//! use plantuml_manipulator::core::logging::init_logging;
//!
//! // warn level, compact lines, unless the environment says otherwise
//! init_logging(None, None).ok();
//!
//! init_logging(Some("plantuml_manipulator::batch=debug"), Some("json")).ok();
//! ```
//!
//! Formats are `compact` (one line per event), `pretty` (multi-line, with
//! source locations and span activity) and `json` (one object per event).
//!
//! When no explicit value is passed the level comes from `PUML_LOG_LEVEL`,
//! then `RUST_LOG`, and the format from `PUML_LOG_FORMAT`. Level strings are
//! `EnvFilter` directives, so per-module filters work:
//!
//! ```bash
//! RUST_LOG="plantuml_manipulator::parser=debug" plantuml-manipulator validate --pattern "*.puml"
//! RUST_LOG="info,plantuml_manipulator::manipulator=trace" plantuml-manipulator insert-after ...
//! ```

use std::str::FromStr;

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Environment variable consulted for the log level
pub const LOG_LEVEL_ENV: &str = "PUML_LOG_LEVEL";

/// Environment variable consulted for the log format
pub const LOG_FORMAT_ENV: &str = "PUML_LOG_FORMAT";

const DEFAULT_LEVEL: &str = "warn";

/// Output shape of log events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    /// Accepted names, in the order `--log-format` lists them
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Self::variants()
            .iter()
            .zip([LogFormat::Compact, LogFormat::Pretty, LogFormat::Json])
            .find(|(name, _)| **name == lowered)
            .map(|(_, format)| format)
            .ok_or_else(|| format!("Unknown log format: {}", s))
    }
}

/// First of the explicit value and the named environment variables that is set
fn resolve(explicit: Option<&str>, env_vars: &[&str]) -> Option<String> {
    explicit
        .map(str::to_owned)
        .or_else(|| env_vars.iter().find_map(|var| std::env::var(var).ok()))
}

/// Build the event filter, falling back to `warn` on a malformed directive
fn level_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Install the global subscriber
///
/// `level` is any `EnvFilter` directive (`trace`..`error`, `off`, or
/// per-target filters). `format` is one of [`LogFormat::variants`].
///
/// Fails on an unknown format or when a subscriber is already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let directive = resolve(level, &[LOG_LEVEL_ENV, "RUST_LOG"])
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
    let format = match resolve(format, &[LOG_FORMAT_ENV]) {
        Some(name) => {
            LogFormat::from_str(&name).map_err(|e| format!("Invalid log format: {}", e))?
        }
        None => LogFormat::default(),
    };

    let registry = Registry::default().with(level_filter(&directive));
    let layer = fmt::layer().with_writer(std::io::stderr);

    match format {
        LogFormat::Compact => registry
            .with(
                layer
                    .compact()
                    .with_target(false)
                    .with_span_events(FmtSpan::NONE),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(
                layer
                    .pretty()
                    .with_file(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::ACTIVE),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(
                layer
                    .json()
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()?,
    }

    Ok(())
}
