//! Logging configuration and initialization.
//!
//! All diagnostics go through `tracing`; this module installs the global
//! subscriber once, at startup. Output is stdout, as text or JSON lines.
//!
//! Environment variables:
//! - `LOG_LEVEL`: trace, debug, info, warn, error (default `info`)
//! - `LOG_FORMAT`: text, json (default `text`)
//! - `LOG_FILTER`: extra directives, e.g. `hyper=warn,reqwest=debug`
//!
//! `RUST_LOG` is honoured as well and combined with the above.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt as layer_fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Minimum level that is emitted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            Self::Trace => Level::TRACE,
            Self::Debug => Level::DEBUG,
            Self::Info  => Level::INFO,
            Self::Warn  => Level::WARN,
            Self::Error => Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace"            => Ok(Self::Trace),
            "debug"            => Ok(Self::Debug),
            "info"             => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error"            => Ok(Self::Error),
            _                  => Err(anyhow!("Invalid log level: {s}")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info  => "info",
            Self::Warn  => "warn",
            Self::Error => "error",
        })
    }
}

/// Line format.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// Human-readable text
    #[default]
    Text,
    /// One JSON object per line, for log shippers
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json"            => Ok(Self::Json),
            _                 => Err(anyhow!("Invalid log format: {s}")),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Additional filter directives, comma-separated.
    pub filter_directives: Option<String>,
}

impl LogConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(level) = lookup("LOG_LEVEL") {
            config.level = level.parse()?;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.format = format.parse()?;
        }
        config.filter_directives = lookup("LOG_FILTER").filter(|f| !f.trim().is_empty());
        Ok(config)
    }
}

/// Installs the global subscriber. Call once, before anything logs.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut filter = EnvFilter::from_default_env().add_directive(config.level.to_tracing_level().into());
    if let Some(directives) = &config.filter_directives {
        for directive in directives.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            filter = filter.add_directive(
                directive
                    .parse::<Directive>()
                    .with_context(|| format!("Failed to parse filter directive `{directive}`"))?,
            );
        }
    }

    let layer = layer_fmt::layer().with_writer(std::io::stdout).with_target(true);
    match config.format {
        LogFormat::Text => tracing_subscriber::registry().with(filter).with(layer).try_init()?,
        LogFormat::Json => tracing_subscriber::registry().with(filter).with(layer.json()).try_init()?,
    }

    Ok(())
}
