//! Driver configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

/// How log lines are formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// How the final result is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Behaviour of the demo collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
    /// Everything succeeds.
    #[default]
    Happy,
    /// The product has no stock.
    OutOfStock,
    /// The gateway rejects the card.
    InvalidCard,
    /// The gateway declines the charge.
    Declined,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!("unknown LOG_FORMAT '{other}'"))),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(AppError::Config(format!("unknown OUTPUT '{other}'"))),
        }
    }
}

impl FromStr for Scenario {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "happy" => Ok(Scenario::Happy),
            "out-of-stock" => Ok(Scenario::OutOfStock),
            "invalid-card" => Ok(Scenario::InvalidCard),
            "declined" => Ok(Scenario::Declined),
            other => Err(AppError::Config(format!("unknown SCENARIO '{other}'"))),
        }
    }
}

/// Driver configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT` — `pretty` or `json` (default: `pretty`)
/// - `ORDER_FILE` — path to a JSON order; the built-in demo order when unset
/// - `SCENARIO` — `happy`, `out-of-stock`, `invalid-card` or `declined` (default: `happy`)
/// - `OUTPUT` — `text` or `json` (default: `text`)
/// - `PRINT_METRICS` — print Prometheus metrics on exit (default: `false`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub log_level: String,
    pub log_format: LogFormat,
    pub order_file: Option<PathBuf>,
    pub scenario: Scenario,
    pub output: OutputFormat,
    pub print_metrics: bool,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: var("LOG_FORMAT")
                .map(|v| v.parse::<LogFormat>())
                .transpose()?
                .unwrap_or(defaults.log_format),
            order_file: var("ORDER_FILE").map(PathBuf::from),
            scenario: var("SCENARIO")
                .map(|v| v.parse::<Scenario>())
                .transpose()?
                .unwrap_or(defaults.scenario),
            output: var("OUTPUT")
                .map(|v| v.parse::<OutputFormat>())
                .transpose()?
                .unwrap_or(defaults.output),
            print_metrics: var("PRINT_METRICS")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.print_metrics),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            order_file: None,
            scenario: Scenario::Happy,
            output: OutputFormat::Text,
            print_metrics: false,
        }
    }
}
