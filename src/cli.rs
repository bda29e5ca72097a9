//! CLI argument parsing for metric-units
//!
//! This module provides the command-line interface using clap derive macros.
//!
//! # Options
//!
//! - `--config` / `-c`: Configuration file path (default: units.yaml, env: METRIC_UNITS_CONFIG)
//! - `--input` / `-i`: Metric batch to read (default: stdin, env: METRIC_UNITS_INPUT)
//! - `--output` / `-o`: Where to write the converted batch (default: stdout)
//! - `--validate`: Validate configuration without processing metrics
//! - `--dry-run`: Show the resolved processors
//! - `--log-level` / `-l`: Log level (trace/debug/info/warn/error, env: METRIC_UNITS_LOG_LEVEL)
//! - `--log-json`: Emit logs as JSON (env: METRIC_UNITS_LOG_JSON)
//! - `--output-format`: Output format (json/yaml/line)
//! - `--stats`: Print processor counters to stderr after the batch
//!
//! # Precedence
//!
//! The log level is resolved from the CLI argument, then the environment,
//! then `log_level` in the configuration file.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// metric-units - convert metric field values between measurement units
///
/// Reads a JSON batch of metrics, converts every field matching the
/// configured patterns and writes the batch back out.
#[derive(Parser, Debug)]
#[command(name = "metric-units")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "units.yaml",
        env = "METRIC_UNITS_CONFIG"
    )]
    pub config: PathBuf,

    /// Metric batch to read, JSON array or one object per line (default: stdin)
    #[arg(short, long, value_name = "FILE", env = "METRIC_UNITS_INPUT")]
    pub input: Option<PathBuf>,

    /// File to write the converted batch to (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Validate configuration without processing metrics
    #[arg(long)]
    pub validate: bool,

    /// Show the resolved processors without processing metrics
    #[arg(long)]
    pub dry_run: bool,

    /// Log level
    #[arg(short, long, value_enum, env = "METRIC_UNITS_LOG_LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Emit logs as JSON objects on stderr
    #[arg(long, env = "METRIC_UNITS_LOG_JSON")]
    pub log_json: bool,

    /// Output format for the converted batch and for --dry-run
    #[arg(long, value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Print processor counters to stderr after the batch
    #[arg(long)]
    pub stats: bool,
}

/// Log level options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level
    Debug,
    /// Info level
    Info,
    /// Warn level - default
    Warn,
    /// Error level - least verbose
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON array
    Json,
    /// YAML sequence
    Yaml,
    /// Influx line protocol
    Line,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Line => write!(f, "line"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogLevel::Debug.to_string(), "debug");
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(tracing::Level::from(LogLevel::Trace), tracing::Level::TRACE);
        assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
        assert_eq!(tracing::Level::from(LogLevel::Error), tracing::Level::ERROR);
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Yaml.to_string(), "yaml");
        assert_eq!(OutputFormat::Line.to_string(), "line");
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["metric-units"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("units.yaml"));
        assert_eq!(cli.input, None);
        assert_eq!(cli.output, None);
        assert!(!cli.validate);
        assert!(!cli.dry_run);
        assert!(!cli.stats);
        assert!(!cli.log_json);
        assert_eq!(cli.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_with_options() {
        let cli = Cli::parse_from([
            "metric-units",
            "-c",
            "custom.yaml",
            "-i",
            "batch.json",
            "--log-level",
            "debug",
            "--output-format",
            "line",
            "--stats",
        ]);
        assert_eq!(cli.config, PathBuf::from("custom.yaml"));
        assert_eq!(cli.input, Some(PathBuf::from("batch.json")));
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert_eq!(cli.output_format, OutputFormat::Line);
        assert!(cli.stats);
    }

    #[test]
    fn test_cli_validate_and_dry_run() {
        let cli = Cli::parse_from(["metric-units", "--validate"]);
        assert!(cli.validate);

        let cli = Cli::parse_from(["metric-units", "--dry-run", "--output-format", "yaml"]);
        assert!(cli.dry_run);
        assert_eq!(cli.output_format, OutputFormat::Yaml);
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["metric-units", "--output-format", "xml"]).is_err());
    }
}
