//! Error types for metric-units
//!
//! This module defines the error types used throughout the application.

use thiserror::Error;

/// Processor initialization errors
///
/// These are fatal: a converter that fails to build never processes metrics.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No regex pattern was configured
    #[error("A valid regex pattern must be passed")]
    MissingPattern,

    /// Regex pattern did not compile
    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Source unit is not in the unit table
    #[error("Cannot find the unit: {0:?}")]
    UnknownUnit(String),

    /// Destination unit is not in the unit table
    #[error("Cannot find the destination unit: {0:?}")]
    UnknownDestinationUnit(String),

    /// A processor block in a chain failed to build
    #[error("Failed to build processor at index {index}: {source}")]
    ProcessorFailed {
        index: usize,
        #[source]
        source: Box<ConfigError>,
    },
}

/// Field value could not be turned into a float
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    /// Value is not a decimal number
    #[error("Cannot parse {value:?} as a float")]
    InvalidNumber { value: String },

    /// Value looks hexadecimal but has invalid digits
    #[error("Cannot parse {value:?} as a hexadecimal integer")]
    InvalidHex { value: String },
}

/// Unit pair has no defined conversion
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Units measure different quantities
    #[error("Cannot convert {from} ({from_quantity}) to {to} ({to_quantity})")]
    IncompatibleUnits {
        from: &'static str,
        from_quantity: &'static str,
        to: &'static str,
        to_quantity: &'static str,
    },
}

/// Batch encoding/decoding errors
#[derive(Error, Debug)]
pub enum CodecError {
    /// Input is not valid metric JSON
    #[error("Invalid metric JSON at line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the output batch failed
    #[error("Failed to encode batch: {0}")]
    Encode(String),
}

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Processor initialization error
    #[error("Processor error: {0}")]
    Processor(#[from] ConfigError),

    /// Batch codec error
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;
