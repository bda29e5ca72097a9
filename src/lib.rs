//! metric-units library
//!
//! This crate provides a metric processor that converts field values from one
//! measurement unit to another, renaming the converted fields on the way.

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod metric;
pub mod processor;
pub mod stats;
pub mod units;

use anyhow::Result;
use cli::OutputFormat;
use error::AppResult;
use processor::ProcessorChain;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging subsystem
///
/// Logs go to stderr so stdout only carries the metric batch.
///
/// # Arguments
/// * `level` - Log level string (trace, debug, info, warn, error)
/// * `json` - Emit one JSON object per event instead of plain text
///
/// # Errors
/// Returns an error if the logging system fails to initialize
pub fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Decode a JSON batch, run it through the chain and encode the result
///
/// # Errors
/// Returns `AppError::Codec` if the input is not valid metric JSON or the
/// output cannot be encoded. Per-field conversion failures are logged, not
/// returned.
pub fn process_batch(chain: &ProcessorChain, input: &str, format: OutputFormat) -> AppResult<String> {
    let metrics = codec::parse_batch(input)?;
    tracing::debug!(metrics = metrics.len(), "Batch decoded");

    let metrics = chain.apply(metrics);
    Ok(codec::encode_batch(&metrics, format)?)
}
