//! metric-units - convert metric field values between measurement units
//!
//! Reads a batch of metrics, runs the configured unit converters over it and
//! writes the converted batch.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{Read, Write};
use tracing::info;

use metric_units::cli::{Cli, OutputFormat};
use metric_units::config::Config;
use metric_units::processor::ProcessorChain;

const DEFAULT_LOG_LEVEL: &str = "warn";

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    let level = cli
        .log_level
        .map(|l| l.to_string())
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    metric_units::init_logging(&level, cli.log_json)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "Starting metric-units"
    );

    let chain = ProcessorChain::from_configs(&config.processors)?;

    if cli.validate {
        println!(
            "Configuration OK: {} processor(s) in {}",
            chain.len(),
            cli.config.display()
        );
        return Ok(());
    }

    if cli.dry_run {
        print_dry_run(&chain, cli.output_format)?;
        return Ok(());
    }

    let input = read_input(&cli)?;
    let output = metric_units::process_batch(&chain, &input, cli.output_format)?;
    write_output(&cli, &output)?;

    let stats = chain.stats();
    info!(
        metrics = stats.metrics_processed,
        converted = stats.fields_converted,
        failures = stats.failures(),
        "Batch processed"
    );
    if cli.stats {
        eprintln!("{}", serde_json::to_string(&stats)?);
    }

    Ok(())
}

fn print_dry_run(chain: &ProcessorChain, format: OutputFormat) -> Result<()> {
    let summaries = chain.summaries();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&summaries)?),
        OutputFormat::Line => {
            for (index, summary) in summaries.iter().enumerate() {
                println!("[{}] {}", index, summary);
            }
        }
    }
    Ok(())
}

fn read_input(cli: &Cli) -> Result<String> {
    match &cli.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(cli: &Cli, output: &str) -> Result<()> {
    match &cli.output {
        Some(path) => std::fs::write(path, output)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
