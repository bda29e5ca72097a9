//! Unit conversion processor
//!
//! A `UnitConverter` rewrites every field whose name matches its pattern:
//! the value is converted from the source unit to the destination unit and
//! the field is renamed through the replacement template.
//!
//! # Example
//!
//! ```ignore
//! use metric_units::config::UnitsConfig;
//! use metric_units::metric::Metric;
//! use metric_units::processor::UnitConverter;
//!
//! let converter = UnitConverter::new(
//!     &UnitsConfig::new("_in$", "celsius", "fahrenheit").with_replacement("_out"),
//! )?;
//!
//! let metrics = converter.apply(vec![Metric::new("room").with_field("temp_in", 100.0)]);
//! assert_eq!(metrics[0].get_field("temp_out").and_then(|v| v.as_f64()), Some(212.0));
//! ```

use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::config::UnitsConfig;
use crate::error::ConfigError;
use crate::metric::Metric;
use crate::stats::{ProcessorStats, StatsSnapshot};
use crate::units::{to_float, Unit, UnitTable};

const DEFAULT_REPLACEMENT: &str = "${0}";
const COUNTER_SUFFIX: &str = "_total";

/// Field transform converting values between two units
#[derive(Debug)]
pub struct UnitConverter {
    pattern: Regex,
    replacement: String,
    from: &'static Unit,
    to: &'static Unit,
    unit_suffix: Option<String>,
    is_counter: bool,
    tags: HashMap<String, String>,
    stats: ProcessorStats,
}

impl UnitConverter {
    /// Build a converter from a config block
    ///
    /// # Errors
    ///
    /// - `UnknownUnit` / `UnknownDestinationUnit` if a unit is not in the table
    /// - `MissingPattern` if the pattern is empty
    /// - `InvalidPattern` if the pattern does not compile
    pub fn new(config: &UnitsConfig) -> Result<Self, ConfigError> {
        let table = UnitTable::global();

        let from = table
            .find(&config.from)
            .ok_or_else(|| ConfigError::UnknownUnit(config.from.clone()))?;
        let to = table
            .find(&config.to)
            .ok_or_else(|| ConfigError::UnknownDestinationUnit(config.to.clone()))?;

        let replacement = if config.replacement.is_empty() {
            DEFAULT_REPLACEMENT.to_string()
        } else {
            config.replacement.clone()
        };

        if config.pattern.is_empty() {
            return Err(ConfigError::MissingPattern);
        }

        let pattern = Regex::new(&config.pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: config.pattern.clone(),
            source: e,
        })?;

        if from.quantity != to.quantity {
            tracing::warn!(
                from = from.name,
                to = to.name,
                from_quantity = %from.quantity,
                to_quantity = %to.quantity,
                "Units measure different quantities, matching fields will not be converted"
            );
        }

        tracing::debug!(
            pattern = %pattern,
            from = from.name,
            to = to.name,
            temperature = from.is_temperature(),
            "Unit converter initialized"
        );

        Ok(Self {
            pattern,
            replacement,
            from,
            to,
            unit_suffix: config.unit_suffix.then(|| config.to.to_lowercase()),
            is_counter: config.is_counter,
            tags: config.tags.clone(),
            stats: ProcessorStats::new(),
        })
    }

    /// Compiled field-name pattern
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Effective replacement template
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Source unit
    pub fn from_unit(&self) -> &'static Unit {
        self.from
    }

    /// Destination unit
    pub fn to_unit(&self) -> &'static Unit {
        self.to
    }

    /// Suffix appended when unit suffixing is enabled
    pub fn unit_suffix(&self) -> Option<&str> {
        self.unit_suffix.as_deref()
    }

    /// Whether converted fields are marked as counters
    pub fn is_counter(&self) -> bool {
        self.is_counter
    }

    /// Static tags
    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    /// Live counters
    pub fn stats(&self) -> &ProcessorStats {
        &self.stats
    }

    /// Resolved settings, for display
    pub fn summary(&self) -> ConverterSummary {
        ConverterSummary {
            pattern: self.pattern.as_str().to_string(),
            replacement: self.replacement.clone(),
            from: self.from.name,
            to: self.to.name,
            quantity: self.from.quantity.as_str(),
            unit_suffix: self.unit_suffix.clone(),
            is_counter: self.is_counter,
            tags: self
                .tags
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Convert a batch and hand it back
    pub fn apply(&self, mut metrics: Vec<Metric>) -> Vec<Metric> {
        self.apply_in_place(&mut metrics);
        metrics
    }

    /// Convert a batch in place
    pub fn apply_in_place(&self, metrics: &mut [Metric]) {
        for metric in metrics.iter_mut() {
            self.process_metric(metric);
        }
    }

    /// Convert the matching fields of a single metric
    ///
    /// Fields are snapshotted first: every field is converted from its
    /// original value and a renamed field is never visited again within
    /// the same call.
    pub fn process_metric(&self, metric: &mut Metric) {
        self.stats.metrics_processed.inc();
        let mut matched = false;

        for (key, original) in metric.fields().to_vec() {
            if !self.pattern.is_match(&key) {
                continue;
            }
            matched = true;
            self.stats.fields_matched.inc();

            let value = match to_float(&original) {
                Ok(v) => v,
                Err(e) => {
                    self.stats.coercion_failures.inc();
                    tracing::error!(
                        metric = %metric.name,
                        field = %key,
                        value_type = original.type_name(),
                        error = %e,
                        "Cannot convert field to float"
                    );
                    continue;
                }
            };

            let converted = match self.from.convert(value, self.to) {
                Ok(v) => v,
                Err(e) => {
                    self.stats.conversion_failures.inc();
                    tracing::error!(
                        metric = %metric.name,
                        field = %key,
                        error = %e,
                        "Cannot convert unit"
                    );
                    continue;
                }
            };

            let new_name = self.field_name(&key);
            tracing::trace!(
                metric = %metric.name,
                field = %key,
                new_field = %new_name,
                value,
                converted,
                "Field converted"
            );

            metric.remove_field(&key);
            metric.add_field(new_name, converted);
            self.stats.fields_converted.inc();
        }

        if matched {
            for (key, value) in &self.tags {
                metric.add_tag(key.clone(), value.clone());
            }
        }
    }

    /// Output name for a matching field
    ///
    /// Applies the replacement template, then the unit suffix and the
    /// counter suffix unless the name already ends with them.
    pub fn field_name(&self, key: &str) -> String {
        let mut name = self
            .pattern
            .replace_all(key, self.replacement.as_str())
            .into_owned();

        if let Some(suffix) = &self.unit_suffix {
            if !name.ends_with(suffix.as_str()) {
                name.push('_');
                name.push_str(suffix);
            }
        }

        if self.is_counter && !name.ends_with(COUNTER_SUFFIX) {
            name.push_str(COUNTER_SUFFIX);
        }

        name
    }
}

/// Resolved converter settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConverterSummary {
    pub pattern: String,
    pub replacement: String,
    pub from: &'static str,
    pub to: &'static str,
    pub quantity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_suffix: Option<String>,
    pub is_counter: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl std::fmt::Display for ConverterSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "/{}/ -> {:?}: {} -> {} ({})",
            self.pattern, self.replacement, self.from, self.to, self.quantity
        )?;
        if let Some(suffix) = &self.unit_suffix {
            write!(f, ", suffix _{}", suffix)?;
        }
        if self.is_counter {
            write!(f, ", counter")?;
        }
        for (k, v) in &self.tags {
            write!(f, ", tag {}={}", k, v)?;
        }
        Ok(())
    }
}

/// Ordered list of converters built from a config file
#[derive(Debug, Default)]
pub struct ProcessorChain {
    converters: Vec<UnitConverter>,
}

impl ProcessorChain {
    /// Build one converter per config block
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ProcessorFailed` naming the first block that
    /// did not build.
    pub fn from_configs(configs: &[UnitsConfig]) -> Result<Self, ConfigError> {
        let converters = configs
            .iter()
            .enumerate()
            .map(|(index, config)| {
                UnitConverter::new(config).map_err(|e| ConfigError::ProcessorFailed {
                    index,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(processors = converters.len(), "Processor chain built");
        Ok(Self { converters })
    }

    /// Run every converter over the batch, in order
    pub fn apply(&self, mut metrics: Vec<Metric>) -> Vec<Metric> {
        for converter in &self.converters {
            converter.apply_in_place(&mut metrics);
        }
        metrics
    }

    /// Converters in application order
    pub fn converters(&self) -> &[UnitConverter] {
        &self.converters
    }

    /// Number of converters
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Resolved settings of every converter
    pub fn summaries(&self) -> Vec<ConverterSummary> {
        self.converters.iter().map(UnitConverter::summary).collect()
    }

    /// Counters summed over all converters
    pub fn stats(&self) -> StatsSnapshot {
        self.converters
            .iter()
            .map(|c| c.stats().snapshot())
            .fold(StatsSnapshot::default(), |acc, s| acc + s)
    }
}
