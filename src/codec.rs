//! Metric batch input and output
//!
//! Input is JSON: either an array of metrics or one metric object per line.
//! Output is JSON, YAML or Influx line protocol.
//!
//! # Line protocol
//!
//! ```text
//! <measurement>[,<tag_key>=<tag_value>...] <field_key>=<field_value>[,...] [<timestamp>]
//! ```

use std::borrow::Cow;

use crate::cli::OutputFormat;
use crate::error::CodecError;
use crate::metric::{FieldValue, Metric};

/// Parse a batch of metrics from JSON
///
/// Blank lines are ignored in the one-object-per-line form.
pub fn parse_batch(input: &str) -> Result<Vec<Metric>, CodecError> {
    let trimmed = input.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| CodecError::Json {
            line: e.line(),
            source: e,
        });
    }

    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<Metric>(line).map_err(|e| CodecError::Json {
                line: index + 1,
                source: e,
            })
        })
        .collect()
}

/// Encode a batch in the requested format
///
/// NaN and infinite floats are left out of every format, so JSON output
/// always parses back with `parse_batch`.
pub fn encode_batch(metrics: &[Metric], format: OutputFormat) -> Result<String, CodecError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&*finite_fields(metrics))
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| CodecError::Encode(e.to_string())),
        OutputFormat::Yaml => serde_yaml::to_string(&*finite_fields(metrics))
            .map_err(|e| CodecError::Encode(e.to_string())),
        OutputFormat::Line => Ok(LineProtocolFormatter::new().format(metrics)),
    }
}

fn is_non_finite(value: &FieldValue) -> bool {
    matches!(value, FieldValue::Float(f) if !f.is_finite())
}

/// Batch with NaN and infinite float fields removed
///
/// Borrows the input unchanged when there is nothing to drop.
fn finite_fields(metrics: &[Metric]) -> Cow<'_, [Metric]> {
    let clean = metrics
        .iter()
        .all(|m| !m.fields().iter().any(|(_, v)| is_non_finite(v)));
    if clean {
        return Cow::Borrowed(metrics);
    }

    Cow::Owned(
        metrics
            .iter()
            .cloned()
            .map(|mut metric| {
                let dropped: Vec<String> = metric
                    .fields()
                    .iter()
                    .filter(|(_, v)| is_non_finite(v))
                    .map(|(k, _)| k.clone())
                    .collect();
                for key in dropped {
                    tracing::warn!(
                        metric = %metric.name,
                        field = %key,
                        "Dropping non-finite field from output"
                    );
                    metric.remove_field(&key);
                }
                metric
            })
            .collect(),
    )
}

/// Influx line protocol formatter
#[derive(Debug, Clone, Default)]
pub struct LineProtocolFormatter;

impl LineProtocolFormatter {
    /// Create a new formatter
    pub fn new() -> Self {
        Self
    }

    /// Format metrics, one line each
    ///
    /// Metrics with no representable fields are skipped: line protocol has no
    /// encoding for NaN or infinite floats.
    pub fn format(&self, metrics: &[Metric]) -> String {
        let mut output = String::with_capacity(metrics.len() * 64);
        for metric in metrics {
            if let Some(line) = self.format_metric_line(metric) {
                output.push_str(&line);
                output.push('\n');
            }
        }
        output
    }

    /// Format a single metric line
    fn format_metric_line(&self, metric: &Metric) -> Option<String> {
        let fields: Vec<String> = metric
            .fields()
            .iter()
            .filter_map(|(k, v)| {
                Self::format_value(v).map(|v| format!("{}={}", Self::escape_key(k), v))
            })
            .collect();

        if fields.is_empty() {
            tracing::debug!(metric = %metric.name, "Skipping metric without encodable fields");
            return None;
        }

        let mut line = Self::escape_measurement(&metric.name);

        // BTreeMap iteration keeps tags sorted
        for (k, v) in metric.tags() {
            line.push(',');
            line.push_str(&Self::escape_key(k));
            line.push('=');
            line.push_str(&Self::escape_key(v));
        }

        line.push(' ');
        line.push_str(&fields.join(","));

        if let Some(ts) = metric.timestamp {
            line.push(' ');
            line.push_str(&ts.to_string());
        }

        Some(line)
    }

    /// Format a field value
    ///
    /// - Int → `12i`, Uint → `12u`
    /// - Float → shortest round-trip form, `None` for NaN/Inf
    /// - String → quoted with `"` and `\` escaped
    fn format_value(value: &FieldValue) -> Option<String> {
        match value {
            FieldValue::Int(i) => Some(format!("{}i", i)),
            FieldValue::Uint(u) => Some(format!("{}u", u)),
            FieldValue::Float(f) if f.is_finite() => Some(format!("{}", f)),
            FieldValue::Float(_) => None,
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::String(s) => Some(format!("\"{}\"", Self::escape_string(s))),
        }
    }

    /// Escape measurement name: commas and spaces
    fn escape_measurement(name: &str) -> String {
        let mut escaped = String::with_capacity(name.len());
        for c in name.chars() {
            match c {
                ',' | ' ' => {
                    escaped.push('\\');
                    escaped.push(c);
                }
                '\n' => escaped.push_str("\\n"),
                _ => escaped.push(c),
            }
        }
        escaped
    }

    /// Escape tag keys, tag values and field keys: commas, equals and spaces
    fn escape_key(key: &str) -> String {
        let mut escaped = String::with_capacity(key.len());
        for c in key.chars() {
            match c {
                ',' | '=' | ' ' => {
                    escaped.push('\\');
                    escaped.push(c);
                }
                '\n' => escaped.push_str("\\n"),
                _ => escaped.push(c),
            }
        }
        escaped
    }

    /// Escape string field values: backslash and double quote
    fn escape_string(value: &str) -> String {
        value.replace('\\', "\\\\").replace('"', "\\\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array() {
        let json = r#"[
            {"name": "a", "fields": {"x": 1}},
            {"name": "b", "fields": {"y": 2.5}, "tags": {"host": "h"}}
        ]"#;
        let metrics = parse_batch(json).unwrap();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[1].get_tag("host"), Some("h"));
    }

    #[test]
    fn test_parse_json_lines() {
        let input = "{\"name\": \"a\", \"fields\": {\"x\": 1}}\n\n{\"name\": \"b\"}\n";
        let metrics = parse_batch(input).unwrap();
        assert_eq!(metrics.len(), 2);
        assert!(metrics[1].fields().is_empty());
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_batch("").unwrap().is_empty());
        assert!(parse_batch("  \n ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_error_reports_line() {
        let input = "{\"name\": \"a\"}\n{not json}\n";
        match parse_batch(input) {
            Err(CodecError::Json { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected Json error, got {other:?}"),
        }
    }

    #[test]
    fn test_line_protocol_basic() {
        let m = Metric::new("cpu")
            .with_tag("host", "a")
            .with_field("usage", 0.5)
            .with_field("count", 3i64)
            .with_field("big", 7u64)
            .with_field("up", true)
            .with_field("state", "ok")
            .with_timestamp(1_700_000_000);
        let output = LineProtocolFormatter::new().format(&[m]);
        assert_eq!(
            output,
            "cpu,host=a usage=0.5,count=3i,big=7u,up=true,state=\"ok\" 1700000000\n"
        );
    }

    #[test]
    fn test_line_protocol_escaping() {
        let m = Metric::new("my metric,x")
            .with_tag("tag key", "a=b")
            .with_field("f,1", "say \"hi\"");
        let output = LineProtocolFormatter::new().format(&[m]);
        assert_eq!(
            output,
            "my\\ metric\\,x,tag\\ key=a\\=b f\\,1=\"say \\\"hi\\\"\"\n"
        );
    }

    #[test]
    fn test_line_protocol_skips_non_finite() {
        let m = Metric::new("m").with_field("nan", f64::NAN);
        assert_eq!(LineProtocolFormatter::new().format(&[m]), "");

        let m = Metric::new("m")
            .with_field("inf", f64::INFINITY)
            .with_field("ok", 1.0);
        assert_eq!(LineProtocolFormatter::new().format(&[m]), "m ok=1\n");
    }

    #[test]
    fn test_line_protocol_without_timestamp() {
        let m = Metric::new("m").with_field("v", 1i64);
        assert_eq!(LineProtocolFormatter::new().format(&[m]), "m v=1i\n");
    }

    #[test]
    fn test_encode_json_drops_non_finite() {
        let metrics = vec![Metric::new("m")
            .with_field("inf", f64::INFINITY)
            .with_field("nan", f64::NAN)
            .with_field("ok", 2.5)];
        let json = encode_batch(&metrics, OutputFormat::Json).unwrap();
        assert!(!json.contains("null"));

        let parsed = parse_batch(&json).unwrap();
        assert_eq!(parsed[0].field_keys(), vec!["ok"]);
        // the caller's batch is not modified
        assert_eq!(metrics[0].fields().len(), 3);
    }

    #[test]
    fn test_encode_yaml_drops_non_finite() {
        let metrics = vec![Metric::new("m")
            .with_field("v", f64::NEG_INFINITY)
            .with_field("w", 1i64)];
        let yaml = encode_batch(&metrics, OutputFormat::Yaml).unwrap();
        assert!(!yaml.contains("inf"));
        assert!(yaml.contains("w: 1"));
    }

    #[test]
    fn test_encode_json_round_trip() {
        let metrics = vec![Metric::new("m").with_field("v", 1.5).with_tag("t", "x")];
        let json = encode_batch(&metrics, OutputFormat::Json).unwrap();
        assert_eq!(parse_batch(&json).unwrap(), metrics);
    }

    #[test]
    fn test_encode_yaml() {
        let metrics = vec![Metric::new("m").with_field("v", 2i64)];
        let yaml = encode_batch(&metrics, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("name: m"));
        assert!(yaml.contains("v: 2"));
    }
}
