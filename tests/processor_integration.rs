//! Processor integration tests
//!
//! Exercises the public API end to end: config parsing, chain building and
//! batch conversion.

use metric_units::config::{Config, UnitsConfig};
use metric_units::error::ConfigError;
use metric_units::metric::{FieldValue, Metric};
use metric_units::processor::{ProcessorChain, UnitConverter};
use metric_units::units::UnitTable;

fn float_field(metric: &Metric, key: &str) -> f64 {
    match metric.get_field(key) {
        Some(FieldValue::Float(f)) => *f,
        other => panic!("expected float field {key}, got {other:?}"),
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_temperature_rename() {
    let converter = UnitConverter::new(
        &UnitsConfig::new("_in$", "Celsius", "Fahrenheit").with_replacement("_out"),
    )
    .unwrap();

    let metrics = converter.apply(vec![
        Metric::new("sensor").with_field("temp_in", 0i64),
        Metric::new("sensor").with_field("temp_in", 100u64),
    ]);

    assert_eq!(metrics[0].field_keys(), vec!["temp_out"]);
    assert_close(float_field(&metrics[0], "temp_out"), 32.0);
    assert_close(float_field(&metrics[1], "temp_out"), 212.0);
}

#[test]
fn test_meter_to_kilometer_with_suffix() {
    let converter = UnitConverter::new(
        &UnitsConfig::new("distance", "Meter", "Kilometer").with_unit_suffix(true),
    )
    .unwrap();

    let metrics = converter.apply(vec![Metric::new("run").with_field("distance", 1000i64)]);
    let keys = metrics[0].field_keys();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].ends_with("_kilometer"));
    assert_close(float_field(&metrics[0], &keys[0]), 1.0);
}

#[test]
fn test_counter_suffix_is_idempotent() {
    let converter = UnitConverter::new(
        &UnitsConfig::new("^requests", "second", "second").with_counter(true),
    )
    .unwrap();

    let mut metrics = vec![Metric::new("http").with_field("requests", 10i64)];
    converter.apply_in_place(&mut metrics);
    converter.apply_in_place(&mut metrics);

    assert_eq!(metrics[0].field_keys(), vec!["requests_total"]);
    assert_close(float_field(&metrics[0], "requests_total"), 10.0);
}

#[test]
fn test_string_values() {
    let converter = UnitConverter::new(&UnitsConfig::new("^v", "byte", "byte")).unwrap();

    let metrics = converter.apply(vec![Metric::new("dev")
        .with_field("v_hex", "0xFF")
        .with_field("v_text", "n/a")
        .with_field("v_dec", "12.5")]);

    assert_close(float_field(&metrics[0], "v_hex"), 255.0);
    assert_close(float_field(&metrics[0], "v_dec"), 12.5);
    assert_eq!(metrics[0].get_field("v_text"), Some(&FieldValue::from("n/a")));
}

#[test]
fn test_unknown_units_fail_init() {
    assert!(matches!(
        UnitConverter::new(&UnitsConfig::new("x", "smoot", "meter")),
        Err(ConfigError::UnknownUnit(_))
    ));
    assert!(matches!(
        UnitConverter::new(&UnitsConfig::new("x", "meter", "smoot")),
        Err(ConfigError::UnknownDestinationUnit(_))
    ));
}

#[test]
fn test_linear_round_trip_through_converters() {
    let pairs = [
        ("byte", "gibibyte"),
        ("millisecond", "hour"),
        ("psi", "kilopascal"),
        ("mile per hour", "knot"),
        ("acre", "hectare"),
    ];

    for (a, b) in pairs {
        let forward = UnitConverter::new(&UnitsConfig::new("^v$", a, b)).unwrap();
        let backward = UnitConverter::new(&UnitsConfig::new("^v$", b, a)).unwrap();

        let metrics = backward.apply(forward.apply(vec![Metric::new("m").with_field("v", 1234.5)]));
        assert_close(float_field(&metrics[0], "v"), 1234.5);
    }
}

#[test]
fn test_every_linear_pair_round_trips() {
    let table = UnitTable::global();
    for a in table.iter().filter(|u| !u.is_temperature()) {
        for b in table.iter().filter(|u| u.quantity == a.quantity) {
            let there = a.convert(42.0, b).unwrap();
            let back = b.convert(there, a).unwrap();
            assert!((back - 42.0).abs() < 1e-9, "{} <-> {}", a.name, b.name);
        }
    }
}

#[test]
fn test_chain_from_yaml() {
    let yaml = r#"
processors:
  - pattern: "_bytes$"
    unit: byte
    dest_unit: MB
    replacement: "_megabytes"
  - pattern: "^uptime$"
    from: second
    to: hour
    unit_suffix: true
    tags:
      normalized: "yes"
"#;
    let config = Config::from_yaml(yaml).unwrap();
    let chain = ProcessorChain::from_configs(&config.processors).unwrap();

    let metrics = chain.apply(vec![Metric::new("host")
        .with_field("mem_bytes", 5_000_000i64)
        .with_field("uptime", 7200i64)
        .with_field("load", 0.5)]);

    let m = &metrics[0];
    assert_close(float_field(m, "mem_megabytes"), 5.0);
    assert_close(float_field(m, "uptime_hour"), 2.0);
    assert_eq!(m.get_field("load"), Some(&FieldValue::Float(0.5)));
    assert_eq!(m.get_tag("normalized"), Some("yes"));

    let stats = chain.stats();
    assert_eq!(stats.fields_converted, 2);
    assert_eq!(stats.failures(), 0);
}
