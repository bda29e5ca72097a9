//! Unit registry
//!
//! The table is a static list of units grouped by quantity. Linear units carry
//! a factor relative to their quantity's base unit; temperature scales are
//! offset-based and go through Celsius instead.
//!
//! Lookup order:
//! 1. exact symbol (`"MB"` and `"Mb"` are different units)
//! 2. case-insensitive name, plural or alias

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::ConversionError;

/// Physical quantity a unit measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    Length,
    Mass,
    Time,
    Data,
    Temperature,
    Pressure,
    Energy,
    Power,
    Speed,
    Volume,
    Area,
    Frequency,
    Current,
    Voltage,
}

impl Quantity {
    /// Lowercase name of the quantity
    pub fn as_str(&self) -> &'static str {
        match self {
            Quantity::Length => "length",
            Quantity::Mass => "mass",
            Quantity::Time => "time",
            Quantity::Data => "data",
            Quantity::Temperature => "temperature",
            Quantity::Pressure => "pressure",
            Quantity::Energy => "energy",
            Quantity::Power => "power",
            Quantity::Speed => "speed",
            Quantity::Volume => "volume",
            Quantity::Area => "area",
            Quantity::Frequency => "frequency",
            Quantity::Current => "current",
            Quantity::Voltage => "voltage",
        }
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Temperature scales
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureScale {
    Celsius,
    Fahrenheit,
    Kelvin,
    Rankine,
}

impl TemperatureScale {
    /// Convert a reading on this scale to degrees Celsius
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            TemperatureScale::Celsius => value,
            TemperatureScale::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            TemperatureScale::Kelvin => value - 273.15,
            TemperatureScale::Rankine => (value - 491.67) * 5.0 / 9.0,
        }
    }

    /// Convert degrees Celsius to a reading on this scale
    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            TemperatureScale::Celsius => celsius,
            TemperatureScale::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
            TemperatureScale::Kelvin => celsius + 273.15,
            TemperatureScale::Rankine => (celsius + 273.15) * 9.0 / 5.0,
        }
    }
}

/// How a unit converts to its quantity's base unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitKind {
    /// `base = value * factor`
    Linear { factor: f64 },
    /// Offset scale, converted through Celsius
    Temperature(TemperatureScale),
}

/// A unit of measurement
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// Canonical lowercase name
    pub name: &'static str,
    /// Plural name
    pub plural: &'static str,
    /// Case-sensitive symbol
    pub symbol: &'static str,
    /// Additional case-insensitive names
    pub aliases: &'static [&'static str],
    /// Measured quantity
    pub quantity: Quantity,
    /// Conversion behaviour
    pub kind: UnitKind,
}

impl Unit {
    /// Whether this unit is a temperature scale
    pub fn is_temperature(&self) -> bool {
        matches!(self.kind, UnitKind::Temperature(_))
    }

    /// Convert `value` in this unit to `to`
    ///
    /// # Errors
    ///
    /// Returns `ConversionError::IncompatibleUnits` when the units measure
    /// different quantities.
    pub fn convert(&self, value: f64, to: &Unit) -> Result<f64, ConversionError> {
        if self.quantity != to.quantity {
            return Err(ConversionError::IncompatibleUnits {
                from: self.name,
                from_quantity: self.quantity.as_str(),
                to: to.name,
                to_quantity: to.quantity.as_str(),
            });
        }

        if self.name == to.name {
            return Ok(value);
        }

        match (self.kind, to.kind) {
            (UnitKind::Linear { factor: from }, UnitKind::Linear { factor: dest }) => {
                Ok(value * from / dest)
            }
            (UnitKind::Temperature(from), UnitKind::Temperature(dest)) => {
                Ok(dest.from_celsius(from.to_celsius(value)))
            }
            // Quantities match, so kinds match too: every temperature unit is
            // a `Temperature` kind and nothing else is.
            _ => Err(ConversionError::IncompatibleUnits {
                from: self.name,
                from_quantity: self.quantity.as_str(),
                to: to.name,
                to_quantity: to.quantity.as_str(),
            }),
        }
    }
}

const fn linear(
    name: &'static str,
    plural: &'static str,
    symbol: &'static str,
    aliases: &'static [&'static str],
    quantity: Quantity,
    factor: f64,
) -> Unit {
    Unit {
        name,
        plural,
        symbol,
        aliases,
        quantity,
        kind: UnitKind::Linear { factor },
    }
}

const fn temperature(
    name: &'static str,
    symbol: &'static str,
    aliases: &'static [&'static str],
    scale: TemperatureScale,
) -> Unit {
    Unit {
        name,
        plural: name,
        symbol,
        aliases,
        quantity: Quantity::Temperature,
        kind: UnitKind::Temperature(scale),
    }
}

use Quantity::*;

const KILO: f64 = 1e3;
const MEGA: f64 = 1e6;
const GIGA: f64 = 1e9;
const TERA: f64 = 1e12;
const PETA: f64 = 1e15;
const KIBI: f64 = 1024.0;
const MEBI: f64 = KIBI * 1024.0;
const GIBI: f64 = MEBI * 1024.0;
const TEBI: f64 = GIBI * 1024.0;

static UNITS: &[Unit] = &[
    // Length, base meter
    linear("meter", "meters", "m", &["metre", "metres"], Length, 1.0),
    linear("kilometer", "kilometers", "km", &["kilometre", "kilometres"], Length, KILO),
    linear("centimeter", "centimeters", "cm", &["centimetre", "centimetres"], Length, 1e-2),
    linear("millimeter", "millimeters", "mm", &["millimetre", "millimetres"], Length, 1e-3),
    linear("micrometer", "micrometers", "µm", &["um", "micron", "microns"], Length, 1e-6),
    linear("nanometer", "nanometers", "nm", &["nanometre", "nanometres"], Length, 1e-9),
    linear("inch", "inches", "in", &[], Length, 0.0254),
    linear("foot", "feet", "ft", &[], Length, 0.3048),
    linear("yard", "yards", "yd", &[], Length, 0.9144),
    linear("mile", "miles", "mi", &[], Length, 1609.344),
    linear("nautical mile", "nautical miles", "nmi", &["nautical_mile"], Length, 1852.0),
    // Mass, base kilogram
    linear("gram", "grams", "g", &["gramme"], Mass, 1e-3),
    linear("kilogram", "kilograms", "kg", &["kilo", "kilos"], Mass, 1.0),
    linear("milligram", "milligrams", "mg", &[], Mass, 1e-6),
    linear("microgram", "micrograms", "µg", &["ug"], Mass, 1e-9),
    linear("tonne", "tonnes", "t", &["metric ton", "metric tons"], Mass, KILO),
    linear("pound", "pounds", "lb", &["lbs"], Mass, 0.453_592_37),
    linear("ounce", "ounces", "oz", &[], Mass, 0.028_349_523_125),
    // Time, base second
    linear("nanosecond", "nanoseconds", "ns", &[], Time, 1e-9),
    linear("microsecond", "microseconds", "µs", &["us"], Time, 1e-6),
    linear("millisecond", "milliseconds", "ms", &[], Time, 1e-3),
    linear("second", "seconds", "s", &["sec", "secs"], Time, 1.0),
    linear("minute", "minutes", "min", &["mins"], Time, 60.0),
    linear("hour", "hours", "h", &["hr", "hrs"], Time, 3600.0),
    linear("day", "days", "d", &[], Time, 86_400.0),
    linear("week", "weeks", "wk", &[], Time, 604_800.0),
    // Data, base byte
    linear("bit", "bits", "b", &[], Data, 0.125),
    linear("byte", "bytes", "B", &[], Data, 1.0),
    linear("kilobit", "kilobits", "kb", &["kbit"], Data, KILO / 8.0),
    linear("megabit", "megabits", "Mb", &["mbit"], Data, MEGA / 8.0),
    linear("gigabit", "gigabits", "Gb", &["gbit"], Data, GIGA / 8.0),
    linear("kilobyte", "kilobytes", "kB", &[], Data, KILO),
    linear("megabyte", "megabytes", "MB", &[], Data, MEGA),
    linear("gigabyte", "gigabytes", "GB", &[], Data, GIGA),
    linear("terabyte", "terabytes", "TB", &[], Data, TERA),
    linear("petabyte", "petabytes", "PB", &[], Data, PETA),
    linear("kibibyte", "kibibytes", "KiB", &[], Data, KIBI),
    linear("mebibyte", "mebibytes", "MiB", &[], Data, MEBI),
    linear("gibibyte", "gibibytes", "GiB", &[], Data, GIBI),
    linear("tebibyte", "tebibytes", "TiB", &[], Data, TEBI),
    // Temperature
    temperature("celsius", "C", &["°C", "degc", "centigrade"], TemperatureScale::Celsius),
    temperature("fahrenheit", "F", &["°F", "degf"], TemperatureScale::Fahrenheit),
    temperature("kelvin", "K", &["kelvins"], TemperatureScale::Kelvin),
    temperature("rankine", "R", &["°R", "degr"], TemperatureScale::Rankine),
    // Pressure, base pascal
    linear("pascal", "pascals", "Pa", &[], Pressure, 1.0),
    linear("hectopascal", "hectopascals", "hPa", &[], Pressure, 100.0),
    linear("kilopascal", "kilopascals", "kPa", &[], Pressure, KILO),
    linear("megapascal", "megapascals", "MPa", &[], Pressure, MEGA),
    linear("bar", "bars", "bar", &[], Pressure, 100_000.0),
    linear("millibar", "millibars", "mbar", &[], Pressure, 100.0),
    linear("atmosphere", "atmospheres", "atm", &[], Pressure, 101_325.0),
    linear("psi", "psi", "psi", &["pound per square inch"], Pressure, 6_894.757_293_168),
    linear("torr", "torr", "Torr", &["mmhg"], Pressure, 133.322_368_421),
    // Energy, base joule
    linear("joule", "joules", "J", &[], Energy, 1.0),
    linear("kilojoule", "kilojoules", "kJ", &[], Energy, KILO),
    linear("megajoule", "megajoules", "MJ", &[], Energy, MEGA),
    linear("watt-hour", "watt-hours", "Wh", &["watthour", "watthours"], Energy, 3600.0),
    linear("kilowatt-hour", "kilowatt-hours", "kWh", &["kilowatthour", "kilowatthours"], Energy, 3.6e6),
    linear("calorie", "calories", "cal", &[], Energy, 4.184),
    linear("kilocalorie", "kilocalories", "kcal", &[], Energy, 4184.0),
    // Power, base watt
    linear("watt", "watts", "W", &[], Power, 1.0),
    linear("milliwatt", "milliwatts", "mW", &[], Power, 1e-3),
    linear("kilowatt", "kilowatts", "kW", &[], Power, KILO),
    linear("megawatt", "megawatts", "MW", &[], Power, MEGA),
    linear("horsepower", "horsepower", "hp", &[], Power, 745.699_871_582_270_2),
    // Speed, base meter per second
    linear("meter per second", "meters per second", "m/s", &["mps"], Speed, 1.0),
    linear("kilometer per hour", "kilometers per hour", "km/h", &["kph", "kmh"], Speed, 1.0 / 3.6),
    linear("mile per hour", "miles per hour", "mph", &[], Speed, 0.447_04),
    linear("knot", "knots", "kn", &["kt"], Speed, 1852.0 / 3600.0),
    // Volume, base cubic meter
    linear("cubic meter", "cubic meters", "m3", &["m³"], Volume, 1.0),
    linear("liter", "liters", "L", &["litre", "litres"], Volume, 1e-3),
    linear("milliliter", "milliliters", "mL", &["millilitre", "millilitres"], Volume, 1e-6),
    linear("gallon", "gallons", "gal", &[], Volume, 3.785_411_784e-3),
    // Area, base square meter
    linear("square meter", "square meters", "m2", &["m²"], Area, 1.0),
    linear("square kilometer", "square kilometers", "km2", &["km²"], Area, 1e6),
    linear("square foot", "square feet", "ft2", &["ft²"], Area, 0.092_903_04),
    linear("hectare", "hectares", "ha", &[], Area, 1e4),
    linear("acre", "acres", "ac", &[], Area, 4_046.856_422_4),
    // Frequency, base hertz
    linear("hertz", "hertz", "Hz", &[], Frequency, 1.0),
    linear("kilohertz", "kilohertz", "kHz", &[], Frequency, KILO),
    linear("megahertz", "megahertz", "MHz", &[], Frequency, MEGA),
    linear("gigahertz", "gigahertz", "GHz", &[], Frequency, GIGA),
    // Current, base ampere
    linear("ampere", "amperes", "A", &["amp", "amps"], Current, 1.0),
    linear("milliampere", "milliamperes", "mA", &["milliamp", "milliamps"], Current, 1e-3),
    // Voltage, base volt
    linear("volt", "volts", "V", &[], Voltage, 1.0),
    linear("millivolt", "millivolts", "mV", &[], Voltage, 1e-3),
    linear("kilovolt", "kilovolts", "kV", &[], Voltage, KILO),
];

static GLOBAL: Lazy<UnitTable> = Lazy::new(|| UnitTable::from_units(UNITS));

/// Immutable lookup structure over a set of units
#[derive(Debug)]
pub struct UnitTable {
    units: &'static [Unit],
    by_symbol: HashMap<&'static str, usize>,
    by_name: HashMap<String, usize>,
}

impl UnitTable {
    /// The process-wide unit table, built on first use
    pub fn global() -> &'static UnitTable {
        &GLOBAL
    }

    fn from_units(units: &'static [Unit]) -> Self {
        let mut by_symbol = HashMap::with_capacity(units.len());
        let mut by_name = HashMap::with_capacity(units.len() * 3);

        for (index, unit) in units.iter().enumerate() {
            by_symbol.entry(unit.symbol).or_insert(index);

            let names = [unit.name, unit.plural]
                .into_iter()
                .chain(unit.aliases.iter().copied());
            for name in names {
                by_name.entry(name.to_lowercase()).or_insert(index);
            }
        }

        Self {
            units,
            by_symbol,
            by_name,
        }
    }

    /// Find a unit by symbol, name, plural or alias
    pub fn find(&self, name: &str) -> Option<&'static Unit> {
        let units = self.units;
        self.by_symbol
            .get(name)
            .or_else(|| self.by_name.get(&name.trim().to_lowercase()))
            .map(|&index| &units[index])
    }

    /// Convert `value` between two named units
    ///
    /// Returns `None` if either unit is unknown.
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Option<Result<f64, ConversionError>> {
        let from = self.find(from)?;
        let to = self.find(to)?;
        Some(from.convert(value, to))
    }

    /// All units in table order
    pub fn iter(&self) -> impl Iterator<Item = &'static Unit> {
        self.units.iter()
    }

    /// Number of units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
