//! Units of measurement
//!
//! This module holds the unit registry and the coercion of field values to
//! floating point before conversion.

pub mod coerce;
pub mod table;

pub use coerce::{is_hexadecimal, parse_hexadecimal, to_float};
pub use table::{Quantity, TemperatureScale, Unit, UnitKind, UnitTable};
