//! Units of measure and their textual symbols.
//!
//! Every unit has two renderings: the conventional symbol, which may contain
//! non-ASCII characters such as `°C` or `µm`, and an ASCII symbol following
//! the UCUM case-sensitive convention (`Cel`, `um`, `Ohm`). Back-ends that
//! cannot take arbitrary UTF-8 in form fields receive the ASCII symbol.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown unit symbol: {0:?}")]
pub struct UnitParseError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    One,
    Percent,
    PartsPerMillion,
    Celsius,
    Fahrenheit,
    Kelvin,
    Pascal,
    Hectopascal,
    Bar,
    Metre,
    Millimetre,
    Micrometre,
    Nanometre,
    MetrePerSecond,
    Second,
    Hertz,
    Volt,
    Ampere,
    Milliampere,
    Ohm,
    Watt,
    Milliwatt,
    DecibelMilliwatt,
    Lux,
    Gram,
    Kilogram,
    Degree,
}

impl Unit {
    pub const ALL: [Unit; 27] = [
        Unit::One,
        Unit::Percent,
        Unit::PartsPerMillion,
        Unit::Celsius,
        Unit::Fahrenheit,
        Unit::Kelvin,
        Unit::Pascal,
        Unit::Hectopascal,
        Unit::Bar,
        Unit::Metre,
        Unit::Millimetre,
        Unit::Micrometre,
        Unit::Nanometre,
        Unit::MetrePerSecond,
        Unit::Second,
        Unit::Hertz,
        Unit::Volt,
        Unit::Ampere,
        Unit::Milliampere,
        Unit::Ohm,
        Unit::Watt,
        Unit::Milliwatt,
        Unit::DecibelMilliwatt,
        Unit::Lux,
        Unit::Gram,
        Unit::Kilogram,
        Unit::Degree,
    ];

    /// The conventional symbol, as a person would write it
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::One => "",
            Unit::Percent => "%",
            Unit::PartsPerMillion => "ppm",
            Unit::Celsius => "°C",
            Unit::Fahrenheit => "°F",
            Unit::Kelvin => "K",
            Unit::Pascal => "Pa",
            Unit::Hectopascal => "hPa",
            Unit::Bar => "bar",
            Unit::Metre => "m",
            Unit::Millimetre => "mm",
            Unit::Micrometre => "\u{00B5}m",
            Unit::Nanometre => "nm",
            Unit::MetrePerSecond => "m/s",
            Unit::Second => "s",
            Unit::Hertz => "Hz",
            Unit::Volt => "V",
            Unit::Ampere => "A",
            Unit::Milliampere => "mA",
            Unit::Ohm => "\u{03A9}",
            Unit::Watt => "W",
            Unit::Milliwatt => "mW",
            Unit::DecibelMilliwatt => "dBm",
            Unit::Lux => "lx",
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Degree => "°",
        }
    }

    /// The ASCII-only symbol
    pub fn ascii_symbol(self) -> &'static str {
        match self {
            Unit::One => "one",
            Unit::PartsPerMillion => "[ppm]",
            Unit::Celsius => "Cel",
            Unit::Fahrenheit => "[degF]",
            Unit::Micrometre => "um",
            Unit::Ohm => "Ohm",
            Unit::DecibelMilliwatt => "dB[mW]",
            Unit::Degree => "deg",
            other => other.symbol(),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = UnitParseError;

    /// Accepts either symbol, plus the common Unicode look-alikes
    /// (`℃`, Greek mu, the ohm sign).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "\u{2103}" => return Ok(Unit::Celsius),
            "\u{2109}" => return Ok(Unit::Fahrenheit),
            "\u{03BC}m" => return Ok(Unit::Micrometre),
            "\u{2126}" => return Ok(Unit::Ohm),
            _ => {}
        }
        Unit::ALL
            .iter()
            .copied()
            .find(|unit| unit.symbol() == s || unit.ascii_symbol() == s)
            .ok_or_else(|| UnitParseError(s.to_string()))
    }
}
