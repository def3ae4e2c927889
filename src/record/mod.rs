pub mod unit;

use std::fmt;

use chrono::{DateTime, Utc};

pub use unit::{Unit, UnitParseError};

/// A numeric value together with its unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Quantity { value, unit }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.symbol().is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}

/// A single sensor reading
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    pub sensor_id: String,       // identifier of the sensor that took the reading
    pub time: DateTime<Utc>,     // when the reading was taken
    pub measurement: Quantity,   // value and unit
}

impl MeasurementRecord {
    pub fn new(sensor_id: impl Into<String>, time: DateTime<Utc>, measurement: Quantity) -> Self {
        MeasurementRecord {
            sensor_id: sensor_id.into(),
            time,
            measurement,
        }
    }

    /// Create a record stamped with the current time
    pub fn now(sensor_id: impl Into<String>, measurement: Quantity) -> Self {
        Self::new(sensor_id, Utc::now(), measurement)
    }

    /// Whole seconds since the Unix epoch, truncated toward zero
    pub fn epoch_seconds(&self) -> i64 {
        self.time.timestamp_millis() / 1000
    }
}

impl fmt::Display for MeasurementRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {}: {}",
            self.sensor_id,
            self.time.to_rfc3339(),
            self.measurement
        )
    }
}
