use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ReadingRow {
    pub sensor_id: String, // sensor identifier
    pub time: String,      // RFC 3339 timestamp
    pub value: f64,        // numeric reading
    #[serde(default)]
    pub unit: String,      // either symbol form, e.g. "°C" or "Cel"; empty means dimensionless
}
