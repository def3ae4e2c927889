//! Wire formats for each back-end.

use serde::Serialize;
use thiserror::Error;
use url::form_urlencoded;

use super::ServerType;
use crate::record::MeasurementRecord;
use crate::transport::Payload;

pub const JSON_UTF8: &str = "application/json; charset=utf-8";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const ACCEPT_TEXT_OR_JSON: &str = "text/plain, application/json";
pub const ACCEPT_TEXT: &str = "text/plain";

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Measurement value is not finite: {0}")]
    NonFiniteValue(f64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EncodeError>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DianaBody<'a> {
    sensor_id: &'a str,
    time: i64,      // epoch seconds
    quantity: String, // bare value, unit not sent
}

/// Encode `record` for `server_type`, or `None` if the back-end is not supported
pub fn encode(server_type: &ServerType, record: &MeasurementRecord) -> Result<Option<Payload>> {
    match server_type {
        ServerType::Diana => diana_payload(record).map(Some),
        ServerType::Spark => spark_payload(record).map(Some),
        ServerType::Other(_) => Ok(None),
    }
}

/// Pretty-printed JSON with `sensorId`, `time` and `quantity`.
///
/// Only the numeric value goes into `quantity`; DIANA has no unit field.
pub fn diana_payload(record: &MeasurementRecord) -> Result<Payload> {
    let body = DianaBody {
        sensor_id: &record.sensor_id,
        time: record.epoch_seconds(),
        quantity: value_string(record)?,
    };
    Ok(Payload {
        body: serde_json::to_string_pretty(&body)?,
        content_type: JSON_UTF8,
        accept: ACCEPT_TEXT_OR_JSON,
    })
}

/// `name=<sensor>&value=<value>&unit=<ascii unit>`
pub fn spark_payload(record: &MeasurementRecord) -> Result<Payload> {
    let body = form_urlencoded::Serializer::new(String::new())
        .append_pair("name", &record.sensor_id)
        .append_pair("value", &value_string(record)?)
        .append_pair("unit", record.measurement.unit.ascii_symbol())
        .finish();
    Ok(Payload {
        body,
        content_type: FORM_URLENCODED,
        accept: ACCEPT_TEXT,
    })
}

fn value_string(record: &MeasurementRecord) -> Result<String> {
    let value = record.measurement.value;
    if !value.is_finite() {
        return Err(EncodeError::NonFiniteValue(value));
    }
    Ok(value.to_string())
}
