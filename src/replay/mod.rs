pub mod data;

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use csv::Reader;
use data::ReadingRow;
use thiserror::Error;
use tracing::{info, warn};

use crate::poster::Poster;
use crate::record::{MeasurementRecord, Quantity, Unit, UnitParseError};
use crate::transport::Transport;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: invalid timestamp: {source}")]
    Timestamp {
        row: usize,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Row {row}: {source}")]
    Unit {
        row: usize,
        #[source]
        source: UnitParseError,
    },
}

pub type Result<T> = std::result::Result<T, ReplayError>;

/// Outcome counts for one replay run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub posted: usize,
    pub failed: usize,
}

impl ReplaySummary {
    pub fn all_posted(&self) -> bool {
        self.failed == 0
    }
}

/// Load measurement records from a CSV file with a
/// `sensor_id,time,value,unit` header
pub fn load_records(path: &Path) -> Result<Vec<MeasurementRecord>> {
    info!("Loading measurements from {}", path.display());
    let file = File::open(path)?;
    let records = read_records(Reader::from_reader(file))?;
    info!("Loaded {} measurements", records.len());
    Ok(records)
}

fn read_records<R: io::Read>(mut reader: Reader<R>) -> Result<Vec<MeasurementRecord>> {
    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<ReadingRow>().enumerate() {
        let row_number = index + 1;
        records.push(to_record(row_number, row?)?);
    }
    Ok(records)
}

fn to_record(row_number: usize, row: ReadingRow) -> Result<MeasurementRecord> {
    let time = DateTime::parse_from_rfc3339(row.time.trim())
        .map_err(|source| ReplayError::Timestamp {
            row: row_number,
            source,
        })?
        .with_timezone(&Utc);
    let unit: Unit = row.unit.parse().map_err(|source| ReplayError::Unit {
        row: row_number,
        source,
    })?;
    Ok(MeasurementRecord::new(
        row.sensor_id,
        time,
        Quantity::new(row.value, unit),
    ))
}

/// Post every record in order, pausing `delay` between posts.
///
/// Failed posts are counted, never retried.
pub fn replay<T: Transport>(
    poster: &Poster<T>,
    records: &[MeasurementRecord],
    delay: Duration,
) -> ReplaySummary {
    info!(
        "Replaying {} measurements to {} ({})",
        records.len(),
        poster.target(),
        poster.server_type()
    );

    let mut summary = ReplaySummary::default();
    for (index, record) in records.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            std::thread::sleep(delay);
        }
        if poster.post(record) {
            summary.posted += 1;
        } else {
            warn!("Failed to post measurement from {}", record.sensor_id);
            summary.failed += 1;
        }
    }

    info!(
        "Replay finished: {} posted, {} failed",
        summary.posted, summary.failed
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn reader(csv: &str) -> Reader<&[u8]> {
        Reader::from_reader(csv.as_bytes())
    }

    #[test]
    fn reads_rows_into_records() {
        let csv = "sensor_id,time,value,unit\n\
                   s1,2021-01-01T00:00:01.500Z,21.5,°C\n\
                   s2,2021-01-01T01:00:00+01:00,10,Cel\n";
        let records = read_records(reader(csv)).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sensor_id, "s1");
        assert_eq!(records[0].epoch_seconds(), 1_609_459_201);
        assert_eq!(records[0].measurement, Quantity::new(21.5, Unit::Celsius));
        assert_eq!(records[1].epoch_seconds(), 1_609_459_200);
        assert_eq!(records[1].measurement.unit, Unit::Celsius);
    }

    #[test]
    fn missing_unit_means_dimensionless() {
        let csv = "sensor_id,time,value,unit\ns1,2021-01-01T00:00:00Z,3,\n";
        let records = read_records(reader(csv)).unwrap();
        assert_eq!(records[0].measurement.unit, Unit::One);
    }

    #[test]
    fn bad_timestamp_names_the_row() {
        let csv = "sensor_id,time,value,unit\n\
                   s1,2021-01-01T00:00:00Z,1,K\n\
                   s1,yesterday,1,K\n";
        let err = read_records(reader(csv)).unwrap_err();
        assert!(matches!(err, ReplayError::Timestamp { row: 2, .. }), "{err}");
    }

    #[test]
    fn unknown_unit_names_the_row() {
        let csv = "sensor_id,time,value,unit\ns1,2021-01-01T00:00:00Z,1,furlong\n";
        let err = read_records(reader(csv)).unwrap_err();
        assert!(matches!(err, ReplayError::Unit { row: 1, .. }), "{err}");
    }

    #[test]
    fn non_numeric_value_is_a_csv_error() {
        let csv = "sensor_id,time,value,unit\ns1,2021-01-01T00:00:00Z,warm,K\n";
        assert!(matches!(
            read_records(reader(csv)),
            Err(ReplayError::Csv(_))
        ));
    }

    #[test]
    fn load_records_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sensor_id,time,value,unit").unwrap();
        writeln!(file, "s2,2021-01-01T00:00:00Z,10,Cel").unwrap();
        file.flush().unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sensor_id, "s2");
    }

    #[test]
    fn load_records_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_records(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, ReplayError::Io(_)));
    }
}
