//! Tabular export of the run's dataset.
//!
//! Writes one CSV row per record, in input order, with the extracted
//! temperature and the display-timezone date appended. Spreadsheet programs
//! open the file directly.

use std::path::Path;

use chrono_tz::Tz;
use csv::WriterBuilder;
use serde::Serialize;

use crate::data::Reading;
use crate::error::ExportError;
use crate::source::RawRecord;

/// Header row of the export, in column order.
pub const EXPORT_COLUMNS: [&str; 12] = [
    "timestamp",
    "host",
    "service",
    "status",
    "unknown_flag",
    "state",
    "metric1",
    "metric2",
    "details",
    "detail_blob",
    "temperature",
    "date",
];

/// One output row. Field order must match [`EXPORT_COLUMNS`].
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    timestamp: i64,
    host: &'a str,
    service: &'a str,
    status: &'a str,
    unknown_flag: &'a str,
    state: &'a str,
    metric1: &'a str,
    metric2: &'a str,
    details: &'a str,
    detail_blob: &'a str,
    temperature: Option<f64>,
    date: String,
}

impl<'a> ExportRow<'a> {
    fn new(record: &'a RawRecord, reading: &Reading, timezone: &Tz) -> Self {
        Self {
            timestamp: record.timestamp,
            host: &record.host,
            service: &record.service,
            status: &record.status,
            unknown_flag: &record.unknown_flag,
            state: &record.state,
            metric1: &record.metric1,
            metric2: &record.metric2,
            details: &record.details,
            detail_blob: &record.detail_blob,
            temperature: reading.temperature,
            date: reading.local_time(timezone).to_rfc3339(),
        }
    }
}

/// Write `records` and their `readings` to `path`, replacing any existing file.
///
/// `readings[i]` must be the reading derived from `records[i]`. Returns the
/// number of data rows written.
pub fn export_dataset(
    path: &Path,
    records: &[RawRecord],
    readings: &[Reading],
    timezone: &Tz,
) -> Result<usize, ExportError> {
    let write_err = |source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(write_err)?;
    writer.write_record(EXPORT_COLUMNS).map_err(write_err)?;

    let mut rows = 0;
    for (record, reading) in records.iter().zip(readings) {
        writer
            .serialize(ExportRow::new(record, reading, timezone))
            .map_err(write_err)?;
        rows += 1;
    }

    writer.flush().map_err(|source| ExportError::Flush {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), rows, "dataset exported");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::extract_readings;
    use crate::source::read_records;
    use std::fs;
    use tempfile::TempDir;

    const INPUT: &str = "1700000000\tsrv1\tXClarity\tOK\t0\tHARD\t1\t0\tOK\tAmbient_temperatureC=20.0;;;;\n\
                         1700000300\tsrv1\tXClarity\tOK\t0\tHARD\t1\t0\tOK\tAmbient_temperatureC=21.0;;;;\n\
                         1700000600\tsrv1\tXClarity\tOK\t0\tHARD\t1\t0\tOK\tCPU1_temperatureC=40;;;;\n";

    #[test]
    fn test_writes_header_and_rows_in_source_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.csv");
        let records = read_records(INPUT.as_bytes()).unwrap();
        let readings = extract_readings(&records);

        let rows = export_dataset(&path, &records, &readings, &Tz::UTC).unwrap();
        assert_eq!(rows, 3);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), EXPORT_COLUMNS);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "1700000000");
        assert_eq!(&rows[0][10], "20.0");
        assert_eq!(&rows[1][10], "21.0");
        // Missing temperature is an empty cell
        assert_eq!(&rows[2][10], "");
        assert_eq!(&rows[2][9], "CPU1_temperatureC=40;;;;");
        assert_eq!(&rows[0][11], "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_empty_dataset_still_has_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.csv");

        assert_eq!(export_dataset(&path, &[], &[], &Tz::UTC).unwrap(), 0);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("timestamp,host,"));
    }

    #[test]
    fn test_unwritable_path_is_an_export_error() {
        let err = export_dataset(Path::new("/nonexistent/dir/report.csv"), &[], &[], &Tz::UTC)
            .unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
    }
}
