//! Typed schema for one perfdata line.
//!
//! Nagios writes service perfdata as tab-separated lines with a fixed column
//! order. Each column gets a named field here so a bad line fails with the
//! field name instead of silently shifting every column after it.

use chrono::{DateTime, Utc};
use csv::StringRecord;

use crate::error::LoadError;

/// Number of tab-separated columns in a perfdata line.
pub const COLUMN_COUNT: usize = 10;

/// One line of the service perfdata file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Check time as epoch seconds.
    pub timestamp: i64,
    pub host: String,
    pub service: String,
    /// Service state (`OK`, `WARNING`, ...).
    pub status: String,
    pub unknown_flag: String,
    /// State type (`HARD`/`SOFT`).
    pub state: String,
    pub metric1: String,
    pub metric2: String,
    /// Plugin output line.
    pub details: String,
    /// Perfdata tokens (`label=value;warn;crit;min;max ...`).
    pub detail_blob: String,
}

impl RawRecord {
    /// Build a record from the fields of input line `line` (1-based).
    pub fn from_fields(line: u64, fields: &StringRecord) -> Result<Self, LoadError> {
        if fields.len() != COLUMN_COUNT {
            return Err(LoadError::ColumnCount {
                line,
                expected: COLUMN_COUNT,
                found: fields.len(),
            });
        }

        let field = |i: usize| fields.get(i).unwrap_or_default().to_string();

        let raw_timestamp = field(0);
        let timestamp = parse_epoch(&raw_timestamp).ok_or_else(|| LoadError::InvalidField {
            line,
            field: "timestamp",
            value: raw_timestamp.clone(),
        })?;

        let host = field(1);
        if host.trim().is_empty() {
            return Err(LoadError::InvalidField {
                line,
                field: "host",
                value: host,
            });
        }

        Ok(Self {
            timestamp,
            host,
            service: field(2),
            status: field(3),
            unknown_flag: field(4),
            state: field(5),
            metric1: field(6),
            metric2: field(7),
            details: field(8),
            detail_blob: field(9),
        })
    }
}

/// Parse an epoch-seconds field, rejecting values chrono cannot represent.
fn parse_epoch(raw: &str) -> Option<i64> {
    let secs: i64 = raw.trim().parse().ok()?;
    DateTime::<Utc>::from_timestamp(secs, 0).map(|_| secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(line: &str) -> StringRecord {
        StringRecord::from(line.split('\t').collect::<Vec<_>>())
    }

    #[test]
    fn test_parses_all_columns_by_name() {
        let record = RawRecord::from_fields(
            1,
            &fields("1700000000\tsrv1\tXClarity\tOK\t0\tHARD\t1\t0\tAll good\tAmbient_temperatureC=21.5;;;;"),
        )
        .unwrap();

        assert_eq!(record.timestamp, 1_700_000_000);
        assert_eq!(record.host, "srv1");
        assert_eq!(record.service, "XClarity");
        assert_eq!(record.status, "OK");
        assert_eq!(record.state, "HARD");
        assert_eq!(record.details, "All good");
        assert_eq!(record.detail_blob, "Ambient_temperatureC=21.5;;;;");
    }

    #[test]
    fn test_rejects_wrong_column_count() {
        let err = RawRecord::from_fields(4, &fields("1700000000\tsrv1\tXClarity")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::ColumnCount {
                line: 4,
                expected: 10,
                found: 3
            }
        ));
    }

    #[test]
    fn test_rejects_non_numeric_timestamp() {
        let err = RawRecord::from_fields(2, &fields("noon\tsrv1\ts\tOK\t0\tHARD\t1\t0\td\tb"))
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidField {
                field: "timestamp",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_out_of_range_timestamp() {
        let line = format!("{}\tsrv1\ts\tOK\t0\tHARD\t1\t0\td\tb", i64::MAX);
        assert!(RawRecord::from_fields(1, &fields(&line)).is_err());
    }

    #[test]
    fn test_rejects_empty_host() {
        let err = RawRecord::from_fields(1, &fields("1700000000\t \ts\tOK\t0\tHARD\t1\t0\td\tb"))
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidField { field: "host", .. }));
    }
}
