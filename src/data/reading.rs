//! Temperature readings derived from perfdata records.

use chrono::{DateTime, TimeZone, Utc};

use super::perfdata::PerfData;
use crate::source::RawRecord;

/// Perfdata label carrying the ambient temperature in Celsius.
pub const TEMPERATURE_LABEL: &str = "Ambient_temperatureC";

/// A (host, time, temperature) triple taken from one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub host: String,
    /// Check time in UTC.
    pub timestamp: DateTime<Utc>,
    /// `None` when the record had no usable temperature token.
    pub temperature: Option<f64>,
}

impl Reading {
    /// Derive a reading from a record.
    pub fn from_record(record: &RawRecord) -> Self {
        let temperature = PerfData::parse(&record.detail_blob).number(TEMPERATURE_LABEL);
        if temperature.is_none() {
            tracing::debug!(
                host = %record.host,
                timestamp = record.timestamp,
                "no ambient temperature in perfdata"
            );
        }

        Self {
            host: record.host.clone(),
            // The loader only accepts representable epochs
            timestamp: epoch_to_utc(record.timestamp).unwrap_or(DateTime::<Utc>::MIN_UTC),
            temperature,
        }
    }

    /// The check time in the given display timezone.
    pub fn local_time<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Tz> {
        self.timestamp.with_timezone(tz)
    }

    pub fn has_temperature(&self) -> bool {
        self.temperature.is_some()
    }
}

/// Interpret epoch seconds as a UTC date-time.
pub fn epoch_to_utc(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}

/// One reading per record, in record order.
pub fn extract_readings(records: &[RawRecord]) -> Vec<Reading> {
    records.iter().map(Reading::from_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Rome;

    fn record(timestamp: i64, host: &str, blob: &str) -> RawRecord {
        RawRecord {
            timestamp,
            host: host.to_string(),
            service: "XClarity".to_string(),
            status: "OK".to_string(),
            unknown_flag: "0".to_string(),
            state: "HARD".to_string(),
            metric1: "1".to_string(),
            metric2: "0".to_string(),
            details: "OK".to_string(),
            detail_blob: blob.to_string(),
        }
    }

    #[test]
    fn test_extracts_exact_temperature() {
        let reading = Reading::from_record(&record(0, "srv1", "Ambient_temperatureC=21.5"));
        assert_eq!(reading.temperature, Some(21.5));

        let reading =
            Reading::from_record(&record(0, "srv1", "PSU=1;;;; Ambient_temperatureC=19.25;40;45"));
        assert_eq!(reading.temperature, Some(19.25));
    }

    #[test]
    fn test_missing_or_malformed_token_is_absent() {
        for blob in ["Ambient_temperatureC=", "", "CPU1_temperatureC=40", "Ambient_temperatureC=n/a"] {
            let reading = Reading::from_record(&record(0, "srv1", blob));
            assert_eq!(reading.temperature, None, "blob {blob:?}");
            assert!(!reading.has_temperature());
        }
    }

    #[test]
    fn test_timestamp_is_interpreted_as_utc() {
        let reading = Reading::from_record(&record(1_700_000_000, "srv1", ""));
        assert_eq!(reading.timestamp.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_utc_to_utc_is_identity() {
        let reading = Reading::from_record(&record(1_700_000_000, "srv1", ""));
        assert_eq!(reading.local_time(&Utc), reading.timestamp);
    }

    #[test]
    fn test_conversion_to_display_timezone_is_deterministic() {
        let reading = Reading::from_record(&record(1_700_000_000, "srv1", ""));
        let first = reading.local_time(&Rome);
        let second = reading.local_time(&Rome);
        assert_eq!(first, second);
        // Same instant, shifted wall clock (CET in November)
        assert_eq!(first.with_timezone(&Utc), reading.timestamp);
        assert_eq!(first.format("%H:%M").to_string(), "23:13");
    }

    #[test]
    fn test_summer_time_is_applied() {
        // 2024-07-01T12:00:00Z is 14:00 CEST
        let reading = Reading::from_record(&record(1_719_835_200, "srv1", ""));
        assert_eq!(reading.local_time(&Rome).format("%H:%M").to_string(), "14:00");
    }

    #[test]
    fn test_extract_preserves_order_and_count() {
        let records = vec![
            record(300, "srv2", "Ambient_temperatureC=22"),
            record(100, "srv1", ""),
            record(200, "srv1", "Ambient_temperatureC=20"),
        ];
        let readings = extract_readings(&records);
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].host, "srv2");
        assert_eq!(readings[1].temperature, None);
        assert_eq!(readings[2].temperature, Some(20.0));
    }
}
