//! Per-host reading series.

use chrono::{DateTime, TimeZone};

use super::reading::Reading;

/// The readings of one host, in input order.
///
/// Readings are not re-sorted: if the perfdata file is not chronological,
/// the plotted line follows file order.
#[derive(Debug, Clone)]
pub struct HostSeries<'a> {
    pub host: &'a str,
    pub readings: Vec<&'a Reading>,
}

impl<'a> HostSeries<'a> {
    /// Select the readings belonging to `host`.
    pub fn collect(readings: &'a [Reading], host: &'a str) -> Self {
        Self {
            host,
            readings: readings.iter().filter(|r| r.host == host).collect(),
        }
    }

    /// Points with a present temperature, timestamps in `tz`.
    pub fn points<Tz: TimeZone>(&self, tz: &Tz) -> Vec<(DateTime<Tz>, f64)> {
        self.readings
            .iter()
            .filter_map(|r| r.temperature.map(|t| (r.local_time(tz), t)))
            .collect()
    }

    /// Whether at least one reading carries a temperature.
    pub fn is_plottable(&self) -> bool {
        self.readings.iter().any(|r| r.has_temperature())
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
