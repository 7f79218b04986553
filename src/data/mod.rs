//! Data models and processing for perfdata records.
//!
//! This module turns loaded [`RawRecord`](crate::source::RawRecord)s into
//! temperature readings and groups them per host.
//!
//! ## Submodules
//!
//! - [`perfdata`]: Parsing of `label=value;warn;crit;min;max` perfdata tokens
//! - [`reading`]: [`Reading`] extraction (temperature + UTC timestamp)
//! - [`series`]: [`HostSeries`] selection for plotting
//!
//! ## Data Flow
//!
//! ```text
//! RawRecord (one TSV line)
//!        │
//!        ▼
//! PerfData::parse(detail_blob) ──▶ number("Ambient_temperatureC")
//!        │
//!        ▼
//! Reading { host, timestamp (UTC), temperature: Option<f64> }
//!        │
//!        └──▶ HostSeries::collect(readings, host) ──▶ points(display tz)
//! ```

pub mod perfdata;
pub mod reading;
pub mod series;

pub use perfdata::{PerfData, PerfValue};
pub use reading::{epoch_to_utc, extract_readings, Reading, TEMPERATURE_LABEL};
pub use series::HostSeries;
