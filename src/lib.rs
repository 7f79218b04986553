//! # perfdata-tempgraph
//!
//! Turns the Nagios service perfdata file into a per-host ambient temperature
//! chart and mails it to the operations team.
//!
//! Each run takes a verified snapshot of the live perfdata file, truncates the
//! live file so Nagios starts a fresh window, and reports on the snapshot.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          pipeline                            │
//! │  ┌─────────┐    ┌──────────┐    ┌──────────┐    ┌─────────┐  │
//! │  │ source  │───▶│   data   │───▶│  render  │───▶│ notify  │  │
//! │  │ (input) │    │(readings)│    │ (chart)  │    │ (SMTP)  │  │
//! │  └────┬────┘    └────┬─────┘    └──────────┘    └─────────┘  │
//! │       │              └─────────▶ export (CSV)                │
//! │       ▼                                                      │
//! │  snapshot copy + truncate        artifacts (scoped cleanup)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Perfdata line schema, TSV loading, copy-aside and truncate
//! - **[`data`]**: Perfdata token parsing, temperature readings, per-host series
//! - **[`render`]**: Host colors and the SVG chart
//! - **[`export`]**: CSV export of the full dataset
//! - **[`notify`]**: Message composition and delivery with a typed outcome
//! - **[`artifacts`]**: Removal of run files on every exit path
//! - **[`config`]**: Typed, validated settings
//! - **[`pipeline`]**: The run itself
//!
//! ## Usage
//!
//! ```bash
//! tempgraph --config /etc/tempgraph/config.ini
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::path::Path;
//! use perfdata_tempgraph::{pipeline, Settings};
//!
//! let settings = Settings::load(Path::new("config.ini"))?;
//! let report = pipeline::run(&settings)?;
//! println!("{report}");
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod artifacts;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod notify;
pub mod pipeline;
pub mod render;
pub mod source;

// Re-export main types for convenience
pub use artifacts::ArtifactSet;
pub use config::Settings;
pub use data::{HostSeries, PerfData, Reading};
pub use error::PipelineError;
pub use notify::DeliveryOutcome;
pub use pipeline::RunReport;
pub use render::SeriesColor;
pub use source::{PerfdataFile, RawRecord};
