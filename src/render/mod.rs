//! Chart rendering.
//!
//! - [`palette`]: Color names, hex parsing and host/color pairing
//! - [`chart`]: Series planning and SVG output via plotters

pub mod chart;
pub mod palette;

pub use chart::{plan_series, render_chart, ChartOptions, SeriesPlan, DEFAULT_TITLE};
pub use palette::{pair_colors, SeriesColor, UnknownColor};
