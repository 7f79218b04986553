//! Temperature chart rendering.
//!
//! [`plan_series`] decides what gets drawn; [`render_chart`] draws it to an
//! SVG file with plotters.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use plotters::prelude::*;

use super::palette::{pair_colors, SeriesColor};
use crate::data::{HostSeries, Reading};
use crate::error::RenderError;

/// Chart title used when none is configured.
pub const DEFAULT_TITLE: &str = "CED Temperature";

/// Look and placement of the chart.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub title: String,
    /// Width and height in pixels.
    pub size: (u32, u32),
    /// Timezone the x axis is shown in.
    pub timezone: Tz,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            size: (1000, 600),
            timezone: chrono_tz::Europe::Rome,
        }
    }
}

/// One line to draw.
#[derive(Debug, Clone)]
pub struct SeriesPlan {
    pub host: String,
    pub color: SeriesColor,
    /// Display-timezone points in input order.
    pub points: Vec<(DateTime<Tz>, f64)>,
}

/// Build one plan per host that has at least one temperature, in host order.
pub fn plan_series(
    readings: &[Reading],
    hosts: &[String],
    colors: &[SeriesColor],
    timezone: &Tz,
) -> Vec<SeriesPlan> {
    pair_colors(hosts, colors)
        .into_iter()
        .filter_map(|(host, color)| {
            let series = HostSeries::collect(readings, host);
            if !series.is_plottable() {
                tracing::debug!(host, readings = series.len(), "no temperatures, host skipped");
                return None;
            }
            Some(SeriesPlan {
                host: host.to_string(),
                color,
                points: series.points(timezone),
            })
        })
        .collect()
}

/// Draw the planned series to `path`, replacing any existing file.
///
/// Returns the number of series drawn.
pub fn render_chart(
    path: &Path,
    plans: &[SeriesPlan],
    options: &ChartOptions,
) -> Result<usize, RenderError> {
    let draw_err = |e: DrawingAreaErrorKind<std::io::Error>| RenderError::Draw {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let (x_range, y_range) = axis_ranges(plans, &options.timezone);

    let root = SVGBackend::new(path, options.size).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&options.title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, y_range)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Temperature (°C)")
        .x_labels(8)
        .x_label_formatter(&|t: &DateTime<Tz>| t.format("%d/%m %H:%M").to_string())
        .draw()
        .map_err(draw_err)?;

    for plan in plans {
        let color = plan.color.to_plotters();
        chart
            .draw_series(LineSeries::new(
                plan.points.iter().cloned(),
                color.stroke_width(2),
            ))
            .map_err(draw_err)?
            .label(plan.host.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    if !plans.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;

    tracing::info!(path = %path.display(), series = plans.len(), "chart written");
    Ok(plans.len())
}

type AxisRanges = (std::ops::Range<DateTime<Tz>>, std::ops::Range<f64>);

/// Axis ranges covering every point, padded so single points stay visible.
fn axis_ranges(plans: &[SeriesPlan], timezone: &Tz) -> AxisRanges {
    let mut points = plans.iter().flat_map(|p| p.points.iter());

    let Some((first_t, first_v)) = points.next() else {
        let start = DateTime::<Utc>::default().with_timezone(timezone);
        return (start.clone()..start + Duration::hours(1), 0.0..1.0);
    };

    let (mut t_min, mut t_max) = (first_t.clone(), first_t.clone());
    let (mut v_min, mut v_max) = (*first_v, *first_v);
    for (t, v) in points {
        if *t < t_min {
            t_min = t.clone();
        }
        if *t > t_max {
            t_max = t.clone();
        }
        v_min = v_min.min(*v);
        v_max = v_max.max(*v);
    }

    if t_min == t_max {
        t_min = t_min - Duration::minutes(30);
        t_max = t_max + Duration::minutes(30);
    }

    (t_min..t_max, (v_min - 1.0)..(v_max + 1.0))
}
