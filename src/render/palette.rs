//! Series colors.
//!
//! Colors are configured by name (`blue`, `darkgreen`, `tab:orange`) or as
//! hex (`#1f77b4`, `#f80`). Hosts are paired with colors by position, cycling
//! when there are more hosts than colors.

use std::str::FromStr;

use plotters::style::RGBColor;
use thiserror::Error;

/// Named colors, matching the names matplotlib accepts.
const NAMED: &[(&str, (u8, u8, u8))] = &[
    ("b", (0x00, 0x00, 0xff)),
    ("g", (0x00, 0x80, 0x00)),
    ("r", (0xff, 0x00, 0x00)),
    ("c", (0x00, 0xbf, 0xbf)),
    ("m", (0xbf, 0x00, 0xbf)),
    ("y", (0xbf, 0xbf, 0x00)),
    ("k", (0x00, 0x00, 0x00)),
    ("w", (0xff, 0xff, 0xff)),
    ("black", (0x00, 0x00, 0x00)),
    ("white", (0xff, 0xff, 0xff)),
    ("blue", (0x00, 0x00, 0xff)),
    ("green", (0x00, 0x80, 0x00)),
    ("red", (0xff, 0x00, 0x00)),
    ("cyan", (0x00, 0xff, 0xff)),
    ("magenta", (0xff, 0x00, 0xff)),
    ("yellow", (0xff, 0xff, 0x00)),
    ("orange", (0xff, 0xa5, 0x00)),
    ("purple", (0x80, 0x00, 0x80)),
    ("brown", (0xa5, 0x2a, 0x2a)),
    ("pink", (0xff, 0xc0, 0xcb)),
    ("gray", (0x80, 0x80, 0x80)),
    ("grey", (0x80, 0x80, 0x80)),
    ("olive", (0x80, 0x80, 0x00)),
    ("navy", (0x00, 0x00, 0x80)),
    ("teal", (0x00, 0x80, 0x80)),
    ("maroon", (0x80, 0x00, 0x00)),
    ("lime", (0x00, 0xff, 0x00)),
    ("gold", (0xff, 0xd7, 0x00)),
    ("silver", (0xc0, 0xc0, 0xc0)),
    ("darkblue", (0x00, 0x00, 0x8b)),
    ("darkgreen", (0x00, 0x64, 0x00)),
    ("darkred", (0x8b, 0x00, 0x00)),
    ("darkorange", (0xff, 0x8c, 0x00)),
    ("lightblue", (0xad, 0xd8, 0xe6)),
    ("lightgreen", (0x90, 0xee, 0x90)),
    ("tab:blue", (0x1f, 0x77, 0xb4)),
    ("tab:orange", (0xff, 0x7f, 0x0e)),
    ("tab:green", (0x2c, 0xa0, 0x2c)),
    ("tab:red", (0xd6, 0x27, 0x28)),
    ("tab:purple", (0x94, 0x67, 0xbd)),
    ("tab:brown", (0x8c, 0x56, 0x4b)),
    ("tab:pink", (0xe3, 0x77, 0xc2)),
    ("tab:gray", (0x7f, 0x7f, 0x7f)),
    ("tab:olive", (0xbc, 0xbd, 0x22)),
    ("tab:cyan", (0x17, 0xbe, 0xcf)),
];

/// Used when no colors are configured.
const DEFAULT_CYCLE: &[&str] = &[
    "tab:blue",
    "tab:orange",
    "tab:green",
    "tab:red",
    "tab:purple",
    "tab:brown",
    "tab:pink",
    "tab:gray",
    "tab:olive",
    "tab:cyan",
];

/// A named line color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesColor {
    name: String,
    rgb: (u8, u8, u8),
}

/// A color string that is neither a known name nor valid hex.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown color {0:?}")]
pub struct UnknownColor(pub String);

impl SeriesColor {
    /// The name as configured.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        self.rgb
    }

    /// Hex form, e.g. `#0000ff`.
    pub fn hex(&self) -> String {
        let (r, g, b) = self.rgb;
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub fn to_plotters(&self) -> RGBColor {
        let (r, g, b) = self.rgb;
        RGBColor(r, g, b)
    }

    /// The built-in palette, cycled when no colors are configured.
    pub fn default_cycle() -> Vec<SeriesColor> {
        DEFAULT_CYCLE
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect()
    }
}

impl FromStr for SeriesColor {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let lower = name.to_ascii_lowercase();

        let rgb = match lower.strip_prefix('#') {
            Some(hex) => parse_hex(hex),
            None => NAMED.iter().find(|(n, _)| *n == lower).map(|(_, rgb)| *rgb),
        };

        rgb.map(|rgb| SeriesColor {
            name: name.to_string(),
            rgb,
        })
        .ok_or_else(|| UnknownColor(s.to_string()))
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some((
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
        )),
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|d| d * 17);
            Some((digit(0)?, digit(1)?, digit(2)?))
        }
        _ => None,
    }
}

/// Pair each host with a color.
///
/// Host `i` gets `colors[i % colors.len()]`; surplus colors are unused. With
/// no colors at all the default cycle is used instead.
pub fn pair_colors<'a>(hosts: &'a [String], colors: &[SeriesColor]) -> Vec<(&'a str, SeriesColor)> {
    let fallback;
    let colors = if colors.is_empty() {
        fallback = SeriesColor::default_cycle();
        &fallback[..]
    } else {
        colors
    };

    hosts
        .iter()
        .enumerate()
        .map(|(i, host)| (host.as_str(), colors[i % colors.len()].clone()))
        .collect()
}
