//! Run configuration.
//!
//! Settings come from one file (`.ini`, `.toml`, ... by extension) layered
//! with `TEMPGRAPH_` environment overrides, where `__` separates section and
//! key:
//!
//! ```ini
//! [Paths]
//! original_file = /var/spool/nagios/service-perfdata
//! copied_file = /tmp/service-perfdata.copy
//! graph_file = /tmp/temperature.svg
//!
//! [Email]
//! smtp_server = localhost
//! smtp_port = 25
//! from_email = nagios@example.com
//! to_email = team@example.com
//!
//! [Hosts]
//! list = srv1, srv2
//! colors = blue, red
//! ```
//!
//! ```bash
//! TEMPGRAPH_EMAIL__SMTP_SERVER=relay.internal tempgraph --config config.ini
//! ```
//!
//! Section and key names are case-insensitive. Everything is validated into
//! [`Settings`] before any file is touched.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File, Source};
use lettre::message::Mailbox;

use crate::render::{SeriesColor, DEFAULT_TITLE};

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "TEMPGRAPH";

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Rome;
pub const DEFAULT_SUBJECT: &str = "CED Temperature Report";
pub const DEFAULT_BODY: &str = "Hello Team,\n\nPlease find attached the temperature graph and data.\n\nBest Regards,\nMonitoring Team";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Validated settings of one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub paths: PathSettings,
    pub email: EmailSettings,
    pub hosts: HostSettings,
    pub report: ReportSettings,
}

/// `[Paths]`
#[derive(Debug, Clone)]
pub struct PathSettings {
    /// Perfdata file the monitoring system appends to.
    pub original_file: PathBuf,
    /// Snapshot copy taken before truncation.
    pub copied_file: PathBuf,
    /// Chart output.
    pub graph_file: PathBuf,
    /// Tabular export; no export when unset.
    pub excel_file: Option<PathBuf>,
}

/// `[Email]`
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub from_email: String,
    pub to_email: String,
    pub timeout: Duration,
    /// Fail the run when the report cannot be delivered.
    pub require_delivery: bool,
}

/// `[Hosts]`
#[derive(Debug, Clone)]
pub struct HostSettings {
    /// Hosts to plot, in legend order.
    pub list: Vec<String>,
    /// Line colors paired with `list` by position. Empty means the default cycle.
    pub colors: Vec<SeriesColor>,
}

/// `[Report]`
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub timezone: Tz,
    pub title: String,
    pub subject: String,
    pub body: String,
    /// Keep the artifacts when delivery fails.
    pub retain_on_failure: bool,
}

impl Settings {
    /// Load settings from `path` plus environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            bail!("config file {} not found", path.display());
        }

        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;

        Self::from_config(config)
    }

    /// Validate an already built [`Config`].
    pub fn from_config(config: Config) -> Result<Self> {
        let raw = RawSettings::collect(config)?;

        let paths = PathSettings {
            original_file: raw.required("paths", "original_file")?.into(),
            copied_file: raw.required("paths", "copied_file")?.into(),
            graph_file: raw.required("paths", "graph_file")?.into(),
            excel_file: raw.get("paths", "excel_file").map(PathBuf::from),
        };
        paths.check_distinct()?;

        let email = EmailSettings {
            smtp_server: raw.required("email", "smtp_server")?.to_string(),
            smtp_port: parse_port(raw.required("email", "smtp_port")?)?,
            from_email: parse_address("Email.from_email", raw.required("email", "from_email")?)?,
            to_email: parse_address("Email.to_email", raw.required("email", "to_email")?)?,
            timeout: match raw.get("email", "timeout_secs") {
                Some(value) => parse_timeout(value)?,
                None => DEFAULT_TIMEOUT,
            },
            require_delivery: raw.flag("email", "require_delivery")?,
        };

        let list = split_list(raw.required("hosts", "list")?);
        if list.is_empty() {
            bail!("Hosts.list must name at least one host");
        }
        let colors = split_list(raw.get("hosts", "colors").unwrap_or_default())
            .iter()
            .map(|name| {
                name.parse::<SeriesColor>()
                    .with_context(|| "invalid Hosts.colors entry")
            })
            .collect::<Result<Vec<_>>>()?;

        let report = ReportSettings {
            timezone: match raw.get("report", "timezone") {
                Some(name) => name
                    .parse::<Tz>()
                    .map_err(|e| anyhow!("invalid Report.timezone {name:?}: {e}"))?,
                None => DEFAULT_TIMEZONE,
            },
            title: raw.get("report", "title").unwrap_or(DEFAULT_TITLE).to_string(),
            subject: raw
                .get("report", "subject")
                .unwrap_or(DEFAULT_SUBJECT)
                .to_string(),
            body: raw
                .get("report", "body")
                .map(unescape_newlines)
                .unwrap_or_else(|| DEFAULT_BODY.to_string()),
            retain_on_failure: raw.flag("report", "retain_on_failure")?,
        };

        Ok(Self {
            paths,
            email,
            hosts: HostSettings { list, colors },
            report,
        })
    }
}

impl PathSettings {
    /// Every configured path with its setting name.
    fn named(&self) -> Vec<(&'static str, &Path)> {
        let mut named = vec![
            ("Paths.original_file", self.original_file.as_path()),
            ("Paths.copied_file", self.copied_file.as_path()),
            ("Paths.graph_file", self.graph_file.as_path()),
        ];
        if let Some(excel_file) = &self.excel_file {
            named.push(("Paths.excel_file", excel_file.as_path()));
        }
        named
    }

    /// Reject two settings naming the same file.
    ///
    /// Run files are deleted after the run and the source is truncated, so
    /// any overlap would destroy the source or another artifact.
    fn check_distinct(&self) -> Result<()> {
        let named = self.named();
        let resolved: Vec<PathBuf> = named.iter().map(|(_, path)| comparable(path)).collect();
        for (i, a) in resolved.iter().enumerate() {
            if let Some(j) = resolved[i + 1..].iter().position(|b| b == a) {
                bail!(
                    "{} and {} both point to {}",
                    named[i].0,
                    named[i + 1 + j].0,
                    named[i].1.display()
                );
            }
        }
        Ok(())
    }
}

/// Absolute form of `path` with its directory resolved when it exists.
fn comparable(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    if let (Some(parent), Some(name)) = (absolute.parent(), absolute.file_name()) {
        if let Ok(parent) = fs::canonicalize(parent) {
            return parent.join(name);
        }
    }
    absolute
}

/// Section → key → value, all names lowercased.
struct RawSettings {
    sections: HashMap<String, HashMap<String, String>>,
}

impl RawSettings {
    fn collect(config: Config) -> Result<Self> {
        let mut entries: Vec<_> = config
            .collect()
            .context("failed to read config values")?
            .into_iter()
            .collect();
        // Lowercase names (as produced by environment overrides) win over mixed-case ones
        entries.sort_by_key(|(name, _)| *name == name.to_lowercase());

        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        for (section, value) in entries {
            let Ok(table) = value.into_table() else {
                tracing::warn!(key = %section, "ignoring config value outside a section");
                continue;
            };

            let mut keys: Vec<_> = table.into_iter().collect();
            keys.sort_by_key(|(name, _)| *name == name.to_lowercase());

            let target = sections.entry(section.to_lowercase()).or_default();
            for (key, value) in keys {
                let value = value
                    .into_string()
                    .with_context(|| format!("{section}.{key} must be a single value"))?;
                target.insert(key.to_lowercase(), value);
            }
        }

        Ok(Self { sections })
    }

    /// Trimmed value, `None` when unset or blank.
    fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|keys| keys.get(key))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, section: &str, key: &str) -> Result<&str> {
        self.get(section, key)
            .ok_or_else(|| anyhow!("missing required setting {}.{key}", display_section(section)))
    }

    /// Boolean setting, false when unset.
    fn flag(&self, section: &str, key: &str) -> Result<bool> {
        match self.get(section, key) {
            Some(value) => parse_bool(value).ok_or_else(|| {
                anyhow!(
                    "invalid boolean {}.{key} = {value:?}",
                    display_section(section)
                )
            }),
            None => Ok(false),
        }
    }
}

/// Section names as written in the sample configuration.
fn display_section(section: &str) -> String {
    let mut chars = section.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_port(raw: &str) -> Result<u16> {
    match raw.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => bail!("invalid Email.smtp_port {raw:?}: expected 1-65535"),
    }
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => bail!("invalid Email.timeout_secs {raw:?}: expected a positive number of seconds"),
    }
}

fn parse_address(setting: &str, raw: &str) -> Result<String> {
    raw.parse::<Mailbox>()
        .with_context(|| format!("invalid {setting} {raw:?}"))?;
    Ok(raw.to_string())
}

/// INI values are single-line; `\n` in the body stands for a line break.
fn unescape_newlines(raw: &str) -> String {
    raw.replace("\\n", "\n")
}
