//! Perfdata token parsing.
//!
//! A perfdata blob is a whitespace-separated list of
//! `label=value[UOM];[warn];[crit];[min];[max]` tokens. Labels containing
//! spaces are single-quoted, with `''` standing for a literal quote.

use std::sync::LazyLock;

use regex::Regex;

/// Leading number of a perfdata value: digits with an optional fraction.
static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)").expect("valid regex"));

/// Parsed perfdata tokens, in blob order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerfData {
    entries: Vec<(String, PerfValue)>,
}

/// The raw text right of `=` in a perfdata token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerfValue(String);

impl PerfValue {
    /// The unparsed value, including unit and thresholds.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The leading numeric value, if the value starts with one.
    ///
    /// `21.5C;40;45` yields `21.5`; an empty value or one starting with a
    /// sign or letter yields `None`.
    pub fn number(&self) -> Option<f64> {
        let caps = LEADING_NUMBER.captures(&self.0)?;
        caps[1].parse().ok()
    }
}

impl PerfData {
    /// Parse a perfdata blob. Tokens without `=` are ignored.
    pub fn parse(blob: &str) -> Self {
        let mut entries = Vec::new();
        let mut chars = blob.chars().peekable();

        loop {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            let Some(&first) = chars.peek() else {
                break;
            };

            let mut label = String::new();
            let mut has_value = false;
            if first == '\'' {
                chars.next();
                while let Some(c) = chars.next() {
                    if c == '\'' {
                        if chars.next_if_eq(&'\'').is_some() {
                            label.push('\'');
                        } else {
                            break;
                        }
                    } else {
                        label.push(c);
                    }
                }
                has_value = chars.next_if_eq(&'=').is_some();
            } else {
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    if c == '=' {
                        has_value = true;
                        break;
                    }
                    label.push(c);
                }
            }

            let mut value = String::new();
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                value.push(c);
            }

            if has_value && !label.is_empty() {
                entries.push((label, PerfValue(value)));
            }
        }

        Self { entries }
    }

    /// Value of the first token with the given label.
    pub fn get(&self, label: &str) -> Option<&PerfValue> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, v)| v)
    }

    /// Leading number of the first token with the given label.
    pub fn number(&self, label: &str) -> Option<f64> {
        self.get(label)?.number()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(label, value)` pairs in blob order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PerfValue)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v))
    }
}
