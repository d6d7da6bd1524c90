// File: crates/logbook-core/src/directive.rs
// Summary: Directive (kind, option) selection, its validation, and the typed values it parses into.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{ChartError, Result};
use crate::relation::Attribute;

/// What a table should show (`kind`) and how (`option`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub kind: String,
    pub option: Option<String>,
}

impl Directive {
    pub fn new(kind: impl Into<String>, option: Option<&str>) -> Self {
        Self { kind: kind.into(), option: option.map(String::from) }
    }

    pub fn with_option(kind: impl Into<String>, option: impl Into<String>) -> Self {
        Self { kind: kind.into(), option: Some(option.into()) }
    }

    pub fn kind_only(kind: impl Into<String>) -> Self {
        Self { kind: kind.into(), option: None }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.option {
            Some(option) => write!(f, "{}/{}", self.kind, option),
            None => f.write_str(&self.kind),
        }
    }
}

/// Reject a directive outside the accepted sets before any data is scanned.
/// An empty `valid_options` means the variant takes no option at all.
pub fn ensure_directive_validated<K, O>(directive: &Directive, valid_kinds: &[K], valid_options: &[O]) -> Result<()>
where
    K: AsRef<str>,
    O: AsRef<str>,
{
    if !valid_kinds.iter().any(|k| k.as_ref() == directive.kind) {
        return Err(ChartError::invalid_directive(directive.kind.as_str(), valid_kinds));
    }
    match &directive.option {
        None if valid_options.is_empty() => Ok(()),
        Some(option) if valid_options.iter().any(|o| o.as_ref() == option) => Ok(()),
        Some(option) => {
            if valid_options.is_empty() {
                Err(ChartError::invalid_directive(option.as_str(), &["<none>"]))
            } else {
                Err(ChartError::invalid_directive(option.as_str(), valid_options))
            }
        }
        None => Err(ChartError::invalid_directive("<none>", valid_options)),
    }
}

/// Which chart (and matching table) to build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Candlestick,
    Line,
    Bubble,
    Scatter,
    Histogram,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] =
        [ChartKind::Candlestick, ChartKind::Line, ChartKind::Bubble, ChartKind::Scatter, ChartKind::Histogram];

    pub const fn name(self) -> &'static str {
        match self {
            ChartKind::Candlestick => "Candlestick",
            ChartKind::Line => "Line",
            ChartKind::Bubble => "Bubble",
            ChartKind::Scatter => "Scatter",
            ChartKind::Histogram => "Histogram",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|k| k.name()).collect();
                ChartError::invalid_directive(s, &names)
            })
    }
}

/// Ship skill indicator plotted by ship charts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Skill {
    Levels,
    Experiences,
}

impl Skill {
    pub const NAMES: [&'static str; 2] = ["Levels", "Experiences"];

    pub const fn name(self) -> &'static str {
        match self {
            Skill::Levels => "Levels",
            Skill::Experiences => "Experiences",
        }
    }

    pub const fn attribute(self) -> Attribute {
        match self {
            Skill::Levels => Attribute::Level,
            Skill::Experiences => Attribute::Experience,
        }
    }
}

impl FromStr for Skill {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Levels" => Ok(Skill::Levels),
            "Experiences" => Ok(Skill::Experiences),
            _ => Err(ChartError::invalid_directive(s, &Self::NAMES)),
        }
    }
}

/// Row ordering for ship scatter charts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    /// Relation order, i.e. the order ships joined the fleet.
    Arrival,
    /// Descending experience, ties broken by descending level.
    Experiences,
}

impl SortOrder {
    pub const NAMES: [&'static str; 2] = ["Arrival", "Experiences"];

    pub const fn name(self) -> &'static str {
        match self {
            SortOrder::Arrival => "Arrival",
            SortOrder::Experiences => "Experiences",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Arrival" => Ok(SortOrder::Arrival),
            "Experiences" => Ok(SortOrder::Experiences),
            _ => Err(ChartError::invalid_directive(s, &Self::NAMES)),
        }
    }
}
