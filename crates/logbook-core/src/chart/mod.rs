// File: crates/logbook-core/src/chart/mod.rs
// Summary: Chart option builders: per-axis thresholds, ticks and baselines from a table and cascading configuration.

mod material;
mod ship;

use std::cell::OnceCell;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::configuration::{Configuration, Section};
use crate::error::{ChartError, Result};
use crate::rules::ExperienceTable;
use crate::table::{Edge, Table, TableVariant};

pub use material::{CandlestickChart, LineChart};
pub use ship::{BubbleChart, HistogramChart, ScatterChart};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Vertical,
    Horizontal,
}

impl Direction {
    /// Configuration key of this axis.
    pub const fn key(self) -> &'static str {
        match self {
            Direction::Vertical => "vertical",
            Direction::Horizontal => "horizontal",
        }
    }
}

/// One axis of the option record. Only configured fields are serialized.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opposing_baseline: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Option record handed to the external renderer.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChartOption {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<AxisOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<AxisOption>,
    /// Variant-specific flags such as `hollowIsRising` or `continuous`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChartOption {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    pub fn axis(&self, direction: Direction) -> Option<&AxisOption> {
        match direction {
            Direction::Vertical => self.vertical.as_ref(),
            Direction::Horizontal => self.horizontal.as_ref(),
        }
    }

    pub fn axis_mut(&mut self, direction: Direction) -> &mut AxisOption {
        match direction {
            Direction::Vertical => self.vertical.get_or_insert_with(AxisOption::default),
            Direction::Horizontal => self.horizontal.get_or_insert_with(AxisOption::default),
        }
    }
}

/// Capability shared by every chart variant.
pub trait ChartOptionBuilder {
    fn table(&self) -> &Table<'_>;

    fn build_option(&self) -> Result<ChartOption>;

    /// Bound for one axis edge: an explicit numeric setting, else the table's extreme.
    fn threshold(&self, axis: &Section, _direction: Direction, edge: Edge, kind: &str) -> Result<Option<f64>> {
        default_threshold(self.table(), axis, edge, kind)
    }

    /// Write both edges of `direction`, only when that axis is configured.
    /// Returns whether the axis was configured.
    fn set_threshold(
        &self,
        option: &mut ChartOption,
        axis: Option<&Section>,
        direction: Direction,
        kind: &str,
    ) -> Result<bool> {
        let Some(axis) = axis else {
            return Ok(false);
        };
        let maximum = self.threshold(axis, direction, Edge::Maximum, kind)?;
        let minimum = self.threshold(axis, direction, Edge::Minimum, kind)?;
        let target = option.axis_mut(direction);
        target.maximum = maximum;
        target.minimum = minimum;
        Ok(true)
    }
}

pub fn default_threshold(table: &Table<'_>, axis: &Section, edge: Edge, kind: &str) -> Result<Option<f64>> {
    match axis.number(edge.key()) {
        Some(value) => Ok(Some(value)),
        None => table.extreme(kind, edge),
    }
}

/// Upper bound on the number of intervals one axis may be divided into.
pub const MAX_TICK_INTERVALS: usize = 10_000;

/// Ascending ticks from `minimum` to `maximum` inclusive, `step` apart (the last
/// one clamped to `maximum`): ⌈(max - min) / step⌉ + 1 values. With `mapping`,
/// the bounds are levels clamped to the table's level range, and each tick is
/// mapped to its experience; ticks landing on the same experience collapse.
pub fn build_ticks(minimum: f64, maximum: f64, step: f64, mapping: Option<&ExperienceTable>) -> Result<Vec<f64>> {
    if !(step > 0.0 && step.is_finite()) {
        return Err(ChartError::invalid_configuration("step", format!("expected a positive step, found {step}")));
    }
    if !(minimum.is_finite() && maximum.is_finite()) || maximum < minimum {
        return Err(ChartError::invalid_configuration(
            "ticks",
            format!("invalid range [{minimum}, {maximum}]"),
        ));
    }
    let (minimum, maximum) = match mapping {
        Some(table) => {
            let top = table.level_count() as f64;
            (minimum.clamp(1.0, top), maximum.clamp(1.0, top))
        }
        None => (minimum, maximum),
    };
    // tolerate float noise so an exact multiple does not gain a duplicate end tick
    let intervals = ((maximum - minimum) / step - 1e-9).ceil().max(0.0);
    if intervals > MAX_TICK_INTERVALS as f64 {
        return Err(ChartError::invalid_configuration(
            "step",
            format!("step {step} splits [{minimum}, {maximum}] into more than {MAX_TICK_INTERVALS} intervals"),
        ));
    }
    let intervals = intervals as usize;
    let ticks = (0..=intervals).map(|i| if i == intervals { maximum } else { minimum + step * i as f64 });
    let mut ticks: Vec<f64> = match mapping {
        Some(table) => ticks.map(|level| table.experience_at(level)).collect(),
        None => ticks.collect(),
    };
    ticks.dedup();
    Ok(ticks)
}

/// Copy `step`-spaced ticks onto an axis whose thresholds are already resolved.
pub fn set_ticks(option: &mut ChartOption, direction: Direction, step: Option<f64>) -> Result<()> {
    let axis = option.axis_mut(direction);
    if let (Some(minimum), Some(maximum), Some(step)) = (axis.minimum, axis.maximum, step) {
        axis.ticks = Some(build_ticks(minimum, maximum, step, None)?);
    }
    Ok(())
}

pub fn set_baseline(option: &mut ChartOption, direction: Direction, axis: &Section) {
    if let Some(baseline) = axis.number("baseline") {
        option.axis_mut(direction).baseline = Some(baseline);
    }
}

/// Copy the value at `key` (or `default_key` when absent) to `target[name]`.
/// Returns whether the copied value is enabled: present, non-null and not `false`.
pub fn set_option(
    target: &mut Map<String, Value>,
    name: &str,
    configuration: &Configuration,
    key: &str,
    default_key: Option<&str>,
) -> bool {
    let value = configuration
        .get_optional(key)
        .or_else(|| default_key.and_then(|k| configuration.get_optional(k)));
    match value {
        Some(value) => {
            target.insert(name.to_string(), value.clone());
            !matches!(value, Value::Null | Value::Bool(false))
        }
        None => false,
    }
}

pub enum ChartVariant<'t, 'a> {
    Candlestick(CandlestickChart<'t, 'a>),
    Line(LineChart<'t, 'a>),
    Bubble(BubbleChart<'t, 'a>),
    Scatter(ScatterChart<'t, 'a>),
    Histogram(HistogramChart<'t, 'a>),
}

/// Chart for one table; the option record is built once on first access.
pub struct Chart<'t, 'a> {
    variant: ChartVariant<'t, 'a>,
    option: OnceCell<ChartOption>,
}

impl<'t, 'a> Chart<'t, 'a> {
    pub fn new(table: &'t Table<'a>) -> Self {
        let variant = match table.variant() {
            TableVariant::Candlestick(t) => ChartVariant::Candlestick(CandlestickChart::new(table, t)),
            TableVariant::Line(t) => ChartVariant::Line(LineChart::new(table, t)),
            TableVariant::Bubble(_) => ChartVariant::Bubble(BubbleChart::new(table)),
            TableVariant::Scatter(t) => ChartVariant::Scatter(ScatterChart::new(table, t)),
            TableVariant::Histogram(t) => ChartVariant::Histogram(HistogramChart::new(table, t)),
        };
        Self { variant, option: OnceCell::new() }
    }

    pub fn variant(&self) -> &ChartVariant<'t, 'a> {
        &self.variant
    }

    fn builder(&self) -> &dyn ChartOptionBuilder {
        match &self.variant {
            ChartVariant::Candlestick(c) => c as &dyn ChartOptionBuilder,
            ChartVariant::Line(c) => c as &dyn ChartOptionBuilder,
            ChartVariant::Bubble(c) => c as &dyn ChartOptionBuilder,
            ChartVariant::Scatter(c) => c as &dyn ChartOptionBuilder,
            ChartVariant::Histogram(c) => c as &dyn ChartOptionBuilder,
        }
    }

    pub fn option(&self) -> Result<&ChartOption> {
        if let Some(option) = self.option.get() {
            return Ok(option);
        }
        let built = self.builder().build_option()?;
        log::debug!("built chart option '{}'", built.title);
        Ok(self.option.get_or_init(|| built))
    }
}
