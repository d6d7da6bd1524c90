// File: crates/logbook-core/src/chart/material.rs
// Summary: Candlestick and line options: material-scoped value axis and a period-aligned time axis.

use serde_json::Value as Json;

use super::{default_threshold, set_baseline, set_option, set_ticks, ChartOption, ChartOptionBuilder, Direction};
use crate::configuration::Section;
use crate::error::{ChartError, Result};
use crate::period::{epoch_millis, parse_timestamp, Period};
use crate::rules::Material;
use crate::table::{CandlestickTable, Edge, LineTable, Table};

const DATE_TIME: &str = "DateTime";

/// `chart.Material.<kind>.<axis>` over `chart.Material.<axis>`.
fn material_axis(table: &Table<'_>, kind: &str, direction: Direction) -> Option<Section> {
    table
        .context()
        .configuration
        .cascade(&format!("chart.Material.{kind}.{}", direction.key()), &format!("chart.Material.{}", direction.key()))
}

/// Time-axis bound: a configured date string or epoch milliseconds, else the
/// table's extreme period, truncated to `period`.
fn time_threshold(table: &Table<'_>, axis: &Section, edge: Edge, period: Period) -> Result<Option<f64>> {
    let millis = match axis.get(edge.key()) {
        Some(Json::String(text)) => Some(epoch_millis(parse_timestamp(text)?)),
        Some(Json::Number(n)) => n.as_f64(),
        None | Some(Json::Null) => table.extreme(DATE_TIME, edge)?,
        Some(other) => {
            return Err(ChartError::invalid_configuration(
                axis.key_path(edge.key()),
                format!("expected a date or epoch milliseconds, found {other}"),
            ))
        }
    };
    Ok(millis.and_then(|m| period.truncate_millis(m)))
}

/// Axes shared by both material charts.
fn build_material_axes<C: ChartOptionBuilder + ?Sized>(chart: &C, kind: &str) -> Result<ChartOption> {
    let table = chart.table();
    let mut option = ChartOption::new(table.title()?);

    let vertical = material_axis(table, kind, Direction::Vertical);
    if chart.set_threshold(&mut option, vertical.as_ref(), Direction::Vertical, kind)? {
        if let Some(axis) = &vertical {
            set_ticks(&mut option, Direction::Vertical, axis.number("step"))?;
            set_baseline(&mut option, Direction::Vertical, axis);
        }
    }

    let horizontal = material_axis(table, kind, Direction::Horizontal);
    chart.set_threshold(&mut option, horizontal.as_ref(), Direction::Horizontal, DATE_TIME)?;
    Ok(option)
}

pub struct CandlestickChart<'t, 'a> {
    table: &'t Table<'a>,
    material: Material,
    period: Period,
}

impl<'t, 'a> CandlestickChart<'t, 'a> {
    pub(crate) fn new(table: &'t Table<'a>, candles: &CandlestickTable<'a>) -> Self {
        Self { table, material: candles.material(), period: candles.period() }
    }
}

impl ChartOptionBuilder for CandlestickChart<'_, '_> {
    fn table(&self) -> &Table<'_> {
        self.table
    }

    fn build_option(&self) -> Result<ChartOption> {
        let mut option = build_material_axes(self, self.material.name())?;
        set_option(
            &mut option.extra,
            "hollowIsRising",
            self.table.context().configuration,
            &format!("chart.Candlestick.{}.hollowIsRising", self.material.name()),
            Some("chart.Candlestick.hollowIsRising"),
        );
        Ok(option)
    }

    fn threshold(&self, axis: &Section, direction: Direction, edge: Edge, kind: &str) -> Result<Option<f64>> {
        match direction {
            Direction::Vertical => default_threshold(self.table, axis, edge, kind),
            Direction::Horizontal => time_threshold(self.table, axis, edge, self.period),
        }
    }
}

pub struct LineChart<'t, 'a> {
    table: &'t Table<'a>,
    kind: String,
    opposite: Option<Material>,
    period: Period,
}

impl<'t, 'a> LineChart<'t, 'a> {
    pub(crate) fn new(table: &'t Table<'a>, lines: &LineTable<'a>) -> Self {
        Self { table, kind: lines.kind().to_string(), opposite: lines.opposite(), period: lines.period() }
    }
}

impl ChartOptionBuilder for LineChart<'_, '_> {
    fn table(&self) -> &Table<'_> {
        self.table
    }

    fn build_option(&self) -> Result<ChartOption> {
        let mut option = build_material_axes(self, &self.kind)?;
        // the opposite series is drawn against its own scale
        let opposing = self
            .opposite
            .and_then(|m| material_axis(self.table, m.name(), Direction::Vertical))
            .and_then(|axis| axis.number(Edge::Minimum.key()));
        if let Some(baseline) = opposing {
            option.axis_mut(Direction::Vertical).opposing_baseline = Some(baseline);
        }
        Ok(option)
    }

    fn threshold(&self, axis: &Section, direction: Direction, edge: Edge, kind: &str) -> Result<Option<f64>> {
        match direction {
            Direction::Vertical => default_threshold(self.table, axis, edge, kind),
            Direction::Horizontal => time_threshold(self.table, axis, edge, self.period),
        }
    }
}
