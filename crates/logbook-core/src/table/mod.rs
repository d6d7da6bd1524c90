// File: crates/logbook-core/src/table/mod.rs
// Summary: Table abstraction: directive-validated columns/rows/title built from a borrowed relation.
// Notes:
// - Variants form a closed set (`TableVariant`); each implements `TableBuilder`.
// - Columns and rows are built on first access and memoized.

mod material;
mod ship;

use std::cell::OnceCell;

use serde::Serialize;

use crate::context::Context;
use crate::directive::{ChartKind, Directive};
use crate::error::{ChartError, Result};
use crate::relation::{Relation, Value};

pub use material::{CandlestickTable, LineTable};
pub use ship::{BubbleTable, ShipLayout, ShipTable};

/// One output cell. Serializes as `null`, a number, a string, or `{v, f}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Number(f64),
    Text(String),
    /// Value with its display label.
    Formatted { v: f64, f: String },
}

impl Cell {
    pub fn number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) | Cell::Formatted { v: n, .. } => Some(*n),
            _ => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Cell::Text(s) | Cell::Formatted { f: s, .. } => Some(s),
            _ => None,
        }
    }

    pub(crate) fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => Cell::Number(*n),
            Value::Text(s) => Cell::Text(s.clone()),
            Value::Null | Value::DateTime(_) => Cell::Null,
        }
    }
}

pub type Row = Vec<Cell>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
    DateTime,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Column {
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub label: String,
}

impl Column {
    pub fn new(column_type: ColumnType, label: impl Into<String>) -> Self {
        Self { column_type, label: label.into() }
    }

    pub fn number(label: impl Into<String>) -> Self {
        Self::new(ColumnType::Number, label)
    }
}

/// Which extreme of a series or axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Maximum,
    Minimum,
}

impl Edge {
    /// Configuration key holding an explicit bound for this edge.
    pub const fn key(self) -> &'static str {
        match self {
            Edge::Maximum => "maximum",
            Edge::Minimum => "minimum",
        }
    }
}

/// Serializable snapshot handed to the renderer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableData {
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

/// Capability shared by every table variant.
pub trait TableBuilder {
    fn directive(&self) -> &Directive;
    fn build_columns(&self) -> Result<Vec<Column>>;
    fn build_rows(&self) -> Result<Vec<Row>>;
    fn build_title(&self) -> Result<String>;

    /// Row positions holding the series named `kind` at `edge`.
    fn series_indices(&self, kind: &str, edge: Edge) -> Result<Vec<usize>>;

    fn maximum(&self, rows: &[Row], kind: &str) -> Result<Option<f64>> {
        Ok(scan_rows(rows, &self.series_indices(kind, Edge::Maximum)?, Edge::Maximum))
    }

    fn minimum(&self, rows: &[Row], kind: &str) -> Result<Option<f64>> {
        Ok(scan_rows(rows, &self.series_indices(kind, Edge::Minimum)?, Edge::Minimum))
    }
}

/// Extreme numeric value at `indices` across `rows`; empty rows and nulls are skipped.
pub fn scan_rows(rows: &[Row], indices: &[usize], edge: Edge) -> Option<f64> {
    rows.iter()
        .flat_map(|row| indices.iter().filter_map(move |&i| row.get(i).and_then(Cell::number)))
        .reduce(|a, b| match edge {
            Edge::Maximum => a.max(b),
            Edge::Minimum => a.min(b),
        })
}

/// Inputs every variant reads: the borrowed relation, the context and the resolved locale.
#[derive(Clone, Debug)]
pub(crate) struct Source<'a> {
    pub relation: &'a Relation,
    pub context: Context<'a>,
    pub locale: String,
}

impl<'a> Source<'a> {
    pub fn new(relation: &'a Relation, context: Context<'a>) -> Result<Self> {
        let locale = context.configuration.locale()?.to_string();
        Ok(Self { relation, context, locale })
    }

    pub fn ensure_nonempty(&self) -> Result<()> {
        if self.relation.count() == 0 {
            return Err(ChartError::EmptyRelation);
        }
        Ok(())
    }

    /// Required legend text at `legend.<locale>.<group>.<key>`.
    pub fn legend(&self, group: &str, key: &str) -> Result<String> {
        let path = format!("legend.{}.{}.{}", self.locale, group, key);
        self.context.configuration.text(&path).map(String::from)
    }

    pub fn title(&self, group: &str) -> Result<String> {
        self.legend(group, "title")
    }
}

pub enum TableVariant<'a> {
    Candlestick(CandlestickTable<'a>),
    Line(LineTable<'a>),
    Bubble(BubbleTable<'a>),
    Scatter(ShipTable<'a>),
    Histogram(ShipTable<'a>),
}

pub struct Table<'a> {
    variant: TableVariant<'a>,
    context: Context<'a>,
    columns: OnceCell<Vec<Column>>,
    rows: OnceCell<Vec<Row>>,
}

impl<'a> Table<'a> {
    /// Validate `directive` for `kind` and prepare the matching variant.
    pub fn new(kind: ChartKind, relation: &'a Relation, directive: Directive, context: Context<'a>) -> Result<Self> {
        let variant = match kind {
            ChartKind::Candlestick => TableVariant::Candlestick(CandlestickTable::new(relation, directive, context)?),
            ChartKind::Line => TableVariant::Line(LineTable::new(relation, directive, context)?),
            ChartKind::Bubble => TableVariant::Bubble(BubbleTable::new(relation, directive, context)?),
            ChartKind::Scatter => {
                TableVariant::Scatter(ShipTable::new(ShipLayout::Scatter, relation, directive, context)?)
            }
            ChartKind::Histogram => {
                TableVariant::Histogram(ShipTable::new(ShipLayout::Histogram, relation, directive, context)?)
            }
        };
        log::debug!("prepared {kind} table for {}", variant_builder(&variant).directive());
        Ok(Self { variant, context, columns: OnceCell::new(), rows: OnceCell::new() })
    }

    pub fn variant(&self) -> &TableVariant<'a> {
        &self.variant
    }

    pub fn context(&self) -> Context<'a> {
        self.context
    }

    pub fn directive(&self) -> &Directive {
        self.builder().directive()
    }

    fn builder(&self) -> &dyn TableBuilder {
        variant_builder(&self.variant)
    }

    pub fn columns(&self) -> Result<&[Column]> {
        if let Some(columns) = self.columns.get() {
            return Ok(columns);
        }
        let built = self.builder().build_columns()?;
        Ok(self.columns.get_or_init(|| built))
    }

    pub fn rows(&self) -> Result<&[Row]> {
        if let Some(rows) = self.rows.get() {
            return Ok(rows);
        }
        let built = self.builder().build_rows()?;
        log::debug!("built {} rows for {}", built.len(), self.directive());
        Ok(self.rows.get_or_init(|| built))
    }

    pub fn title(&self) -> Result<String> {
        self.builder().build_title()
    }

    pub fn maximum(&self, kind: &str) -> Result<Option<f64>> {
        self.builder().maximum(self.rows()?, kind)
    }

    pub fn minimum(&self, kind: &str) -> Result<Option<f64>> {
        self.builder().minimum(self.rows()?, kind)
    }

    pub fn extreme(&self, kind: &str, edge: Edge) -> Result<Option<f64>> {
        match edge {
            Edge::Maximum => self.maximum(kind),
            Edge::Minimum => self.minimum(kind),
        }
    }

    pub fn data(&self) -> Result<TableData> {
        Ok(TableData {
            title: self.title()?,
            columns: self.columns()?.to_vec(),
            rows: self.rows()?.to_vec(),
        })
    }
}

fn variant_builder<'t>(variant: &'t TableVariant<'_>) -> &'t dyn TableBuilder {
    match variant {
        TableVariant::Candlestick(t) => t as &dyn TableBuilder,
        TableVariant::Line(t) => t as &dyn TableBuilder,
        TableVariant::Bubble(t) => t as &dyn TableBuilder,
        TableVariant::Scatter(t) | TableVariant::Histogram(t) => t as &dyn TableBuilder,
    }
}

/// `1234567` -> `"1,234,567"`.
pub(crate) fn group_thousands(n: f64) -> String {
    let rounded = n.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Display form of an identifier-like value.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Text(s) => s.clone(),
        Value::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
        Value::Number(n) => n.to_string(),
        Value::DateTime(t) => t.to_string(),
    }
}
