// File: crates/logbook-core/src/table/material.rs
// Summary: Material tables: period-bucketed OHLC candles and multi-series stockpile lines.

use chrono::NaiveDateTime;
use serde_json::Value as Json;

use super::{Cell, Column, ColumnType, Edge, Row, Source, TableBuilder};
use crate::context::Context;
use crate::directive::{ensure_directive_validated, Directive};
use crate::error::{ChartError, Result};
use crate::period::{epoch_millis, format_locale, Period};
use crate::relation::{Attribute, Relation, Value};
use crate::rules::Material;

const MATERIALS_GROUP: &str = "Materials";
const DATE_TIME: &str = "DateTime";

/// `[period, low, open, close, high]` per period for one material.
pub struct CandlestickTable<'a> {
    source: Source<'a>,
    directive: Directive,
    material: Material,
    period: Period,
}

/// In-progress candle of the bucketing fold.
#[derive(Clone, Copy, Debug)]
struct Bucket {
    key: NaiveDateTime,
    low: f64,
    open: f64,
    close: f64,
    high: f64,
}

impl Bucket {
    fn start(key: NaiveDateTime, value: f64) -> Self {
        Self { key, low: value, open: value, close: value, high: value }
    }

    fn update(&mut self, value: f64) {
        self.low = self.low.min(value);
        self.close = value;
        self.high = self.high.max(value);
    }
}

impl<'a> CandlestickTable<'a> {
    pub fn new(relation: &'a Relation, directive: Directive, context: Context<'a>) -> Result<Self> {
        ensure_directive_validated(&directive, &Material::names(), &Period::names())?;
        let material = directive.kind.parse()?;
        let period = period_of(&directive)?;
        Ok(Self { source: Source::new(relation, context)?, directive, material, period })
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn period(&self) -> Period {
        self.period
    }

    fn candle(&self, bucket: Bucket) -> Result<Row> {
        let label = format_locale(bucket.key, self.source.context.configuration, &self.source.locale)?;
        Ok(vec![
            Cell::Formatted { v: epoch_millis(bucket.key), f: label },
            Cell::Number(bucket.low),
            Cell::Number(bucket.open),
            Cell::Number(bucket.close),
            Cell::Number(bucket.high),
        ])
    }
}

impl TableBuilder for CandlestickTable<'_> {
    fn directive(&self) -> &Directive {
        &self.directive
    }

    fn build_columns(&self) -> Result<Vec<Column>> {
        Ok(Vec::new())
    }

    fn build_rows(&self) -> Result<Vec<Row>> {
        self.source.ensure_nonempty()?;
        let relation = self.source.relation;
        let value_at = relation.position(Attribute::Material(self.material))?;
        let time_at = relation.position(Attribute::DateTime)?;

        let mut sorted = relation.clone();
        sorted.sort_by(|a, b| a[time_at].compare(&b[time_at]));

        let mut rows = Vec::new();
        let mut current: Option<Bucket> = None;
        for tuple in &sorted {
            // a null reading is a collection gap: it neither opens nor closes a bucket
            let (Some(t), Some(value)) = (tuple[time_at].as_date_time(), tuple[value_at].as_number()) else {
                continue;
            };
            let key = self.period.truncate(t);
            if let Some(bucket) = current.as_mut().filter(|b| b.key == key) {
                bucket.update(value);
                continue;
            }
            if let Some(done) = current.replace(Bucket::start(key, value)) {
                rows.push(self.candle(done)?);
            }
        }
        if let Some(done) = current {
            rows.push(self.candle(done)?);
        }
        Ok(rows)
    }

    fn build_title(&self) -> Result<String> {
        let title = self.source.title(MATERIALS_GROUP)?;
        let name = self.source.legend(MATERIALS_GROUP, self.material.name())?;
        Ok(format!("{title} ({name})"))
    }

    fn series_indices(&self, kind: &str, edge: Edge) -> Result<Vec<usize>> {
        if kind == DATE_TIME {
            return Ok(vec![0]);
        }
        if kind != self.material.name() {
            return Err(ChartError::invalid_specification(kind, &[self.material.name(), DATE_TIME]));
        }
        Ok(match edge {
            Edge::Maximum => vec![4],
            Edge::Minimum => vec![1],
        })
    }
}

/// Timestamp plus one series per material of a kind (and an optional opposite series).
pub struct LineTable<'a> {
    source: Source<'a>,
    directive: Directive,
    materials: Vec<Material>,
    opposite: Option<Material>,
    period: Period,
}

impl<'a> LineTable<'a> {
    pub fn new(relation: &'a Relation, directive: Directive, context: Context<'a>) -> Result<Self> {
        let rules = context.rules;
        ensure_directive_validated(&directive, &rules.material_kind_names(), &Period::names())?;
        let materials = rules.materials_of(&directive.kind)?;
        let period = period_of(&directive)?;
        let opposite = if directive.kind == "Resources" {
            opposite_of(context)?.filter(|m| !materials.contains(m))
        } else {
            None
        };
        Ok(Self { source: Source::new(relation, context)?, directive, materials, opposite, period })
    }

    pub fn kind(&self) -> &str {
        &self.directive.kind
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn opposite(&self) -> Option<Material> {
        self.opposite
    }

    pub fn period(&self) -> Period {
        self.period
    }

    fn is_group(&self) -> bool {
        self.source.context.rules.material_group(self.kind()).is_some()
    }
}

impl TableBuilder for LineTable<'_> {
    fn directive(&self) -> &Directive {
        &self.directive
    }

    fn build_columns(&self) -> Result<Vec<Column>> {
        let mut columns = vec![Column::new(ColumnType::DateTime, self.source.legend(MATERIALS_GROUP, DATE_TIME)?)];
        for m in self.materials.iter().chain(self.opposite.iter()) {
            columns.push(Column::number(self.source.legend(MATERIALS_GROUP, m.name())?));
        }
        Ok(columns)
    }

    fn build_rows(&self) -> Result<Vec<Row>> {
        self.source.ensure_nonempty()?;
        let extra: Vec<&str> = self.opposite.iter().map(|m| m.name()).collect();
        let indices = self
            .source
            .relation
            .indices_of(self.kind(), true, &extra, self.source.context.rules)?;
        let projected = self.source.relation.project(&indices)?;

        projected
            .iter()
            .map(|tuple| -> Result<Row> {
                let mut row = Vec::with_capacity(tuple.len());
                row.push(match &tuple[0] {
                    Value::DateTime(t) => Cell::Formatted {
                        v: epoch_millis(*t),
                        f: format_locale(*t, self.source.context.configuration, &self.source.locale)?,
                    },
                    _ => Cell::Null,
                });
                row.extend(tuple[1..].iter().map(Cell::from_value));
                Ok(row)
            })
            .collect()
    }

    fn build_title(&self) -> Result<String> {
        if self.is_group() {
            return self.source.title(self.kind());
        }
        let title = self.source.title(MATERIALS_GROUP)?;
        let name = self.source.legend(MATERIALS_GROUP, self.kind())?;
        Ok(format!("{title} ({name})"))
    }

    fn series_indices(&self, kind: &str, _edge: Edge) -> Result<Vec<usize>> {
        if kind == DATE_TIME {
            return Ok(vec![0]);
        }
        if kind == self.kind() {
            return Ok((1..=self.materials.len()).collect());
        }
        if let Some(i) = self.materials.iter().position(|m| m.name() == kind) {
            return Ok(vec![i + 1]);
        }
        match self.opposite {
            Some(m) if m.name() == kind => Ok(vec![self.materials.len() + 1]),
            _ => {
                let mut valid = vec![DATE_TIME.to_string(), self.kind().to_string()];
                valid.extend(self.materials.iter().chain(self.opposite.iter()).map(|m| m.name().to_string()));
                Err(ChartError::invalid_specification(kind, &valid))
            }
        }
    }
}

fn period_of(directive: &Directive) -> Result<Period> {
    directive
        .option
        .as_deref()
        .ok_or_else(|| ChartError::invalid_directive("<none>", &Period::names()))?
        .parse()
}

/// Opposite series for the resources line: `Repair` unless configured otherwise
/// or disabled with `false`/`null`.
fn opposite_of(context: Context<'_>) -> Result<Option<Material>> {
    const KEY: &str = "chart.Material.opposite";
    match context.configuration.get_optional(KEY) {
        None => Ok(Some(Material::Repair)),
        Some(Json::Null) | Some(Json::Bool(false)) => Ok(None),
        Some(Json::String(name)) => name.parse().map(Some),
        Some(other) => Err(ChartError::invalid_configuration(KEY, format!("expected a material name, found {other}"))),
    }
}
