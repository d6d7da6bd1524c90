// File: crates/logbook-core/src/lib.rs
// Summary: Core library entry point; exports the relation, table and chart pipeline.

pub mod chart;
pub mod configuration;
pub mod context;
pub mod directive;
pub mod error;
pub mod period;
pub mod relation;
pub mod rules;
pub mod table;

use serde::Serialize;

pub use chart::{AxisOption, Chart, ChartOption, ChartOptionBuilder, Direction};
pub use configuration::{Configuration, Section};
pub use context::Context;
pub use directive::{ChartKind, Directive, Skill, SortOrder};
pub use error::{ChartError, Result};
pub use period::Period;
pub use relation::{Attribute, Relation, Tuple, Value};
pub use rules::{DomainRules, ExperienceTable, Material, MaterialGroup, ShipClass};
pub use table::{Cell, Column, ColumnType, Edge, Row, Table, TableBuilder, TableData};

/// Everything a renderer needs for one chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Rendering {
    pub table: TableData,
    pub option: ChartOption,
}

/// Build the table and chart option of `kind` for `directive` in one pass.
pub fn render(relation: &Relation, kind: ChartKind, directive: Directive, context: Context<'_>) -> Result<Rendering> {
    let table = Table::new(kind, relation, directive, context)?;
    let chart = Chart::new(&table);
    let option = chart.option()?.clone();
    Ok(Rendering { table: table.data()?, option })
}
