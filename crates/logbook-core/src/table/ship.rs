// File: crates/logbook-core/src/table/ship.rs
// Summary: Ship roster tables: per-classification scatter/histogram slots and bubble aggregates.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value as Json;

use super::{display_value, group_thousands, Cell, Column, ColumnType, Edge, Row, Source, TableBuilder};
use crate::context::Context;
use crate::directive::{ensure_directive_validated, Directive, Skill, SortOrder};
use crate::error::{ChartError, Result};
use crate::relation::{Attribute, Relation, Tuple, Value};

const SHIPS_GROUP: &str = "Ships";
const BUBBLE_GROUP: &str = "Bubble";
const ORDER: &str = "Order";

/// Ships at or below this level are left out of every ship chart.
fn mothball_level(context: Context<'_>) -> f64 {
    context.configuration.number("chart.Ship.mothball").unwrap_or(0.0)
}

fn is_mothballed(tuple: &Tuple, level_at: usize, mothball: f64) -> bool {
    tuple[level_at].as_number().map_or(true, |level| level <= mothball)
}

/// Column label for a classification: its abbreviation or full name.
fn classification_labels(context: Context<'_>) -> Vec<String> {
    let abbreviate = context.configuration.flag("chart.Ship.abbreviate", true);
    context
        .rules
        .ship_classes
        .iter()
        .map(|c| if abbreviate { c.abbreviation.clone() } else { c.name.clone() })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShipLayout {
    /// Order column followed by one slot per classification.
    Scatter,
    /// One slot per classification only.
    Histogram,
}

/// One row per ship with its skill value in the slot of its classification.
pub struct ShipTable<'a> {
    source: Source<'a>,
    directive: Directive,
    layout: ShipLayout,
    skill: Skill,
    order: Option<SortOrder>,
    canonical: Relation,
    mothball: f64,
}

impl<'a> ShipTable<'a> {
    pub fn new(layout: ShipLayout, relation: &'a Relation, directive: Directive, context: Context<'a>) -> Result<Self> {
        let no_options: [&str; 0] = [];
        match layout {
            ShipLayout::Scatter => ensure_directive_validated(&directive, &Skill::NAMES, &SortOrder::NAMES)?,
            ShipLayout::Histogram => ensure_directive_validated(&directive, &Skill::NAMES, &no_options)?,
        }
        let skill = directive.kind.parse()?;
        let order = directive.option.as_deref().map(str::parse).transpose()?;

        let mut canonical = relation.clone();
        if order == Some(SortOrder::Experiences) {
            let experience_at = relation.position(Attribute::Experience)?;
            let level_at = relation.position(Attribute::Level)?;
            // experience saturates below the true top level, so equal
            // experience must still rank the higher level first
            canonical.sort_by(|a, b| {
                b[experience_at]
                    .compare(&a[experience_at])
                    .then_with(|| b[level_at].compare(&a[level_at]))
            });
        }

        Ok(Self {
            source: Source::new(relation, context)?,
            directive,
            layout,
            skill,
            order,
            canonical,
            mothball: mothball_level(context),
        })
    }

    pub fn skill(&self) -> Skill {
        self.skill
    }

    pub fn layout(&self) -> ShipLayout {
        self.layout
    }

    pub fn order(&self) -> Option<SortOrder> {
        self.order
    }

    /// Tuples in row order (sorted for `Experiences` ordering).
    pub fn canonical(&self) -> &Relation {
        &self.canonical
    }

    fn offset(&self) -> usize {
        match self.layout {
            ShipLayout::Scatter => 1,
            ShipLayout::Histogram => 0,
        }
    }

    fn order_label(&self) -> Result<String> {
        let template = self.source.legend(SHIPS_GROUP, "order")?;
        let option = self.order.unwrap_or(SortOrder::Arrival);
        let name = self.source.legend(SHIPS_GROUP, option.name())?;
        Ok(template.replace("{}", &name))
    }

    /// Skill value of every ship that gets a plotted row: not mothballed and
    /// of a known classification.
    fn roster_values(&self, skill: Skill) -> Result<Vec<f64>> {
        let level_at = self.canonical.position(Attribute::Level)?;
        let classification_at = self.canonical.position(Attribute::Classification)?;
        let value_at = self.canonical.position(skill.attribute())?;
        let rules = self.source.context.rules;
        Ok(self
            .canonical
            .iter()
            .filter(|t| !is_mothballed(t, level_at, self.mothball))
            .filter(|t| {
                t[classification_at]
                    .as_text()
                    .is_some_and(|c| rules.ship_class_position(c).is_some())
            })
            .filter_map(|t| t[value_at].as_number())
            .collect())
    }

    /// Rejects `Order` on layouts without an order column.
    fn order_extreme(&self, value: f64) -> Result<Option<f64>> {
        if self.layout != ShipLayout::Scatter {
            return Err(ChartError::invalid_specification(ORDER, &Skill::NAMES));
        }
        Ok((!self.canonical.is_empty()).then_some(value))
    }

    fn ship_row(&self, index: usize, tuple: &Tuple, positions: &ShipPositions) -> Row {
        if is_mothballed(tuple, positions.level, self.mothball) {
            return Vec::new();
        }
        let classification = tuple[positions.classification].as_text().unwrap_or_default();
        let Some(slot) = self.source.context.rules.ship_class_position(classification) else {
            log::warn!("ship {} has unknown classification '{}'", display_value(&tuple[positions.id]), classification);
            return Vec::new();
        };

        let class_count = self.source.context.rules.ship_classes.len();
        let mut row = Vec::with_capacity(self.offset() + class_count);
        if self.layout == ShipLayout::Scatter {
            let order = index + 1;
            row.push(Cell::Formatted {
                v: order as f64,
                f: format!("{order}. #{}", display_value(&tuple[positions.id])),
            });
        }
        row.extend(std::iter::repeat(Cell::Null).take(class_count));

        let value = match tuple[positions.skill].as_number() {
            Some(v) => v,
            None => return row,
        };
        let mut label = format!("{} Lv.{}", display_value(&tuple[positions.name]), display_value(&tuple[positions.level]));
        if self.skill == Skill::Experiences {
            label.push_str(&format!(" ({})", group_thousands(value)));
        }
        row[self.offset() + slot] = Cell::Formatted { v: value, f: label };
        row
    }
}

struct ShipPositions {
    id: usize,
    name: usize,
    classification: usize,
    level: usize,
    skill: usize,
}

impl TableBuilder for ShipTable<'_> {
    fn directive(&self) -> &Directive {
        &self.directive
    }

    fn build_columns(&self) -> Result<Vec<Column>> {
        let mut columns = Vec::new();
        if self.layout == ShipLayout::Scatter {
            columns.push(Column::number(self.order_label()?));
        }
        columns.extend(classification_labels(self.source.context).into_iter().map(Column::number));
        Ok(columns)
    }

    fn build_rows(&self) -> Result<Vec<Row>> {
        self.source.ensure_nonempty()?;
        let relation = &self.canonical;
        let positions = ShipPositions {
            id: relation.position(Attribute::Id)?,
            name: relation.position(Attribute::Name)?,
            classification: relation.position(Attribute::Classification)?,
            level: relation.position(Attribute::Level)?,
            skill: relation.position(self.skill.attribute())?,
        };
        Ok(relation
            .iter()
            .enumerate()
            .map(|(i, tuple)| self.ship_row(i, tuple, &positions))
            .collect())
    }

    fn build_title(&self) -> Result<String> {
        self.source.title(SHIPS_GROUP)
    }

    fn series_indices(&self, kind: &str, _edge: Edge) -> Result<Vec<usize>> {
        if kind == self.skill.name() {
            let offset = self.offset();
            return Ok((offset..offset + self.source.context.rules.ship_classes.len()).collect());
        }
        if kind == ORDER && self.layout == ShipLayout::Scatter {
            return Ok(vec![0]);
        }
        Err(ChartError::invalid_specification(kind, &[self.skill.name(), ORDER]))
    }

    /// Scans the roster rather than the rendered rows. A level maximum is
    /// raised by one so fractional progress toward the next level stays in range.
    fn maximum(&self, _rows: &[Row], kind: &str) -> Result<Option<f64>> {
        if kind == ORDER {
            return self.order_extreme(self.canonical.count() as f64);
        }
        let skill: Skill = kind
            .parse()
            .map_err(|_| ChartError::invalid_specification(kind, &[Skill::NAMES[0], Skill::NAMES[1], ORDER]))?;
        let highest = self.roster_values(skill)?.into_iter().reduce(f64::max);
        Ok(match skill {
            Skill::Experiences => highest,
            Skill::Levels => {
                let saturated = self.source.context.rules.experience.level_count() as f64;
                highest.map(|level| if level >= saturated { level } else { level + 1.0 })
            }
        })
    }

    fn minimum(&self, _rows: &[Row], kind: &str) -> Result<Option<f64>> {
        if kind == ORDER {
            return self.order_extreme(1.0);
        }
        let skill: Skill = kind
            .parse()
            .map_err(|_| ChartError::invalid_specification(kind, &[Skill::NAMES[0], Skill::NAMES[1], ORDER]))?;
        Ok(self.roster_values(skill)?.into_iter().reduce(f64::min))
    }
}

/// Columns of the bubble table, in row order.
const BUBBLE_COLUMNS: [&str; 5] =
    ["Classification", "TotalShipNumber", "AverageLevel", "PracticalRate", "PracticalShipNumber"];

/// Per-classification totals, average level and practical-ship rate.
pub struct BubbleTable<'a> {
    source: Source<'a>,
    directive: Directive,
    mothball: f64,
    practical: f64,
    backup: HashSet<String>,
}

impl<'a> BubbleTable<'a> {
    pub fn new(relation: &'a Relation, directive: Directive, context: Context<'a>) -> Result<Self> {
        let no_options: [&str; 0] = [];
        ensure_directive_validated(&directive, &[Skill::Levels.name()], &no_options)?;
        let backup = backup_ids(context)?;
        Ok(Self {
            source: Source::new(relation, context)?,
            directive,
            mothball: mothball_level(context),
            practical: context.configuration.number("chart.Ship.practical").unwrap_or(0.0),
            backup,
        })
    }

    /// Levels grouped by classification position. Only classifications with at
    /// least one eligible ship get an entry.
    pub fn roster(&self) -> Result<BTreeMap<usize, Vec<f64>>> {
        let relation = self.source.relation;
        let id_at = relation.position(Attribute::Id)?;
        let classification_at = relation.position(Attribute::Classification)?;
        let level_at = relation.position(Attribute::Level)?;
        let rules = self.source.context.rules;

        let mut roster: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
        for tuple in relation {
            if self.backup.contains(&display_value(&tuple[id_at])) || is_mothballed(tuple, level_at, self.mothball) {
                continue;
            }
            let (Some(classification), Some(level)) = (tuple[classification_at].as_text(), tuple[level_at].as_number())
            else {
                continue;
            };
            match rules.ship_class_position(classification) {
                Some(slot) => roster.entry(slot).or_default().push(level),
                None => log::warn!("ship {} has unknown classification '{}'", display_value(&tuple[id_at]), classification),
            }
        }
        Ok(roster)
    }
}

impl TableBuilder for BubbleTable<'_> {
    fn directive(&self) -> &Directive {
        &self.directive
    }

    fn build_columns(&self) -> Result<Vec<Column>> {
        BUBBLE_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let column_type = if i == 0 { ColumnType::String } else { ColumnType::Number };
                Ok(Column::new(column_type, self.source.legend(BUBBLE_GROUP, key)?))
            })
            .collect()
    }

    fn build_rows(&self) -> Result<Vec<Row>> {
        self.source.ensure_nonempty()?;
        let labels = classification_labels(self.source.context);
        Ok(self
            .roster()?
            .into_iter()
            .map(|(slot, levels)| {
                let total = levels.len() as f64;
                let average = (levels.iter().sum::<f64>() / total).round();
                let practical = levels.iter().filter(|&&l| l >= self.practical).count() as f64;
                let rate = practical / total;
                vec![
                    Cell::Text(labels[slot].clone()),
                    Cell::Number(total),
                    Cell::Number(average),
                    Cell::Formatted { v: rate, f: format!("{}%", (rate * 100.0).round()) },
                    Cell::Number(practical),
                ]
            })
            .collect())
    }

    fn build_title(&self) -> Result<String> {
        self.source.title(BUBBLE_GROUP)
    }

    fn series_indices(&self, kind: &str, _edge: Edge) -> Result<Vec<usize>> {
        match kind {
            "TotalShipNumber" => Ok(vec![1]),
            "AverageLevel" => Ok(vec![2]),
            _ => Err(ChartError::invalid_specification(kind, &["TotalShipNumber", "AverageLevel"])),
        }
    }
}

/// Ship IDs kept in reserve (`chart.Ship.backup`), compared by display form.
fn backup_ids(context: Context<'_>) -> Result<HashSet<String>> {
    const KEY: &str = "chart.Ship.backup";
    match context.configuration.get_optional(KEY) {
        None | Some(Json::Null) => Ok(HashSet::new()),
        Some(Json::Array(ids)) => ids
            .iter()
            .map(|id| match id {
                Json::Number(n) => Ok(n.as_f64().map(|f| display_value(&Value::Number(f))).unwrap_or_else(|| n.to_string())),
                Json::String(s) => Ok(s.clone()),
                other => Err(ChartError::invalid_configuration(KEY, format!("unexpected ship id {other}"))),
            })
            .collect(),
        Some(other) => Err(ChartError::invalid_configuration(KEY, format!("expected an array, found {other}"))),
    }
}
