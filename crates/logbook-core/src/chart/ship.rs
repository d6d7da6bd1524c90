// File: crates/logbook-core/src/chart/ship.rs
// Summary: Ship chart options: bubble aggregates, roster scatter with level/experience axes, histogram.
// Notes:
// - Experience axes are configured in level space; bounds and ticks are mapped
//   through the experience table so gridlines stay evenly spaced by level.

use super::{
    build_ticks, default_threshold, set_baseline, set_option, set_ticks, ChartOption, ChartOptionBuilder, Direction,
};
use crate::configuration::Section;
use crate::directive::Skill;
use crate::error::Result;
use crate::table::{Edge, ShipTable, Table};

const ORDER: &str = "Order";
const MINOR_GRIDLINES: &str = "minorGridlines";

/// `chart.Ship.<kind>.<axis>` over `chart.Ship.<axis>`.
fn ship_axis(table: &Table<'_>, kind: &str, direction: Direction) -> Option<Section> {
    table
        .context()
        .configuration
        .cascade(&format!("chart.Ship.{kind}.{}", direction.key()), &format!("chart.Ship.{}", direction.key()))
}

pub struct BubbleChart<'t, 'a> {
    table: &'t Table<'a>,
}

impl<'t, 'a> BubbleChart<'t, 'a> {
    pub(crate) fn new(table: &'t Table<'a>) -> Self {
        Self { table }
    }
}

impl ChartOptionBuilder for BubbleChart<'_, '_> {
    fn table(&self) -> &Table<'_> {
        self.table
    }

    fn build_option(&self) -> Result<ChartOption> {
        let configuration = self.table.context().configuration;
        let mut option = ChartOption::new(self.table.title()?);
        let kind = &self.table.directive().kind;
        let axes = [
            (Direction::Vertical, configuration.cascade("chart.Bubble.vertical", "chart.Ship.vertical")),
            (Direction::Horizontal, configuration.section("chart.Bubble.horizontal")),
        ];
        for (direction, axis) in &axes {
            if self.set_threshold(&mut option, axis.as_ref(), *direction, kind)? {
                if let Some(axis) = axis {
                    set_ticks(&mut option, *direction, axis.number("step"))?;
                    set_baseline(&mut option, *direction, axis);
                }
            }
        }
        Ok(option)
    }

    /// Each axis is bound to its own column whatever kind is asked for.
    fn threshold(&self, axis: &Section, direction: Direction, edge: Edge, _kind: &str) -> Result<Option<f64>> {
        let column = match direction {
            Direction::Vertical => "AverageLevel",
            Direction::Horizontal => "TotalShipNumber",
        };
        default_threshold(self.table, axis, edge, column)
    }
}

pub struct ScatterChart<'t, 'a> {
    table: &'t Table<'a>,
    skill: Skill,
}

impl<'t, 'a> ScatterChart<'t, 'a> {
    pub(crate) fn new(table: &'t Table<'a>, ships: &ShipTable<'a>) -> Self {
        Self { table, skill: ships.skill() }
    }

    /// Experience ticks: `step` is divided by `1 + minorGridlines` in level
    /// space, then every tick is mapped to its experience.
    fn experience_ticks(&self, option: &mut ChartOption, axis: &Section) -> Result<()> {
        let Some(step) = axis.number("step") else {
            return Ok(());
        };
        let experience = &self.table.context().rules.experience;
        let resolved = option.axis_mut(Direction::Vertical);
        let level_bound = |edge: Edge, resolved: Option<f64>| {
            axis.number(edge.key()).or_else(|| resolved.map(|e| experience.level_at(e)))
        };
        let minimum = level_bound(Edge::Minimum, resolved.minimum);
        let maximum = level_bound(Edge::Maximum, resolved.maximum);
        if let (Some(minimum), Some(maximum)) = (minimum, maximum) {
            let minor = axis.number(MINOR_GRIDLINES).unwrap_or(0.0).max(0.0);
            resolved.ticks = Some(build_ticks(minimum, maximum, step / (1.0 + minor), Some(experience))?);
        }
        Ok(())
    }
}

impl ChartOptionBuilder for ScatterChart<'_, '_> {
    fn table(&self) -> &Table<'_> {
        self.table
    }

    fn build_option(&self) -> Result<ChartOption> {
        let configuration = self.table.context().configuration;
        let kind = self.skill.name();
        let mut option = ChartOption::new(self.table.title()?);

        let vertical = ship_axis(self.table, kind, Direction::Vertical);
        if self.set_threshold(&mut option, vertical.as_ref(), Direction::Vertical, kind)? {
            if let Some(axis) = &vertical {
                match self.skill {
                    Skill::Experiences => self.experience_ticks(&mut option, axis)?,
                    Skill::Levels => {
                        set_ticks(&mut option, Direction::Vertical, axis.number("step"))?;
                        if let Some(minor) = axis.get(MINOR_GRIDLINES) {
                            option.axis_mut(Direction::Vertical).extra.insert(MINOR_GRIDLINES.to_string(), minor.clone());
                        }
                    }
                }
                set_baseline(&mut option, Direction::Vertical, axis);
            }
        }

        let continuous = set_option(
            &mut option.extra,
            "continuous",
            configuration,
            &format!("chart.Scatter.{kind}.continuous"),
            Some("chart.Scatter.continuous"),
        );
        if continuous {
            let horizontal = configuration.section("chart.Ship.horizontal");
            if self.set_threshold(&mut option, horizontal.as_ref(), Direction::Horizontal, ORDER)? {
                let step = horizontal.as_ref().and_then(|axis| axis.number("step"));
                set_ticks(&mut option, Direction::Horizontal, step)?;
            }
        }
        Ok(option)
    }

    /// A configured experience bound is a level and is converted here. A maximum
    /// past the last tabulated level still covers the roster's highest experience.
    fn threshold(&self, axis: &Section, direction: Direction, edge: Edge, kind: &str) -> Result<Option<f64>> {
        if direction == Direction::Vertical && kind == Skill::Experiences.name() {
            if let Some(level) = axis.number(edge.key()) {
                let table = &self.table.context().rules.experience;
                let experience = table.experience_at(level);
                if edge == Edge::Maximum && level > table.level_count() as f64 {
                    let highest = self.table.extreme(kind, edge)?;
                    return Ok(Some(highest.map_or(experience, |h| h.max(experience))));
                }
                return Ok(Some(experience));
            }
        }
        default_threshold(self.table, axis, edge, kind)
    }
}

pub struct HistogramChart<'t, 'a> {
    table: &'t Table<'a>,
    skill: Skill,
}

impl<'t, 'a> HistogramChart<'t, 'a> {
    pub(crate) fn new(table: &'t Table<'a>, ships: &ShipTable<'a>) -> Self {
        Self { table, skill: ships.skill() }
    }
}

impl ChartOptionBuilder for HistogramChart<'_, '_> {
    fn table(&self) -> &Table<'_> {
        self.table
    }

    fn build_option(&self) -> Result<ChartOption> {
        let kind = self.skill.name();
        let mut option = ChartOption::new(self.table.title()?);
        let horizontal = ship_axis(self.table, kind, Direction::Horizontal);
        if self.set_threshold(&mut option, horizontal.as_ref(), Direction::Horizontal, kind)? {
            if let Some(axis) = &horizontal {
                set_ticks(&mut option, Direction::Horizontal, axis.number("step"))?;
                set_baseline(&mut option, Direction::Horizontal, axis);
            }
        }
        set_option(
            &mut option.extra,
            "bucketSize",
            self.table.context().configuration,
            &format!("chart.Histogram.{kind}.bucketSize"),
            Some("chart.Histogram.bucketSize"),
        );
        Ok(option)
    }
}
