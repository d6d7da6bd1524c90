// File: crates/logbook-core/src/relation.rs
// Summary: In-memory relation of typed tuples with eager attribute -> position resolution.
// Notes:
// - Tables borrow a relation and clone it before any sort/projection, so one
//   relation can feed several charts.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;

use crate::error::{ChartError, Result};
use crate::rules::{DomainRules, Material};

/// Column of a relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    DateTime,
    Material(Material),
    Id,
    Name,
    Classification,
    Level,
    Experience,
}

impl Attribute {
    pub const fn name(&self) -> &'static str {
        match *self {
            Attribute::DateTime => "DateTime",
            Attribute::Material(m) => m.name(),
            Attribute::Id => "Id",
            Attribute::Name => "Name",
            Attribute::Classification => "Classification",
            Attribute::Level => "Level",
            Attribute::Experience => "Experience",
        }
    }

    /// Parse a canonical attribute name (`DateTime`, `Fuel`, `Level`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let fixed = [
            Attribute::DateTime,
            Attribute::Id,
            Attribute::Name,
            Attribute::Classification,
            Attribute::Level,
            Attribute::Experience,
        ];
        fixed
            .into_iter()
            .find(|a| a.name() == name)
            .or_else(|| name.parse::<Material>().ok().map(Attribute::Material))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cell of a tuple. `Null` marks an unrecorded value, not an error.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(t) => Some(*t),
            _ => None,
        }
    }

    /// Total order used when sorting: nulls first, then by payload.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Number(_) => 1,
            Value::DateTime(_) => 2,
            Value::Text(_) => 3,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Number(n) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Text(s.to_string()) }
}

impl From<NaiveDateTime> for Value {
    fn from(t: NaiveDateTime) -> Self { Value::DateTime(t) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self { v.map_or(Value::Null, Into::into) }
}

pub type Tuple = Vec<Value>;

/// Ordered tuples sharing one attribute layout.
/// Contract: every tuple has exactly `attributes().len()` values.
#[derive(Clone, Debug, PartialEq)]
pub struct Relation {
    attributes: Vec<Attribute>,
    positions: HashMap<Attribute, usize>,
    tuples: Vec<Tuple>,
}

impl Relation {
    pub fn new(attributes: Vec<Attribute>, tuples: Vec<Tuple>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(attributes.len());
        for (i, a) in attributes.iter().enumerate() {
            if positions.insert(*a, i).is_some() {
                let names: Vec<&str> = attributes.iter().map(|a| a.name()).collect();
                return Err(ChartError::invalid_specification(format!("duplicate {a}"), &names));
            }
        }
        let arity = attributes.len();
        if let Some(bad) = tuples.iter().position(|t| t.len() != arity) {
            let names: Vec<&str> = attributes.iter().map(|a| a.name()).collect();
            return Err(ChartError::invalid_specification(
                format!("tuple {bad} with {} of {arity} values", tuples[bad].len()),
                &names,
            ));
        }
        Ok(Self { attributes, positions, tuples })
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute_names(&self) -> Vec<&'static str> {
        self.attributes.iter().map(|a| a.name()).collect()
    }

    pub fn count(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tuple> {
        self.tuples.iter()
    }

    pub fn position(&self, attribute: Attribute) -> Result<usize> {
        self.positions
            .get(&attribute)
            .copied()
            .ok_or_else(|| ChartError::invalid_specification(attribute.name(), &self.attribute_names()))
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        match Attribute::from_name(name) {
            Some(a) => self.position(a),
            None => Err(ChartError::invalid_specification(name, &self.attribute_names())),
        }
    }

    /// Resolve an attribute or material group to positions, optionally
    /// preceded by the timestamp and followed by `extra` attributes.
    pub fn indices_of(
        &self,
        name_or_group: &str,
        include_date_time: bool,
        extra: &[&str],
        rules: &DomainRules,
    ) -> Result<Vec<usize>> {
        let mut indices = Vec::new();
        if include_date_time {
            indices.push(self.position(Attribute::DateTime)?);
        }
        match rules.material_group(name_or_group) {
            Some(group) => {
                for m in &group.members {
                    indices.push(self.position(Attribute::Material(*m))?);
                }
            }
            None => indices.push(self.index_of(name_or_group).map_err(|_| {
                let mut valid: Vec<String> = rules.material_groups.iter().map(|g| g.name.clone()).collect();
                valid.extend(self.attribute_names().into_iter().map(String::from));
                ChartError::invalid_specification(name_or_group, &valid)
            })?),
        }
        for name in extra {
            indices.push(self.index_of(name)?);
        }
        Ok(indices)
    }

    /// New relation holding only `indices`, in the given order.
    pub fn project(&self, indices: &[usize]) -> Result<Relation> {
        let attributes = indices
            .iter()
            .map(|&i| {
                self.attributes.get(i).copied().ok_or_else(|| {
                    ChartError::invalid_specification(i.to_string(), &self.attribute_names())
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let tuples = self
            .tuples
            .iter()
            .map(|t| indices.iter().map(|&i| t[i].clone()).collect())
            .collect();
        Relation::new(attributes, tuples)
    }

    /// Stable in-place sort. Only ever called on a clone.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Tuple, &Tuple) -> Ordering,
    {
        self.tuples.sort_by(compare);
    }
}

impl<'r> IntoIterator for &'r Relation {
    type Item = &'r Tuple;
    type IntoIter = std::slice::Iter<'r, Tuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.iter()
    }
}
