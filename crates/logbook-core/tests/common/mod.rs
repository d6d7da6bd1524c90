// File: crates/logbook-core/tests/common/mod.rs
// Purpose: Shared fixtures: a full configuration tree, default rules, and relation builders.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use logbook_core::{Attribute, Configuration, Context, DomainRules, Material, Relation, Value};
use serde_json::json;

/// Configuration covering every legend and chart section the pipeline reads.
pub fn configuration_value() -> serde_json::Value {
    json!({
        "locale": "en",
        "format": { "en": { "dateTime": "%Y-%m-%d" } },
        "legend": {
            "en": {
                "Materials": {
                    "title": "Materials",
                    "DateTime": "Date",
                    "Fuel": "Fuel",
                    "Ammunition": "Ammunition",
                    "Steel": "Steel",
                    "Bauxite": "Bauxite",
                    "Repair": "Instant Repair",
                    "Construction": "Instant Construction",
                    "Development": "Development Material",
                    "Improvement": "Improvement Material"
                },
                "Resources": { "title": "Resources" },
                "Consumables": { "title": "Consumables" },
                "Ships": {
                    "title": "Ships",
                    "order": "Order of {}",
                    "Arrival": "arrival",
                    "Experiences": "experience"
                },
                "Bubble": {
                    "title": "Fleet composition",
                    "Classification": "Classification",
                    "TotalShipNumber": "Ships",
                    "AverageLevel": "Average level",
                    "PracticalRate": "Practical rate",
                    "PracticalShipNumber": "Practical ships"
                }
            }
        },
        "chart": {
            "Material": {
                "vertical": { "minimum": 0, "step": 100 },
                "Repair": { "vertical": { "minimum": 0, "maximum": 3000 } }
            },
            "Ship": {
                "mothball": 5,
                "practical": 15,
                "vertical": { "step": 10 },
                "Experiences": { "vertical": { "minimum": 1, "maximum": 10, "step": 2, "minorGridlines": 1 } }
            },
            "Candlestick": { "hollowIsRising": true },
            "Scatter": { "continuous": false },
            "Histogram": { "bucketSize": 5 }
        }
    })
}

pub fn configuration() -> Configuration {
    Configuration::from_value(configuration_value())
}

/// Configuration with `patch` applied at a dotted `path`, creating objects as needed.
pub fn configuration_with(path: &str, patch: serde_json::Value) -> Configuration {
    configuration_patched(&[(path, patch)])
}

pub fn configuration_patched(patches: &[(&str, serde_json::Value)]) -> Configuration {
    let mut root = configuration_value();
    for (path, patch) in patches {
        let segments: Vec<&str> = path.split('.').collect();
        let (last, parents) = segments.split_last().expect("non-empty path");
        let mut node = &mut root;
        for key in parents {
            node = node
                .as_object_mut()
                .expect("object node")
                .entry(key.to_string())
                .or_insert_with(|| json!({}));
        }
        node.as_object_mut().expect("object node").insert(last.to_string(), patch.clone());
    }
    Configuration::from_value(root)
}

pub fn rules() -> DomainRules {
    DomainRules::default()
}

pub fn context<'a>(configuration: &'a Configuration, rules: &'a DomainRules) -> Context<'a> {
    Context::new(configuration, rules)
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid timestamp")
}

/// `DateTime` plus the four resources and `Repair`, one tuple per reading.
pub fn resource_log(readings: &[(NaiveDateTime, [Option<f64>; 5])]) -> Relation {
    let attributes = vec![
        Attribute::DateTime,
        Attribute::Material(Material::Fuel),
        Attribute::Material(Material::Ammunition),
        Attribute::Material(Material::Steel),
        Attribute::Material(Material::Bauxite),
        Attribute::Material(Material::Repair),
    ];
    let tuples = readings
        .iter()
        .map(|(t, values)| {
            let mut tuple = vec![Value::DateTime(*t)];
            tuple.extend(values.iter().map(|v| Value::from(*v)));
            tuple
        })
        .collect();
    Relation::new(attributes, tuples).expect("resource relation")
}

/// `DateTime` and a single material column.
pub fn material_log(material: Material, readings: &[(NaiveDateTime, Option<f64>)]) -> Relation {
    let tuples = readings
        .iter()
        .map(|(t, v)| vec![Value::DateTime(*t), Value::from(*v)])
        .collect();
    Relation::new(vec![Attribute::DateTime, Attribute::Material(material)], tuples).expect("material relation")
}

/// Roster row: (id, name, classification, level, experience).
pub type Ship<'s> = (f64, &'s str, &'s str, f64, f64);

pub fn roster(ships: &[Ship<'_>]) -> Relation {
    let attributes = vec![
        Attribute::Id,
        Attribute::Name,
        Attribute::Classification,
        Attribute::Level,
        Attribute::Experience,
    ];
    let tuples = ships
        .iter()
        .map(|&(id, name, classification, level, experience)| {
            vec![
                Value::Number(id),
                Value::from(name),
                Value::from(classification),
                Value::Number(level),
                Value::Number(experience),
            ]
        })
        .collect();
    Relation::new(attributes, tuples).expect("roster relation")
}
