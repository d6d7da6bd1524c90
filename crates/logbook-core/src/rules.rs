// File: crates/logbook-core/src/rules.rs
// Summary: Static domain lookups (materials and their groups, ship classifications, experience thresholds).

use std::fmt;
use std::str::FromStr;

use crate::error::{ChartError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Material {
    Fuel,
    Ammunition,
    Steel,
    Bauxite,
    Repair,
    Construction,
    Development,
    Improvement,
}

impl Material {
    pub const ALL: [Material; 8] = [
        Material::Fuel,
        Material::Ammunition,
        Material::Steel,
        Material::Bauxite,
        Material::Repair,
        Material::Construction,
        Material::Development,
        Material::Improvement,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Material::Fuel => "Fuel",
            Material::Ammunition => "Ammunition",
            Material::Steel => "Steel",
            Material::Bauxite => "Bauxite",
            Material::Repair => "Repair",
            Material::Construction => "Construction",
            Material::Development => "Development",
            Material::Improvement => "Improvement",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|m| m.name()).collect()
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Material {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| ChartError::invalid_specification(s, &Self::names()))
    }
}

/// Named group of materials, e.g. `Resources` = fuel, ammunition, steel, bauxite.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialGroup {
    pub name: String,
    pub members: Vec<Material>,
}

/// Ship classification with its short form (`DD`) and full name (`Destroyer`).
#[derive(Clone, Debug, PartialEq)]
pub struct ShipClass {
    pub abbreviation: String,
    pub name: String,
}

impl ShipClass {
    pub fn new(abbreviation: impl Into<String>, name: impl Into<String>) -> Self {
        Self { abbreviation: abbreviation.into(), name: name.into() }
    }
}

/// Experience needed to reach each level; index 0 is level 1.
/// Contract: non-empty and non-decreasing.
#[derive(Clone, Debug, PartialEq)]
pub struct ExperienceTable {
    thresholds: Vec<f64>,
}

impl ExperienceTable {
    pub fn new(thresholds: Vec<f64>) -> Result<Self> {
        if thresholds.is_empty() {
            return Err(ChartError::invalid_configuration("experience", "table is empty"));
        }
        if thresholds.windows(2).any(|w| w[1] < w[0]) {
            return Err(ChartError::invalid_configuration("experience", "table is not ascending"));
        }
        Ok(Self { thresholds })
    }

    /// Highest level the table describes.
    pub fn level_count(&self) -> usize {
        self.thresholds.len()
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Experience at a (possibly fractional) level, interpolating between
    /// neighbouring levels and clamping to the table range.
    pub fn experience_at(&self, level: f64) -> f64 {
        let last = self.thresholds.len() - 1;
        let index = (level - 1.0).clamp(0.0, last as f64);
        let lower = index.floor() as usize;
        if lower >= last {
            return self.thresholds[last];
        }
        let frac = index - lower as f64;
        let (a, b) = (self.thresholds[lower], self.thresholds[lower + 1]);
        a + (b - a) * frac
    }

    /// Inverse of [`experience_at`](Self::experience_at).
    pub fn level_at(&self, experience: f64) -> f64 {
        let t = &self.thresholds;
        let last = t.len() - 1;
        if experience.is_nan() || experience <= t[0] {
            return 1.0;
        }
        if experience >= t[last] {
            return t.len() as f64;
        }
        // first index whose threshold exceeds `experience`; always in 1..=last here
        let upper = t.partition_point(|&x| x <= experience);
        let lower = upper - 1;
        let span = t[upper] - t[lower];
        let frac = if span > 0.0 { (experience - t[lower]) / span } else { 0.0 };
        (lower + 1) as f64 + frac
    }
}

impl Default for ExperienceTable {
    /// 99 levels: a triangular progression (100 exp per level step) up to
    /// level 51, then an even climb to 1,000,000 at level 99.
    fn default() -> Self {
        const CAP_LEVEL: u32 = 99;
        const KNEE_LEVEL: u32 = 51;
        const CAP_EXPERIENCE: f64 = 1_000_000.0;
        let triangular = |n: u32| 50.0 * n as f64 * (n as f64 - 1.0);
        let knee = triangular(KNEE_LEVEL);
        let per_level = (CAP_EXPERIENCE - knee) / (CAP_LEVEL - KNEE_LEVEL) as f64;
        let thresholds = (1..=CAP_LEVEL)
            .map(|n| {
                if n <= KNEE_LEVEL {
                    triangular(n)
                } else {
                    (knee + per_level * (n - KNEE_LEVEL) as f64).round()
                }
            })
            .collect();
        Self { thresholds }
    }
}

/// Read-only lookup tables threaded through every build via [`Context`](crate::Context).
#[derive(Clone, Debug, PartialEq)]
pub struct DomainRules {
    pub ship_classes: Vec<ShipClass>,
    pub material_groups: Vec<MaterialGroup>,
    pub experience: ExperienceTable,
}

impl DomainRules {
    pub fn material_group(&self, name: &str) -> Option<&MaterialGroup> {
        self.material_groups.iter().find(|g| g.name == name)
    }

    /// Materials named by `kind`: the members of a group, or a single material.
    pub fn materials_of(&self, kind: &str) -> Result<Vec<Material>> {
        if let Some(group) = self.material_group(kind) {
            return Ok(group.members.clone());
        }
        kind.parse::<Material>().map(|m| vec![m]).map_err(|_| {
            ChartError::invalid_specification(kind, &self.material_kind_names())
        })
    }

    /// Every accepted material kind: group names first, then concrete materials.
    pub fn material_kind_names(&self) -> Vec<String> {
        self.material_groups
            .iter()
            .map(|g| g.name.clone())
            .chain(Material::ALL.iter().map(|m| m.name().to_string()))
            .collect()
    }

    /// Position of a classification (by abbreviation or full name) in the table.
    pub fn ship_class_position(&self, classification: &str) -> Option<usize> {
        self.ship_classes
            .iter()
            .position(|c| c.abbreviation == classification || c.name == classification)
    }
}

impl Default for DomainRules {
    fn default() -> Self {
        let ship_classes = [
            ("DE", "Escort"),
            ("DD", "Destroyer"),
            ("CL", "Light Cruiser"),
            ("CLT", "Torpedo Cruiser"),
            ("CT", "Training Cruiser"),
            ("CA", "Heavy Cruiser"),
            ("CAV", "Aviation Cruiser"),
            ("CVL", "Light Aircraft Carrier"),
            ("CV", "Aircraft Carrier"),
            ("CVB", "Armored Aircraft Carrier"),
            ("FBB", "Fast Battleship"),
            ("BB", "Battleship"),
            ("BBV", "Aviation Battleship"),
            ("SS", "Submarine"),
            ("SSV", "Aircraft Carrying Submarine"),
            ("AV", "Seaplane Tender"),
            ("AO", "Fleet Oiler"),
            ("LHA", "Amphibious Assault Ship"),
            ("AS", "Submarine Tender"),
            ("AR", "Repair Ship"),
        ]
        .into_iter()
        .map(|(abbreviation, name)| ShipClass::new(abbreviation, name))
        .collect();

        let material_groups = vec![
            MaterialGroup {
                name: "Resources".into(),
                members: vec![Material::Fuel, Material::Ammunition, Material::Steel, Material::Bauxite],
            },
            MaterialGroup {
                name: "Consumables".into(),
                members: vec![
                    Material::Repair,
                    Material::Construction,
                    Material::Development,
                    Material::Improvement,
                ],
            },
        ];

        Self { ship_classes, material_groups, experience: ExperienceTable::default() }
    }
}
