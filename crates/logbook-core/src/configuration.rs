// File: crates/logbook-core/src/configuration.rs
// Summary: Read-only configuration tree addressed by dotted key paths, with two-level cascading.

use serde_json::{Map, Value};

use crate::error::{ChartError, Result};

/// Hierarchical configuration (locale, legends, per-chart settings).
/// The pipeline only ever reads it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Configuration {
    root: Value,
}

impl Configuration {
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map(Self::from_value)
            .map_err(|e| ChartError::invalid_configuration("<root>", e.to_string()))
    }

    /// Value at `path` (`"legend.en.Ships.title"`); absence is an error.
    pub fn get(&self, path: &str) -> Result<&Value> {
        self.get_optional(path)
            .ok_or_else(|| ChartError::MissingConfiguration(path.to_string()))
    }

    /// Value at `path`, or `None` when any segment is absent.
    pub fn get_optional(&self, path: &str) -> Option<&Value> {
        self.get_path(&path.split('.').collect::<Vec<_>>())
    }

    pub fn get_path<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Value> {
        segments
            .iter()
            .try_fold(&self.root, |node, key| node.as_object()?.get(key.as_ref()))
    }

    /// Required string at `path`.
    pub fn text(&self, path: &str) -> Result<&str> {
        self.get(path)?
            .as_str()
            .ok_or_else(|| ChartError::invalid_configuration(path, "expected a string"))
    }

    /// Numeric value at `path`; absent or non-numeric yields `None`.
    pub fn number(&self, path: &str) -> Option<f64> {
        self.get_optional(path).and_then(Value::as_f64)
    }

    pub fn flag(&self, path: &str, default: bool) -> bool {
        self.get_optional(path).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn locale(&self) -> Result<&str> {
        self.text("locale")
    }

    /// Object at `path` as a section, without any cascading.
    pub fn section(&self, path: &str) -> Option<Section> {
        let fields = self.get_optional(path)?.as_object()?.clone();
        Some(Section { path: path.to_string(), fields })
    }

    /// Merge the object at `specific` over the object at `shared`, key by key.
    /// Keys only `shared` defines are inherited; `None` when neither exists.
    pub fn cascade(&self, specific: &str, shared: &str) -> Option<Section> {
        let shared_fields = self.get_optional(shared).and_then(Value::as_object);
        let specific_fields = self.get_optional(specific).and_then(Value::as_object);
        if shared_fields.is_none() && specific_fields.is_none() {
            return None;
        }
        let mut fields = shared_fields.cloned().unwrap_or_default();
        if let Some(overrides) = specific_fields {
            for (key, value) in overrides {
                fields.insert(key.clone(), value.clone());
            }
        }
        Some(Section { path: specific.to_string(), fields })
    }
}

/// Result of [`Configuration::cascade`]: the effective fields for one axis or chart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Section {
    path: String,
    fields: Map<String, Value>,
}

impl Section {
    pub fn new(path: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self { path: path.into(), fields }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Dotted path of `key` for error messages.
    pub fn key_path(&self, key: &str) -> String {
        format!("{}.{}", self.path, key)
    }
}
