// File: crates/logbook-core/src/error.rs
// Summary: Error taxonomy shared by relations, tables and charts.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    /// Directive kind/option outside a variant's accepted set.
    #[error("invalid directive '{value}', expected one of: {}", .valid.join(", "))]
    InvalidDirective { value: String, valid: Vec<String> },

    /// Attribute or series name the relation/table does not recognize.
    #[error("invalid specification '{name}', expected one of: {}", .valid.join(", "))]
    InvalidSpecification { name: String, valid: Vec<String> },

    #[error("no tuple")]
    EmptyRelation,

    #[error("missing configuration '{0}'")]
    MissingConfiguration(String),

    #[error("invalid configuration '{key}': {reason}")]
    InvalidConfiguration { key: String, reason: String },

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

impl ChartError {
    pub(crate) fn invalid_directive<S: AsRef<str>>(value: impl Into<String>, valid: &[S]) -> Self {
        Self::InvalidDirective {
            value: value.into(),
            valid: valid.iter().map(|v| v.as_ref().to_string()).collect(),
        }
    }

    pub(crate) fn invalid_specification<S: AsRef<str>>(name: impl Into<String>, valid: &[S]) -> Self {
        Self::InvalidSpecification {
            name: name.into(),
            valid: valid.iter().map(|v| v.as_ref().to_string()).collect(),
        }
    }

    pub(crate) fn invalid_configuration(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration { key: key.into(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;
