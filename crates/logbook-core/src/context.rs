// File: crates/logbook-core/src/context.rs
// Summary: Read-only lookups shared by one build request.

use crate::configuration::Configuration;
use crate::rules::DomainRules;

/// Configuration and domain rules for a single build. Both must stay
/// unchanged while any table or chart borrowing them is alive.
#[derive(Clone, Copy, Debug)]
pub struct Context<'a> {
    pub configuration: &'a Configuration,
    pub rules: &'a DomainRules,
}

impl<'a> Context<'a> {
    pub fn new(configuration: &'a Configuration, rules: &'a DomainRules) -> Self {
        Self { configuration, rules }
    }
}
