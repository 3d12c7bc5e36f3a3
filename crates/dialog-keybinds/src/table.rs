//! Rule table: literal key lookup plus an ordered list of pattern rules.

use crate::error::{ConfigError, ConfigResult};
use crate::options::KeyOptions;
use crate::rule::{is_pattern_key, KeyRule};
use std::collections::HashMap;
use tracing::warn;

/// The set of configured key rules.
///
/// Literal keys are unique (last registration wins). Pattern rules are kept
/// in registration order without deduplication; every pattern that matches
/// a key applies independently.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    literals: HashMap<String, KeyRule>,
    patterns: Vec<KeyRule>,
}

impl RuleTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from an initial option list.
    ///
    /// Options with an empty key are skipped with a warning; an invalid
    /// pattern fails the whole build.
    pub fn from_options(options: &[KeyOptions]) -> ConfigResult<Self> {
        let mut table = Self::new();
        for option in options {
            match table.register(option) {
                Ok(()) => {}
                Err(ConfigError::EmptyKey) => {
                    warn!(?option, "skipping key option without a key");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(table)
    }

    /// Normalize and insert a rule.
    pub fn register(&mut self, options: &KeyOptions) -> ConfigResult<()> {
        let rule = KeyRule::from_options(options)?;
        if rule.is_regex() {
            self.patterns.push(rule);
        } else {
            self.literals.insert(rule.key().to_string(), rule);
        }
        Ok(())
    }

    /// Upsert a rule into a live table.
    ///
    /// Returns whether a rule for that key already existed and warns when
    /// it did not. Updating a pattern replaces every rule with that pattern.
    pub fn update(&mut self, options: &KeyOptions) -> ConfigResult<bool> {
        let rule = KeyRule::from_options(options)?;
        let existed = self.contains(&options.key);
        if !existed {
            warn!(key = %options.key, "updating key option that was never registered");
        }
        if rule.is_regex() {
            self.patterns.retain(|other| other.key() != rule.key());
            self.patterns.push(rule);
        } else {
            self.literals.insert(rule.key().to_string(), rule);
        }
        Ok(existed)
    }

    /// Check whether a key (as written in options) has a rule.
    pub fn contains(&self, key: &str) -> bool {
        if is_pattern_key(key) {
            self.patterns.iter().any(|rule| rule.key() == key)
        } else {
            self.literals.contains_key(&key.to_lowercase())
        }
    }

    /// Get the literal rule for a key value.
    pub fn literal(&self, key: &str) -> Option<&KeyRule> {
        self.literals.get(&key.to_lowercase())
    }

    /// Pattern rules in registration order.
    pub fn patterns(&self) -> &[KeyRule] {
        &self.patterns
    }

    /// All rules matching an already lowercased key: the literal rule first,
    /// then every matching pattern in order.
    pub fn matching<'a>(&'a self, lowered: &'a str) -> impl Iterator<Item = &'a KeyRule> + 'a {
        self.literals.get(lowered).into_iter().chain(
            self.patterns
                .iter()
                .filter(move |rule| rule.matches_key(lowered)),
        )
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.literals.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty() && self.patterns.is_empty()
    }
}
