//! Normalized key rules.

use crate::error::{ConfigError, ConfigResult};
use crate::event::KeyDirection;
use crate::options::KeyOptions;
use crate::policy::ModifierPolicy;
use regex::Regex;
use std::fmt;

/// Check whether a key option uses the `/pattern/` form.
pub fn is_pattern_key(key: &str) -> bool {
    key.len() > 2 && key.starts_with('/') && key.ends_with('/')
}

/// What a rule matches against.
#[derive(Debug, Clone)]
pub enum RuleKey {
    /// Lowercased key value
    Literal(String),
    /// Compiled pattern, tested against the lowercased key value
    Pattern(Regex),
}

/// A normalized rule built from [`KeyOptions`].
#[derive(Debug, Clone)]
pub struct KeyRule {
    /// Key as written in the options
    source: String,
    matcher: RuleKey,
    pub subscribe_down: bool,
    pub subscribe_up: bool,
    pub prevent_down: ModifierPolicy,
    pub prevent_up: ModifierPolicy,
    pub stop_down: ModifierPolicy,
    pub stop_up: ModifierPolicy,
}

impl KeyRule {
    /// Normalize raw options into a rule.
    pub fn from_options(options: &KeyOptions) -> ConfigResult<Self> {
        let source = options.key.clone();
        if source.is_empty() {
            return Err(ConfigError::EmptyKey);
        }

        let matcher = if is_pattern_key(&source) {
            let inner = &source[1..source.len() - 1];
            let regex = Regex::new(inner).map_err(|e| ConfigError::InvalidPattern {
                key: source.clone(),
                source: e,
            })?;
            RuleKey::Pattern(regex)
        } else {
            RuleKey::Literal(source.to_lowercase())
        };

        Ok(Self {
            source,
            matcher,
            subscribe_down: options.subscribe_down,
            subscribe_up: options.subscribe_up,
            prevent_down: ModifierPolicy::parse_optional(options.prevent_down.as_deref()),
            prevent_up: ModifierPolicy::parse_optional(options.prevent_up.as_deref()),
            stop_down: ModifierPolicy::parse_optional(options.stop_down.as_deref()),
            stop_up: ModifierPolicy::parse_optional(options.stop_up.as_deref()),
        })
    }

    /// Lookup key: the lowercased literal, or the `/pattern/` as written.
    pub fn key(&self) -> &str {
        match &self.matcher {
            RuleKey::Literal(key) => key,
            RuleKey::Pattern(_) => &self.source,
        }
    }

    /// How the rule recognizes keys.
    pub fn matcher(&self) -> &RuleKey {
        &self.matcher
    }

    /// Whether the rule was written as a `/pattern/`.
    pub fn is_regex(&self) -> bool {
        matches!(self.matcher, RuleKey::Pattern(_))
    }

    /// Compiled pattern of a `/pattern/` rule.
    pub fn pattern(&self) -> Option<&Regex> {
        match &self.matcher {
            RuleKey::Pattern(regex) => Some(regex),
            RuleKey::Literal(_) => None,
        }
    }

    /// Check the rule against an already lowercased key value.
    pub fn matches_key(&self, lowered: &str) -> bool {
        match &self.matcher {
            RuleKey::Literal(key) => key == lowered,
            RuleKey::Pattern(regex) => regex.is_match(lowered),
        }
    }

    /// Whether matching events in `direction` are forwarded.
    pub fn subscribes(&self, direction: KeyDirection) -> bool {
        match direction {
            KeyDirection::Down => self.subscribe_down,
            KeyDirection::Up => self.subscribe_up,
        }
    }

    /// Policy for preventing the default action in this direction.
    pub fn prevent(&self, direction: KeyDirection) -> &ModifierPolicy {
        match direction {
            KeyDirection::Down => &self.prevent_down,
            KeyDirection::Up => &self.prevent_up,
        }
    }

    /// Policy for stopping propagation in this direction.
    pub fn stop(&self, direction: KeyDirection) -> &ModifierPolicy {
        match direction {
            KeyDirection::Down => &self.stop_down,
            KeyDirection::Up => &self.stop_up,
        }
    }
}

impl fmt::Display for KeyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribe = match (self.subscribe_down, self.subscribe_up) {
            (true, true) => "down+up",
            (true, false) => "down",
            (false, true) => "up",
            (false, false) => "-",
        };
        write!(
            f,
            "{} subscribe={} prevent={}/{} stop={}/{}",
            self.key(),
            subscribe,
            self.prevent_down,
            self.prevent_up,
            self.stop_down,
            self.stop_up
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_detection() {
        assert!(is_pattern_key("/[a-z]/"));
        assert!(is_pattern_key("/a/"));
        assert!(!is_pattern_key("//"));
        assert!(!is_pattern_key("/"));
        assert!(!is_pattern_key("/[a-z]/i"));
        assert!(!is_pattern_key("Escape"));
    }

    #[test]
    fn test_literal_rule() {
        let rule = KeyRule::from_options(&KeyOptions::new("Escape").with_subscribe_down()).unwrap();
        assert!(!rule.is_regex());
        assert!(rule.pattern().is_none());
        assert_eq!(rule.key(), "escape");
        assert!(rule.matches_key("escape"));
        assert!(!rule.matches_key("esc"));
        assert!(rule.subscribes(KeyDirection::Down));
        assert!(!rule.subscribes(KeyDirection::Up));
    }

    #[test]
    fn test_regex_rule() {
        let rule = KeyRule::from_options(&KeyOptions::new("/[a-z]/")).unwrap();
        assert!(rule.is_regex());
        assert_eq!(rule.key(), "/[a-z]/");
        assert!(rule.matches_key("a"));
        // Unanchored, like a search.
        assert!(rule.matches_key("arrowdown"));
        assert!(!rule.matches_key("1"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = KeyRule::from_options(&KeyOptions::new("/[a-/")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { ref key, .. } if key == "/[a-/"));
    }

    #[test]
    fn test_empty_key() {
        assert!(matches!(
            KeyRule::from_options(&KeyOptions::new("")),
            Err(ConfigError::EmptyKey)
        ));
    }

    #[test]
    fn test_policies_normalized() {
        let rule = KeyRule::from_options(
            &KeyOptions::new("Tab")
                .with_prevent_down(" Key+None ")
                .with_stop_up("ANY"),
        )
        .unwrap();
        assert_eq!(rule.prevent(KeyDirection::Down).as_str(), "key+none");
        assert_eq!(rule.prevent(KeyDirection::Up).as_str(), "none");
        assert_eq!(rule.stop(KeyDirection::Up).as_str(), "any");
    }

    #[test]
    fn test_display() {
        let rule = KeyRule::from_options(
            &KeyOptions::new("Escape")
                .with_subscribe_down()
                .with_prevent_down("key+none"),
        )
        .unwrap();
        insta::assert_snapshot!(
            rule.to_string(),
            @"escape subscribe=down prevent=key+none/none stop=none/none"
        );
    }
}
