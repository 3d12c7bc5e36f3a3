//! Modifier policy notation.
//!
//! A policy decides, per matching rule and direction, whether the default
//! action is prevented or propagation is stopped. Supported forms:
//! - `"none"` - never applies (also the default for an empty policy)
//! - `"any"` - always applies
//! - `"key+none"` - applies when no modifier is held
//! - `"key+any"` - applies when at least one modifier is held
//! - `"key+shift"`, `"key+ctrl+alt"`, ... - applies for that exact combination
//!
//! Combinations are matched as a substring of the policy, with modifiers in
//! the fixed order shift, ctrl, alt, meta. `"key+ctrl+shift"` therefore never
//! matches shift+ctrl; it has to be written `"key+shift+ctrl"`.

use crate::event::Modifiers;
use std::fmt;

/// Policy that never applies.
pub const NONE: &str = "none";
/// Policy that always applies.
pub const ANY: &str = "any";

const KEY_NONE: &str = "key+none";
const KEY_ANY: &str = "key+any";

/// How a policy is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyMode {
    /// `"none"`
    Never,
    /// `"any"`
    Always,
    /// One or more `key+...` combinations
    Combinations,
}

/// A normalized modifier policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModifierPolicy(String);

impl ModifierPolicy {
    /// Normalize a raw policy: strip whitespace and lowercase.
    ///
    /// Normalizing an already normalized policy yields the same value.
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        if normalized.is_empty() {
            Self::never()
        } else {
            Self(normalized)
        }
    }

    /// Normalize an optional raw policy, defaulting to `"none"`.
    pub fn parse_optional(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or_default()
    }

    /// The `"none"` policy.
    pub fn never() -> Self {
        Self(NONE.to_string())
    }

    /// The `"any"` policy.
    pub fn always() -> Self {
        Self(ANY.to_string())
    }

    /// Normalized policy text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Which of the three policy forms this is.
    pub fn mode(&self) -> PolicyMode {
        match self.0.as_str() {
            "" | NONE => PolicyMode::Never,
            ANY => PolicyMode::Always,
            _ => PolicyMode::Combinations,
        }
    }

    /// Check whether the policy applies to an event with these modifiers.
    pub fn matches(&self, modifiers: Modifiers) -> bool {
        match self.mode() {
            PolicyMode::Never => return false,
            PolicyMode::Always => return true,
            PolicyMode::Combinations => {}
        }

        let policy = self.0.as_str();
        let any_held = !modifiers.is_empty();
        if any_held && policy.contains(KEY_ANY) {
            return true;
        }
        if !any_held {
            return policy.contains(KEY_NONE);
        }

        policy.contains(&modifier_signature(modifiers))
    }
}

impl Default for ModifierPolicy {
    fn default() -> Self {
        Self::never()
    }
}

impl From<&str> for ModifierPolicy {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for ModifierPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the signature a policy is matched against, e.g. `"key+shift+alt"`.
pub fn modifier_signature(modifiers: Modifiers) -> String {
    let mut signature = String::from("key");
    if modifiers.contains(Modifiers::SHIFT) {
        signature.push_str("+shift");
    }
    if modifiers.contains(Modifiers::CTRL) {
        signature.push_str("+ctrl");
    }
    if modifiers.contains(Modifiers::ALT) {
        signature.push_str("+alt");
    }
    if modifiers.contains(Modifiers::META) {
        signature.push_str("+meta");
    }
    signature
}
