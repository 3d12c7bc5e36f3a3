//! Raw, unnormalized key options as supplied by a dialog or a config file.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for a single intercepted key.
///
/// `key` is either a literal key value (`"Escape"`, `"a"`) or a regular
/// expression wrapped in slashes (`"/[a-z]/"`). Policies default to `"none"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyOptions {
    /// Key value or `/pattern/`
    pub key: String,
    /// Forward matching keydown events to subscribers
    #[serde(default)]
    pub subscribe_down: bool,
    /// Forward matching keyup events to subscribers
    #[serde(default)]
    pub subscribe_up: bool,
    /// Modifier policy for preventing the keydown default action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_down: Option<String>,
    /// Modifier policy for preventing the keyup default action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_up: Option<String>,
    /// Modifier policy for stopping keydown propagation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_down: Option<String>,
    /// Modifier policy for stopping keyup propagation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_up: Option<String>,
}

impl KeyOptions {
    /// Create options for a key with every policy set to `"none"`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Forward keydown events.
    pub fn with_subscribe_down(mut self) -> Self {
        self.subscribe_down = true;
        self
    }

    /// Forward keyup events.
    pub fn with_subscribe_up(mut self) -> Self {
        self.subscribe_up = true;
        self
    }

    pub fn with_prevent_down(mut self, policy: impl Into<String>) -> Self {
        self.prevent_down = Some(policy.into());
        self
    }

    pub fn with_prevent_up(mut self, policy: impl Into<String>) -> Self {
        self.prevent_up = Some(policy.into());
        self
    }

    pub fn with_stop_down(mut self, policy: impl Into<String>) -> Self {
        self.stop_down = Some(policy.into());
        self
    }

    pub fn with_stop_up(mut self, policy: impl Into<String>) -> Self {
        self.stop_up = Some(policy.into());
        self
    }
}

/// Options for connecting a key interceptor to an element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInterceptorOptions {
    /// CSS class identifying the descendants that receive listeners
    pub target_class: String,
    /// Initial rule set
    pub keys: Vec<KeyOptions>,
    /// Emit per-event trace logging
    #[serde(default)]
    pub enable_logging: bool,
}

impl KeyInterceptorOptions {
    /// Create options for a marker class with no keys.
    pub fn new(target_class: impl Into<String>) -> Self {
        Self {
            target_class: target_class.into(),
            keys: Vec::new(),
            enable_logging: false,
        }
    }

    /// Add a key.
    pub fn key(mut self, key: KeyOptions) -> Self {
        self.keys.push(key);
        self
    }

    /// Enable per-event trace logging.
    pub fn with_logging(mut self) -> Self {
        self.enable_logging = true;
        self
    }

    /// Check the required fields.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.target_class.trim().is_empty() {
            return Err(ConfigError::MissingTargetClass);
        }
        Ok(())
    }

    /// Parse options from TOML.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let options: Self = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = KeyInterceptorOptions::new("dialog")
            .key(KeyOptions::new("Escape").with_subscribe_down())
            .key(KeyOptions::new("/[a-z]/").with_prevent_down("key+none"));

        assert_eq!(options.keys.len(), 2);
        assert!(options.keys[0].subscribe_down);
        assert_eq!(options.keys[1].prevent_down.as_deref(), Some("key+none"));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_missing_target_class() {
        let options = KeyInterceptorOptions::new("  ");
        assert!(matches!(options.validate(), Err(ConfigError::MissingTargetClass)));
    }

    #[test]
    fn test_from_toml() {
        let options = KeyInterceptorOptions::from_toml_str(
            r#"
            target_class = "slice-dialog"
            enable_logging = true

            [[keys]]
            key = "Escape"
            subscribe_down = true

            [[keys]]
            key = "Tab"
            prevent_down = "key+none"
            "#,
        )
        .unwrap();

        assert_eq!(options.target_class, "slice-dialog");
        assert!(options.enable_logging);
        assert_eq!(options.keys[0], KeyOptions::new("Escape").with_subscribe_down());
        assert_eq!(options.keys[1].stop_down, None);
    }

    #[test]
    fn test_toml_requires_keys() {
        let result = KeyInterceptorOptions::from_toml_str(r#"target_class = "x""#);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.toml");
        std::fs::write(&path, "target_class = \"d\"\nkeys = []\n").unwrap();

        let options = KeyInterceptorOptions::load(&path).unwrap();
        assert!(options.keys.is_empty());

        let missing = KeyInterceptorOptions::load(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
