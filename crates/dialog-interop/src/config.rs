//! Dialog keyboard configuration.

use crate::focus_trap::DefaultFocus;
use dialog_keybinds::ConfigResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Marker class carried by the elements of a dialog that listen for keys.
pub const DEFAULT_MARKER_CLASS: &str = "slice-dialog";

/// Keyboard behaviour of one dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogKeyboardConfig {
    /// Dismiss the dialog with Escape.
    #[serde(default)]
    pub close_on_escape: bool,
    /// Ignore clicks on the backdrop.
    #[serde(default)]
    pub disable_backdrop_click: bool,
    /// Class marking the elements that get key listeners.
    #[serde(default = "default_marker_class")]
    pub marker_class: String,
    /// Focus trap settings.
    #[serde(default)]
    pub focus: FocusTrapConfig,
}

fn default_marker_class() -> String {
    DEFAULT_MARKER_CLASS.to_string()
}

impl Default for DialogKeyboardConfig {
    fn default() -> Self {
        Self {
            close_on_escape: false,
            disable_backdrop_click: false,
            marker_class: default_marker_class(),
            focus: FocusTrapConfig::default(),
        }
    }
}

impl DialogKeyboardConfig {
    /// Parse configuration from TOML.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Focus trap settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusTrapConfig {
    /// Where focus goes on first render.
    #[serde(default)]
    pub default_focus: DefaultFocus,
    /// Render the trap without trapping.
    #[serde(default)]
    pub disabled: bool,
}
