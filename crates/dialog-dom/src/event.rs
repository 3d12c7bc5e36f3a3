//! Generic DOM events delivered to element listeners.

use dialog_keybinds::{KeyDirection, KeyboardEvent, KeyboardEventArgs};
use serde::{Deserialize, Serialize};

/// An event travelling through the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    name: String,
    keyboard: Option<(KeyDirection, KeyboardEvent)>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyboard: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Wrap a keyboard event dispatched as `keydown` or `keyup`.
    pub fn keyboard(direction: KeyDirection, event: KeyboardEvent) -> Self {
        Self {
            name: direction.event_name().to_string(),
            default_prevented: event.default_prevented(),
            propagation_stopped: event.propagation_stopped(),
            keyboard: Some((direction, event)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_event(&self) -> Option<&KeyboardEvent> {
        self.keyboard.as_ref().map(|(_, event)| event)
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Arguments handed to listener callbacks.
    pub fn to_args(&self) -> EventArgs {
        EventArgs {
            kind: self.name.clone(),
            keyboard: self
                .keyboard
                .as_ref()
                .map(|(direction, event)| event.to_args(*direction)),
        }
    }
}

/// Serialized form of a [`DomEvent`].
///
/// Field names are fixed; keyboard details are present only for key events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventArgs {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<KeyboardEventArgs>,
}
