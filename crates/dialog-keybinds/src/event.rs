//! Keyboard event types.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Modifier keys held during a keyboard event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL = 0b0010;
        const ALT = 0b0100;
        const META = 0b1000;
    }
}

/// Direction of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyDirection {
    /// Key pressed
    #[serde(rename = "keydown")]
    Down,
    /// Key released
    #[serde(rename = "keyup")]
    Up,
}

impl KeyDirection {
    /// DOM event name for this direction.
    pub fn event_name(self) -> &'static str {
        match self {
            Self::Down => "keydown",
            Self::Up => "keyup",
        }
    }
}

impl fmt::Display for KeyDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// A live keyboard event as delivered to a listener.
///
/// Listeners receive it mutably so they can cancel the default action or
/// stop propagation to ancestor elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyboardEvent {
    /// Key value, e.g. `"Escape"` or `"a"`
    pub key: String,
    /// Physical key code, e.g. `"KeyA"`
    pub code: String,
    /// Key location on the keyboard
    pub location: u32,
    /// Whether the key is auto-repeating
    pub repeat: bool,
    /// Modifier keys held
    pub modifiers: Modifiers,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl KeyboardEvent {
    /// Create an event for a key with no modifiers.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Set the physical key code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Set the held modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the key location.
    pub fn with_location(mut self, location: u32) -> Self {
        self.location = location;
        self
    }

    /// Mark the event as auto-repeating.
    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Cancel the browser's default action.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Stop the event from reaching ancestor elements.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn shift_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    pub fn ctrl_key(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    pub fn alt_key(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    pub fn meta_key(&self) -> bool {
        self.modifiers.contains(Modifiers::META)
    }

    /// Snapshot the event into the arguments forwarded to subscribers.
    pub fn to_args(&self, direction: KeyDirection) -> KeyboardEventArgs {
        KeyboardEventArgs {
            key: self.key.clone(),
            code: self.code.clone(),
            location: self.location,
            repeat: self.repeat,
            ctrl_key: self.ctrl_key(),
            shift_key: self.shift_key(),
            alt_key: self.alt_key(),
            meta_key: self.meta_key(),
            kind: direction,
        }
    }
}

/// Arguments forwarded to keydown/keyup subscribers.
///
/// The serialized field names are fixed so hosts on the other side of an
/// interop boundary can rely on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyboardEventArgs {
    pub key: String,
    pub code: String,
    pub location: u32,
    pub repeat: bool,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
    /// Which listener produced the event
    #[serde(rename = "Type")]
    pub kind: KeyDirection,
}

impl KeyboardEventArgs {
    /// Modifiers held when the event fired.
    pub fn modifiers(&self) -> Modifiers {
        let mut modifiers = Modifiers::empty();
        modifiers.set(Modifiers::SHIFT, self.shift_key);
        modifiers.set(Modifiers::CTRL, self.ctrl_key);
        modifiers.set(Modifiers::ALT, self.alt_key);
        modifiers.set(Modifiers::META, self.meta_key);
        modifiers
    }
}
