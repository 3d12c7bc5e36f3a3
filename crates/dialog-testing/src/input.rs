//! Key input simulation for testing.

use crate::document::{NodeId, TestDocument};
use dialog_keybinds::{KeyDirection, KeyboardEvent, Modifiers};

/// A sequence of key events for testing.
#[derive(Debug, Clone, Default)]
pub struct InputSequence {
    events: Vec<(KeyDirection, KeyboardEvent)>,
}

impl InputSequence {
    /// Create a new empty input sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keydown event.
    pub fn down(&mut self, key: &str) -> &mut Self {
        self.down_mod(key, Modifiers::empty())
    }

    /// Add a keydown event with modifiers.
    pub fn down_mod(&mut self, key: &str, modifiers: Modifiers) -> &mut Self {
        self.push(KeyDirection::Down, key, modifiers)
    }

    /// Add a keyup event.
    pub fn up(&mut self, key: &str) -> &mut Self {
        self.up_mod(key, Modifiers::empty())
    }

    /// Add a keyup event with modifiers.
    pub fn up_mod(&mut self, key: &str, modifiers: Modifiers) -> &mut Self {
        self.push(KeyDirection::Up, key, modifiers)
    }

    /// Add a keydown followed by a keyup.
    pub fn press(&mut self, key: &str) -> &mut Self {
        self.down(key).up(key)
    }

    /// Add a press with modifiers held for both halves.
    pub fn press_mod(&mut self, key: &str, modifiers: Modifiers) -> &mut Self {
        self.down_mod(key, modifiers).up_mod(key, modifiers)
    }

    /// Add presses for each character of a string.
    pub fn text(&mut self, s: &str) -> &mut Self {
        for c in s.chars() {
            self.press(&c.to_string());
        }
        self
    }

    pub fn tab(&mut self) -> &mut Self {
        self.press("Tab")
    }

    pub fn shift_tab(&mut self) -> &mut Self {
        self.press_mod("Tab", Modifiers::SHIFT)
    }

    pub fn escape(&mut self) -> &mut Self {
        self.press("Escape")
    }

    pub fn enter(&mut self) -> &mut Self {
        self.press("Enter")
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[(KeyDirection, KeyboardEvent)] {
        &self.events
    }

    /// Dispatch every event at `target`, returning them as delivered.
    pub fn dispatch(&self, doc: &TestDocument, target: NodeId) -> Vec<KeyboardEvent> {
        self.events
            .iter()
            .map(|(direction, event)| doc.dispatch_key(target, *direction, event.clone()))
            .collect()
    }

    fn push(&mut self, direction: KeyDirection, key: &str, modifiers: Modifiers) -> &mut Self {
        let event = KeyboardEvent::new(key)
            .with_code(code_for(key))
            .with_modifiers(modifiers);
        self.events.push((direction, event));
        self
    }
}

fn code_for(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => format!("Key{}", c.to_ascii_uppercase()),
        (Some(c), None) if c.is_ascii_digit() => format!("Digit{}", c),
        (Some(' '), None) => "Space".to_string(),
        _ => key.to_string(),
    }
}
