//! Property-based testing generators.
//!
//! This module provides proptest strategies for key events, modifier
//! policies and random edits of a document subtree.

use crate::document::{NodeId, TestDocument};
use crate::fixtures::Fixtures;
use crate::TestResult;
use dialog_dom::{Document, ElementDescriptor};
use dialog_keybinds::{modifier_signature, KeyboardEvent, Modifiers};
use proptest::prelude::*;
use proptest::strategy::{BoxedStrategy, Strategy};

/// Generate random key events with sensible defaults.
pub fn key_event() -> impl Strategy<Value = KeyboardEvent> {
    KeyEventGen::new().build()
}

/// Generate any combination of modifier keys.
pub fn modifiers() -> impl Strategy<Value = Modifiers> {
    (0u8..16).prop_map(Modifiers::from_bits_truncate)
}

/// Generate a modifier policy string as a rule author would write it.
pub fn policy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("none".to_string()),
        Just("any".to_string()),
        prop::collection::vec(policy_term(), 1..4).prop_map(|terms| terms.join(",")),
    ]
}

fn policy_term() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("key+none".to_string()),
        Just("key+any".to_string()),
        modifiers()
            .prop_filter("at least one modifier", |m| !m.is_empty())
            .prop_map(modifier_signature),
    ]
}

/// Configurable key event generator.
#[derive(Debug, Clone)]
pub struct KeyEventGen {
    include_modifiers: bool,
    include_named_keys: bool,
    allowed_keys: Option<Vec<String>>,
}

impl KeyEventGen {
    /// Create a new generator with default settings.
    pub fn new() -> Self {
        Self {
            include_modifiers: true,
            include_named_keys: true,
            allowed_keys: None,
        }
    }

    /// Disable modifier keys.
    pub fn without_modifiers(mut self) -> Self {
        self.include_modifiers = false;
        self
    }

    /// Disable named keys (Escape, Tab, arrows, ...).
    pub fn without_named_keys(mut self) -> Self {
        self.include_named_keys = false;
        self
    }

    /// Only allow specific keys.
    pub fn only_keys(mut self, keys: &[&str]) -> Self {
        self.allowed_keys = Some(keys.iter().map(|k| k.to_string()).collect());
        self
    }

    /// Build the proptest strategy.
    pub fn build(self) -> BoxedStrategy<KeyboardEvent> {
        let keys: BoxedStrategy<String> = match self.allowed_keys {
            Some(keys) => prop::sample::select(keys).boxed(),
            None => {
                let mut keys: Vec<String> = ('a'..='z')
                    .chain('A'..='Z')
                    .chain('0'..='9')
                    .map(|c| c.to_string())
                    .collect();
                if self.include_named_keys {
                    keys.extend(
                        [
                            "Escape", "Enter", "Tab", "Backspace", "ArrowUp", "ArrowDown",
                            "ArrowLeft", "ArrowRight", "Home", "End", "F1", "F12",
                        ]
                        .iter()
                        .map(|k| k.to_string()),
                    );
                }
                prop::sample::select(keys).boxed()
            }
        };

        if self.include_modifiers {
            (keys, modifiers(), any::<bool>())
                .prop_map(|(key, modifiers, repeat)| {
                    let event = KeyboardEvent::new(key).with_modifiers(modifiers);
                    if repeat {
                        event.repeating()
                    } else {
                        event
                    }
                })
                .boxed()
        } else {
            keys.prop_map(KeyboardEvent::new).boxed()
        }
    }
}

impl Default for KeyEventGen {
    fn default() -> Self {
        Self::new()
    }
}

/// One random edit of a document subtree.
///
/// Indices are resolved modulo the current node list, so every script is
/// applicable to any tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomOp {
    /// Append a new element, marked or plain, under an existing node
    Append { parent: usize, marked: bool },
    /// Remove an existing node (never the root)
    Remove { node: usize },
    /// Move an existing node under another one
    Move { node: usize, parent: usize },
    /// Deliver pending mutations
    Flush,
}

/// Generate a single subtree edit.
pub fn dom_op() -> impl Strategy<Value = DomOp> {
    prop_oneof![
        3 => (any::<usize>(), any::<bool>())
            .prop_map(|(parent, marked)| DomOp::Append { parent, marked }),
        2 => any::<usize>().prop_map(|node| DomOp::Remove { node }),
        1 => (any::<usize>(), any::<usize>())
            .prop_map(|(node, parent)| DomOp::Move { node, parent }),
        1 => Just(DomOp::Flush),
    ]
}

/// Generate a script of subtree edits.
pub fn mutation_script(
    len: impl Into<std::ops::Range<usize>>,
) -> impl Strategy<Value = Vec<DomOp>> {
    prop::collection::vec(dom_op(), len.into())
}

/// Apply a script below `root`, returning every node it created.
///
/// Removed nodes stay in the returned list so they can be checked for
/// leaked listeners. Invalid moves (into their own subtree) are skipped.
pub fn apply_script(doc: &TestDocument, root: NodeId, script: &[DomOp]) -> TestResult<Vec<NodeId>> {
    let mut created = Vec::new();
    for op in script {
        let mut live: Vec<NodeId> = vec![root];
        live.extend(created.iter().copied().filter(|n| in_subtree(doc, root, *n)));

        match *op {
            DomOp::Append { parent, marked } => {
                let descriptor = if marked {
                    Fixtures::marked_div()
                } else {
                    ElementDescriptor::new("div")
                };
                created.push(doc.create_in(live[parent % live.len()], descriptor)?);
            }
            DomOp::Remove { node } => {
                if live.len() > 1 {
                    doc.remove(live[1 + node % (live.len() - 1)])?;
                }
            }
            DomOp::Move { node, parent } => {
                if live.len() > 1 {
                    let node = live[1 + node % (live.len() - 1)];
                    let parent = live[parent % live.len()];
                    if !in_subtree(doc, node, parent) {
                        doc.append(parent, node)?;
                    }
                }
            }
            DomOp::Flush => {
                doc.flush_mutations();
            }
        }
    }
    Ok(created)
}

fn in_subtree(doc: &TestDocument, root: NodeId, node: NodeId) -> bool {
    doc.contains(&root, &node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialog_keybinds::ModifierPolicy;

    proptest! {
        #[test]
        fn test_none_never_matches(mods in modifiers()) {
            prop_assert!(!ModifierPolicy::parse("none").matches(mods));
            prop_assert!(!ModifierPolicy::parse("").matches(mods));
        }

        #[test]
        fn test_any_always_matches(mods in modifiers()) {
            prop_assert!(ModifierPolicy::parse("any").matches(mods));
        }

        #[test]
        fn test_bare_key_needs_key_none(raw in policy()) {
            let policy = ModifierPolicy::parse(&raw);
            let expected = raw == "any" || raw.contains("key+none");
            prop_assert_eq!(policy.matches(Modifiers::empty()), expected);
        }

        #[test]
        fn test_own_signature_matches(
            mods in modifiers().prop_filter("held", |m| !m.is_empty())
        ) {
            let policy = ModifierPolicy::parse(&modifier_signature(mods));
            prop_assert!(policy.matches(mods));
        }

        #[test]
        fn test_key_events_are_well_formed(event in key_event()) {
            prop_assert!(!event.key.is_empty());
            prop_assert!(!event.default_prevented());
            prop_assert!(!event.propagation_stopped());
        }

        #[test]
        fn test_scripts_stay_below_root(script in mutation_script(0..30)) {
            let doc = TestDocument::new();
            let root = doc.create_in(doc.body(), ElementDescriptor::new("div")).unwrap();
            let created = apply_script(&doc, root, &script).unwrap();
            for node in created {
                if doc.is_connected(&node) {
                    prop_assert!(doc.contains(&root, &node));
                }
            }
        }
    }

    #[test]
    fn test_key_event_gen_only_keys() {
        use proptest::strategy::ValueTree;
        use proptest::test_runner::TestRunner;

        let mut runner = TestRunner::default();
        let strategy = KeyEventGen::new().only_keys(&["Escape"]).without_modifiers().build();
        for _ in 0..10 {
            let event = strategy.new_tree(&mut runner).unwrap().current();
            assert_eq!(event.key, "Escape");
            assert!(event.modifiers.is_empty());
        }
    }
}
