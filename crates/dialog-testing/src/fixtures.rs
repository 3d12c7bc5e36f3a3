//! Deterministic dialog markup for tests.

use crate::document::{NodeId, TestDocument};
use crate::TestResult;
use dialog_dom::ElementDescriptor;

/// Marker class used by the fixtures.
pub const MARKER_CLASS: &str = "slice-dialog";

/// A dialog container with marked children.
#[derive(Debug, Clone)]
pub struct DialogMarkup {
    /// Container carrying the dialog id
    pub container: NodeId,
    /// Elements carrying the marker class, in document order
    pub marked: Vec<NodeId>,
    /// A button inside the first marked element
    pub button: NodeId,
}

/// A focus trap with sentinels around its content.
///
/// Layout, in document order:
///
/// ```text
/// root (tabindex -1)
///   entry sentinel
///   leading sentinel
///   fallback (tabindex -1)
///   content
///     button x n
///   leading sentinel
///   trailing sentinel
/// ```
#[derive(Debug, Clone)]
pub struct TrapMarkup {
    pub root: NodeId,
    pub entry: NodeId,
    pub leading_before: NodeId,
    pub fallback: NodeId,
    pub content: NodeId,
    pub buttons: Vec<NodeId>,
    pub leading_after: NodeId,
    pub trailing: NodeId,
}

/// Collection of deterministic test fixtures.
pub struct Fixtures;

impl Fixtures {
    /// A `div` with an id.
    pub fn div_with_id(id: &str) -> ElementDescriptor {
        ElementDescriptor::new("div").with_attribute("id", id)
    }

    /// A `div` with the marker class.
    pub fn marked_div() -> ElementDescriptor {
        ElementDescriptor::new("div").with_class(MARKER_CLASS)
    }

    /// A plain button.
    pub fn button(label: &str) -> ElementDescriptor {
        ElementDescriptor::new("button").with_attribute("aria-label", label)
    }

    /// A focus sentinel with the given tab index.
    pub fn sentinel(tab_index: &str) -> ElementDescriptor {
        ElementDescriptor::new("div")
            .with_class("focus-trap-sentinel")
            .with_attribute("tabindex", tab_index)
    }

    /// `body > div#id > (div.slice-dialog > button, div.slice-dialog)`.
    pub fn dialog(doc: &TestDocument, id: &str) -> TestResult<DialogMarkup> {
        let container = doc.create_in(doc.body(), Self::div_with_id(id))?;
        let first = doc.create_in(container, Self::marked_div())?;
        let button = doc.create_in(first, Self::button("ok"))?;
        let second = doc.create_in(container, Self::marked_div())?;
        Ok(DialogMarkup {
            container,
            marked: vec![first, second],
            button,
        })
    }

    /// A focus trap with `buttons` buttons in its content.
    pub fn focus_trap(
        doc: &TestDocument,
        parent: NodeId,
        buttons: usize,
    ) -> TestResult<TrapMarkup> {
        let root = doc.create_in(
            parent,
            ElementDescriptor::new("div")
                .with_class("focus-trap")
                .with_attribute("tabindex", "-1"),
        )?;
        let entry = doc.create_in(root, Self::sentinel("0"))?;
        let leading_before = doc.create_in(root, Self::sentinel("0"))?;
        let fallback = doc.create_in(
            root,
            ElementDescriptor::new("div").with_attribute("tabindex", "-1"),
        )?;
        let content = doc.create_in(root, ElementDescriptor::new("div").with_class("content"))?;
        let buttons = (0..buttons)
            .map(|i| doc.create_in(content, Self::button(&format!("button-{}", i))))
            .collect::<TestResult<Vec<_>>>()?;
        let leading_after = doc.create_in(root, Self::sentinel("0"))?;
        let trailing = doc.create_in(root, Self::sentinel("0"))?;

        Ok(TrapMarkup {
            root,
            entry,
            leading_before,
            fallback,
            content,
            buttons,
            leading_after,
            trailing,
        })
    }
}
