//! The document trait implemented by hosts.

use crate::element::ElementDescriptor;
use crate::error::InteropResult;
use crate::event::DomEvent;
use crate::mutation::MutationRecord;
use dialog_keybinds::KeyboardEvent;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// Handle of a registered event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Handle of a registered child-list observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

/// Callback invoked for key events on an element.
pub type KeyListener = Rc<dyn Fn(&mut KeyboardEvent)>;

/// Callback invoked for any event on an element.
pub type EventListener = Rc<dyn Fn(&mut DomEvent)>;

/// Callback invoked with each batch of child-list mutations.
pub type MutationCallback<E> = Rc<dyn Fn(&[MutationRecord<E>])>;

/// A listener attached to an element.
#[derive(Clone)]
pub enum Listener {
    /// Receives `keydown`/`keyup` events
    Keyboard(KeyListener),
    /// Receives any event, keyboard events included
    Event(EventListener),
    /// Cancels the default action of any event it receives
    PreventDefault,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyboard(_) => f.write_str("Listener::Keyboard(..)"),
            Self::Event(_) => f.write_str("Listener::Event(..)"),
            Self::PreventDefault => f.write_str("Listener::PreventDefault"),
        }
    }
}

/// Bridge to the host document.
///
/// Every method takes `&self`: hosts keep their own interior state, and
/// callbacks registered here may call back into the document while an
/// event or mutation batch is being delivered. Implementations must not
/// hold internal borrows across listener or observer invocations.
pub trait Document {
    /// Opaque element handle.
    type Element: Clone + Eq + Hash + fmt::Debug + 'static;

    /// Look up an element by its `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// All descendants of `root` in document order, excluding `root`.
    fn descendants(&self, root: &Self::Element) -> Vec<Self::Element>;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &Self::Element, node: &Self::Element) -> bool;

    /// Tag, classes and attributes of an element.
    fn describe(&self, element: &Self::Element) -> Option<ElementDescriptor>;

    /// Whether the element is currently part of the document.
    fn is_connected(&self, element: &Self::Element) -> bool;

    /// The focused element, if any.
    fn active_element(&self) -> Option<Self::Element>;

    fn focus(&self, element: &Self::Element) -> InteropResult<()>;

    fn blur(&self, element: &Self::Element) -> InteropResult<()>;

    /// Attach a listener for `event` to an element.
    fn add_event_listener(
        &self,
        element: &Self::Element,
        event: &str,
        listener: Listener,
    ) -> InteropResult<ListenerId>;

    /// Detach a listener previously returned by
    /// [`add_event_listener`](Self::add_event_listener).
    fn remove_event_listener(
        &self,
        element: &Self::Element,
        event: &str,
        id: ListenerId,
    ) -> InteropResult<()>;

    /// Watch child-list changes in the whole subtree below `root`.
    fn observe_child_list(
        &self,
        root: &Self::Element,
        callback: MutationCallback<Self::Element>,
    ) -> InteropResult<ObserverId>;

    /// Stop a child-list observer.
    fn disconnect_observer(&self, id: ObserverId) -> InteropResult<()>;

    /// Whether the element carries a CSS class.
    fn has_class(&self, element: &Self::Element, class: &str) -> bool {
        self.describe(element)
            .map(|d| d.has_class(class))
            .unwrap_or(false)
    }

    /// Descendants of `root` carrying a CSS class, in document order.
    fn descendants_with_class(&self, root: &Self::Element, class: &str) -> Vec<Self::Element> {
        self.descendants(root)
            .into_iter()
            .filter(|el| self.has_class(el, class))
            .collect()
    }
}
