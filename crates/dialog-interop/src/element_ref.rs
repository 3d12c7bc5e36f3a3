//! Focus helpers and event handlers for single elements.

use crate::error::{DialogError, DialogResult};
use dialog_dom::{
    tabbable_descendants, Document, DomEvent, EventArgs, InteropResult, Listener, ListenerId,
};
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;
use tracing::{debug, trace};

/// Focus the `skip`-th tabbable descendant of `root`.
///
/// Falls back to `root` itself when it has `min` or fewer tabbable
/// descendants, so a trap made of sentinels alone focuses its container.
pub fn focus_first<D: Document + ?Sized>(
    document: &D,
    root: &D::Element,
    skip: usize,
    min: usize,
) -> InteropResult<()> {
    let tabbables = tabbable_descendants(document, root);
    let target = if tabbables.len() > min {
        tabbables.get(skip)
    } else {
        None
    };
    document.focus(target.unwrap_or(root))
}

/// Focus the `skip`-th tabbable descendant of `root`, counted from the end.
pub fn focus_last<D: Document + ?Sized>(
    document: &D,
    root: &D::Element,
    skip: usize,
    min: usize,
) -> InteropResult<()> {
    let tabbables = tabbable_descendants(document, root);
    let target = if tabbables.len() > min {
        tabbables
            .len()
            .checked_sub(skip + 1)
            .and_then(|index| tabbables.get(index))
    } else {
        None
    };
    document.focus(target.unwrap_or(root))
}

/// Remembers which element had focus before a region took it over.
///
/// Keyed by the region's root so several regions can save and restore
/// independently.
#[derive(Debug, Clone)]
pub struct FocusMemory<E> {
    saved: HashMap<E, E>,
}

impl<E: Clone + Eq + Hash> FocusMemory<E> {
    pub fn new() -> Self {
        Self {
            saved: HashMap::new(),
        }
    }

    /// Record the currently focused element for `root`.
    ///
    /// Overwrites anything saved earlier; nothing is recorded when no
    /// element has focus.
    pub fn save<D: Document<Element = E> + ?Sized>(&mut self, document: &D, root: &E) {
        match document.active_element() {
            Some(active) => {
                self.saved.insert(root.clone(), active);
            }
            None => {
                self.saved.remove(root);
            }
        }
    }

    /// Element saved for `root`, if any.
    pub fn saved(&self, root: &E) -> Option<&E> {
        self.saved.get(root)
    }

    /// Move focus back to the element saved for `root`.
    ///
    /// Returns whether an element was saved. The entry is consumed either way.
    pub fn restore<D: Document<Element = E> + ?Sized>(
        &mut self,
        document: &D,
        root: &E,
    ) -> InteropResult<bool> {
        match self.saved.remove(root) {
            Some(previous) => document.focus(&previous).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn forget(&mut self, root: &E) {
        self.saved.remove(root);
    }
}

impl<E: Clone + Eq + Hash> Default for FocusMemory<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Call `handler` with the arguments of every `event` reaching `element`.
///
/// With `stop_propagation` the event goes no further than `element` once
/// the handler has run.
pub fn add_event_listener<D: Document + ?Sized>(
    document: &D,
    element: &D::Element,
    event: &str,
    handler: impl Fn(&EventArgs) + 'static,
    stop_propagation: bool,
) -> InteropResult<ListenerId> {
    let listener = Listener::Event(Rc::new(move |e: &mut DomEvent| {
        handler(&e.to_args());
        if stop_propagation {
            e.stop_propagation();
        }
    }));
    let id = document.add_event_listener(element, event, listener)?;
    trace!(event, element = ?element, stop_propagation, ?id, "added event listener");
    Ok(id)
}

/// Remove a listener added by [`add_event_listener`].
pub fn remove_event_listener<D: Document + ?Sized>(
    document: &D,
    element: &D::Element,
    event: &str,
    id: ListenerId,
) -> InteropResult<()> {
    document.remove_event_listener(element, event, id)?;
    trace!(event, element = ?element, ?id, "removed event listener");
    Ok(())
}

/// Cancel the default action of each named event on `element`.
///
/// Listener ids are returned in the order of `events`. If any
/// registration fails, those already made are rolled back.
pub fn add_default_preventing_handlers<D: Document + ?Sized>(
    document: &D,
    element: &D::Element,
    events: &[&str],
) -> DialogResult<Vec<ListenerId>> {
    let mut ids = Vec::with_capacity(events.len());
    for event in events {
        match document.add_event_listener(element, event, Listener::PreventDefault) {
            Ok(id) => ids.push(id),
            Err(e) => {
                for (event, id) in events.iter().zip(&ids) {
                    let _ = document.remove_event_listener(element, event, *id);
                }
                return Err(e.into());
            }
        }
    }
    debug!(?events, element = ?element, "added default-preventing handlers");
    Ok(ids)
}

/// Remove handlers added by [`add_default_preventing_handlers`].
///
/// `events` and `ids` must pair up one to one; nothing is removed
/// otherwise. Removal continues past failures and reports the first one.
pub fn remove_default_preventing_handlers<D: Document + ?Sized>(
    document: &D,
    element: &D::Element,
    events: &[&str],
    ids: &[ListenerId],
) -> DialogResult<()> {
    if events.len() != ids.len() {
        return Err(DialogError::MismatchedArgumentCounts {
            names: events.len(),
            listeners: ids.len(),
        });
    }

    let mut first_error = None;
    for (event, id) in events.iter().zip(ids) {
        if let Err(e) = document.remove_event_listener(element, event, *id) {
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
