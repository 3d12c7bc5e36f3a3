//! Tracking of marked elements inside a dialog subtree.
//!
//! A [`SubtreeObserver`] keeps key listeners attached to exactly those
//! elements below a root that carry the marker class, following the
//! subtree as elements are added, moved and removed.

use dialog_dom::{
    Document, InteropResult, KeyListener, Listener, ListenerId, MutationRecord, ObserverId,
};
use dialog_keybinds::KeyDirection;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// Listeners installed on every observed element.
#[derive(Clone)]
pub struct KeyHandlers {
    pub down: KeyListener,
    pub up: KeyListener,
}

#[derive(Debug, Clone, Copy)]
struct Attached {
    down: ListenerId,
    up: ListenerId,
}

struct State<E> {
    root: E,
    marker_class: String,
    handlers: KeyHandlers,
    observed: HashMap<E, Attached>,
    watcher: Option<ObserverId>,
}

impl<E: Clone + Eq + std::hash::Hash + std::fmt::Debug + 'static> State<E> {
    fn attach<D: Document<Element = E> + ?Sized>(
        &mut self,
        document: &D,
        element: &E,
    ) -> InteropResult<bool> {
        if self.observed.contains_key(element) {
            return Ok(false);
        }

        let down = document.add_event_listener(
            element,
            KeyDirection::Down.event_name(),
            Listener::Keyboard(self.handlers.down.clone()),
        )?;
        let up = match document.add_event_listener(
            element,
            KeyDirection::Up.event_name(),
            Listener::Keyboard(self.handlers.up.clone()),
        ) {
            Ok(id) => id,
            Err(e) => {
                let _ =
                    document.remove_event_listener(element, KeyDirection::Down.event_name(), down);
                return Err(e);
            }
        };

        self.observed.insert(element.clone(), Attached { down, up });
        trace!(element = ?element, "attached key listeners");
        Ok(true)
    }

    fn detach<D: Document<Element = E> + ?Sized>(
        &mut self,
        document: &D,
        element: &E,
    ) -> InteropResult<bool> {
        let Some(attached) = self.observed.remove(element) else {
            return Ok(false);
        };

        let down =
            document.remove_event_listener(element, KeyDirection::Down.event_name(), attached.down);
        let up =
            document.remove_event_listener(element, KeyDirection::Up.event_name(), attached.up);
        trace!(element = ?element, "detached key listeners");
        down.and(up).map(|_| true)
    }

    /// `node` itself if marked, followed by its marked descendants.
    fn marked_subtree<D: Document<Element = E> + ?Sized>(&self, document: &D, node: &E) -> Vec<E> {
        let mut marked = Vec::new();
        if document.has_class(node, &self.marker_class) {
            marked.push(node.clone());
        }
        marked.extend(document.descendants_with_class(node, &self.marker_class));
        marked
    }

    fn apply<D: Document<Element = E> + ?Sized>(
        &mut self,
        document: &D,
        records: &[MutationRecord<E>],
    ) {
        for record in records {
            for node in &record.added {
                for element in self.marked_subtree(document, node) {
                    if let Err(e) = self.attach(document, &element) {
                        debug!(element = ?element, error = %e, "could not attach key listeners");
                    }
                }
            }

            for node in &record.removed {
                let gone: Vec<E> = self
                    .observed
                    .keys()
                    .filter(|el| document.contains(node, el))
                    .cloned()
                    .collect();
                for element in gone {
                    if let Err(e) = self.detach(document, &element) {
                        debug!(element = ?element, error = %e, "could not detach key listeners");
                    }
                }
            }
        }
    }
}

/// Keeps key listeners on the marked elements below a root.
pub struct SubtreeObserver<D: Document> {
    document: Rc<D>,
    state: Rc<RefCell<State<D::Element>>>,
}

impl<D: Document + 'static> SubtreeObserver<D> {
    /// Start watching `root` and attach to every marked element already in it.
    ///
    /// The watcher is installed before the initial scan so elements added
    /// in between are not missed; attaching twice is a no-op.
    pub fn attach(
        document: Rc<D>,
        root: D::Element,
        marker_class: &str,
        handlers: KeyHandlers,
    ) -> InteropResult<Self> {
        let state = Rc::new(RefCell::new(State {
            root: root.clone(),
            marker_class: marker_class.to_string(),
            handlers,
            observed: HashMap::new(),
            watcher: None,
        }));

        let weak_state: Weak<RefCell<State<D::Element>>> = Rc::downgrade(&state);
        let weak_document: Weak<D> = Rc::downgrade(&document);
        let watcher = document.observe_child_list(
            &root,
            Rc::new(move |records: &[MutationRecord<D::Element>]| {
                let (Some(state), Some(document)) = (weak_state.upgrade(), weak_document.upgrade())
                else {
                    return;
                };
                state.borrow_mut().apply(&*document, records);
            }),
        )?;

        {
            let mut guard = state.borrow_mut();
            guard.watcher = Some(watcher);
            for element in document.descendants_with_class(&root, marker_class) {
                if let Err(e) = guard.attach(&*document, &element) {
                    debug!(element = ?element, error = %e, "could not attach key listeners");
                }
            }
            debug!(
                root = ?root,
                marker_class,
                observed = guard.observed.len(),
                "observing dialog subtree"
            );
        }

        Ok(Self { document, state })
    }

    pub fn root(&self) -> D::Element {
        self.state.borrow().root.clone()
    }

    /// Whether listeners are attached to `element`.
    pub fn is_observing(&self, element: &D::Element) -> bool {
        self.state.borrow().observed.contains_key(element)
    }

    /// Elements with attached listeners, in no particular order.
    pub fn observed(&self) -> Vec<D::Element> {
        self.state.borrow().observed.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().observed.is_empty()
    }

    /// Whether the subtree watcher is still installed.
    pub fn is_watching(&self) -> bool {
        self.state.borrow().watcher.is_some()
    }

    /// Stop watching and detach every listener.
    ///
    /// Keeps going after a failed host call and reports the first failure.
    pub fn detach(&mut self) -> InteropResult<()> {
        let mut first_error = None;

        let watcher = self.state.borrow_mut().watcher.take();
        if let Some(watcher) = watcher {
            if let Err(e) = self.document.disconnect_observer(watcher) {
                first_error.get_or_insert(e);
            }
        }

        let elements = self.observed();
        for element in elements {
            let result = self.state.borrow_mut().detach(&*self.document, &element);
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<D: Document> Drop for SubtreeObserver<D> {
    fn drop(&mut self) {
        let Ok(mut state) = self.state.try_borrow_mut() else {
            return;
        };
        if let Some(watcher) = state.watcher.take() {
            let _ = self.document.disconnect_observer(watcher);
        }
        let observed: Vec<_> = state.observed.drain().collect();
        drop(state);
        for (element, attached) in observed {
            let _ = self.document.remove_event_listener(
                &element,
                KeyDirection::Down.event_name(),
                attached.down,
            );
            let _ = self.document.remove_event_listener(
                &element,
                KeyDirection::Up.event_name(),
                attached.up,
            );
        }
    }
}
