//! In-memory document for headless testing.

use crate::{TestError, TestResult};
use dialog_dom::{
    Document, DomEvent, ElementDescriptor, InteropError, InteropResult, Listener, ListenerId,
    MutationCallback, MutationRecord, ObserverId,
};
use dialog_keybinds::{KeyDirection, KeyboardEvent};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Handle of a node in a [`TestDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node {
    descriptor: ElementDescriptor,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<Registration>,
}

#[derive(Debug, Clone)]
struct Registration {
    event: String,
    id: ListenerId,
    listener: Listener,
}

struct Observer {
    root: NodeId,
    callback: MutationCallback<NodeId>,
    pending: Vec<MutationRecord<NodeId>>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Counters {
    added: usize,
    removed: usize,
}

struct Inner {
    nodes: Vec<Node>,
    active: Option<NodeId>,
    focus_history: Vec<NodeId>,
    observers: BTreeMap<ObserverId, Observer>,
    listener_counters: BTreeMap<(NodeId, String), Counters>,
    next_listener: u64,
    next_observer: u64,
    fail_interop: bool,
}

/// A document tree kept entirely in memory.
///
/// Mutations are queued per observer and delivered in a batch by
/// [`flush_mutations`](Self::flush_mutations), or implicitly before an
/// event is dispatched. No internal borrow is held while listeners or
/// observers run, so callbacks may call back into the document.
pub struct TestDocument {
    inner: RefCell<Inner>,
}

impl TestDocument {
    /// Create a document holding only a `body` element.
    pub fn new() -> Self {
        let body = Node {
            descriptor: ElementDescriptor::new("body"),
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        };
        Self {
            inner: RefCell::new(Inner {
                nodes: vec![body],
                active: None,
                focus_history: Vec::new(),
                observers: BTreeMap::new(),
                listener_counters: BTreeMap::new(),
                next_listener: 1,
                next_observer: 1,
                fail_interop: false,
            }),
        }
    }

    /// The document root.
    pub fn body(&self) -> NodeId {
        NodeId(0)
    }

    /// Create a detached element.
    pub fn create(&self, descriptor: ElementDescriptor) -> NodeId {
        let mut inner = self.inner.borrow_mut();
        inner.nodes.push(Node {
            descriptor,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        });
        NodeId(inner.nodes.len() - 1)
    }

    /// Create an element and append it to `parent`.
    pub fn create_in(&self, parent: NodeId, descriptor: ElementDescriptor) -> TestResult<NodeId> {
        let node = self.create(descriptor);
        self.append(parent, node)?;
        Ok(node)
    }

    /// Append `child` as the last child of `parent`, moving it if needed.
    pub fn append(&self, parent: NodeId, child: NodeId) -> TestResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.check(parent)?;
        inner.check(child)?;
        if inner.contains(child, parent) {
            return Err(TestError::HierarchyRequest { parent, child });
        }

        if let Some(old_parent) = inner.nodes[child.0].parent {
            inner.unlink(old_parent, child);
        }
        inner.nodes[child.0].parent = Some(parent);
        inner.nodes[parent.0].children.push(child);
        inner.record(parent, MutationRecord::added(parent, child));
        Ok(())
    }

    /// Detach `node` (and its subtree) from its parent.
    pub fn remove(&self, node: NodeId) -> TestResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.check(node)?;
        if let Some(parent) = inner.nodes[node.0].parent {
            inner.unlink(parent, node);
        }
        Ok(())
    }

    /// Set an attribute on a node.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> TestResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.check(node)?;
        inner.nodes[node.0]
            .descriptor
            .attributes
            .insert(name.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    /// Add a CSS class to a node.
    pub fn add_class(&self, node: NodeId, class: &str) -> TestResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.check(node)?;
        let descriptor = &mut inner.nodes[node.0].descriptor;
        if !descriptor.has_class(class) {
            descriptor.classes.push(class.to_string());
        }
        Ok(())
    }

    /// Children of a node.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .borrow()
            .nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Deliver all queued mutation batches.
    ///
    /// Returns the number of batches delivered.
    pub fn flush_mutations(&self) -> usize {
        let mut delivered = 0;
        loop {
            let batch = {
                let mut inner = self.inner.borrow_mut();
                inner
                    .observers
                    .values_mut()
                    .find(|o| !o.pending.is_empty())
                    .map(|o| (o.callback.clone(), std::mem::take(&mut o.pending)))
            };
            let Some((callback, records)) = batch else {
                return delivered;
            };
            callback(&records);
            delivered += 1;
        }
    }

    /// Number of undelivered mutation records.
    pub fn pending_mutations(&self) -> usize {
        self.inner
            .borrow()
            .observers
            .values()
            .map(|o| o.pending.len())
            .sum()
    }

    /// Dispatch a key event at `target`, bubbling up to the document root.
    ///
    /// Pending mutations are delivered first. Bubbling ends after the
    /// element on which propagation was stopped. A listener removed while
    /// the event is in flight is not called.
    pub fn dispatch_key(
        &self,
        target: NodeId,
        direction: KeyDirection,
        mut event: KeyboardEvent,
    ) -> KeyboardEvent {
        self.flush_mutations();

        for node in self.path(target) {
            for id in self.listener_ids(node, direction.event_name()) {
                let Some(listener) = self.registered(node, id) else {
                    continue;
                };
                match listener {
                    Listener::Keyboard(callback) => callback(&mut event),
                    Listener::Event(callback) => {
                        let mut wrapped = DomEvent::keyboard(direction, event.clone());
                        callback(&mut wrapped);
                        if wrapped.default_prevented() {
                            event.prevent_default();
                        }
                        if wrapped.propagation_stopped() {
                            event.stop_propagation();
                        }
                    }
                    Listener::PreventDefault => event.prevent_default(),
                }
            }
            if event.propagation_stopped() {
                break;
            }
        }
        event
    }

    /// Dispatch a `keydown` for `event` at `target`.
    pub fn key_down(&self, target: NodeId, event: KeyboardEvent) -> KeyboardEvent {
        self.dispatch_key(target, KeyDirection::Down, event)
    }

    /// Dispatch a `keyup` for `event` at `target`.
    pub fn key_up(&self, target: NodeId, event: KeyboardEvent) -> KeyboardEvent {
        self.dispatch_key(target, KeyDirection::Up, event)
    }

    /// Dispatch a non-keyboard event named `name` at `target`, bubbling
    /// the same way as [`dispatch_key`](Self::dispatch_key).
    ///
    /// Keyboard listeners registered under the same name are skipped.
    pub fn dispatch(&self, target: NodeId, name: &str) -> DomEvent {
        self.flush_mutations();

        let mut event = DomEvent::new(name);
        for node in self.path(target) {
            for id in self.listener_ids(node, name) {
                match self.registered(node, id) {
                    Some(Listener::Event(callback)) => callback(&mut event),
                    Some(Listener::PreventDefault) => event.prevent_default(),
                    Some(Listener::Keyboard(_)) | None => {}
                }
            }
            if event.propagation_stopped() {
                break;
            }
        }
        event
    }

    /// Dispatch `event` at `target` and report whether its default action
    /// was cancelled.
    pub fn dispatch_event(&self, target: NodeId, event: &str) -> bool {
        self.dispatch(target, event).default_prevented()
    }

    /// Listeners currently attached to `node` for `event`.
    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        self.inner
            .borrow()
            .nodes
            .get(node.0)
            .map(|n| n.listeners.iter().filter(|r| r.event == event).count())
            .unwrap_or(0)
    }

    /// Listeners attached anywhere in the document.
    pub fn total_listeners(&self) -> usize {
        self.inner
            .borrow()
            .nodes
            .iter()
            .map(|n| n.listeners.len())
            .sum()
    }

    /// How many times a listener for `event` was attached to `node`.
    pub fn attach_count(&self, node: NodeId, event: &str) -> usize {
        self.counters(node, event).added
    }

    /// How many times a listener for `event` was detached from `node`.
    pub fn detach_count(&self, node: NodeId, event: &str) -> usize {
        self.counters(node, event).removed
    }

    /// Active child-list observers.
    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    /// Every element focused so far, oldest first.
    pub fn focus_history(&self) -> Vec<NodeId> {
        self.inner.borrow().focus_history.clone()
    }

    /// Make every subsequent host call fail.
    pub fn set_fail_interop(&self, fail: bool) {
        self.inner.borrow_mut().fail_interop = fail;
    }

    fn counters(&self, node: NodeId, event: &str) -> Counters {
        self.inner
            .borrow()
            .listener_counters
            .get(&(node, event.to_string()))
            .copied()
            .unwrap_or_default()
    }

    fn path(&self, target: NodeId) -> Vec<NodeId> {
        let inner = self.inner.borrow();
        let mut path = Vec::new();
        let mut current = inner.nodes.get(target.0).map(|_| target);
        while let Some(node) = current {
            path.push(node);
            current = inner.nodes[node.0].parent;
        }
        path
    }

    fn listener_ids(&self, node: NodeId, event: &str) -> Vec<ListenerId> {
        self.inner
            .borrow()
            .nodes
            .get(node.0)
            .map(|n| {
                n.listeners
                    .iter()
                    .filter(|r| r.event == event)
                    .map(|r| r.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The listener behind `id`, if it is still attached to `node`.
    fn registered(&self, node: NodeId, id: ListenerId) -> Option<Listener> {
        self.inner
            .borrow()
            .nodes
            .get(node.0)?
            .listeners
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.listener.clone())
    }
}

impl Default for TestDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn check(&self, node: NodeId) -> TestResult<()> {
        if node.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(TestError::UnknownNode(node))
        }
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.nodes.get(n.0).and_then(|n| n.parent);
        }
        false
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        // Recorded while the child is still in place so observers of the
        // old subtree see the removal.
        self.record(parent, MutationRecord::removed(parent, child));
        self.nodes[parent.0].children.retain(|c| *c != child);
        self.nodes[child.0].parent = None;
    }

    fn record(&mut self, parent: NodeId, record: MutationRecord<NodeId>) {
        let roots: Vec<(ObserverId, NodeId)> =
            self.observers.iter().map(|(id, o)| (*id, o.root)).collect();
        for (id, root) in roots {
            if self.contains(root, parent) {
                if let Some(observer) = self.observers.get_mut(&id) {
                    observer.pending.push(record.clone());
                }
            }
        }
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.nodes.get(root.0) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.contains(NodeId(0), node)
    }

    fn fail_check(&self, call: &str) -> InteropResult<()> {
        if self.fail_interop {
            Err(InteropError::Host(format!("{} failed", call)))
        } else {
            Ok(())
        }
    }
}

impl Document for TestDocument {
    type Element = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let inner = self.inner.borrow();
        inner
            .descendants(NodeId(0))
            .into_iter()
            .find(|n| inner.nodes[n.0].descriptor.id() == Some(id))
    }

    fn descendants(&self, root: &NodeId) -> Vec<NodeId> {
        self.inner.borrow().descendants(*root)
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        self.inner.borrow().contains(*ancestor, *node)
    }

    fn describe(&self, element: &NodeId) -> Option<ElementDescriptor> {
        self.inner
            .borrow()
            .nodes
            .get(element.0)
            .map(|n| n.descriptor.clone())
    }

    fn is_connected(&self, element: &NodeId) -> bool {
        self.inner.borrow().is_connected(*element)
    }

    fn active_element(&self) -> Option<NodeId> {
        let inner = self.inner.borrow();
        inner.active.filter(|n| inner.is_connected(*n))
    }

    fn focus(&self, element: &NodeId) -> InteropResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.fail_check("focus")?;
        if !inner.is_connected(*element) {
            return Err(InteropError::Detached);
        }
        inner.active = Some(*element);
        inner.focus_history.push(*element);
        Ok(())
    }

    fn blur(&self, element: &NodeId) -> InteropResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.fail_check("blur")?;
        if inner.active == Some(*element) {
            inner.active = None;
        }
        Ok(())
    }

    fn add_event_listener(
        &self,
        element: &NodeId,
        event: &str,
        listener: Listener,
    ) -> InteropResult<ListenerId> {
        let mut inner = self.inner.borrow_mut();
        inner.fail_check("addEventListener")?;
        if element.0 >= inner.nodes.len() {
            return Err(InteropError::Detached);
        }
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.nodes[element.0].listeners.push(Registration {
            event: event.to_string(),
            id,
            listener,
        });
        inner
            .listener_counters
            .entry((*element, event.to_string()))
            .or_default()
            .added += 1;
        Ok(id)
    }

    fn remove_event_listener(
        &self,
        element: &NodeId,
        event: &str,
        id: ListenerId,
    ) -> InteropResult<()> {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            inner.fail_check("removeEventListener")?;
            let node = inner
                .nodes
                .get_mut(element.0)
                .ok_or(InteropError::UnknownListener(id))?;
            let position = node
                .listeners
                .iter()
                .position(|r| r.id == id && r.event == event)
                .ok_or(InteropError::UnknownListener(id))?;
            let registration = node.listeners.remove(position);
            inner
                .listener_counters
                .entry((*element, event.to_string()))
                .or_default()
                .removed += 1;
            registration
        };
        // Dropped outside the borrow; the closure may own the last handle
        // to state that touches the document on drop.
        drop(removed);
        Ok(())
    }

    fn observe_child_list(
        &self,
        root: &NodeId,
        callback: MutationCallback<NodeId>,
    ) -> InteropResult<ObserverId> {
        let mut inner = self.inner.borrow_mut();
        inner.fail_check("observe")?;
        let id = ObserverId(inner.next_observer);
        inner.next_observer += 1;
        inner.observers.insert(
            id,
            Observer {
                root: *root,
                callback,
                pending: Vec::new(),
            },
        );
        Ok(id)
    }

    fn disconnect_observer(&self, id: ObserverId) -> InteropResult<()> {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            inner.fail_check("disconnect")?;
            inner
                .observers
                .remove(&id)
                .ok_or(InteropError::UnknownObserver(id))?
        };
        drop(removed.callback);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn div() -> ElementDescriptor {
        ElementDescriptor::new("div")
    }

    #[test]
    fn test_tree_building() {
        let doc = TestDocument::new();
        let a = doc.create_in(doc.body(), div().with_attribute("id", "a")).unwrap();
        let b = doc.create_in(a, div()).unwrap();
        let c = doc.create_in(a, div()).unwrap();
        let d = doc.create_in(b, div()).unwrap();

        assert_eq!(doc.descendants(&a), vec![b, d, c]);
        assert!(doc.contains(&a, &d));
        assert!(doc.contains(&a, &a));
        assert!(!doc.contains(&b, &c));
        assert_eq!(doc.element_by_id("a"), Some(a));
    }

    #[test]
    fn test_detached_lookup() {
        let doc = TestDocument::new();
        let a = doc.create(div().with_attribute("id", "a"));
        assert_eq!(doc.element_by_id("a"), None);
        assert!(!doc.is_connected(&a));
        assert_eq!(doc.focus(&a), Err(InteropError::Detached));
    }

    #[test]
    fn test_cycle_rejected() {
        let doc = TestDocument::new();
        let a = doc.create_in(doc.body(), div()).unwrap();
        let b = doc.create_in(a, div()).unwrap();
        assert!(matches!(
            doc.append(b, a),
            Err(TestError::HierarchyRequest { .. })
        ));
    }

    #[test]
    fn test_bubbling_and_stop() {
        let doc = TestDocument::new();
        let outer = doc.create_in(doc.body(), div()).unwrap();
        let inner = doc.create_in(outer, div()).unwrap();
        let hits = Rc::new(Cell::new(0));

        let counter = hits.clone();
        doc.add_event_listener(
            &outer,
            "keydown",
            Listener::Keyboard(Rc::new(move |_: &mut KeyboardEvent| {
                counter.set(counter.get() + 1)
            })),
        )
        .unwrap();

        doc.key_down(inner, KeyboardEvent::new("a"));
        assert_eq!(hits.get(), 1);

        doc.add_event_listener(
            &inner,
            "keydown",
            Listener::Keyboard(Rc::new(|e: &mut KeyboardEvent| e.stop_propagation())),
        )
        .unwrap();
        let event = doc.key_down(inner, KeyboardEvent::new("a"));
        assert!(event.propagation_stopped());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_mutations_are_batched() {
        let doc = TestDocument::new();
        let root = doc.create_in(doc.body(), div()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        doc.observe_child_list(
            &root,
            Rc::new(move |records: &[MutationRecord<NodeId>]| {
                sink.borrow_mut().push(records.len())
            }),
        )
        .unwrap();

        let a = doc.create_in(root, div()).unwrap();
        doc.create_in(a, div()).unwrap();
        doc.remove(a).unwrap();
        // Outside the observed root
        doc.create_in(doc.body(), div()).unwrap();

        assert_eq!(doc.pending_mutations(), 3);
        assert_eq!(doc.flush_mutations(), 1);
        assert_eq!(*seen.borrow(), vec![3]);
        assert_eq!(doc.flush_mutations(), 0);
    }

    #[test]
    fn test_listener_bookkeeping() {
        let doc = TestDocument::new();
        let a = doc.create_in(doc.body(), div()).unwrap();
        let id = doc
            .add_event_listener(&a, "keyup", Listener::PreventDefault)
            .unwrap();
        assert_eq!(doc.listener_count(a, "keyup"), 1);

        doc.remove_event_listener(&a, "keyup", id).unwrap();
        assert_eq!(
            doc.remove_event_listener(&a, "keyup", id),
            Err(InteropError::UnknownListener(id))
        );
        assert_eq!(doc.attach_count(a, "keyup"), 1);
        assert_eq!(doc.detach_count(a, "keyup"), 1);
        assert_eq!(doc.total_listeners(), 0);
    }

    #[test]
    fn test_fail_interop() {
        let doc = TestDocument::new();
        let a = doc.create_in(doc.body(), div()).unwrap();
        doc.set_fail_interop(true);
        assert!(matches!(doc.focus(&a), Err(InteropError::Host(_))));
        doc.set_fail_interop(false);
        doc.focus(&a).unwrap();
        assert_eq!(doc.active_element(), Some(a));

        doc.remove(a).unwrap();
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn test_listener_removed_mid_dispatch_is_skipped() {
        let doc = Rc::new(TestDocument::new());
        let a = doc.create_in(doc.body(), div()).unwrap();
        let later = Rc::new(Cell::new(None::<ListenerId>));
        let hits = Rc::new(Cell::new(0));

        let weak = Rc::downgrade(&doc);
        let target = later.clone();
        doc.add_event_listener(
            &a,
            "keydown",
            Listener::Keyboard(Rc::new(move |_: &mut KeyboardEvent| {
                if let (Some(doc), Some(id)) = (weak.upgrade(), target.get()) {
                    doc.remove_event_listener(&a, "keydown", id).unwrap();
                }
            })),
        )
        .unwrap();
        let counter = hits.clone();
        let id = doc
            .add_event_listener(
                &a,
                "keydown",
                Listener::Keyboard(Rc::new(move |_: &mut KeyboardEvent| {
                    counter.set(counter.get() + 1)
                })),
            )
            .unwrap();
        later.set(Some(id));

        doc.key_down(a, KeyboardEvent::new("a"));
        assert_eq!(hits.get(), 0);
        assert_eq!(doc.listener_count(a, "keydown"), 1);
    }

    #[test]
    fn test_generic_dispatch_bubbles() {
        let doc = TestDocument::new();
        let outer = doc.create_in(doc.body(), div()).unwrap();
        let inner = doc.create_in(outer, div()).unwrap();
        let names = Rc::new(RefCell::new(Vec::new()));

        let seen = names.clone();
        doc.add_event_listener(
            &outer,
            "click",
            Listener::Event(Rc::new(move |e: &mut DomEvent| {
                seen.borrow_mut().push(e.name().to_string())
            })),
        )
        .unwrap();
        doc.add_event_listener(&inner, "click", Listener::PreventDefault)
            .unwrap();

        let event = doc.dispatch(inner, "click");
        assert!(event.default_prevented());
        assert_eq!(*names.borrow(), vec!["click".to_string()]);

        doc.add_event_listener(
            &inner,
            "click",
            Listener::Event(Rc::new(|e: &mut DomEvent| e.stop_propagation())),
        )
        .unwrap();
        assert!(doc.dispatch(inner, "click").propagation_stopped());
        assert_eq!(names.borrow().len(), 1);
    }

    #[test]
    fn test_event_listener_on_key_events() {
        let doc = TestDocument::new();
        let a = doc.create_in(doc.body(), div()).unwrap();
        doc.add_event_listener(
            &a,
            "keyup",
            Listener::Event(Rc::new(|e: &mut DomEvent| {
                if e.key_event().map(|k| k.key.as_str()) == Some("Escape") {
                    e.prevent_default();
                }
            })),
        )
        .unwrap();

        assert!(doc.key_up(a, KeyboardEvent::new("Escape")).default_prevented());
        assert!(!doc.key_up(a, KeyboardEvent::new("Enter")).default_prevented());
        assert!(!doc.key_down(a, KeyboardEvent::new("Escape")).default_prevented());
    }
}
