//! End-to-end interception scenarios against the in-memory document.

use dialog_dom::Document;
use dialog_interop::{
    DialogError, KeyInterceptor, KeyInterceptorFactory, KeyInterceptorOptions, SessionState,
};
use dialog_keybinds::{key, pattern, KeyDirection, KeyboardEvent, KeyboardEventArgs, Modifiers};
use dialog_testing::generators::{apply_script, mutation_script};
use dialog_testing::{
    init_tracing, DialogMarkup, Fixtures, InputSequence, TestDocument, MARKER_CLASS,
};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

struct Harness {
    doc: Rc<TestDocument>,
    markup: DialogMarkup,
    interceptor: Rc<RefCell<KeyInterceptor<TestDocument>>>,
    seen: Rc<RefCell<Vec<KeyboardEventArgs>>>,
}

impl Harness {
    fn new() -> Self {
        init_tracing();
        let doc = Rc::new(TestDocument::new());
        let markup = Fixtures::dialog(&doc, "dialog_e2e").unwrap();
        let interceptor = KeyInterceptorFactory::new(doc.clone()).create();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let down = seen.clone();
        interceptor
            .on_key_down(move |args: &KeyboardEventArgs| down.borrow_mut().push(args.clone()));
        let up = seen.clone();
        interceptor.on_key_up(move |args: &KeyboardEventArgs| up.borrow_mut().push(args.clone()));

        Self {
            doc,
            markup,
            interceptor: Rc::new(RefCell::new(interceptor)),
            seen,
        }
    }

    fn connect(&self, options: KeyInterceptorOptions) {
        self.interceptor
            .borrow_mut()
            .connect("dialog_e2e", &options)
            .unwrap();
    }
}

#[test]
fn test_escape_forwarded_once() {
    let h = Harness::new();
    h.connect(KeyInterceptorOptions::new(MARKER_CLASS).key(key("Escape").with_subscribe_down()));

    h.doc.key_down(h.markup.marked[1], KeyboardEvent::new("Escape"));

    let seen = h.seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, KeyDirection::Down);
    let json = serde_json::to_value(&seen[0]).unwrap();
    assert_eq!(json["Type"], "keydown");
}

#[test]
fn test_letters_prevented_without_forwarding() {
    let h = Harness::new();
    h.connect(
        KeyInterceptorOptions::new(MARKER_CLASS)
            .key(pattern("[a-z]").with_prevent_down("key+none")),
    );

    let event = h.doc.key_down(h.markup.button, KeyboardEvent::new("a"));
    assert!(event.default_prevented());
    assert!(h.seen.borrow().is_empty());
}

#[test]
fn test_inserted_child_is_intercepted() {
    let h = Harness::new();
    h.connect(KeyInterceptorOptions::new(MARKER_CLASS).key(key("Enter").with_subscribe_up()));

    let added = h
        .doc
        .create_in(h.markup.container, Fixtures::marked_div())
        .unwrap();
    let field = h
        .doc
        .create_in(added, Fixtures::button("late"))
        .unwrap();

    h.doc.key_up(field, KeyboardEvent::new("Enter"));
    let seen = h.seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, KeyDirection::Up);
}

#[test]
fn test_overlapping_patterns_forward_once() {
    let h = Harness::new();
    h.connect(
        KeyInterceptorOptions::new(MARKER_CLASS)
            .key(pattern("[a-z]").with_subscribe_down().with_prevent_down("key+none"))
            .key(pattern("[a-f]").with_subscribe_down().with_stop_down("any"))
            .key(key("b").with_subscribe_down()),
    );

    let event = h.doc.key_down(h.markup.button, KeyboardEvent::new("B"));
    assert!(event.default_prevented());
    assert!(event.propagation_stopped());
    assert_eq!(h.seen.borrow().len(), 1);
}

#[test]
fn test_stopped_event_does_not_reach_outer_marked_element() {
    let h = Harness::new();
    // Nested marked element inside the first marked element.
    let inner = h
        .doc
        .create_in(h.markup.marked[0], Fixtures::marked_div())
        .unwrap();
    h.connect(
        KeyInterceptorOptions::new(MARKER_CLASS)
            .key(key("Tab").with_subscribe_down().with_stop_down("key+shift")),
    );

    h.doc
        .key_down(inner, KeyboardEvent::new("Tab").with_modifiers(Modifiers::SHIFT));
    assert_eq!(h.seen.borrow().len(), 1);

    h.doc.key_down(inner, KeyboardEvent::new("Tab"));
    // Not stopped: both marked ancestors forward it.
    assert_eq!(h.seen.borrow().len(), 3);
}

#[test]
fn test_input_sequence() {
    let h = Harness::new();
    h.connect(
        KeyInterceptorOptions::new(MARKER_CLASS)
            .with_logging()
            .key(pattern("[0-9]").with_subscribe_down().with_subscribe_up()),
    );

    let mut seq = InputSequence::new();
    seq.text("a1b2").escape();
    seq.dispatch(&h.doc, h.markup.button);

    let keys: Vec<(String, KeyDirection)> = h
        .seen
        .borrow()
        .iter()
        .map(|a| (a.key.clone(), a.kind))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("1".to_string(), KeyDirection::Down),
            ("1".to_string(), KeyDirection::Up),
            ("2".to_string(), KeyDirection::Down),
            ("2".to_string(), KeyDirection::Up),
        ]
    );
}

#[test]
fn test_disconnect_from_inside_subscriber() {
    let h = Harness::new();
    h.connect(KeyInterceptorOptions::new(MARKER_CLASS).key(key("Escape").with_subscribe_down()));

    let weak = Rc::downgrade(&h.interceptor);
    h.interceptor.borrow().on_key_down(move |_: &KeyboardEventArgs| {
        if let Some(interceptor) = weak.upgrade() {
            interceptor.borrow_mut().disconnect();
        }
    });

    h.doc.key_down(h.markup.button, KeyboardEvent::new("Escape"));
    assert_eq!(h.interceptor.borrow().state(), SessionState::Disconnected);
    assert_eq!(h.doc.total_listeners(), 0);
    assert_eq!(h.seen.borrow().len(), 1);

    h.doc.key_down(h.markup.button, KeyboardEvent::new("Escape"));
    assert_eq!(h.seen.borrow().len(), 1);
}

#[test]
fn test_dispose_from_inside_subscriber_skips_remaining() {
    let h = Harness::new();
    h.connect(KeyInterceptorOptions::new(MARKER_CLASS).key(key("Escape").with_subscribe_down()));

    // Registered after the harness recorder, so the recorder runs first;
    // a second recorder registered after disposal must never run.
    let weak = Rc::downgrade(&h.interceptor);
    h.interceptor.borrow().on_key_down(move |_: &KeyboardEventArgs| {
        if let Some(interceptor) = weak.upgrade() {
            interceptor.borrow_mut().dispose();
        }
    });
    let late = Rc::new(RefCell::new(0));
    let counter = late.clone();
    h.interceptor
        .borrow()
        .on_key_down(move |_: &KeyboardEventArgs| *counter.borrow_mut() += 1);

    h.doc.key_down(h.markup.button, KeyboardEvent::new("Escape"));
    assert!(h.interceptor.borrow().is_disposed());
    assert_eq!(*late.borrow(), 0);
    assert_eq!(h.doc.total_listeners(), 0);
    assert_eq!(h.doc.observer_count(), 0);
}

#[test]
fn test_connect_and_disconnect_are_idempotent() {
    let h = Harness::new();
    let options = KeyInterceptorOptions::new(MARKER_CLASS).key(key("x"));
    h.connect(options.clone());
    h.connect(options);
    for marked in &h.markup.marked {
        assert_eq!(h.doc.attach_count(*marked, "keydown"), 1);
    }

    let mut interceptor = h.interceptor.borrow_mut();
    interceptor.disconnect();
    interceptor.disconnect();
    for marked in &h.markup.marked {
        assert_eq!(h.doc.detach_count(*marked, "keydown"), 1);
    }
}

#[test]
fn test_failed_connect_is_reconnectable() {
    let h = Harness::new();
    let err = h
        .interceptor
        .borrow_mut()
        .connect("nope", &KeyInterceptorOptions::new(MARKER_CLASS))
        .unwrap_err();
    assert!(matches!(err, DialogError::ElementNotFound(_)));
    assert!(err.is_usage_error());

    h.connect(KeyInterceptorOptions::new(MARKER_CLASS));
    assert!(h.interceptor.borrow().is_connected());
}

proptest! {
    #[test]
    fn test_listener_balance_stays_zero_or_one(script in mutation_script(1..40)) {
        let doc = Rc::new(TestDocument::new());
        let markup = Fixtures::dialog(&doc, "dialog_prop").unwrap();
        let mut interceptor = KeyInterceptorFactory::new(doc.clone()).create();
        interceptor
            .connect("dialog_prop", &KeyInterceptorOptions::new(MARKER_CLASS).key(key("a")))
            .unwrap();

        let mut nodes = apply_script(&doc, markup.container, &script).unwrap();
        doc.flush_mutations();
        nodes.extend(markup.marked.iter().copied());

        for node in &nodes {
            for event in ["keydown", "keyup"] {
                let attached = doc.attach_count(*node, event);
                let detached = doc.detach_count(*node, event);
                prop_assert!(attached >= detached);
                prop_assert!(attached - detached <= 1);
                prop_assert_eq!(doc.listener_count(*node, event), attached - detached);
            }
        }

        // Every marked element still inside the dialog is observed, and
        // nothing else is.
        let mut expected: Vec<_> = nodes
            .iter()
            .copied()
            .filter(|n| doc.contains(&markup.container, n) && doc.has_class(n, MARKER_CLASS))
            .collect();
        expected.sort();
        expected.dedup();
        let mut observed = interceptor.observed();
        observed.sort();
        prop_assert_eq!(observed, expected);

        interceptor.disconnect();
        prop_assert_eq!(doc.total_listeners(), 0);
    }
}
