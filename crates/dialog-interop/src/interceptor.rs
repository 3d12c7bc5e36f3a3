//! Keyboard interception sessions.
//!
//! A [`KeyInterceptor`] binds a rule table to the marked elements of one
//! dialog. Matching events are cancelled or stopped according to each
//! rule's modifier policies and, when a rule subscribes, forwarded once to
//! the interceptor's `key_down`/`key_up` subscribers.

use crate::error::{DialogError, DialogResult};
use crate::observer::{KeyHandlers, SubtreeObserver};
use dialog_dom::{Document, KeyListener};
use dialog_keybinds::{
    matcher, KeyDirection, KeyInterceptorOptions, KeyOptions, KeyboardEvent, KeyboardEventArgs,
    RuleTable,
};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, info, trace, warn};

/// Handler receiving forwarded key events.
pub type KeyboardHandler = Rc<dyn Fn(&KeyboardEventArgs)>;

/// Handle returned when subscribing to forwarded events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Lifecycle of an interceptor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Never connected
    Idle,
    Connected,
    Disconnected,
}

#[derive(Default)]
struct Subscribers {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(SubscriptionId, KeyDirection, KeyboardHandler)>>,
}

impl Subscribers {
    fn allocate(&self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        id
    }

    fn add(&self, direction: KeyDirection, handler: KeyboardHandler) -> SubscriptionId {
        let id = self.allocate();
        self.handlers.borrow_mut().push((id, direction, handler));
        id
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(other, _, _)| *other != id);
        handlers.len() != before
    }

    fn clear(&self) {
        let handlers = std::mem::take(&mut *self.handlers.borrow_mut());
        drop(handlers);
    }

    fn count(&self, direction: KeyDirection) -> usize {
        self.handlers
            .borrow()
            .iter()
            .filter(|(_, d, _)| *d == direction)
            .count()
    }

    /// Deliver `args` to every subscriber of its direction.
    ///
    /// Handlers may subscribe, unsubscribe or dispose while running; each
    /// one is looked up again right before it is called.
    fn emit(&self, args: &KeyboardEventArgs) {
        let ids: Vec<SubscriptionId> = self
            .handlers
            .borrow()
            .iter()
            .filter(|(_, d, _)| *d == args.kind)
            .map(|(id, _, _)| *id)
            .collect();

        for id in ids {
            let handler = self
                .handlers
                .borrow()
                .iter()
                .find(|(other, _, _)| *other == id)
                .map(|(_, _, h)| h.clone());
            if let Some(handler) = handler {
                handler(args);
            }
        }
    }
}

fn key_listener(
    direction: KeyDirection,
    rules: Rc<RefCell<RuleTable>>,
    subscribers: Weak<Subscribers>,
    logging: bool,
) -> KeyListener {
    Rc::new(move |event: &mut KeyboardEvent| {
        let outcome = {
            let rules = rules.borrow();
            matcher::process(event, direction, &rules)
        };
        if logging && outcome.matched() > 0 {
            info!(
                key = %event.key,
                %direction,
                rules = outcome.matched(),
                prevented = outcome.prevented(),
                stopped = outcome.stopped(),
                "intercepted key event"
            );
        }
        if let (Some(args), Some(subscribers)) = (outcome.forward, subscribers.upgrade()) {
            subscribers.emit(&args);
        }
    })
}

/// One keyboard-interception session bound to a dialog element.
pub struct KeyInterceptor<D: Document + 'static> {
    document: Option<Rc<D>>,
    state: SessionState,
    disposed: bool,
    element_id: Option<String>,
    rules: Rc<RefCell<RuleTable>>,
    observer: Option<SubtreeObserver<D>>,
    subscribers: Rc<Subscribers>,
}

impl<D: Document + 'static> KeyInterceptor<D> {
    /// Create an idle interceptor.
    pub fn new(document: Rc<D>) -> Self {
        Self {
            document: Some(document),
            state: SessionState::Idle,
            disposed: false,
            element_id: None,
            rules: Rc::new(RefCell::new(RuleTable::new())),
            observer: None,
            subscribers: Rc::new(Subscribers::default()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Id of the element the session is bound to.
    pub fn element_id(&self) -> Option<&str> {
        self.element_id.as_deref()
    }

    /// Elements currently carrying the session's listeners.
    pub fn observed(&self) -> Vec<D::Element> {
        self.observer
            .as_ref()
            .map(|o| o.observed())
            .unwrap_or_default()
    }

    /// Bind the rules in `options` to the element with `element_id`.
    ///
    /// Connecting an already connected or disposed interceptor does
    /// nothing. On failure the interceptor stays disconnected and may be
    /// connected again.
    pub fn connect(
        &mut self,
        element_id: &str,
        options: &KeyInterceptorOptions,
    ) -> DialogResult<()> {
        if self.disposed || self.state == SessionState::Connected {
            return Ok(());
        }
        let Some(document) = self.document.clone() else {
            return Ok(());
        };

        let result = self.try_connect(document, element_id, options);
        if let Err(e) = &result {
            warn!(element_id, error = %e, "key interceptor failed to connect");
        }
        result
    }

    fn try_connect(
        &mut self,
        document: Rc<D>,
        element_id: &str,
        options: &KeyInterceptorOptions,
    ) -> DialogResult<()> {
        options.validate()?;
        let table = RuleTable::from_options(&options.keys)?;
        let root = document
            .element_by_id(element_id)
            .ok_or_else(|| DialogError::ElementNotFound(element_id.to_string()))?;

        let rules = Rc::new(RefCell::new(table));
        let subscribers = Rc::downgrade(&self.subscribers);
        let handlers = KeyHandlers {
            down: key_listener(
                KeyDirection::Down,
                rules.clone(),
                subscribers.clone(),
                options.enable_logging,
            ),
            up: key_listener(
                KeyDirection::Up,
                rules.clone(),
                subscribers,
                options.enable_logging,
            ),
        };
        let observer = SubtreeObserver::attach(document, root, &options.target_class, handlers)?;

        debug!(
            element_id,
            target_class = %options.target_class,
            rules = rules.borrow().len(),
            observed = observer.len(),
            "key interceptor connected"
        );
        self.rules = rules;
        self.observer = Some(observer);
        self.element_id = Some(element_id.to_string());
        self.state = SessionState::Connected;
        Ok(())
    }

    /// Replace the rule for an already registered key.
    ///
    /// Takes effect from the next event; ignored unless connected.
    pub fn update_key(&mut self, option: &KeyOptions) -> DialogResult<()> {
        if self.state != SessionState::Connected {
            debug!(key = %option.key, "ignoring key update on disconnected interceptor");
            return Ok(());
        }
        let replaced = self.rules.borrow_mut().update(option)?;
        trace!(key = %option.key, replaced, "updated key rule");
        Ok(())
    }

    /// Remove every listener and the subtree watcher.
    ///
    /// Host failures are logged and swallowed; calling this twice is safe.
    pub fn disconnect(&mut self) {
        if let Some(mut observer) = self.observer.take() {
            if let Err(e) = observer.detach() {
                debug!(error = %e, "ignoring failure while disconnecting key interceptor");
            }
        }
        if self.state == SessionState::Connected {
            debug!(element_id = ?self.element_id, "key interceptor disconnected");
            self.state = SessionState::Disconnected;
        }
    }

    /// Subscribe to forwarded keydown events.
    ///
    /// A disposed interceptor drops the handler; the returned id is not
    /// registered.
    pub fn on_key_down(&self, handler: impl Fn(&KeyboardEventArgs) + 'static) -> SubscriptionId {
        self.subscribe(KeyDirection::Down, Rc::new(handler))
    }

    /// Subscribe to forwarded keyup events.
    pub fn on_key_up(&self, handler: impl Fn(&KeyboardEventArgs) + 'static) -> SubscriptionId {
        self.subscribe(KeyDirection::Up, Rc::new(handler))
    }

    fn subscribe(&self, direction: KeyDirection, handler: KeyboardHandler) -> SubscriptionId {
        if self.disposed {
            warn!(%direction, "ignoring subscription to a disposed key interceptor");
            return self.subscribers.allocate();
        }
        self.subscribers.add(direction, handler)
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    /// Number of subscribers for a direction.
    pub fn subscriber_count(&self, direction: KeyDirection) -> usize {
        self.subscribers.count(direction)
    }

    /// Drop all subscribers, disconnect and release the host.
    ///
    /// The interceptor cannot be connected again afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.subscribers.clear();
        self.disconnect();
        self.document = None;
    }
}

impl<D: Document + 'static> Drop for KeyInterceptor<D> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Creates interceptors bound to one host document.
pub struct KeyInterceptorFactory<D: Document + 'static> {
    document: Rc<D>,
}

impl<D: Document + 'static> KeyInterceptorFactory<D> {
    pub fn new(document: Rc<D>) -> Self {
        Self { document }
    }

    /// A fresh, idle interceptor.
    pub fn create(&self) -> KeyInterceptor<D> {
        KeyInterceptor::new(self.document.clone())
    }
}

impl<D: Document + 'static> Clone for KeyInterceptorFactory<D> {
    fn clone(&self) -> Self {
        Self {
            document: self.document.clone(),
        }
    }
}
