//! Keyboard and pointer dismissal for one dialog instance.

use crate::config::DialogKeyboardConfig;
use crate::error::DialogResult;
use crate::focus_trap::{FocusTrap, TrapElements};
use crate::interceptor::{KeyInterceptor, KeyInterceptorFactory};
use dialog_dom::Document;
use dialog_keybinds::{KeyInterceptorOptions, KeyOptions};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::debug;
use uuid::Uuid;

/// Identity of a dialog instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DialogId(Uuid);

impl DialogId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Id of the element the host renders for this dialog, e.g. `dialog_1a2b3c4d`.
    pub fn element_id(&self) -> String {
        let simple = self.0.simple().to_string();
        format!("dialog_{}", &simple[..8])
    }
}

impl Default for DialogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a dialog was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    Ok,
    Cancel,
}

/// The dialog service that owns dialog lifetimes.
pub trait DialogHost {
    /// Close `dialog` with the given reason.
    fn dismiss(&self, dialog: DialogId, reason: DismissReason);
}

/// Escape and backdrop handling plus focus trapping for one dialog.
pub struct DialogKeyboard<D: Document + 'static> {
    id: DialogId,
    element_id: String,
    config: DialogKeyboardConfig,
    document: Rc<D>,
    host: Rc<dyn DialogHost>,
    factory: KeyInterceptorFactory<D>,
    interceptor: Option<KeyInterceptor<D>>,
    trap: Option<FocusTrap<D>>,
    backdrop_handler: Option<Box<dyn Fn()>>,
}

impl<D: Document + 'static> DialogKeyboard<D> {
    pub fn new(document: Rc<D>, host: Rc<dyn DialogHost>, config: DialogKeyboardConfig) -> Self {
        let id = DialogId::new();
        Self {
            id,
            element_id: id.element_id(),
            config,
            factory: KeyInterceptorFactory::new(document.clone()),
            document,
            host,
            interceptor: None,
            trap: None,
            backdrop_handler: None,
        }
    }

    pub fn id(&self) -> DialogId {
        self.id
    }

    /// Id the host must give the dialog's container element.
    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    pub fn config(&self) -> &DialogKeyboardConfig {
        &self.config
    }

    pub fn interceptor(&self) -> Option<&KeyInterceptor<D>> {
        self.interceptor.as_ref()
    }

    pub fn focus_trap(&self) -> Option<&FocusTrap<D>> {
        self.trap.as_ref()
    }

    pub fn focus_trap_mut(&mut self) -> Option<&mut FocusTrap<D>> {
        self.trap.as_mut()
    }

    /// Replace the default backdrop behaviour with a custom handler.
    pub fn on_backdrop_click(&mut self, handler: impl Fn() + 'static) {
        self.backdrop_handler = Some(Box::new(handler));
    }

    /// Trap focus inside the rendered dialog.
    pub fn attach_focus_trap(&mut self, elements: TrapElements<D::Element>) {
        self.trap = Some(FocusTrap::new(
            self.document.clone(),
            elements,
            &self.config.focus,
        ));
    }

    /// Host hook called after each render.
    ///
    /// On the first render with `close_on_escape`, connects an Escape rule
    /// to the dialog's marked elements. A failed connection only loses
    /// Escape-to-close and is logged.
    pub fn after_render(&mut self, first_render: bool) -> DialogResult<()> {
        if first_render && self.config.close_on_escape && self.interceptor.is_none() {
            self.interceptor = Some(self.connect_escape());
        }
        match self.trap.as_mut() {
            Some(trap) => trap.after_render(first_render),
            None => Ok(()),
        }
    }

    fn connect_escape(&self) -> KeyInterceptor<D> {
        let mut interceptor = self.factory.create();
        let options = KeyInterceptorOptions::new(self.config.marker_class.as_str())
            .key(KeyOptions::new("Escape").with_subscribe_down());

        if let Err(e) = interceptor.connect(&self.element_id, &options) {
            debug!(dialog = %self.element_id, error = %e, "escape-to-close unavailable");
        }

        let host: Weak<dyn DialogHost> = Rc::downgrade(&self.host);
        let id = self.id;
        interceptor.on_key_down(move |args| {
            if args.key == "Escape" {
                if let Some(host) = host.upgrade() {
                    debug!(dialog = %id, "closing dialog on escape");
                    host.dismiss(id, DismissReason::Cancel);
                }
            }
        });
        interceptor
    }

    /// The backdrop behind the dialog was clicked.
    pub fn handle_backdrop_click(&self) {
        if self.config.disable_backdrop_click {
            return;
        }
        match &self.backdrop_handler {
            Some(handler) => handler(),
            None => self.cancel(),
        }
    }

    /// Close the dialog with [`DismissReason::Ok`].
    pub fn close(&self) {
        self.host.dismiss(self.id, DismissReason::Ok);
    }

    /// Close the dialog with [`DismissReason::Cancel`].
    pub fn cancel(&self) {
        self.host.dismiss(self.id, DismissReason::Cancel);
    }

    /// Release the interceptor and hand focus back. Idempotent.
    pub fn dispose(&mut self) {
        if let Some(mut interceptor) = self.interceptor.take() {
            interceptor.dispose();
        }
        if let Some(mut trap) = self.trap.take() {
            trap.dispose();
        }
    }
}

impl<D: Document + 'static> Drop for DialogKeyboard<D> {
    fn drop(&mut self) {
        self.dispose();
    }
}
