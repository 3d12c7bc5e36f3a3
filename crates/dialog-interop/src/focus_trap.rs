//! Focus trapping for modal regions.
//!
//! The host renders four tabbable sentinels around the trapped content:
//!
//! ```text
//! root
//!   entry      -> first content element
//!   leading    -> first, or last when tabbing backwards
//!   ...content...
//!   leading    -> first, or last when tabbing backwards
//!   trailing   -> last content element
//! ```
//!
//! and forwards their focus events to [`FocusTrap::on_sentinel_focus`].
//! Tabbing out of either end of the content lands on a leading sentinel,
//! which sends focus round to the other end.

use crate::config::FocusTrapConfig;
use crate::element_ref::{focus_first, focus_last, FocusMemory};
use crate::error::DialogResult;
use dialog_dom::{tabbable_descendants, Document};
use dialog_keybinds::KeyboardEventArgs;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, trace};

/// Tabbable sentinels counted before the content.
const SENTINELS_BEFORE: usize = 2;
/// Trap made only of sentinels has this many tabbables.
const SENTINEL_COUNT: usize = 4;

/// Where focus goes when the trap first initializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultFocus {
    /// The fallback element, or the root without one
    Element,
    #[default]
    FirstChild,
    LastChild,
    /// Leave focus where it is
    None,
}

/// A sentinel element reporting focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    /// Between the outer sentinels and the content; follows tab direction
    Leading,
    /// Outermost after the content; always the last element
    Trailing,
    /// Outermost before the content; always the first element
    Entry,
}

/// Elements the trap works with.
#[derive(Debug, Clone)]
pub struct TrapElements<E> {
    /// Container of sentinels and content
    pub root: E,
    /// Receives focus when the root itself is focused
    pub fallback: Option<E>,
}

/// Keeps keyboard focus cycling inside a region.
pub struct FocusTrap<D: Document + 'static> {
    document: Rc<D>,
    root: D::Element,
    fallback: Option<D::Element>,
    default_focus: DefaultFocus,
    disabled: bool,
    initialized: bool,
    shift_down: bool,
    should_render: bool,
    memory: FocusMemory<D::Element>,
    disposed: bool,
}

impl<D: Document + 'static> FocusTrap<D> {
    pub fn new(
        document: Rc<D>,
        elements: TrapElements<D::Element>,
        config: &FocusTrapConfig,
    ) -> Self {
        Self {
            document,
            root: elements.root,
            fallback: elements.fallback,
            default_focus: config.default_focus,
            disabled: config.disabled,
            initialized: false,
            shift_down: false,
            should_render: true,
            memory: FocusMemory::new(),
            disposed: false,
        }
    }

    pub fn root(&self) -> &D::Element {
        &self.root
    }

    pub fn default_focus(&self) -> DefaultFocus {
        self.default_focus
    }

    pub fn set_default_focus(&mut self, default_focus: DefaultFocus) {
        self.default_focus = default_focus;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Enable or disable trapping.
    ///
    /// A change re-arms initial focus for the next render.
    pub fn set_disabled(&mut self, disabled: bool) {
        if self.disabled != disabled {
            self.disabled = disabled;
            self.initialized = false;
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether the last Tab seen on the root was shifted.
    pub fn shift_down(&self) -> bool {
        self.shift_down
    }

    /// Tab index the host should render on the sentinels.
    pub fn sentinel_tab_index(&self) -> &'static str {
        if self.disabled {
            "-1"
        } else {
            "0"
        }
    }

    /// Element saved on activation, restored on dispose.
    pub fn saved_focus(&self) -> Option<&D::Element> {
        self.memory.saved(&self.root)
    }

    /// Tabbable descendants of the root, sentinels included.
    pub fn focusable_descendants(&self) -> Vec<D::Element> {
        tabbable_descendants(&*self.document, &self.root)
    }

    /// Remember the focused element so dispose can hand focus back.
    ///
    /// Calling it again overwrites the earlier element, or clears it when
    /// nothing is focused.
    pub fn activate(&mut self) {
        self.memory.save(&*self.document, &self.root);
        trace!(saved = ?self.saved_focus(), "focus trap activated");
    }

    /// Host hook called after each render.
    pub fn after_render(&mut self, first_render: bool) -> DialogResult<()> {
        if self.disposed {
            return Ok(());
        }
        if first_render {
            self.activate();
        }
        if !self.initialized {
            self.initialize_focus()?;
        }
        Ok(())
    }

    fn initialize_focus(&mut self) -> DialogResult<()> {
        self.initialized = true;
        if self.disabled {
            return Ok(());
        }
        debug!(default_focus = ?self.default_focus, "initializing trap focus");
        match self.default_focus {
            DefaultFocus::Element => self.focus_fallback(),
            DefaultFocus::FirstChild => self.focus_first(),
            DefaultFocus::LastChild => self.focus_last(),
            DefaultFocus::None => Ok(()),
        }
    }

    /// Focus the first content element, or the root if there is none.
    pub fn focus_first(&self) -> DialogResult<()> {
        Ok(focus_first(&*self.document, &self.root, SENTINELS_BEFORE, SENTINEL_COUNT)?)
    }

    /// Focus the last content element, or the root if there is none.
    pub fn focus_last(&self) -> DialogResult<()> {
        Ok(focus_last(&*self.document, &self.root, SENTINELS_BEFORE, SENTINEL_COUNT)?)
    }

    /// Focus the fallback element, or the root without one.
    pub fn focus_fallback(&self) -> DialogResult<()> {
        let target = self.fallback.as_ref().unwrap_or(&self.root);
        Ok(self.document.focus(target)?)
    }

    /// A sentinel received focus.
    pub fn on_sentinel_focus(&mut self, sentinel: Sentinel) -> DialogResult<()> {
        if self.disabled {
            return Ok(());
        }
        trace!(?sentinel, shift = self.shift_down, "sentinel focused");
        match sentinel {
            Sentinel::Leading if self.shift_down => self.focus_last(),
            Sentinel::Leading => self.focus_first(),
            Sentinel::Trailing => self.focus_last(),
            Sentinel::Entry => self.focus_first(),
        }
    }

    /// The root itself received focus.
    pub fn on_root_focus(&mut self) -> DialogResult<()> {
        if self.disabled {
            return Ok(());
        }
        self.focus_fallback()
    }

    /// A keydown or keyup reached the root.
    ///
    /// Tracks whether Tab is being pressed with Shift and suppresses the
    /// re-render the event would otherwise cause.
    pub fn on_root_key(&mut self, event: &KeyboardEventArgs) {
        self.should_render = false;
        if event.key == "Tab" {
            self.shift_down = event.shift_key;
        }
    }

    /// Whether the host should re-render; a suppressed render is skipped once.
    pub fn should_render(&mut self) -> bool {
        if self.should_render {
            return true;
        }
        self.should_render = true;
        false
    }

    /// Give focus back to the element saved on activation.
    ///
    /// Restoring is best effort and skipped while disabled. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if self.disabled {
            self.memory.forget(&self.root);
            return;
        }
        match self.memory.restore(&*self.document, &self.root) {
            Ok(restored) => trace!(restored, "focus trap disposed"),
            Err(e) => debug!(error = %e, "could not restore focus"),
        }
    }
}

impl<D: Document + 'static> Drop for FocusTrap<D> {
    fn drop(&mut self) {
        self.dispose();
    }
}
