//! # dialog-interop
//!
//! Keyboard interception and focus trapping for modal dialogs.
//!
//! ## Features
//!
//! - Per-dialog key rules attached to marked elements, following the
//!   dialog's subtree as it changes
//! - Consolidated keydown/keyup forwarding to subscribers
//! - Focus trap with sentinel redirection and focus restore on dispose
//! - Escape and backdrop dismissal through a [`DialogHost`]
//!
//! ## Example
//!
//! ```ignore
//! use dialog_interop::{KeyInterceptorFactory, KeyInterceptorOptions};
//! use dialog_keybinds::key;
//!
//! let factory = KeyInterceptorFactory::new(document);
//! let mut interceptor = factory.create();
//! interceptor.on_key_down(|args| println!("{}", args.key));
//! interceptor.connect(
//!     "dialog_1a2b3c4d",
//!     &KeyInterceptorOptions::new("slice-dialog").key(key("Escape").with_subscribe_down()),
//! )?;
//! ```

pub mod config;
pub mod dialog;
pub mod element_ref;
pub mod error;
pub mod focus_trap;
pub mod interceptor;
pub mod observer;

pub use config::{DialogKeyboardConfig, FocusTrapConfig, DEFAULT_MARKER_CLASS};
pub use dialog::{DialogHost, DialogId, DialogKeyboard, DismissReason};
pub use element_ref::{
    add_default_preventing_handlers, add_event_listener, focus_first, focus_last,
    remove_default_preventing_handlers, remove_event_listener, FocusMemory,
};
pub use error::{DialogError, DialogResult};
pub use focus_trap::{DefaultFocus, FocusTrap, Sentinel, TrapElements};
pub use interceptor::{
    KeyInterceptor, KeyInterceptorFactory, KeyboardHandler, SessionState, SubscriptionId,
};
pub use observer::{KeyHandlers, SubtreeObserver};

pub use dialog_dom::EventArgs;
pub use dialog_keybinds::{KeyInterceptorOptions, KeyOptions, KeyboardEventArgs};
