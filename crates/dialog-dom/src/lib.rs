//! # dialog-dom
//!
//! The host side of the dialog keyboard and focus engine.
//!
//! The engine never touches a concrete UI framework. Hosts implement
//! [`Document`] and hand it to the engine by constructor injection; element
//! handles stay opaque to the engine.

mod document;
mod element;
mod error;
mod event;
mod mutation;
mod tabbable;

pub use document::{
    Document, EventListener, KeyListener, Listener, ListenerId, MutationCallback, ObserverId,
};
pub use element::ElementDescriptor;
pub use error::{InteropError, InteropResult};
pub use event::{DomEvent, EventArgs};
pub use mutation::MutationRecord;
pub use tabbable::{is_tabbable, tabbable_descendants};
