//! Interop error types.

use crate::document::{ListenerId, ObserverId};
use thiserror::Error;

/// Failures reported by a [`Document`](crate::Document) host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InteropError {
    /// The element is no longer part of the document.
    #[error("element is not attached to the document")]
    Detached,

    /// Listener handle not registered on that element.
    #[error("unknown listener {0:?}")]
    UnknownListener(ListenerId),

    /// Observer handle not registered.
    #[error("unknown mutation observer {0:?}")]
    UnknownObserver(ObserverId),

    /// Any other host-side failure.
    #[error("host call failed: {0}")]
    Host(String),
}

/// Result type for host document calls.
pub type InteropResult<T> = Result<T, InteropError>;
