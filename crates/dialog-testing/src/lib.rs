//! Testing utilities for the dialog keyboard and focus engine.
//!
//! This crate provides:
//! - An in-memory [`TestDocument`] implementing the host bridge
//! - Key input simulation
//! - Deterministic dialog and focus-trap markup
//! - Property-based testing generators

pub mod document;
pub mod fixtures;
pub mod input;

#[cfg(feature = "proptest-support")]
pub mod generators;

// Re-exports
pub use document::{NodeId, TestDocument};
pub use fixtures::{DialogMarkup, Fixtures, TrapMarkup, MARKER_CLASS};
pub use input::InputSequence;

/// Error types for testing operations.
#[derive(Debug, thiserror::Error)]
pub enum TestError {
    #[error("Unknown node: {0:?}")]
    UnknownNode(NodeId),

    #[error("Cannot append {child:?} under its own descendant {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}

/// Result type for testing operations.
pub type TestResult<T> = Result<T, TestError>;

/// Install a `tracing` subscriber for tests, honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
