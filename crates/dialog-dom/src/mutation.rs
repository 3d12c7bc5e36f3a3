//! Child-list mutation records.

/// One child-list change below an observed root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord<E> {
    /// Parent whose children changed
    pub target: E,
    /// Nodes inserted under `target`
    pub added: Vec<E>,
    /// Nodes removed from `target`
    pub removed: Vec<E>,
}

impl<E> MutationRecord<E> {
    /// Record a single insertion.
    pub fn added(target: E, node: E) -> Self {
        Self {
            target,
            added: vec![node],
            removed: Vec::new(),
        }
    }

    /// Record a single removal.
    pub fn removed(target: E, node: E) -> Self {
        Self {
            target,
            added: Vec::new(),
            removed: vec![node],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
