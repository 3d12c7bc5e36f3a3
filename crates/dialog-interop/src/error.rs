//! Error types for the dialog engine.

use dialog_dom::InteropError;
use dialog_keybinds::ConfigError;
use thiserror::Error;

/// Errors surfaced to the embedding application.
#[derive(Debug, Error)]
pub enum DialogError {
    /// Invalid interceptor options.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// No element carries the requested id.
    #[error("No element found with id '{0}'")]
    ElementNotFound(String),

    /// The host document rejected a call.
    #[error("Interop error: {0}")]
    Interop(#[from] InteropError),

    /// Event names and listener ids were passed in different counts.
    #[error("Number of event names ({names}) and listener ids ({listeners}) has to match")]
    MismatchedArgumentCounts { names: usize, listeners: usize },
}

impl DialogError {
    /// Whether the error stems from how the caller set things up rather
    /// than from the host.
    pub fn is_usage_error(&self) -> bool {
        !matches!(self, Self::Interop(_))
    }
}

/// Result type for dialog operations.
pub type DialogResult<T> = Result<T, DialogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = DialogError::MismatchedArgumentCounts {
            names: 2,
            listeners: 1,
        };
        assert_eq!(
            err.to_string(),
            "Number of event names (2) and listener ids (1) has to match"
        );
        assert!(err.is_usage_error());

        let err = DialogError::from(InteropError::Detached);
        assert!(!err.is_usage_error());

        let err = DialogError::from(ConfigError::MissingTargetClass);
        assert!(matches!(err, DialogError::Configuration(_)));
    }
}
