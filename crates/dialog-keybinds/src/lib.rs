//! # dialog-keybinds
//!
//! Key rules for dialog keyboard interception.
//!
//! ## Features
//!
//! - Literal keys and `/regex/` key patterns
//! - Per-direction prevent/stop modifier policies (`"key+shift"`, `"any"`, ...)
//! - Consolidated forwarding of matching keydown/keyup events
//! - TOML-loadable interceptor options

mod error;
mod event;
pub mod matcher;
mod options;
mod policy;
mod rule;
mod table;

pub use error::{ConfigError, ConfigResult};
pub use event::{KeyDirection, KeyboardEvent, KeyboardEventArgs, Modifiers};
pub use matcher::{MatchOutcome, RuleOutcome};
pub use options::{KeyInterceptorOptions, KeyOptions};
pub use policy::{modifier_signature, ModifierPolicy, PolicyMode};
pub use rule::{is_pattern_key, KeyRule, RuleKey};
pub use table::RuleTable;

/// Helper to create options for a literal key.
pub fn key(key: &str) -> KeyOptions {
    KeyOptions::new(key)
}

/// Helper to create options for a regular expression key.
pub fn pattern(pattern: &str) -> KeyOptions {
    KeyOptions::new(format!("/{}/", pattern))
}
