//! Settings management for `config set` / `config unset`.
//!
//! Keys are dotted `section.field` names matching the TOML layout, e.g.
//! `markdown.breaks` or `copy.confirm_ms`. Each key has a data-driven
//! handler:
//!
//! - Boolean settings (`markdown.breaks`, `highlight.enabled`, ...)
//! - Numeric settings (`markdown.max_input_bytes`, `copy.confirm_ms`, ...)
//! - String settings (`copy.label`, `copy.copied_label`)

pub mod error;
pub mod handlers;
pub mod registry;

pub use error::SettingError;
pub use registry::SettingRegistry;

use crate::core::config::Config;

/// Trait for handling a configuration setting.
///
/// Handlers only touch the in-memory [`Config`]; the caller persists it.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Parse `value` and store it. Returns a success message to display.
    fn set(&self, value: &str, config: &mut Config) -> Result<String, SettingError>;

    /// Clear the value so the default applies again.
    fn unset(&self, config: &mut Config) -> String;

    /// Format the current value for display in `config show` output.
    fn format(&self, config: &Config) -> String;
}
