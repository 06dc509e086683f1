//! Registry of setting handlers.

use std::collections::HashMap;

use super::error::SettingError;
use super::handlers::{BooleanHandler, NumberHandler, StringHandler};
use super::SettingHandler;
use crate::core::config::defaults::DEFAULT_HIGHLIGHT_CACHE_SIZE;
use crate::core::config::Config;
use crate::ui::copy::{CONFIRM_DURATION, COPIED_LABEL};
use crate::ui::markdown::{DEFAULT_COPY_LABEL, DEFAULT_MAX_INPUT_BYTES};

/// Registry of all available setting handlers.
pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
    /// Keys in display order for `config show` output.
    display_order: Vec<&'static str>,
}

impl SettingRegistry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            display_order: Vec::new(),
        };

        registry.register(Box::new(BooleanHandler {
            key: "markdown.breaks",
            default: true,
            get: |c| c.markdown.breaks,
            set_field: |c, v| c.markdown.breaks = v,
        }));
        registry.register(Box::new(BooleanHandler {
            key: "markdown.linkify",
            default: true,
            get: |c| c.markdown.linkify,
            set_field: |c, v| c.markdown.linkify = v,
        }));
        registry.register(Box::new(BooleanHandler {
            key: "markdown.html",
            default: false,
            get: |c| c.markdown.html,
            set_field: |c, v| c.markdown.html = v,
        }));
        registry.register(Box::new(BooleanHandler {
            key: "markdown.gfm",
            default: true,
            get: |c| c.markdown.gfm,
            set_field: |c, v| c.markdown.gfm = v,
        }));
        registry.register(Box::new(NumberHandler {
            key: "markdown.max_input_bytes",
            default: DEFAULT_MAX_INPUT_BYTES as u64,
            get: |c| c.markdown.max_input_bytes.map(|v| v as u64),
            set_field: |c, v| c.markdown.max_input_bytes = v.map(|v| v as usize),
        }));
        registry.register(Box::new(BooleanHandler {
            key: "highlight.enabled",
            default: true,
            get: |c| c.highlight.enabled,
            set_field: |c, v| c.highlight.enabled = v,
        }));
        registry.register(Box::new(NumberHandler {
            key: "highlight.cache_size",
            default: DEFAULT_HIGHLIGHT_CACHE_SIZE as u64,
            get: |c| c.highlight.cache_size.map(|v| v as u64),
            set_field: |c, v| c.highlight.cache_size = v.map(|v| v as usize),
        }));
        registry.register(Box::new(StringHandler {
            key: "copy.label",
            default: DEFAULT_COPY_LABEL,
            get: |c| c.copy.label.as_deref(),
            set_field: |c, v| c.copy.label = v,
        }));
        registry.register(Box::new(StringHandler {
            key: "copy.copied_label",
            default: COPIED_LABEL,
            get: |c| c.copy.copied_label.as_deref(),
            set_field: |c, v| c.copy.copied_label = v,
        }));
        registry.register(Box::new(NumberHandler {
            key: "copy.confirm_ms",
            default: CONFIRM_DURATION.as_millis() as u64,
            get: |c| c.copy.confirm_ms,
            set_field: |c, v| c.copy.confirm_ms = v,
        }));

        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        let key = handler.key();
        self.display_order.push(key);
        self.handlers.insert(key, handler);
    }

    /// Get a handler by key.
    pub fn get(&self, key: &str) -> Option<&dyn SettingHandler> {
        self.handlers.get(key).map(|h| h.as_ref())
    }

    /// Get all keys in sorted order.
    pub fn keys_sorted(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.handlers.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Get all keys in display order.
    pub fn keys_display_order(&self) -> &[&'static str] {
        &self.display_order
    }

    pub fn set(&self, key: &str, value: &str, config: &mut Config) -> Result<String, SettingError> {
        self.lookup(key)?.set(value, config)
    }

    pub fn unset(&self, key: &str, config: &mut Config) -> Result<String, SettingError> {
        Ok(self.lookup(key)?.unset(config))
    }

    /// One line per key, in display order.
    pub fn format_all(&self, config: &Config) -> Vec<String> {
        self.display_order
            .iter()
            .filter_map(|key| self.get(key))
            .map(|handler| handler.format(config))
            .collect()
    }

    fn lookup(&self, key: &str) -> Result<&dyn SettingHandler, SettingError> {
        self.get(key)
            .ok_or_else(|| SettingError::UnknownKey(key.to_string()))
    }
}

impl Default for SettingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
