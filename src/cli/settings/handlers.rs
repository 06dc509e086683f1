//! Data-driven handlers for the three kinds of settings.

use super::error::SettingError;
use super::SettingHandler;
use crate::core::config::Config;

/// Parse a boolean value from user input.
///
/// Accepts: on/off, true/false, yes/no (case-insensitive).
pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Format a boolean value for display.
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

/// Handler for on/off settings.
pub struct BooleanHandler {
    pub key: &'static str,
    pub default: bool,
    pub get: fn(&Config) -> Option<bool>,
    pub set_field: fn(&mut Config, Option<bool>),
}

impl SettingHandler for BooleanHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, value: &str, config: &mut Config) -> Result<String, SettingError> {
        let parsed = parse_bool(value).ok_or_else(|| SettingError::InvalidBoolean(value.to_string()))?;
        (self.set_field)(config, Some(parsed));
        Ok(format!("✅ Set {} to: {}", self.key, format_bool(parsed)))
    }

    fn unset(&self, config: &mut Config) -> String {
        (self.set_field)(config, None);
        format!(
            "✅ Unset {} (will use default: {})",
            self.key,
            format_bool(self.default)
        )
    }

    fn format(&self, config: &Config) -> String {
        match (self.get)(config) {
            Some(value) => format!("  {}: {}", self.key, format_bool(value)),
            None => format!(
                "  {}: (unset, default: {})",
                self.key,
                format_bool(self.default)
            ),
        }
    }
}

/// Handler for whole-number settings.
pub struct NumberHandler {
    pub key: &'static str,
    pub default: u64,
    pub get: fn(&Config) -> Option<u64>,
    pub set_field: fn(&mut Config, Option<u64>),
}

impl SettingHandler for NumberHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, value: &str, config: &mut Config) -> Result<String, SettingError> {
        let parsed: u64 = value
            .trim()
            .replace('_', "")
            .parse()
            .map_err(|_| SettingError::InvalidNumber {
                key: self.key,
                input: value.to_string(),
            })?;
        (self.set_field)(config, Some(parsed));
        Ok(format!("✅ Set {} to: {parsed}", self.key))
    }

    fn unset(&self, config: &mut Config) -> String {
        (self.set_field)(config, None);
        format!("✅ Unset {} (will use default: {})", self.key, self.default)
    }

    fn format(&self, config: &Config) -> String {
        match (self.get)(config) {
            Some(value) => format!("  {}: {value}", self.key),
            None => format!("  {}: (unset, default: {})", self.key, self.default),
        }
    }
}

/// Handler for free-text settings.
pub struct StringHandler {
    pub key: &'static str,
    pub default: &'static str,
    pub get: fn(&Config) -> Option<&str>,
    pub set_field: fn(&mut Config, Option<String>),
}

impl SettingHandler for StringHandler {
    fn key(&self) -> &'static str {
        self.key
    }

    fn set(&self, value: &str, config: &mut Config) -> Result<String, SettingError> {
        if value.trim().is_empty() {
            return Err(SettingError::EmptyValue(self.key));
        }
        (self.set_field)(config, Some(value.to_string()));
        Ok(format!("✅ Set {} to: {value}", self.key))
    }

    fn unset(&self, config: &mut Config) -> String {
        (self.set_field)(config, None);
        format!("✅ Unset {} (will use default: {})", self.key, self.default)
    }

    fn format(&self, config: &Config) -> String {
        match (self.get)(config) {
            Some(value) => format!("  {}: {value}", self.key),
            None => format!("  {}: (unset, default: {})", self.key, self.default),
        }
    }
}
