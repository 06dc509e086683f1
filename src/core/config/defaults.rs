use crate::core::config::data::Config;
use crate::ui::copy::{CONFIRM_DURATION, COPIED_LABEL};
use crate::ui::markdown::{RenderOptions, DEFAULT_COPY_LABEL};
use std::time::Duration;

pub const DEFAULT_HIGHLIGHT_CACHE_SIZE: usize = 64;

impl Config {
    /// Converter settings with every unset field at its default.
    pub fn render_options(&self) -> RenderOptions {
        let defaults = RenderOptions::default();
        let md = &self.markdown;
        RenderOptions {
            breaks: md.breaks.unwrap_or(defaults.breaks),
            linkify: md.linkify.unwrap_or(defaults.linkify),
            html: md.html.unwrap_or(defaults.html),
            gfm: md.gfm.unwrap_or(defaults.gfm),
            max_input_bytes: md.max_input_bytes.unwrap_or(defaults.max_input_bytes),
        }
    }

    pub fn highlight_enabled(&self) -> bool {
        self.highlight.enabled.unwrap_or(true)
    }

    pub fn highlight_cache_size(&self) -> usize {
        self.highlight
            .cache_size
            .unwrap_or(DEFAULT_HIGHLIGHT_CACHE_SIZE)
    }

    pub fn copy_label(&self) -> &str {
        self.copy.label.as_deref().unwrap_or(DEFAULT_COPY_LABEL)
    }

    pub fn copied_label(&self) -> &str {
        self.copy.copied_label.as_deref().unwrap_or(COPIED_LABEL)
    }

    pub fn confirm_duration(&self) -> Duration {
        self.copy
            .confirm_ms
            .map(Duration::from_millis)
            .unwrap_or(CONFIRM_DURATION)
    }
}
