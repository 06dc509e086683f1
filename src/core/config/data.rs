use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `[markdown]`: how message text becomes HTML.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct MarkdownConfig {
    /// Single newlines render as line breaks (default: on)
    pub breaks: Option<bool>,
    /// Bare URLs become links (default: on)
    pub linkify: Option<bool>,
    /// Pass raw HTML in messages through unescaped (default: off)
    pub html: Option<bool>,
    /// Tables, strikethrough, task lists and footnotes (default: on)
    pub gfm: Option<bool>,
    /// Messages longer than this render as plain escaped text
    pub max_input_bytes: Option<usize>,
}

/// `[highlight]`: per-block syntax highlighting.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    pub enabled: Option<bool>,
    /// Highlighted blocks kept in memory
    pub cache_size: Option<usize>,
}

/// `[copy]`: the copy control on each code block.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct CopyConfig {
    pub label: Option<String>,
    pub copied_label: Option<String>,
    /// How long the confirmation stays up, in milliseconds
    pub confirm_ms: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub copy: CopyConfig,
}

/// Convert a path to a display string, using `~` for the home directory on Unix.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
