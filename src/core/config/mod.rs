pub mod data;
pub mod defaults;
pub mod io;


pub use data::{path_display, Config, CopyConfig, HighlightConfig, MarkdownConfig};
pub use io::ConfigError;
