//! chatmark renders chat message text to HTML and decorates fenced code
//! blocks with a language label and a copy-to-clipboard control.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`ui`] owns the display pipeline: the markdown renderer, the code block
//!   decorator, the in-memory document they write into, the copy action and
//!   the message list that drives them in render, attach, decorate order.
//! - [`core`] holds messages, configuration and the [`core::pipeline`] that
//!   builds the display stages from configuration.
//! - [`api`] defines the history page payload.
//! - [`utils`] carries HTML escaping, syntax highlighting, clipboard access
//!   and logging setup.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
