//! Message text to decorated HTML.
//!
//! [`Renderer`] is a pure text to HTML pass; code blocks come out as bare
//! `<pre><code class="language-*">` pairs. Once the fragment is attached to a
//! [`Document`](crate::ui::dom::Document), [`Decorator`] wraps each block with
//! a language header and a copy control and applies highlighting per block.

mod code;
mod decorate;
mod linkify;
mod render;

#[cfg(test)]
pub mod test_fixtures;
#[cfg(test)]
mod tests;

pub use code::DEFAULT_LANGUAGE;
pub use decorate::{
    CodeBlockRef, DecorationReport, Decorator, COPY_BUTTON_CLASS, COPY_TEXT_CLASS,
    DEFAULT_COPY_LABEL, HEADER_CLASS, LANGUAGE_CLASS, WRAPPER_CLASS,
};
pub use render::{
    CmarkConverter, Converter, RenderError, RenderOptions, RenderedFragment, Renderer,
    DEFAULT_MAX_INPUT_BYTES,
};
