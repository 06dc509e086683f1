use super::code::{code_block_html, language_hint_from_codeblock_kind, language_label};
use super::linkify::push_linkified;
use crate::utils::html::escape_html;
use crate::utils::syntax::LanguageRegistry;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{trace, warn};

pub const DEFAULT_MAX_INPUT_BYTES: usize = 1024 * 1024;

/// Converter settings. Built once at startup and shared read-only by every
/// render call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Single newlines become `<br />`.
    pub breaks: bool,
    /// Bare `http(s)://` and `www.` URLs become links.
    pub linkify: bool,
    /// Pass raw HTML through instead of escaping it.
    pub html: bool,
    /// Tables, strikethrough, task lists and footnotes.
    pub gfm: bool,
    /// Larger inputs skip markdown and render as escaped text.
    pub max_input_bytes: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            breaks: true,
            linkify: true,
            html: false,
            gfm: true,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl RenderOptions {
    fn cmark_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.gfm {
            opts.insert(Options::ENABLE_TABLES);
            opts.insert(Options::ENABLE_STRIKETHROUGH);
            opts.insert(Options::ENABLE_TASKLISTS);
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        opts
    }
}

/// Errors that stop a message from rendering as markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    InputTooLarge { len: usize, limit: usize },
    Converter(String),
    Panicked(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InputTooLarge { len, limit } => {
                write!(f, "input of {len} bytes exceeds the {limit} byte limit")
            }
            RenderError::Converter(msg) => write!(f, "converter error: {msg}"),
            RenderError::Panicked(msg) => write!(f, "converter panicked: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Markdown to HTML conversion.
pub trait Converter: Send + Sync {
    fn convert(&self, text: &str) -> Result<String, RenderError>;
}

/// pulldown-cmark converter that emits unhighlighted `language-*` code blocks.
#[derive(Clone, Debug)]
pub struct CmarkConverter {
    options: Arc<RenderOptions>,
    languages: LanguageRegistry,
}

impl CmarkConverter {
    pub fn new(options: Arc<RenderOptions>, languages: LanguageRegistry) -> Self {
        Self { options, languages }
    }
}

impl Converter for CmarkConverter {
    fn convert(&self, text: &str) -> Result<String, RenderError> {
        let parser = Parser::new_ext(text, self.options.cmark_options());
        let mut events: Vec<Event<'_>> = Vec::new();
        // (label, accumulated text) while inside a code block
        let mut code: Option<(String, String)> = None;
        let mut link_depth = 0usize;

        for event in parser {
            if code.is_some() {
                match event {
                    Event::Text(t) => {
                        if let Some((_, buf)) = code.as_mut() {
                            buf.push_str(&t);
                        }
                    }
                    Event::End(TagEnd::CodeBlock) => {
                        if let Some((label, buf)) = code.take() {
                            events.push(Event::Html(code_block_html(&label, &buf).into()));
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let hint = language_hint_from_codeblock_kind(&kind);
                    code = Some((language_label(&hint, &self.languages), String::new()));
                }
                Event::Start(tag @ (Tag::Link { .. } | Tag::Image { .. })) => {
                    link_depth += 1;
                    events.push(Event::Start(tag));
                }
                Event::End(end @ (TagEnd::Link | TagEnd::Image)) => {
                    link_depth = link_depth.saturating_sub(1);
                    events.push(Event::End(end));
                }
                Event::SoftBreak if self.options.breaks => events.push(Event::HardBreak),
                Event::Html(raw) | Event::InlineHtml(raw) if !self.options.html => {
                    events.push(Event::Text(raw))
                }
                Event::Text(t) if self.options.linkify && link_depth == 0 => {
                    push_linkified(&mut events, t)
                }
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(text.len() + text.len() / 2);
        pulldown_cmark::html::push_html(&mut out, events.into_iter());
        Ok(out)
    }
}

/// Result of [`Renderer::render_details`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedFragment {
    pub html: String,
    /// Set when the converter failed and the text was escaped instead.
    pub fallback: Option<RenderError>,
}

/// Turns message text into an HTML fragment. Never fails: converter errors
/// degrade to escaped text.
#[derive(Clone)]
pub struct Renderer {
    options: Arc<RenderOptions>,
    converter: Arc<dyn Converter>,
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new(options: Arc<RenderOptions>, languages: LanguageRegistry) -> Self {
        let converter = Arc::new(CmarkConverter::new(Arc::clone(&options), languages));
        Self { options, converter }
    }

    pub fn with_converter(options: Arc<RenderOptions>, converter: Arc<dyn Converter>) -> Self {
        Self { options, converter }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn render(&self, text: &str) -> String {
        self.render_details(text).html
    }

    /// Absent text renders like empty text.
    pub fn render_optional(&self, text: Option<&str>) -> String {
        text.map(|t| self.render(t)).unwrap_or_default()
    }

    pub fn render_details(&self, text: &str) -> RenderedFragment {
        if text.is_empty() {
            return RenderedFragment {
                html: String::new(),
                fallback: None,
            };
        }

        let started = Instant::now();
        match self.try_convert(text) {
            Ok(html) => {
                trace!(
                    component = "renderer",
                    bytes_in = text.len(),
                    bytes_out = html.len(),
                    duration_us = started.elapsed().as_micros() as u64,
                    "Message rendered"
                );
                RenderedFragment {
                    html,
                    fallback: None,
                }
            }
            Err(err) => {
                warn!(
                    component = "renderer",
                    error = %err,
                    bytes_in = text.len(),
                    "Markdown conversion failed; rendering escaped text"
                );
                RenderedFragment {
                    html: escaped_fallback(text),
                    fallback: Some(err),
                }
            }
        }
    }

    fn try_convert(&self, text: &str) -> Result<String, RenderError> {
        let limit = self.options.max_input_bytes;
        if text.len() > limit {
            return Err(RenderError::InputTooLarge {
                len: text.len(),
                limit,
            });
        }
        let converter = &self.converter;
        panic::catch_unwind(AssertUnwindSafe(|| converter.convert(text)))
            .map_err(|payload| RenderError::Panicked(panic_message(payload.as_ref())))?
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn escaped_fallback(text: &str) -> String {
    let escaped = escape_html(text);
    let body = escaped.trim_end_matches('\n').replace('\n', "<br />\n");
    format!("<p>{body}</p>\n")
}
