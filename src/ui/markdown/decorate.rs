use super::code::DEFAULT_LANGUAGE;
use super::render::panic_message;
use crate::ui::dom::{parse_fragment, Document, NodeData, NodeId};
use crate::utils::syntax::Highlighter;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

pub const WRAPPER_CLASS: &str = "code-block-wrapper";
pub const HEADER_CLASS: &str = "code-block-header";
pub const LANGUAGE_CLASS: &str = "code-language";
pub const COPY_BUTTON_CLASS: &str = "copy-button";
pub const COPY_TEXT_CLASS: &str = "copy-text";
pub const DEFAULT_COPY_LABEL: &str = "Copy";

/// One decorated code block. Bind copy controls to this, never to a lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeBlockRef {
    pub wrapper: NodeId,
    pub pre: NodeId,
    pub code: NodeId,
    /// The `<button>`.
    pub control: NodeId,
    /// The `.copy-text` span inside the button; the only node whose text the
    /// copy action rewrites.
    pub label: NodeId,
    pub language: String,
}

#[derive(Debug, Default)]
pub struct DecorationReport {
    /// Newly wrapped blocks in document order.
    pub blocks: Vec<CodeBlockRef>,
    /// Blocks already wrapped by an earlier pass.
    pub skipped: usize,
    pub highlighted: usize,
    pub highlight_failures: usize,
}

enum HighlightStatus {
    Highlighted,
    NotApplicable,
    Failed,
}

/// Wraps bare `<pre><code>` pairs with a language header and copy control.
#[derive(Clone)]
pub struct Decorator {
    highlighter: Option<Arc<dyn Highlighter>>,
    copy_label: String,
}

impl fmt::Debug for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorator")
            .field("highlighting", &self.highlighter.is_some())
            .field("copy_label", &self.copy_label)
            .finish()
    }
}

impl Default for Decorator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Decorator {
    pub fn new(highlighter: Option<Arc<dyn Highlighter>>) -> Self {
        Self {
            highlighter,
            copy_label: DEFAULT_COPY_LABEL.to_string(),
        }
    }

    pub fn with_copy_label(mut self, label: impl Into<String>) -> Self {
        self.copy_label = label.into();
        self
    }

    pub fn copy_label(&self) -> &str {
        &self.copy_label
    }

    /// Decorates every bare code block under `root` (inclusive). Safe to call
    /// repeatedly: wrapped blocks are skipped.
    pub fn decorate(&self, doc: &mut Document, root: NodeId) -> DecorationReport {
        let mut report = DecorationReport::default();
        let mut scope = vec![root];
        scope.extend(doc.descendants(root));

        let candidates: Vec<(NodeId, NodeId)> = scope
            .into_iter()
            .filter_map(|pre| sole_code_child(doc, pre).map(|code| (pre, code)))
            .collect();

        for (pre, code) in candidates {
            if is_wrapped(doc, pre) {
                report.skipped += 1;
                continue;
            }
            let language = language_from_class(doc, code);
            let Some(block) = self.wrap(doc, pre, code, language) else {
                continue;
            };
            match self.highlight_block(doc, &block) {
                HighlightStatus::Highlighted => report.highlighted += 1,
                HighlightStatus::Failed => report.highlight_failures += 1,
                HighlightStatus::NotApplicable => {}
            }
            report.blocks.push(block);
        }

        debug!(
            component = "decorator",
            wrapped = report.blocks.len(),
            skipped = report.skipped,
            highlighted = report.highlighted,
            highlight_failures = report.highlight_failures,
            "Decoration pass complete"
        );
        report
    }

    fn wrap(
        &self,
        doc: &mut Document,
        pre: NodeId,
        code: NodeId,
        language: String,
    ) -> Option<CodeBlockRef> {
        // Needs a parent to be replaced in place.
        doc.parent(pre)?;

        let wrapper = doc.create_element_with(
            "div",
            &[("class", WRAPPER_CLASS), ("data-language", language.as_str())],
        );
        let header = doc.create_element_with("div", &[("class", HEADER_CLASS)]);
        let lang_span = doc.create_element_with("span", &[("class", LANGUAGE_CLASS)]);
        doc.set_text_content(lang_span, &language);
        let control = doc.create_element_with(
            "button",
            &[
                ("class", COPY_BUTTON_CLASS),
                ("type", "button"),
                ("data-copy-state", "idle"),
                ("data-label", self.copy_label.as_str()),
                ("aria-label", "Copy code"),
            ],
        );
        let label = doc.create_element_with("span", &[("class", COPY_TEXT_CLASS)]);
        doc.set_text_content(label, &self.copy_label);

        doc.insert_before(pre, wrapper);
        doc.append_child(wrapper, header);
        doc.append_child(header, lang_span);
        doc.append_child(header, control);
        doc.append_child(control, label);
        doc.append_child(wrapper, pre);

        Some(CodeBlockRef {
            wrapper,
            pre,
            code,
            control,
            label,
            language,
        })
    }

    fn highlight_block(&self, doc: &mut Document, block: &CodeBlockRef) -> HighlightStatus {
        let Some(highlighter) = self.highlighter.as_ref() else {
            return HighlightStatus::NotApplicable;
        };
        if block.language == DEFAULT_LANGUAGE || doc.attr(block.code, "data-highlighted").is_some()
        {
            return HighlightStatus::NotApplicable;
        }

        let source = doc.text_content(block.code);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            highlighter.highlight(&source, &block.language)
        }));
        let html = match result {
            Ok(Ok(html)) => html,
            Ok(Err(err)) => {
                warn!(component = "decorator", language = %block.language, error = %err, "Highlighting failed");
                return HighlightStatus::Failed;
            }
            Err(payload) => {
                warn!(
                    component = "decorator",
                    language = %block.language,
                    panic = %panic_message(payload.as_ref()),
                    "Highlighter panicked"
                );
                return HighlightStatus::Failed;
            }
        };

        doc.remove_children(block.code);
        parse_fragment(doc, block.code, &html);
        if doc.text_content(block.code) != source {
            warn!(
                component = "decorator",
                language = %block.language,
                "Highlighted markup changed the code text; keeping plain text"
            );
            doc.set_text_content(block.code, &source);
            return HighlightStatus::Failed;
        }
        doc.set_attr(block.code, "data-highlighted", "yes");
        HighlightStatus::Highlighted
    }
}

/// The `<code>` of a `<pre>` whose only non-blank child it is.
fn sole_code_child(doc: &Document, pre: NodeId) -> Option<NodeId> {
    if !doc.is_element(pre, "pre") {
        return None;
    }
    let mut code = None;
    for child in doc.children(pre) {
        match doc.data(*child) {
            Some(NodeData::Element(el)) if el.tag == "code" && code.is_none() => {
                code = Some(*child)
            }
            Some(NodeData::Text(t)) if t.trim().is_empty() => {}
            _ => return None,
        }
    }
    code
}

fn is_wrapped(doc: &Document, pre: NodeId) -> bool {
    doc.parent(pre)
        .is_some_and(|p| doc.has_class(p, WRAPPER_CLASS))
}

fn language_from_class(doc: &Document, code: NodeId) -> String {
    doc.element(code)
        .and_then(|el| {
            el.classes()
                .filter_map(|c| c.strip_prefix("language-"))
                .find(|lang| !lang.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}
