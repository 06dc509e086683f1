use crate::core::message::Message;
use crate::ui::dom::{outer_html, parse_fragment, Document, NodeId};
use crate::ui::markdown::{DecorationReport, Decorator, WRAPPER_CLASS};
use crate::utils::syntax::Highlighter;
use crate::utils::test_utils::{test_document, test_renderer};
use std::sync::Arc;

pub struct Decorated {
    pub doc: Document,
    pub host: NodeId,
    pub report: DecorationReport,
}

impl Decorated {
    pub fn html(&self) -> String {
        outer_html(&self.doc, self.host)
    }

    pub fn wrapper_count(&self) -> usize {
        self.doc.find_by_class(self.host, WRAPPER_CLASS).len()
    }
}

pub fn render_and_decorate(markdown: &str, highlighter: Option<Arc<dyn Highlighter>>) -> Decorated {
    let (mut doc, host) = test_document();
    let html = test_renderer().render(markdown);
    parse_fragment(&mut doc, host, &html);
    let report = Decorator::new(highlighter).decorate(&mut doc, host);
    Decorated { doc, host, report }
}

pub fn decorate_message(message: &Message) -> Decorated {
    render_and_decorate(&message.content, None)
}

/// Text of every `<code>` inside a decorated wrapper, in document order.
pub fn code_texts(decorated: &Decorated) -> Vec<String> {
    decorated
        .report
        .blocks
        .iter()
        .map(|b| decorated.doc.text_content(b.code))
        .collect()
}
