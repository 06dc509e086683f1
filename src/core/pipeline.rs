//! Builds the render, decorate and copy stages from configuration.

use crate::core::config::Config;
use crate::ui::copy::{CopyAction, TracingNotifier};
use crate::ui::dom::{parse_fragment, Document, DocumentHandle, NodeId};
use crate::ui::markdown::{DecorationReport, Decorator, Renderer};
use crate::ui::message_list::MessageList;
use crate::utils::syntax::{Highlighter, LanguageRegistry, SyntectHighlighter};
use std::sync::Arc;
use tracing::debug;

/// Class of the element rendered messages are attached under.
pub const CONTAINER_CLASS: &str = "message-list";

/// A rendered and decorated standalone fragment.
#[derive(Debug)]
pub struct DecoratedFragment {
    pub doc: Document,
    pub container: NodeId,
    pub report: DecorationReport,
}

#[derive(Clone, Debug)]
pub struct Pipeline {
    pub renderer: Arc<Renderer>,
    pub decorator: Arc<Decorator>,
    pub copy: CopyAction,
}

impl Pipeline {
    pub fn from_config(config: &Config) -> Self {
        let copy = CopyAction::system().with_notifier(Arc::new(TracingNotifier));
        Self::with_copy_action(config, copy)
    }

    pub fn with_copy_action(config: &Config, copy: CopyAction) -> Self {
        let options = Arc::new(config.render_options());
        let registry = LanguageRegistry::builtin();
        let highlighter: Option<Arc<dyn Highlighter>> = if config.highlight_enabled() {
            Some(Arc::new(SyntectHighlighter::new(config.highlight_cache_size())))
        } else {
            None
        };
        debug!(
            component = "pipeline",
            highlighting = highlighter.is_some(),
            options = ?options,
            "Pipeline configured"
        );

        let decorator = Decorator::new(highlighter).with_copy_label(config.copy_label());
        let copy = copy
            .with_copied_label(config.copied_label())
            .with_confirm_duration(config.confirm_duration());
        Self {
            renderer: Arc::new(Renderer::new(options, registry)),
            decorator: Arc::new(decorator),
            copy,
        }
    }

    /// Renders `text` into a fresh document; decorates it when asked.
    pub fn fragment(&self, text: &str, decorate: bool) -> DecoratedFragment {
        let (mut doc, container) = container_document();
        let html = self.renderer.render(text);
        parse_fragment(&mut doc, container, &html);
        let report = if decorate {
            self.decorator.decorate(&mut doc, container)
        } else {
            DecorationReport::default()
        };
        DecoratedFragment {
            doc,
            container,
            report,
        }
    }

    /// An empty message list in its own document.
    pub fn message_list(&self) -> MessageList {
        let (doc, container) = container_document();
        MessageList::new(
            DocumentHandle::new(doc),
            container,
            Arc::clone(&self.renderer),
            Arc::clone(&self.decorator),
            self.copy.clone(),
        )
    }
}

fn container_document() -> (Document, NodeId) {
    let mut doc = Document::new();
    let root = doc.root();
    let container = doc.create_element_with("div", &[("class", CONTAINER_CLASS)]);
    doc.append_child(root, container);
    (doc, container)
}
