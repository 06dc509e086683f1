use crate::core::message::Message;
use crate::ui::copy::CopyAction;
use crate::ui::dom::{Document, DocumentHandle, NodeId};
use crate::ui::markdown::{Decorator, RenderOptions, Renderer};
use crate::ui::message_list::MessageList;
use crate::utils::clipboard::{ClipboardError, ClipboardWriter, FallbackClipboard};
use crate::utils::syntax::{HighlightError, Highlighter, LanguageRegistry};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Clipboard double that records writes, or fails every write.
#[derive(Clone, Default)]
pub struct RecordingClipboard {
    pub writes: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
}

impl RecordingClipboard {
    pub fn failing() -> Self {
        Self {
            writes: Arc::default(),
            fail: true,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.writes.lock().unwrap().last().cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    fn record(&self, text: &str) -> Result<(), ClipboardError> {
        if self.fail {
            return Err(ClipboardError::Unavailable("test clipboard disabled".into()));
        }
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[async_trait]
impl ClipboardWriter for RecordingClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.record(text)
    }
}

impl FallbackClipboard for RecordingClipboard {
    fn copy_sync(&self, text: &str) -> Result<(), ClipboardError> {
        self.record(text)
    }
}

/// Wraps every whitespace-separated token in a span, or misbehaves on request.
pub struct FakeHighlighter {
    pub fail_for: Option<&'static str>,
    pub panic_for: Option<&'static str>,
    pub mangle_for: Option<&'static str>,
}

impl FakeHighlighter {
    pub fn working() -> Self {
        Self {
            fail_for: None,
            panic_for: None,
            mangle_for: None,
        }
    }
}

impl Highlighter for FakeHighlighter {
    fn highlight(&self, code: &str, lang: &str) -> Result<String, HighlightError> {
        if self.fail_for == Some(lang) {
            return Err(HighlightError::UnknownLanguage(lang.to_string()));
        }
        if self.panic_for == Some(lang) {
            panic!("grammar for {lang} exploded");
        }
        if self.mangle_for == Some(lang) {
            return Ok("<span class=\"tok\">something else</span>".to_string());
        }
        let mut out = String::new();
        for (i, token) in code.split(' ').enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str("<span class=\"tok\">");
            out.push_str(&crate::utils::html::escape_html(token));
            out.push_str("</span>");
        }
        Ok(out)
    }
}

pub fn test_renderer() -> Renderer {
    Renderer::new(Arc::new(RenderOptions::default()), LanguageRegistry::builtin())
}

/// Document with an empty `div` attached under the root.
pub fn test_document() -> (Document, NodeId) {
    let mut doc = Document::new();
    let root = doc.root();
    let host = doc.create_element_with("div", &[("class", "message-list")]);
    doc.append_child(root, host);
    (doc, host)
}

pub struct TestList {
    pub list: MessageList,
    pub doc: DocumentHandle,
    pub clipboard: RecordingClipboard,
    pub fallback: RecordingClipboard,
}

pub fn test_message_list(highlighter: Option<Arc<dyn Highlighter>>) -> TestList {
    test_message_list_with(highlighter, RecordingClipboard::default(), RecordingClipboard::default())
}

pub fn test_message_list_with(
    highlighter: Option<Arc<dyn Highlighter>>,
    clipboard: RecordingClipboard,
    fallback: RecordingClipboard,
) -> TestList {
    let (doc, host) = test_document();
    let doc = DocumentHandle::new(doc);
    let copy = CopyAction::new(Arc::new(clipboard.clone()), Arc::new(fallback.clone()));
    let list = MessageList::new(
        doc.clone(),
        host,
        Arc::new(test_renderer()),
        Arc::new(Decorator::new(highlighter)),
        copy,
    );
    TestList {
        list,
        doc,
        clipboard,
        fallback,
    }
}

pub fn create_test_messages() -> Vec<Message> {
    vec![
        Message::user("Hello"),
        Message::assistant("Hi there! Here is `inline` code."),
        Message::user("Show me some Rust"),
        Message::assistant("```rust\nfn main() {}\n```"),
    ]
}
