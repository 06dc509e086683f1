//! The live list of rendered messages.
//!
//! Each message goes through render, attach and decorate in that order. Copy
//! controls are bound to the [`CodeBlockRef`] produced when their block was
//! decorated; re-rendering or removing a message drops those bindings.

use crate::core::message::{Message, TranscriptRole};
use crate::ui::copy::{CopyAction, CopyOutcome};
use crate::ui::dom::{outer_html, parse_fragment, Document, DocumentHandle, NodeId};
use crate::ui::markdown::{CodeBlockRef, Decorator, Renderer};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub const MESSAGE_CLASS: &str = "message";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct Entry {
    id: MessageId,
    node: NodeId,
    role: TranscriptRole,
    blocks: Vec<CodeBlockRef>,
}

pub struct MessageList {
    doc: DocumentHandle,
    container: NodeId,
    renderer: Arc<Renderer>,
    decorator: Arc<Decorator>,
    copy: CopyAction,
    entries: VecDeque<Entry>,
    /// Copy control (and its label span) to the block it copies.
    bindings: HashMap<NodeId, CodeBlockRef>,
    next_id: u64,
    max_entries: Option<usize>,
}

impl MessageList {
    pub fn new(
        doc: DocumentHandle,
        container: NodeId,
        renderer: Arc<Renderer>,
        decorator: Arc<Decorator>,
        copy: CopyAction,
    ) -> Self {
        Self {
            doc,
            container,
            renderer,
            decorator,
            copy,
            entries: VecDeque::new(),
            bindings: HashMap::new(),
            next_id: 1,
            max_entries: None,
        }
    }

    /// Caps the number of attached messages. Appending evicts the oldest
    /// entries; prepending history evicts the newest.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries.max(1));
        self
    }

    pub fn document(&self) -> &DocumentHandle {
        &self.doc
    }

    pub fn copy_action(&self) -> &CopyAction {
        &self.copy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Message ids, oldest first.
    pub fn ids(&self) -> Vec<MessageId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn role(&self, id: MessageId) -> Option<TranscriptRole> {
        self.entry(id).map(|e| e.role)
    }

    /// Decorated blocks of one message, in document order.
    pub fn code_blocks(&self, id: MessageId) -> Vec<CodeBlockRef> {
        self.entry(id).map(|e| e.blocks.clone()).unwrap_or_default()
    }

    /// Every decorated block in the list, oldest message first.
    pub fn all_code_blocks(&self) -> Vec<CodeBlockRef> {
        self.entries
            .iter()
            .flat_map(|e| e.blocks.iter().cloned())
            .collect()
    }

    pub async fn push(&mut self, message: &Message) -> MessageId {
        let id = self.allocate_id();
        let html = self.renderer.render(&message.content);

        let (container, decorator) = (self.container, Arc::clone(&self.decorator));
        let (node, blocks) = self
            .doc
            .update(|doc| {
                let node = create_entry(doc, id, message.role);
                doc.append_child(container, node);
                parse_fragment(doc, node, &html);
                let report = decorator.decorate(doc, node);
                (node, report.blocks)
            })
            .await;

        debug!(
            component = "message_list",
            message_id = %id,
            role = message.role.as_str(),
            code_blocks = blocks.len(),
            "Message appended"
        );
        self.bind(&blocks);
        self.entries.push_back(Entry {
            id,
            node,
            role: message.role,
            blocks,
        });

        if let Some(max) = self.max_entries {
            while self.entries.len() > max {
                if let Some(oldest) = self.entries.front().map(|e| e.id) {
                    self.remove(oldest).await;
                }
            }
        }
        id
    }

    /// Inserts an older page of history above the current entries.
    pub async fn prepend_page(&mut self, messages: &[Message]) -> Vec<MessageId> {
        if messages.is_empty() {
            return Vec::new();
        }

        let rendered: Vec<(MessageId, TranscriptRole, String)> = messages
            .iter()
            .map(|m| (self.allocate_id(), m.role, self.renderer.render(&m.content)))
            .collect();

        let (container, decorator) = (self.container, Arc::clone(&self.decorator));
        let anchor = self.entries.front().map(|e| e.node);
        let (nodes, blocks) = self
            .doc
            .update(|doc| {
                let mut nodes = Vec::with_capacity(rendered.len());
                for (id, role, html) in &rendered {
                    let node = create_entry(doc, *id, *role);
                    match anchor {
                        Some(anchor) => doc.insert_before(anchor, node),
                        None => doc.append_child(container, node),
                    }
                    parse_fragment(doc, node, html);
                    nodes.push(node);
                }
                // Entries already on screen are skipped as decorated.
                let report = decorator.decorate(doc, container);
                let blocks: Vec<(NodeId, CodeBlockRef)> = report
                    .blocks
                    .into_iter()
                    .filter_map(|b| owning_entry(doc, container, b.wrapper).map(|n| (n, b)))
                    .collect();
                (nodes, blocks)
            })
            .await;

        self.bind(blocks.iter().map(|(_, b)| b));
        let mut grouped: HashMap<NodeId, Vec<CodeBlockRef>> = HashMap::new();
        for (node, block) in blocks {
            grouped.entry(node).or_default().push(block);
        }

        let ids: Vec<MessageId> = rendered.iter().map(|(id, _, _)| *id).collect();
        for ((id, role, _), node) in rendered.into_iter().zip(nodes).rev() {
            self.entries.push_front(Entry {
                id,
                node,
                role,
                blocks: grouped.remove(&node).unwrap_or_default(),
            });
        }
        debug!(
            component = "message_list",
            messages = ids.len(),
            total = self.entries.len(),
            "History page prepended"
        );

        if let Some(max) = self.max_entries {
            while self.entries.len() > max {
                if let Some(newest) = self.entries.back().map(|e| e.id) {
                    self.remove(newest).await;
                }
            }
        }
        ids
    }

    /// Re-renders a message from scratch. Returns `false` for unknown ids.
    pub async fn replace(&mut self, id: MessageId, text: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let html = self.renderer.render(text);
        let node = self.entries[index].node;
        let old_blocks = std::mem::take(&mut self.entries[index].blocks);
        self.unbind(&old_blocks);

        let decorator = Arc::clone(&self.decorator);
        let blocks = self
            .doc
            .update(|doc| {
                doc.remove_children(node);
                parse_fragment(doc, node, &html);
                decorator.decorate(doc, node).blocks
            })
            .await;

        debug!(
            component = "message_list",
            message_id = %id,
            code_blocks = blocks.len(),
            "Message re-rendered"
        );
        self.bind(&blocks);
        self.entries[index].blocks = blocks;
        true
    }

    pub async fn remove(&mut self, id: MessageId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let Some(entry) = self.entries.remove(index) else {
            return false;
        };
        self.unbind(&entry.blocks);
        self.doc.update(|doc| doc.remove(entry.node)).await;
        debug!(component = "message_list", message_id = %id, "Message removed");
        true
    }

    /// Runs the copy action for the block bound to `control`, which may be
    /// the button or its label span. `None` when nothing is bound.
    pub async fn activate_copy(&self, control: NodeId) -> Option<CopyOutcome> {
        let block = self.bindings.get(&control)?;
        Some(self.copy.copy(&self.doc, block).await)
    }

    /// Serialized container with every attached message.
    pub async fn html(&self) -> String {
        let container = self.container;
        self.doc.read(|doc| outer_html(doc, container)).await
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        id
    }

    fn entry(&self, id: MessageId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    fn index_of(&self, id: MessageId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn bind<'a>(&mut self, blocks: impl IntoIterator<Item = &'a CodeBlockRef>) {
        for block in blocks {
            self.bindings.insert(block.control, block.clone());
            self.bindings.insert(block.label, block.clone());
        }
    }

    fn unbind(&mut self, blocks: &[CodeBlockRef]) {
        for block in blocks {
            self.bindings.remove(&block.control);
            self.bindings.remove(&block.label);
        }
    }
}

impl fmt::Debug for MessageList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageList")
            .field("container", &self.container)
            .field("entries", &self.entries.len())
            .field("max_entries", &self.max_entries)
            .finish_non_exhaustive()
    }
}

fn create_entry(doc: &mut Document, id: MessageId, role: TranscriptRole) -> NodeId {
    let class = format!("{MESSAGE_CLASS} {MESSAGE_CLASS}-{}", role.as_str());
    doc.create_element_with(
        "div",
        &[
            ("class", class.as_str()),
            ("data-message-id", id.to_string().as_str()),
        ],
    )
}

/// The direct child of `container` that holds `node`.
fn owning_entry(doc: &Document, container: NodeId, node: NodeId) -> Option<NodeId> {
    let mut current = node;
    loop {
        let parent = doc.parent(current)?;
        if parent == container {
            return Some(current);
        }
        current = parent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::copy::COPIED_LABEL;
    use crate::ui::markdown::WRAPPER_CLASS;
    use crate::utils::test_utils::{
        create_test_messages, test_message_list, test_message_list_with, RecordingClipboard,
    };
    use std::time::Duration;

    async fn wrapper_count(list: &MessageList) -> usize {
        list.document()
            .read(|d| d.find_by_class(d.root(), WRAPPER_CLASS).len())
            .await
    }

    async fn entry_texts(list: &MessageList) -> Vec<String> {
        let nodes: Vec<NodeId> = list.entries.iter().map(|e| e.node).collect();
        list.document()
            .read(|d| {
                nodes
                    .iter()
                    .map(|n| d.text_content(*n).trim().to_string())
                    .collect()
            })
            .await
    }

    #[tokio::test]
    async fn push_renders_attaches_and_decorates() {
        let mut t = test_message_list(None);
        let id = t.list.push(&Message::assistant("Hello **world**\n\n```js\nconsole.log(1)\n```")).await;

        let html = t.list.html().await;
        assert!(html.contains(&format!(
            "<div class=\"message message-assistant\" data-message-id=\"{id}\">"
        )));
        assert!(html.contains("<strong>world</strong>"));
        assert_eq!(wrapper_count(&t.list).await, 1);

        let blocks = t.list.code_blocks(id);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "js");
        let code = t.doc.read(|d| d.text_content(blocks[0].code)).await;
        assert_eq!(code, "console.log(1)");
    }

    #[tokio::test]
    async fn messages_keep_arrival_order() {
        let mut t = test_message_list(None);
        for message in create_test_messages() {
            t.list.push(&message).await;
        }
        assert_eq!(t.list.len(), 4);
        let texts = entry_texts(&t.list).await;
        assert_eq!(texts[0], "Hello");
        assert!(texts[3].contains("fn main() {}"));
        let roles: Vec<_> = t.list.ids().into_iter().filter_map(|id| t.list.role(id)).collect();
        assert!(roles[0].is_user() && roles[1].is_assistant());
    }

    #[tokio::test]
    async fn prepended_history_lands_above_in_page_order() {
        let mut t = test_message_list(None);
        t.list.push(&Message::user("```\nnewest\n```")).await;

        let page = vec![
            Message::user("```\noldest\n```"),
            Message::assistant("```\nolder\n```"),
        ];
        let ids = t.list.prepend_page(&page).await;
        assert_eq!(ids.len(), 2);
        assert_eq!(t.list.ids()[..2], ids[..]);

        let texts = entry_texts(&t.list).await;
        assert!(texts[0].contains("oldest"));
        assert!(texts[1].contains("older"));
        assert!(texts[2].contains("newest"));

        // The whole container was re-scanned; the existing block was not re-wrapped.
        assert_eq!(wrapper_count(&t.list).await, 3);
        assert_eq!(t.list.code_blocks(ids[0]).len(), 1);
        assert_eq!(t.list.code_blocks(ids[1]).len(), 1);
        assert_eq!(t.list.all_code_blocks().len(), 3);
    }

    #[tokio::test]
    async fn prepending_into_an_empty_list_appends() {
        let mut t = test_message_list(None);
        let ids = t.list.prepend_page(&create_test_messages()).await;
        assert_eq!(t.list.ids(), ids);
        assert!(t.list.prepend_page(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn activate_copy_accepts_button_or_label() {
        let mut t = test_message_list(None);
        let id = t.list.push(&Message::assistant("```rust\nfn a() {}\n```")).await;
        let block = t.list.code_blocks(id).remove(0);

        assert_eq!(t.list.activate_copy(block.label).await, Some(CopyOutcome::Primary));
        assert_eq!(t.clipboard.contents().as_deref(), Some("fn a() {}"));
        assert_eq!(t.list.activate_copy(block.control).await, Some(CopyOutcome::Primary));
        assert_eq!(t.clipboard.write_count(), 2);
        assert_eq!(t.list.activate_copy(block.pre).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn replace_drops_old_bindings() {
        let mut t = test_message_list(None);
        let id = t.list.push(&Message::assistant("```\nfirst\n```")).await;
        let old = t.list.code_blocks(id).remove(0);
        t.list.activate_copy(old.control).await;

        assert!(t.list.replace(id, "```\nsecond\n```").await);
        assert_eq!(t.list.activate_copy(old.control).await, None);

        let new = t.list.code_blocks(id).remove(0);
        assert_ne!(new.control, old.control);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        let label = t.doc.read(|d| d.text_content(new.label)).await;
        assert_eq!(label, "Copy", "old timer must not touch the new control");

        t.list.activate_copy(new.control).await;
        assert_eq!(t.clipboard.contents().as_deref(), Some("second"));
        let label = t.doc.read(|d| d.text_content(new.label)).await;
        assert_eq!(label, COPIED_LABEL);
    }

    #[tokio::test]
    async fn replace_and_remove_unknown_ids() {
        let mut t = test_message_list(None);
        let id = t.list.push(&Message::user("hi")).await;
        assert!(t.list.remove(id).await);
        assert!(!t.list.remove(id).await);
        assert!(!t.list.replace(id, "again").await);
        assert!(t.list.is_empty());
        let html = t.list.html().await;
        assert_eq!(html, "<div class=\"message-list\"></div>");
    }

    #[tokio::test]
    async fn push_evicts_oldest_over_capacity() {
        let t = test_message_list_with(
            None,
            RecordingClipboard::default(),
            RecordingClipboard::default(),
        );
        let mut list = t.list.with_max_entries(2);
        let first = list.push(&Message::user("```\none\n```")).await;
        let evicted = list.code_blocks(first).remove(0);
        list.push(&Message::user("two")).await;
        list.push(&Message::user("three")).await;

        assert_eq!(list.len(), 2);
        assert_eq!(entry_texts(&list).await, vec!["two", "three"]);
        assert_eq!(list.activate_copy(evicted.control).await, None);
        assert!(!t.doc.read(|d| d.is_live(evicted.wrapper)).await);
    }

    #[tokio::test]
    async fn prepend_evicts_newest_over_capacity() {
        let mut list = test_message_list(None).list.with_max_entries(2);
        list.push(&Message::user("current")).await;
        list.prepend_page(&[Message::user("a"), Message::user("b")]).await;
        assert_eq!(entry_texts(&list).await, vec!["a", "b"]);
    }
}
