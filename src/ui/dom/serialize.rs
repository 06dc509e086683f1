use super::node::{Document, NodeData, NodeId};
use super::parse::{is_raw_text, is_void};
use crate::utils::html::{escape_html, escape_text};

pub fn outer_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_steps(doc, vec![Step::Open(id)], &mut out);
    out
}

pub fn inner_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_steps(doc, child_steps(doc, id), &mut out);
    out
}

enum Step {
    Open(NodeId),
    Close(NodeId),
}

/// Children of `id` as pending steps, last child on the bottom so the first
/// one pops first.
fn child_steps(doc: &Document, id: NodeId) -> Vec<Step> {
    doc.children(id).iter().rev().map(|c| Step::Open(*c)).collect()
}

// Nesting depth is bounded only by the input, so this walks with an explicit
// stack rather than recursing.
fn write_steps(doc: &Document, mut stack: Vec<Step>, out: &mut String) {
    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Close(id) => {
                if let Some(tag) = doc.tag(id) {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
                continue;
            }
            Step::Open(id) => id,
        };

        match doc.data(id) {
            None => {}
            Some(NodeData::Document) => stack.extend(child_steps(doc, id)),
            Some(NodeData::Text(text)) => {
                let raw_parent = doc
                    .parent(id)
                    .and_then(|p| doc.tag(p))
                    .is_some_and(|t| t == "script" || t == "style");
                if raw_parent {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            Some(NodeData::Element(el)) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_html(value));
                    out.push('"');
                }
                if is_void(&el.tag) {
                    out.push_str(" />");
                    continue;
                }
                out.push('>');
                stack.push(Step::Close(id));
                if is_raw_text(&el.tag) && el.tag != "script" && el.tag != "style" {
                    out.push_str(&escape_text(&doc.text_content(id)));
                } else {
                    stack.extend(child_steps(doc, id));
                }
            }
        }
    }
}
