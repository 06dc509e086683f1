use super::node::{Document, NodeId};
use crate::utils::html::decode_entities;
use memchr::memchr;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

pub(crate) fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

struct StartTag {
    name: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
    len: usize,
}

/// Parses `html` and appends the resulting nodes under `parent`.
///
/// The parser is forgiving: unmatched end tags are dropped, elements left open
/// are closed at the end of input and a `<` that does not begin a tag is kept
/// as text. Returns the top-level nodes that were created.
pub fn parse_fragment(doc: &mut Document, parent: NodeId, html: &str) -> Vec<NodeId> {
    let before = doc.children(parent).len();
    let mut stack: Vec<NodeId> = vec![parent];
    let mut pos = 0;
    let mut text_start = 0;

    while let Some(offset) = memchr(b'<', &html.as_bytes()[pos..]) {
        let lt = pos + offset;
        let rest = &html[lt..];

        if let Some(after) = rest.strip_prefix("<!--") {
            flush_text(doc, &stack, &html[text_start..lt]);
            let end = after.find("-->").map(|i| i + 3).unwrap_or(after.len());
            pos = lt + 4 + end;
            text_start = pos;
            continue;
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            flush_text(doc, &stack, &html[text_start..lt]);
            pos = rest.find('>').map(|i| lt + i + 1).unwrap_or(html.len());
            text_start = pos;
            continue;
        }

        if let Some(after) = rest.strip_prefix("</") {
            if let Some((name, len)) = parse_end_tag(after) {
                flush_text(doc, &stack, &html[text_start..lt]);
                if let Some(depth) = stack
                    .iter()
                    .rposition(|id| doc.tag(*id) == Some(name.as_str()))
                    .filter(|d| *d > 0)
                {
                    stack.truncate(depth);
                }
                pos = lt + 2 + len;
                text_start = pos;
                continue;
            }
            pos = lt + 1;
            continue;
        }

        let Some(tag) = parse_start_tag(rest) else {
            pos = lt + 1;
            continue;
        };

        flush_text(doc, &stack, &html[text_start..lt]);
        let el = doc.create_element(&tag.name);
        if let Some(data) = doc.element_mut(el) {
            data.attrs = tag.attrs;
        }
        let top = stack.last().copied().unwrap_or(parent);
        doc.append_new_child(top, el);
        pos = lt + tag.len;
        text_start = pos;

        if is_void(&tag.name) || tag.self_closing {
            continue;
        }

        if is_raw_text(&tag.name) {
            let close = format!("</{}", tag.name);
            let body_end = find_ascii_case_insensitive(&html[pos..], &close)
                .map(|i| pos + i)
                .unwrap_or(html.len());
            let body = &html[pos..body_end];
            if !body.is_empty() {
                let text = if tag.name == "textarea" || tag.name == "title" {
                    decode_entities(body).into_owned()
                } else {
                    body.to_string()
                };
                let node = doc.create_text(&text);
                doc.append_new_child(el, node);
            }
            pos = html[body_end..]
                .find('>')
                .map(|i| body_end + i + 1)
                .unwrap_or(html.len());
            text_start = pos;
            continue;
        }

        stack.push(el);
    }

    flush_text(doc, &stack, &html[text_start..]);
    doc.children(parent)[before..].to_vec()
}

fn flush_text(doc: &mut Document, stack: &[NodeId], raw: &str) {
    if raw.is_empty() {
        return;
    }
    let Some(top) = stack.last().copied() else {
        return;
    };
    let text = decode_entities(raw);
    let node = doc.create_text(&text);
    doc.append_new_child(top, node);
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn parse_end_tag(after: &str) -> Option<(String, usize)> {
    let bytes = after.as_bytes();
    if !bytes.first().is_some_and(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let name_len = bytes.iter().take_while(|b| is_name_char(**b)).count();
    let close = memchr(b'>', bytes)?;
    if close < name_len {
        return None;
    }
    Some((after[..name_len].to_ascii_lowercase(), close + 1))
}

fn parse_start_tag(rest: &str) -> Option<StartTag> {
    let bytes = rest.as_bytes();
    if !bytes.get(1).is_some_and(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let mut i = 1;
    while i < bytes.len() && is_name_char(bytes[i]) {
        i += 1;
    }
    let name = rest[1..i].to_ascii_lowercase();
    let mut attrs: Vec<(String, String)> = Vec::new();

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i)? {
            b'>' => {
                return Some(StartTag {
                    name,
                    attrs,
                    self_closing: false,
                    len: i + 1,
                })
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some(StartTag {
                    name,
                    attrs,
                    self_closing: true,
                    len: i + 2,
                })
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        if i == name_start {
            // Stray `=`: skip it.
            i += 1;
            continue;
        }
        let attr_name = rest[name_start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let mut value = String::new();
        if bytes.get(i) == Some(&b'=') {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i)? {
                q @ (b'"' | b'\'') => {
                    let close = memchr(*q, &bytes[i + 1..])?;
                    value = decode_entities(&rest[i + 1..i + 1 + close]).into_owned();
                    i += close + 2;
                }
                _ => {
                    let start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    value = decode_entities(&rest[start..i]).into_owned();
                }
            }
        }
        if !attrs.iter().any(|(k, _)| *k == attr_name) {
            attrs.push((attr_name, value));
        }
    }
}
