use crate::utils::html::{escape_html, escape_text};
use crate::utils::syntax::LanguageRegistry;
use pulldown_cmark::CodeBlockKind;

/// Label used for blocks with no tag or a tag no grammar knows.
pub const DEFAULT_LANGUAGE: &str = "text";

pub(super) fn language_hint_from_codeblock_kind(kind: &CodeBlockKind<'_>) -> String {
    match kind {
        CodeBlockKind::Indented => String::new(),
        CodeBlockKind::Fenced(info) => info
            .split_ascii_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_lowercase(),
    }
}

/// Resolves a fence tag to the label rendered into `language-*`.
pub(super) fn language_label(hint: &str, languages: &LanguageRegistry) -> String {
    if !hint.is_empty() && languages.recognizes(hint) {
        hint.to_string()
    } else {
        DEFAULT_LANGUAGE.to_string()
    }
}

/// Markup for one code block. The payload is escaped, never highlighted, and
/// loses its final newline so the element's text matches the source lines.
pub(super) fn code_block_html(label: &str, code: &str) -> String {
    let body = code.strip_suffix('\n').unwrap_or(code);
    format!(
        "<pre><code class=\"language-{}\">{}</code></pre>\n",
        escape_html(label),
        escape_text(body)
    )
}
