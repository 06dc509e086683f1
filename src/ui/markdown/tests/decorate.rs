use super::helpers::{code_texts, decorate_message, render_and_decorate};
use crate::ui::dom::parse_fragment;
use crate::ui::markdown::test_fixtures;
use crate::ui::markdown::{
    Decorator, COPY_BUTTON_CLASS, COPY_TEXT_CLASS, HEADER_CLASS, LANGUAGE_CLASS, WRAPPER_CLASS,
};
use crate::utils::syntax::{Highlighter, SyntectHighlighter};
use crate::utils::test_utils::{test_document, FakeHighlighter};
use std::sync::Arc;

#[test]
fn wrapper_markup_matches_expected_shape() {
    let decorated = render_and_decorate("```js\nconsole.log(1)\n```", None);
    assert_eq!(
        decorated.html(),
        concat!(
            "<div class=\"message-list\">",
            "<div class=\"code-block-wrapper\" data-language=\"js\">",
            "<div class=\"code-block-header\">",
            "<span class=\"code-language\">js</span>",
            "<button class=\"copy-button\" type=\"button\" data-copy-state=\"idle\" ",
            "data-label=\"Copy\" aria-label=\"Copy code\">",
            "<span class=\"copy-text\">Copy</span></button></div>",
            "<pre><code class=\"language-js\">console.log(1)</code></pre></div>\n",
            "</div>"
        )
    );
}

#[test]
fn block_refs_point_at_the_wrapper_parts() {
    let decorated = decorate_message(&test_fixtures::single_block());
    let doc = &decorated.doc;
    let block = &decorated.report.blocks[0];

    assert!(doc.has_class(block.wrapper, WRAPPER_CLASS));
    assert!(doc.is_element(block.pre, "pre"));
    assert!(doc.is_element(block.code, "code"));
    assert!(doc.has_class(block.control, COPY_BUTTON_CLASS));
    assert!(doc.has_class(block.label, COPY_TEXT_CLASS));
    assert_eq!(doc.parent(block.label), Some(block.control));
    assert_eq!(doc.parent(block.pre), Some(block.wrapper));

    let header = doc.find_by_class(block.wrapper, HEADER_CLASS);
    assert_eq!(header.len(), 1);
    let language = doc.find_by_class(block.wrapper, LANGUAGE_CLASS);
    assert_eq!(doc.text_content(language[0]), "rust");
    assert_eq!(block.language, "rust");
}

#[test]
fn decorating_twice_wraps_once() {
    let (mut doc, host) = test_document();
    let html = crate::utils::test_utils::test_renderer()
        .render(&test_fixtures::multiple_blocks().content);
    parse_fragment(&mut doc, host, &html);
    let decorator = Decorator::default();

    let first = decorator.decorate(&mut doc, host);
    let second = decorator.decorate(&mut doc, host);

    assert_eq!(first.blocks.len(), 3);
    assert!(second.blocks.is_empty());
    assert_eq!(second.skipped, 3);
    assert_eq!(doc.find_by_class(host, WRAPPER_CLASS).len(), 3);
}

#[test]
fn languages_and_texts_follow_document_order() {
    let decorated = decorate_message(&test_fixtures::multiple_blocks());
    let languages: Vec<_> = decorated
        .report
        .blocks
        .iter()
        .map(|b| b.language.as_str())
        .collect();
    assert_eq!(languages, vec!["rust", "python", "text"]);
    assert_eq!(code_texts(&decorated)[2], "no language tag");
}

#[test]
fn blocks_nested_in_lists_are_decorated_in_place() {
    let decorated = decorate_message(&test_fixtures::nested_in_list());
    assert_eq!(decorated.wrapper_count(), 2);
    for block in &decorated.report.blocks {
        let parent = decorated.doc.parent(block.wrapper).expect("wrapper attached");
        assert!(decorated.doc.is_element(parent, "li"));
    }
    assert_eq!(
        code_texts(&decorated),
        vec!["fn step_one() {}", "fn step_two() {}"]
    );
}

#[test]
fn empty_block_still_gets_a_control() {
    let decorated = decorate_message(&test_fixtures::empty_block());
    assert_eq!(decorated.report.blocks.len(), 1);
    assert_eq!(code_texts(&decorated), vec![""]);
    assert!(decorated.html().contains("<p>Done.</p>"));
}

#[test]
fn markup_like_code_survives_as_text() {
    let decorated = decorate_message(&test_fixtures::markup_in_code());
    assert_eq!(
        code_texts(&decorated),
        vec!["<div class=\"x\">&amp; <b>bold</b></div>"]
    );
}

#[test]
fn custom_copy_label() {
    let (mut doc, host) = test_document();
    parse_fragment(&mut doc, host, "<pre><code class=\"language-text\">x</code></pre>");
    let report = Decorator::default()
        .with_copy_label("Copy code")
        .decorate(&mut doc, host);
    let block = &report.blocks[0];
    assert_eq!(doc.text_content(block.label), "Copy code");
    assert_eq!(doc.attr(block.control, "data-label"), Some("Copy code"));
}

#[test]
fn pre_without_a_sole_code_child_is_left_alone() {
    let (mut doc, host) = test_document();
    parse_fragment(
        &mut doc,
        host,
        "<pre>plain preformatted</pre><pre><code>a</code><code>b</code></pre>",
    );
    let report = Decorator::default().decorate(&mut doc, host);
    assert!(report.blocks.is_empty());
    assert!(doc.find_by_class(host, WRAPPER_CLASS).is_empty());
}

#[test]
fn missing_language_class_defaults_to_text() {
    let (mut doc, host) = test_document();
    parse_fragment(&mut doc, host, "<pre>\n<code>bare</code>\n</pre>");
    let report = Decorator::default().decorate(&mut doc, host);
    assert_eq!(report.blocks.len(), 1);
    assert_eq!(report.blocks[0].language, "text");
}

#[test]
fn highlighter_runs_per_block_and_keeps_text() {
    let highlighter: Arc<dyn Highlighter> = Arc::new(FakeHighlighter::working());
    let decorated = render_and_decorate(test_fixtures::HELLO_JS, Some(highlighter));
    let block = &decorated.report.blocks[0];

    assert_eq!(decorated.report.highlighted, 1);
    assert_eq!(decorated.doc.attr(block.code, "data-highlighted"), Some("yes"));
    assert!(decorated.html().contains("<span class=\"tok\">console.log(1)</span>"));
    assert_eq!(decorated.doc.text_content(block.code), "console.log(1)");
}

#[test]
fn text_blocks_are_never_highlighted() {
    let highlighter: Arc<dyn Highlighter> = Arc::new(FakeHighlighter::working());
    let decorated = render_and_decorate("```\nplain words\n```", Some(highlighter));
    assert_eq!(decorated.report.highlighted, 0);
    assert!(!decorated.html().contains("tok"));
}

#[test]
fn highlight_failures_are_isolated_per_block() {
    let highlighter: Arc<dyn Highlighter> = Arc::new(FakeHighlighter {
        fail_for: Some("python"),
        panic_for: Some("rust"),
        mangle_for: None,
    });
    let markdown = "```rust\nfn a() {}\n```\n\n```python\nx = 1\n```\n\n```js\nlet y = 2\n```";
    let decorated = render_and_decorate(markdown, Some(highlighter));

    assert_eq!(decorated.report.blocks.len(), 3);
    assert_eq!(decorated.report.highlight_failures, 2);
    assert_eq!(decorated.report.highlighted, 1);
    assert_eq!(
        code_texts(&decorated),
        vec!["fn a() {}", "x = 1", "let y = 2"]
    );
    let highlighted: Vec<_> = decorated
        .report
        .blocks
        .iter()
        .map(|b| decorated.doc.attr(b.code, "data-highlighted").is_some())
        .collect();
    assert_eq!(highlighted, vec![false, false, true]);
}

#[test]
fn highlighter_that_changes_the_text_is_rejected() {
    let highlighter: Arc<dyn Highlighter> = Arc::new(FakeHighlighter {
        fail_for: None,
        panic_for: None,
        mangle_for: Some("js"),
    });
    let decorated = render_and_decorate(test_fixtures::HELLO_JS, Some(highlighter));
    assert_eq!(decorated.report.highlight_failures, 1);
    assert_eq!(code_texts(&decorated), vec!["console.log(1)"]);
    assert!(!decorated.html().contains("something else"));
}

#[test]
fn syntect_highlighting_end_to_end() {
    let highlighter: Arc<dyn Highlighter> = Arc::new(SyntectHighlighter::new(16));
    let decorated = render_and_decorate(&test_fixtures::single_block().content, Some(highlighter));
    let block = &decorated.report.blocks[0];

    assert_eq!(decorated.report.highlighted, 1);
    assert!(decorated.html().contains("<span class=\"hl-"));
    assert_eq!(decorated.doc.text_content(block.code), "fn main() {}");
}
