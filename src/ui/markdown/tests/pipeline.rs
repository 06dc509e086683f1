use super::helpers::{code_texts, render_and_decorate};
use crate::core::message::Message;
use crate::ui::copy::{control_state, ControlState, CopyOutcome, COPIED_LABEL};
use crate::ui::dom::{inner_html, parse_fragment, Document};
use crate::ui::markdown::test_fixtures;
use crate::utils::syntax::{Highlighter, SyntectHighlighter};
use crate::utils::test_utils::{test_message_list, test_renderer};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn hello_js_renders_decorates_and_copies() {
    let mut t = test_message_list(None);
    let id = t.list.push(&Message::assistant(test_fixtures::HELLO_JS)).await;

    let html = t.list.html().await;
    assert!(html.contains("<p>Hello <strong>world</strong></p>"));
    assert_eq!(html.matches("class=\"code-block-wrapper\"").count(), 1);
    assert!(html.contains("<span class=\"code-language\">js</span>"));

    let block = t.list.code_blocks(id).remove(0);
    let outcome = t.list.activate_copy(block.control).await;
    assert_eq!(outcome, Some(CopyOutcome::Primary));
    assert_eq!(t.clipboard.contents().as_deref(), Some("console.log(1)"));

    let label = t.doc.read(|d| d.text_content(block.label)).await;
    assert_eq!(label, COPIED_LABEL);

    tokio::time::sleep(Duration::from_millis(1999)).await;
    let label = t.doc.read(|d| d.text_content(block.label)).await;
    assert_eq!(label, COPIED_LABEL);

    tokio::time::sleep(Duration::from_millis(2)).await;
    let label = t.doc.read(|d| d.text_content(block.label)).await;
    assert_eq!(label, "Copy");
    assert_eq!(
        control_state(&t.doc, block.control).await,
        Some(ControlState::Idle)
    );
}

#[tokio::test(start_paused = true)]
async fn copying_one_block_never_touches_another() {
    let mut t = test_message_list(None);
    let id = t
        .list
        .push(&Message::assistant("```\nfirst\n```\n\n```\nsecond\n```"))
        .await;
    let blocks = t.list.code_blocks(id);

    t.list.activate_copy(blocks[1].control).await;
    let (first_label, second_label) = t
        .doc
        .read(|d| (d.text_content(blocks[0].label), d.text_content(blocks[1].label)))
        .await;
    assert_eq!(first_label, "Copy");
    assert_eq!(second_label, COPIED_LABEL);
    assert_eq!(t.clipboard.contents().as_deref(), Some("second"));
}

#[tokio::test(start_paused = true)]
async fn highlighted_blocks_copy_plain_text() {
    let highlighter: Arc<dyn Highlighter> = Arc::new(SyntectHighlighter::new(16));
    let mut t = test_message_list(Some(highlighter));
    let source = "fn main() {\n    println!(\"<hi>\");\n}";
    let id = t
        .list
        .push(&Message::assistant(format!("```rust\n{source}\n```")))
        .await;

    let block = t.list.code_blocks(id).remove(0);
    assert!(t.list.html().await.contains("hl-"));
    t.list.activate_copy(block.label).await;
    assert_eq!(t.clipboard.contents().as_deref(), Some(source));
}

#[tokio::test]
async fn transcript_page_renders_every_role() {
    let mut t = test_message_list(None);
    let page = vec![
        Message::user("What does `ls` do?"),
        Message::assistant("It lists files:\n\n```bash\nls -la\n```"),
    ];
    t.list.prepend_page(&page).await;

    let html = t.list.html().await;
    assert!(html.contains("class=\"message message-user\""));
    assert!(html.contains("class=\"message message-assistant\""));
    assert!(html.contains("<code>ls</code>"));
    assert!(html.contains("<code class=\"language-bash\">ls -la</code>"));
}

#[test]
fn renderer_output_survives_parse_and_serialize() {
    let renderer = test_renderer();
    let sources = [
        test_fixtures::HELLO_JS.to_string(),
        test_fixtures::multiple_blocks().content,
        test_fixtures::nested_in_list().content,
        test_fixtures::markup_in_code().content,
        test_fixtures::code_and_links().content,
        "| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n- [ ] todo\n\n> quote & \"more\"".to_string(),
    ];

    for source in sources {
        let html = renderer.render(&source);

        let mut first = Document::new();
        let root = first.root();
        parse_fragment(&mut first, root, &html);
        let once = inner_html(&first, root);

        let mut second = Document::new();
        let root = second.root();
        parse_fragment(&mut second, root, &once);
        let twice = inner_html(&second, root);

        assert_eq!(once, twice, "unstable round trip for {source:?}");
        assert_eq!(first.text_content(first.root()), second.text_content(second.root()));
    }
}

#[test]
fn deeply_nested_quotes_survive_the_whole_pipeline() {
    const DEPTH: usize = 20_000;
    let worker = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let markdown = format!("{}x\n\n```js\nconsole.log(1)\n```", ">".repeat(DEPTH));
            let decorated = render_and_decorate(&markdown, None);
            assert_eq!(decorated.report.highlight_failures, 0);
            assert_eq!(code_texts(&decorated), vec!["console.log(1)"]);

            let html = decorated.html();
            assert_eq!(html.matches("<blockquote>").count(), DEPTH);
            assert_eq!(html.matches("</blockquote>").count(), DEPTH);
            assert!(html.contains("<p>x</p>"));
            assert_eq!(decorated.wrapper_count(), 1);
        })
        .expect("spawn worker");
    worker.join().expect("deep nesting must not overflow the stack");
}
