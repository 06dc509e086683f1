//! Markdown inputs covering code block edge cases.

use crate::core::message::Message;

/// Paragraph with bold text followed by one `js` block.
pub const HELLO_JS: &str = "Hello **world**\n\n```js\nconsole.log(1)\n```";

/// Test fixture: single code block in assistant message.
pub fn single_block() -> Message {
    Message::assistant("Here's a function:\n\n```rust\nfn main() {}\n```\n")
}

/// Test fixture: multiple code blocks with different languages.
///
/// The last block has no tag and must come out labeled `text`.
pub fn multiple_blocks() -> Message {
    Message::assistant(concat!(
        "First, here's some Rust:\n\n",
        "```rust\nfn main() {\n    println!(\"Hello\");\n}\n```\n\n",
        "And some Python:\n\n",
        "```python\ndef greet():\n    print(\"Hello\")\n```\n\n",
        "Finally, plain text:\n\n",
        "```\nno language tag\n```\n"
    ))
}

/// Test fixture: code blocks nested in an ordered list.
pub fn nested_in_list() -> Message {
    Message::assistant(concat!(
        "1. First step\n\n",
        "   ```rust\n",
        "   fn step_one() {}\n",
        "   ```\n\n",
        "2. Second step\n\n",
        "   ```rust\n",
        "   fn step_two() {}\n",
        "   ```\n"
    ))
}

/// Test fixture: empty code block (edge case).
pub fn empty_block() -> Message {
    Message::assistant("Here's an empty block:\n\n```\n```\n\nDone.")
}

/// Test fixture: tag no grammar knows.
pub fn unknown_language() -> Message {
    Message::assistant("```klingon\nQapla'\n```")
}

/// Test fixture: code that looks like markup.
pub fn markup_in_code() -> Message {
    Message::assistant("```html\n<div class=\"x\">&amp; <b>bold</b></div>\n```")
}

/// Test fixture: mixed content with code and links.
pub fn code_and_links() -> Message {
    Message::assistant(concat!(
        "Check [the docs](https://example.com) for details:\n\n",
        "```rust\nfn example() {}\n```\n\n",
        "See also https://example.org."
    ))
}
