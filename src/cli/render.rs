use std::error::Error;
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::api::HistoryPage;
use crate::core::config::{path_display, Config};
use crate::core::message::Message;
use crate::core::pipeline::Pipeline;
use crate::ui::copy::CopyOutcome;
use crate::ui::dom::inner_html;
use tracing::info;

/// Reads `file`, or stdin when it is absent or `-`.
pub fn read_input(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => fs::read_to_string(path),
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

pub fn render_file(
    config: &Config,
    file: Option<&Path>,
    decorate: bool,
) -> Result<String, Box<dyn Error>> {
    let text = read_input(file)?;
    Ok(render_text(&Pipeline::from_config(config), &text, decorate))
}

pub fn render_text(pipeline: &Pipeline, text: &str, decorate: bool) -> String {
    let fragment = pipeline.fragment(text, decorate);
    inner_html(&fragment.doc, fragment.container)
}

pub async fn render_transcript(config: &Config, file: &Path) -> Result<String, Box<dyn Error>> {
    let json = fs::read_to_string(file)?;
    let page = HistoryPage::from_json(&json)
        .map_err(|err| format!("Invalid history page {}: {err}", path_display(file)))?;
    if page.has_more {
        info!(component = "cli", "Older history exists beyond this page");
    }
    Ok(transcript_html(&Pipeline::from_config(config), &page).await)
}

pub async fn transcript_html(pipeline: &Pipeline, page: &HistoryPage) -> String {
    let mut list = pipeline.message_list();
    list.prepend_page(&page.messages).await;
    list.html().await
}

/// What `copy` did to the selected block.
#[derive(Debug, PartialEq, Eq)]
pub struct CopyReport {
    pub block: usize,
    pub language: String,
    pub label_before: String,
    pub label_after: String,
    pub outcome: CopyOutcome,
}

impl fmt::Display for CopyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block {} ({}): {} -> {}",
            self.block, self.language, self.label_before, self.label_after
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum CopyCommandError {
    NoSuchBlock { requested: usize, available: usize },
    ClipboardFailed,
}

impl fmt::Display for CopyCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyCommandError::NoSuchBlock {
                requested,
                available,
            } => write!(
                f,
                "No code block #{requested}; the message has {available} (numbering starts at 1)"
            ),
            CopyCommandError::ClipboardFailed => write!(f, "Could not write to the clipboard"),
        }
    }
}

impl Error for CopyCommandError {}

pub async fn copy_block(
    config: &Config,
    file: Option<&Path>,
    block: usize,
) -> Result<CopyReport, Box<dyn Error>> {
    let text = read_input(file)?;
    Ok(copy_from_text(&Pipeline::from_config(config), &text, block).await?)
}

pub async fn copy_from_text(
    pipeline: &Pipeline,
    text: &str,
    block: usize,
) -> Result<CopyReport, CopyCommandError> {
    let mut list = pipeline.message_list();
    list.push(&Message::assistant(text)).await;
    let blocks = list.all_code_blocks();
    let Some(target) = block.checked_sub(1).and_then(|i| blocks.get(i)) else {
        return Err(CopyCommandError::NoSuchBlock {
            requested: block,
            available: blocks.len(),
        });
    };

    let label = target.label;
    let label_before = list.document().read(|d| d.text_content(label)).await;
    let outcome = list
        .activate_copy(target.control)
        .await
        .unwrap_or(CopyOutcome::Failed);
    if !outcome.copied() {
        return Err(CopyCommandError::ClipboardFailed);
    }
    let label_after = list.document().read(|d| d.text_content(label)).await;

    Ok(CopyReport {
        block,
        language: target.language.clone(),
        label_before,
        label_after,
        outcome,
    })
}
