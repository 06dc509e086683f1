//! Copy-to-clipboard for decorated code blocks.
//!
//! A copy control has two states. Activating it copies the block's text and
//! moves it to `Confirmed` (label reads `Copied!`); a timer owned by that one
//! control moves it back to `Idle` after [`CONFIRM_DURATION`].

use crate::ui::dom::{DocumentHandle, NodeId};
use crate::ui::markdown::CodeBlockRef;
use crate::utils::clipboard::{
    ClipboardWriter, CommandClipboard, FallbackClipboard, SystemClipboard,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const COPIED_LABEL: &str = "Copied!";
pub const CONFIRM_DURATION: Duration = Duration::from_millis(2000);

const STATE_ATTR: &str = "data-copy-state";
const ORIGINAL_LABEL_ATTR: &str = "data-label";
const COPIED_CLASS: &str = "copied";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Written through the asynchronous clipboard.
    Primary,
    /// Primary failed; the synchronous fallback succeeded.
    Fallback,
    /// Nothing was copied.
    Failed,
}

impl CopyOutcome {
    pub fn copied(self) -> bool {
        !matches!(self, CopyOutcome::Failed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlState {
    Idle,
    Confirmed,
}

impl ControlState {
    fn as_attr(self) -> &'static str {
        match self {
            ControlState::Idle => "idle",
            ControlState::Confirmed => "confirmed",
        }
    }
}

/// State of a copy control, or `None` once the control is gone.
pub async fn control_state(doc: &DocumentHandle, control: NodeId) -> Option<ControlState> {
    doc.read(|d| match d.attr(control, STATE_ATTR)? {
        "confirmed" => Some(ControlState::Confirmed),
        _ => Some(ControlState::Idle),
    })
    .await
}

/// Fire-and-forget user notification.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        info!(component = "notifier", "{message}");
    }
}

#[derive(Clone)]
pub struct CopyAction {
    primary: Arc<dyn ClipboardWriter>,
    fallback: Arc<dyn FallbackClipboard>,
    notifier: Option<Arc<dyn Notifier>>,
    copied_label: String,
    confirm: Duration,
    timers: Arc<Mutex<HashMap<NodeId, JoinHandle<()>>>>,
}

impl fmt::Debug for CopyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyAction")
            .field("copied_label", &self.copied_label)
            .field("confirm", &self.confirm)
            .finish_non_exhaustive()
    }
}

impl CopyAction {
    pub fn new(primary: Arc<dyn ClipboardWriter>, fallback: Arc<dyn FallbackClipboard>) -> Self {
        Self {
            primary,
            fallback,
            notifier: None,
            copied_label: COPIED_LABEL.to_string(),
            confirm: CONFIRM_DURATION,
            timers: Arc::default(),
        }
    }

    /// Native clipboard first, helper programs second.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClipboard), Arc::new(CommandClipboard))
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_copied_label(mut self, label: impl Into<String>) -> Self {
        self.copied_label = label.into();
        self
    }

    pub fn with_confirm_duration(mut self, confirm: Duration) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn confirm_duration(&self) -> Duration {
        self.confirm
    }

    /// Copies the text content of `block`'s code element.
    ///
    /// Never fails loudly: when both clipboards refuse, the label stays as it
    /// is and [`CopyOutcome::Failed`] is returned.
    pub async fn copy(&self, doc: &DocumentHandle, block: &CodeBlockRef) -> CopyOutcome {
        let text = doc
            .read(|d| d.is_attached(block.code).then(|| d.text_content(block.code)))
            .await;
        let Some(text) = text else {
            debug!(component = "copy", code = %block.code, "Code block is gone; nothing to copy");
            return CopyOutcome::Failed;
        };

        let outcome = match self.primary.write_text(&text).await {
            Ok(()) => CopyOutcome::Primary,
            Err(err) => {
                debug!(component = "copy", error = %err, "Clipboard write failed; trying fallback");
                match self.fallback.copy_sync(&text) {
                    Ok(()) => CopyOutcome::Fallback,
                    Err(fallback_err) => {
                        warn!(
                            component = "copy",
                            primary_error = %err,
                            fallback_error = %fallback_err,
                            "Copy failed"
                        );
                        CopyOutcome::Failed
                    }
                }
            }
        };

        if outcome.copied() {
            self.confirm(doc, block).await;
            if let Some(notifier) = &self.notifier {
                notifier.notify("Copied to clipboard");
            }
            debug!(
                component = "copy",
                language = %block.language,
                chars = text.chars().count(),
                outcome = ?outcome,
                "Code block copied"
            );
        }
        outcome
    }

    async fn confirm(&self, doc: &DocumentHandle, block: &CodeBlockRef) {
        // The previous timer of this control must not revert the new state.
        if let Some(previous) = self.take_timer(block.control) {
            previous.abort();
        }

        let copied_label = self.copied_label.clone();
        let (control, label) = (block.control, block.label);
        let original = doc
            .update(|d| {
                if !d.is_attached(label) {
                    return None;
                }
                let original = d
                    .attr(control, ORIGINAL_LABEL_ATTR)
                    .map(str::to_string)
                    .unwrap_or_else(|| d.text_content(label));
                d.set_attr(control, ORIGINAL_LABEL_ATTR, &original);
                d.set_text_content(label, &copied_label);
                d.set_attr(control, STATE_ATTR, ControlState::Confirmed.as_attr());
                d.add_class(control, COPIED_CLASS);
                Some(original)
            })
            .await;

        if let Some(original) = original {
            self.schedule_revert(doc.clone(), control, label, original);
        }
    }

    fn schedule_revert(&self, doc: DocumentHandle, control: NodeId, label: NodeId, original: String) {
        let delay = self.confirm;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            doc.update(|d| {
                // The entry may have been re-rendered or evicted meanwhile.
                if !d.is_attached(label) {
                    return;
                }
                d.set_text_content(label, &original);
                d.set_attr(control, STATE_ATTR, ControlState::Idle.as_attr());
                d.remove_class(control, COPIED_CLASS);
            })
            .await;
        });

        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        timers.retain(|_, h| !h.is_finished());
        if let Some(stale) = timers.insert(control, handle) {
            stale.abort();
        }
    }

    fn take_timer(&self, control: NodeId) -> Option<JoinHandle<()>> {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&control)
    }

    /// Number of revert timers still pending.
    pub fn pending_timers(&self) -> usize {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|h| !h.is_finished())
            .count()
    }
}
