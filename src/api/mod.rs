//! Wire payloads exchanged with the chat backend.

use crate::core::message::Message;
use serde::{Deserialize, Serialize};

/// One page of conversation history, oldest message first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub messages: Vec<Message>,
    /// More, older pages exist before this one.
    #[serde(default)]
    pub has_more: bool,
}

impl HistoryPage {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
