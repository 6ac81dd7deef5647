use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Where a conversation currently is in the order workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowState {
    #[default]
    Idle,
    /// A draft exists and the next free-text message finalizes it.
    AwaitingDescription,
}

/// Mutable per-conversation state. At most one per chat id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub chat_id: i64,
    pub state: FlowState,
    pub service: Option<String>,
    pub subtype: Option<String>,
    pub description_draft: Option<String>,
    /// Id of the chat's live DRAFT order, if any.
    pub current_order_id: Option<String>,
    /// Unix seconds of the last time this session was touched.
    pub last_activity: i64,
}

impl ConversationSession {
    /// Fresh idle session, stamped now.
    pub fn new(chat_id: i64) -> Self {
        Self {
            chat_id,
            state: FlowState::Idle,
            service: None,
            subtype: None,
            description_draft: None,
            current_order_id: None,
            last_activity: now_secs(),
        }
    }
}

pub(crate) fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
