use serde::{Deserialize, Serialize};

/// What kind of update the messaging platform delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A regular chat message (usually with text).
    Message,
    /// An inline-keyboard button press.
    Callback,
    /// Anything else the transport delivers; no handler is required to match.
    Other,
}

/// Identity of the user who triggered an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A single inbound chat event, normalized from the transport's wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    pub event_id: i64,
    /// The conversation (chat) this event belongs to.
    pub conversation_id: i64,
    pub kind: EventKind,
    pub text: Option<String>,
    pub callback_data: Option<String>,
    pub sender: Option<Sender>,
}

impl InboundEvent {
    /// A plain text message event.
    pub fn message(event_id: i64, conversation_id: i64, text: impl Into<String>) -> Self {
        Self {
            event_id,
            conversation_id,
            kind: EventKind::Message,
            text: Some(text.into()),
            callback_data: None,
            sender: None,
        }
    }

    /// An inline-keyboard callback event.
    pub fn callback(event_id: i64, conversation_id: i64, data: impl Into<String>) -> Self {
        Self {
            event_id,
            conversation_id,
            kind: EventKind::Callback,
            text: None,
            callback_data: Some(data.into()),
            sender: None,
        }
    }

    pub fn with_sender(mut self, sender: Sender) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn sender_id(&self) -> Option<i64> {
        self.sender.as_ref().map(|s| s.id)
    }
}
