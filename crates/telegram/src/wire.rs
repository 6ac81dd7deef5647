//! Minimal mirror of the Telegram Bot API update payload.
//!
//! Only the fields the dispatch chain consumes are modeled; everything else
//! in the webhook body is ignored by serde.

use {
    serde::Deserialize,
    waggle_common::{EventKind, InboundEvent, Sender},
};

#[derive(Debug, Clone, Deserialize)]
pub struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
    pub callback_query: Option<TgCallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgMessage {
    pub chat: TgChat,
    pub text: Option<String>,
    pub from: Option<TgUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgChat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgCallbackQuery {
    pub from: TgUser,
    pub data: Option<String>,
    pub message: Option<TgMessage>,
}

impl From<TgUser> for Sender {
    fn from(user: TgUser) -> Self {
        Sender {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

impl TgUpdate {
    /// Normalize a raw update into an [`InboundEvent`].
    ///
    /// A callback query without an attached message falls back to the
    /// presser's user id as the conversation id (private chats only).
    /// Updates that are neither messages nor callbacks become
    /// [`EventKind::Other`] with conversation id 0 so the dispatcher can
    /// still log and drop them.
    pub fn into_event(self) -> InboundEvent {
        if let Some(callback) = self.callback_query {
            let conversation_id = callback
                .message
                .as_ref()
                .map(|m| m.chat.id)
                .unwrap_or(callback.from.id);
            return InboundEvent {
                event_id: self.update_id,
                conversation_id,
                kind: EventKind::Callback,
                text: None,
                callback_data: callback.data,
                sender: Some(callback.from.into()),
            };
        }

        if let Some(message) = self.message {
            return InboundEvent {
                event_id: self.update_id,
                conversation_id: message.chat.id,
                kind: EventKind::Message,
                text: message.text,
                callback_data: None,
                sender: message.from.map(Into::into),
            };
        }

        InboundEvent {
            event_id: self.update_id,
            conversation_id: 0,
            kind: EventKind::Other,
            text: None,
            callback_data: None,
            sender: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_update_maps_to_message_event() {
        let update: TgUpdate = serde_json::from_str(
            r#"{
                "update_id": 42,
                "message": {
                    "chat": { "id": 7, "type": "private" },
                    "text": "/start",
                    "from": { "id": 9, "username": "ada", "first_name": "Ada" }
                }
            }"#,
        )
        .unwrap();

        let event = update.into_event();
        assert_eq!(event.event_id, 42);
        assert_eq!(event.conversation_id, 7);
        assert_eq!(event.kind, EventKind::Message);
        assert_eq!(event.text.as_deref(), Some("/start"));
        assert_eq!(event.callback_data, None);
        let sender = event.sender.unwrap();
        assert_eq!(sender.id, 9);
        assert_eq!(sender.username.as_deref(), Some("ada"));
    }

    #[test]
    fn test_callback_update_maps_to_callback_event() {
        let update: TgUpdate = serde_json::from_str(
            r#"{
                "update_id": 43,
                "callback_query": {
                    "id": "abc",
                    "from": { "id": 9, "first_name": "Ada" },
                    "data": "S_WALK",
                    "message": { "chat": { "id": 7 } }
                }
            }"#,
        )
        .unwrap();

        let event = update.into_event();
        assert_eq!(event.kind, EventKind::Callback);
        assert_eq!(event.conversation_id, 7);
        assert_eq!(event.callback_data.as_deref(), Some("S_WALK"));
        assert_eq!(event.text, None);
    }

    #[test]
    fn test_callback_without_message_falls_back_to_sender() {
        let update: TgUpdate = serde_json::from_str(
            r#"{
                "update_id": 44,
                "callback_query": {
                    "from": { "id": 9 },
                    "data": "BACK_MAIN"
                }
            }"#,
        )
        .unwrap();

        let event = update.into_event();
        assert_eq!(event.conversation_id, 9);
    }

    #[test]
    fn test_unknown_update_maps_to_other() {
        let update: TgUpdate =
            serde_json::from_str(r#"{ "update_id": 45, "edited_message": {} }"#).unwrap();
        let event = update.into_event();
        assert_eq!(event.kind, EventKind::Other);
        assert_eq!(event.conversation_id, 0);
    }

    #[test]
    fn test_message_without_text() {
        let update: TgUpdate = serde_json::from_str(
            r#"{ "update_id": 46, "message": { "chat": { "id": 7 } } }"#,
        )
        .unwrap();
        let event = update.into_event();
        assert_eq!(event.kind, EventKind::Message);
        assert_eq!(event.text, None);
    }
}
