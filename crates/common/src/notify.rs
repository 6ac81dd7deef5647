use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::Result;

/// A single inline-keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Label shown to the user.
    pub text: String,
    /// Callback payload delivered back when pressed.
    pub data: String,
}

impl Button {
    pub fn new(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: data.into(),
        }
    }
}

/// Outbound message capability consumed by flow handlers.
///
/// The gateway provides the concrete implementation (Telegram in production,
/// a recording fake in tests). Transport errors propagate to the caller;
/// the dispatcher boundary logs them.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a text message, optionally with inline keyboard rows.
    async fn send(
        &self,
        conversation_id: i64,
        text: &str,
        buttons: Option<Vec<Vec<Button>>>,
    ) -> Result<()>;
}
