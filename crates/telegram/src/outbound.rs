//! Outbound message sender for Telegram.

use {
    async_trait::async_trait,
    teloxide::{
        Bot,
        payloads::SendMessageSetters,
        prelude::Requester,
        types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
    },
    tracing::debug,
    waggle_common::{Button, Error, Notifier, Result},
};

/// [`Notifier`] that delivers replies through the Telegram Bot API.
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn keyboard(rows: Vec<Vec<Button>>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        rows.into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|b| InlineKeyboardButton::callback(b.text, b.data))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>(),
    )
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(
        &self,
        conversation_id: i64,
        text: &str,
        buttons: Option<Vec<Vec<Button>>>,
    ) -> Result<()> {
        let mut request = self
            .bot
            .send_message(ChatId(conversation_id), text)
            .parse_mode(ParseMode::Markdown);
        if let Some(rows) = buttons {
            request = request.reply_markup(keyboard(rows));
        }
        request.await.map_err(Error::transport)?;
        debug!(conversation_id, "message delivered");
        Ok(())
    }
}
