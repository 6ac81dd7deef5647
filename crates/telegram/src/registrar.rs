//! Webhook registration against the Telegram Bot API.

use {
    anyhow::Context,
    teloxide::{Bot, payloads::SetWebhookSetters, prelude::Requester},
    tracing::info,
    url::Url,
};

/// Point Telegram at our public webhook endpoint. When `secret` is set,
/// Telegram echoes it back in `X-Telegram-Bot-Api-Secret-Token` on every
/// delivery and the gateway rejects requests without it.
pub async fn register_webhook(bot: &Bot, public_url: &str, secret: Option<&str>) -> anyhow::Result<()> {
    let url = Url::parse(public_url)
        .with_context(|| format!("invalid webhook url: {public_url}"))?;
    let mut request = bot.set_webhook(url);
    if let Some(secret) = secret {
        request = request.secret_token(secret.to_string());
    }
    request.await.context("failed to register webhook")?;
    info!(url = public_url, "webhook registered");
    Ok(())
}

/// Drop the webhook registration; pending updates stay queued on Telegram's
/// side.
pub async fn remove_webhook(bot: &Bot) -> anyhow::Result<()> {
    bot.delete_webhook()
        .await
        .context("failed to remove webhook")?;
    info!("webhook removed");
    Ok(())
}
