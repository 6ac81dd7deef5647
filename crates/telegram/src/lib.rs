//! Telegram transport: wire-format parsing for inbound webhook updates,
//! the outbound [`Notifier`] implementation, and webhook registration.
//!
//! [`Notifier`]: waggle_common::Notifier

pub mod outbound;
pub mod registrar;
pub mod wire;

pub use {
    outbound::TelegramNotifier,
    registrar::{register_webhook, remove_webhook},
    wire::TgUpdate,
};

use {
    secrecy::{ExposeSecret, Secret},
    teloxide::Bot,
};

/// Build an API client from the configured token. The token leaves its
/// [`Secret`] wrapper only here.
pub fn make_bot(token: &Secret<String>) -> Bot {
    Bot::new(token.expose_secret().as_str())
}
