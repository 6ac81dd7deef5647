use std::collections::HashMap;

use {
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
};

/// Root configuration, deserialized from `waggle.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WaggleConfig {
    pub server: ServerConfig,
    pub telegram: TelegramSection,
    pub flow: FlowConfig,
    pub storage: StorageConfig,
    pub ui: UiCatalog,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8080,
        }
    }
}

/// Telegram credentials and webhook settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TelegramSection {
    /// Bot token from @BotFather.
    pub token: Secret<String>,

    /// Public base URL the webhook is registered under (empty = don't
    /// register, updates are still accepted on the local endpoint).
    pub webhook_url: String,

    /// Local path the webhook endpoint is mounted at.
    pub webhook_path: String,

    /// Shared secret checked against `X-Telegram-Bot-Api-Secret-Token`
    /// (empty = no check).
    pub secret_token: String,
}

impl TelegramSection {
    pub fn token_configured(&self) -> bool {
        !self.token.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for TelegramSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSection")
            .field("token", &"[REDACTED]")
            .field("webhook_url", &self.webhook_url)
            .field("webhook_path", &self.webhook_path)
            .finish_non_exhaustive()
    }
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            webhook_url: String::new(),
            webhook_path: "/webhook/telegram".into(),
            secret_token: String::new(),
        }
    }
}

/// Conversation flow tuning.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Contact shown on the "call manager" card, e.g. "@dog_dispatcher".
    pub dispatcher_contact: String,

    /// Link to the job application form.
    pub job_form_url: String,

    /// Sender ids allowed to run admin commands. Empty = unrestricted.
    pub allowed_user_ids: Vec<i64>,

    /// Handler name → dispatch priority overrides (lower runs earlier).
    pub handler_order: HashMap<String, i32>,
}

impl FlowConfig {
    /// Priority for a handler, falling back to its built-in default.
    pub fn handler_priority(&self, name: &str, default: i32) -> i32 {
        self.handler_order.get(name).copied().unwrap_or(default)
    }

    /// Whether `sender_id` may run admin commands.
    pub fn is_admin(&self, sender_id: Option<i64>) -> bool {
        if self.allowed_user_ids.is_empty() {
            return true;
        }
        sender_id.is_some_and(|id| self.allowed_user_ids.contains(&id))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file backing the durable order mirror.
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "waggle.db".into(),
        }
    }
}

// ── UI text catalog ─────────────────────────────────────────────────────────

/// Every user-visible string, so deployments can rebrand without a rebuild.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UiCatalog {
    pub main_menu: MainMenu,
    pub services_menu: ServicesMenu,
    pub walk_menu: WalkMenu,
    pub messages: Messages,
    pub faq: Faq,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MainMenu {
    pub title: String,
    pub services: String,
    pub work: String,
    pub call_manager: String,
    pub general: String,
}

impl Default for MainMenu {
    fn default() -> Self {
        Self {
            title: "Hi! What can we do for you?".into(),
            services: "🐾 Services".into(),
            work: "💼 Work with us".into(),
            call_manager: "📲 Call the manager".into(),
            general: "❓ General questions".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesMenu {
    pub title: String,
    pub walk: String,
    pub boarding: String,
    pub nanny: String,
    pub back: String,
}

impl Default for ServicesMenu {
    fn default() -> Self {
        Self {
            title: "Pick a service:".into(),
            walk: "🦮 Dog walking".into(),
            boarding: "🏠 Boarding".into(),
            nanny: "🧸 Pet nanny".into(),
            back: "⬅️ Back".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WalkMenu {
    pub title: String,
    pub normal: String,
    pub active: String,
    pub cancel: String,
    pub back: String,
}

impl Default for WalkMenu {
    fn default() -> Self {
        Self {
            title: "What kind of walk?".into(),
            normal: "🚶 Normal".into(),
            active: "🏃 Active".into(),
            cancel: "✖️ Cancel draft".into(),
            back: "⬅️ Back".into(),
        }
    }
}

/// Message templates. `{id}`, `{service}`, `{subtype_suffix}`, `{status}`
/// and `{description}` are substituted by the flow handlers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub draft_header: String,
    pub draft_tip: String,
    pub summary: String,
    pub draft_canceled: String,
    pub back_to_menu: String,
    pub contact_manager: String,
    pub contact_fallback: String,
    pub faq_title: String,
    pub help: String,
    pub unknown_command: String,
    pub no_permission: String,
    pub no_orders: String,
    pub orders_header: String,
    pub my_orders_header: String,
    pub setstatus_usage: String,
    pub unknown_status: String,
    pub status_updated: String,
    pub order_not_found: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            draft_header: "Draft `{id}` started: {service}{subtype_suffix}".into(),
            draft_tip: "Describe what you need (address, time, your pet) in one message.".into(),
            summary: "Order `{id}` accepted ({status}): {service}{subtype_suffix}\n\n{description}"
                .into(),
            draft_canceled: "Draft deleted. Back to the main menu.".into(),
            back_to_menu: "⬅️ Main menu".into(),
            contact_manager: "📲 Call the manager".into(),
            contact_fallback: "Message us right here and we'll pick the right service together."
                .into(),
            faq_title: "Frequent questions:".into(),
            help: "Commands:\n/start — main menu\n/help — this help".into(),
            unknown_command: "Unknown action. Back to /start?".into(),
            no_permission: "You are not allowed to do that.".into(),
            no_orders: "No orders yet.".into(),
            orders_header: "*Latest orders:*".into(),
            my_orders_header: "*Your orders:*".into(),
            setstatus_usage: "Usage: /setstatus <orderId> <NEW|IN_PROGRESS|COMPLETED|CANCELED>"
                .into(),
            unknown_status: "Unknown status.".into(),
            status_updated: "OK".into(),
            order_not_found: "Order not found.".into(),
        }
    }
}

/// One FAQ topic: the button label and the canned answer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

impl FaqItem {
    fn new(question: &str, answer: &str) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Faq {
    pub cost: FaqItem,
    pub pay: FaqItem,
    pub keys: FaqItem,
    pub medkit: FaqItem,
    pub washpaws: FaqItem,
    pub feed: FaqItem,
    pub contract: FaqItem,
}

impl Default for Faq {
    fn default() -> Self {
        Self {
            cost: FaqItem::new(
                "💰 What does it cost?",
                "Pricing depends on the service and your district — the manager will quote you.",
            ),
            pay: FaqItem::new(
                "💳 How do I pay?",
                "We accept cards and bank transfer, after the visit.",
            ),
            keys: FaqItem::new(
                "🔑 What about my keys?",
                "Keys are handed over against a signed receipt and stored in a sealed box.",
            ),
            medkit: FaqItem::new(
                "🩹 Is there a first-aid kit?",
                "Every walker carries a basic pet first-aid kit.",
            ),
            washpaws: FaqItem::new(
                "🧼 Do you wash paws?",
                "Paw washing after the walk is included.",
            ),
            feed: FaqItem::new(
                "🍖 Can you feed my pet?",
                "Feeding during a visit is free, just leave instructions.",
            ),
            contract: FaqItem::new(
                "📄 Is there a contract?",
                "We sign a service contract before the first visit.",
            ),
        }
    }
}
