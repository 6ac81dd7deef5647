//! Conversation flow: the handlers behind the menus, the free-text order
//! capture, and the admin commands.
//!
//! Every handler is a small [`EventHandler`] over a shared [`FlowContext`];
//! [`default_handlers`] assembles the full chain with priorities resolved
//! from configuration.
//!
//! [`EventHandler`]: waggle_dispatch::EventHandler

pub mod admin;
pub mod help;
pub mod menu;
pub mod start;
pub mod text;

use std::sync::Arc;

use {
    waggle_common::{InboundEvent, Notifier},
    waggle_config::WaggleConfig,
    waggle_dispatch::EventHandler,
    waggle_orders::{OrderService, Requester},
    waggle_sessions::SessionStore,
};

pub use {
    admin::{OrdersHandler, SetStatusHandler},
    help::HelpHandler,
    menu::MenuHandler,
    start::StartHandler,
    text::TextHandler,
};

/// Callback payloads carried in inline-keyboard buttons.
pub mod callbacks {
    pub const SERVICES: &str = "SERVICES";
    pub const BACK_MAIN: &str = "BACK_MAIN";
    pub const S_WALK: &str = "S_WALK";
    pub const S_BOARDING: &str = "S_BOARDING";
    pub const S_NANNY: &str = "S_NANNY";
    pub const WALK_NORMAL: &str = "WALK_NORMAL";
    pub const WALK_ACTIVE: &str = "WALK_ACTIVE";
    pub const CANCEL_DRAFT: &str = "CANCEL_DRAFT";
    pub const CALL_MANAGER: &str = "CALL_MANAGER";
    pub const WORK: &str = "WORK";
    pub const GENERAL: &str = "GENERAL";
    pub const GQ_COST: &str = "GQ_COST";
    pub const GQ_PAY: &str = "GQ_PAY";
    pub const GQ_KEYS: &str = "GQ_KEYS";
    pub const GQ_MEDKIT: &str = "GQ_MEDKIT";
    pub const GQ_WASHPAWS: &str = "GQ_WASHPAWS";
    pub const GQ_FEED: &str = "GQ_FEED";
    pub const GQ_CONTRACT: &str = "GQ_CONTRACT";
}

/// Service names as stored on orders.
pub mod services {
    pub const WALK: &str = "Walk";
    pub const BOARDING: &str = "Boarding";
    pub const NANNY: &str = "Nanny";
    pub const SUBTYPE_NORMAL: &str = "Normal";
    pub const SUBTYPE_ACTIVE: &str = "Active";
}

/// Shared dependencies handed to every flow handler.
#[derive(Clone)]
pub struct FlowContext {
    pub sessions: Arc<SessionStore>,
    pub orders: Arc<OrderService>,
    pub notifier: Arc<dyn Notifier>,
    pub config: Arc<WaggleConfig>,
}

/// The full handler chain, priorities resolved from `flow.handler_order`
/// with the built-in defaults: start 10, callback 20, setstatus 25,
/// orders 26, help 30, text 40.
pub fn default_handlers(ctx: &FlowContext) -> Vec<Arc<dyn EventHandler>> {
    let flow = &ctx.config.flow;
    vec![
        Arc::new(StartHandler::new(ctx.clone(), flow.handler_priority("start", 10))),
        Arc::new(MenuHandler::new(ctx.clone(), flow.handler_priority("callback", 20))),
        Arc::new(SetStatusHandler::new(ctx.clone(), flow.handler_priority("setstatus", 25))),
        Arc::new(OrdersHandler::new(ctx.clone(), flow.handler_priority("orders", 26))),
        Arc::new(HelpHandler::new(ctx.clone(), flow.handler_priority("help", 30))),
        Arc::new(TextHandler::new(ctx.clone(), flow.handler_priority("text", 40))),
    ]
}

/// First token of a slash command, with any `@botname` suffix stripped.
/// `None` when the text is not a command.
pub(crate) fn command(text: &str) -> Option<&str> {
    let token = text.trim().split_whitespace().next()?;
    if !token.starts_with('/') {
        return None;
    }
    Some(token.split('@').next().unwrap_or(token))
}

/// Arguments following the command token.
pub(crate) fn command_args(text: &str) -> Vec<&str> {
    text.trim().split_whitespace().skip(1).collect()
}

pub(crate) fn requester_from(event: &InboundEvent) -> Option<Requester> {
    event.sender.as_ref().map(|s| Requester {
        username: s.username.clone(),
        first_name: s.first_name.clone(),
        last_name: s.last_name.clone(),
    })
}

/// `" (Normal)"` when a subtype is present, empty otherwise; substituted
/// into the `{subtype_suffix}` template placeholder.
pub(crate) fn subtype_suffix(subtype: Option<&str>) -> String {
    subtype.map(|s| format!(" ({s})")).unwrap_or_default()
}

/// Fill a UI catalog template from an order. Supported placeholders:
/// `{id}`, `{status}`, `{service}`, `{subtype_suffix}`, `{description}`.
pub(crate) fn render_order(template: &str, order: &waggle_orders::Order) -> String {
    template
        .replace("{id}", &order.id)
        .replace("{status}", order.status.as_str())
        .replace("{service}", order.service.as_deref().unwrap_or("—"))
        .replace("{subtype_suffix}", &subtype_suffix(order.subtype.as_deref()))
        .replace("{description}", order.description.as_deref().unwrap_or(""))
}


#[cfg(test)]
mod tests {
    use {
        waggle_common::{InboundEvent, Sender},
        waggle_dispatch::Dispatcher,
        waggle_orders::OrderStatus,
        waggle_sessions::FlowState,
    };

    use super::{testutil::test_ctx, *};

    fn dispatcher(ctx: &FlowContext) -> Dispatcher {
        Dispatcher::new(default_handlers(ctx))
    }

    fn with_sender(event: InboundEvent, id: i64) -> InboundEvent {
        event.with_sender(Sender {
            id,
            username: Some("ada".into()),
            first_name: Some("Ada".into()),
            last_name: None,
        })
    }

    #[test]
    fn test_default_chain_order() {
        let (ctx, _) = test_ctx();
        let d = dispatcher(&ctx);
        assert_eq!(d.ranked(), vec!["start", "callback", "setstatus", "orders", "help", "text"]);
    }

    #[test]
    fn test_priority_overrides_from_config() {
        let (mut ctx, _) = test_ctx();
        let mut config = WaggleConfig::default();
        config.flow.handler_order.insert("text".into(), 5);
        ctx.config = Arc::new(config);

        let d = dispatcher(&ctx);
        assert_eq!(d.ranked()[0], "text");
    }

    #[tokio::test]
    async fn test_walk_order_end_to_end() {
        let (ctx, notifier) = test_ctx();
        let d = dispatcher(&ctx);

        d.dispatch(&with_sender(InboundEvent::callback(1, 7, callbacks::WALK_NORMAL), 9))
            .await;

        let session = ctx.sessions.get(7);
        assert_eq!(session.state, FlowState::AwaitingDescription);
        let draft_id = session.current_order_id.clone().unwrap();
        let draft = ctx.orders.find_by_id(&draft_id).unwrap();
        assert_eq!(draft.status, OrderStatus::Draft);
        assert_eq!(draft.service.as_deref(), Some("Walk"));
        assert_eq!(draft.subtype.as_deref(), Some("Normal"));

        d.dispatch(&with_sender(InboundEvent::message(2, 7, "please come at 5pm"), 9))
            .await;

        let order = ctx.orders.find_by_id(&draft_id).unwrap();
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.description.as_deref(), Some("please come at 5pm"));
        assert_eq!(order.requester.as_ref().unwrap().username.as_deref(), Some("ada"));
        assert_eq!(ctx.sessions.get(7).state, FlowState::Idle);
        assert_eq!(ctx.orders.active_draft_id(7), None);
        assert!(notifier.last_text().contains("please come at 5pm"));
    }

    #[tokio::test]
    async fn test_cancel_while_awaiting_description() {
        let (ctx, _) = test_ctx();
        let d = dispatcher(&ctx);

        d.dispatch(&InboundEvent::callback(1, 7, callbacks::WALK_ACTIVE)).await;
        let draft_id = ctx.orders.active_draft_id(7).unwrap();

        d.dispatch(&InboundEvent::callback(2, 7, callbacks::CANCEL_DRAFT)).await;

        assert!(ctx.orders.find_by_id(&draft_id).is_none());
        assert_eq!(ctx.orders.active_draft_id(7), None);
        assert_eq!(ctx.sessions.get(7).state, FlowState::Idle);
    }

    #[tokio::test]
    async fn test_idle_text_is_ignored() {
        let (ctx, notifier) = test_ctx();
        let d = dispatcher(&ctx);

        d.dispatch(&InboundEvent::message(1, 7, "just saying hi")).await;

        assert!(ctx.orders.latest(10).is_empty());
        assert!(ctx.sessions.find(7).is_none(), "no session may be created for idle chatter");
        assert!(notifier.texts().is_empty());
    }

    #[tokio::test]
    async fn test_start_goes_to_start_handler() {
        let (ctx, notifier) = test_ctx();
        let d = dispatcher(&ctx);

        d.dispatch(&InboundEvent::message(1, 7, "/start")).await;

        let texts = notifier.texts();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0], ctx.config.ui.main_menu.title);
        assert!(ctx.orders.latest(10).is_empty(), "text handler must not see /start");
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(command("/start"), Some("/start"));
        assert_eq!(command("  /orders 5 "), Some("/orders"));
        assert_eq!(command("/setstatus@waggle_bot abc NEW"), Some("/setstatus"));
        assert_eq!(command("hello"), None);
        assert_eq!(command(""), None);
        assert_eq!(command_args("/setstatus abc NEW"), vec!["abc", "NEW"]);
    }
}
