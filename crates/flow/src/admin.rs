//! Administrative commands: `/setstatus`, `/orders`, `/myorders`.
//!
//! `/setstatus` and `/orders` are gated by the `flow.allowed_user_ids`
//! allow-list; `/myorders` only ever shows the requesting chat's own orders
//! and is open to everyone.

use std::str::FromStr;

use {
    async_trait::async_trait,
    tracing::info,
    waggle_common::{EventKind, InboundEvent},
    waggle_dispatch::EventHandler,
    waggle_orders::{Order, OrderStatus},
};

use crate::{FlowContext, command, command_args, subtype_suffix};

/// Page size for order listings when the command gives no limit.
const DEFAULT_LIST_LIMIT: usize = 10;
/// Hard cap for a single listing message.
const MAX_LIST_LIMIT: usize = 50;

fn parse_limit(args: &[&str]) -> usize {
    args.first()
        .and_then(|a| a.parse::<usize>().ok())
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT)
}

fn format_listing(header: &str, orders: &[Order]) -> String {
    let mut out = String::from(header);
    for order in orders {
        out.push_str(&format!(
            "\n`{}` {} — {}{}",
            order.id,
            order.status,
            order.service.as_deref().unwrap_or("—"),
            subtype_suffix(order.subtype.as_deref()),
        ));
    }
    out
}

/// `/setstatus <orderId> <STATUS>`: move an order along its lifecycle.
pub struct SetStatusHandler {
    ctx: FlowContext,
    priority: i32,
}

impl SetStatusHandler {
    pub fn new(ctx: FlowContext, priority: i32) -> Self {
        Self { ctx, priority }
    }
}

#[async_trait]
impl EventHandler for SetStatusHandler {
    fn name(&self) -> &'static str {
        "setstatus"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn matches(&self, event: &InboundEvent) -> anyhow::Result<bool> {
        Ok(event.kind == EventKind::Message
            && event.text.as_deref().and_then(command) == Some("/setstatus"))
    }

    async fn handle(&self, event: &InboundEvent) -> anyhow::Result<()> {
        let chat_id = event.conversation_id;
        let messages = &self.ctx.config.ui.messages;

        if !self.ctx.config.flow.is_admin(event.sender_id()) {
            self.ctx.notifier.send(chat_id, &messages.no_permission, None).await?;
            return Ok(());
        }

        let text = event.text.as_deref().unwrap_or_default();
        let args = command_args(text);
        let &[order_id, status_name] = &args[..] else {
            self.ctx.notifier.send(chat_id, &messages.setstatus_usage, None).await?;
            return Ok(());
        };

        let Ok(status) = OrderStatus::from_str(status_name) else {
            self.ctx.notifier.send(chat_id, &messages.unknown_status, None).await?;
            return Ok(());
        };

        match self.ctx.orders.update_status(order_id, status) {
            Some(order) => {
                info!(order_id = %order.id, status = %order.status, admin = ?event.sender_id(), "status updated");
                self.ctx.notifier.send(chat_id, &messages.status_updated, None).await?;
            },
            None => {
                self.ctx.notifier.send(chat_id, &messages.order_not_found, None).await?;
            },
        }
        Ok(())
    }
}

/// `/orders [limit]` (admin, all chats) and `/myorders [limit]` (own chat).
pub struct OrdersHandler {
    ctx: FlowContext,
    priority: i32,
}

impl OrdersHandler {
    pub fn new(ctx: FlowContext, priority: i32) -> Self {
        Self { ctx, priority }
    }
}

#[async_trait]
impl EventHandler for OrdersHandler {
    fn name(&self) -> &'static str {
        "orders"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn matches(&self, event: &InboundEvent) -> anyhow::Result<bool> {
        if event.kind != EventKind::Message {
            return Ok(false);
        }
        Ok(matches!(
            event.text.as_deref().and_then(command),
            Some("/orders" | "/myorders")
        ))
    }

    async fn handle(&self, event: &InboundEvent) -> anyhow::Result<()> {
        let chat_id = event.conversation_id;
        let messages = &self.ctx.config.ui.messages;
        let text = event.text.as_deref().unwrap_or_default();
        let limit = parse_limit(&command_args(text));

        let (header, orders) = match command(text) {
            Some("/orders") => {
                if !self.ctx.config.flow.is_admin(event.sender_id()) {
                    self.ctx.notifier.send(chat_id, &messages.no_permission, None).await?;
                    return Ok(());
                }
                (&messages.orders_header, self.ctx.orders.latest(limit))
            },
            _ => (&messages.my_orders_header, self.ctx.orders.latest_by_chat(chat_id, limit)),
        };

        if orders.is_empty() {
            self.ctx.notifier.send(chat_id, &messages.no_orders, None).await?;
            return Ok(());
        }
        self.ctx
            .notifier
            .send(chat_id, &format_listing(header, &orders), None)
            .await?;
        Ok(())
    }
}
