use {
    async_trait::async_trait,
    tracing::info,
    waggle_common::{Button, EventKind, InboundEvent},
    waggle_dispatch::EventHandler,
    waggle_orders::{DraftPatch, OrderStatus},
    waggle_sessions::FlowState,
};

use crate::{FlowContext, callbacks, render_order, requester_from};

/// Free-text capture: finalizes the active draft with the message text.
///
/// Only fires while the session is in `AwaitingDescription` — idle chatter
/// is left to other handlers (and in practice dropped). Commands are never
/// treated as descriptions.
pub struct TextHandler {
    ctx: FlowContext,
    priority: i32,
}

impl TextHandler {
    pub fn new(ctx: FlowContext, priority: i32) -> Self {
        Self { ctx, priority }
    }
}

#[async_trait]
impl EventHandler for TextHandler {
    fn name(&self) -> &'static str {
        "text"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn matches(&self, event: &InboundEvent) -> anyhow::Result<bool> {
        if event.kind != EventKind::Message {
            return Ok(false);
        }
        let Some(text) = event.text.as_deref() else {
            return Ok(false);
        };
        if text.trim().is_empty() || text.trim().starts_with('/') {
            return Ok(false);
        }
        Ok(self
            .ctx
            .sessions
            .find(event.conversation_id)
            .is_some_and(|s| s.state == FlowState::AwaitingDescription))
    }

    async fn handle(&self, event: &InboundEvent) -> anyhow::Result<()> {
        let chat_id = event.conversation_id;
        let Some(description) = event.text.as_deref().map(str::trim) else {
            return Ok(());
        };

        let existing = self.ctx.sessions.find(chat_id).and_then(|s| s.current_order_id);
        let order = self.ctx.orders.begin_or_update_draft(chat_id, DraftPatch {
            description: Some(description.to_string()),
            status: Some(OrderStatus::New),
            requester: requester_from(event),
            existing_order_id: existing,
            ..Default::default()
        });

        self.ctx.sessions.update(chat_id, |s| {
            s.state = FlowState::Idle;
            s.service = None;
            s.subtype = None;
            s.description_draft = None;
            s.current_order_id = None;
        });
        info!(chat_id, order_id = %order.id, "order finalized");

        let messages = &self.ctx.config.ui.messages;
        let back = vec![vec![Button::new(messages.back_to_menu.clone(), callbacks::BACK_MAIN)]];
        self.ctx
            .notifier
            .send(chat_id, &render_order(&messages.summary, &order), Some(back))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{menu::MenuHandler, testutil::test_ctx},
    };

    async fn start_walk_draft(ctx: &FlowContext) -> String {
        MenuHandler::new(ctx.clone(), 20)
            .handle(&InboundEvent::callback(1, 7, callbacks::WALK_NORMAL))
            .await
            .unwrap();
        ctx.orders.active_draft_id(7).unwrap()
    }

    #[tokio::test]
    async fn test_finalizes_draft_with_description() {
        let (ctx, notifier) = test_ctx();
        let draft_id = start_walk_draft(&ctx).await;
        let handler = TextHandler::new(ctx.clone(), 40);

        let event = InboundEvent::message(2, 7, "please come at 5pm");
        assert!(handler.matches(&event).unwrap());
        handler.handle(&event).await.unwrap();

        let order = ctx.orders.find_by_id(&draft_id).unwrap();
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(order.description.as_deref(), Some("please come at 5pm"));
        assert_eq!(ctx.sessions.get(7).state, FlowState::Idle);
        assert_eq!(ctx.orders.active_draft_id(7), None);

        let summary = notifier.last_text();
        assert!(summary.contains(&draft_id));
        assert!(summary.contains("NEW"));
        assert!(summary.contains("please come at 5pm"));
    }

    #[tokio::test]
    async fn test_idle_session_does_not_match() {
        let (ctx, _) = test_ctx();
        let handler = TextHandler::new(ctx.clone(), 40);

        assert!(!handler.matches(&InboundEvent::message(1, 7, "hello")).unwrap());

        ctx.sessions.save(waggle_sessions::ConversationSession::new(7));
        assert!(
            !handler.matches(&InboundEvent::message(2, 7, "hello")).unwrap(),
            "Idle session must not capture text"
        );
    }

    #[tokio::test]
    async fn test_commands_and_blank_text_do_not_match() {
        let (ctx, _) = test_ctx();
        start_walk_draft(&ctx).await;
        let handler = TextHandler::new(ctx.clone(), 40);

        assert!(!handler.matches(&InboundEvent::message(2, 7, "/orders")).unwrap());
        assert!(!handler.matches(&InboundEvent::message(3, 7, "   ")).unwrap());
        assert!(!handler.matches(&InboundEvent::callback(4, 7, "S_WALK")).unwrap());
        assert!(handler.matches(&InboundEvent::message(5, 7, "a real description")).unwrap());
    }

    #[tokio::test]
    async fn test_replayed_finalize_is_idempotent() {
        let (ctx, _) = test_ctx();
        let draft_id = start_walk_draft(&ctx).await;
        let handler = TextHandler::new(ctx.clone(), 40);

        let event = InboundEvent::message(2, 7, "please come at 5pm");
        handler.handle(&event).await.unwrap();
        // Redelivery of the same update: pointer is gone, no session match,
        // and even a forced handle must not resurrect or duplicate anything.
        assert!(!handler.matches(&event).unwrap());

        assert_eq!(ctx.orders.latest(10).len(), 1);
        assert_eq!(ctx.orders.find_by_id(&draft_id).unwrap().status, OrderStatus::New);
    }
}
