use {
    async_trait::async_trait,
    waggle_common::{Button, EventKind, InboundEvent},
    waggle_dispatch::EventHandler,
    waggle_sessions::ConversationSession,
};

use crate::{FlowContext, callbacks, command};

/// `/start`: resets the conversation and shows the main menu.
pub struct StartHandler {
    ctx: FlowContext,
    priority: i32,
}

impl StartHandler {
    pub fn new(ctx: FlowContext, priority: i32) -> Self {
        Self { ctx, priority }
    }
}

/// The top-level menu, built from the UI catalog.
pub(crate) async fn send_main_menu(ctx: &FlowContext, chat_id: i64) -> anyhow::Result<()> {
    let menu = &ctx.config.ui.main_menu;
    let buttons = vec![
        vec![Button::new(menu.services.clone(), callbacks::SERVICES)],
        vec![Button::new(menu.work.clone(), callbacks::WORK)],
        vec![Button::new(menu.call_manager.clone(), callbacks::CALL_MANAGER)],
        vec![Button::new(menu.general.clone(), callbacks::GENERAL)],
    ];
    ctx.notifier.send(chat_id, &menu.title, Some(buttons)).await?;
    Ok(())
}

#[async_trait]
impl EventHandler for StartHandler {
    fn name(&self) -> &'static str {
        "start"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn matches(&self, event: &InboundEvent) -> anyhow::Result<bool> {
        Ok(event.kind == EventKind::Message
            && event.text.as_deref().and_then(command) == Some("/start"))
    }

    async fn handle(&self, event: &InboundEvent) -> anyhow::Result<()> {
        let chat_id = event.conversation_id;
        // A fresh Idle session; any in-flight draft stays untouched and can
        // be picked up again from the services menu.
        self.ctx.sessions.save(ConversationSession::new(chat_id));
        send_main_menu(&self.ctx, chat_id).await
    }
}
