use {
    async_trait::async_trait,
    waggle_common::{EventKind, InboundEvent},
    waggle_dispatch::EventHandler,
};

use crate::{FlowContext, command};

/// `/help`: the static command reference from the UI catalog.
pub struct HelpHandler {
    ctx: FlowContext,
    priority: i32,
}

impl HelpHandler {
    pub fn new(ctx: FlowContext, priority: i32) -> Self {
        Self { ctx, priority }
    }
}

#[async_trait]
impl EventHandler for HelpHandler {
    fn name(&self) -> &'static str {
        "help"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn matches(&self, event: &InboundEvent) -> anyhow::Result<bool> {
        Ok(event.kind == EventKind::Message
            && event.text.as_deref().and_then(command) == Some("/help"))
    }

    async fn handle(&self, event: &InboundEvent) -> anyhow::Result<()> {
        self.ctx
            .notifier
            .send(event.conversation_id, &self.ctx.config.ui.messages.help, None)
            .await?;
        Ok(())
    }
}
