use {
    async_trait::async_trait,
    tracing::debug,
    waggle_common::{Button, EventKind, InboundEvent},
    waggle_dispatch::EventHandler,
    waggle_orders::DraftPatch,
    waggle_sessions::FlowState,
};

use crate::{
    FlowContext, callbacks, render_order, requester_from, services, start::send_main_menu,
};

/// Inline-keyboard callbacks: menu navigation, service selection, draft
/// cancel, FAQ answers, contact and job cards.
pub struct MenuHandler {
    ctx: FlowContext,
    priority: i32,
}

impl MenuHandler {
    pub fn new(ctx: FlowContext, priority: i32) -> Self {
        Self { ctx, priority }
    }

    async fn send_services_menu(&self, chat_id: i64) -> anyhow::Result<()> {
        let menu = &self.ctx.config.ui.services_menu;
        let buttons = vec![
            vec![Button::new(menu.walk.clone(), callbacks::S_WALK)],
            vec![Button::new(menu.boarding.clone(), callbacks::S_BOARDING)],
            vec![Button::new(menu.nanny.clone(), callbacks::S_NANNY)],
            vec![Button::new(menu.back.clone(), callbacks::BACK_MAIN)],
        ];
        self.ctx.notifier.send(chat_id, &menu.title, Some(buttons)).await?;
        Ok(())
    }

    async fn send_walk_menu(&self, chat_id: i64) -> anyhow::Result<()> {
        let menu = &self.ctx.config.ui.walk_menu;
        let buttons = vec![
            vec![Button::new(menu.normal.clone(), callbacks::WALK_NORMAL)],
            vec![Button::new(menu.active.clone(), callbacks::WALK_ACTIVE)],
            vec![Button::new(menu.back.clone(), callbacks::SERVICES)],
        ];
        self.ctx.notifier.send(chat_id, &menu.title, Some(buttons)).await?;
        Ok(())
    }

    async fn send_faq_menu(&self, chat_id: i64) -> anyhow::Result<()> {
        let ui = &self.ctx.config.ui;
        let faq = &ui.faq;
        let buttons = vec![
            vec![Button::new(faq.cost.question.clone(), callbacks::GQ_COST)],
            vec![Button::new(faq.pay.question.clone(), callbacks::GQ_PAY)],
            vec![Button::new(faq.keys.question.clone(), callbacks::GQ_KEYS)],
            vec![Button::new(faq.medkit.question.clone(), callbacks::GQ_MEDKIT)],
            vec![Button::new(faq.washpaws.question.clone(), callbacks::GQ_WASHPAWS)],
            vec![Button::new(faq.feed.question.clone(), callbacks::GQ_FEED)],
            vec![Button::new(faq.contract.question.clone(), callbacks::GQ_CONTRACT)],
            vec![Button::new(ui.services_menu.back.clone(), callbacks::BACK_MAIN)],
        ];
        self.ctx.notifier.send(chat_id, &ui.messages.faq_title, Some(buttons)).await?;
        Ok(())
    }

    async fn send_faq_answer(&self, chat_id: i64, answer: &str) -> anyhow::Result<()> {
        let back = vec![vec![Button::new(
            self.ctx.config.ui.services_menu.back.clone(),
            callbacks::GENERAL,
        )]];
        self.ctx.notifier.send(chat_id, answer, Some(back)).await?;
        Ok(())
    }

    /// Create or refresh the chat's draft with the chosen service, move the
    /// session to `AwaitingDescription`, and prompt for the free text.
    async fn begin_draft(
        &self,
        event: &InboundEvent,
        service: &str,
        subtype: Option<&str>,
    ) -> anyhow::Result<()> {
        let chat_id = event.conversation_id;
        let existing = self.ctx.sessions.find(chat_id).and_then(|s| s.current_order_id);
        let order = self.ctx.orders.begin_or_update_draft(chat_id, DraftPatch {
            service: Some(service.to_string()),
            subtype: subtype.map(str::to_string),
            requester: requester_from(event),
            existing_order_id: existing,
            ..Default::default()
        });

        self.ctx.sessions.update(chat_id, |s| {
            s.state = FlowState::AwaitingDescription;
            s.service = order.service.clone();
            s.subtype = order.subtype.clone();
            s.current_order_id = Some(order.id.clone());
            s.description_draft = None;
        });
        debug!(chat_id, order_id = %order.id, service, "draft bound to session");

        let messages = &self.ctx.config.ui.messages;
        let text = format!("{}\n\n{}", render_order(&messages.draft_header, &order), messages.draft_tip);
        let cancel = vec![vec![Button::new(
            self.ctx.config.ui.walk_menu.cancel.clone(),
            callbacks::CANCEL_DRAFT,
        )]];
        self.ctx.notifier.send(chat_id, &text, Some(cancel)).await?;
        Ok(())
    }

    /// Delete the chat's draft (if any) and return the session to `Idle`.
    async fn cancel_draft(&self, chat_id: i64) -> anyhow::Result<()> {
        self.ctx.orders.cancel_draft_for_chat(chat_id);
        self.ctx.sessions.update(chat_id, |s| {
            s.state = FlowState::Idle;
            s.service = None;
            s.subtype = None;
            s.description_draft = None;
            s.current_order_id = None;
        });

        let messages = &self.ctx.config.ui.messages;
        let back = vec![vec![Button::new(messages.back_to_menu.clone(), callbacks::BACK_MAIN)]];
        self.ctx.notifier.send(chat_id, &messages.draft_canceled, Some(back)).await?;
        Ok(())
    }

    async fn send_contact_card(&self, chat_id: i64) -> anyhow::Result<()> {
        let contact = &self.ctx.config.flow.dispatcher_contact;
        let messages = &self.ctx.config.ui.messages;
        let text = if contact.is_empty() {
            messages.contact_fallback.clone()
        } else {
            format!("{}: {contact}", messages.contact_manager)
        };
        self.ctx.notifier.send(chat_id, &text, None).await?;
        Ok(())
    }

    async fn send_job_card(&self, chat_id: i64) -> anyhow::Result<()> {
        let url = &self.ctx.config.flow.job_form_url;
        let ui = &self.ctx.config.ui;
        let text = if url.is_empty() {
            ui.messages.contact_fallback.clone()
        } else {
            format!("{}: {url}", ui.main_menu.work)
        };
        self.ctx.notifier.send(chat_id, &text, None).await?;
        Ok(())
    }
}

#[async_trait]
impl EventHandler for MenuHandler {
    fn name(&self) -> &'static str {
        "callback"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn matches(&self, event: &InboundEvent) -> anyhow::Result<bool> {
        Ok(event.kind == EventKind::Callback && event.callback_data.is_some())
    }

    async fn handle(&self, event: &InboundEvent) -> anyhow::Result<()> {
        let chat_id = event.conversation_id;
        let Some(data) = event.callback_data.as_deref() else {
            return Ok(());
        };
        let faq = &self.ctx.config.ui.faq;

        match data {
            callbacks::BACK_MAIN => send_main_menu(&self.ctx, chat_id).await,
            callbacks::SERVICES => self.send_services_menu(chat_id).await,
            callbacks::S_WALK => self.send_walk_menu(chat_id).await,
            callbacks::WALK_NORMAL => {
                self.begin_draft(event, services::WALK, Some(services::SUBTYPE_NORMAL)).await
            },
            callbacks::WALK_ACTIVE => {
                self.begin_draft(event, services::WALK, Some(services::SUBTYPE_ACTIVE)).await
            },
            callbacks::S_BOARDING => self.begin_draft(event, services::BOARDING, None).await,
            callbacks::S_NANNY => self.begin_draft(event, services::NANNY, None).await,
            callbacks::CANCEL_DRAFT => self.cancel_draft(chat_id).await,
            callbacks::CALL_MANAGER => self.send_contact_card(chat_id).await,
            callbacks::WORK => self.send_job_card(chat_id).await,
            callbacks::GENERAL => self.send_faq_menu(chat_id).await,
            callbacks::GQ_COST => self.send_faq_answer(chat_id, &faq.cost.answer).await,
            callbacks::GQ_PAY => self.send_faq_answer(chat_id, &faq.pay.answer).await,
            callbacks::GQ_KEYS => self.send_faq_answer(chat_id, &faq.keys.answer).await,
            callbacks::GQ_MEDKIT => {
                self.send_faq_answer(chat_id, &faq.medkit.answer).await
            },
            callbacks::GQ_WASHPAWS => {
                self.send_faq_answer(chat_id, &faq.washpaws.answer).await
            },
            callbacks::GQ_FEED => self.send_faq_answer(chat_id, &faq.feed.answer).await,
            callbacks::GQ_CONTRACT => {
                self.send_faq_answer(chat_id, &faq.contract.answer).await
            },
            other => {
                debug!(chat_id, data = other, "unrecognized callback");
                self.ctx
                    .notifier
                    .send(chat_id, &self.ctx.config.ui.messages.unknown_command, None)
                    .await?;
                Ok(())
            },
        }
    }
}
