use std::sync::Arc;

use {
    tracing::{debug, error, warn},
    waggle_common::InboundEvent,
};

use crate::handler::EventHandler;

/// Longest prefix of an event's text carried into log lines.
const BRIEF_LEN: usize = 64;

/// Walks a fixed chain of [`EventHandler`]s in priority order and hands each
/// event to the first one that matches.
///
/// The chain is sorted once at construction by `(priority, name)`; dispatch
/// itself never reorders or mutates it. `dispatch` never returns an error:
/// handler and predicate failures are logged and swallowed so one bad event
/// cannot wedge the intake loop.
pub struct Dispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl Dispatcher {
    pub fn new(mut handlers: Vec<Arc<dyn EventHandler>>) -> Self {
        handlers.sort_by(|a, b| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| a.name().cmp(b.name()))
        });
        Self { handlers }
    }

    /// Route one event to the first matching handler.
    ///
    /// A predicate that returns an error counts as a non-match and the walk
    /// continues. An event nothing matches is logged at debug and dropped.
    pub async fn dispatch(&self, event: &InboundEvent) {
        let started = std::time::Instant::now();
        for handler in &self.handlers {
            let matched = match handler.matches(event) {
                Ok(matched) => matched,
                Err(e) => {
                    warn!(
                        handler = handler.name(),
                        event_id = event.event_id,
                        error = %e,
                        "handler predicate failed, skipping"
                    );
                    false
                },
            };
            if !matched {
                continue;
            }

            if let Err(e) = handler.handle(event).await {
                error!(
                    handler = handler.name(),
                    event_id = event.event_id,
                    conversation_id = event.conversation_id,
                    brief = %brief(event),
                    error = %e,
                    "handler failed"
                );
            }
            debug!(
                handler = handler.name(),
                event_id = event.event_id,
                conversation_id = event.conversation_id,
                brief = %brief(event),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "event dispatched"
            );
            return;
        }

        debug!(
            event_id = event.event_id,
            conversation_id = event.conversation_id,
            brief = %brief(event),
            "no handler matched event"
        );
    }

    /// Handler names in consultation order.
    pub fn ranked(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }
}

/// One-line event summary for logs: the text or callback payload with
/// newlines stripped, truncated to at most 64 characters.
fn brief(event: &InboundEvent) -> String {
    let raw = event
        .text
        .as_deref()
        .or(event.callback_data.as_deref())
        .unwrap_or("");
    let flat: String = raw
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    flat.chars().take(BRIEF_LEN).collect()
}
