use {async_trait::async_trait, waggle_common::InboundEvent};

/// One link in the dispatch chain.
///
/// `matches` is a cheap predicate consulted in priority order; `handle` runs
/// only for the first handler that matched. A predicate may fail — the
/// dispatcher treats a failed predicate as a non-match so one broken handler
/// cannot take the whole chain down.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Stable name, used in logs and as the tie-breaker between handlers
    /// sharing a priority.
    fn name(&self) -> &'static str;

    /// Lower values are consulted first.
    fn priority(&self) -> i32;

    fn matches(&self, event: &InboundEvent) -> anyhow::Result<bool>;

    async fn handle(&self, event: &InboundEvent) -> anyhow::Result<()>;
}
