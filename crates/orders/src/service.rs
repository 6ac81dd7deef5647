//! Draft/order lifecycle over a fast in-memory primary store.
//!
//! One `RwLock` guards the record map, the active-draft pointers, and both
//! recency indexes, so every lifecycle operation is a single atomic critical
//! section — concurrent workers for the same chat can never observe two live
//! drafts or a dangling index entry.

use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use {
    tracing::{debug, warn},
    uuid::Uuid,
};

use crate::{
    mirror::OrderMirror,
    order::{Order, OrderStatus, Requester},
};

/// Hard cap on `latest` / `latest_by_chat` page sizes.
const MAX_PAGE: usize = 200;

/// Upper bound on a single mirror write before it is abandoned.
const MIRROR_TIMEOUT: Duration = Duration::from_secs(5);

/// Partial update applied by [`OrderService::begin_or_update_draft`].
/// Absent fields leave the stored value untouched, they never clear it.
#[derive(Debug, Clone, Default)]
pub struct DraftPatch {
    pub service: Option<String>,
    pub subtype: Option<String>,
    pub description: Option<String>,
    pub status: Option<OrderStatus>,
    pub requester: Option<Requester>,
    /// Mutate this order instead of resolving the chat's active draft.
    pub existing_order_id: Option<String>,
}

#[derive(Default)]
struct Inner {
    orders: HashMap<String, Order>,
    /// chat id → id of the chat's single live DRAFT.
    drafts: HashMap<i64, String>,
    /// (created_at, id) over all orders; iterated in reverse for `latest`.
    by_created: BTreeSet<(i64, String)>,
    by_chat: HashMap<i64, BTreeSet<(i64, String)>>,
}

/// Owns all order records, the active-draft pointers, and the recency
/// indexes; write-through mirrors every save/delete to durable storage.
pub struct OrderService {
    inner: RwLock<Inner>,
    mirror: Option<Arc<dyn OrderMirror>>,
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_PAGE)
}

impl Default for OrderService {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderService {
    /// Memory-only service (no durable mirror).
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            mirror: None,
        }
    }

    pub fn with_mirror(mirror: Arc<dyn OrderMirror>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            mirror: Some(mirror),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Id of the chat's live DRAFT, if any.
    pub fn active_draft_id(&self, chat_id: i64) -> Option<String> {
        self.read().drafts.get(&chat_id).cloned()
    }

    /// Create or update the draft for `chat_id` in one atomic step.
    ///
    /// The order to mutate is resolved as: `existing_order_id` if given and
    /// still resolvable, else the chat's active draft, else a fresh DRAFT.
    /// A dangling id (e.g. a concurrently canceled draft) therefore degrades
    /// to "no active draft" instead of failing the flow. After the save the
    /// active-draft pointer is set when the resulting status is DRAFT, and
    /// cleared only if it points at this very order.
    pub fn begin_or_update_draft(&self, chat_id: i64, patch: DraftPatch) -> Order {
        let now = now_ms();
        let mut inner = self.write();

        let existing = patch
            .existing_order_id
            .as_ref()
            .and_then(|id| inner.orders.get(id).cloned())
            .or_else(|| {
                let id = inner.drafts.get(&chat_id)?;
                inner.orders.get(id).cloned()
            });

        let mut order = existing.unwrap_or_else(|| {
            let mut o = Order::draft(chat_id);
            o.id = Uuid::new_v4().to_string();
            o.created_at = now;
            o
        });

        if let Some(service) = patch.service {
            order.service = Some(service);
        }
        if let Some(subtype) = patch.subtype {
            order.subtype = Some(subtype);
        }
        if let Some(description) = patch.description {
            order.description = Some(description);
        }
        if let Some(requester) = patch.requester {
            order.requester = Some(requester);
        }
        if let Some(status) = patch.status {
            order.status = status;
        }

        let saved = Self::store(&mut inner, order, now);
        Self::repair_draft_pointer(&mut inner, &saved);
        drop(inner);

        self.mirror_upsert(&saved);
        saved
    }

    /// Persist an order: assigns id/created_at if absent, refreshes
    /// `updated_at` (never backwards), writes the primary record, and keeps
    /// both recency indexes in step. Mirrored to durable storage
    /// fire-and-forget.
    pub fn save(&self, order: Order) -> Order {
        let now = now_ms();
        let mut inner = self.write();
        let saved = Self::store(&mut inner, order, now);
        drop(inner);

        self.mirror_upsert(&saved);
        saved
    }

    pub fn find_by_id(&self, order_id: &str) -> Option<Order> {
        if order_id.is_empty() {
            return None;
        }
        self.read().orders.get(order_id).cloned()
    }

    /// Up to `min(max(limit,1),200)` most recent orders, newest first.
    /// Ties on creation time break by id, deterministically.
    pub fn latest(&self, limit: usize) -> Vec<Order> {
        let inner = self.read();
        inner
            .by_created
            .iter()
            .rev()
            .take(clamp_limit(limit))
            .filter_map(|(_, id)| inner.orders.get(id).cloned())
            .collect()
    }

    /// Like [`latest`](Self::latest), restricted to one chat.
    pub fn latest_by_chat(&self, chat_id: i64, limit: usize) -> Vec<Order> {
        let inner = self.read();
        let Some(index) = inner.by_chat.get(&chat_id) else {
            return Vec::new();
        };
        index
            .iter()
            .rev()
            .take(clamp_limit(limit))
            .filter_map(|(_, id)| inner.orders.get(id).cloned())
            .collect()
    }

    /// Delete a draft outright: primary record, active-draft pointer (only
    /// if it points here), both index entries, and the durable replica.
    /// A no-op if the order does not exist.
    pub fn cancel_draft(&self, order_id: &str) {
        let mut inner = self.write();
        let Some(order) = inner.orders.remove(order_id) else {
            return;
        };

        let key = (order.created_at, order.id.clone());
        inner.by_created.remove(&key);
        if let Some(index) = inner.by_chat.get_mut(&order.chat_id) {
            index.remove(&key);
            if index.is_empty() {
                inner.by_chat.remove(&order.chat_id);
            }
        }
        if inner
            .drafts
            .get(&order.chat_id)
            .is_some_and(|id| id.as_str() == order_id)
        {
            inner.drafts.remove(&order.chat_id);
        }
        drop(inner);

        debug!(order_id, chat_id = order.chat_id, "draft canceled and deleted");
        self.mirror_delete(&order.id);
    }

    /// Cancel whatever draft the chat currently has; no-op if none.
    pub fn cancel_draft_for_chat(&self, chat_id: i64) {
        if let Some(id) = self.active_draft_id(chat_id) {
            self.cancel_draft(&id);
        }
    }

    /// Set an order's status; `None` if the order does not exist. The
    /// active-draft pointer follows: set on a transition into DRAFT, cleared
    /// only if it pointed at this order and the new status leaves DRAFT.
    pub fn update_status(&self, order_id: &str, status: OrderStatus) -> Option<Order> {
        let now = now_ms();
        let mut inner = self.write();
        let Some(mut order) = inner.orders.get(order_id).cloned() else {
            drop(inner);
            warn!(order_id, "update_status: order not found");
            return None;
        };
        order.status = status;

        let saved = Self::store(&mut inner, order, now);
        Self::repair_draft_pointer(&mut inner, &saved);
        drop(inner);

        self.mirror_upsert(&saved);
        Some(saved)
    }

    // ── internals ───────────────────────────────────────────────────────────

    fn store(inner: &mut Inner, mut order: Order, now: i64) -> Order {
        if order.id.is_empty() {
            order.id = Uuid::new_v4().to_string();
        }
        if order.created_at == 0 {
            order.created_at = now;
        }
        order.updated_at = match inner.orders.get(&order.id) {
            Some(prev) => now.max(prev.updated_at),
            None => now,
        };

        let key = (order.created_at, order.id.clone());
        inner.by_created.insert(key.clone());
        inner.by_chat.entry(order.chat_id).or_default().insert(key);
        inner.orders.insert(order.id.clone(), order.clone());
        order
    }

    fn repair_draft_pointer(inner: &mut Inner, order: &Order) {
        if order.status == OrderStatus::Draft {
            inner.drafts.insert(order.chat_id, order.id.clone());
        } else if inner
            .drafts
            .get(&order.chat_id)
            .is_some_and(|id| id == &order.id)
        {
            inner.drafts.remove(&order.chat_id);
        }
    }

    fn mirror_upsert(&self, order: &Order) {
        let Some(mirror) = self.mirror.as_ref().map(Arc::clone) else {
            return;
        };
        let order = order.clone();
        tokio::spawn(async move {
            match tokio::time::timeout(MIRROR_TIMEOUT, mirror.upsert(&order)).await {
                Ok(Ok(())) => {},
                Ok(Err(e)) => warn!(order_id = %order.id, error = %e, "mirror upsert failed"),
                Err(_) => warn!(order_id = %order.id, "mirror upsert timed out"),
            }
        });
    }

    fn mirror_delete(&self, order_id: &str) {
        let Some(mirror) = self.mirror.as_ref().map(Arc::clone) else {
            return;
        };
        let order_id = order_id.to_string();
        tokio::spawn(async move {
            match tokio::time::timeout(MIRROR_TIMEOUT, mirror.delete(&order_id)).await {
                Ok(Ok(())) => {},
                Ok(Err(e)) => warn!(%order_id, error = %e, "mirror delete failed"),
                Err(_) => warn!(%order_id, "mirror delete timed out"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn begin(svc: &OrderService, chat_id: i64, service: &str, subtype: Option<&str>) -> Order {
        svc.begin_or_update_draft(chat_id, DraftPatch {
            service: Some(service.into()),
            subtype: subtype.map(Into::into),
            ..Default::default()
        })
    }

    #[test]
    fn test_begin_creates_draft_with_pointer() {
        let svc = OrderService::new();
        let draft = begin(&svc, 7, "Walk", Some("Normal"));

        assert_eq!(draft.status, OrderStatus::Draft);
        assert_eq!(draft.service.as_deref(), Some("Walk"));
        assert_eq!(draft.subtype.as_deref(), Some("Normal"));
        assert!(!draft.id.is_empty());
        assert_eq!(svc.active_draft_id(7), Some(draft.id));
    }

    #[test]
    fn test_begin_reuses_active_draft() {
        let svc = OrderService::new();
        let first = begin(&svc, 7, "Walk", Some("Normal"));
        let second = begin(&svc, 7, "Walk", Some("Active"));

        assert_eq!(first.id, second.id, "same chat must keep one draft");
        assert_eq!(second.subtype.as_deref(), Some("Active"));
        assert_eq!(svc.latest(10).len(), 1);
    }

    #[test]
    fn test_partial_update_leaves_absent_fields() {
        let svc = OrderService::new();
        let draft = begin(&svc, 7, "Walk", Some("Normal"));
        let updated = svc.begin_or_update_draft(7, DraftPatch {
            description: Some("at 5pm".into()),
            existing_order_id: Some(draft.id.clone()),
            ..Default::default()
        });

        assert_eq!(updated.service.as_deref(), Some("Walk"));
        assert_eq!(updated.subtype.as_deref(), Some("Normal"));
        assert_eq!(updated.description.as_deref(), Some("at 5pm"));
        assert_eq!(updated.status, OrderStatus::Draft);
    }

    #[test]
    fn test_finalize_clears_pointer() {
        let svc = OrderService::new();
        let draft = begin(&svc, 7, "Walk", Some("Normal"));
        let finalized = svc.begin_or_update_draft(7, DraftPatch {
            description: Some("please come at 5pm".into()),
            status: Some(OrderStatus::New),
            existing_order_id: Some(draft.id.clone()),
            ..Default::default()
        });

        assert_eq!(finalized.id, draft.id);
        assert_eq!(finalized.status, OrderStatus::New);
        assert_eq!(finalized.description.as_deref(), Some("please come at 5pm"));
        assert_eq!(svc.active_draft_id(7), None);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let svc = OrderService::new();
        let draft = begin(&svc, 7, "Walk", Some("Normal"));
        let patch = DraftPatch {
            description: Some("please come at 5pm".into()),
            status: Some(OrderStatus::New),
            existing_order_id: Some(draft.id.clone()),
            ..Default::default()
        };

        let first = svc.begin_or_update_draft(7, patch.clone());
        let second = svc.begin_or_update_draft(7, patch);

        assert_eq!(first.id, second.id, "replay must not create a second order");
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(svc.latest(10).len(), 1);
    }

    #[test]
    fn test_dangling_existing_id_synthesizes_new_draft() {
        let svc = OrderService::new();
        let order = svc.begin_or_update_draft(7, DraftPatch {
            service: Some("Walk".into()),
            existing_order_id: Some("gone".into()),
            ..Default::default()
        });
        assert_eq!(order.status, OrderStatus::Draft);
        assert_ne!(order.id, "gone");
    }

    #[test]
    fn test_save_round_trip() {
        let svc = OrderService::new();
        let saved = svc.save(Order::draft(7));
        let found = svc.find_by_id(&saved.id).unwrap();
        assert_eq!(found, saved);
    }

    #[test]
    fn test_save_assigns_id_and_timestamps() {
        let svc = OrderService::new();
        let saved = svc.save(Order::draft(7));
        assert!(!saved.id.is_empty());
        assert!(saved.created_at > 0);
        assert!(saved.updated_at >= saved.created_at);
    }

    #[test]
    fn test_updated_at_monotonic() {
        let svc = OrderService::new();
        let first = svc.save(Order::draft(7));
        let second = svc.save(first.clone());
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.created_at, first.created_at);
    }

    #[test]
    fn test_find_by_id_absent() {
        let svc = OrderService::new();
        assert!(svc.find_by_id("nope").is_none());
        assert!(svc.find_by_id("").is_none());
    }

    fn preset(chat_id: i64, created_at: i64) -> Order {
        let mut o = Order::draft(chat_id);
        o.status = OrderStatus::New;
        o.created_at = created_at;
        o
    }

    #[test]
    fn test_latest_ordering_and_clamp() {
        let svc = OrderService::new();
        for ts in [100, 300, 200] {
            svc.save(preset(7, ts));
        }

        let all = svc.latest(10);
        let stamps: Vec<i64> = all.iter().map(|o| o.created_at).collect();
        assert_eq!(stamps, vec![300, 200, 100]);

        // limit 0 is clamped up to 1, oversized limits down to 200
        assert_eq!(svc.latest(0).len(), 1);
        assert_eq!(svc.latest(0)[0].created_at, 300);
        assert_eq!(svc.latest(5000).len(), 3);
        assert_eq!(clamp_limit(5000), 200);
    }

    #[test]
    fn test_latest_by_chat_scoped() {
        let svc = OrderService::new();
        svc.save(preset(1, 100));
        svc.save(preset(1, 200));
        svc.save(preset(2, 300));

        let chat1 = svc.latest_by_chat(1, 10);
        assert_eq!(chat1.len(), 2);
        assert!(chat1.iter().all(|o| o.chat_id == 1));
        assert_eq!(chat1[0].created_at, 200);
        assert!(svc.latest_by_chat(99, 10).is_empty());
    }

    #[test]
    fn test_cancel_draft_removes_everything() {
        let svc = OrderService::new();
        let draft = begin(&svc, 7, "Walk", None);

        svc.cancel_draft(&draft.id);

        assert!(svc.find_by_id(&draft.id).is_none());
        assert_eq!(svc.active_draft_id(7), None);
        assert!(svc.latest(10).is_empty());
        assert!(svc.latest_by_chat(7, 10).is_empty());
    }

    #[test]
    fn test_cancel_draft_absent_is_noop() {
        let svc = OrderService::new();
        svc.cancel_draft("nope");
    }

    #[test]
    fn test_cancel_draft_keeps_foreign_pointer() {
        let svc = OrderService::new();
        let old = begin(&svc, 7, "Walk", None);
        // Finalizing releases the pointer; a newer draft takes it over.
        svc.begin_or_update_draft(7, DraftPatch {
            status: Some(OrderStatus::New),
            existing_order_id: Some(old.id.clone()),
            ..Default::default()
        });
        let newer = begin(&svc, 7, "Boarding", None);

        // Deleting the finalized order must not clobber the newer pointer.
        svc.cancel_draft(&old.id);
        assert_eq!(svc.active_draft_id(7), Some(newer.id));
    }

    #[test]
    fn test_cancel_draft_for_chat() {
        let svc = OrderService::new();
        let draft = begin(&svc, 7, "Walk", None);
        svc.cancel_draft_for_chat(7);
        assert!(svc.find_by_id(&draft.id).is_none());
        svc.cancel_draft_for_chat(7); // no draft left: no-op
    }

    #[test]
    fn test_update_status_not_found() {
        let svc = OrderService::new();
        assert!(svc.update_status("nope", OrderStatus::Completed).is_none());
    }

    #[test]
    fn test_update_status_repairs_pointer() {
        let svc = OrderService::new();
        let draft = begin(&svc, 7, "Walk", None);

        let moved = svc.update_status(&draft.id, OrderStatus::InProgress).unwrap();
        assert_eq!(moved.status, OrderStatus::InProgress);
        assert_eq!(svc.active_draft_id(7), None);

        let back = svc.update_status(&draft.id, OrderStatus::Draft).unwrap();
        assert_eq!(back.status, OrderStatus::Draft);
        assert_eq!(svc.active_draft_id(7), Some(draft.id));
    }

    #[test]
    fn test_concurrent_begins_yield_single_draft() {
        let svc = Arc::new(OrderService::new());
        let mut workers = Vec::new();
        for i in 0..8 {
            let svc = Arc::clone(&svc);
            workers.push(std::thread::spawn(move || {
                begin(&svc, 7, "Walk", Some(if i % 2 == 0 { "Normal" } else { "Active" }));
            }));
        }
        for w in workers {
            w.join().unwrap();
        }

        assert_eq!(svc.latest(10).len(), 1, "exactly one draft may survive");
        let draft_id = svc.active_draft_id(7).unwrap();
        assert_eq!(svc.find_by_id(&draft_id).unwrap().status, OrderStatus::Draft);
    }
}
