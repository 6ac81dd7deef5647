//! Order records and their draft → finalized lifecycle.
//!
//! The in-process [`OrderService`] is the source of truth: it owns the
//! primary record map, the per-chat active-draft pointer, and two recency
//! indexes, all mutated atomically. Saves and deletions are mirrored
//! best-effort to a durable SQLite replica used for reporting only.

pub mod mirror;
pub mod order;
pub mod service;

pub use {
    mirror::{OrderMirror, SqliteOrderMirror, run_migrations},
    order::{Order, OrderStatus, Requester},
    service::{DraftPatch, OrderService},
};
