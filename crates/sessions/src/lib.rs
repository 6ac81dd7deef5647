//! Per-conversation session state with inactivity expiry.
//!
//! One [`ConversationSession`] per chat id, created lazily on first access
//! and treated as absent once idle for longer than the inactivity window.
//! A background sweeper evicts stale entries; reads enforce expiry on their
//! own, so the sweeper is advisory cleanup only.

pub mod session;
pub mod store;

pub use {
    session::{ConversationSession, FlowState},
    store::{IDLE_TIMEOUT, SWEEP_INTERVAL, SessionStore},
};
