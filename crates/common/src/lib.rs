//! Shared types for the waggle gateway.
//!
//! The inbound event shape every handler consumes, the outbound `Notifier`
//! capability flow handlers send through, and the common error type.

pub mod error;
pub mod event;
pub mod notify;

pub use {
    error::{Error, Result},
    event::{EventKind, InboundEvent, Sender},
    notify::{Button, Notifier},
};
