//! Event dispatch: a fixed, priority-ordered chain of handlers where the
//! first handler whose predicate matches consumes the event.

pub mod dispatcher;
pub mod handler;

pub use {dispatcher::Dispatcher, handler::EventHandler};
