//! Ember Core - Protocol entities and event kinds
//!
//! This crate defines the types the event engine routes notifications about:
//! - Identifiers (ConnectionId, SessionId, LinkId, ...)
//! - Entity handles (Connection, Session, Link, Delivery, Transport, Reactor, Task, Selectable)
//! - The event context and its relationship queries
//! - The registry of well-known event types

pub mod id;
pub mod entity;
pub mod context;
pub mod event_type;
pub mod error;

pub use id::*;
pub use entity::*;
pub use context::*;
pub use event_type::*;
pub use error::*;
