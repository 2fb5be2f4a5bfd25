//! Ember Engine - Event records and handler-tree dispatch
//!
//! This crate routes notifications about protocol entities:
//! - Attachment records (typed extension data on an event)
//! - The event record and its lifecycle (initialize, reset, duplicate)
//! - Handlers and handler trees
//! - Dispatch, delegation and redispatch
//! - Diagnostics, reported through a pluggable observer
//!
//! Dispatch is single-threaded and re-entrant: a handler may dispatch,
//! delegate or redispatch the event it is handling.
//!
//! ```rust
//! use std::rc::Rc;
//! use ember_core::{Reactor, Type};
//! use ember_engine::{BaseHandler, Event, Handler};
//!
//! let link = Reactor::new("app").connection("peer").session().receiver("in");
//! let root: Rc<dyn Handler> = Rc::new(BaseHandler::new());
//!
//! let mut event = Event::of(Type::LinkFlow, &link);
//! event.dispatch(&root).unwrap();
//! assert_eq!(event.receiver(), Some(link));
//! assert_eq!(event.nesting(), 0);
//! ```

pub mod attachments;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod handler;
pub mod observer;

pub use attachments::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use handler::*;
pub use observer::*;
