//! Event context and relationship resolution
//!
//! An event is raised on exactly one entity. Handlers rarely care which kind
//! that is; they ask for "the connection" or "the link" and the context walks
//! the entity graph to find it. Each query is a pure read. `None` means the
//! relationship does not exist for this context, or some intermediate
//! relationship along the way is unset.
//!
//! | Query | Resolution |
//! |---|---|
//! | connection | Connection, else Transport's connection, else session's connection |
//! | session | Session, else link's session |
//! | link | Link, else delivery's link |
//! | sender / receiver | link with the matching role |
//! | delivery | Delivery only |
//! | transport | Transport, else Connection's transport |
//! | reactor | walks up from every kind |
//! | task / selectable | that kind only |

use std::fmt;

use crate::{
    Connection, Delivery, EntityKind, Link, Reactor, Selectable, Session, Task, Transport,
};

/// The entity an event was raised on
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Context {
    Connection(Connection),
    Session(Session),
    Link(Link),
    Delivery(Delivery),
    Transport(Transport),
    Reactor(Reactor),
    Task(Task),
    Selectable(Selectable),
}

impl Context {
    pub fn kind(&self) -> EntityKind {
        match self {
            Context::Connection(_) => EntityKind::Connection,
            Context::Session(_) => EntityKind::Session,
            Context::Link(_) => EntityKind::Link,
            Context::Delivery(_) => EntityKind::Delivery,
            Context::Transport(_) => EntityKind::Transport,
            Context::Reactor(_) => EntityKind::Reactor,
            Context::Task(_) => EntityKind::Task,
            Context::Selectable(_) => EntityKind::Selectable,
        }
    }

    pub fn connection(&self) -> Option<Connection> {
        match self {
            Context::Connection(connection) => Some(connection.clone()),
            Context::Transport(transport) => transport.connection(),
            _ => self.session().map(|session| session.connection()),
        }
    }

    pub fn session(&self) -> Option<Session> {
        match self {
            Context::Session(session) => Some(session.clone()),
            _ => self.link().and_then(|link| link.session()),
        }
    }

    pub fn link(&self) -> Option<Link> {
        match self {
            Context::Link(link) => Some(link.clone()),
            _ => self.delivery().and_then(|delivery| delivery.link()),
        }
    }

    /// The link, if it sends
    pub fn sender(&self) -> Option<Link> {
        self.link().filter(Link::is_sender)
    }

    /// The link, if it receives
    pub fn receiver(&self) -> Option<Link> {
        self.link().filter(Link::is_receiver)
    }

    pub fn delivery(&self) -> Option<Delivery> {
        match self {
            Context::Delivery(delivery) => Some(delivery.clone()),
            _ => None,
        }
    }

    pub fn transport(&self) -> Option<Transport> {
        match self {
            Context::Transport(transport) => Some(transport.clone()),
            Context::Connection(connection) => connection.transport(),
            _ => None,
        }
    }

    pub fn reactor(&self) -> Option<Reactor> {
        match self {
            Context::Reactor(reactor) => Some(reactor.clone()),
            Context::Task(task) => Some(task.reactor()),
            Context::Transport(transport) => transport.reactor(),
            Context::Delivery(delivery) => delivery
                .link()
                .and_then(|link| link.session())
                .and_then(|session| session.connection().reactor()),
            Context::Link(link) => link
                .session()
                .and_then(|session| session.connection().reactor()),
            Context::Session(session) => session.connection().reactor(),
            Context::Connection(connection) => connection.reactor(),
            Context::Selectable(selectable) => Some(selectable.reactor()),
        }
    }

    pub fn task(&self) -> Option<Task> {
        match self {
            Context::Task(task) => Some(task.clone()),
            _ => None,
        }
    }

    pub fn selectable(&self) -> Option<Selectable> {
        match self {
            Context::Selectable(selectable) => Some(selectable.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Connection(connection) => fmt::Display::fmt(connection, f),
            Context::Session(session) => fmt::Display::fmt(session, f),
            Context::Link(link) => fmt::Display::fmt(link, f),
            Context::Delivery(delivery) => fmt::Display::fmt(delivery, f),
            Context::Transport(transport) => fmt::Display::fmt(transport, f),
            Context::Reactor(reactor) => fmt::Display::fmt(reactor, f),
            Context::Task(task) => fmt::Display::fmt(task, f),
            Context::Selectable(selectable) => fmt::Display::fmt(selectable, f),
        }
    }
}

macro_rules! context_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Context {
                fn from(entity: $variant) -> Self {
                    Context::$variant(entity)
                }
            }

            impl From<&$variant> for Context {
                fn from(entity: &$variant) -> Self {
                    Context::$variant(entity.clone())
                }
            }
        )*
    };
}

context_from!(Connection, Session, Link, Delivery, Transport, Reactor, Task, Selectable);
