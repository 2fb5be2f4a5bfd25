//! Protocol entity handles
//!
//! Entities are cheap-clone shared handles with identity equality. Children
//! hold their parents, so a delivery keeps its link, session and connection
//! reachable. The only weak upward reference is transport → connection, since
//! the connection holds its transport.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::{
    ConnectionId, CoreError, CoreResult, DeliveryId, LinkId, ReactorId, SelectableId, SessionId,
    TaskId, TransportId,
};

/// Kind of entity an event context can refer to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Connection,
    Session,
    Link,
    Delivery,
    Transport,
    Reactor,
    Task,
    Selectable,
}

impl EntityKind {
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Connection => "connection",
            EntityKind::Session => "session",
            EntityKind::Link => "link",
            EntityKind::Delivery => "delivery",
            EntityKind::Transport => "transport",
            EntityKind::Reactor => "reactor",
            EntityKind::Task => "task",
            EntityKind::Selectable => "selectable",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of a link
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Sender,
    Receiver,
}

macro_rules! entity_handle {
    ($name:ident, $id:ty) => {
        impl $name {
            #[inline]
            pub fn id(&self) -> $id {
                self.0.id
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Rc::ptr_eq(&self.0, &other.0)
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.id.hash(state);
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:?}", self.0.id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.id)
            }
        }
    };
}

// =============================================================================
// Reactor
// =============================================================================

struct ReactorInner {
    id: ReactorId,
    container_id: String,
}

/// Reactor - owns connections, timer tasks and selectables
#[derive(Clone)]
pub struct Reactor(Rc<ReactorInner>);

entity_handle!(Reactor, ReactorId);

impl Reactor {
    pub fn new(container_id: impl Into<String>) -> Self {
        Reactor(Rc::new(ReactorInner {
            id: ReactorId::next(),
            container_id: container_id.into(),
        }))
    }

    pub fn container_id(&self) -> &str {
        &self.0.container_id
    }

    /// Open a connection owned by this reactor
    pub fn connection(&self, hostname: impl Into<String>) -> Connection {
        Connection::create(hostname.into(), Some(self.clone()))
    }

    /// Schedule a timer task `delay` from now
    pub fn schedule(&self, delay: Duration) -> Task {
        Task(Rc::new(TaskInner {
            id: TaskId::next(),
            deadline: delay,
            reactor: self.clone(),
        }))
    }

    pub fn selectable(&self) -> Selectable {
        Selectable(Rc::new(SelectableInner {
            id: SelectableId::next(),
            reactor: self.clone(),
        }))
    }
}

// =============================================================================
// Connection
// =============================================================================

struct ConnectionInner {
    id: ConnectionId,
    hostname: String,
    reactor: Option<Reactor>,
    transport: RefCell<Option<Transport>>,
}

/// Connection - root of the session/link/delivery tree
#[derive(Clone)]
pub struct Connection(Rc<ConnectionInner>);

entity_handle!(Connection, ConnectionId);

impl Connection {
    /// Create a connection that no reactor owns
    pub fn detached(hostname: impl Into<String>) -> Self {
        Self::create(hostname.into(), None)
    }

    fn create(hostname: String, reactor: Option<Reactor>) -> Self {
        Connection(Rc::new(ConnectionInner {
            id: ConnectionId::next(),
            hostname,
            reactor,
            transport: RefCell::new(None),
        }))
    }

    pub fn hostname(&self) -> &str {
        &self.0.hostname
    }

    pub fn reactor(&self) -> Option<Reactor> {
        self.0.reactor.clone()
    }

    pub fn transport(&self) -> Option<Transport> {
        self.0.transport.borrow().clone()
    }

    /// Begin a new session on this connection
    pub fn session(&self) -> Session {
        Session(Rc::new(SessionInner {
            id: SessionId::next(),
            connection: self.clone(),
        }))
    }
}

// =============================================================================
// Transport
// =============================================================================

struct TransportInner {
    id: TransportId,
    connection: RefCell<Weak<ConnectionInner>>,
}

/// Transport - the byte-level endpoint a connection is bound to
#[derive(Clone)]
pub struct Transport(Rc<TransportInner>);

entity_handle!(Transport, TransportId);

impl Transport {
    pub fn new() -> Self {
        Transport(Rc::new(TransportInner {
            id: TransportId::next(),
            connection: RefCell::new(Weak::new()),
        }))
    }

    /// The bound connection, if it is still alive
    pub fn connection(&self) -> Option<Connection> {
        self.0.connection.borrow().upgrade().map(Connection)
    }

    /// The reactor of the bound connection
    pub fn reactor(&self) -> Option<Reactor> {
        self.connection().and_then(|connection| connection.reactor())
    }

    pub fn is_bound(&self) -> bool {
        self.connection().is_some()
    }

    /// Bind this transport to a connection
    ///
    /// Both sides must be unbound.
    pub fn bind(&self, connection: &Connection) -> CoreResult<()> {
        if let Some(bound) = self.connection() {
            return Err(CoreError::TransportAlreadyBound {
                transport: self.id(),
                connection: bound.id(),
            });
        }
        if let Some(existing) = connection.transport() {
            return Err(CoreError::ConnectionAlreadyBound {
                connection: connection.id(),
                transport: existing.id(),
            });
        }

        *self.0.connection.borrow_mut() = Rc::downgrade(&connection.0);
        *connection.0.transport.borrow_mut() = Some(self.clone());
        Ok(())
    }

    /// Unbind from the current connection, if any
    pub fn unbind(&self) {
        if let Some(connection) = self.connection() {
            connection.0.transport.borrow_mut().take();
        }
        *self.0.connection.borrow_mut() = Weak::new();
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Session
// =============================================================================

struct SessionInner {
    id: SessionId,
    connection: Connection,
}

/// Session - groups links on a connection
#[derive(Clone)]
pub struct Session(Rc<SessionInner>);

entity_handle!(Session, SessionId);

impl Session {
    pub fn connection(&self) -> Connection {
        self.0.connection.clone()
    }

    /// Attach a sending link
    pub fn sender(&self, name: impl Into<String>) -> Link {
        Link::create(name.into(), Role::Sender, self.clone())
    }

    /// Attach a receiving link
    pub fn receiver(&self, name: impl Into<String>) -> Link {
        Link::create(name.into(), Role::Receiver, self.clone())
    }
}

// =============================================================================
// Link
// =============================================================================

struct LinkInner {
    id: LinkId,
    name: String,
    role: Role,
    session: RefCell<Option<Session>>,
}

/// Link - a unidirectional route within a session
#[derive(Clone)]
pub struct Link(Rc<LinkInner>);

entity_handle!(Link, LinkId);

impl Link {
    fn create(name: String, role: Role, session: Session) -> Self {
        Link(Rc::new(LinkInner {
            id: LinkId::next(),
            name,
            role,
            session: RefCell::new(Some(session)),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.0.role
    }

    #[inline]
    pub fn is_sender(&self) -> bool {
        self.0.role == Role::Sender
    }

    #[inline]
    pub fn is_receiver(&self) -> bool {
        self.0.role == Role::Receiver
    }

    /// Owning session; `None` once detached
    pub fn session(&self) -> Option<Session> {
        self.0.session.borrow().clone()
    }

    /// Detach the link from its session
    pub fn detach(&self) {
        self.0.session.borrow_mut().take();
    }

    /// Start a delivery on this link
    pub fn delivery(&self, tag: impl Into<Vec<u8>>) -> Delivery {
        Delivery(Rc::new(DeliveryInner {
            id: DeliveryId::next(),
            tag: tag.into(),
            link: RefCell::new(Some(self.clone())),
        }))
    }
}

// =============================================================================
// Delivery
// =============================================================================

struct DeliveryInner {
    id: DeliveryId,
    tag: Vec<u8>,
    link: RefCell<Option<Link>>,
}

/// Delivery - one message transfer on a link
#[derive(Clone)]
pub struct Delivery(Rc<DeliveryInner>);

entity_handle!(Delivery, DeliveryId);

impl Delivery {
    pub fn tag(&self) -> &[u8] {
        &self.0.tag
    }

    /// Owning link; `None` once settled
    pub fn link(&self) -> Option<Link> {
        self.0.link.borrow().clone()
    }

    /// Settle the delivery, releasing it from its link
    pub fn settle(&self) {
        self.0.link.borrow_mut().take();
    }

    pub fn is_settled(&self) -> bool {
        self.0.link.borrow().is_none()
    }
}

// =============================================================================
// Task / Selectable
// =============================================================================

struct TaskInner {
    id: TaskId,
    deadline: Duration,
    reactor: Reactor,
}

/// Timer task scheduled on a reactor
#[derive(Clone)]
pub struct Task(Rc<TaskInner>);

entity_handle!(Task, TaskId);

impl Task {
    /// Delay from scheduling time
    pub fn deadline(&self) -> Duration {
        self.0.deadline
    }

    pub fn reactor(&self) -> Reactor {
        self.0.reactor.clone()
    }
}

struct SelectableInner {
    id: SelectableId,
    reactor: Reactor,
}

/// Selectable - an I/O source registered with a reactor
#[derive(Clone)]
pub struct Selectable(Rc<SelectableInner>);

entity_handle!(Selectable, SelectableId);

impl Selectable {
    pub fn reactor(&self) -> Reactor {
        self.0.reactor.clone()
    }
}
