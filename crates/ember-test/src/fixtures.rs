//! Entity topologies for tests and benchmarks

use std::time::Duration;

use ember_core::{
    Connection, Context, Delivery, Link, Reactor, Selectable, Session, Task, Transport,
};

/// One of every entity kind, fully wired:
///
/// ```text
/// reactor ── connection ── session ─┬─ sender
///    │            │                 └─ receiver ── delivery
///    ├─ task      └─ transport
///    └─ selectable
/// ```
pub struct Topology {
    pub reactor: Reactor,
    pub connection: Connection,
    pub transport: Transport,
    pub session: Session,
    pub sender: Link,
    pub receiver: Link,
    pub delivery: Delivery,
    pub task: Task,
    pub selectable: Selectable,
}

impl Topology {
    pub fn new() -> Self {
        let reactor = Reactor::new("ember-test");
        let connection = reactor.connection("peer.test");
        let transport = Transport::new();
        transport
            .bind(&connection)
            .expect("fresh transport binds to a fresh connection");
        let session = connection.session();
        let sender = session.sender("outgoing");
        let receiver = session.receiver("incoming");
        let delivery = receiver.delivery(b"delivery-0".to_vec());
        let task = reactor.schedule(Duration::from_millis(100));
        let selectable = reactor.selectable();

        Topology {
            reactor,
            connection,
            transport,
            session,
            sender,
            receiver,
            delivery,
            task,
            selectable,
        }
    }

    /// Every entity as a context, leaves first
    pub fn contexts(&self) -> Vec<Context> {
        vec![
            Context::from(&self.delivery),
            Context::from(&self.sender),
            Context::from(&self.receiver),
            Context::from(&self.session),
            Context::from(&self.transport),
            Context::from(&self.connection),
            Context::from(&self.task),
            Context::from(&self.selectable),
            Context::from(&self.reactor),
        ]
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}
