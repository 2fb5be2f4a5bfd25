//! Identity types for protocol entities
//!
//! Every entity carries a 64-bit id drawn from one process-wide sequence,
//! so ids are unique across entity kinds as well as within one.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[inline]
fn allocate() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub fn new(id: u64) -> Self {
                $name(id)
            }

            /// Allocate a fresh id
            #[inline]
            pub fn next() -> Self {
                $name(allocate())
            }

            #[inline]
            pub fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Connection identity
    ConnectionId,
    "connection"
);
entity_id!(
    /// Session identity - unique across all connections
    SessionId,
    "session"
);
entity_id!(
    /// Link identity (senders and receivers share the space)
    LinkId,
    "link"
);
entity_id!(DeliveryId, "delivery");
entity_id!(TransportId, "transport");
entity_id!(ReactorId, "reactor");
entity_id!(TaskId, "task");
entity_id!(SelectableId, "selectable");
