//! Event type registry
//!
//! Protocol events come from a fixed catalogue ([`Type`]). Applications may
//! raise their own kinds through [`ExtendedType`]; the engine routes them the
//! same way but reports them as [`Type::NonCoreEvent`].

use std::fmt;

use crate::EntityKind;

/// Well-known protocol event types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    // Connection events
    ConnectionInit,
    ConnectionBound,
    ConnectionUnbound,
    ConnectionLocalOpen,
    ConnectionRemoteOpen,
    ConnectionLocalClose,
    ConnectionRemoteClose,
    ConnectionFinal,

    // Session events
    SessionInit,
    SessionLocalOpen,
    SessionRemoteOpen,
    SessionLocalClose,
    SessionRemoteClose,
    SessionFinal,

    // Link events
    LinkInit,
    LinkLocalOpen,
    LinkRemoteOpen,
    LinkLocalDetach,
    LinkRemoteDetach,
    LinkLocalClose,
    LinkRemoteClose,
    LinkFlow,
    LinkFinal,

    Delivery,

    // Transport events
    Transport,
    TransportError,
    TransportHeadClosed,
    TransportTailClosed,
    TransportClosed,

    // Reactor events
    ReactorInit,
    ReactorQuiesced,
    ReactorFinal,

    TimerTask,

    // Selectable events
    SelectableInit,
    SelectableUpdated,
    SelectableReadable,
    SelectableWritable,
    SelectableExpired,
    SelectableError,
    SelectableFinal,

    /// Sentinel for any kind outside this catalogue
    NonCoreEvent,
}

impl Type {
    /// Every core type, in declaration order (excludes the sentinel)
    pub const ALL: [Type; 40] = [
        Type::ConnectionInit,
        Type::ConnectionBound,
        Type::ConnectionUnbound,
        Type::ConnectionLocalOpen,
        Type::ConnectionRemoteOpen,
        Type::ConnectionLocalClose,
        Type::ConnectionRemoteClose,
        Type::ConnectionFinal,
        Type::SessionInit,
        Type::SessionLocalOpen,
        Type::SessionRemoteOpen,
        Type::SessionLocalClose,
        Type::SessionRemoteClose,
        Type::SessionFinal,
        Type::LinkInit,
        Type::LinkLocalOpen,
        Type::LinkRemoteOpen,
        Type::LinkLocalDetach,
        Type::LinkRemoteDetach,
        Type::LinkLocalClose,
        Type::LinkRemoteClose,
        Type::LinkFlow,
        Type::LinkFinal,
        Type::Delivery,
        Type::Transport,
        Type::TransportError,
        Type::TransportHeadClosed,
        Type::TransportTailClosed,
        Type::TransportClosed,
        Type::ReactorInit,
        Type::ReactorQuiesced,
        Type::ReactorFinal,
        Type::TimerTask,
        Type::SelectableInit,
        Type::SelectableUpdated,
        Type::SelectableReadable,
        Type::SelectableWritable,
        Type::SelectableExpired,
        Type::SelectableError,
        Type::SelectableFinal,
    ];

    /// Canonical wire-log name
    pub fn name(self) -> &'static str {
        match self {
            Type::ConnectionInit => "CONNECTION_INIT",
            Type::ConnectionBound => "CONNECTION_BOUND",
            Type::ConnectionUnbound => "CONNECTION_UNBOUND",
            Type::ConnectionLocalOpen => "CONNECTION_LOCAL_OPEN",
            Type::ConnectionRemoteOpen => "CONNECTION_REMOTE_OPEN",
            Type::ConnectionLocalClose => "CONNECTION_LOCAL_CLOSE",
            Type::ConnectionRemoteClose => "CONNECTION_REMOTE_CLOSE",
            Type::ConnectionFinal => "CONNECTION_FINAL",
            Type::SessionInit => "SESSION_INIT",
            Type::SessionLocalOpen => "SESSION_LOCAL_OPEN",
            Type::SessionRemoteOpen => "SESSION_REMOTE_OPEN",
            Type::SessionLocalClose => "SESSION_LOCAL_CLOSE",
            Type::SessionRemoteClose => "SESSION_REMOTE_CLOSE",
            Type::SessionFinal => "SESSION_FINAL",
            Type::LinkInit => "LINK_INIT",
            Type::LinkLocalOpen => "LINK_LOCAL_OPEN",
            Type::LinkRemoteOpen => "LINK_REMOTE_OPEN",
            Type::LinkLocalDetach => "LINK_LOCAL_DETACH",
            Type::LinkRemoteDetach => "LINK_REMOTE_DETACH",
            Type::LinkLocalClose => "LINK_LOCAL_CLOSE",
            Type::LinkRemoteClose => "LINK_REMOTE_CLOSE",
            Type::LinkFlow => "LINK_FLOW",
            Type::LinkFinal => "LINK_FINAL",
            Type::Delivery => "DELIVERY",
            Type::Transport => "TRANSPORT",
            Type::TransportError => "TRANSPORT_ERROR",
            Type::TransportHeadClosed => "TRANSPORT_HEAD_CLOSED",
            Type::TransportTailClosed => "TRANSPORT_TAIL_CLOSED",
            Type::TransportClosed => "TRANSPORT_CLOSED",
            Type::ReactorInit => "REACTOR_INIT",
            Type::ReactorQuiesced => "REACTOR_QUIESCED",
            Type::ReactorFinal => "REACTOR_FINAL",
            Type::TimerTask => "TIMER_TASK",
            Type::SelectableInit => "SELECTABLE_INIT",
            Type::SelectableUpdated => "SELECTABLE_UPDATED",
            Type::SelectableReadable => "SELECTABLE_READABLE",
            Type::SelectableWritable => "SELECTABLE_WRITABLE",
            Type::SelectableExpired => "SELECTABLE_EXPIRED",
            Type::SelectableError => "SELECTABLE_ERROR",
            Type::SelectableFinal => "SELECTABLE_FINAL",
            Type::NonCoreEvent => "NON_CORE_EVENT",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Type::ALL.into_iter().find(|ty| ty.name() == name)
    }

    /// Entity kind events of this type are raised on
    pub fn category(self) -> Option<EntityKind> {
        use Type::*;
        match self {
            ConnectionInit | ConnectionBound | ConnectionUnbound | ConnectionLocalOpen
            | ConnectionRemoteOpen | ConnectionLocalClose | ConnectionRemoteClose
            | ConnectionFinal => Some(EntityKind::Connection),
            SessionInit | SessionLocalOpen | SessionRemoteOpen | SessionLocalClose
            | SessionRemoteClose | SessionFinal => Some(EntityKind::Session),
            LinkInit | LinkLocalOpen | LinkRemoteOpen | LinkLocalDetach | LinkRemoteDetach
            | LinkLocalClose | LinkRemoteClose | LinkFlow | LinkFinal => Some(EntityKind::Link),
            Delivery => Some(EntityKind::Delivery),
            Transport | TransportError | TransportHeadClosed | TransportTailClosed
            | TransportClosed => Some(EntityKind::Transport),
            ReactorInit | ReactorQuiesced | ReactorFinal => Some(EntityKind::Reactor),
            TimerTask => Some(EntityKind::Task),
            SelectableInit | SelectableUpdated | SelectableReadable | SelectableWritable
            | SelectableExpired | SelectableError | SelectableFinal => {
                Some(EntityKind::Selectable)
            }
            NonCoreEvent => None,
        }
    }

    /// Only the sentinel is invalid
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Type::NonCoreEvent
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Application-defined event kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExtendedType {
    name: &'static str,
}

impl ExtendedType {
    pub const fn new(name: &'static str) -> Self {
        ExtendedType { name }
    }

    pub fn name(self) -> &'static str {
        self.name
    }

    /// An extended kind needs a name to be routable
    #[inline]
    pub fn is_valid(self) -> bool {
        !self.name.is_empty()
    }
}

/// The kind carried by an event record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Core(Type),
    Extended(ExtendedType),
}

impl EventKind {
    /// Validity predicate checked before an event is re-typed
    pub fn is_valid(self) -> bool {
        match self {
            EventKind::Core(ty) => ty.is_valid(),
            EventKind::Extended(ext) => ext.is_valid(),
        }
    }

    /// Collapse to the core catalogue
    pub fn core_type(self) -> Type {
        match self {
            EventKind::Core(ty) => ty,
            EventKind::Extended(_) => Type::NonCoreEvent,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Core(ty) => ty.name(),
            EventKind::Extended(ext) => ext.name(),
        }
    }
}

impl From<Type> for EventKind {
    fn from(ty: Type) -> Self {
        EventKind::Core(ty)
    }
}

impl From<ExtendedType> for EventKind {
    fn from(ext: ExtendedType) -> Self {
        EventKind::Extended(ext)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
