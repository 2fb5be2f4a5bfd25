//! Dispatch errors
//!
//! Handlers report failures through `anyhow::Result`. At the dispatch
//! boundary a `HandlerFailure` or `WrappedHandlerFailure` passes through
//! untouched; anything else, a rejected nested redispatch included, is
//! wrapped with the event kind and the handler that raised it. No bare
//! `anyhow::Error` leaves the engine.

use std::fmt;
use std::rc::Rc;

use ember_core::EventKind;
use thiserror::Error;

use crate::Handler;

/// Identity of a handler, safe to carry across threads
///
/// The address is only meaningful while the handler is alive; it exists to
/// tell apart two instances of the same handler type in logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerRef {
    name: &'static str,
    address: usize,
}

impl HandlerRef {
    pub fn new(name: &'static str, address: usize) -> Self {
        HandlerRef { name, address }
    }

    pub fn of<H: Handler + ?Sized>(handler: &H) -> Self {
        HandlerRef {
            name: handler.name(),
            address: handler as *const H as *const () as usize,
        }
    }

    pub fn of_rc(handler: &Rc<dyn Handler>) -> Self {
        Self::of(handler.as_ref())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn address(&self) -> usize {
        self.address
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.name, self.address)
    }
}

/// Render an optional kind for messages
pub(crate) fn kind_label(kind: &Option<EventKind>) -> &'static str {
    match kind {
        Some(kind) => kind.name(),
        None => "<unset>",
    }
}

/// Errors raised by `dispatch`, `delegate` and `redispatch`
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("can only redispatch valid event types, got {kind}")]
    InvalidRedispatchKind { kind: EventKind },

    #[error("handler {handler} failed on {}: {reason}", kind_label(.kind))]
    HandlerFailure {
        kind: Option<EventKind>,
        handler: HandlerRef,
        reason: String,
    },

    #[error("unexpected failure dispatching {} to handler {handler}", kind_label(.kind))]
    WrappedHandlerFailure {
        kind: Option<EventKind>,
        handler: HandlerRef,
        #[source]
        cause: anyhow::Error,
    },
}

impl DispatchError {
    /// Event kind in effect when the failure happened
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            DispatchError::InvalidRedispatchKind { kind } => Some(*kind),
            DispatchError::HandlerFailure { kind, .. }
            | DispatchError::WrappedHandlerFailure { kind, .. } => *kind,
        }
    }

    /// Handler that raised the failure
    pub fn handler(&self) -> Option<HandlerRef> {
        match self {
            DispatchError::InvalidRedispatchKind { .. } => None,
            DispatchError::HandlerFailure { handler, .. }
            | DispatchError::WrappedHandlerFailure { handler, .. } => Some(*handler),
        }
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self, DispatchError::WrappedHandlerFailure { .. })
    }
}

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;
