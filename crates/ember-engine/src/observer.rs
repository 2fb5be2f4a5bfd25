//! Dispatch observability
//!
//! The engine reports what it does through a [`DispatchObserver`]. Observers
//! only watch: they cannot fail and cannot change how the event is routed.
//! [`TracingObserver`] is the default and turns every diagnostic into a
//! `tracing` event under the `ember::dispatch` target.

use ember_core::{Context, EventKind};
use tracing::{debug, warn};

use crate::error::kind_label;
use crate::HandlerRef;

/// Something the engine did while routing an event
#[derive(Debug)]
pub enum Diagnostic<'a> {
    /// The handler's unhandled counter did not advance while it processed
    /// the event.
    Unhandled {
        kind: Option<EventKind>,
        context: Option<&'a Context>,
        handler: HandlerRef,
        nesting: usize,
    },
    /// A parent forwarded the event to one of its children.
    Delegated {
        kind: Option<EventKind>,
        context: Option<&'a Context>,
        parent: HandlerRef,
        child: HandlerRef,
        nesting: usize,
    },
    /// The event is being dispatched under another kind.
    Redispatched {
        kind: EventKind,
        previous: Option<EventKind>,
        handler: HandlerRef,
        nesting: usize,
    },
    /// A handler failed with an error the engine is about to wrap.
    HandlerFailed {
        kind: Option<EventKind>,
        handler: HandlerRef,
        cause: &'a anyhow::Error,
        nesting: usize,
    },
}

impl Diagnostic<'_> {
    pub fn nesting(&self) -> usize {
        match self {
            Diagnostic::Unhandled { nesting, .. }
            | Diagnostic::Delegated { nesting, .. }
            | Diagnostic::Redispatched { nesting, .. }
            | Diagnostic::HandlerFailed { nesting, .. } => *nesting,
        }
    }
}

/// Subscriber for dispatch diagnostics
pub trait DispatchObserver {
    fn observe(&self, diagnostic: &Diagnostic<'_>);
}

/// Discards every diagnostic
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl DispatchObserver for NoopObserver {
    fn observe(&self, _diagnostic: &Diagnostic<'_>) {}
}

/// Forwards diagnostics to `tracing`
///
/// Nesting is rendered as an `indent` field, `indent_width` spaces per level.
#[derive(Clone, Debug)]
pub struct TracingObserver {
    indent_width: usize,
}

impl TracingObserver {
    pub fn new() -> Self {
        TracingObserver { indent_width: 1 }
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    fn indent(&self, nesting: usize) -> String {
        " ".repeat(nesting * self.indent_width)
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

fn context_label(context: Option<&Context>) -> String {
    context.map_or_else(|| "<none>".to_string(), ToString::to_string)
}

impl DispatchObserver for TracingObserver {
    fn observe(&self, diagnostic: &Diagnostic<'_>) {
        let indent = self.indent(diagnostic.nesting());
        match diagnostic {
            Diagnostic::Unhandled {
                kind,
                context,
                handler,
                nesting,
            } => debug!(
                target: "ember::dispatch",
                indent = %indent,
                nesting = *nesting,
                kind = kind_label(kind),
                context = %context_label(*context),
                handler = %handler,
                "dispatched event to handler"
            ),
            Diagnostic::Delegated {
                kind,
                context,
                parent,
                child,
                nesting,
            } => debug!(
                target: "ember::dispatch",
                indent = %indent,
                nesting = *nesting,
                kind = kind_label(kind),
                context = %context_label(*context),
                parent = %parent,
                child = %child,
                "delegating event to child handler"
            ),
            Diagnostic::Redispatched {
                kind,
                previous,
                handler,
                nesting,
            } => debug!(
                target: "ember::dispatch",
                indent = %indent,
                nesting = *nesting,
                kind = kind.name(),
                previous = kind_label(previous),
                handler = %handler,
                "redispatching event"
            ),
            Diagnostic::HandlerFailed {
                kind,
                handler,
                cause,
                nesting,
            } => warn!(
                target: "ember::dispatch",
                indent = %indent,
                nesting = *nesting,
                kind = kind_label(kind),
                handler = %handler,
                error = %cause,
                "handler failed while dispatching event"
            ),
        }
    }
}
