//! Handler-tree dispatch
//!
//! `dispatch(h)` runs `h.handle`, then forwards the event to `h`'s children
//! through [`Event::delegate`]. A handler may call `delegate` itself to run
//! its children early; the delegated slot is taken on first use, so children
//! are visited at most once per dispatch.
//!
//! ```text
//! dispatch(root)
//!  ├─ root.handle(event)
//!  └─ delegate()
//!      ├─ dispatch(child_a)
//!      │   ├─ child_a.handle(event)
//!      │   └─ delegate() ...
//!      └─ dispatch(child_b) ...
//! ```
//!
//! Every call restores the record's delegated slot and nesting depth, and
//! `redispatch` its kind, on both success and failure paths.

use std::rc::Rc;

use ember_core::EventKind;

use crate::{Diagnostic, DispatchError, DispatchResult, Event, Handler, HandlerRef};

impl Event {
    /// Route this event to `handler` and then to its children
    pub fn dispatch(&mut self, handler: &Rc<dyn Handler>) -> DispatchResult<()> {
        let depth = self.nesting;
        let previous = self.delegated.replace(Rc::clone(handler));
        self.nesting = depth + 1;

        let result = self.invoke(handler);

        self.delegated = previous;
        self.nesting = depth;
        result
    }

    /// Forward the event to the children of the handler currently being
    /// dispatched to
    ///
    /// No-op when nothing is delegated, e.g. when called twice from the same
    /// handler or outside any dispatch.
    pub fn delegate(&mut self) -> DispatchResult<()> {
        let Some(parent) = self.delegated.take() else {
            return Ok(());
        };

        for child in parent.children() {
            if self.config().trace_delegation {
                self.observe(&Diagnostic::Delegated {
                    kind: self.kind,
                    context: self.context(),
                    parent: HandlerRef::of_rc(&parent),
                    child: HandlerRef::of_rc(&child),
                    nesting: self.nesting,
                });
            }
            self.dispatch(&child)?;
        }
        Ok(())
    }

    /// Dispatch to `handler` as if the event were of kind `kind`
    ///
    /// The original kind is back in place when this returns, whatever the
    /// outcome.
    pub fn redispatch(
        &mut self,
        kind: impl Into<EventKind>,
        handler: &Rc<dyn Handler>,
    ) -> DispatchResult<()> {
        let kind = kind.into();
        if !kind.is_valid() {
            return Err(DispatchError::InvalidRedispatchKind { kind });
        }

        let depth = self.nesting;
        let previous = self.kind.replace(kind);
        self.nesting = depth + 1;

        if self.config().trace_redispatch {
            self.observe(&Diagnostic::Redispatched {
                kind,
                previous,
                handler: HandlerRef::of_rc(handler),
                nesting: self.nesting,
            });
        }
        let result = self.dispatch(handler);

        self.nesting = depth;
        self.kind = previous;
        result
    }

    fn invoke(&mut self, handler: &Rc<dyn Handler>) -> DispatchResult<()> {
        let unhandled = handler.unhandled();
        if let Err(err) = handler.handle(self) {
            return Err(self.classify(handler, err));
        }

        if unhandled == handler.unhandled() && self.config().report_unhandled {
            self.observe(&Diagnostic::Unhandled {
                kind: self.kind,
                context: self.context(),
                handler: HandlerRef::of_rc(handler),
                nesting: self.nesting,
            });
        }

        self.delegate()
    }

    /// Pass handler failures through, wrap everything else
    ///
    /// A rejected redispatch raised inside `handle` is wrapped too, so the
    /// caller learns which handler attempted it.
    fn classify(&self, handler: &Rc<dyn Handler>, err: anyhow::Error) -> DispatchError {
        let cause = match err.downcast::<DispatchError>() {
            Ok(rejected @ DispatchError::InvalidRedispatchKind { .. }) => anyhow::Error::new(rejected),
            Ok(failure) => return failure,
            Err(cause) => cause,
        };

        let handler = HandlerRef::of_rc(handler);
        if self.config().report_failures {
            self.observe(&Diagnostic::HandlerFailed {
                kind: self.kind,
                handler,
                cause: &cause,
                nesting: self.nesting,
            });
        }
        DispatchError::WrappedHandlerFailure {
            kind: self.kind,
            handler,
            cause,
        }
    }
}
